//! 驱动层模块
//!
//! 本模块提供与机器人控制器之间的会话管理，包括：
//! - 连接建立与版本握手
//! - 阻塞式状态等待（每次成功恰好交付一个完整、校验过的快照）
//! - 序号连续性检查（丢失、重复、乱序均视为协议错误）
//! - 超时配置（TOML 可加载）
//!
//! # 使用场景
//!
//! 由单个控制线程持有 [`Connection`]，循环调用 `wait_for_state()`。
//! 日志记录与 CSV 诊断输出见 `armlink-tools`。

mod config;
mod connection;
mod error;
mod session;

pub use config::ConnectionConfig;
pub use connection::Connection;
pub use error::{ConfigError, ConnectionError};

// 会话中出现的类型，方便下游只依赖本 crate
pub use armlink_net::NetError;
pub use armlink_protocol::{ProtocolError, RobotState, ServerVersion};
