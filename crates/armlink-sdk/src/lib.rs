//! Armlink SDK - 机器人控制器连接 Rust SDK
//!
//! 维持与机器人控制器之间的实时状态连接，并记录每个控制周期的命令/状态对用于事后诊断。
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **传输层** (`net`): connect/send/receive/close 原语（TCP、测试用 Mock）
//! - **协议层** (`protocol`): 消息头、握手消息、状态快照编解码
//! - **驱动层** (`driver`): 会话管理、版本握手、状态同步
//! - **工具层** (`tools`): 命令/状态日志与 CSV 诊断输出
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use armlink_sdk::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! armlink_sdk::init_logging();
//!
//! let mut connection = Connection::new("172.16.0.2")?;
//! let mut logger = Logger::default();
//!
//! let result = connection.read(|state| {
//!     logger.log(state, RobotCommand::default());
//!     state.sequence_number < 1000
//! });
//!
//! if let Err(e) = result {
//!     let failure = ControlError::with_logger(e.to_string(), &mut logger);
//!     eprintln!("{}", failure.log_csv());
//! }
//! # Ok(())
//! # }
//! ```

// 内部模块结构（按层划分）
pub use armlink_driver as driver;
pub use armlink_net as net;
pub use armlink_protocol as protocol;
pub use armlink_tools as tools;

// Prelude 模块
pub mod prelude;

// --- 用户以此为界 ---
// 以下是通过 Facade Pattern 提供的公共 API

// 传输层
pub use net::{NetError, Transport};

// 协议层
pub use protocol::{
    CartesianPose, CartesianVelocities, JointPositions, JointVelocities, ProtocolError,
    RobotState, ServerVersion, Torques,
};

// 驱动层
pub use driver::{ConfigError, Connection, ConnectionConfig, ConnectionError};

// 工具层
pub use tools::{ControlError, Logger, Record, RobotCommand, log_to_csv, write_csv};

/// 默认日志过滤指令（`RUST_LOG` 未设置时生效）
pub const DEFAULT_LOG_DIRECTIVE: &str = "armlink=info";

/// 初始化 `tracing` 日志输出
///
/// 使用 `RUST_LOG` 环境变量过滤；未设置时使用 [`DEFAULT_LOG_DIRECTIVE`]。
/// 重复调用是安全的（已有全局 subscriber 时静默跳过）。
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("Global tracing subscriber already set, skipping init");
    }
}
