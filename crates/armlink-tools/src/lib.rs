//! # Armlink Tools - 控制循环日志与诊断
//!
//! **依赖原则**: 只依赖 `armlink-protocol`，避免依赖 `armlink-driver`
//!
//! ## 包含模块
//!
//! - `log` - 命令/状态记录（纯数据结构）与环形日志缓冲
//! - `csv` - 日志到 CSV 文本的格式化（纯函数）
//!
//! 日志独立于任何连接存在：连接断开后，调用方依然可以把积累的记录写成 CSV。

pub mod csv;
pub mod log;

// 重新导出常用类型
pub use csv::{csv_header, log_to_csv, write_csv};
pub use log::{ControlError, Logger, Record, RobotCommand};
