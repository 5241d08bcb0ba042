//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use armlink_sdk::prelude::*;
//! ```

// 驱动层（推荐入口）
pub use crate::driver::{Connection, ConnectionConfig};

// 状态与命令
pub use crate::protocol::{
    CartesianPose, CartesianVelocities, JointPositions, JointVelocities, RobotState,
    ServerVersion, Torques,
};
pub use crate::tools::{Logger, Record, RobotCommand, log_to_csv};

// 错误类型
pub use crate::driver::ConnectionError;
pub use crate::net::NetError;
pub use crate::protocol::ProtocolError;
pub use crate::tools::ControlError;
