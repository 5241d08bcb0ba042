//! # Armlink Protocol
//!
//! 机器人控制器 TCP 协议定义（无网络依赖）
//!
//! ## 模块
//!
//! - `message`: 消息头与握手消息
//! - `state`: `RobotState` 快照及其编解码
//! - `control`: 命令值类型（关节位置/速度、笛卡尔位姿/速度、力矩）
//! - `version`: 服务端协议版本
//!
//! ## 字节序
//!
//! 协议所有整数与浮点数均使用小端字节序（Little Endian）。
//!
//! ## 帧格式
//!
//! ```text
//! [msg_type: u8][flags: u8][reserved: u16][length: u32][payload: length bytes]
//! ```

pub mod control;
pub mod message;
pub mod state;
pub mod version;

// 重新导出常用类型
pub use control::*;
pub use message::*;
pub use state::*;
pub use version::ServerVersion;

use thiserror::Error;

/// 协议解析错误类型
///
/// 任何一个变体都意味着连接上的字节流已经无法信任，调用方不应尝试重新同步。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    #[error("Invalid payload length for {msg_type:?}: expected {expected}, got {actual}")]
    InvalidLength {
        msg_type: MessageType,
        expected: usize,
        actual: usize,
    },

    #[error("Payload too large: {length} bytes (max {max})")]
    PayloadTooLarge { length: u32, max: u32 },

    #[error("Unexpected message: expected {expected:?}, got {actual:?}")]
    UnexpectedMessage {
        expected: MessageType,
        actual: MessageType,
    },

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: &'static str, value: u64 },

    #[error("Truncated message: peer closed after {received} of {expected} bytes")]
    Truncated { expected: usize, received: usize },

    #[error("Sequence gap: expected state #{expected}, got #{actual}")]
    SequenceGap { expected: u64, actual: u64 },

    #[error("Inconsistent robot state: {0}")]
    InconsistentState(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::UnknownMessageType(0x42);
        assert_eq!(format!("{}", err), "Unknown message type: 0x42");

        let err = ProtocolError::InvalidLength {
            msg_type: MessageType::ConnectReply,
            expected: 4,
            actual: 2,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("ConnectReply") && msg.contains("expected 4"), "{}", msg);

        let err = ProtocolError::SequenceGap {
            expected: 8,
            actual: 10,
        };
        assert_eq!(format!("{}", err), "Sequence gap: expected state #8, got #10");
    }
}
