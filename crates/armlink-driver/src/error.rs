//! 驱动层错误类型定义

use armlink_net::NetError;
use armlink_protocol::{ProtocolError, ServerVersion};
use thiserror::Error;

/// 连接错误类型
///
/// 三类错误对应三种不同的处理方式：
/// - `Network`: 链路问题（不可达、拒绝、超时、意外断开），调用方可选择重新构造连接
/// - `IncompatibleVersion`: 只在握手阶段出现，换连接也无济于事
/// - `Protocol`: 字节流已不可信，该连接实例不可恢复
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// 传输层错误
    #[error("Network error: {0}")]
    Network(#[from] NetError),

    /// 控制器协议版本不被本客户端支持
    #[error("Incompatible server version: expected {expected}, received {received}")]
    IncompatibleVersion {
        expected: ServerVersion,
        received: ServerVersion,
    },

    /// 协议解析错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 配置无效（连接尚未尝试）
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl ConnectionError {
    pub fn is_network(&self) -> bool {
        matches!(self, ConnectionError::Network(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, ConnectionError::Protocol(_))
    }

    pub fn is_incompatible_version(&self) -> bool {
        matches!(self, ConnectionError::IncompatibleVersion { .. })
    }
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
