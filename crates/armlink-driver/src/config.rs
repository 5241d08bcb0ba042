//! 连接配置

use crate::error::ConfigError;
use armlink_protocol::DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 连接配置
///
/// 控制连接建立、握手和状态等待的超时。
///
/// # Example
///
/// ```
/// use armlink_driver::ConnectionConfig;
///
/// // 默认：端口 1337，连接 1s，握手 5s，状态 1s
/// let config = ConnectionConfig::default();
///
/// // 从 TOML 加载（未给出的字段使用默认值）
/// let config = ConnectionConfig::from_toml_str("state_timeout_ms = 100").unwrap();
/// assert_eq!(config.state_timeout_ms, 100);
/// assert_eq!(config.port, 1337);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// 地址中未带端口时使用的 TCP 端口
    pub port: u16,
    /// TCP 连接超时（毫秒）
    pub connect_timeout_ms: u64,
    /// 等待握手响应的超时（毫秒）
    pub handshake_timeout_ms: u64,
    /// 等待一个完整状态消息的超时（毫秒）
    ///
    /// 控制器以固定周期推送状态，超过此时间未收到完整消息即视为链路丢失。
    pub state_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            connect_timeout_ms: 1000,
            handshake_timeout_ms: 5000,
            state_timeout_ms: 1000,
        }
    }
}

impl ConnectionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn state_timeout(&self) -> Duration {
        Duration::from_millis(self.state_timeout_ms)
    }

    /// 校验配置（所有超时必须为正）
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("handshake_timeout_ms", self.handshake_timeout_ms),
            ("state_timeout_ms", self.state_timeout_ms),
        ];
        for (field, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "timeout must be greater than zero".to_string(),
                });
            }
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid {
                field: "port",
                reason: "port must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ConnectionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
