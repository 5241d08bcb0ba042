//! 服务端协议版本

use std::fmt;

/// 控制器报告的协议版本（不透明的 16 位无符号数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ServerVersion(pub u16);

impl ServerVersion {
    /// 本客户端构建所支持的唯一版本
    pub const COMPATIBLE: ServerVersion = ServerVersion(1);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// 是否可被本客户端构建使用
    pub fn is_compatible(self) -> bool {
        self == Self::COMPATIBLE
    }
}

impl From<u16> for ServerVersion {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<ServerVersion> for u16 {
    fn from(version: ServerVersion) -> Self {
        version.0
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
