//! 消息头与握手消息
//!
//! 所有消息都以 8 字节消息头开始，负载长度对每种消息类型是固定的，
//! 解码时严格校验（长度不符即视为协议错误，不做容错）。

use crate::state::ROBOT_STATE_PAYLOAD_LEN;
use crate::version::ServerVersion;
use crate::ProtocolError;
use bytes::{Buf, BufMut};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 消息头长度（字节）
pub const HEADER_LEN: usize = 8;

/// 允许的最大负载长度（字节）
pub const MAX_PAYLOAD_LEN: u32 = 4096;

/// 控制器默认 TCP 端口
pub const DEFAULT_PORT: u16 = 1337;

// ============================================================================
// Message Types
// ============================================================================

/// 消息类型枚举
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum MessageType {
    // 客户端 → 控制器
    ConnectRequest = 0x01, // 版本/身份请求

    // 控制器 → 客户端
    ConnectReply = 0x81, // 版本响应
    Shutdown = 0x82,     // 控制器主动、干净地关闭会话
    RobotState = 0x83,   // 一个控制周期的状态快照
}

impl MessageType {
    /// 该类型消息负载的固定长度
    pub fn payload_len(self) -> usize {
        match self {
            MessageType::ConnectRequest => ConnectRequest::PAYLOAD_LEN,
            MessageType::ConnectReply => ConnectReply::PAYLOAD_LEN,
            MessageType::Shutdown => 0,
            MessageType::RobotState => ROBOT_STATE_PAYLOAD_LEN,
        }
    }
}

// ============================================================================
// Message Header
// ============================================================================

/// 消息头（8 字节）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub msg_type: MessageType,
    /// 负载长度（不含消息头）
    pub length: u32,
}

impl MessageHeader {
    /// 为指定类型创建消息头，负载长度取该类型的固定长度
    pub fn new(msg_type: MessageType) -> Self {
        Self {
            msg_type,
            length: msg_type.payload_len() as u32,
        }
    }

    /// 编码消息头
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.msg_type.into());
        buf.put_u8(0); // flags
        buf.put_u16_le(0); // reserved
        buf.put_u32_le(self.length);
    }

    /// 解码消息头
    ///
    /// 同时校验 flags/reserved 为 0，且负载长度与消息类型匹配。
    pub fn decode(raw: &[u8; HEADER_LEN]) -> Result<Self, ProtocolError> {
        let mut buf = &raw[..];
        let raw_type = buf.get_u8();
        let flags = buf.get_u8();
        let reserved = buf.get_u16_le();
        let length = buf.get_u32_le();

        let msg_type = MessageType::try_from(raw_type)
            .map_err(|_| ProtocolError::UnknownMessageType(raw_type))?;

        if flags != 0 {
            return Err(ProtocolError::InvalidValue {
                field: "header.flags",
                value: flags as u64,
            });
        }
        if reserved != 0 {
            return Err(ProtocolError::InvalidValue {
                field: "header.reserved",
                value: reserved as u64,
            });
        }
        if length > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::PayloadTooLarge {
                length,
                max: MAX_PAYLOAD_LEN,
            });
        }

        let expected = msg_type.payload_len();
        if length as usize != expected {
            return Err(ProtocolError::InvalidLength {
                msg_type,
                expected,
                actual: length as usize,
            });
        }

        Ok(Self { msg_type, length })
    }
}

/// 校验负载长度（内部工具函数）
pub(crate) fn check_payload_len(
    msg_type: MessageType,
    payload: &[u8],
) -> Result<(), ProtocolError> {
    let expected = msg_type.payload_len();
    if payload.len() != expected {
        return Err(ProtocolError::InvalidLength {
            msg_type,
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

// ============================================================================
// Handshake
// ============================================================================

/// 握手请求：客户端声明自己支持的协议版本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectRequest {
    pub version: ServerVersion,
}

impl ConnectRequest {
    pub const PAYLOAD_LEN: usize = 4;

    pub fn new(version: ServerVersion) -> Self {
        Self { version }
    }

    /// 编码为完整消息（消息头 + 负载）
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + Self::PAYLOAD_LEN);
        MessageHeader::new(MessageType::ConnectRequest).encode(&mut buf);
        buf.put_u16_le(self.version.get());
        buf.put_u16_le(0);
        buf
    }

    /// 从负载解码
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        check_payload_len(MessageType::ConnectRequest, payload)?;
        let mut buf = payload;
        let version = ServerVersion(buf.get_u16_le());
        let reserved = buf.get_u16_le();
        if reserved != 0 {
            return Err(ProtocolError::InvalidValue {
                field: "connect_request.reserved",
                value: reserved as u64,
            });
        }
        Ok(Self { version })
    }
}

/// 握手结果
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum ConnectStatus {
    Success = 0,
    IncompatibleVersion = 1,
}

/// 握手响应：控制器的结论与其自身版本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectReply {
    pub status: ConnectStatus,
    pub version: ServerVersion,
}

impl ConnectReply {
    pub const PAYLOAD_LEN: usize = 4;

    pub fn new(status: ConnectStatus, version: ServerVersion) -> Self {
        Self { status, version }
    }

    /// 编码为完整消息（消息头 + 负载）
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + Self::PAYLOAD_LEN);
        MessageHeader::new(MessageType::ConnectReply).encode(&mut buf);
        buf.put_u8(self.status.into());
        buf.put_u8(0);
        buf.put_u16_le(self.version.get());
        buf
    }

    /// 从负载解码
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        check_payload_len(MessageType::ConnectReply, payload)?;
        let mut buf = payload;
        let raw_status = buf.get_u8();
        let reserved = buf.get_u8();
        let version = ServerVersion(buf.get_u16_le());

        let status =
            ConnectStatus::try_from(raw_status).map_err(|_| ProtocolError::InvalidValue {
                field: "connect_reply.status",
                value: raw_status as u64,
            })?;
        if reserved != 0 {
            return Err(ProtocolError::InvalidValue {
                field: "connect_reply.reserved",
                value: reserved as u64,
            });
        }

        Ok(Self { status, version })
    }
}

/// 编码 Shutdown 消息（无负载）
pub fn encode_shutdown() -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN);
    MessageHeader::new(MessageType::Shutdown).encode(&mut buf);
    buf
}
