//! 消息分帧
//!
//! 在任意分片的字节流之上读出完整消息（消息头 + 负载）。
//! 整条消息共享一个截止时间，而不是每次 `receive` 各自计时。

use crate::error::ConnectionError;
use armlink_net::{NetError, Transport};
use armlink_protocol::{HEADER_LEN, MessageHeader, ProtocolError};
use std::time::Instant;

/// 一条完整消息
#[derive(Debug)]
pub(crate) struct Message {
    pub header: MessageHeader,
    pub payload: Vec<u8>,
}

enum Fill {
    Complete,
    /// 对端关闭时已读到的字节数
    Eof(usize),
}

/// 读满 `buf`，或在 EOF 时报告已读字节数
fn fill(
    transport: &mut dyn Transport,
    buf: &mut [u8],
    deadline: Instant,
) -> Result<Fill, NetError> {
    let mut filled = 0;
    while filled < buf.len() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(NetError::Timeout);
        }
        transport.set_receive_timeout(remaining)?;

        let n = transport.receive(&mut buf[filled..])?;
        if n == 0 {
            return Ok(Fill::Eof(filled));
        }
        filled += n;
    }
    Ok(Fill::Complete)
}

/// 读取下一条消息
///
/// # 返回
/// - `Ok(Some(message))`: 一条完整、消息头合法的消息
/// - `Ok(None)`: 对端恰好在消息边界关闭
///
/// # 错误
/// - `Network`: 传输错误或超过 `deadline`
/// - `Protocol`: 消息头非法，或消息中途 EOF（截断）
pub(crate) fn read_message(
    transport: &mut dyn Transport,
    deadline: Instant,
) -> Result<Option<Message>, ConnectionError> {
    let mut raw = [0u8; HEADER_LEN];
    match fill(transport, &mut raw, deadline)? {
        Fill::Complete => {},
        Fill::Eof(0) => return Ok(None),
        Fill::Eof(received) => {
            return Err(ProtocolError::Truncated {
                expected: HEADER_LEN,
                received,
            }
            .into());
        },
    }

    let header = MessageHeader::decode(&raw)?;

    let mut payload = vec![0u8; header.length as usize];
    if let Fill::Eof(received) = fill(transport, &mut payload, deadline)? {
        return Err(ProtocolError::Truncated {
            expected: HEADER_LEN + payload.len(),
            received: HEADER_LEN + received,
        }
        .into());
    }

    Ok(Some(Message { header, payload }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use armlink_net::MockTransport;
    use armlink_net::mock::MockEvent;
    use armlink_protocol::{MessageType, RobotState, encode_shutdown};
    use std::time::Duration;

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(5)
    }

    #[test]
    fn test_read_fragmented_message() {
        let handle = MockTransport::new();
        let mut transport = handle.clone();
        let state = RobotState {
            sequence_number: 3,
            ..Default::default()
        };
        handle.push_chunked(&state.encode(), 7);

        let message = read_message(&mut transport, deadline()).unwrap().unwrap();
        assert_eq!(message.header.msg_type, MessageType::RobotState);
        assert_eq!(RobotState::decode(&message.payload).unwrap(), state);
        assert!(handle.receive_timeout().is_some());
    }

    #[test]
    fn test_eof_at_boundary() {
        let handle = MockTransport::new();
        let mut transport = handle.clone();
        handle.push_bytes(encode_shutdown());
        handle.push_eof();

        let message = read_message(&mut transport, deadline()).unwrap().unwrap();
        assert_eq!(message.header.msg_type, MessageType::Shutdown);
        assert!(message.payload.is_empty());
        assert!(read_message(&mut transport, deadline()).unwrap().is_none());
    }

    #[test]
    fn test_eof_inside_header() {
        let handle = MockTransport::new();
        let mut transport = handle.clone();
        handle.push_bytes(vec![0x83, 0, 0]);
        handle.push_eof();

        match read_message(&mut transport, deadline()) {
            Err(ConnectionError::Protocol(ProtocolError::Truncated { expected, received })) => {
                assert_eq!(expected, HEADER_LEN);
                assert_eq!(received, 3);
            },
            other => panic!("Expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_eof_inside_payload() {
        let handle = MockTransport::new();
        let mut transport = handle.clone();
        let bytes = RobotState::default().encode();
        handle.push_bytes(bytes[..100].to_vec());
        handle.push_eof();

        match read_message(&mut transport, deadline()) {
            Err(ConnectionError::Protocol(ProtocolError::Truncated { expected, received })) => {
                assert_eq!(expected, bytes.len());
                assert_eq!(received, 100);
            },
            other => panic!("Expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_timeout_is_network_error() {
        let handle = MockTransport::new();
        let mut transport = handle.clone();
        handle.push_bytes(RobotState::default().encode()[..20].to_vec());
        handle.push_event(MockEvent::Timeout);

        let err = read_message(&mut transport, deadline()).unwrap_err();
        assert!(matches!(err, ConnectionError::Network(NetError::Timeout)));
    }

    #[test]
    fn test_expired_deadline() {
        let handle = MockTransport::new();
        let mut transport = handle.clone();
        handle.push_bytes(encode_shutdown());

        let err = read_message(&mut transport, Instant::now()).unwrap_err();
        assert!(matches!(err, ConnectionError::Network(NetError::Timeout)));
        // 截止时间已过时不应再读取
        assert_eq!(handle.pending(), 1);
    }
}
