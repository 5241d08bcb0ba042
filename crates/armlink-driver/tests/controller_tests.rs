//! 真实 TCP 连接测试
//!
//! 在本地 TcpListener 上运行一个脚本化的控制器线程，验证端到端的握手、
//! 状态交付、超时与中止后的日志导出。

use armlink_driver::{Connection, ConnectionConfig, ConnectionError, NetError, ProtocolError};
use armlink_protocol::{
    ConnectReply, ConnectRequest, ConnectStatus, HEADER_LEN, MessageHeader, MessageType,
    RobotState, ServerVersion, encode_shutdown,
};
use armlink_tools::{ControlError, Logger, RobotCommand, log_to_csv};
use crossbeam_channel::{Receiver, Sender, bounded};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

fn test_config() -> ConnectionConfig {
    ConnectionConfig {
        connect_timeout_ms: 500,
        handshake_timeout_ms: 1000,
        state_timeout_ms: 500,
        ..Default::default()
    }
}

fn state(seq: u64) -> RobotState {
    let mut state = RobotState {
        sequence_number: seq,
        ..Default::default()
    };
    state.q = [0.0, -0.785, 0.0, -2.356, 0.0, 1.571, 0.785];
    state.q[0] = seq as f64 * 0.001;
    state
}

/// 读取并解析客户端的握手请求
fn read_request(stream: &mut TcpStream) -> ConnectRequest {
    let mut raw = [0u8; HEADER_LEN];
    stream.read_exact(&mut raw).unwrap();
    let header = MessageHeader::decode(&raw).unwrap();
    assert_eq!(header.msg_type, MessageType::ConnectRequest);
    let mut payload = vec![0u8; header.length as usize];
    stream.read_exact(&mut payload).unwrap();
    ConnectRequest::decode(&payload).unwrap()
}

/// 启动一个只接受一个连接的控制器
///
/// 返回（地址, 收到的握手请求版本, 线程句柄）
fn spawn_controller<F>(script: F) -> (String, Receiver<ServerVersion>, JoinHandle<()>)
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let (version_tx, version_rx): (Sender<ServerVersion>, Receiver<ServerVersion>) = bounded(1);

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        let _ = version_tx.send(request.version);
        script(stream);
    });

    (addr, version_rx, handle)
}

fn send_reply(stream: &mut TcpStream, status: ConnectStatus, version: u16) {
    stream
        .write_all(&ConnectReply::new(status, ServerVersion(version)).encode())
        .unwrap();
}

#[test]
fn test_no_listener_is_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = Connection::with_config(&format!("127.0.0.1:{}", port), test_config()).unwrap_err();
    assert!(err.is_network(), "{:?}", err);
    assert!(!err.is_protocol());
}

#[test]
fn test_empty_address_is_network_error() {
    let err = Connection::new("").unwrap_err();
    assert!(matches!(
        err,
        ConnectionError::Network(NetError::InvalidAddress(_))
    ));
}

#[test]
fn test_unresolvable_host_is_network_error() {
    let err = Connection::with_config("no-such-host.invalid", test_config()).unwrap_err();
    assert!(err.is_network(), "{:?}", err);
}

#[test]
fn test_incompatible_version_over_tcp() {
    let (addr, version_rx, handle) = spawn_controller(|mut stream| {
        send_reply(&mut stream, ConnectStatus::IncompatibleVersion, 4);
    });

    match Connection::with_config(&addr, test_config()) {
        Err(ConnectionError::IncompatibleVersion { expected, received }) => {
            assert_eq!(expected, ServerVersion(1));
            assert_eq!(received, ServerVersion(4));
        },
        other => panic!("Expected IncompatibleVersion, got {:?}", other),
    }
    assert_eq!(version_rx.recv().unwrap(), ServerVersion::COMPATIBLE);
    handle.join().unwrap();
}

#[test]
fn test_full_session_with_clean_shutdown() {
    let (addr, _version_rx, handle) = spawn_controller(|mut stream| {
        send_reply(&mut stream, ConnectStatus::Success, 1);
        for seq in 0..5 {
            stream.write_all(&state(seq).encode()).unwrap();
        }
        stream.write_all(&encode_shutdown()).unwrap();
    });

    let mut connection = Connection::with_config(&addr, test_config()).unwrap();
    assert_eq!(connection.server_version(), ServerVersion(1));

    let mut logger = Logger::new(100);
    let mut received = Vec::new();
    while connection.wait_for_state().unwrap() {
        let state = connection.robot_state();
        received.push(state.sequence_number);
        logger.log(state, RobotCommand::default());
    }
    assert_eq!(received, vec![0, 1, 2, 3, 4]);
    assert!(!connection.wait_for_state().unwrap());
    handle.join().unwrap();

    let csv = log_to_csv(&logger.flush());
    assert_eq!(csv.lines().count(), 6);
}

#[test]
fn test_hostname_with_port() {
    let (addr, _version_rx, handle) = spawn_controller(|mut stream| {
        send_reply(&mut stream, ConnectStatus::Success, 1);
    });
    let port = addr.rsplit_once(':').unwrap().1;

    let mut connection =
        Connection::with_config(&format!("localhost:{}", port), test_config()).unwrap();
    handle.join().unwrap();
    // 控制器线程退出后 socket 关闭：消息边界 EOF 即干净关闭
    assert!(!connection.wait_for_state().unwrap());
}

#[test]
fn test_default_port_from_config() {
    let (addr, _version_rx, handle) = spawn_controller(|mut stream| {
        send_reply(&mut stream, ConnectStatus::Success, 1);
    });
    let port: u16 = addr.rsplit_once(':').unwrap().1.parse().unwrap();

    let config = ConnectionConfig {
        port,
        ..test_config()
    };
    let connection = Connection::with_config("127.0.0.1", config).unwrap();
    assert_eq!(connection.server_version(), ServerVersion(1));
    handle.join().unwrap();
}

#[test]
fn test_stalled_controller_times_out() {
    let (done_tx, done_rx) = bounded::<()>(1);
    let (addr, _version_rx, handle) = spawn_controller(move |mut stream| {
        send_reply(&mut stream, ConnectStatus::Success, 1);
        stream.write_all(&state(0).encode()).unwrap();
        // 保持连接但不再发送，直到测试结束
        let _ = done_rx.recv();
    });

    let config = ConnectionConfig {
        state_timeout_ms: 100,
        ..test_config()
    };
    let mut connection = Connection::with_config(&addr, config).unwrap();
    assert!(connection.wait_for_state().unwrap());

    let start = Instant::now();
    let err = connection.wait_for_state().unwrap_err();
    assert!(matches!(err, ConnectionError::Network(NetError::Timeout)));
    assert!(start.elapsed() >= Duration::from_millis(90));

    done_tx.send(()).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_controller_dies_mid_state() {
    let (addr, _version_rx, handle) = spawn_controller(|mut stream| {
        send_reply(&mut stream, ConnectStatus::Success, 1);
        stream.write_all(&state(0).encode()).unwrap();
        let partial = state(1).encode();
        stream.write_all(&partial[..200]).unwrap();
    });

    let mut connection = Connection::with_config(&addr, test_config()).unwrap();
    assert!(connection.wait_for_state().unwrap());
    handle.join().unwrap();

    let err = connection.wait_for_state().unwrap_err();
    assert!(matches!(
        err,
        ConnectionError::Protocol(ProtocolError::Truncated { .. })
    ));
    assert_eq!(connection.robot_state(), &state(0));
}

/// 控制循环中止后导出诊断日志
#[test]
fn test_aborted_control_loop_produces_csv() {
    let (addr, _version_rx, handle) = spawn_controller(|mut stream| {
        send_reply(&mut stream, ConnectStatus::Success, 1);
        for seq in [0, 1, 2, 4] {
            stream.write_all(&state(seq).encode()).unwrap();
        }
    });

    let mut connection = Connection::with_config(&addr, test_config()).unwrap();
    let mut logger = Logger::default();

    let result = connection.read(|state| {
        let mut command = RobotCommand::default();
        command.joint_positions.q = state.q;
        logger.log(state, command);
        true
    });

    let err = result.unwrap_err();
    assert!(err.is_protocol());
    let failure = ControlError::with_logger(err.to_string(), &mut logger);
    assert!(failure.message.contains("Sequence gap"));

    let csv = failure.log_csv();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("state.sequence_number,"));
    assert!(lines[3].starts_with("2,"));

    handle.join().unwrap();
}
