//! 控制器连接
//!
//! 提供对外的 `Connection` 结构体，封装传输、握手和状态同步细节。

use crate::config::ConnectionConfig;
use crate::error::ConnectionError;
use crate::session::read_message;
use armlink_net::{NetError, TcpTransport, Transport};
use armlink_protocol::{
    ConnectReply, ConnectRequest, ConnectStatus, MessageType, ProtocolError, RobotState,
    ServerVersion,
};
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionStatus {
    /// 握手完成，正在接收状态
    Open,
    /// 控制器已干净地关闭会话
    Closed,
    /// 发生过错误，传输已释放
    Failed,
}

/// 与控制器之间的一个会话
///
/// 构造时同步完成握手；之后由单个控制线程反复调用
/// [`wait_for_state`](Self::wait_for_state) 获取状态快照。
///
/// - 不可 `Clone`：会话是唯一的有状态资源
/// - 所有操作都需要 `&mut self`，跨线程使用需由调用方串行化
/// - Drop 时释放传输，关闭失败只记录日志，不会 panic
///
/// # Example
///
/// ```no_run
/// use armlink_driver::Connection;
///
/// let mut connection = Connection::new("172.16.0.2")?;
/// println!("server version: {}", connection.server_version());
///
/// while connection.wait_for_state()? {
///     let state = connection.robot_state();
///     println!("q = {:?}", state.q);
/// }
/// # Ok::<(), armlink_driver::ConnectionError>(())
/// ```
pub struct Connection {
    transport: Box<dyn Transport + Send>,
    config: ConnectionConfig,
    server_version: ServerVersion,
    /// 最近一次交付的快照（只在 `wait_for_state` 成功时整体替换）
    state: RobotState,
    /// 最近一次交付的序号（`None` 表示尚未收到任何状态）
    last_sequence: Option<u64>,
    states_received: u64,
    status: SessionStatus,
    released: bool,
}

impl Connection {
    /// 使用默认配置连接到控制器
    ///
    /// # 参数
    /// - `address`: 控制器的 IP/主机名，可带端口（`host:port`）
    ///
    /// # 错误
    /// - `ConnectionError::Network`: 地址为空/无法解析、连接被拒绝、超时
    /// - `ConnectionError::IncompatibleVersion`: 控制器版本不被支持
    /// - `ConnectionError::Protocol`: 握手响应格式非法
    pub fn new(address: &str) -> Result<Self, ConnectionError> {
        Self::with_config(address, ConnectionConfig::default())
    }

    /// 使用指定配置连接到控制器
    pub fn with_config(address: &str, config: ConnectionConfig) -> Result<Self, ConnectionError> {
        config.validate()?;
        info!("Connecting to controller at {:?}", address);
        let transport = TcpTransport::connect(address, config.port, config.connect_timeout())
            .inspect_err(|e| error!("Failed to connect to {:?}: {}", address, e))?;
        Self::with_transport(transport, config)
    }

    /// 在已建立的传输上完成握手
    ///
    /// 握手失败时传输会被关闭，不会返回半初始化的对象。
    pub fn with_transport(
        transport: impl Transport + Send + 'static,
        config: ConnectionConfig,
    ) -> Result<Self, ConnectionError> {
        config.validate()?;
        let mut connection = Self {
            transport: Box::new(transport),
            config,
            server_version: ServerVersion::default(),
            state: RobotState::default(),
            last_sequence: None,
            states_received: 0,
            status: SessionStatus::Open,
            released: false,
        };
        // 失败时 connection 在此被 drop，传输随之释放
        connection.handshake()?;
        Ok(connection)
    }

    fn handshake(&mut self) -> Result<(), ConnectionError> {
        let peer = self.transport.peer();
        let request = ConnectRequest::new(ServerVersion::COMPATIBLE);
        debug!(
            "Sending connect request to {} (client version {})",
            peer, request.version
        );
        self.transport.send(&request.encode())?;

        let deadline = Instant::now() + self.config.handshake_timeout();
        let message = match read_message(self.transport.as_mut(), deadline)? {
            Some(message) => message,
            None => {
                warn!("Controller {} closed the connection during handshake", peer);
                return Err(NetError::Closed.into());
            },
        };

        if message.header.msg_type == MessageType::Shutdown {
            warn!("Controller {} shut down the session before replying", peer);
            return Err(NetError::Closed.into());
        }
        if message.header.msg_type != MessageType::ConnectReply {
            return Err(ProtocolError::UnexpectedMessage {
                expected: MessageType::ConnectReply,
                actual: message.header.msg_type,
            }
            .into());
        }

        let reply = ConnectReply::decode(&message.payload)?;
        debug!("Connect reply from {}: {:?}", peer, reply);

        if reply.status == ConnectStatus::IncompatibleVersion || !reply.version.is_compatible() {
            warn!(
                "Incompatible controller version at {}: expected {}, received {}",
                peer,
                ServerVersion::COMPATIBLE,
                reply.version
            );
            return Err(ConnectionError::IncompatibleVersion {
                expected: ServerVersion::COMPATIBLE,
                received: reply.version,
            });
        }

        self.server_version = reply.version;
        info!(
            "Connected to controller {} (server version {})",
            peer, self.server_version
        );
        Ok(())
    }

    /// 阻塞直到新状态到达
    ///
    /// # 返回
    /// - `Ok(true)`: 新快照已可通过 [`robot_state`](Self::robot_state) 读取
    /// - `Ok(false)`: 控制器干净地关闭了会话；之后每次调用都返回 `Ok(false)`
    ///
    /// # 错误
    /// - `ConnectionError::Network`: 传输丢失或超过 `state_timeout_ms`
    /// - `ConnectionError::Protocol`: 数据非法、截断，或序号不连续（丢失/重复/乱序）
    ///
    /// 出错后传输被释放，之后每次调用都返回 `Network(NetError::Closed)`。
    pub fn wait_for_state(&mut self) -> Result<bool, ConnectionError> {
        match self.status {
            SessionStatus::Open => {},
            SessionStatus::Closed => return Ok(false),
            SessionStatus::Failed => return Err(NetError::Closed.into()),
        }

        match self.receive_state() {
            Ok(Some(state)) => {
                trace!("Received robot state #{}", state.sequence_number);
                self.last_sequence = Some(state.sequence_number);
                self.states_received += 1;
                self.state = state;
                Ok(true)
            },
            Ok(None) => {
                info!(
                    "Controller closed the connection cleanly after {} states",
                    self.states_received
                );
                self.status = SessionStatus::Closed;
                self.release();
                Ok(false)
            },
            Err(e) => {
                match &e {
                    ConnectionError::Protocol(_) => warn!("Protocol violation: {}", e),
                    _ => error!("Connection lost: {}", e),
                }
                self.status = SessionStatus::Failed;
                self.release();
                Err(e)
            },
        }
    }

    /// 读取并校验下一个状态；`Ok(None)` 表示干净关闭
    fn receive_state(&mut self) -> Result<Option<RobotState>, ConnectionError> {
        let deadline = Instant::now() + self.config.state_timeout();
        let Some(message) = read_message(self.transport.as_mut(), deadline)? else {
            return Ok(None);
        };

        match message.header.msg_type {
            MessageType::Shutdown => Ok(None),
            MessageType::RobotState => {
                let state = RobotState::decode(&message.payload)?;
                if let Some(last) = self.last_sequence {
                    let expected = last.wrapping_add(1);
                    if state.sequence_number != expected {
                        return Err(ProtocolError::SequenceGap {
                            expected,
                            actual: state.sequence_number,
                        }
                        .into());
                    }
                }
                Ok(Some(state))
            },
            other => Err(ProtocolError::UnexpectedMessage {
                expected: MessageType::RobotState,
                actual: other,
            }
            .into()),
        }
    }

    /// 循环接收状态并交给回调，直到回调返回 `false` 或会话关闭
    ///
    /// 错误直接返回给调用方，不做任何本地恢复。
    pub fn read<F>(&mut self, mut callback: F) -> Result<(), ConnectionError>
    where
        F: FnMut(&RobotState) -> bool,
    {
        while self.wait_for_state()? {
            if !callback(&self.state) {
                break;
            }
        }
        Ok(())
    }

    /// 最近一次交付的状态快照
    ///
    /// 只在 `wait_for_state` 返回 `Ok(true)` 时更新；首次成功之前为 `RobotState::default()`。
    pub fn robot_state(&self) -> &RobotState {
        &self.state
    }

    /// 握手时控制器报告的版本
    pub fn server_version(&self) -> ServerVersion {
        self.server_version
    }

    /// 已交付的状态数
    pub fn states_received(&self) -> u64 {
        self.states_received
    }

    /// 控制器是否已干净地关闭会话
    pub fn is_closed(&self) -> bool {
        self.status == SessionStatus::Closed
    }

    /// 当前使用的配置
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.transport.close() {
            warn!("Failed to close transport: {}", e);
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("peer", &self.transport.peer())
            .field("server_version", &self.server_version)
            .field("status", &self.status)
            .field("states_received", &self.states_received)
            .finish()
    }
}
