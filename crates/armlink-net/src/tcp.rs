//! TCP 传输实现

use crate::{NetError, Transport, resolve_address};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;
use tracing::{debug, trace};

/// 基于阻塞 `TcpStream` 的传输
///
/// 读超时通过 `set_read_timeout` 实现，超时映射为 [`NetError::Timeout`]。
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
    closed: bool,
}

impl TcpTransport {
    /// 连接到控制器
    ///
    /// # 参数
    /// - `address`: `host` 或 `host:port`
    /// - `default_port`: 地址未带端口时使用
    /// - `connect_timeout`: 每个解析出的地址的连接超时
    ///
    /// # 错误
    /// - `NetError::InvalidAddress`: 地址为空或端口非法
    /// - `NetError::Resolve`: 主机名无法解析
    /// - `NetError::Timeout` / `NetError::Io`: 所有地址都连接失败（返回最后一个错误）
    pub fn connect(
        address: &str,
        default_port: u16,
        connect_timeout: Duration,
    ) -> Result<Self, NetError> {
        let addrs = resolve_address(address, default_port)?;

        let mut last_err = None;
        for addr in &addrs {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    debug!("TCP connected to {}", addr);
                    return Ok(Self {
                        stream,
                        peer: *addr,
                        closed: false,
                    });
                },
                Err(e) => {
                    debug!("TCP connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                },
            }
        }

        Err(last_err
            .map(NetError::from)
            .unwrap_or_else(|| NetError::Resolve {
                address: address.to_string(),
                reason: "no addresses found".to_string(),
            }))
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, data: &[u8]) -> Result<(), NetError> {
        if self.closed {
            return Err(NetError::Closed);
        }
        self.stream.write_all(data)?;
        trace!("TCP sent {} bytes", data.len());
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, NetError> {
        if self.closed {
            return Err(NetError::Closed);
        }
        loop {
            match self.stream.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn set_receive_timeout(&mut self, timeout: Duration) -> Result<(), NetError> {
        // set_read_timeout(Some(0)) 会报错，零超时由配置校验拦截
        self.stream.set_read_timeout(Some(timeout))?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), NetError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // 对端已先行断开
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(NetError::Io(e)),
        }
    }

    fn peer(&self) -> String {
        self.peer.to_string()
    }
}
