//! # Armlink Transport Layer
//!
//! 传输抽象层：为会话提供 connect/send/receive/close 原语。
//! 帧格式、握手和超时策略都在上层（`armlink-driver`）实现。

use std::io;
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::time::Duration;
use thiserror::Error;

pub mod tcp;

pub use tcp::TcpTransport;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum NetError {
    #[error("IO Error: {0}")]
    Io(#[source] io::Error),
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),
    #[error("Failed to resolve {address}: {reason}")]
    Resolve { address: String, reason: String },
    #[error("Timeout")]
    Timeout,
    #[error("Connection closed")]
    Closed,
}

impl NetError {
    /// 超时类错误（调用方可据此区分"对端沉默"和"链路故障"）
    pub fn is_timeout(&self) -> bool {
        matches!(self, NetError::Timeout)
    }
}

impl From<io::Error> for NetError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            // 阻塞 socket 上的读超时在不同平台分别报告为 WouldBlock / TimedOut
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => NetError::Timeout,
            _ => NetError::Io(e),
        }
    }
}

/// 会话所需的最小传输原语
///
/// 实现者独占底层资源（socket 等），不支持并发调用。
pub trait Transport {
    /// 发送全部字节
    fn send(&mut self, data: &[u8]) -> Result<(), NetError>;

    /// 接收最多 `buf.len()` 字节
    ///
    /// 返回 `Ok(0)` 表示对端已关闭写方向（EOF）。
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, NetError>;

    /// 设置单次 `receive` 的超时
    ///
    /// 超时后 `receive` 必须返回 [`NetError::Timeout`]，会话的等待截止时间依赖于此。
    fn set_receive_timeout(&mut self, timeout: Duration) -> Result<(), NetError>;

    /// 释放底层资源；重复调用是无害的
    fn close(&mut self) -> Result<(), NetError>;

    /// 对端描述（仅用于日志）
    fn peer(&self) -> String {
        "unknown".to_string()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, data: &[u8]) -> Result<(), NetError> {
        (**self).send(data)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, NetError> {
        (**self).receive(buf)
    }

    fn set_receive_timeout(&mut self, timeout: Duration) -> Result<(), NetError> {
        (**self).set_receive_timeout(timeout)
    }

    fn close(&mut self) -> Result<(), NetError> {
        (**self).close()
    }

    fn peer(&self) -> String {
        (**self).peer()
    }
}

/// 解析 `host` 或 `host:port` 形式的地址
///
/// 未给出端口时使用 `default_port`。IPv6 地址带端口时需写成 `[::1]:1337`。
pub fn resolve_address(address: &str, default_port: u16) -> Result<Vec<SocketAddr>, NetError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(NetError::InvalidAddress(address.to_string()));
    }

    if let Ok(addr) = address.parse::<SocketAddr>() {
        return Ok(vec![addr]);
    }
    let bare = address
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(address);
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return Ok(vec![SocketAddr::new(ip, default_port)]);
    }

    let (host, port) = match address.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| NetError::InvalidAddress(address.to_string()))?;
            if host.is_empty() || host.contains(':') {
                return Err(NetError::InvalidAddress(address.to_string()));
            }
            (host, port)
        },
        None => (address, default_port),
    };

    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|e| NetError::Resolve {
            address: address.to_string(),
            reason: e.to_string(),
        })?
        .collect();

    if addrs.is_empty() {
        return Err(NetError::Resolve {
            address: address.to_string(),
            reason: "no addresses found".to_string(),
        });
    }
    Ok(addrs)
}
