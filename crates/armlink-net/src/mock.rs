//! 内存中的脚本化传输（测试用）
//!
//! 测试代码持有一个克隆，按顺序压入控制器"发出"的字节和事件；
//! 另一个克隆交给被测对象。两者共享同一份内部状态。

use crate::{NetError, Transport};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// 脚本事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// 一段可读字节（可能被多次 `receive` 分批读走）
    Data(Vec<u8>),
    /// 下一次 `receive` 超时
    Timeout,
    /// 下一次 `receive` 报告连接被重置
    Reset,
    /// 对端关闭（此后所有 `receive` 都返回 0）
    Eof,
}

#[derive(Debug, Default)]
struct MockInner {
    incoming: VecDeque<MockEvent>,
    sent: Vec<u8>,
    receive_timeout: Option<Duration>,
    close_count: usize,
    closed: bool,
}

/// 脚本化传输
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockInner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        // 测试线程 panic 后仍允许读取记录
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 压入一段字节
    pub fn push_bytes(&self, bytes: impl Into<Vec<u8>>) {
        self.lock().incoming.push_back(MockEvent::Data(bytes.into()));
    }

    /// 以固定块大小拆分后压入（模拟 TCP 分片）
    pub fn push_chunked(&self, bytes: &[u8], chunk: usize) {
        let mut inner = self.lock();
        for part in bytes.chunks(chunk.max(1)) {
            inner.incoming.push_back(MockEvent::Data(part.to_vec()));
        }
    }

    pub fn push_event(&self, event: MockEvent) {
        self.lock().incoming.push_back(event);
    }

    pub fn push_eof(&self) {
        self.push_event(MockEvent::Eof);
    }

    /// 至今被发送的全部字节
    pub fn sent(&self) -> Vec<u8> {
        self.lock().sent.clone()
    }

    /// 最近一次设置的接收超时
    pub fn receive_timeout(&self) -> Option<Duration> {
        self.lock().receive_timeout
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// `close()` 被调用的次数
    pub fn close_count(&self) -> usize {
        self.lock().close_count
    }

    /// 尚未被读走的事件数
    pub fn pending(&self) -> usize {
        self.lock().incoming.len()
    }
}

impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> Result<(), NetError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(NetError::Closed);
        }
        inner.sent.extend_from_slice(data);
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, NetError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(NetError::Closed);
        }
        match inner.incoming.pop_front() {
            Some(MockEvent::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    let rest = data.split_off(n);
                    inner.incoming.push_front(MockEvent::Data(rest));
                }
                Ok(n)
            },
            Some(MockEvent::Timeout) => Err(NetError::Timeout),
            Some(MockEvent::Reset) => Err(NetError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "mock connection reset",
            ))),
            Some(MockEvent::Eof) => {
                inner.incoming.push_front(MockEvent::Eof);
                Ok(0)
            },
            // 脚本耗尽：表现为对端沉默
            None => Err(NetError::Timeout),
        }
    }

    fn set_receive_timeout(&mut self, timeout: Duration) -> Result<(), NetError> {
        self.lock().receive_timeout = Some(timeout);
        Ok(())
    }

    fn close(&mut self) -> Result<(), NetError> {
        let mut inner = self.lock();
        inner.close_count += 1;
        inner.closed = true;
        Ok(())
    }

    fn peer(&self) -> String {
        "mock".to_string()
    }
}
