//! The user-facing API of a running link.

use crate::{
    core::endpoint::LinkStats,
    error::{Error, Result},
};
use bytes::Bytes;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::debug;

/// A handle to a link running on its own task.
///
/// Packets passed to [`send`](Self::send) are queued until the link admits
/// them; [`recv`](Self::recv) yields the peer's packets in order, each exactly
/// once.
///
/// 运行在独立任务上的链路的句柄。传给 [`send`](Self::send) 的数据包会排队直到
/// 链路接纳它们；[`recv`](Self::recv) 按序、且恰好一次地产出对端的数据包。
#[derive(Debug)]
pub struct LinkHandle {
    tx: mpsc::Sender<Bytes>,
    rx: mpsc::Receiver<Bytes>,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<LinkStats>,
    max_payload: usize,
}

impl LinkHandle {
    pub(crate) fn new(
        tx: mpsc::Sender<Bytes>,
        rx: mpsc::Receiver<Bytes>,
        shutdown_tx: oneshot::Sender<()>,
        task: JoinHandle<LinkStats>,
        max_payload: usize,
    ) -> Self {
        Self {
            tx,
            rx,
            shutdown_tx,
            task,
            max_payload,
        }
    }

    /// Largest packet [`send`](Self::send) accepts.
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    /// Queues one packet for transmission.
    ///
    /// Waits while the queue is full. Fails with [`Error::PayloadTooLarge`]
    /// for oversized packets and with [`Error::ChannelClosed`] once the link
    /// has stopped.
    ///
    /// 将一个数据包排队等待发送。队列满时等待。超大数据包返回
    /// [`Error::PayloadTooLarge`]，链路停止后返回 [`Error::ChannelClosed`]。
    pub async fn send(&self, packet: impl Into<Bytes>) -> Result<()> {
        let packet = packet.into();
        if packet.len() > self.max_payload {
            return Err(Error::PayloadTooLarge {
                len: packet.len(),
                max: self.max_payload,
            });
        }
        self.tx.send(packet).await.map_err(|_| Error::ChannelClosed)
    }

    /// Receives the next packet from the peer, or `None` once the link has
    /// stopped and everything delivered has been read.
    ///
    /// 接收对端的下一个数据包；链路停止且已读完全部交付数据后返回 `None`。
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Stops the link and returns its counters.
    ///
    /// Frames still unacknowledged are abandoned.
    ///
    /// 停止链路并返回其计数器。仍未确认的帧被放弃。
    pub async fn shutdown(self) -> Result<LinkStats> {
        debug!("Shutdown requested");
        // The task may already have stopped on its own.
        let _ = self.shutdown_tx.send(());
        self.task.await.map_err(|_| Error::ChannelClosed)
    }
}
