//! Traits for abstracting over physical transports.
use crate::error::Result;
use async_trait::async_trait;
use tokio::net::UdpSocket;

/// A datagram transport that may lose or damage frames.
///
/// Each call carries exactly one frame. Implementations do not need to be
/// reliable; the link layer above them is.
///
/// 可能丢失或损坏帧的数据报传输。每次调用恰好携带一个帧。实现无需可靠，其上的
/// 链路层负责可靠性。
#[async_trait]
pub trait PhysicalLayer: Send + Sync + 'static {
    /// Sends one frame.
    /// 发送一个帧。
    async fn send_frame(&self, frame: &[u8]) -> Result<()>;

    /// Receives one frame into `buf` and returns its length.
    /// 接收一个帧到 `buf` 并返回其长度。
    async fn recv_frame(&self, buf: &mut [u8]) -> Result<usize>;
}

/// A connected UDP socket carries one link.
#[async_trait]
impl PhysicalLayer for UdpSocket {
    async fn send_frame(&self, frame: &[u8]) -> Result<()> {
        UdpSocket::send(self, frame).await?;
        Ok(())
    }

    async fn recv_frame(&self, buf: &mut [u8]) -> Result<usize> {
        UdpSocket::recv(self, buf).await.map_err(Into::into)
    }
}
