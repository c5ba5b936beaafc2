//! An in-memory physical layer with configurable impairments.
//!
//! [`LossyChannel::pair`] returns two connected [`LossyEndpoint`]s. Frames
//! travel in order; each one may be dropped, damaged by a single bit flip, or
//! delivered twice, as decided by a seeded RNG so runs are reproducible.
//!
//! 带可配置损伤的内存物理层。[`LossyChannel::pair`] 返回两个相连的端点。帧按序
//! 传输；每个帧可能被丢弃、被单比特翻转损坏或被重复交付，由带种子的随机数生成器
//! 决定，因此运行可复现。

use crate::{
    error::{Error, Result},
    link::PhysicalLayer,
};
use async_trait::async_trait;
use bytes::Bytes;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Mutex;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tracing::trace;

/// Impairments applied to every frame sent through a [`LossyEndpoint`].
///
/// Rates are probabilities in `0.0..=1.0`; anything else counts as zero.
///
/// 应用于经由 [`LossyEndpoint`] 发送的每个帧的损伤。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossModel {
    pub loss_rate: f64,
    pub corruption_rate: f64,
    pub duplication_rate: f64,
    pub seed: u64,
}

impl LossModel {
    /// A perfect wire.
    pub fn lossless() -> Self {
        Self {
            loss_rate: 0.0,
            corruption_rate: 0.0,
            duplication_rate: 0.0,
            seed: 0,
        }
    }

    pub fn with_loss(mut self, rate: f64) -> Self {
        self.loss_rate = rate;
        self
    }

    pub fn with_corruption(mut self, rate: f64) -> Self {
        self.corruption_rate = rate;
        self
    }

    pub fn with_duplication(mut self, rate: f64) -> Self {
        self.duplication_rate = rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for LossModel {
    fn default() -> Self {
        Self::lossless()
    }
}

fn probability(rate: f64) -> f64 {
    if (0.0..=1.0).contains(&rate) { rate } else { 0.0 }
}

/// Factory for connected endpoint pairs.
pub struct LossyChannel;

impl LossyChannel {
    /// Creates two endpoints wired to each other. Both directions use
    /// `model`, with independent RNG streams.
    ///
    /// 创建两个互相连接的端点。两个方向都使用 `model`，随机数流相互独立。
    pub fn pair(model: LossModel) -> (LossyEndpoint, LossyEndpoint) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        let a = LossyEndpoint::new(model, model.seed, a_tx, a_rx);
        let b = LossyEndpoint::new(model, model.seed.wrapping_add(1), b_tx, b_rx);
        (a, b)
    }
}

/// One side of a [`LossyChannel`].
#[derive(Debug)]
pub struct LossyEndpoint {
    model: LossModel,
    tx: mpsc::UnboundedSender<Bytes>,
    rx: AsyncMutex<mpsc::UnboundedReceiver<Bytes>>,
    rng: Mutex<StdRng>,
}

impl LossyEndpoint {
    fn new(
        model: LossModel,
        seed: u64,
        tx: mpsc::UnboundedSender<Bytes>,
        rx: mpsc::UnboundedReceiver<Bytes>,
    ) -> Self {
        Self {
            model,
            tx,
            rx: AsyncMutex::new(rx),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Applies the loss model to one frame and returns the copies that make
    /// it onto the wire.
    fn impair(&self, frame: &[u8]) -> Vec<Bytes> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if rng.random_bool(probability(self.model.loss_rate)) {
            trace!(len = frame.len(), "Simulated loss");
            return Vec::new();
        }
        let mut bytes = frame.to_vec();
        if !bytes.is_empty() && rng.random_bool(probability(self.model.corruption_rate)) {
            let bit = rng.random_range(0..bytes.len() * 8);
            bytes[bit / 8] ^= 1 << (bit % 8);
            trace!(bit, "Simulated corruption");
        }
        let bytes = Bytes::from(bytes);
        if rng.random_bool(probability(self.model.duplication_rate)) {
            trace!(len = bytes.len(), "Simulated duplication");
            vec![bytes.clone(), bytes]
        } else {
            vec![bytes]
        }
    }
}

#[async_trait]
impl PhysicalLayer for LossyEndpoint {
    async fn send_frame(&self, frame: &[u8]) -> Result<()> {
        for copy in self.impair(frame) {
            if self.tx.send(copy).is_err() {
                // Nobody is listening on the other end; the frame is lost.
                trace!("Peer endpoint dropped");
                break;
            }
        }
        Ok(())
    }

    async fn recv_frame(&self, buf: &mut [u8]) -> Result<usize> {
        let frame = self.rx.lock().await.recv().await.ok_or(Error::ChannelClosed)?;
        let len = frame.len().min(buf.len());
        buf[..len].copy_from_slice(&frame[..len]);
        Ok(len)
    }
}
