//! 定义了链路和协议的可配置参数。
//! Defines configurable parameters for the link and the protocol.

use crate::error::{Error, Result};
use crate::packet::frame::{FRAME_OVERHEAD, HALF_ACK_PREFIX};
use std::time::Duration;

/// A structure containing all configurable parameters for a link.
///
/// 包含所有链路可配置参数的结构体。
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Sequence space and window sizing.
    /// 序列号空间与窗口大小。
    pub window: WindowConfig,

    /// Timer and signaling parameters.
    /// 定时器与信令参数。
    pub reliability: ReliabilityConfig,

    /// Parameters for the async link driver.
    /// 异步链路驱动的参数。
    pub link: LinkConfig,
}

/// Sequence space and window sizing.
///
/// 序列号空间与窗口大小。
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Largest sequence number; arithmetic is modulo `max_seq + 1`.
    /// 最大序列号；运算以 `max_seq + 1` 为模。
    pub max_seq: u8,
    /// Number of frames that may be outstanding (and buffered) at once.
    /// Must satisfy `2W <= max_seq + 1` and divide `max_seq + 1`, since both
    /// rings are indexed by `seq mod W`.
    /// 同时可以在途（以及被缓存）的帧数量。必须满足 `2W <= max_seq + 1` 且整除
    /// `max_seq + 1`，因为两个环都以 `seq mod W` 索引。
    pub window_size: u8,
    /// Largest payload a DATA frame may carry.
    /// DATA 帧可以携带的最大载荷。
    pub max_payload: usize,
}

/// Which NAK suppression policy the receiver uses.
///
/// 接收方使用的 NAK 抑制策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NakPolicy {
    /// One suppression flag per receive-window position.
    /// 每个接收窗口位置一个抑制标志。
    PerSlot,
    /// A single flag for the whole window; a second gap stays silent until
    /// the first one is filled.
    /// 整个窗口共用一个标志；在第一个空缺被填满前，第二个空缺保持沉默。
    Global,
}

/// What the receiver does when a DATA frame arrives outside the receive
/// window. Duplicates inside the window always restart the delayed-ack timer.
///
/// 当收到接收窗口外的 DATA 帧时接收方的行为。窗口内的重复帧总是重启延迟确认
/// 定时器。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleDataPolicy {
    /// Restart the delayed-ack timer so a standalone ACK follows shortly.
    /// 重启延迟确认定时器，稍后发送独立ACK。
    DelayedAck,
    /// Send a standalone ACK at once.
    /// 立即发送独立ACK。
    ImmediateAck,
    /// Do nothing.
    /// 不做任何处理。
    Ignore,
}

/// Timer and signaling parameters.
///
/// 定时器与信令参数。
#[derive(Debug, Clone)]
pub struct ReliabilityConfig {
    /// Retransmission timeout for a DATA frame.
    /// DATA 帧的重传超时。
    pub data_timeout: Duration,
    /// How long the receiver waits for outbound DATA to piggyback an ACK on
    /// before sending a standalone ACK.
    /// 接收方在发送独立ACK之前，等待可捎带ACK的出站DATA的时间。
    pub ack_timeout: Duration,
    /// Delay applied to a timeout that fires while another retransmission is
    /// still unacknowledged.
    /// 当另一个重传仍未被确认时，对触发的超时施加的延迟。
    pub retransmit_defer: Duration,
    /// NAK suppression policy.
    /// NAK 抑制策略。
    pub nak_policy: NakPolicy,
    /// Whether the receiver follows each NAK with a half-ack listing its
    /// buffered frames.
    /// 接收方是否在每个NAK之后发送列出其已缓存帧的半确认。
    pub half_ack: bool,
    /// Reaction to out-of-window DATA.
    /// 对窗口外DATA的反应。
    pub stale_data: StaleDataPolicy,
}

/// Parameters for the async link driver.
///
/// 异步链路驱动的参数。
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Capacity of the channels between the link task and its handle.
    /// 链路任务与其句柄之间通道的容量。
    pub channel_capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_seq: 127,
            window_size: 64,
            max_payload: 256,
        }
    }
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            data_timeout: Duration::from_millis(1950),
            ack_timeout: Duration::from_millis(260),
            retransmit_defer: Duration::from_millis(100),
            nak_policy: NakPolicy::PerSlot,
            half_ack: true,
            stale_data: StaleDataPolicy::DelayedAck,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

impl WindowConfig {
    /// Number of distinct sequence numbers.
    ///
    /// 不同序列号的数量。
    pub fn seq_modulus(&self) -> usize {
        self.max_seq as usize + 1
    }

    /// The largest frame this configuration can put on the wire.
    ///
    /// 此配置可放到线路上的最大帧。
    pub fn max_frame_size(&self) -> usize {
        let data = self.max_payload;
        let half_ack = HALF_ACK_PREFIX + self.window_size as usize;
        FRAME_OVERHEAD + data.max(half_ack)
    }
}

impl Config {
    /// Checks the invariants the protocol depends on.
    ///
    /// `2W ≤ MAX_SEQ + 1` keeps old and new frames distinguishable after the
    /// receive window slides.
    ///
    /// 检查协议依赖的不变量。
    pub fn validate(&self) -> Result<()> {
        let w = self.window.window_size as usize;
        if w == 0 {
            return Err(Error::InvalidConfig("window_size must be at least 1".into()));
        }
        if 2 * w > self.window.seq_modulus() {
            return Err(Error::InvalidConfig(format!(
                "window_size {} is too large for max_seq {} (need 2W <= MAX_SEQ + 1)",
                w, self.window.max_seq
            )));
        }
        if self.window.seq_modulus() % w != 0 {
            return Err(Error::InvalidConfig(format!(
                "window_size {} must divide MAX_SEQ + 1 ({})",
                w,
                self.window.seq_modulus()
            )));
        }
        if self.window.max_payload == 0 {
            return Err(Error::InvalidConfig("max_payload must be non-zero".into()));
        }
        if self.link.channel_capacity == 0 {
            return Err(Error::InvalidConfig("channel_capacity must be non-zero".into()));
        }
        Ok(())
    }
}
