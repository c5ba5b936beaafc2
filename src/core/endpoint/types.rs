//! Event and state types of the endpoint.
//! 端点的事件与状态类型。

use crate::{core::sequence::SeqNum, timer::TimerKey};
use bytes::Bytes;

/// An input to the [`EventDispatcher`](super::EventDispatcher).
/// [`EventDispatcher`](super::EventDispatcher) 的输入。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The upper layer has a packet to send.
    /// 上层有数据包要发送。
    UpperLayerReady,
    /// The physical transport can accept another frame.
    /// 物理传输层可以接受下一个帧。
    TransportReady,
    /// Raw bytes arrived from the physical transport, not yet verified.
    /// 从物理传输层到达的原始字节，尚未校验。
    FrameReceived(Bytes),
    /// The data timer of this sequence number expired.
    /// 该序列号的数据定时器到期。
    DataTimeout(SeqNum),
    /// The delayed-ACK timer expired.
    /// 延迟确认定时器到期。
    AckTimeout,
}

impl From<TimerKey> for LinkEvent {
    fn from(key: TimerKey) -> Self {
        match key {
            TimerKey::Data(seq) => LinkEvent::DataTimeout(seq),
            TimerKey::Ack => LinkEvent::AckTimeout,
        }
    }
}

/// Whether the physical transport can take another frame.
/// 物理传输层是否可以接受下一个帧。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhysicalState {
    #[default]
    Ready,
    /// A frame was handed over and the transport has not reported ready since.
    /// 已交出一个帧，且传输层此后尚未报告就绪。
    Busy,
}
