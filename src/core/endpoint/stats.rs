//! Per-link counters.

use crate::packet::command::FrameKind;

/// Counters describing what a link has done so far.
///
/// 描述链路迄今为止所做工作的计数器。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// DATA frames handed to the transport, retransmissions included.
    pub data_frames_sent: u64,
    pub timeout_retransmissions: u64,
    pub nak_retransmissions: u64,
    /// Data timeouts re-armed by retransmission pacing.
    pub deferred_timeouts: u64,
    /// NAKs and timer firings that referred to frames no longer outstanding.
    pub stale_signals: u64,
    pub acks_sent: u64,
    pub naks_sent: u64,
    pub half_acks_sent: u64,
    pub packets_delivered: u64,
    pub corrupted_frames: u64,
    pub duplicate_frames: u64,
    pub out_of_window_frames: u64,
}

impl LinkStats {
    pub(crate) fn record_sent(&mut self, kind: FrameKind) {
        let counter = match kind {
            FrameKind::Data => &mut self.data_frames_sent,
            FrameKind::Ack => &mut self.acks_sent,
            FrameKind::Nak => &mut self.naks_sent,
            FrameKind::HalfAck => &mut self.half_acks_sent,
        };
        *counter += 1;
    }

    /// Frames of every kind handed to the transport.
    /// 交给传输层的各类帧总数。
    pub fn frames_sent(&self) -> u64 {
        self.data_frames_sent + self.acks_sent + self.naks_sent + self.half_acks_sent
    }

    pub fn retransmissions(&self) -> u64 {
        self.timeout_retransmissions + self.nak_retransmissions
    }
}
