//! Manages the receiving side of the window: buffering out-of-order frames,
//! in-order delivery, NAK and half-ack signaling, and delayed ACKs.
//!
//! 管理窗口的接收端：缓存乱序帧、按序交付、NAK 与半确认信令以及延迟确认。

use super::nak::NakGate;
use crate::{
    config::{Config, StaleDataPolicy},
    core::{
        endpoint::LinkIo,
        sequence::{SeqNum, SequenceSpace},
    },
    packet::frame::Frame,
    timer::TimerKey,
};
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug)]
struct RecvSlot {
    seq: SeqNum,
    payload: Bytes,
}

/// What happened to an arriving DATA frame.
/// 到达的 DATA 帧的处理结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOutcome {
    /// Stored in the window; `delivered` packets went to the upper layer.
    /// 存入窗口；`delivered` 个数据包被交付给上层。
    Accepted { delivered: usize },
    /// Already buffered.
    /// 已被缓存。
    Duplicate,
    /// Outside `[frame_expected, too_far)`.
    /// 位于 `[frame_expected, too_far)` 之外。
    OutOfWindow,
}

/// The receiver window.
///
/// 接收窗口。
#[derive(Debug)]
pub struct ReceiveWindow {
    space: SequenceSpace,
    slots: Vec<Option<RecvSlot>>,
    /// Lower edge: the next frame to deliver.
    frame_expected: SeqNum,
    /// Upper edge (exclusive): `frame_expected + W`.
    too_far: SeqNum,
    nak_gate: NakGate,
    half_ack: bool,
    stale_data: StaleDataPolicy,
    ack_timeout: Duration,
}

impl ReceiveWindow {
    pub fn new(config: &Config) -> Self {
        let space = SequenceSpace::from_config(&config.window);
        Self {
            space,
            slots: (0..space.window_size()).map(|_| None).collect(),
            frame_expected: 0,
            too_far: space.add(0, space.window_size()),
            nak_gate: NakGate::new(config.reliability.nak_policy, &space),
            half_ack: config.reliability.half_ack,
            stale_data: config.reliability.stale_data,
            ack_timeout: config.reliability.ack_timeout,
        }
    }

    pub fn frame_expected(&self) -> SeqNum {
        self.frame_expected
    }

    pub fn too_far(&self) -> SeqNum {
        self.too_far
    }

    /// Last frame received in order: `frame_expected - 1`. Every outbound
    /// frame carries it.
    ///
    /// 最后一个按序收到的帧：`frame_expected - 1`。每个出站帧都携带它。
    pub fn cumulative_ack(&self) -> SeqNum {
        self.space.prev(self.frame_expected)
    }

    /// Sequence numbers buffered but not yet deliverable, in window order.
    /// 已缓存但尚不能交付的序列号，按窗口顺序排列。
    pub fn buffered(&self) -> Vec<SeqNum> {
        (1..self.space.window_size())
            .map(|offset| self.space.add(self.frame_expected, offset))
            .filter(|&seq| self.is_buffered(seq))
            .collect()
    }

    fn is_buffered(&self, seq: SeqNum) -> bool {
        matches!(&self.slots[self.space.slot(seq)], Some(slot) if slot.seq == seq)
    }

    /// Handles an arriving DATA frame.
    ///
    /// 处理到达的 DATA 帧。
    pub fn on_data<I: LinkIo + ?Sized>(
        &mut self,
        seq: SeqNum,
        payload: Bytes,
        io: &mut I,
    ) -> DataOutcome {
        let in_window = self.space.between(self.frame_expected, seq, self.too_far);
        trace!(
            seq,
            frame_expected = self.frame_expected,
            too_far = self.too_far,
            in_window,
            "DATA arrived"
        );

        let nak_sent = seq != self.frame_expected && self.send_nak(io);
        if !nak_sent && (in_window || self.stale_data == StaleDataPolicy::DelayedAck) {
            io.start_timer(TimerKey::Ack, self.ack_timeout);
        }

        let outcome = if !in_window {
            debug!(
                seq,
                frame_expected = self.frame_expected,
                too_far = self.too_far,
                "DATA outside the receive window"
            );
            if self.stale_data == StaleDataPolicy::ImmediateAck && !nak_sent {
                io.transmit(&Frame::new_ack(self.cumulative_ack()));
            }
            DataOutcome::OutOfWindow
        } else if self.slots[self.space.slot(seq)].is_some() {
            trace!(seq, "DATA already buffered");
            DataOutcome::Duplicate
        } else {
            let index = self.space.slot(seq);
            self.slots[index] = Some(RecvSlot { seq, payload });
            let delivered = self.deliver_in_order(io);
            DataOutcome::Accepted { delivered }
        };

        if nak_sent {
            self.send_half_ack(io);
        }
        outcome
    }

    /// Handles a frame that failed verification: ask for `frame_expected`
    /// again unless a NAK for it is already outstanding. Returns whether a
    /// NAK was sent.
    ///
    /// 处理校验失败的帧：除非已有针对 `frame_expected` 的 NAK 未完成，否则再次
    /// 请求它。返回是否发送了 NAK。
    pub fn on_corrupted<I: LinkIo + ?Sized>(&mut self, io: &mut I) -> bool {
        let nak_sent = self.send_nak(io);
        if nak_sent {
            self.send_half_ack(io);
        }
        nak_sent
    }

    /// The delayed-ACK timer fired; send a standalone ACK.
    /// 延迟确认定时器触发；发送独立 ACK。
    pub fn on_ack_timeout<I: LinkIo + ?Sized>(&mut self, io: &mut I) {
        let ack = self.cumulative_ack();
        trace!(ack, "Sending standalone ACK");
        io.transmit(&Frame::new_ack(ack));
    }

    fn send_nak<I: LinkIo + ?Sized>(&mut self, io: &mut I) -> bool {
        if !self.nak_gate.try_close(&self.space, self.frame_expected) {
            return false;
        }
        let ack = self.cumulative_ack();
        debug!(missing = self.frame_expected, ack, "Sending NAK");
        io.transmit(&Frame::new_nak(ack));
        true
    }

    fn send_half_ack<I: LinkIo + ?Sized>(&mut self, io: &mut I) {
        if !self.half_ack {
            return;
        }
        let seqs = self.buffered();
        if seqs.is_empty() {
            return;
        }
        trace!(count = seqs.len(), "Sending half-ack");
        io.transmit(&Frame::new_half_ack(self.cumulative_ack(), seqs));
    }

    fn deliver_in_order<I: LinkIo + ?Sized>(&mut self, io: &mut I) -> usize {
        let mut delivered = 0;
        loop {
            let index = self.space.slot(self.frame_expected);
            let Some(slot) = self.slots[index].take() else {
                break;
            };
            debug_assert_eq!(slot.seq, self.frame_expected);
            io.deliver_packet(slot.payload);
            self.nak_gate.reopen(&self.space, slot.seq);
            self.frame_expected = self.space.next(self.frame_expected);
            self.too_far = self.space.next(self.too_far);
            io.start_timer(TimerKey::Ack, self.ack_timeout);
            delivered += 1;
        }
        if delivered > 0 {
            debug!(
                delivered,
                frame_expected = self.frame_expected,
                too_far = self.too_far,
                "Receive window slid"
            );
        }
        delivered
    }
}
