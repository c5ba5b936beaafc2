//! Manages the sending side of the window: admission, in-flight slots,
//! cumulative acknowledgment, NAK fast retransmission and timeout handling.
//!
//! 管理窗口的发送端：接纳、在途槽位、累积确认、NAK 快速重传以及超时处理。

use super::retransmission::{PacingDecision, RetransmitPacing};
use crate::{
    config::Config,
    core::{
        endpoint::LinkIo,
        sequence::{SeqNum, SequenceSpace},
    },
    error::{Error, Result},
    packet::frame::Frame,
    timer::TimerKey,
};
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, trace};

/// Timer state of an occupied sender slot.
/// 已占用发送槽位的定时器状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotTimer {
    /// Running with the full data timeout.
    /// 以完整的数据超时运行。
    Armed,
    /// Re-armed with the short defer interval by retransmission pacing.
    /// 被重传节奏控制以较短的推迟间隔重新启动。
    Deferred,
    /// Stopped because the receiver reported the frame as buffered.
    /// 因接收方报告该帧已被缓存而停止。
    Confirmed,
}

#[derive(Debug)]
struct SendSlot {
    seq: SeqNum,
    payload: Bytes,
    timer: SlotTimer,
}

/// Result of handling a NAK.
/// 处理 NAK 的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NakOutcome {
    /// The named frame was outstanding and has been sent again.
    Retransmitted(SeqNum),
    /// The named frame is not outstanding.
    Stale,
}

/// Result of handling a data timeout.
/// 处理数据超时的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutOutcome {
    Retransmitted,
    Deferred,
    /// The timer belonged to a frame that is no longer outstanding, was
    /// superseded by a newer occupant of its slot, or was confirmed buffered.
    Stale,
}

/// The sender window.
///
/// 发送窗口。
#[derive(Debug)]
pub struct SendWindow {
    space: SequenceSpace,
    slots: Vec<Option<SendSlot>>,
    /// Oldest unacknowledged frame.
    ack_expected: SeqNum,
    /// Sequence number the next admitted packet receives.
    next_frame_to_send: SeqNum,
    pacing: RetransmitPacing,
    data_timeout: Duration,
    retransmit_defer: Duration,
    max_payload: usize,
}

impl SendWindow {
    pub fn new(config: &Config) -> Self {
        let space = SequenceSpace::from_config(&config.window);
        Self {
            space,
            slots: (0..space.window_size()).map(|_| None).collect(),
            ack_expected: 0,
            next_frame_to_send: 0,
            pacing: RetransmitPacing::Idle,
            data_timeout: config.reliability.data_timeout,
            retransmit_defer: config.reliability.retransmit_defer,
            max_payload: config.window.max_payload,
        }
    }

    pub fn ack_expected(&self) -> SeqNum {
        self.ack_expected
    }

    pub fn next_frame_to_send(&self) -> SeqNum {
        self.next_frame_to_send
    }

    /// Number of admitted frames not yet cumulatively acknowledged.
    /// 已接纳但尚未被累积确认的帧数。
    pub fn outstanding(&self) -> usize {
        self.space.distance(self.ack_expected, self.next_frame_to_send)
    }

    pub fn is_full(&self) -> bool {
        self.outstanding() >= self.space.window_size()
    }

    pub fn pacing(&self) -> RetransmitPacing {
        self.pacing
    }

    /// Whether `seq` lies in `[ack_expected, next_frame_to_send)`.
    /// `seq` 是否位于 `[ack_expected, next_frame_to_send)` 内。
    pub fn is_outstanding(&self, seq: SeqNum) -> bool {
        self.space
            .between(self.ack_expected, seq, self.next_frame_to_send)
    }

    /// Whether `ack` is the current cumulative ack or a newer one. Half-acks
    /// carrying an older ack may have been overtaken and are ignored.
    ///
    /// `ack` 是否为当前或更新的累积确认。携带更旧确认的半确认可能已被超越，
    /// 将被忽略。
    pub fn is_current_ack(&self, ack: SeqNum) -> bool {
        ack == self.space.prev(self.ack_expected) || self.is_outstanding(ack)
    }

    /// Timer state of the outstanding frame `seq`.
    pub fn slot_timer(&self, seq: SeqNum) -> Option<SlotTimer> {
        self.occupant(seq).map(|slot| slot.timer)
    }

    fn occupant(&self, seq: SeqNum) -> Option<&SendSlot> {
        if !self.is_outstanding(seq) {
            return None;
        }
        self.slots[self.space.slot(seq)]
            .as_ref()
            .filter(|slot| slot.seq == seq)
    }

    fn occupant_mut(&mut self, seq: SeqNum) -> Option<&mut SendSlot> {
        if !self.is_outstanding(seq) {
            return None;
        }
        let index = self.space.slot(seq);
        self.slots[index].as_mut().filter(|slot| slot.seq == seq)
    }

    /// Admits a packet from the upper layer, sends it and starts its timer.
    ///
    /// 接纳一个来自上层的数据包，发送它并启动其定时器。
    pub fn admit<I: LinkIo + ?Sized>(
        &mut self,
        payload: Bytes,
        piggyback_ack: SeqNum,
        io: &mut I,
    ) -> Result<SeqNum> {
        if self.is_full() {
            return Err(Error::WouldBlock);
        }
        if payload.len() > self.max_payload {
            return Err(Error::PayloadTooLarge {
                len: payload.len(),
                max: self.max_payload,
            });
        }

        let seq = self.next_frame_to_send;
        io.transmit(&Frame::new_data(seq, piggyback_ack, payload.clone()));
        io.start_timer(TimerKey::Data(seq), self.data_timeout);

        let index = self.space.slot(seq);
        debug_assert!(self.slots[index].is_none(), "slot {index} reused while occupied");
        self.slots[index] = Some(SendSlot {
            seq,
            payload,
            timer: SlotTimer::Armed,
        });
        self.next_frame_to_send = self.space.next(seq);
        trace!(seq, ack = piggyback_ack, outstanding = self.outstanding(), "Admitted DATA frame");
        Ok(seq)
    }

    /// Slides the window over every frame up to and including `ack`.
    /// Returns the number of newly acknowledged frames; repeating an ack
    /// changes nothing.
    ///
    /// 将窗口滑过直到 `ack`（含）的所有帧。返回新确认的帧数；重复的确认不会
    /// 改变任何状态。
    pub fn on_ack<I: LinkIo + ?Sized>(&mut self, ack: SeqNum, io: &mut I) -> usize {
        let mut acked = 0;
        while self.is_outstanding(ack) {
            let seq = self.ack_expected;
            io.stop_timer(TimerKey::Data(seq));
            let index = self.space.slot(seq);
            self.slots[index] = None;
            self.pacing.on_acknowledged(seq);
            self.ack_expected = self.space.next(seq);
            acked += 1;
        }
        if acked > 0 {
            debug!(
                ack,
                acked,
                ack_expected = self.ack_expected,
                next_frame_to_send = self.next_frame_to_send,
                "Send window slid"
            );
        }
        acked
    }

    /// Handles a NAK whose cumulative ack is `ack`: the frame `ack + 1` is
    /// missing at the receiver and is retransmitted at once if outstanding.
    ///
    /// 处理累积确认为 `ack` 的 NAK：帧 `ack + 1` 在接收方缺失，若仍在途则立即
    /// 重传。
    pub fn on_nak<I: LinkIo + ?Sized>(
        &mut self,
        ack: SeqNum,
        piggyback_ack: SeqNum,
        io: &mut I,
    ) -> NakOutcome {
        let missing = self.space.next(ack);
        if self.occupant(missing).is_none() {
            trace!(
                missing,
                ack_expected = self.ack_expected,
                next_frame_to_send = self.next_frame_to_send,
                "Ignoring NAK for a frame that is not outstanding"
            );
            return NakOutcome::Stale;
        }
        debug!(seq = missing, "Fast retransmission on NAK");
        self.retransmit(missing, piggyback_ack, io);
        NakOutcome::Retransmitted(missing)
    }

    /// Handles the expiry of the data timer of `seq`.
    ///
    /// 处理 `seq` 的数据定时器到期。
    pub fn on_timeout<I: LinkIo + ?Sized>(
        &mut self,
        seq: SeqNum,
        piggyback_ack: SeqNum,
        io: &mut I,
    ) -> TimeoutOutcome {
        let confirmed = match self.occupant(seq) {
            Some(slot) => slot.timer == SlotTimer::Confirmed,
            None => {
                trace!(seq, "Stale data timer ignored");
                return TimeoutOutcome::Stale;
            }
        };
        if confirmed {
            trace!(seq, "Data timer of a confirmed frame ignored");
            return TimeoutOutcome::Stale;
        }

        match self.pacing.decide(&self.space, self.ack_expected, seq) {
            PacingDecision::Retransmit => {
                debug!(seq, "Retransmission on timeout");
                self.retransmit(seq, piggyback_ack, io);
                self.pacing.record(seq);
                TimeoutOutcome::Retransmitted
            }
            PacingDecision::Defer => {
                trace!(seq, pacing = ?self.pacing, "Retransmission deferred");
                io.start_timer(TimerKey::Data(seq), self.retransmit_defer);
                if let Some(slot) = self.occupant_mut(seq) {
                    slot.timer = SlotTimer::Deferred;
                }
                TimeoutOutcome::Deferred
            }
        }
    }

    /// Handles a half-ack: every listed frame that is outstanding has its
    /// timer stopped. `ack_expected` does not move. Returns how many slots
    /// changed.
    ///
    /// 处理半确认：列出的每个在途帧都停止其定时器。`ack_expected` 不变。
    pub fn half_ack<I: LinkIo + ?Sized>(&mut self, seqs: &[SeqNum], io: &mut I) -> usize {
        let mut confirmed = 0;
        for &seq in seqs {
            let Some(slot) = self.occupant_mut(seq) else {
                continue;
            };
            if slot.timer == SlotTimer::Confirmed {
                continue;
            }
            slot.timer = SlotTimer::Confirmed;
            io.stop_timer(TimerKey::Data(seq));
            confirmed += 1;
        }
        if confirmed > 0 {
            trace!(confirmed, "Half-ack stopped data timers");
        }
        confirmed
    }

    fn retransmit<I: LinkIo + ?Sized>(&mut self, seq: SeqNum, piggyback_ack: SeqNum, io: &mut I) {
        let data_timeout = self.data_timeout;
        let Some(slot) = self.occupant_mut(seq) else {
            return;
        };
        slot.timer = SlotTimer::Armed;
        let frame = Frame::new_data(seq, piggyback_ack, slot.payload.clone());
        io.transmit(&frame);
        io.start_timer(TimerKey::Data(seq), data_timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::{IoCall, RecordingIo, small_config};

    fn fill(window: &mut SendWindow, io: &mut RecordingIo, count: usize) {
        for i in 0..count {
            window
                .admit(Bytes::from(vec![i as u8]), 7, io)
                .expect("window has room");
        }
    }

    #[test]
    fn admit_until_full() {
        let mut window = SendWindow::new(&small_config());
        let mut io = RecordingIo::default();
        fill(&mut window, &mut io, 4);
        assert!(window.is_full());
        assert_eq!(window.outstanding(), 4);
        assert_eq!(window.next_frame_to_send(), 4);
        assert!(matches!(
            window.admit(Bytes::from_static(b"x"), 7, &mut io),
            Err(Error::WouldBlock)
        ));
        assert_eq!(io.transmitted().len(), 4);
        assert!(io.started(TimerKey::Data(3)));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let mut config = small_config();
        config.window.max_payload = 2;
        let mut window = SendWindow::new(&config);
        let mut io = RecordingIo::default();
        assert!(matches!(
            window.admit(Bytes::from_static(b"abc"), 7, &mut io),
            Err(Error::PayloadTooLarge { len: 3, max: 2 })
        ));
        assert_eq!(window.outstanding(), 0);
        assert!(io.calls.is_empty());
    }

    #[test]
    fn cumulative_ack_slides_and_is_idempotent() {
        let mut window = SendWindow::new(&small_config());
        let mut io = RecordingIo::default();
        fill(&mut window, &mut io, 4);

        assert_eq!(window.on_ack(1, &mut io), 2);
        assert_eq!(window.ack_expected(), 2);
        assert_eq!(window.outstanding(), 2);
        assert!(io.stopped(TimerKey::Data(0)));
        assert!(io.stopped(TimerKey::Data(1)));

        // The same ack again, and an ack for ack_expected - 1, change nothing.
        assert_eq!(window.on_ack(1, &mut io), 0);
        assert_eq!(window.on_ack(1, &mut io), 0);
        assert_eq!(window.outstanding(), 2);
        assert_eq!(window.ack_expected(), 2);
    }

    #[test]
    fn ack_for_unsent_frame_is_ignored() {
        let mut window = SendWindow::new(&small_config());
        let mut io = RecordingIo::default();
        fill(&mut window, &mut io, 2);
        // next_frame_to_send is 2; an ack naming it is out of window.
        assert_eq!(window.on_ack(2, &mut io), 0);
        assert_eq!(window.outstanding(), 2);
    }

    #[test]
    fn nak_retransmits_the_missing_frame() {
        let mut window = SendWindow::new(&small_config());
        let mut io = RecordingIo::default();
        fill(&mut window, &mut io, 4);
        io.calls.clear();

        assert_eq!(window.on_nak(0, 7, &mut io), NakOutcome::Retransmitted(1));
        assert_eq!(
            io.transmitted(),
            vec![Frame::new_data(1, 7, Bytes::from(vec![1u8]))]
        );
        assert!(io.started(TimerKey::Data(1)));
        // A NAK does not count as a timeout retransmission.
        assert_eq!(window.pacing(), RetransmitPacing::Idle);
    }

    #[test]
    fn nak_for_frame_outside_window_is_stale() {
        let mut window = SendWindow::new(&small_config());
        let mut io = RecordingIo::default();
        fill(&mut window, &mut io, 2);
        io.calls.clear();
        // Missing frame would be 2, which was never sent.
        assert_eq!(window.on_nak(1, 7, &mut io), NakOutcome::Stale);
        assert!(io.calls.is_empty());
    }

    #[test]
    fn timeout_pacing_defers_later_frames() {
        let mut window = SendWindow::new(&small_config());
        let mut io = RecordingIo::default();
        fill(&mut window, &mut io, 4);
        io.calls.clear();

        assert_eq!(window.on_timeout(1, 7, &mut io), TimeoutOutcome::Retransmitted);
        assert_eq!(window.pacing(), RetransmitPacing::InFlight { seq: 1 });

        // Frame 0 is before the in-flight retransmission and may go.
        assert_eq!(window.on_timeout(0, 7, &mut io), TimeoutOutcome::Retransmitted);
        assert_eq!(window.pacing(), RetransmitPacing::InFlight { seq: 0 });

        // Frame 2 lies beyond it and is deferred with the short interval.
        io.calls.clear();
        assert_eq!(window.on_timeout(2, 7, &mut io), TimeoutOutcome::Deferred);
        assert_eq!(
            io.calls,
            vec![IoCall::StartTimer(TimerKey::Data(2), Duration::from_millis(100))]
        );
        assert_eq!(window.slot_timer(2), Some(SlotTimer::Deferred));

        // Acknowledging the in-flight frame returns pacing to idle.
        window.on_ack(0, &mut io);
        assert_eq!(window.pacing(), RetransmitPacing::Idle);
        assert_eq!(window.on_timeout(2, 7, &mut io), TimeoutOutcome::Retransmitted);
        assert_eq!(window.slot_timer(2), Some(SlotTimer::Armed));
    }

    #[test]
    fn stale_timer_after_slot_reuse_is_a_no_op() {
        let mut window = SendWindow::new(&small_config());
        let mut io = RecordingIo::default();
        fill(&mut window, &mut io, 4);
        window.on_ack(1, &mut io);
        // Seq 4 reuses slot 0, which held seq 0.
        window
            .admit(Bytes::from_static(b"new"), 7, &mut io)
            .expect("room after ack");
        io.calls.clear();

        assert_eq!(window.on_timeout(0, 7, &mut io), TimeoutOutcome::Stale);
        assert!(io.calls.is_empty());
        assert_eq!(window.pacing(), RetransmitPacing::Idle);
    }

    #[test]
    fn half_ack_stops_timers_without_sliding() {
        let mut window = SendWindow::new(&small_config());
        let mut io = RecordingIo::default();
        fill(&mut window, &mut io, 4);
        io.calls.clear();

        // 6 is outside the window and ignored; 3 is listed twice.
        assert_eq!(window.half_ack(&[2, 3, 6, 3], &mut io), 2);
        assert_eq!(window.ack_expected(), 0);
        assert_eq!(window.outstanding(), 4);
        assert!(io.stopped(TimerKey::Data(2)));
        assert!(io.stopped(TimerKey::Data(3)));
        assert_eq!(window.slot_timer(2), Some(SlotTimer::Confirmed));

        // A late firing for a confirmed frame does nothing.
        io.calls.clear();
        assert_eq!(window.on_timeout(3, 7, &mut io), TimeoutOutcome::Stale);
        assert!(io.calls.is_empty());
    }

    #[test]
    fn window_wraps_around_the_sequence_space() {
        let mut window = SendWindow::new(&small_config());
        let mut io = RecordingIo::default();
        for round in 0..5 {
            fill(&mut window, &mut io, 3);
            let last = window.space.prev(window.next_frame_to_send());
            assert_eq!(window.on_ack(last, &mut io), 3, "round {round}");
            assert_eq!(window.outstanding(), 0);
        }
        // 15 frames on a modulus of 8.
        assert_eq!(window.next_frame_to_send(), 7);
        assert_eq!(window.ack_expected(), 7);
    }
}
