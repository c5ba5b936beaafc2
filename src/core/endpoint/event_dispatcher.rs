//! 事件分发器 - 负责将不同类型的事件路由到窗口的两半
//! Event Dispatcher - Routes link events to the two halves of the window

use super::{LinkIo, LinkStats, types::{LinkEvent, PhysicalState}};
use crate::{
    config::Config,
    core::reliability::{DataOutcome, NakOutcome, ReceiveWindow, SendWindow, TimeoutOutcome},
    error::{Error, Result},
    packet::frame::Frame,
    timer::TimerKey,
};
use bytes::Bytes;
use std::time::Duration;
use tracing::{trace, warn};

/// 事件分发器，拥有一个会话的全部协议状态
/// Event dispatcher owning all protocol state of one session.
///
/// Handlers never block: every effect goes through the [`LinkIo`] passed to
/// [`handle`](Self::handle).
#[derive(Debug)]
pub struct EventDispatcher {
    sender: SendWindow,
    receiver: ReceiveWindow,
    physical: PhysicalState,
    /// Last admission decision announced to the upper layer.
    admission: Option<bool>,
    stats: LinkStats,
}

impl EventDispatcher {
    /// Creates a dispatcher in the initial state: both windows empty, all
    /// edges at zero and the transport ready.
    ///
    /// 创建处于初始状态的分发器：两个窗口为空，所有边界为零，传输层就绪。
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sender: SendWindow::new(config),
            receiver: ReceiveWindow::new(config),
            physical: PhysicalState::Ready,
            admission: None,
            stats: LinkStats::default(),
        })
    }

    pub fn sender(&self) -> &SendWindow {
        &self.sender
    }

    pub fn receiver(&self) -> &ReceiveWindow {
        &self.receiver
    }

    pub fn physical_state(&self) -> PhysicalState {
        self.physical
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// Whether the upper layer may offer another packet.
    /// 上层是否可以提供下一个数据包。
    pub fn admission_open(&self) -> bool {
        !self.sender.is_full() && self.physical == PhysicalState::Ready
    }

    /// Announces the current admission decision unconditionally.
    /// 无条件地通告当前的接纳决定。
    pub fn sync_admission<I: LinkIo + ?Sized>(&mut self, io: &mut I) {
        let open = self.admission_open();
        self.admission = Some(open);
        io.set_admission(open);
    }

    /// 分发一个事件
    /// Dispatches one event.
    ///
    /// Returns [`Error::WouldBlock`] for `UpperLayerReady` while the window is
    /// full; no packet is fetched in that case. Nothing else is fatal.
    pub fn handle<I: LinkIo + ?Sized>(&mut self, event: LinkEvent, io: &mut I) -> Result<()> {
        if event == LinkEvent::TransportReady {
            self.physical = PhysicalState::Ready;
        }

        let mut out = Outbound::new(io, &mut self.stats);
        let result = match event {
            LinkEvent::UpperLayerReady => {
                upper_layer_ready(&mut self.sender, &self.receiver, &mut out)
            }
            LinkEvent::TransportReady => Ok(()),
            LinkEvent::FrameReceived(raw) => {
                frame_received(&mut self.sender, &mut self.receiver, raw, &mut out);
                Ok(())
            }
            LinkEvent::DataTimeout(seq) => {
                let piggyback = self.receiver.cumulative_ack();
                match self.sender.on_timeout(seq, piggyback, &mut out) {
                    TimeoutOutcome::Retransmitted => out.stats.timeout_retransmissions += 1,
                    TimeoutOutcome::Deferred => out.stats.deferred_timeouts += 1,
                    TimeoutOutcome::Stale => out.stats.stale_signals += 1,
                }
                Ok(())
            }
            LinkEvent::AckTimeout => {
                self.receiver.on_ack_timeout(&mut out);
                Ok(())
            }
        };

        if out.transmitted {
            self.physical = PhysicalState::Busy;
        }
        self.update_admission(io);
        result
    }

    fn update_admission<I: LinkIo + ?Sized>(&mut self, io: &mut I) {
        let open = self.admission_open();
        if self.admission != Some(open) {
            trace!(open, outstanding = self.sender.outstanding(), "Admission changed");
            self.admission = Some(open);
            io.set_admission(open);
        }
    }
}

fn upper_layer_ready<I: LinkIo + ?Sized>(
    sender: &mut SendWindow,
    receiver: &ReceiveWindow,
    out: &mut Outbound<'_, I>,
) -> Result<()> {
    if sender.is_full() {
        return Err(Error::WouldBlock);
    }
    let Some(packet) = out.fetch_packet() else {
        trace!("Upper layer had nothing to send");
        return Ok(());
    };
    sender.admit(packet, receiver.cumulative_ack(), out)?;
    Ok(())
}

fn frame_received<I: LinkIo + ?Sized>(
    sender: &mut SendWindow,
    receiver: &mut ReceiveWindow,
    raw: Bytes,
    out: &mut Outbound<'_, I>,
) {
    let frame = match Frame::decode(&raw) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, len = raw.len(), "Discarding damaged frame");
            out.stats.corrupted_frames += 1;
            receiver.on_corrupted(out);
            return;
        }
    };
    trace!(kind = %frame.kind(), ack = frame.ack(), seq = ?frame.sequence_number(), "Frame received");

    let ack = frame.ack();
    match frame {
        Frame::Data { header, payload } => match receiver.on_data(header.seq, payload, out) {
            DataOutcome::Accepted { delivered } => out.stats.packets_delivered += delivered as u64,
            DataOutcome::Duplicate => out.stats.duplicate_frames += 1,
            DataOutcome::OutOfWindow => out.stats.out_of_window_frames += 1,
        },
        Frame::Nak { .. } => match sender.on_nak(ack, receiver.cumulative_ack(), out) {
            NakOutcome::Retransmitted(_) => out.stats.nak_retransmissions += 1,
            NakOutcome::Stale => out.stats.stale_signals += 1,
        },
        Frame::HalfAck { seqs, .. } if sender.is_current_ack(ack) => {
            sender.half_ack(&seqs, out);
        }
        Frame::HalfAck { .. } => {
            trace!(ack, "Ignoring half-ack overtaken by a newer ack");
            out.stats.stale_signals += 1;
        }
        Frame::Ack { .. } => {}
    }
    sender.on_ack(ack, out);
}

/// Wraps the caller's [`LinkIo`] for the duration of one event: counts
/// outbound frames and cancels the delayed ACK whenever any frame leaves,
/// since every frame carries the cumulative ack.
///
/// 在一次事件期间包装调用方的 [`LinkIo`]：统计出站帧，并在任何帧发出时取消
/// 延迟确认，因为每个帧都携带累积确认。
struct Outbound<'a, I: ?Sized> {
    io: &'a mut I,
    stats: &'a mut LinkStats,
    transmitted: bool,
}

impl<'a, I: LinkIo + ?Sized> Outbound<'a, I> {
    fn new(io: &'a mut I, stats: &'a mut LinkStats) -> Self {
        Self {
            io,
            stats,
            transmitted: false,
        }
    }
}

impl<I: LinkIo + ?Sized> LinkIo for Outbound<'_, I> {
    fn transmit(&mut self, frame: &Frame) {
        self.stats.record_sent(frame.kind());
        self.transmitted = true;
        self.io.transmit(frame);
        self.io.stop_timer(TimerKey::Ack);
    }

    fn start_timer(&mut self, key: TimerKey, duration: Duration) {
        self.io.start_timer(key, duration);
    }

    fn stop_timer(&mut self, key: TimerKey) {
        self.io.stop_timer(key);
    }

    fn fetch_packet(&mut self) -> Option<Bytes> {
        self.io.fetch_packet()
    }

    fn deliver_packet(&mut self, packet: Bytes) {
        self.io.deliver_packet(packet);
    }

    fn set_admission(&mut self, open: bool) {
        self.io.set_admission(open);
    }
}
