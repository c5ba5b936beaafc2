//! The implementation of the link's event loop.
//!
//! 链路事件循环的实现。

use super::{handle::LinkHandle, traits::PhysicalLayer};
use crate::{
    config::Config,
    core::endpoint::{EventDispatcher, LinkEvent, LinkIo, LinkStats},
    error::{Error, Result},
    packet::frame::Frame,
    timer::{TimerKey, TimerTable},
};
use bytes::Bytes;
use std::{collections::VecDeque, time::Duration};
use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, sleep_until},
};
use tracing::{debug, info, trace, warn};

/// The [`LinkIo`] the event loop hands to the dispatcher: effects are queued
/// here and carried out by the loop once the event has been handled.
/// Delivered packets wait here until the upper layer has room for them, so a
/// slow reader never stops the protocol.
///
/// 事件循环交给分发器的 [`LinkIo`]：效果先在此排队，待事件处理完后由循环执行。
#[derive(Debug)]
struct DriverIo {
    outbound: VecDeque<Bytes>,
    delivered: VecDeque<Bytes>,
    timers: TimerTable,
    /// A packet taken from the upper layer, waiting to be fetched.
    staged: Option<Bytes>,
    admission: bool,
}

impl LinkIo for DriverIo {
    fn transmit(&mut self, frame: &Frame) {
        self.outbound.push_back(frame.to_bytes());
    }

    fn start_timer(&mut self, key: TimerKey, duration: Duration) {
        self.timers.start(key, Instant::now() + duration);
    }

    fn stop_timer(&mut self, key: TimerKey) {
        self.timers.stop(key);
    }

    fn fetch_packet(&mut self) -> Option<Bytes> {
        self.staged.take()
    }

    fn deliver_packet(&mut self, packet: Bytes) {
        self.delivered.push_back(packet);
    }

    fn set_admission(&mut self, open: bool) {
        self.admission = open;
    }
}

/// A running link: one protocol session over one physical transport.
///
/// 一条运行中的链路：一个物理传输之上的一个协议会话。
pub struct Link<P: PhysicalLayer> {
    physical: P,
    dispatcher: EventDispatcher,
    io: DriverIo,
    max_frame_size: usize,
    from_upper: mpsc::Receiver<Bytes>,
    upper_closed: bool,
    to_upper: mpsc::Sender<Bytes>,
    reader_gone: bool,
    shutdown_rx: oneshot::Receiver<()>,
}

impl<P: PhysicalLayer> Link<P> {
    /// Validates `config` and starts a link over `physical` on a new tokio
    /// task.
    ///
    /// 校验 `config` 并在新的 tokio 任务上启动一条基于 `physical` 的链路。
    pub fn spawn(config: Config, physical: P) -> Result<LinkHandle> {
        let dispatcher = EventDispatcher::new(&config)?;
        let capacity = config.link.channel_capacity;
        let (to_link, from_upper) = mpsc::channel(capacity);
        let (to_upper, from_link) = mpsc::channel(capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let link = Link {
            physical,
            dispatcher,
            io: DriverIo {
                outbound: VecDeque::new(),
                delivered: VecDeque::new(),
                timers: TimerTable::new(config.window.window_size as usize),
                staged: None,
                admission: false,
            },
            max_frame_size: config.window.max_frame_size(),
            from_upper,
            upper_closed: false,
            to_upper,
            reader_gone: false,
            shutdown_rx,
        };
        let task = tokio::spawn(link.run());
        Ok(LinkHandle::new(
            to_link,
            from_link,
            shutdown_tx,
            task,
            config.window.max_payload,
        ))
    }

    /// Runs the event loop until shutdown or until the transport closes.
    /// Returns the link's counters.
    ///
    /// 运行事件循环直到关闭或传输层关闭。返回链路的计数器。
    async fn run(mut self) -> LinkStats {
        info!(max_frame_size = self.max_frame_size, "Link started");
        let mut buf = vec![0u8; self.max_frame_size];
        self.dispatcher.sync_admission(&mut self.io);

        loop {
            self.flush().await;

            if self.io.staged.is_some() && self.io.admission {
                self.dispatch(LinkEvent::UpperLayerReady);
                continue;
            }

            let deadline = self.io.timers.next_deadline();
            let accept_upper = self.io.admission && self.io.staged.is_none() && !self.upper_closed;
            let deliver = !self.io.delivered.is_empty() && !self.reader_gone;

            tokio::select! {
                biased;
                // 1. Shutdown requested or the handle was dropped.
                // 1. 请求关闭或句柄被丢弃。
                _ = &mut self.shutdown_rx => {
                    debug!("Link shutting down");
                    break;
                }
                // 2. Expired timers.
                // 2. 到期的定时器。
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    for key in self.io.timers.pop_expired(Instant::now()) {
                        trace!(?key, "Timer expired");
                        Self::dispatch_to(&mut self.dispatcher, &mut self.io, LinkEvent::from(key));
                    }
                }
                // 3. Room for a delivered packet at the upper layer.
                // 3. 上层有空间接收已交付的数据包。
                permit = self.to_upper.reserve(), if deliver => match permit {
                    Ok(permit) => {
                        if let Some(packet) = self.io.delivered.pop_front() {
                            permit.send(packet);
                        }
                    }
                    Err(_) => {
                        debug!(
                            discarded = self.io.delivered.len(),
                            "Upper layer stopped receiving"
                        );
                        self.io.delivered.clear();
                        self.reader_gone = true;
                    }
                },
                // 4. Frames from the physical layer.
                // 4. 来自物理层的帧。
                result = self.physical.recv_frame(&mut buf) => match result {
                    Ok(len) => {
                        Self::dispatch_to(&mut self.dispatcher, &mut self.io, LinkEvent::FrameReceived(Bytes::copy_from_slice(&buf[..len])));
                    }
                    Err(Error::ChannelClosed) => {
                        warn!("Physical layer closed");
                        break;
                    }
                    Err(e) => warn!(error = %e, "Physical receive failed"),
                },
                // 5. Packets from the upper layer, only while admission is open.
                // 5. 来自上层的数据包，仅在接纳打开时。
                packet = self.from_upper.recv(), if accept_upper => match packet {
                    Some(packet) => {
                        self.io.staged = Some(packet);
                        Self::dispatch_to(&mut self.dispatcher, &mut self.io, LinkEvent::UpperLayerReady);
                    }
                    None => {
                        debug!("Upper layer closed its sending side");
                        self.upper_closed = true;
                    }
                },
            }
        }

        let stats = self.dispatcher.stats().clone();
        info!(?stats, "Link stopped");
        stats
    }

    fn dispatch(&mut self, event: LinkEvent) {
        Self::dispatch_to(&mut self.dispatcher, &mut self.io, event);
    }

    fn dispatch_to(dispatcher: &mut EventDispatcher, io: &mut DriverIo, event: LinkEvent) {
        match dispatcher.handle(event, io) {
            Ok(()) => {}
            Err(Error::WouldBlock) => trace!("Window full, packet stays staged"),
            Err(e) => {
                warn!(error = %e, "Dropping packet the link cannot carry");
                io.staged = None;
            }
        }
    }

    /// Hands queued frames to the transport. Each completed send makes the
    /// transport ready again.
    ///
    /// 将排队的帧交给传输层。每次发送完成后传输层重新就绪。
    async fn flush(&mut self) {
        while let Some(frame) = self.io.outbound.pop_front() {
            if let Err(e) = self.physical.send_frame(&frame).await {
                warn!(error = %e, len = frame.len(), "Physical send failed, frame lost");
            }
            self.dispatch(LinkEvent::TransportReady);
        }
    }
}
