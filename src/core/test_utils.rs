//! Common testing infrastructure for core tests.

use super::endpoint::{EventDispatcher, LinkEvent, LinkIo};
use crate::{config::Config, error::Result, packet::frame::Frame, timer::TimerKey};
use bytes::Bytes;
use std::{collections::VecDeque, sync::Once, time::Duration};

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "sr_arq=info".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// The configuration used by most unit tests: MAX_SEQ = 7, W = 4.
pub fn small_config() -> Config {
    let mut config = Config::default();
    config.window.max_seq = 7;
    config.window.window_size = 4;
    config
}

/// One call made by the core on its [`LinkIo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoCall {
    Transmit(Frame),
    StartTimer(TimerKey, Duration),
    StopTimer(TimerKey),
    Deliver(Bytes),
    Admission(bool),
}

/// A [`LinkIo`] that records every call and serves packets from a queue.
#[derive(Debug, Default)]
pub struct RecordingIo {
    pub calls: Vec<IoCall>,
    pub upper: VecDeque<Bytes>,
}

impl RecordingIo {
    pub fn transmitted(&self) -> Vec<Frame> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                IoCall::Transmit(frame) => Some(frame.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn delivered(&self) -> Vec<Bytes> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                IoCall::Deliver(packet) => Some(packet.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn started(&self, key: TimerKey) -> bool {
        self.calls
            .iter()
            .any(|call| matches!(call, IoCall::StartTimer(k, _) if *k == key))
    }

    pub fn stopped(&self, key: TimerKey) -> bool {
        self.calls.contains(&IoCall::StopTimer(key))
    }

    pub fn admissions(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                IoCall::Admission(open) => Some(*open),
                _ => None,
            })
            .collect()
    }

    /// Drains the recorded calls and returns the transmitted frames.
    pub fn take_frames(&mut self) -> Vec<Frame> {
        let frames = self.transmitted();
        self.calls.clear();
        frames
    }
}

impl LinkIo for RecordingIo {
    fn transmit(&mut self, frame: &Frame) {
        self.calls.push(IoCall::Transmit(frame.clone()));
    }

    fn start_timer(&mut self, key: TimerKey, duration: Duration) {
        self.calls.push(IoCall::StartTimer(key, duration));
    }

    fn stop_timer(&mut self, key: TimerKey) {
        self.calls.push(IoCall::StopTimer(key));
    }

    fn fetch_packet(&mut self) -> Option<Bytes> {
        self.upper.pop_front()
    }

    fn deliver_packet(&mut self, packet: Bytes) {
        self.calls.push(IoCall::Deliver(packet));
    }

    fn set_admission(&mut self, open: bool) {
        self.calls.push(IoCall::Admission(open));
    }
}

/// A dispatcher together with the recorder it talks to.
pub struct Peer {
    pub dispatcher: EventDispatcher,
    pub io: RecordingIo,
    /// Every packet delivered so far, across `take_frames` calls.
    pub inbox: Vec<Bytes>,
}

impl Peer {
    pub fn new(config: &Config) -> Self {
        Self {
            dispatcher: EventDispatcher::new(config).expect("test config is valid"),
            io: RecordingIo::default(),
            inbox: Vec::new(),
        }
    }

    pub fn handle(&mut self, event: LinkEvent) -> Result<()> {
        self.dispatcher.handle(event, &mut self.io)
    }

    /// Offers one packet to the upper-layer queue and admits it.
    pub fn send(&mut self, payload: impl Into<Bytes>) -> Result<()> {
        self.io.upper.push_back(payload.into());
        self.handle(LinkEvent::UpperLayerReady)
    }

    pub fn receive(&mut self, frame: &Frame) {
        self.handle(LinkEvent::FrameReceived(frame.to_bytes()))
            .expect("frame handling never fails");
    }

    pub fn receive_raw(&mut self, raw: impl Into<Bytes>) {
        self.handle(LinkEvent::FrameReceived(raw.into()))
            .expect("frame handling never fails");
    }

    pub fn transport_ready(&mut self) {
        self.handle(LinkEvent::TransportReady)
            .expect("transport ready never fails");
    }

    /// Collects deliveries into `inbox`, clears the recorder and returns the
    /// frames transmitted since the last call.
    pub fn take_frames(&mut self) -> Vec<Frame> {
        self.inbox.extend(self.io.delivered());
        self.io.take_frames()
    }
}
