//! tests/common/harness.rs
use sha2::{Digest, Sha256};
use sr_arq::{
    config::Config,
    link::{Link, LinkHandle, PhysicalLayer},
    simulator::{LossModel, LossyChannel},
};
use std::sync::Once;
use tokio::net::UdpSocket;
use tracing_subscriber::fmt::format::FmtSpan;

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "sr_arq=info".to_string());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .init();
    });
}

/// Two links talking to each other.
pub struct LinkPair {
    pub a: LinkHandle,
    pub b: LinkHandle,
}

impl LinkPair {
    /// Connects two links over an in-memory wire with the given impairments.
    pub fn simulated(config: &Config, model: LossModel) -> Self {
        init_tracing();
        let (wire_a, wire_b) = LossyChannel::pair(model);
        Self::over(config, wire_a, wire_b)
    }

    /// Connects two links over a pair of loopback UDP sockets.
    pub async fn udp(config: &Config) -> Self {
        init_tracing();
        let sock_a = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let sock_b = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sock_a.connect(sock_b.local_addr().unwrap()).await.unwrap();
        sock_b.connect(sock_a.local_addr().unwrap()).await.unwrap();
        Self::over(config, sock_a, sock_b)
    }

    fn over<P: PhysicalLayer>(config: &Config, wire_a: P, wire_b: P) -> Self {
        let a = Link::spawn(config.clone(), wire_a).expect("valid test config");
        let b = Link::spawn(config.clone(), wire_b).expect("valid test config");
        Self { a, b }
    }
}

/// A deterministic pseudo-random message of `len` bytes.
pub fn message(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

pub fn digest(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

/// Splits `data` into packets and sends them over `link`.
pub async fn send_chunked(link: &LinkHandle, data: &[u8]) -> usize {
    let chunks: Vec<_> = data.chunks(link.max_payload()).collect();
    for chunk in &chunks {
        link.send(chunk.to_vec()).await.expect("link accepts packet");
    }
    chunks.len()
}

/// Receives `packets` packets from `link` and concatenates them.
pub async fn recv_all(link: &mut LinkHandle, packets: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..packets {
        let packet = link
            .recv()
            .await
            .unwrap_or_else(|| panic!("link closed after {i} of {packets} packets"));
        out.extend_from_slice(&packet);
    }
    out
}
