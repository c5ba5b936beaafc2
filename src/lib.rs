#![deny(clippy::expect_used, clippy::unwrap_used)]

//! A Selective-Repeat ARQ data-link engine.
//!
//! Two peers exchange packets in both directions over an unreliable datagram
//! transport. Frames carry a CRC-32 trailer; damaged frames are dropped and
//! NAKed, lost frames are resent on timeout, and the receiver buffers frames
//! that arrive ahead of a gap so only the missing ones are resent. Each side
//! delivers the peer's packets in order, exactly once.
//!
//! The protocol core ([`core::endpoint::EventDispatcher`]) is synchronous and
//! talks to the outside world through [`core::endpoint::LinkIo`]; the
//! [`link`] module drives it on tokio over any [`link::PhysicalLayer`].
//!
//! 选择重传 ARQ 数据链路引擎。两个对端通过不可靠的数据报传输双向交换数据包。
//! 帧带有 CRC-32 校验尾；损坏的帧被丢弃并触发 NAK，丢失的帧在超时后重传，接收方
//! 缓存空缺之后到达的帧，因此只重传缺失的帧。每一端都按序、恰好一次地交付对端的
//! 数据包。

pub mod config;
pub mod core;
pub mod error;
pub mod link;
pub mod packet;
pub mod simulator;
pub mod timer;
