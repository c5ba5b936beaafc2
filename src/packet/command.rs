//! 定义协议的所有帧类型。
//! Defines all frame kinds of the protocol.

use std::fmt;

/// The kind of a frame. The first byte on the wire.
/// 帧类型，网络传输的第一个字节。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameKind {
    /// Data frame carrying an upper-layer packet.
    /// 携带上层数据包的数据帧。
    Data = 0x00,
    /// Standalone cumulative acknowledgment.
    /// 独立的累积确认。
    Ack = 0x01,
    /// Negative acknowledgment; the missing frame is `ack + 1`.
    /// 否定确认；缺失的帧是 `ack + 1`。
    Nak = 0x02,
    /// List of frames buffered by the receiver but not yet deliverable.
    /// 接收方已缓存但尚不能交付的帧列表。
    HalfAck = 0x03,
}

impl FrameKind {
    /// 从一个字节尝试转换成 `FrameKind`。
    /// Tries to convert a byte into a `FrameKind`.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(FrameKind::Data),
            0x01 => Some(FrameKind::Ack),
            0x02 => Some(FrameKind::Nak),
            0x03 => Some(FrameKind::HalfAck),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameKind::Data => "DATA",
            FrameKind::Ack => "ACK",
            FrameKind::Nak => "NAK",
            FrameKind::HalfAck => "HALF-ACK",
        };
        write!(f, "{}", s)
    }
}
