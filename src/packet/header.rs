//! 定义帧头。
//! Defines the frame header shared by every frame kind.

use super::command::FrameKind;
use crate::core::sequence::SeqNum;
use crate::error::{Error, Result};
use bytes::{Buf, BufMut};

pub const HEADER_SIZE: usize = 3;

/// The three-byte frame header.
/// 三字节帧头。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// The kind of the frame.
    /// 帧的类型。
    pub kind: FrameKind,
    /// Cumulative acknowledgment: the last frame the sender of this frame
    /// received in order.
    /// 累积确认：此帧发送方按序收到的最后一帧。
    pub ack: SeqNum,
    /// Sequence number. Only meaningful for DATA frames.
    /// 序列号。仅对 DATA 帧有意义。
    pub seq: SeqNum,
}

impl Header {
    /// 将帧头编码到缓冲区。
    /// Encodes the header into a buffer.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.kind as u8);
        buf.put_u8(self.ack);
        buf.put_u8(self.seq);
    }

    /// 从缓冲区解码帧头。
    /// Decodes a header from a buffer.
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < HEADER_SIZE {
            return Err(Error::FrameTooShort(buf.remaining()));
        }
        let kind_byte = buf.get_u8();
        let kind = FrameKind::from_u8(kind_byte).ok_or(Error::UnknownFrameKind(kind_byte))?;
        Ok(Header {
            kind,
            ack: buf.get_u8(),
            seq: buf.get_u8(),
        })
    }
}
