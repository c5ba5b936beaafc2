//! 定义了半确认（已缓存但未按序交付的帧列表）的载荷格式。
//! Defines the payload of a half-ack: the frames a receiver holds buffered but
//! cannot yet deliver in order.

use crate::core::sequence::SeqNum;
use crate::error::{Error, Result};
use bytes::{Buf, BufMut};

/// Encodes a count-prefixed list of sequence numbers.
/// 编码带计数前缀的序列号列表。
pub fn encode_half_ack<B: BufMut>(seqs: &[SeqNum], buf: &mut B) {
    debug_assert!(seqs.len() <= u8::MAX as usize);
    let count = seqs.len().min(u8::MAX as usize);
    buf.put_u8(count as u8);
    buf.put_slice(&seqs[..count]);
}

/// Decodes a count-prefixed list of sequence numbers.
/// The buffer is expected to only contain the half-ack payload.
///
/// 解码带计数前缀的序列号列表。缓冲区应只包含半确认的载荷。
pub fn decode_half_ack<B: Buf>(mut buf: B) -> Result<Vec<SeqNum>> {
    if !buf.has_remaining() {
        return Err(Error::MalformedHalfAck);
    }
    let count = buf.get_u8() as usize;
    if buf.remaining() != count {
        return Err(Error::MalformedHalfAck);
    }
    let mut seqs = vec![0; count];
    buf.copy_to_slice(&mut seqs);
    Ok(seqs)
}
