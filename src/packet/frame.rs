//! 定义了协议中可以在线路上传输的完整帧。
//! Defines the complete frames that can be transmitted over the wire.
//!
//! Layout: `kind | ack | seq | payload | crc32 (little-endian)`.

use super::checksum::{self, CHECKSUM_SIZE};
use super::command::FrameKind;
use super::half_ack;
use super::header::{HEADER_SIZE, Header};
use crate::core::sequence::SeqNum;
use crate::error::Result;
use bytes::{BufMut, Bytes, BytesMut};

/// Bytes every frame spends on header and checksum.
/// 每个帧在帧头和校验和上花费的字节数。
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + CHECKSUM_SIZE;

/// Bytes a half-ack spends on its count prefix.
/// 半确认在计数前缀上花费的字节数。
pub const HALF_ACK_PREFIX: usize = 1;

/// A complete protocol frame that can be sent or received.
/// 一个可以被发送或接收的完整协议帧。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A DATA frame carrying an upper-layer packet.
    /// 携带上层数据包的 DATA 帧。
    Data { header: Header, payload: Bytes },
    /// A standalone cumulative ACK.
    /// 独立的累积 ACK。
    Ack { header: Header },
    /// A NAK naming `ack + 1` as missing.
    /// 指明 `ack + 1` 缺失的 NAK。
    Nak { header: Header },
    /// A half-ack listing frames buffered out of order.
    /// 列出乱序缓存帧的半确认。
    HalfAck { header: Header, seqs: Vec<SeqNum> },
}

impl Frame {
    // --- Smart Constructors ---
    // These constructors ensure that the header kind always matches the variant.
    // 这些构造函数确保帧头类型始终与变体匹配。

    /// Creates a new DATA frame.
    /// 创建一个新的 DATA 帧。
    pub fn new_data(seq: SeqNum, ack: SeqNum, payload: Bytes) -> Self {
        let header = Header {
            kind: FrameKind::Data,
            ack,
            seq,
        };
        Frame::Data { header, payload }
    }

    /// Creates a new standalone ACK frame.
    /// 创建一个新的独立 ACK 帧。
    pub fn new_ack(ack: SeqNum) -> Self {
        let header = Header {
            kind: FrameKind::Ack,
            ack,
            seq: 0, // ACKs don't have their own sequence number
        };
        Frame::Ack { header }
    }

    /// Creates a new NAK frame.
    /// 创建一个新的 NAK 帧。
    pub fn new_nak(ack: SeqNum) -> Self {
        let header = Header {
            kind: FrameKind::Nak,
            ack,
            seq: 0,
        };
        Frame::Nak { header }
    }

    /// Creates a new HALF-ACK frame.
    /// 创建一个新的 HALF-ACK 帧。
    pub fn new_half_ack(ack: SeqNum, seqs: Vec<SeqNum>) -> Self {
        let header = Header {
            kind: FrameKind::HalfAck,
            ack,
            seq: 0,
        };
        Frame::HalfAck { header, seqs }
    }

    // --- End of Smart Constructors ---

    fn header(&self) -> &Header {
        match self {
            Frame::Data { header, .. }
            | Frame::Ack { header }
            | Frame::Nak { header }
            | Frame::HalfAck { header, .. } => header,
        }
    }

    /// The kind byte of this frame.
    /// 此帧的类型字节。
    pub fn kind(&self) -> FrameKind {
        self.header().kind
    }

    /// The cumulative acknowledgment piggybacked on this frame.
    /// 捎带在此帧上的累积确认。
    pub fn ack(&self) -> SeqNum {
        self.header().ack
    }

    /// The sequence number of a DATA frame.
    /// DATA 帧的序列号。
    pub fn sequence_number(&self) -> Option<SeqNum> {
        match self {
            Frame::Data { header, .. } => Some(header.seq),
            _ => None,
        }
    }

    /// Calculates the encoded size of the frame, checksum included.
    ///
    /// 计算帧编码后的大小（包含校验和）。
    pub fn encoded_size(&self) -> usize {
        let payload_size = match self {
            Frame::Data { payload, .. } => payload.len(),
            Frame::HalfAck { seqs, .. } => HALF_ACK_PREFIX + seqs.len(),
            Frame::Ack { .. } | Frame::Nak { .. } => 0,
        };
        FRAME_OVERHEAD + payload_size
    }

    /// 将帧编码到缓冲区，并追加校验尾。
    /// Encodes the frame into a buffer and appends the checksum trailer.
    pub fn encode(&self, buf: &mut BytesMut) {
        let start = buf.len();
        buf.reserve(self.encoded_size());
        self.header().encode(buf);
        match self {
            Frame::Data { payload, .. } => buf.put_slice(payload),
            Frame::HalfAck { seqs, .. } => half_ack::encode_half_ack(seqs, buf),
            Frame::Ack { .. } | Frame::Nak { .. } => {}
        }
        let crc = checksum::checksum(&buf[start..]);
        buf.put_u32_le(crc);
    }

    /// Encodes the frame into a fresh buffer.
    /// 将帧编码到新的缓冲区。
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_size());
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Verifies the checksum and decodes one frame occupying all of `datagram`.
    ///
    /// A frame that fails any check is returned as an error and must not be
    /// trusted in part.
    ///
    /// 校验校验和并解码占据整个 `datagram` 的单个帧。
    pub fn decode(datagram: &[u8]) -> Result<Self> {
        let body = checksum::verify(datagram)?;
        let mut cursor = body;
        let header = Header::decode(&mut cursor)?;
        let frame = match header.kind {
            FrameKind::Data => Frame::Data {
                header,
                payload: Bytes::copy_from_slice(cursor),
            },
            FrameKind::Ack => Frame::Ack { header },
            FrameKind::Nak => Frame::Nak { header },
            FrameKind::HalfAck => Frame::HalfAck {
                header,
                seqs: half_ack::decode_half_ack(cursor)?,
            },
        };
        Ok(frame)
    }
}
