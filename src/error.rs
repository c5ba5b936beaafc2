//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use thiserror::Error;

/// The primary error type for the ARQ engine.
/// ARQ 引擎的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// An underlying I/O error occurred on the physical transport.
    /// 物理传输层发生了底层的I/O错误。
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sender window is full; the packet was not admitted.
    /// 发送窗口已满，数据包未被接纳。
    #[error("sender window is full")]
    WouldBlock,

    /// The configuration violates a protocol invariant.
    /// 配置违反了协议不变量。
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A received frame was shorter than the smallest valid frame.
    /// 接收到的帧比最小合法帧还短。
    #[error("frame too short: {0} bytes")]
    FrameTooShort(usize),

    /// The CRC-32 trailer did not match the frame contents.
    /// CRC-32 校验尾与帧内容不匹配。
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// The frame kind byte is not one of the known kinds.
    /// 帧类型字节不是已知的类型之一。
    #[error("unknown frame kind: {0:#04x}")]
    UnknownFrameKind(u8),

    /// A half-ack frame's count prefix disagrees with its payload.
    /// 半确认帧的计数前缀与其载荷不一致。
    #[error("malformed half-ack payload")]
    MalformedHalfAck,

    /// The packet is larger than the configured `max_payload`.
    /// 数据包大于配置的 `max_payload`。
    #[error("payload of {len} bytes exceeds the limit of {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },

    /// An internal channel between the link task and its handle was closed.
    /// 链路任务与其句柄之间的内部通道被关闭。
    #[error("internal channel is broken")]
    ChannelClosed,
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        use std::io::ErrorKind;
        match err {
            Error::Io(e) => e,
            Error::WouldBlock => ErrorKind::WouldBlock.into(),
            Error::InvalidConfig(msg) => std::io::Error::new(ErrorKind::InvalidInput, msg),
            Error::FrameTooShort(_)
            | Error::ChecksumMismatch { .. }
            | Error::UnknownFrameKind(_)
            | Error::MalformedHalfAck => ErrorKind::InvalidData.into(),
            Error::PayloadTooLarge { .. } => ErrorKind::InvalidInput.into(),
            Error::ChannelClosed => ErrorKind::BrokenPipe.into(),
        }
    }
}
