//! CRC-32 frame trailer.
//! CRC-32 帧校验尾。

use crate::error::{Error, Result};
use crc::{CRC_32_ISO_HDLC, Crc};

pub const CHECKSUM_SIZE: usize = 4;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Computes the checksum of a frame body.
/// 计算帧体的校验和。
pub fn checksum(body: &[u8]) -> u32 {
    CRC32.checksum(body)
}

/// Verifies the little-endian trailer of `frame` and returns the body in
/// front of it.
///
/// 校验 `frame` 的小端校验尾，并返回其前面的帧体。
pub fn verify(frame: &[u8]) -> Result<&[u8]> {
    if frame.len() < CHECKSUM_SIZE {
        return Err(Error::FrameTooShort(frame.len()));
    }
    let (body, trailer) = frame.split_at(frame.len() - CHECKSUM_SIZE);
    let mut expected = [0u8; CHECKSUM_SIZE];
    expected.copy_from_slice(trailer);
    let expected = u32::from_le_bytes(expected);
    let actual = checksum(body);
    if expected != actual {
        return Err(Error::ChecksumMismatch { expected, actual });
    }
    Ok(body)
}
