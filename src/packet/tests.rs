//! Frame serialization and deserialization tests.
use super::checksum::{self, CHECKSUM_SIZE};
use super::command::FrameKind;
use super::frame::{FRAME_OVERHEAD, Frame};
use super::half_ack;
use super::header::Header;
use crate::error::Error;
use bytes::{Bytes, BytesMut};

fn frame_roundtrip_test(frame: Frame) {
    let encoded = frame.to_bytes();
    assert_eq!(encoded.len(), frame.encoded_size());
    let decoded_frame = Frame::decode(&encoded).expect("decode should succeed");
    assert_eq!(frame, decoded_frame);
}

#[test]
fn test_data_frame_roundtrip() {
    let frame = Frame::new_data(5, 4, Bytes::from_static(b"hello world"));
    frame_roundtrip_test(frame);
}

#[test]
fn test_control_frames_roundtrip() {
    frame_roundtrip_test(Frame::new_ack(127));
    frame_roundtrip_test(Frame::new_nak(0));
    frame_roundtrip_test(Frame::new_half_ack(3, vec![5, 6, 9]));
}

#[test]
fn test_wire_layout_is_bit_exact() {
    let frame = Frame::new_data(2, 1, Bytes::from_static(&[0xAA, 0xBB]));
    let encoded = frame.to_bytes();
    assert_eq!(&encoded[..5], &[0x00, 0x01, 0x02, 0xAA, 0xBB]);
    let crc = checksum::checksum(&encoded[..5]);
    assert_eq!(&encoded[5..], &crc.to_le_bytes());

    let ack = Frame::new_ack(7).to_bytes();
    assert_eq!(ack.len(), FRAME_OVERHEAD);
    assert_eq!(&ack[..3], &[0x01, 7, 0]);
}

#[test]
fn test_half_ack_payload_is_count_prefixed() {
    let encoded = Frame::new_half_ack(10, vec![12, 13]).to_bytes();
    assert_eq!(&encoded[..6], &[0x03, 10, 0, 2, 12, 13]);
}

#[test]
fn test_empty_data_payload_is_allowed() {
    frame_roundtrip_test(Frame::new_data(0, 0, Bytes::new()));
}

#[test]
fn test_corrupted_frame_is_rejected() {
    let mut encoded = BytesMut::new();
    Frame::new_data(1, 0, Bytes::from_static(b"payload")).encode(&mut encoded);
    encoded[4] ^= 0x01;
    let err = Frame::decode(&encoded).unwrap_err();
    assert!(matches!(err, Error::ChecksumMismatch { .. }));
}

#[test]
fn test_short_frame_is_rejected() {
    // A valid checksum over a body that cannot hold a header.
    let body = [0x01u8, 0x02];
    let mut datagram = body.to_vec();
    datagram.extend_from_slice(&checksum::checksum(&body).to_le_bytes());
    assert!(matches!(Frame::decode(&datagram), Err(Error::FrameTooShort(2))));

    assert!(matches!(
        Frame::decode(&[0u8; CHECKSUM_SIZE - 1]),
        Err(Error::FrameTooShort(_))
    ));
}

#[test]
fn test_unknown_kind_is_rejected() {
    let body = [0x09u8, 0, 0];
    let mut datagram = body.to_vec();
    datagram.extend_from_slice(&checksum::checksum(&body).to_le_bytes());
    assert!(matches!(
        Frame::decode(&datagram),
        Err(Error::UnknownFrameKind(0x09))
    ));
}

#[test]
fn test_half_ack_count_mismatch_is_rejected() {
    let mut payload = BytesMut::new();
    half_ack::encode_half_ack(&[1, 2, 3], &mut payload);
    payload.truncate(3);
    assert!(matches!(
        half_ack::decode_half_ack(payload.freeze()),
        Err(Error::MalformedHalfAck)
    ));
    assert!(matches!(
        half_ack::decode_half_ack(Bytes::new()),
        Err(Error::MalformedHalfAck)
    ));
}

#[test]
fn test_frame_accessors() {
    let frame = Frame::new_data(9, 8, Bytes::from_static(b"x"));
    assert_eq!(frame.kind(), FrameKind::Data);
    assert_eq!(frame.ack(), 8);
    assert_eq!(frame.sequence_number(), Some(9));

    let nak = Frame::new_nak(3);
    assert_eq!(nak.kind(), FrameKind::Nak);
    assert_eq!(nak.sequence_number(), None);
    assert_eq!(
        nak,
        Frame::Nak {
            header: Header {
                kind: FrameKind::Nak,
                ack: 3,
                seq: 0
            }
        }
    );
}
