//! DY-HV20T command frame codec.
//!
//! Wire format:
//! ```text
//! ┌──────┬─────┬─────┬──────────────┬──────────┐
//! │ 0xAA │ CMD │ LEN │ DATA (LEN B) │ CHECKSUM │
//! └──────┴─────┴─────┴──────────────┴──────────┘
//! ```
//!
//! `CHECKSUM` is the low byte of the sum of every preceding byte.
//! Multi-byte data fields are big-endian.
//!
//! Encoding is all-or-nothing: a payload that does not fit yields
//! [`EncodeError::PayloadTooLarge`] before any byte is produced, so the
//! caller can never put a partial frame on the wire.

use heapless::Vec;

use crate::error::{DecodeError, EncodeError};

/// Frame start marker.
pub const START_BYTE: u8 = 0xAA;

pub const CMD_PLAY: u8 = 0x02;
pub const CMD_PAUSE: u8 = 0x03;
pub const CMD_STOP: u8 = 0x04;
/// Play specified track; data is the 1-based track number, big-endian u16.
pub const CMD_PLAY_TRACK: u8 = 0x07;

/// Header plus data, the part the checksum covers.
pub const MAX_BODY_SIZE: usize = 5;

/// Start, command and length bytes.
const HEADER_LEN: usize = 3;

/// Largest data field a frame can carry.
pub const MAX_DATA_LEN: usize = MAX_BODY_SIZE - HEADER_LEN;

/// Longest encoded frame, checksum included.
pub const MAX_FRAME_LEN: usize = MAX_BODY_SIZE + 1;

/// Smallest well-formed frame: header plus checksum.
const MIN_FRAME_LEN: usize = HEADER_LEN + 1;

/// An encoded frame, ready to write to the transport.
pub type FrameBuf = Vec<u8, MAX_FRAME_LEN>;

// The length byte must be able to describe the largest data field.
const _: () = assert!(MAX_DATA_LEN <= u8::MAX as usize);

/// Sum of `bytes`, modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Build `[START][cmd][len][data..][checksum]`.
pub fn encode_frame(cmd: u8, data: &[u8]) -> Result<FrameBuf, EncodeError> {
    let len = data.len();
    if len > MAX_DATA_LEN {
        return Err(EncodeError::PayloadTooLarge {
            len,
            max: MAX_DATA_LEN,
        });
    }

    let body_len = HEADER_LEN + len;
    let mut raw = [0u8; MAX_FRAME_LEN];
    raw[0] = START_BYTE;
    raw[1] = cmd;
    raw[2] = len as u8;
    raw[HEADER_LEN..body_len].copy_from_slice(data);
    raw[body_len] = checksum(&raw[..body_len]);

    FrameBuf::from_slice(&raw[..=body_len]).map_err(|()| EncodeError::PayloadTooLarge {
        len,
        max: MAX_DATA_LEN,
    })
}

/// A validated frame, borrowing its data field from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub cmd: u8,
    pub data: &'a [u8],
}

/// Validate `bytes` as one complete frame the way the module would.
///
/// The module buffers at most [`MAX_BODY_SIZE`] bytes of header and
/// data, so a length byte above [`MAX_DATA_LEN`] is rejected outright.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame<'_>, DecodeError> {
    if bytes.len() < MIN_FRAME_LEN {
        return Err(DecodeError::TooShort);
    }
    if bytes[0] != START_BYTE {
        return Err(DecodeError::BadStartByte(bytes[0]));
    }

    let len = bytes[2] as usize;
    if len > MAX_DATA_LEN {
        return Err(DecodeError::DataTooLong { len, max: MAX_DATA_LEN });
    }
    if bytes.len() != MIN_FRAME_LEN + len {
        return Err(DecodeError::LengthMismatch);
    }

    let (body, tail) = bytes.split_at(bytes.len() - 1);
    let expected = checksum(body);
    if tail[0] != expected {
        return Err(DecodeError::ChecksumMismatch {
            expected,
            found: tail[0],
        });
    }

    Ok(Frame {
        cmd: bytes[1],
        data: &body[HEADER_LEN..],
    })
}
