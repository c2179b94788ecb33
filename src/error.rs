//! Unified error types for the diorama firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! startup path and the run loop handle failures uniformly.  All
//! variants are `Copy` so they can be carried in [`AppEvent`]s and
//! returned through the FSM without allocation.
//!
//! Every fallible operation reports a typed error and performs no side
//! effect on failure: an out-of-range electrode read touches no bus
//! register, and an oversized command frame transmits zero bytes.
//!
//! [`AppEvent`]: crate::app::events::AppEvent

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The capacitive sensor could not be read.
    Sensor(SensorError),
    /// The capacitive sensor failed to come up.
    Init(InitError),
    /// A playback command could not be framed.
    Encode(EncodeError),
    /// A playback command could not be delivered.
    Player(PlayerError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Encode(e) => write!(f, "encode: {e}"),
            Self::Player(e) => write!(f, "player: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The register transport reported a failure.
    Bus,
    /// Electrode index beyond the addressable channel count.
    ElectrodeOutOfRange(u8),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "register bus transaction failed"),
            Self::ElectrodeOutOfRange(e) => write!(f, "electrode {e} out of range"),
        }
    }
}

impl core::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Initialisation errors (fatal at startup)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// The very first bus transaction failed — nothing answered at the address.
    NotFound,
    /// The post-reset register did not hold its documented reset value.
    ResetVerificationFailed { expected: u8, found: u8 },
    /// A bus transaction failed part-way through configuration.
    Bus,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "sensor not found on bus"),
            Self::ResetVerificationFailed { expected, found } => write!(
                f,
                "reset verification failed (expected 0x{expected:02X}, read 0x{found:02X})"
            ),
            Self::Bus => write!(f, "bus failure during configuration"),
        }
    }
}

impl core::error::Error for InitError {}

impl From<InitError> for Error {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

impl From<SensorError> for InitError {
    fn from(_: SensorError) -> Self {
        Self::Bus
    }
}

// ---------------------------------------------------------------------------
// Playback protocol errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Payload does not fit in the frame buffer.
    PayloadTooLarge { len: usize, max: usize },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadTooLarge { len, max } => {
                write!(f, "payload of {len} bytes exceeds maximum of {max}")
            }
        }
    }
}

impl core::error::Error for EncodeError {}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerError {
    /// The command was rejected before anything was written.
    Encode(EncodeError),
    /// The serial transport failed while writing the frame.
    Transport,
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "{e}"),
            Self::Transport => write!(f, "serial transport write failed"),
        }
    }
}

impl core::error::Error for PlayerError {}

impl From<EncodeError> for PlayerError {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

impl From<PlayerError> for Error {
    fn from(e: PlayerError) -> Self {
        Self::Player(e)
    }
}

/// Reasons a peer rejects a received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes than the smallest possible frame.
    TooShort,
    /// First byte is not the frame start marker.
    BadStartByte(u8),
    /// The length byte claims more data than a frame can carry.
    DataTooLong { len: usize, max: usize },
    /// The length byte disagrees with the number of bytes received.
    LengthMismatch,
    /// Recomputed checksum differs from the trailing byte.
    ChecksumMismatch { expected: u8, found: u8 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "frame too short"),
            Self::BadStartByte(b) => write!(f, "bad start byte 0x{b:02X}"),
            Self::DataTooLong { len, max } => {
                write!(f, "length byte {len} exceeds maximum of {max}")
            }
            Self::LengthMismatch => write!(f, "length byte does not match frame size"),
            Self::ChecksumMismatch { expected, found } => write!(
                f,
                "checksum mismatch (expected 0x{expected:02X}, found 0x{found:02X})"
            ),
        }
    }
}

impl core::error::Error for DecodeError {}
