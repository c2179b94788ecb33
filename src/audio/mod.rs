//! Audio playback: DY-HV20T command framing and the fire-and-forget player.
//!
//! ```text
//!   AppService ──(PlayerPort)──▶ AudioPlayer ──▶ codec::encode_frame ──▶ CommandTransport (UART)
//! ```
//!
//! The player never reads anything back over the serial line.  Whether a
//! track is actually playing is learned from the module's busy pin.

pub mod codec;
pub mod player;
pub mod transport;
