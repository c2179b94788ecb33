//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (today: the serial log).

use crate::error::{PlayerError, SensorError};
use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A play command was handed to the audio module.
    TrackTriggered { electrode: usize, track: u16 },

    /// The max-duration watchdog ended playback.
    PlaybackTimedOut { elapsed_ms: u64 },

    /// One electrode's raw readings (debug mode only).
    CapData {
        electrode: u8,
        filtered: u16,
        baseline: u16,
        delta: i16,
    },

    /// A touch poll was abandoned.
    SensorFault(SensorError),

    /// A playback command could not be delivered.
    PlayerFault(PlayerError),
}
