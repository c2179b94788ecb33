//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the inputs sampled this loop, one-shot commands for the
//! service to carry out, the current playback session, and the config.
//! Think of it as the "blackboard" in a blackboard architecture.

use crate::config::SystemConfig;
use crate::sensors::touch::TouchMask;

// ---------------------------------------------------------------------------
// Inputs (written by the service before each tick)
// ---------------------------------------------------------------------------

/// What the service sampled this loop iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inputs {
    /// Audio module busy line, already converted from active-low.
    pub busy: bool,
    /// Fresh touch mask, or `None` when the state does not poll or the
    /// poll failed.
    pub touch: Option<TouchMask>,
}

// ---------------------------------------------------------------------------
// Commands (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// One-shot requests raised by state handlers during a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Commands {
    /// Send `play_track` with this 1-based track number.
    pub play_track: Option<u16>,
    /// Send `stop`.
    pub stop: bool,
    /// Light the spotlight for this electrode.
    pub spotlight_on: Option<usize>,
    /// Extinguish every spotlight.
    pub spotlights_off: bool,
}

impl Commands {
    /// Return the pending commands and clear them.
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}

// ---------------------------------------------------------------------------
// Playback session
// ---------------------------------------------------------------------------

/// Timestamps of the current trigger → playback → cooldown cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    /// Electrode that triggered playback.
    pub electrode: Option<usize>,
    /// When the play command was sent.
    pub started_ms: u64,
    /// When playback was judged finished (busy released or watchdog).
    pub ended_ms: u64,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Monotonic time of the current tick (milliseconds since boot).
    pub now_ms: u64,

    // -- Inputs --
    pub inputs: Inputs,
    /// Mask from the last successful poll, for rising-edge detection.
    pub last_touched: TouchMask,

    // -- Outputs --
    pub commands: Commands,
    /// Set by `Playing` when the max-duration watchdog fired; holds the
    /// elapsed playback time.
    pub timed_out: Option<u64>,

    pub session: Session,

    // -- Configuration --
    pub config: SystemConfig,
}

impl FsmContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            now_ms: 0,
            inputs: Inputs::default(),
            last_touched: TouchMask::NONE,
            commands: Commands::default(),
            timed_out: None,
            session: Session::default(),
            config,
        }
    }

    /// Milliseconds since the play command was sent.
    pub fn ms_since_trigger(&self) -> u64 {
        self.now_ms.saturating_sub(self.session.started_ms)
    }

    /// Milliseconds since playback ended.
    pub fn ms_since_playback_end(&self) -> u64 {
        self.now_ms.saturating_sub(self.session.ended_ms)
    }
}
