//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (register bus, capacitive sensor, busy line, audio
//! player, spotlights, event sinks) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.
//!
//! All port calls are synchronous and are expected to return promptly:
//! a stalled call blocks the whole control loop, including the playback
//! watchdog.

use crate::error::{PlayerError, SensorError};

// ───────────────────────────────────────────────────────────────
// Register bus (driven adapter: I2C → sensor driver)
// ───────────────────────────────────────────────────────────────

/// Address-indexed 8-bit register access to a single peripheral.
pub trait RegisterBus {
    /// Read one register.
    fn read_byte(&mut self, reg: u8) -> Result<u8, SensorError>;

    /// Write one register.
    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), SensorError>;
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    fn read_byte(&mut self, reg: u8) -> Result<u8, SensorError> {
        (**self).read_byte(reg)
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        (**self).write_byte(reg, value)
    }
}

// ───────────────────────────────────────────────────────────────
// Capacitive sensor (driven adapter: sensor driver → touch detector)
// ───────────────────────────────────────────────────────────────

/// Read-side port for a capacitive front end.
///
/// Both reads return 10-bit values on the same scale so that
/// `filtered - baseline` is meaningful.
pub trait TouchSensorPort {
    /// Number of electrodes in use (`0..electrode_count()` are valid polls).
    fn electrode_count(&self) -> usize;

    /// Filtered capacitance reading for one electrode.
    fn read_filtered(&mut self, electrode: u8) -> Result<u16, SensorError>;

    /// Tracked baseline for one electrode.
    fn read_baseline(&mut self, electrode: u8) -> Result<u16, SensorError>;

    /// Write a configuration register, honouring any mode constraints.
    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Busy line (driven adapter: audio module → domain)
// ───────────────────────────────────────────────────────────────

/// Instantaneous, non-blocking sample of the player's busy signal.
pub trait BusyLinePort {
    /// `true` while the player reports audio output.
    fn is_busy(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Player port (driven adapter: domain → audio module)
// ───────────────────────────────────────────────────────────────

/// Write-side port: fire-and-forget playback commands.
pub trait PlayerPort {
    /// Start the given 1-based track.
    fn play_track(&mut self, track: u16) -> Result<(), PlayerError>;

    /// Stop playback.
    fn stop(&mut self) -> Result<(), PlayerError>;
}

// ───────────────────────────────────────────────────────────────
// Spotlights (driven adapter: domain → accessory outputs)
// ───────────────────────────────────────────────────────────────

/// Optional per-electrode light outputs.
pub trait SpotlightPort {
    /// Light the spotlight for `index`.  Out-of-range indices are ignored.
    fn on(&mut self, index: usize);

    /// Extinguish the spotlight for `index`.
    fn off(&mut self, index: usize);

    /// Extinguish every spotlight.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Aggregate
// ───────────────────────────────────────────────────────────────

/// Everything the run loop touches in one iteration.
///
/// Blanket-implemented so a single adapter (or mock) satisfying every
/// port can be passed as one `&mut` without double borrows.
pub trait Hardware: TouchSensorPort + BusyLinePort + PlayerPort + SpotlightPort {}

impl<T: TouchSensorPort + BusyLinePort + PlayerPort + SpotlightPort> Hardware for T {}
