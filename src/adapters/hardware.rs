//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Bundles the touch sensor, busy line, audio player and spotlights so
//! [`AppService::tick`](crate::app::service::AppService::tick) can take
//! them as a single `&mut impl Hardware`.  Every port call is a plain
//! delegation; the adapter adds no behaviour of its own.

use crate::app::ports::{BusyLinePort, PlayerPort, SpotlightPort, TouchSensorPort};
use crate::error::{PlayerError, SensorError};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<S, B, P, L> {
    pub sensor: S,
    pub busy: B,
    pub player: P,
    pub spotlights: L,
}

impl<S, B, P, L> HardwareAdapter<S, B, P, L> {
    pub fn new(sensor: S, busy: B, player: P, spotlights: L) -> Self {
        Self {
            sensor,
            busy,
            player,
            spotlights,
        }
    }
}

// ── TouchSensorPort ───────────────────────────────────────────

impl<S: TouchSensorPort, B, P, L> TouchSensorPort for HardwareAdapter<S, B, P, L> {
    fn electrode_count(&self) -> usize {
        self.sensor.electrode_count()
    }

    fn read_filtered(&mut self, electrode: u8) -> Result<u16, SensorError> {
        self.sensor.read_filtered(electrode)
    }

    fn read_baseline(&mut self, electrode: u8) -> Result<u16, SensorError> {
        self.sensor.read_baseline(electrode)
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.sensor.write_register(reg, value)
    }
}

// ── BusyLinePort ──────────────────────────────────────────────

impl<S, B: BusyLinePort, P, L> BusyLinePort for HardwareAdapter<S, B, P, L> {
    fn is_busy(&mut self) -> bool {
        self.busy.is_busy()
    }
}

// ── PlayerPort ────────────────────────────────────────────────

impl<S, B, P: PlayerPort, L> PlayerPort for HardwareAdapter<S, B, P, L> {
    fn play_track(&mut self, track: u16) -> Result<(), PlayerError> {
        self.player.play_track(track)
    }

    fn stop(&mut self) -> Result<(), PlayerError> {
        self.player.stop()
    }
}

// ── SpotlightPort ─────────────────────────────────────────────

impl<S, B, P, L: SpotlightPort> SpotlightPort for HardwareAdapter<S, B, P, L> {
    fn on(&mut self, index: usize) {
        self.spotlights.on(index);
    }

    fn off(&mut self, index: usize) {
        self.spotlights.off(index);
    }

    fn all_off(&mut self) {
        self.spotlights.all_off();
    }
}
