//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production), one
//! tagged line per event.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::TrackTriggered { electrode, track } => {
                info!("TRACK | electrode={} track={}", electrode, track);
            }
            AppEvent::PlaybackTimedOut { elapsed_ms } => {
                warn!("WDOG | playback forced to cooldown after {} ms", elapsed_ms);
            }
            AppEvent::CapData {
                electrode,
                filtered,
                baseline,
                delta,
            } => {
                info!("CAP | {}, {}, {}, {}", electrode, filtered, baseline, delta);
            }
            AppEvent::SensorFault(e) => {
                warn!("FAULT | sensor: {}", e);
            }
            AppEvent::PlayerFault(e) => {
                warn!("FAULT | player: {}", e);
            }
        }
    }
}
