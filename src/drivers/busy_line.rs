//! DY-HV20T busy pin.
//!
//! The module pulls BUSY low while audio is playing; the idle level is
//! high.  Sampled once per loop, never interrupt-driven.

use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::BusyLinePort;

pub struct ActiveLowBusyLine<P> {
    pin: P,
}

impl<P: InputPin> ActiveLowBusyLine<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> BusyLinePort for ActiveLowBusyLine<P> {
    /// A failed read counts as busy; the playback watchdog bounds how
    /// long that can last.
    fn is_busy(&mut self) -> bool {
        self.pin.is_low().unwrap_or_else(|e| {
            warn!("busy line read failed: {e:?}");
            true
        })
    }
}
