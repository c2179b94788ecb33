//! Per-electrode spotlight outputs.
//!
//! One push-pull output per electrode, driven high when that pad
//! triggers a track and low again when cooldown ends.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::SpotlightPort;

/// `N` spotlight pins, indexed like the electrodes.
pub struct Spotlights<P, const N: usize> {
    pins: [P; N],
}

impl<P: OutputPin, const N: usize> Spotlights<P, N> {
    /// Take ownership of the pins and drive them all low.
    pub fn new(pins: [P; N]) -> Self {
        let mut s = Self { pins };
        s.all_off();
        s
    }
}

impl<P: OutputPin, const N: usize> SpotlightPort for Spotlights<P, N> {
    fn on(&mut self, index: usize) {
        if let Some(pin) = self.pins.get_mut(index) {
            if let Err(e) = pin.set_high() {
                warn!("spotlight {index} on failed: {e:?}");
            }
        }
    }

    fn off(&mut self, index: usize) {
        if let Some(pin) = self.pins.get_mut(index) {
            if let Err(e) = pin.set_low() {
                warn!("spotlight {index} off failed: {e:?}");
            }
        }
    }

    fn all_off(&mut self) {
        for i in 0..N {
            self.off(i);
        }
    }
}
