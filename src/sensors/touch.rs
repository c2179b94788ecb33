//! Software touch detection: EMA smoothing, hysteresis, and debounce.
//!
//! The MPR121's own touch status is unusable behind the acrylic/PLA
//! plate (deltas of ~30 counts), so detection runs here on
//! `filtered - baseline` instead.
//!
//! ```text
//!              smoothed < touch_threshold  × debounce_count
//!   RELEASED ───────────────────────────────────────────────▶ TOUCHED
//!       ▲                                                        │
//!       └────────────────────────────────────────────────────────┘
//!              smoothed > release_threshold × debounce_count
//! ```
//!
//! Per-electrode state lives in caller-owned [`ElectrodeState`] records
//! so the algorithm runs without hardware.  Any poll that breaks a run
//! of qualifying samples resets that direction's counter to zero.
//!
//! Must only be polled while no audio is playing: speaker output
//! corrupts the chip's baseline tracking.  The orchestrator enforces
//! this, not this module.

use crate::app::ports::TouchSensorPort;
use crate::config::TouchConfig;
use crate::error::SensorError;

// ---------------------------------------------------------------------------
// Touch mask
// ---------------------------------------------------------------------------

/// One bit per electrode; bit `i` set means electrode `i` is touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TouchMask(u16);

impl TouchMask {
    pub const NONE: Self = Self(0);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn is_touched(self, electrode: usize) -> bool {
        electrode < 16 && self.0 & (1 << electrode) != 0
    }

    pub fn set(&mut self, electrode: usize) {
        if electrode < 16 {
            self.0 |= 1 << electrode;
        }
    }

    /// Lowest-index electrode touched now but not in `previous`.
    pub fn first_new_touch(self, previous: Self) -> Option<usize> {
        let rising = self.0 & !previous.0;
        if rising == 0 {
            None
        } else {
            Some(rising.trailing_zeros() as usize)
        }
    }

    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

// ---------------------------------------------------------------------------
// Per-electrode state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PadState {
    #[default]
    Released,
    Touched,
}

/// Smoothing and debounce state for one electrode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElectrodeState {
    /// EMA of `filtered - baseline`.
    pub smoothed: f32,
    /// Consecutive polls below the touch threshold while released.
    pub touch_count: u8,
    /// Consecutive polls above the release threshold while touched.
    pub release_count: u8,
    pub state: PadState,
}

impl ElectrodeState {
    pub fn is_touched(&self) -> bool {
        self.state == PadState::Touched
    }

    /// Fold one raw delta into the state.  Returns whether the pad is
    /// touched afterwards.
    pub fn update(&mut self, delta: i16, cfg: &TouchConfig) -> bool {
        self.smoothed += cfg.alpha * (f32::from(delta) - self.smoothed);

        match self.state {
            PadState::Released => {
                if self.smoothed < f32::from(cfg.touch_threshold) {
                    self.touch_count = self.touch_count.saturating_add(1);
                    if self.touch_count >= cfg.debounce_count {
                        self.state = PadState::Touched;
                        self.release_count = 0;
                    }
                } else {
                    self.touch_count = 0;
                }
            }
            PadState::Touched => {
                if self.smoothed > f32::from(cfg.release_threshold) {
                    self.release_count = self.release_count.saturating_add(1);
                    if self.release_count >= cfg.debounce_count {
                        self.state = PadState::Released;
                        self.touch_count = 0;
                    }
                } else {
                    self.release_count = 0;
                }
            }
        }

        self.is_touched()
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Classify one set of raw deltas, updating every electrode's state.
pub fn classify<const N: usize>(
    deltas: &[i16; N],
    states: &mut [ElectrodeState; N],
    cfg: &TouchConfig,
) -> TouchMask {
    const { assert!(N <= 16, "touch mask holds at most 16 electrodes") };

    let mut mask = TouchMask::NONE;
    for (i, (state, &delta)) in states.iter_mut().zip(deltas).enumerate() {
        if state.update(delta, cfg) {
            mask.set(i);
        }
    }
    mask
}

/// Read every electrode from `sensor`, then classify.
///
/// All reads complete before any state is touched, so a bus error
/// mid-poll leaves the detector exactly as it was.
pub fn poll<S, const N: usize>(
    sensor: &mut S,
    states: &mut [ElectrodeState; N],
    cfg: &TouchConfig,
) -> Result<TouchMask, SensorError>
where
    S: TouchSensorPort + ?Sized,
{
    let deltas = read_deltas::<S, N>(sensor)?;
    Ok(classify(&deltas, states, cfg))
}

/// `filtered - baseline` for electrodes `0..N`.
///
/// Electrodes the sensor is not running read as a zero delta and are
/// never addressed on the bus.
pub fn read_deltas<S, const N: usize>(sensor: &mut S) -> Result<[i16; N], SensorError>
where
    S: TouchSensorPort + ?Sized,
{
    let running = sensor.electrode_count().min(N);
    let mut deltas = [0i16; N];
    for (i, d) in deltas.iter_mut().enumerate().take(running) {
        let electrode = i as u8;
        let filtered = sensor.read_filtered(electrode)?;
        let baseline = sensor.read_baseline(electrode)?;
        *d = filtered as i16 - baseline as i16;
    }
    Ok(deltas)
}
