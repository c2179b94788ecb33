//! System configuration parameters
//!
//! All tunable parameters for the diorama.  Values are fixed at build
//! time and handed to the drivers once at startup; nothing is re-tuned
//! while running.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::sensors::regs::MAX_ELECTRODES;

/// Number of touch pads wired to the sensor (electrodes `0..NUM_ELECTRODES`).
pub const NUM_ELECTRODES: usize = 3;

const _: () = assert!(NUM_ELECTRODES > 0 && NUM_ELECTRODES <= MAX_ELECTRODES);

/// Top-level operating mode selected at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Touch → play orchestration.
    Run,
    /// Dump filtered/baseline/delta for every electrode each loop.
    Debug,
}

/// Software touch detection parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TouchConfig {
    /// EMA smoothing factor applied to the raw delta, in (0, 1).
    pub alpha: f32,
    /// Smoothed delta below which a pad counts as touched (negative).
    pub touch_threshold: i16,
    /// Smoothed delta above which a touched pad counts as released.
    pub release_threshold: i16,
    /// Consecutive qualifying polls required to change state.
    pub debounce_count: u8,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            alpha: 0.4,
            touch_threshold: -25,
            release_threshold: -15,
            debounce_count: 5,
        }
    }
}

/// Playback timing for the audio module.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Grace period after a play command before the busy line is trusted.
    pub begin_timeout_ms: u32,
    /// Longest a track may play before the watchdog forces cooldown.
    pub max_duration_ms: u32,
    /// Quiet period after playback during which touches are ignored.
    pub end_cooldown_ms: u32,
    /// Send an explicit stop when the max-duration watchdog fires.
    pub stop_on_watchdog: bool,
    /// UART baud rate of the player module.
    pub baud_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            begin_timeout_ms: 150,
            max_duration_ms: 7000,
            end_cooldown_ms: 100,
            stop_on_watchdog: true,
            baud_rate: 9600,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub mode: RunMode,
    pub touch: TouchConfig,
    pub audio: AudioConfig,
    pub sensor: SensorConfig,

    // --- Timing ---
    /// Fixed delay at the end of every loop iteration (milliseconds)
    pub loop_delay_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Run,
            touch: TouchConfig::default(),
            audio: AudioConfig::default(),
            sensor: SensorConfig::default(),

            loop_delay_ms: 10,          // ~100 Hz
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl SystemConfig {
    /// Reject parameter combinations the detector or orchestrator cannot
    /// run with.
    pub fn validate(&self) -> Result<(), Error> {
        let t = &self.touch;
        if !(t.alpha > 0.0 && t.alpha < 1.0) {
            return Err(Error::Config("alpha must lie strictly between 0 and 1"));
        }
        if t.release_threshold >= 0 {
            return Err(Error::Config("release threshold must be negative"));
        }
        if t.touch_threshold >= t.release_threshold {
            return Err(Error::Config(
                "touch threshold must be below release threshold",
            ));
        }
        if t.debounce_count == 0 {
            return Err(Error::Config("debounce count must be non-zero"));
        }
        if self.audio.begin_timeout_ms >= self.audio.max_duration_ms {
            return Err(Error::Config(
                "begin timeout must be shorter than max playback duration",
            ));
        }
        if self.loop_delay_ms >= self.watchdog_timeout_ms {
            return Err(Error::Config("loop delay must be shorter than watchdog timeout"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MPR121 register values
// ---------------------------------------------------------------------------

/// One direction of the sensor's baseline tracking filter (datasheet §5.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineTracking {
    /// Maximum half delta.
    pub mhd: u8,
    /// Noise half delta.
    pub nhd: u8,
    /// Noise count limit.
    pub ncl: u8,
    /// Filter delay limit.
    pub fdl: u8,
}

/// Register values written to the MPR121 while it is stopped.
///
/// With the 0.2" PLA plate over the copper pads a real touch only pulls
/// filtered data ~30 counts below baseline.  The stock falling-baseline
/// filter treats that as drift and tracks it away, so `falling` is
/// slowed down considerably compared with `rising`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// 7-bit I2C address.
    pub address: u8,
    /// Hardware touch threshold, written to every channel.
    pub touch_threshold: u8,
    /// Hardware release threshold, written to every channel.
    pub release_threshold: u8,

    /// First filter iterations (CONFIG1 bits 7:6, AUTOCONFIG0 bits 7:6).
    pub ffi: u8,
    /// Global charge/discharge current in µA (CONFIG1 bits 5:0).
    pub cdc: u8,
    /// Global charge/discharge time code (CONFIG2 bits 7:5).
    pub cdt: u8,
    /// Second filter iterations (CONFIG2 bits 4:3).
    pub sfi: u8,
    /// Electrode sample interval code (CONFIG2 bits 2:0).
    pub esi: u8,

    pub rising: BaselineTracking,
    pub falling: BaselineTracking,
    /// Touched-state tracking: noise half delta, count limit, delay limit.
    pub touched_nhd: u8,
    pub touched_ncl: u8,
    pub touched_fdl: u8,
    /// Hardware debounce register (software debounce is used instead).
    pub debounce: u8,

    /// Calibration lock (ECR bits 7:6), mirrored into AUTOCONFIG0 BVA.
    pub calibration_lock: u8,
    /// Proximity detection enable (ECR bits 5:4).
    pub proximity: u8,
    /// Auto-configuration retry count (AUTOCONFIG0 bits 5:4).
    pub retry: u8,

    /// Use the chip's own CDC/CDT search instead of the fixed values.
    pub use_autoconfig: bool,
    /// Auto-configuration upper-side limit.
    pub upper_limit: u8,
    /// Auto-configuration lower-side limit.
    pub lower_limit: u8,
    /// Auto-configuration target level.
    pub target_level: u8,
    /// Pause after entering run mode so auto-configuration can settle.
    pub settle_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: 0x5A,
            touch_threshold: 12,
            release_threshold: 6,

            ffi: 0b10,       // 18 samples
            cdc: 0b10_0000,  // 32 µA
            cdt: 0b010,      // 1 µs
            sfi: 0b10,       // 10 samples
            esi: 0b010,      // 4 ms

            falling: BaselineTracking {
                mhd: 0x04,
                nhd: 0x01,
                ncl: 0x90,
                fdl: 0x06,
            },
            rising: BaselineTracking {
                mhd: 0x01,
                nhd: 0x01,
                ncl: 0x04,
                fdl: 0x00,
            },
            touched_nhd: 0,
            touched_ncl: 0,
            touched_fdl: 0,
            debounce: 0,

            calibration_lock: 0b11,
            proximity: 0b00,
            retry: 0b00,

            use_autoconfig: true,
            // Vdd = 3.3 V
            upper_limit: 200,  // ((Vdd - 0.7) / Vdd) * 256
            lower_limit: 130,  // USL * 0.65
            target_level: 180, // USL * 0.9
            settle_ms: 1000,
        }
    }
}

impl SensorConfig {
    /// CONFIG1 (0x5C): FFI | CDC.
    pub const fn config1(&self) -> u8 {
        ((self.ffi & 0x03) << 6) | (self.cdc & 0x3F)
    }

    /// CONFIG2 (0x5D): CDT | SFI | ESI.
    pub const fn config2(&self) -> u8 {
        ((self.cdt & 0x07) << 5) | ((self.sfi & 0x03) << 3) | (self.esi & 0x07)
    }

    /// ECR (0x5E) value that enables electrodes `0..electrodes`.
    pub const fn ecr_run(&self, electrodes: u8) -> u8 {
        ((self.calibration_lock & 0x03) << 6) | ((self.proximity & 0x03) << 4) | (electrodes & 0x0F)
    }

    /// AUTOCONFIG0 (0x7B).  FFI must match CONFIG1; BVA mirrors the
    /// calibration lock.
    pub const fn autoconfig0(&self) -> u8 {
        let enable = if self.use_autoconfig { 0b11 } else { 0b00 };
        ((self.ffi & 0x03) << 6)
            | ((self.retry & 0x03) << 4)
            | ((self.calibration_lock & 0x03) << 2)
            | enable
    }
}
