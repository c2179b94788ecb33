//! GPIO / peripheral pin assignments for the ESP32-C3 diorama board.
//!
//! Single source of truth — `main` and the startup log reference this
//! module rather than hard-coding pin numbers.

use crate::config::NUM_ELECTRODES;

// ---------------------------------------------------------------------------
// MPR121 capacitive touch controller (I2C0)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
/// I2C bus clock.  The MPR121 supports fast mode.
pub const I2C_BAUD_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// DY-HV20T audio module (UART1)
// ---------------------------------------------------------------------------

/// ESP32-C3 RX ← module TX.  Wired but unused: the module never answers.
pub const AUDIO_RX_GPIO: i32 = 20;
/// ESP32-C3 TX → module RX.
pub const AUDIO_TX_GPIO: i32 = 21;
/// Module BUSY output, LOW while playing (A4).
pub const AUDIO_BUSY_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Spotlights (optional accessory header), one per electrode
// ---------------------------------------------------------------------------

pub const SPOTLIGHT_GPIOS: [i32; NUM_ELECTRODES] = [2, 3, 5];
