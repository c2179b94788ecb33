//! Capacitive sensing: the MPR121 driver and the software touch detector.
//!
//! ```text
//!   I2C ──▶ RegisterBus ──▶ Mpr121 ──(TouchSensorPort)──▶ touch::poll ──▶ TouchMask
//! ```
//!
//! The driver owns every register-level rule (stop mode, reset check,
//! 10-bit reads).  The detector only sees `filtered` and `baseline`.

pub mod mpr121;
pub mod regs;
pub mod touch;
