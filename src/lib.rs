//! Diorama firmware library.
//!
//! Capacitive touch pads (MPR121) trigger audio tracks on a DY-HV20T
//! player.  Exposes the pure-logic modules for integration testing; all
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod audio;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fsm;
pub mod pins;

pub mod adapters;
pub mod drivers;
pub mod sensors;
