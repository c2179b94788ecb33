//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the rules of the diorama: when to poll the
//! touch pads, when to start a track, and when polling is safe again.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
