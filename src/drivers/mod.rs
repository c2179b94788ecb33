//! Digital I/O drivers and the task watchdog.

pub mod busy_line;
pub mod spotlight;
pub mod watchdog;
