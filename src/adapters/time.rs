//! Millisecond clock for the run loop.
//!
//! Every FSM timeout (grace period, playback watchdog, cooldown) is
//! measured against this clock, so it must never go backwards.  On the
//! device it reads the ESP-IDF high-resolution timer; on host it reads
//! `std::time::Instant`.  Both count from construction.

#[cfg(not(target_os = "espidf"))]
use std::time::Instant;

pub struct MonotonicClock {
    #[cfg(target_os = "espidf")]
    epoch_us: u64,
    #[cfg(not(target_os = "espidf"))]
    epoch: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            epoch_us: timer_us(),
            #[cfg(not(target_os = "espidf"))]
            epoch: Instant::now(),
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        timer_us().saturating_sub(self.epoch_us)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    /// Milliseconds since the clock was created.
    pub fn uptime_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }
}

#[cfg(target_os = "espidf")]
fn timer_us() -> u64 {
    // esp_timer counts up from boot and is never negative.
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
}
