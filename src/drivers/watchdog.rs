//! Task watchdog for the run loop.
//!
//! A stuck I2C transaction or a UART write that never drains would freeze
//! the loop, and with it the playback watchdog in `Playing`.  The ESP-IDF
//! task watchdog catches that case and resets the chip.  On host builds
//! it is a no-op.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure,
    esp_task_wdt_reset,
};
use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::config::SystemConfig;

pub struct Watchdog {
    /// Whether the calling task is registered with the TWDT.
    #[cfg(target_os = "espidf")]
    armed: bool,
}

impl Watchdog {
    /// Arm the watchdog for the run loop's task.
    ///
    /// Failure to subscribe is logged, not returned: the diorama keeps
    /// running unguarded rather than refusing to boot.
    pub fn arm(config: &SystemConfig) -> Self {
        let timeout_ms = config.watchdog_timeout_ms;

        #[cfg(target_os = "espidf")]
        {
            let armed = subscribe_current_task(timeout_ms);
            if armed {
                info!("WDT | armed, {timeout_ms} ms");
            } else {
                warn!("WDT | not armed, run loop is unguarded");
            }
            Self { armed }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("WDT | sim, {timeout_ms} ms (no-op)");
            Self {}
        }
    }

    /// Once per loop iteration.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.armed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}

#[cfg(target_os = "espidf")]
fn subscribe_current_task(timeout_ms: u32) -> bool {
    let cfg = esp_task_wdt_config_t {
        timeout_ms,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // The bootloader may have started the TWDT already; reconfigure wins.
    let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
    if ret != ESP_OK {
        warn!("WDT | reconfigure returned {ret}");
    }
    let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
    if ret != ESP_OK {
        warn!("WDT | subscribe returned {ret}");
    }
    ret == ESP_OK
}
