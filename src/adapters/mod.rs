//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                     | Connects to                |
//! |-------------|--------------------------------|----------------------------|
//! | `i2c_bus`   | RegisterBus                    | any embedded-hal I2C bus   |
//! | `hardware`  | TouchSensorPort, BusyLinePort, | sensor, busy pin, player,  |
//! |             | PlayerPort, SpotlightPort      | spotlight pins             |
//! | `log_sink`  | EventSink                      | Serial log output          |
//! | `time`      | —                              | ESP32 system timer         |
//! | `uart`      | CommandTransport               | ESP-IDF UART driver        |

pub mod hardware;
pub mod i2c_bus;
pub mod log_sink;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
