//! Diorama Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  I2cRegisterBus → Mpr121   ActiveLowBusyLine   Spotlights      │
//! │  UartTransport → AudioPlayer     LogEventSink  MonotonicClock  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  touch detector · Idle/Playing/Cooldown FSM            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Build with `DIORAMA_DEBUG=1` set to boot into the raw capacitance dump
//! instead of the touch → play loop.
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Delay, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, OutputPin as _, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use log::{debug, error, info, warn};

use diorama::adapters::hardware::HardwareAdapter;
use diorama::adapters::i2c_bus::I2cRegisterBus;
use diorama::adapters::log_sink::LogEventSink;
use diorama::adapters::time::MonotonicClock;
use diorama::adapters::uart::UartTransport;
use diorama::app::service::AppService;
use diorama::audio::player::AudioPlayer;
use diorama::config::{NUM_ELECTRODES, RunMode, SystemConfig};
use diorama::diagnostics::RegisterReport;
use diorama::drivers::busy_line::ActiveLowBusyLine;
use diorama::drivers::spotlight::Spotlights;
use diorama::drivers::watchdog::Watchdog;
use diorama::pins;
use diorama::sensors::mpr121::Mpr121;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Diorama v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let mut config = SystemConfig::default();
    if option_env!("DIORAMA_DEBUG").is_some() {
        config.mode = RunMode::Debug;
    }
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return Err(e.into());
    }

    let p = Peripherals::take()?;

    // ── 3. Capacitive sensor (I2C0) ───────────────────────────
    info!(
        "I2C: SDA=GPIO{} SCL=GPIO{} @ {} Hz",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::I2C_BAUD_HZ
    );
    let i2c = I2cDriver::new(
        p.i2c0,
        p.pins.gpio8,
        p.pins.gpio9,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_BAUD_HZ)),
    )?;
    let bus = I2cRegisterBus::new(i2c, config.sensor.address);
    let mut delay = Delay::new_default();

    let mut sensor = match Mpr121::initialize(bus, &mut delay, &config.sensor, NUM_ELECTRODES as u8)
    {
        Ok(s) => s,
        Err(e) => {
            error!("MPR121 init failed: {e}, halting");
            return Err(e.into());
        }
    };

    match RegisterReport::capture(&mut sensor) {
        Ok(report) => {
            info!("======= REGISTER VERIFICATION =======");
            for line in report.to_string().lines() {
                info!("{line}");
            }
            if let Ok(json) = report.to_json() {
                debug!("registers: {json}");
            }
            for name in report.mismatches(&config.sensor) {
                warn!("{name} read-back differs from configuration");
            }
        }
        Err(e) => warn!("Register dump failed: {e}"),
    }

    // ── 4. Audio module (UART1 + busy pin) ────────────────────
    info!(
        "Audio: TX=GPIO{} RX=GPIO{} BUSY=GPIO{} @ {} baud",
        pins::AUDIO_TX_GPIO,
        pins::AUDIO_RX_GPIO,
        pins::AUDIO_BUSY_GPIO,
        config.audio.baud_rate
    );
    let uart = UartDriver::new(
        p.uart1,
        p.pins.gpio21,
        p.pins.gpio20,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::new().baudrate(Hertz(config.audio.baud_rate)),
    )?;
    let player = AudioPlayer::new(UartTransport::new(uart));

    let mut busy_pin = PinDriver::input(p.pins.gpio4)?;
    busy_pin.set_pull(Pull::Up)?;
    let busy = ActiveLowBusyLine::new(busy_pin);

    // ── 5. Spotlights ─────────────────────────────────────────
    info!("Spotlights: GPIO{:?}", pins::SPOTLIGHT_GPIOS);
    let spotlights = Spotlights::new([
        PinDriver::output(p.pins.gpio2.downgrade_output())?,
        PinDriver::output(p.pins.gpio3.downgrade_output())?,
        PinDriver::output(p.pins.gpio5.downgrade_output())?,
    ]);

    // ── 6. Application core ───────────────────────────────────
    let mut hw = HardwareAdapter::new(sensor, busy, player, spotlights);
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config.clone());
    app.start(&mut sink);

    let clock = MonotonicClock::new();
    let watchdog = Watchdog::arm(&config);

    // ── 7. Run loop ───────────────────────────────────────────
    loop {
        app.tick(clock.uptime_ms(), &mut hw, &mut sink);
        watchdog.feed();
        FreeRtos::delay_ms(config.loop_delay_ms);
    }
}
