//! MPR121 capacitive touch controller driver.
//!
//! Brings the chip from power-on to a known running configuration and
//! exposes per-electrode filtered/baseline reads.
//!
//! ## Stop-mode contract
//!
//! The datasheet (§5.1) only permits configuration writes while the
//! chip is in stop mode (ECR = 0).  Every write that is not to a
//! run-mode-safe register goes through [`StoppedMode`], a scoped guard
//! that snapshots ECR and clears it.  [`Mpr121::with_stopped`] writes the
//! snapshot back explicitly and reports a failed restore; the guard's
//! `Drop` restores on any path that skips that, including a panic.
//! There is no other path to a configuration register.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use super::regs::{self, MAX_ELECTRODES};
use crate::app::ports::{RegisterBus, TouchSensorPort};
use crate::config::SensorConfig;
use crate::error::{InitError, SensorError};

/// Pause after soft reset; the chip ignores the bus until it has settled.
const RESET_SETTLE_MS: u32 = 10;
/// Pause after forcing stop mode before the first read-back.
const STOP_SETTLE_MS: u32 = 10;

// ---------------------------------------------------------------------------
// Scoped stop-mode access
// ---------------------------------------------------------------------------

/// Exclusive stop-mode access to the chip.
///
/// While this guard lives the electrodes are stopped and configuration
/// registers may be written.  [`finish`](Self::finish) restores the ECR
/// value that was in force when it was acquired; dropping an unfinished
/// guard attempts the same restore.
pub struct StoppedMode<'a, B: RegisterBus> {
    bus: &'a mut B,
    saved_ecr: u8,
    restored: bool,
}

impl<'a, B: RegisterBus> StoppedMode<'a, B> {
    fn enter(bus: &'a mut B) -> Result<Self, SensorError> {
        let saved_ecr = bus.read_byte(regs::ECR)?;
        if saved_ecr != 0 {
            bus.write_byte(regs::ECR, 0)?;
        }
        Ok(Self {
            bus,
            saved_ecr,
            restored: false,
        })
    }

    /// Write a configuration register.  ECR itself is owned by the guard.
    pub fn write(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        debug_assert_ne!(reg, regs::ECR, "ECR is restored by the guard");
        self.bus.write_byte(reg, value)
    }

    /// Read any register.
    pub fn read(&mut self, reg: u8) -> Result<u8, SensorError> {
        self.bus.read_byte(reg)
    }

    /// Put the chip back in the run state it was in before `enter`.
    fn finish(mut self) -> Result<(), SensorError> {
        self.restored = true;
        self.restore()
    }

    fn restore(&mut self) -> Result<(), SensorError> {
        if self.saved_ecr == 0 {
            return Ok(());
        }
        self.bus.write_byte(regs::ECR, self.saved_ecr)
    }
}

impl<B: RegisterBus> Drop for StoppedMode<'_, B> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.restore() {
            warn!(
                "MPR121: failed to restore ECR=0x{:02X} after config write: {}",
                self.saved_ecr, e
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// An initialised, running MPR121.
pub struct Mpr121<B: RegisterBus> {
    bus: B,
    electrodes: u8,
}

impl<B: RegisterBus> Mpr121<B> {
    /// Reset and configure the chip, leaving electrodes `0..electrodes`
    /// running.
    ///
    /// 1. Soft reset, then wait for the chip to settle.
    /// 2. Force stop mode (ECR = 0).
    /// 3. Verify CONFIG2 holds its reset value.
    /// 4. Thresholds on all 12 channels, filter config, baseline tracking.
    /// 5. Auto-configuration on or off per `cfg.use_autoconfig`.
    /// 6. Enter run mode with the in-use electrodes enabled.
    /// 7. Let auto-configuration settle.
    pub fn initialize(
        mut bus: B,
        delay: &mut impl DelayNs,
        cfg: &SensorConfig,
        electrodes: u8,
    ) -> Result<Self, InitError> {
        let electrodes = electrodes.clamp(1, MAX_ELECTRODES as u8);

        bus.write_byte(regs::SOFTRESET, regs::SOFTRESET_MAGIC)
            .map_err(|_| InitError::NotFound)?;
        delay.delay_ms(RESET_SETTLE_MS);

        bus.write_byte(regs::ECR, 0)?;
        delay.delay_ms(STOP_SETTLE_MS);

        let found = bus.read_byte(regs::CONFIG2)?;
        if found != regs::CONFIG2_RESET_VALUE {
            return Err(InitError::ResetVerificationFailed {
                expected: regs::CONFIG2_RESET_VALUE,
                found,
            });
        }

        let mut dev = Self { bus, electrodes };
        dev.with_stopped(|s| {
            write_thresholds(s, cfg.touch_threshold, cfg.release_threshold)?;

            s.write(regs::CONFIG1, cfg.config1())?;
            s.write(regs::CONFIG2, cfg.config2())?;

            s.write(regs::MHDR, cfg.rising.mhd)?;
            s.write(regs::NHDR, cfg.rising.nhd)?;
            s.write(regs::NCLR, cfg.rising.ncl)?;
            s.write(regs::FDLR, cfg.rising.fdl)?;

            s.write(regs::MHDF, cfg.falling.mhd)?;
            s.write(regs::NHDF, cfg.falling.nhd)?;
            s.write(regs::NCLF, cfg.falling.ncl)?;
            s.write(regs::FDLF, cfg.falling.fdl)?;

            s.write(regs::NHDT, cfg.touched_nhd)?;
            s.write(regs::NCLT, cfg.touched_ncl)?;
            s.write(regs::FDLT, cfg.touched_fdl)?;

            s.write(regs::DEBOUNCE, cfg.debounce)?;

            write_autoconfig(s, cfg)
        })?;

        // Auto-configuration (if enabled) runs on the stop → run edge.
        dev.bus.write_byte(regs::ECR, cfg.ecr_run(electrodes))?;
        info!(
            "MPR121 @0x{:02X}: running {} electrodes (ECR=0x{:02X}, autoconfig={})",
            cfg.address,
            electrodes,
            cfg.ecr_run(electrodes),
            cfg.use_autoconfig
        );

        if cfg.use_autoconfig && cfg.settle_ms > 0 {
            delay.delay_ms(cfg.settle_ms);
        }

        Ok(dev)
    }

    /// Run `f` with exclusive stop-mode access; run state is restored
    /// on every exit path.
    pub fn with_stopped<T>(
        &mut self,
        f: impl FnOnce(&mut StoppedMode<'_, B>) -> Result<T, SensorError>,
    ) -> Result<T, SensorError> {
        let mut stopped = StoppedMode::enter(&mut self.bus)?;
        let result = f(&mut stopped);
        let restored = stopped.finish();
        if let Err(e) = restored {
            warn!("MPR121: run state not restored: {e}");
        }
        // The closure's own failure is reported first.
        let value = result?;
        restored?;
        Ok(value)
    }

    /// Write one register, stopping the chip around it when required.
    pub fn write_register(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        if regs::is_run_mode_safe(reg) {
            return self.bus.write_byte(reg, value);
        }
        self.with_stopped(|s| s.write(reg, value))
    }

    /// Read one register.
    pub fn read_register(&mut self, reg: u8) -> Result<u8, SensorError> {
        self.bus.read_byte(reg)
    }

    /// 10-bit filtered data: low byte plus bits 1:0 of the high register.
    pub fn read_filtered(&mut self, electrode: u8) -> Result<u16, SensorError> {
        check_electrode(electrode)?;
        let lsb = self.bus.read_byte(regs::FILTDATA_0L + 2 * electrode)?;
        let msb = self.bus.read_byte(regs::FILTDATA_0H + 2 * electrode)?;
        Ok((u16::from(msb & 0x03) << 8) | u16::from(lsb))
    }

    /// Baseline register holds the upper 8 of 10 bits; shift to match
    /// the filtered-data scale.
    pub fn read_baseline(&mut self, electrode: u8) -> Result<u16, SensorError> {
        check_electrode(electrode)?;
        let raw = self.bus.read_byte(regs::BASELINE_0 + electrode)?;
        Ok(u16::from(raw) << 2)
    }

    /// Electrodes enabled in run mode.
    pub fn electrodes(&self) -> u8 {
        self.electrodes
    }

    /// Wrap a chip that is already configured and running, without
    /// touching any register.
    pub fn from_parts(bus: B, electrodes: u8) -> Self {
        Self {
            bus,
            electrodes: electrodes.clamp(1, MAX_ELECTRODES as u8),
        }
    }

    /// Release the underlying bus.
    pub fn free(self) -> B {
        self.bus
    }
}

impl<B: RegisterBus> TouchSensorPort for Mpr121<B> {
    fn electrode_count(&self) -> usize {
        self.electrodes as usize
    }

    fn read_filtered(&mut self, electrode: u8) -> Result<u16, SensorError> {
        Mpr121::read_filtered(self, electrode)
    }

    fn read_baseline(&mut self, electrode: u8) -> Result<u16, SensorError> {
        Mpr121::read_baseline(self, electrode)
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        Mpr121::write_register(self, reg, value)
    }
}

fn check_electrode(electrode: u8) -> Result<(), SensorError> {
    if (electrode as usize) < MAX_ELECTRODES {
        Ok(())
    } else {
        Err(SensorError::ElectrodeOutOfRange(electrode))
    }
}

fn write_thresholds<B: RegisterBus>(
    s: &mut StoppedMode<'_, B>,
    touch: u8,
    release: u8,
) -> Result<(), SensorError> {
    // Uniform across every addressable channel, wired or not.
    for i in 0..MAX_ELECTRODES as u8 {
        s.write(regs::TOUCHTH_0 + 2 * i, touch)?;
        s.write(regs::RELEASETH_0 + 2 * i, release)?;
    }
    Ok(())
}

fn write_autoconfig<B: RegisterBus>(
    s: &mut StoppedMode<'_, B>,
    cfg: &SensorConfig,
) -> Result<(), SensorError> {
    s.write(regs::AUTOCONFIG0, cfg.autoconfig0())?;
    if cfg.use_autoconfig {
        s.write(regs::UPLIMIT, cfg.upper_limit)?;
        s.write(regs::TARGETLIMIT, cfg.target_level)?;
        s.write(regs::LOWLIMIT, cfg.lower_limit)?;
        debug!(
            "MPR121: autoconfig USL={} TL={} LSL={}",
            cfg.upper_limit, cfg.target_level, cfg.lower_limit
        );
    }
    Ok(())
}
