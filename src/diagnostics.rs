//! Sensor register diagnostics.
//!
//! [`RegisterReport`] snapshots the MPR121 registers that decide whether
//! touch detection can work at all: run/stop mode, the global filter and
//! charge settings, auto-configuration enables, the falling-baseline
//! tracking set, and the per-electrode charge current/time the chip
//! ended up with after auto-configuration.  Captured once at startup and
//! logged both as a human-readable dump and as JSON.

use core::fmt;

use serde::Serialize;

use crate::app::ports::RegisterBus;
use crate::config::{BaselineTracking, SensorConfig};
use crate::error::SensorError;
use crate::sensors::mpr121::Mpr121;
use crate::sensors::regs::{self, MAX_ELECTRODES};

/// Point-in-time register snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterReport {
    pub ecr: u8,
    pub config1: u8,
    pub config2: u8,
    pub autoconfig0: u8,
    pub falling: BaselineTracking,
    /// Charge/discharge current per electrode (µA).
    pub cdc: [u8; MAX_ELECTRODES],
    /// Charge/discharge time code per electrode.
    pub cdt: [u8; MAX_ELECTRODES],
}

impl RegisterReport {
    /// Read every reported register.  Reads only; safe in run mode.
    pub fn capture<B: RegisterBus>(dev: &mut Mpr121<B>) -> Result<Self, SensorError> {
        let mut cdc = [0u8; MAX_ELECTRODES];
        for (i, c) in cdc.iter_mut().enumerate() {
            *c = dev.read_register(regs::CHARGECURR_0 + i as u8)?;
        }

        // Two electrodes per register: even in bits 2:0, odd in bits 6:4.
        let mut cdt = [0u8; MAX_ELECTRODES];
        for pair in 0..MAX_ELECTRODES / 2 {
            let packed = dev.read_register(regs::CHARGETIME_1 + pair as u8)?;
            cdt[2 * pair] = packed & 0x07;
            cdt[2 * pair + 1] = (packed >> 4) & 0x07;
        }

        Ok(Self {
            ecr: dev.read_register(regs::ECR)?,
            config1: dev.read_register(regs::CONFIG1)?,
            config2: dev.read_register(regs::CONFIG2)?,
            autoconfig0: dev.read_register(regs::AUTOCONFIG0)?,
            falling: BaselineTracking {
                mhd: dev.read_register(regs::MHDF)?,
                nhd: dev.read_register(regs::NHDF)?,
                ncl: dev.read_register(regs::NCLF)?,
                fdl: dev.read_register(regs::FDLF)?,
            },
            cdc,
            cdt,
        })
    }

    pub fn is_running(&self) -> bool {
        self.ecr != 0
    }

    pub fn ffi(&self) -> u8 {
        (self.config1 >> 6) & 0x03
    }

    pub fn global_cdc(&self) -> u8 {
        self.config1 & 0x3F
    }

    pub fn global_cdt(&self) -> u8 {
        (self.config2 >> 5) & 0x07
    }

    pub fn sfi(&self) -> u8 {
        (self.config2 >> 3) & 0x03
    }

    pub fn esi(&self) -> u8 {
        self.config2 & 0x07
    }

    /// Auto-configuration enable.
    pub fn ace(&self) -> bool {
        self.autoconfig0 & 0x01 != 0
    }

    /// Auto-reconfiguration enable.
    pub fn are(&self) -> bool {
        self.autoconfig0 & 0x02 != 0
    }

    /// Names of the registers whose read-back differs from `cfg`.
    pub fn mismatches(&self, cfg: &SensorConfig) -> heapless::Vec<&'static str, 4> {
        let mut out = heapless::Vec::new();
        let checks = [
            ("CONFIG1", self.config1 == cfg.config1()),
            ("CONFIG2", self.config2 == cfg.config2()),
            ("AUTOCONFIG0", self.autoconfig0 == cfg.autoconfig0()),
            ("FALLING", self.falling == cfg.falling),
        ];
        for (name, ok) in checks {
            if !ok {
                let _ = out.push(name);
            }
        }
        out
    }

    /// Compact JSON rendering for machine-readable logs.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for RegisterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ECR (0x5E): 0x{:02X} [{}]",
            self.ecr,
            if self.is_running() { "RUN MODE" } else { "STOP MODE" }
        )?;
        writeln!(
            f,
            "CONFIG1 (0x5C): 0x{:02X}  FFI={}, CDC_global={}",
            self.config1,
            self.ffi(),
            self.global_cdc()
        )?;
        writeln!(
            f,
            "CONFIG2 (0x5D): 0x{:02X}  CDT_global={}, SFI={}, ESI={}",
            self.config2,
            self.global_cdt(),
            self.sfi(),
            self.esi()
        )?;
        writeln!(
            f,
            "AUTOCONFIG0 (0x7B): 0x{:02X}  ACE={}, ARE={}",
            self.autoconfig0,
            u8::from(self.ace()),
            u8::from(self.are())
        )?;
        writeln!(
            f,
            "MHDF=0x{:02X} NHDF=0x{:02X} NCLF=0x{:02X} FDLF=0x{:02X}",
            self.falling.mhd, self.falling.nhd, self.falling.ncl, self.falling.fdl
        )?;

        write!(f, "ELECTRODE:")?;
        for i in 0..MAX_ELECTRODES {
            write!(f, " {i:02}")?;
        }
        write!(f, "\nCDC:      ")?;
        for c in self.cdc {
            write!(f, " {c:2}")?;
        }
        write!(f, "\nCDT:      ")?;
        for c in self.cdt {
            write!(f, " {c:2}")?;
        }
        Ok(())
    }
}
