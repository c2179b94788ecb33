//! MPR121 register map (datasheet rev. 4, table 1).

/// Channels the chip can address, whether or not they are wired.
pub const MAX_ELECTRODES: usize = 12;

// --- Electrode data ---
pub const TOUCHSTATUS_L: u8 = 0x00;
pub const TOUCHSTATUS_H: u8 = 0x01;
/// Filtered data, low byte of electrode 0; electrode `n` at `+ 2n`.
pub const FILTDATA_0L: u8 = 0x04;
/// Filtered data, high bits (1:0) of electrode 0; electrode `n` at `+ 2n`.
pub const FILTDATA_0H: u8 = 0x05;
/// Baseline (upper 8 of 10 bits) of electrode 0; electrode `n` at `+ n`.
pub const BASELINE_0: u8 = 0x1E;

// --- Baseline tracking, rising (filtered > baseline) ---
pub const MHDR: u8 = 0x2B;
pub const NHDR: u8 = 0x2C;
pub const NCLR: u8 = 0x2D;
pub const FDLR: u8 = 0x2E;
// --- Baseline tracking, falling (filtered < baseline) ---
pub const MHDF: u8 = 0x2F;
pub const NHDF: u8 = 0x30;
pub const NCLF: u8 = 0x31;
pub const FDLF: u8 = 0x32;
// --- Baseline tracking, touched ---
pub const NHDT: u8 = 0x33;
pub const NCLT: u8 = 0x34;
pub const FDLT: u8 = 0x35;

/// Touch threshold of electrode 0; electrode `n` at `+ 2n`.
pub const TOUCHTH_0: u8 = 0x41;
/// Release threshold of electrode 0; electrode `n` at `+ 2n`.
pub const RELEASETH_0: u8 = 0x42;

pub const DEBOUNCE: u8 = 0x5B;
pub const CONFIG1: u8 = 0x5C;
pub const CONFIG2: u8 = 0x5D;
/// Electrode configuration register — zero means stop mode.
pub const ECR: u8 = 0x5E;

/// Per-electrode charge current, one register each from 0x5F.
pub const CHARGECURR_0: u8 = 0x5F;
/// Per-electrode charge time, two electrodes per register from 0x6C.
pub const CHARGETIME_1: u8 = 0x6C;

// --- GPIO block (writable in run mode) ---
pub const GPIO_FIRST: u8 = 0x73;
pub const GPIO_LAST: u8 = 0x7A;

pub const AUTOCONFIG0: u8 = 0x7B;
pub const AUTOCONFIG1: u8 = 0x7C;
pub const UPLIMIT: u8 = 0x7D;
pub const LOWLIMIT: u8 = 0x7E;
pub const TARGETLIMIT: u8 = 0x7F;

pub const SOFTRESET: u8 = 0x80;
/// Magic value that triggers a soft reset when written to [`SOFTRESET`].
pub const SOFTRESET_MAGIC: u8 = 0x63;

/// CONFIG2 reads back this value after a successful soft reset.
pub const CONFIG2_RESET_VALUE: u8 = 0x24;

/// Registers the datasheet allows writing while electrodes are running.
pub const fn is_run_mode_safe(reg: u8) -> bool {
    reg == ECR || reg == SOFTRESET || (reg >= GPIO_FIRST && reg <= GPIO_LAST)
}
