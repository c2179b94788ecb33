//! Mock hardware for integration tests.
//!
//! `SimChip` is a register-level MPR121 stand-in: soft reset, stop/run
//! mode, filtered/baseline data, and a log of every write together with
//! the ECR value in force when it landed.  The other mocks record what
//! the firmware sent so tests can assert on the full history.

use std::cell::RefCell;
use std::rc::Rc;

use diorama::adapters::hardware::HardwareAdapter;
use diorama::app::events::AppEvent;
use diorama::app::ports::{BusyLinePort, EventSink, RegisterBus, SpotlightPort};
use diorama::audio::codec::decode_frame;
use diorama::audio::player::AudioPlayer;
use diorama::audio::transport::CommandTransport;
use diorama::config::{NUM_ELECTRODES, SensorConfig};
use diorama::error::SensorError;
use diorama::sensors::mpr121::Mpr121;
use diorama::sensors::regs;

/// Baseline every electrode idles at (10-bit scale, multiple of 4).
pub const BASELINE: u16 = 600;

// ── Simulated MPR121 ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Write {
    pub reg: u8,
    pub value: u8,
    pub ecr: u8,
}

pub struct ChipState {
    pub regs: [u8; 256],
    pub writes: Vec<Write>,
    pub reads: usize,
    /// CONFIG2 value the chip comes out of reset with.
    pub reset_config2: u8,
    pub present: bool,
    pub fail_reads: bool,
}

impl ChipState {
    fn new() -> Self {
        let mut s = Self {
            regs: [0; 256],
            writes: Vec::new(),
            reads: 0,
            reset_config2: regs::CONFIG2_RESET_VALUE,
            present: true,
            fail_reads: false,
        };
        for e in 0..regs::MAX_ELECTRODES as u8 {
            s.set_electrode(e, BASELINE, BASELINE);
        }
        s
    }

    pub fn set_electrode(&mut self, electrode: u8, filtered: u16, baseline: u16) {
        let f = (regs::FILTDATA_0L + 2 * electrode) as usize;
        self.regs[f] = (filtered & 0xFF) as u8;
        self.regs[f + 1] = ((filtered >> 8) & 0x03) as u8;
        self.regs[(regs::BASELINE_0 + electrode) as usize] = (baseline >> 2) as u8;
    }

    pub fn ecr(&self) -> u8 {
        self.regs[regs::ECR as usize]
    }

    /// Configuration writes that landed while electrodes were running.
    pub fn writes_in_run_mode(&self) -> Vec<Write> {
        self.writes
            .iter()
            .copied()
            .filter(|w| w.ecr != 0 && !regs::is_run_mode_safe(w.reg))
            .collect()
    }
}

/// Cloneable handle; the firmware owns one, the test keeps another.
#[derive(Clone)]
pub struct SimChip(pub Rc<RefCell<ChipState>>);

impl SimChip {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(ChipState::new())))
    }

    pub fn state(&self) -> std::cell::RefMut<'_, ChipState> {
        self.0.borrow_mut()
    }

    /// Hold `filtered - baseline` at `delta` for one electrode.
    pub fn set_delta(&self, electrode: u8, delta: i16) {
        let filtered = (BASELINE as i16 + delta) as u16;
        self.state().set_electrode(electrode, filtered, BASELINE);
    }
}

impl RegisterBus for SimChip {
    fn read_byte(&mut self, reg: u8) -> Result<u8, SensorError> {
        let mut s = self.state();
        if !s.present || s.fail_reads {
            return Err(SensorError::Bus);
        }
        s.reads += 1;
        Ok(s.regs[reg as usize])
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        let mut s = self.state();
        if !s.present {
            return Err(SensorError::Bus);
        }
        let ecr = s.ecr();
        s.writes.push(Write { reg, value, ecr });
        if reg == regs::SOFTRESET && value == regs::SOFTRESET_MAGIC {
            let config2 = s.reset_config2;
            let data = s.regs;
            s.regs = [0; 256];
            // Electrode data survives; configuration does not.
            let data_end = regs::BASELINE_0 as usize + regs::MAX_ELECTRODES;
            s.regs[..data_end].copy_from_slice(&data[..data_end]);
            s.regs[regs::CONFIG2 as usize] = config2;
        } else {
            s.regs[reg as usize] = value;
        }
        Ok(())
    }
}

/// Immediate delay for init sequences.
pub struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

pub fn init_sensor(chip: &SimChip) -> Mpr121<SimChip> {
    Mpr121::initialize(
        chip.clone(),
        &mut NoDelay,
        &SensorConfig::default(),
        NUM_ELECTRODES as u8,
    )
    .expect("sensor init")
}

// ── Serial transport ──────────────────────────────────────────

#[derive(Default)]
pub struct RecordingTransport {
    pub bytes: Vec<u8>,
    pub writes: usize,
}

impl RecordingTransport {
    /// Every frame written so far, split at frame boundaries.
    pub fn frames(&self) -> Vec<(u8, Vec<u8>)> {
        let mut out = Vec::new();
        let mut rest = self.bytes.as_slice();
        while rest.len() >= 4 {
            let len = 4 + rest[2] as usize;
            let frame = decode_frame(&rest[..len]).expect("valid frame");
            out.push((frame.cmd, frame.data.to_vec()));
            rest = &rest[len..];
        }
        assert!(rest.is_empty(), "trailing partial frame");
        out
    }
}

impl CommandTransport for RecordingTransport {
    type Error = ();

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        self.writes += 1;
        self.bytes.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

// ── Busy line ─────────────────────────────────────────────────

#[derive(Default)]
pub struct ScriptedBusy(pub bool);

impl BusyLinePort for ScriptedBusy {
    fn is_busy(&mut self) -> bool {
        self.0
    }
}

// ── Spotlights ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCall {
    On(usize),
    Off(usize),
    AllOff,
}

#[derive(Default)]
pub struct RecordingSpotlights {
    pub lit: [bool; NUM_ELECTRODES],
    pub calls: Vec<LightCall>,
}

impl SpotlightPort for RecordingSpotlights {
    fn on(&mut self, index: usize) {
        self.calls.push(LightCall::On(index));
        if let Some(l) = self.lit.get_mut(index) {
            *l = true;
        }
    }

    fn off(&mut self, index: usize) {
        self.calls.push(LightCall::Off(index));
        if let Some(l) = self.lit.get_mut(index) {
            *l = false;
        }
    }

    fn all_off(&mut self) {
        self.calls.push(LightCall::AllOff);
        self.lit = [false; NUM_ELECTRODES];
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Assembled rig ─────────────────────────────────────────────

pub type MockHardware = HardwareAdapter<
    Mpr121<SimChip>,
    ScriptedBusy,
    AudioPlayer<RecordingTransport>,
    RecordingSpotlights,
>;

pub fn mock_hardware(chip: &SimChip) -> MockHardware {
    HardwareAdapter::new(
        init_sensor(chip),
        ScriptedBusy::default(),
        AudioPlayer::new(RecordingTransport::default()),
        RecordingSpotlights::default(),
    )
}
