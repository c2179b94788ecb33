//! Integration tests for MPR121 bring-up against the simulated chip.

use diorama::app::ports::TouchSensorPort;
use diorama::config::{NUM_ELECTRODES, SensorConfig};
use diorama::diagnostics::RegisterReport;
use diorama::error::{InitError, SensorError};
use diorama::sensors::mpr121::Mpr121;
use diorama::sensors::regs;

use super::mock_hw::{BASELINE, NoDelay, SimChip, init_sensor};

#[test]
fn init_leaves_chip_running_with_configured_registers() {
    let chip = SimChip::new();
    let _sensor = init_sensor(&chip);
    let cfg = SensorConfig::default();

    let s = chip.state();
    assert_eq!(s.ecr(), cfg.ecr_run(NUM_ELECTRODES as u8));
    assert_eq!(s.regs[regs::CONFIG1 as usize], cfg.config1());
    assert_eq!(s.regs[regs::CONFIG2 as usize], cfg.config2());
    assert_eq!(s.regs[regs::NCLF as usize], cfg.falling.ncl);
    assert_eq!(s.regs[regs::UPLIMIT as usize], cfg.upper_limit);

    // First write is the soft reset.
    assert_eq!(s.writes[0].reg, regs::SOFTRESET);
    assert_eq!(s.writes[0].value, regs::SOFTRESET_MAGIC);
}

#[test]
fn every_configuration_write_lands_in_stop_mode() {
    let chip = SimChip::new();
    let _sensor = init_sensor(&chip);
    assert!(chip.state().writes_in_run_mode().is_empty());
}

#[test]
fn thresholds_cover_all_twelve_channels() {
    let chip = SimChip::new();
    let _sensor = init_sensor(&chip);
    let cfg = SensorConfig::default();

    let s = chip.state();
    for i in 0..regs::MAX_ELECTRODES {
        assert_eq!(s.regs[regs::TOUCHTH_0 as usize + 2 * i], cfg.touch_threshold);
        assert_eq!(s.regs[regs::RELEASETH_0 as usize + 2 * i], cfg.release_threshold);
    }
}

#[test]
fn wrong_reset_value_fails_verification() {
    let chip = SimChip::new();
    chip.state().reset_config2 = 0x00;
    let err = Mpr121::initialize(chip.clone(), &mut NoDelay, &SensorConfig::default(), 3)
        .err()
        .expect("init must fail");
    assert_eq!(
        err,
        InitError::ResetVerificationFailed {
            expected: 0x24,
            found: 0x00
        }
    );
    // Nothing configured after the failed check.
    assert_eq!(chip.state().regs[regs::CONFIG1 as usize], 0);
}

#[test]
fn absent_chip_is_not_found() {
    let chip = SimChip::new();
    chip.state().present = false;
    let err = Mpr121::initialize(chip.clone(), &mut NoDelay, &SensorConfig::default(), 3)
        .err()
        .expect("init must fail");
    assert_eq!(err, InitError::NotFound);
}

#[test]
fn runtime_config_write_restores_run_mode() {
    let chip = SimChip::new();
    let mut sensor = init_sensor(&chip);
    let ecr = chip.state().ecr();
    let before = chip.state().writes.len();

    sensor.write_register(regs::DEBOUNCE, 0x11).unwrap();

    let s = chip.state();
    let tail: Vec<_> = s.writes[before..]
        .iter()
        .map(|w| (w.reg, w.value, w.ecr))
        .collect();
    assert_eq!(
        tail,
        vec![
            (regs::ECR, 0, ecr),
            (regs::DEBOUNCE, 0x11, 0),
            (regs::ECR, ecr, 0),
        ]
    );
    assert_eq!(s.ecr(), ecr);
}

#[test]
fn readings_are_ten_bit_and_on_the_same_scale() {
    let chip = SimChip::new();
    let mut sensor = init_sensor(&chip);
    chip.state().set_electrode(1, 0x3A7, BASELINE);

    assert_eq!(sensor.read_filtered(1).unwrap(), 0x3A7);
    assert_eq!(sensor.read_baseline(1).unwrap(), BASELINE);
    assert_eq!(
        TouchSensorPort::read_filtered(&mut sensor, 12),
        Err(SensorError::ElectrodeOutOfRange(12))
    );
}

#[test]
fn register_report_matches_configuration() {
    let chip = SimChip::new();
    let mut sensor = init_sensor(&chip);
    let report = RegisterReport::capture(&mut sensor).unwrap();
    assert!(report.is_running());
    assert!(report.mismatches(&SensorConfig::default()).is_empty());
}
