//! Integration tests for the sensor → detector → FSM → player pipeline.
//!
//! These run on the host and drive `AppService` against a simulated
//! MPR121 register file and a recording serial transport, so every
//! assertion is on bytes that would have reached real hardware.

use diorama::app::events::AppEvent;
use diorama::app::service::AppService;
use diorama::audio::codec::{CMD_PLAY_TRACK, CMD_STOP};
use diorama::config::SystemConfig;
use diorama::error::SensorError;
use diorama::fsm::StateId;

use super::mock_hw::{LightCall, MockHardware, RecordingSink, SimChip, mock_hardware};

const STEP_MS: u64 = 10;

struct Rig {
    app: AppService,
    hw: MockHardware,
    sink: RecordingSink,
    chip: SimChip,
    now: u64,
}

impl Rig {
    fn new(config: SystemConfig) -> Self {
        let chip = SimChip::new();
        let hw = mock_hardware(&chip);
        let mut sink = RecordingSink::default();
        let mut app = AppService::new(config);
        app.start(&mut sink);
        Self {
            app,
            hw,
            sink,
            chip,
            now: 0,
        }
    }

    fn tick(&mut self) {
        self.app.tick(self.now, &mut self.hw, &mut self.sink);
        self.now += STEP_MS;
    }

    fn tick_n(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Tick until the FSM reaches `state`, at most `limit` times.
    fn tick_until(&mut self, state: StateId, limit: usize) {
        for _ in 0..limit {
            if self.app.state() == state {
                return;
            }
            self.tick();
        }
        assert_eq!(self.app.state(), state, "not reached within {limit} ticks");
    }

    fn frames(&self) -> Vec<(u8, Vec<u8>)> {
        self.hw.player.transport().frames()
    }

    fn tracks(&self) -> Vec<u16> {
        self.frames()
            .into_iter()
            .filter(|(cmd, _)| *cmd == CMD_PLAY_TRACK)
            .map(|(_, d)| u16::from_be_bytes([d[0], d[1]]))
            .collect()
    }
}

fn threshold_20() -> SystemConfig {
    let mut config = SystemConfig::default();
    config.touch.touch_threshold = -20;
    config
}

// ── Touch → play ──────────────────────────────────────────────

#[test]
fn touch_on_electrode_zero_plays_track_one_once() {
    let mut rig = Rig::new(threshold_20());
    rig.chip.set_delta(0, -200);

    rig.tick_n(4);
    assert_eq!(rig.app.state(), StateId::Idle);
    assert!(rig.frames().is_empty());

    rig.tick();
    assert_eq!(rig.app.state(), StateId::Playing);
    assert_eq!(rig.frames(), vec![(CMD_PLAY_TRACK, vec![0x00, 0x01])]);
    assert_eq!(rig.hw.player.transport().writes, 1);
    assert!(rig.sink.events.contains(&AppEvent::TrackTriggered {
        electrode: 0,
        track: 1
    }));
    assert!(rig.sink.events.contains(&AppEvent::StateChanged {
        from: StateId::Idle,
        to: StateId::Playing
    }));

    rig.hw.busy.0 = true;
    rig.tick_n(100);
    assert_eq!(rig.tracks(), vec![1]);
}

#[test]
fn simultaneous_touches_play_lowest_index_only() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.chip.set_delta(0, -200);
    rig.chip.set_delta(2, -200);

    rig.tick_until(StateId::Playing, 10);
    assert_eq!(rig.tracks(), vec![1]);
    assert_eq!(rig.hw.spotlights.lit, [true, false, false]);

    // Playback ends, both pads still held through cooldown and beyond.
    rig.tick_until(StateId::Cooldown, 50);
    rig.tick_until(StateId::Idle, 50);
    rig.tick_n(200);
    assert_eq!(rig.app.state(), StateId::Idle);
    assert_eq!(rig.tracks(), vec![1], "electrode 2 must not fire later");
}

#[test]
fn release_and_retouch_plays_again_after_full_cycle() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.chip.set_delta(1, -200);
    rig.tick_until(StateId::Playing, 10);
    rig.tick_until(StateId::Idle, 100);

    rig.chip.set_delta(1, 0);
    rig.tick_n(30);
    assert!(!rig.app.last_touched().is_touched(1));

    rig.chip.set_delta(1, -200);
    rig.tick_until(StateId::Playing, 10);
    assert_eq!(rig.tracks(), vec![2, 2]);
}

// ── Playing / Cooldown ────────────────────────────────────────

#[test]
fn sensor_is_not_read_while_playing() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.chip.set_delta(0, -200);
    rig.tick_until(StateId::Playing, 10);

    rig.hw.busy.0 = true;
    let reads = rig.chip.state().reads;
    rig.tick_n(300);
    assert_eq!(rig.app.state(), StateId::Playing);
    assert_eq!(rig.chip.state().reads, reads);
}

#[test]
fn grace_period_covers_late_busy_line() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.chip.set_delta(0, -200);
    rig.tick_until(StateId::Playing, 10);

    // Busy not yet asserted: still Playing for the whole grace period.
    let grace_ticks = (rig.app.config().audio.begin_timeout_ms as u64 / STEP_MS) as usize;
    for _ in 0..grace_ticks - 1 {
        rig.tick();
        assert_eq!(rig.app.state(), StateId::Playing);
    }
    rig.tick_n(2);
    assert_eq!(rig.app.state(), StateId::Cooldown);
}

#[test]
fn stuck_busy_line_is_cut_off_by_watchdog() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.chip.set_delta(0, -200);
    rig.tick_until(StateId::Playing, 10);
    let started = rig.now - STEP_MS;
    rig.hw.busy.0 = true;

    let max = u64::from(rig.app.config().audio.max_duration_ms);
    while rig.now < started + max {
        rig.tick();
        assert_eq!(rig.app.state(), StateId::Playing);
    }
    rig.tick();
    assert_eq!(rig.app.state(), StateId::Cooldown, "busy still asserted");

    assert_eq!(rig.frames().last().map(|(cmd, _)| *cmd), Some(CMD_STOP));
    assert!(rig.sink.events.contains(&AppEvent::PlaybackTimedOut { elapsed_ms: max }));
}

#[test]
fn spotlight_follows_trigger_and_cooldown() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.chip.set_delta(2, -200);
    rig.tick_until(StateId::Playing, 10);
    assert_eq!(rig.hw.spotlights.lit, [false, false, true]);

    rig.tick_until(StateId::Cooldown, 50);
    assert_eq!(rig.hw.spotlights.lit, [false, false, true]);

    rig.tick_until(StateId::Idle, 50);
    assert_eq!(rig.hw.spotlights.lit, [false; 3]);
    assert_eq!(
        rig.hw.spotlights.calls,
        vec![LightCall::On(2), LightCall::AllOff]
    );
}

// ── Faults and register discipline ────────────────────────────

#[test]
fn bus_failure_is_reported_and_recovered() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.chip.set_delta(0, -200);
    rig.tick_n(2);

    rig.chip.state().fail_reads = true;
    let smoothed = rig.app.electrodes()[0].smoothed;
    rig.tick_n(10);
    assert_eq!(rig.app.state(), StateId::Idle);
    assert_eq!(rig.app.electrodes()[0].smoothed, smoothed);
    assert_eq!(
        rig.sink
            .count(|e| *e == AppEvent::SensorFault(SensorError::Bus)),
        10
    );

    rig.chip.state().fail_reads = false;
    rig.tick_until(StateId::Playing, 10);
    assert_eq!(rig.tracks(), vec![1]);
}

#[test]
fn run_loop_never_writes_sensor_registers() {
    let mut rig = Rig::new(SystemConfig::default());
    let writes_after_init = rig.chip.state().writes.len();

    rig.chip.set_delta(0, -200);
    rig.tick_until(StateId::Playing, 10);
    rig.tick_until(StateId::Idle, 100);
    rig.tick_n(50);

    let chip = rig.chip.state();
    assert_eq!(chip.writes.len(), writes_after_init);
    assert!(chip.writes_in_run_mode().is_empty());
}
