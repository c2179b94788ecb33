//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the FSM, the per-electrode detector state, and the
//! shared context.  All I/O flows through port traits injected at call
//! sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  TouchSensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!  BusyLinePort    ──▶ │       AppService       │
//!  PlayerPort      ◀── │  detector · FSM        │
//!  SpotlightPort   ◀── └────────────────────────┘
//! ```
//!
//! One call to [`AppService::tick`] is one iteration of the run loop.
//! The fixed end-of-loop delay belongs to the caller.

use log::{info, trace, warn};

use crate::config::{NUM_ELECTRODES, RunMode, SystemConfig};
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::sensors::touch::{self, ElectrodeState, TouchMask};

use super::events::AppEvent;
use super::ports::{EventSink, Hardware, PlayerPort, SpotlightPort, TouchSensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    electrodes: [ElectrodeState; NUM_ELECTRODES],
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: FsmContext::new(config),
            electrodes: [ElectrodeState::default(); NUM_ELECTRODES],
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in its initial state (Idle).
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!(
            "AppService started in {:?} ({:?} mode)",
            self.fsm.current_state(),
            self.ctx.config.mode
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one loop iteration at `now_ms`: poll (if allowed) → busy line →
    /// FSM → commands.
    pub fn tick(&mut self, now_ms: u64, hw: &mut impl Hardware, sink: &mut impl EventSink) {
        self.tick_count += 1;

        if self.ctx.config.mode == RunMode::Debug {
            self.dump_cap_data(hw, sink);
            return;
        }

        let prev_state = self.fsm.current_state();
        self.ctx.now_ms = now_ms;

        // 1. Touch poll, only in states that allow it
        self.ctx.inputs.touch = if self.fsm.polls_touch() {
            self.poll_touch(hw, sink)
        } else {
            None
        };

        // 2. Busy line
        self.ctx.inputs.busy = hw.is_busy();

        // 3. FSM tick (pure state logic)
        self.fsm.tick(&mut self.ctx);

        // 4. Carry out whatever the handlers asked for
        self.apply_commands(hw, sink);

        if let Some(elapsed_ms) = self.ctx.timed_out.take() {
            sink.emit(&AppEvent::PlaybackTimedOut { elapsed_ms });
        }

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Total loop iterations executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Per-electrode smoothing and debounce state.
    pub fn electrodes(&self) -> &[ElectrodeState; NUM_ELECTRODES] {
        &self.electrodes
    }

    /// Mask from the last successful poll.
    pub fn last_touched(&self) -> TouchMask {
        self.ctx.last_touched
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn poll_touch(
        &mut self,
        hw: &mut impl TouchSensorPort,
        sink: &mut impl EventSink,
    ) -> Option<TouchMask> {
        match touch::poll(hw, &mut self.electrodes, &self.ctx.config.touch) {
            Ok(mask) => {
                trace!(
                    "CAP | smoothed={:?} mask=0b{:03b}",
                    self.electrodes.map(|e| e.smoothed as i32),
                    mask.bits()
                );
                Some(mask)
            }
            Err(e) => {
                warn!("touch poll failed: {e}");
                sink.emit(&AppEvent::SensorFault(e));
                None
            }
        }
    }

    /// Translate FSM commands into port calls.
    fn apply_commands(
        &mut self,
        hw: &mut (impl PlayerPort + SpotlightPort),
        sink: &mut impl EventSink,
    ) {
        let cmds = self.ctx.commands.take();

        if let Some(track) = cmds.play_track {
            match hw.play_track(track) {
                Ok(()) => sink.emit(&AppEvent::TrackTriggered {
                    electrode: usize::from(track - 1),
                    track,
                }),
                Err(e) => {
                    warn!("play_track({track}) failed: {e}");
                    sink.emit(&AppEvent::PlayerFault(e));
                }
            }
        }

        if cmds.stop {
            if let Err(e) = hw.stop() {
                warn!("stop failed: {e}");
                sink.emit(&AppEvent::PlayerFault(e));
            }
        }

        if let Some(index) = cmds.spotlight_on {
            hw.on(index);
        }
        if cmds.spotlights_off {
            hw.all_off();
        }
    }

    /// Debug mode: raw readings for every electrode, no orchestration.
    fn dump_cap_data(&mut self, hw: &mut impl TouchSensorPort, sink: &mut impl EventSink) {
        let count = hw.electrode_count().min(NUM_ELECTRODES);
        for i in 0..count {
            let electrode = i as u8;
            let readings = hw
                .read_filtered(electrode)
                .and_then(|f| hw.read_baseline(electrode).map(|b| (f, b)));
            match readings {
                Ok((filtered, baseline)) => sink.emit(&AppEvent::CapData {
                    electrode,
                    filtered,
                    baseline,
                    delta: filtered as i16 - baseline as i16,
                }),
                Err(e) => {
                    sink.emit(&AppEvent::SensorFault(e));
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::BusyLinePort;
    use crate::error::{PlayerError, SensorError};

    /// Sensor with fixed deltas, optional failure, and call logs.
    #[derive(Default)]
    struct Rig {
        delta: [i16; NUM_ELECTRODES],
        busy: bool,
        fail_reads: bool,
        fail_play: bool,
        reads: usize,
        tracks: Vec<u16>,
        stops: usize,
        lit: Vec<usize>,
        all_off: usize,
    }

    impl TouchSensorPort for Rig {
        fn electrode_count(&self) -> usize {
            NUM_ELECTRODES
        }
        fn read_filtered(&mut self, e: u8) -> Result<u16, SensorError> {
            self.reads += 1;
            if self.fail_reads {
                return Err(SensorError::Bus);
            }
            Ok((600 + self.delta[e as usize]) as u16)
        }
        fn read_baseline(&mut self, _e: u8) -> Result<u16, SensorError> {
            Ok(600)
        }
        fn write_register(&mut self, _reg: u8, _value: u8) -> Result<(), SensorError> {
            Ok(())
        }
    }

    impl BusyLinePort for Rig {
        fn is_busy(&mut self) -> bool {
            self.busy
        }
    }

    impl PlayerPort for Rig {
        fn play_track(&mut self, track: u16) -> Result<(), PlayerError> {
            if self.fail_play {
                return Err(PlayerError::Transport);
            }
            self.tracks.push(track);
            Ok(())
        }
        fn stop(&mut self) -> Result<(), PlayerError> {
            self.stops += 1;
            Ok(())
        }
    }

    impl SpotlightPort for Rig {
        fn on(&mut self, index: usize) {
            self.lit.push(index);
        }
        fn off(&mut self, _index: usize) {}
        fn all_off(&mut self) {
            self.all_off += 1;
        }
    }

    #[derive(Default)]
    struct Events(Vec<AppEvent>);

    impl EventSink for Events {
        fn emit(&mut self, event: &AppEvent) {
            self.0.push(*event);
        }
    }

    fn started(config: SystemConfig) -> (AppService, Events) {
        let mut sink = Events::default();
        let mut app = AppService::new(config);
        app.start(&mut sink);
        (app, sink)
    }

    #[test]
    fn no_polling_while_playing() {
        let (mut app, mut sink) = started(SystemConfig::default());
        let mut hw = Rig {
            delta: [-200, 0, 0],
            ..Rig::default()
        };
        let mut t = 0;
        while app.state() == StateId::Idle {
            app.tick(t, &mut hw, &mut sink);
            t += 10;
        }
        assert_eq!(hw.tracks, vec![1]);

        hw.busy = true;
        let reads = hw.reads;
        for _ in 0..50 {
            app.tick(t, &mut hw, &mut sink);
            t += 10;
        }
        assert_eq!(app.state(), StateId::Playing);
        assert_eq!(hw.reads, reads);
    }

    #[test]
    fn sensor_fault_is_reported_and_state_kept() {
        let (mut app, mut sink) = started(SystemConfig::default());
        let mut hw = Rig {
            fail_reads: true,
            ..Rig::default()
        };
        app.tick(0, &mut hw, &mut sink);
        assert_eq!(app.state(), StateId::Idle);
        assert!(sink.0.contains(&AppEvent::SensorFault(SensorError::Bus)));
        assert_eq!(app.electrodes()[0], ElectrodeState::default());
    }

    #[test]
    fn player_fault_still_enters_playing() {
        let (mut app, mut sink) = started(SystemConfig::default());
        let mut hw = Rig {
            delta: [-200, 0, 0],
            fail_play: true,
            ..Rig::default()
        };
        for t in 0..5 {
            app.tick(t * 10, &mut hw, &mut sink);
        }
        assert_eq!(app.state(), StateId::Playing);
        assert!(sink.0.contains(&AppEvent::PlayerFault(PlayerError::Transport)));
        assert!(
            !sink
                .0
                .iter()
                .any(|e| matches!(e, AppEvent::TrackTriggered { .. }))
        );
    }

    #[test]
    fn debug_mode_dumps_without_orchestrating() {
        let config = SystemConfig {
            mode: RunMode::Debug,
            ..SystemConfig::default()
        };
        let (mut app, mut sink) = started(config);
        let mut hw = Rig {
            delta: [-200, 5, 0],
            ..Rig::default()
        };
        for t in 0..10 {
            app.tick(t * 10, &mut hw, &mut sink);
        }
        assert_eq!(app.state(), StateId::Idle);
        assert!(hw.tracks.is_empty());
        assert!(sink.0.contains(&AppEvent::CapData {
            electrode: 1,
            filtered: 605,
            baseline: 600,
            delta: 5,
        }));
        let dumps = sink
            .0
            .iter()
            .filter(|e| matches!(e, AppEvent::CapData { .. }))
            .count();
        assert_eq!(dumps, 10 * NUM_ELECTRODES);
    }
}
