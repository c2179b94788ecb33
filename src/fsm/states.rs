//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  IDLE ──[new touch: play track]──▶ PLAYING
//!    ▲                                  │
//!    │                  [busy released after grace]
//!    │                  [or max duration elapsed]
//!    │                                  ▼
//!    └────────[cooldown elapsed]───── COOLDOWN
//! ```
//!
//! `Idle` and `Cooldown` consume a fresh touch mask every tick.
//! `Playing` never does: the service does not poll the sensor there.

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            polls_touch: true,
            on_enter: None,
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1 — Playing
        StateDescriptor {
            id: StateId::Playing,
            name: "Playing",
            polls_touch: false,
            on_enter: Some(playing_enter),
            on_exit: None,
            on_update: playing_update,
        },
        // Index 2 — Cooldown
        StateDescriptor {
            id: StateId::Cooldown,
            name: "Cooldown",
            polls_touch: true,
            on_enter: Some(cooldown_enter),
            on_exit: Some(cooldown_exit),
            on_update: cooldown_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state — waiting for a touch
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    // A failed poll keeps the previous mask.
    let mask = ctx.inputs.touch?;
    let previous = core::mem::replace(&mut ctx.last_touched, mask);

    // Lowest index wins; simultaneous edges are absorbed into `last_touched`.
    let electrode = mask.first_new_touch(previous)?;
    let track = electrode as u16 + 1;

    info!("IDLE: electrode {electrode} touched, playing track {track}");
    ctx.commands.play_track = Some(track);
    ctx.commands.spotlight_on = Some(electrode);
    ctx.session.electrode = Some(electrode);
    Some(StateId::Playing)
}

// ═══════════════════════════════════════════════════════════════════════════
//  PLAYING state — touch polling suspended
// ═══════════════════════════════════════════════════════════════════════════

fn playing_enter(ctx: &mut FsmContext) {
    ctx.session.started_ms = ctx.now_ms;
    ctx.timed_out = None;
}

fn playing_update(ctx: &mut FsmContext) -> Option<StateId> {
    let elapsed = ctx.ms_since_trigger();
    let audio = ctx.config.audio;

    // Grace period: the module has not raised busy yet.
    if elapsed < u64::from(audio.begin_timeout_ms) {
        return None;
    }

    if elapsed >= u64::from(audio.max_duration_ms) {
        warn!("PLAYING: still busy after {elapsed} ms, forcing cooldown");
        ctx.timed_out = Some(elapsed);
        if audio.stop_on_watchdog {
            ctx.commands.stop = true;
        }
        return Some(StateId::Cooldown);
    }

    if !ctx.inputs.busy {
        info!("PLAYING: finished after {elapsed} ms");
        return Some(StateId::Cooldown);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOLDOWN state — polling resumes, results discarded
// ═══════════════════════════════════════════════════════════════════════════

fn cooldown_enter(ctx: &mut FsmContext) {
    ctx.session.ended_ms = ctx.now_ms;
}

fn cooldown_exit(ctx: &mut FsmContext) {
    ctx.commands.spotlights_off = true;
    ctx.session = super::context::Session::default();
}

fn cooldown_update(ctx: &mut FsmContext) -> Option<StateId> {
    if let Some(mask) = ctx.inputs.touch {
        ctx.last_touched = mask;
    }

    if ctx.ms_since_playback_end() >= u64::from(ctx.config.audio.end_cooldown_ms) {
        return Some(StateId::Idle);
    }

    None
}
