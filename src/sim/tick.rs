//! Per-frame simulation tick
//!
//! Order within a Playing tick: clamp dt, integrate the run, extend the track,
//! resolve collisions, animate feedback, clean up entities behind the ship.

use super::collision::check_collisions;
use super::events::{EndReason, RunEvent};
use super::state::{GameState, RunPhase};

/// Commands collected since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start a fresh run (from any phase)
    pub begin_run: bool,
    pub pause: bool,
    pub resume: bool,
    /// Lane shift direction (-1 left, +1 right)
    pub shift_lane: Option<i8>,
    /// New viewport size in pixels
    pub resize: Option<(f32, f32)>,
}

/// Apply queued commands, then advance the simulation by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if let Some((width, height)) = input.resize {
        state.resize(width, height);
    }
    if input.begin_run {
        state.begin_run();
    }
    if input.pause {
        state.pause();
    }
    if input.resume {
        state.resume();
    }
    if let Some(direction) = input.shift_lane {
        state.shift_lane(direction);
    }

    step(state, dt);
}

/// Advance a Playing run by `dt` seconds
///
/// After GameOver only the cosmetic feedback keeps running so the crash
/// burst and shake can settle; the run itself stays frozen. Paused freezes
/// everything.
pub fn step(state: &mut GameState, dt: f32) {
    // Clamp before anything else touches dt
    let dt = if dt.is_finite() {
        dt.clamp(0.0, state.tuning.max_frame_dt)
    } else {
        0.0
    };

    match state.phase {
        RunPhase::Playing => {}
        RunPhase::GameOver => {
            feedback_step(state, dt);
            return;
        }
        RunPhase::Start | RunPhase::Paused => return,
    }

    let previous_region = state.run.region;
    state.run.integrate(&state.tuning, dt);
    for pickup in &mut state.entities.pickups {
        pickup.animate(dt);
    }

    if state.run.region != previous_region {
        log::info!(
            "Entered region {} at distance {:.0}",
            state.run.region,
            state.run.distance
        );
        state.emit(RunEvent::RegionEntered {
            region: state.run.region,
        });
    }

    if state.run.energy <= 0.0 {
        state.end_run(EndReason::SunlightDepleted);
    }

    if state.phase == RunPhase::Playing {
        state
            .spawner
            .fill(&mut state.entities, &state.run, &state.tuning, &mut state.rng);
        check_collisions(state);
    }

    feedback_step(state, dt);
    state
        .entities
        .cleanup(state.run.distance, state.tuning.cleanup_margin);
}

/// Integrate particles and decay the screen shake
fn feedback_step(state: &mut GameState, dt: f32) {
    state
        .feedback
        .update(&mut state.entities.particles, state.tuning.particle_gravity, dt);
}
