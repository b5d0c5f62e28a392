//! Lane + depth-window collision detection
//!
//! Positions advance once per variable-length tick, so hits are tested against
//! a depth window around the ship instead of exact equality. With windows at
//! least half a full-speed tick wide, thin entities cannot be skipped over.

use glam::Vec3;

use super::entities::{Obstacle, Pickup, PickupKind};
use super::events::{EndReason, RunEvent};
use super::feedback::Burst;
use super::state::{GameState, Lane, RunPhase, RunState};
use crate::consts::PICKUP_MISS_DEPTH;
use crate::tuning::Tuning;

/// True when an obstacle overlaps the ship's lane and depth window
#[inline]
pub fn obstacle_hits(obstacle: &Obstacle, lane: Lane, distance: f32, tuning: &Tuning) -> bool {
    let relative = obstacle.z - distance;
    obstacle.lane == lane && (relative - tuning.player_collision_depth).abs() <= tuning.collision_window
}

/// Index of the first obstacle hitting the ship, if any
pub fn find_fatal_obstacle(
    obstacles: &[Obstacle],
    lane: Lane,
    distance: f32,
    tuning: &Tuning,
) -> Option<usize> {
    obstacles
        .iter()
        .position(|o| obstacle_hits(o, lane, distance, tuning))
}

/// Remove and return the pickups the ship collects this tick
///
/// Pickups already behind the miss depth are dropped as missed; everything
/// else stays on the track.
pub fn sweep_pickups(
    pickups: &mut Vec<Pickup>,
    lane: Lane,
    distance: f32,
    tuning: &Tuning,
) -> Vec<Pickup> {
    let mut collected = Vec::new();
    pickups.retain(|pickup| {
        let relative = pickup.z - distance;
        if relative < PICKUP_MISS_DEPTH {
            return false;
        }
        let in_window = (relative - tuning.player_collision_depth).abs() <= tuning.pickup_window;
        if in_window && pickup.lane == lane {
            collected.push(pickup.clone());
            return false;
        }
        true
    });
    collected
}

/// Apply a pickup's effect to the run
pub fn apply_pickup(run: &mut RunState, kind: PickupKind, tuning: &Tuning) {
    match kind {
        PickupKind::EnergyFragment => {
            run.gain_energy(tuning.fragment_energy, tuning);
            run.pickups += 1;
        }
        PickupKind::Boost => {
            run.gain_energy(tuning.boost_energy, tuning);
            // Refresh, never stack
            run.boost_timer = run.boost_timer.max(tuning.boost_time);
            run.base_speed = (run.base_speed + tuning.boost_speed_bonus).min(tuning.max_speed);
            run.boosts += 1;
        }
    }
}

/// Run the obstacle and pickup checks for one tick
///
/// Does nothing outside `Playing`. A fatal obstacle ends the run immediately
/// and pickups are not considered that tick.
pub fn check_collisions(state: &mut GameState) {
    if state.phase != RunPhase::Playing {
        return;
    }

    let lane = state.run.lane;
    let distance = state.run.distance;

    let fatal = find_fatal_obstacle(&state.entities.obstacles, lane, distance, &state.tuning)
        .map(|index| state.entities.obstacles[index].id)
        .and_then(|id| state.entities.remove_obstacle(id));
    if let Some(obstacle) = fatal {
        let origin = Vec3::new(obstacle.lane.offset(), 20.0, obstacle.z);
        let cap = state.tuning.max_particles;
        let burst = Burst::crash(&state.tuning, obstacle.hue);
        let particles = state.feedback.burst(&burst, origin, &mut state.rng);
        state.entities.add_particles(particles, cap);
        state.feedback.shake.trigger(state.tuning.crash_shake.0, state.tuning.crash_shake.1);

        log::debug!("Obstacle {} hit in lane {}", obstacle.id, lane.index());
        state.emit(RunEvent::Collision { lane });
        state.end_run(EndReason::CollisionDetected);
        return;
    }

    let collected = sweep_pickups(&mut state.entities.pickups, lane, distance, &state.tuning);
    for pickup in collected {
        apply_pickup(&mut state.run, pickup.kind, &state.tuning);
        log::trace!("Collected {} {} in lane {}", pickup.kind.as_str(), pickup.id, lane.index());

        let origin = Vec3::new(pickup.lane.offset(), 24.0, pickup.z);
        let cap = state.tuning.max_particles;
        let burst = match pickup.kind {
            PickupKind::EnergyFragment => Burst::fragment(&state.tuning),
            PickupKind::Boost => Burst::boost(&state.tuning),
        };
        let particles = state.feedback.burst(&burst, origin, &mut state.rng);
        state.entities.add_particles(particles, cap);

        state.emit(RunEvent::PickupCollected { kind: pickup.kind });
        if pickup.kind == PickupKind::Boost {
            state.feedback.shake.trigger(state.tuning.boost_shake.0, state.tuning.boost_shake.1);
            state.emit(RunEvent::BoostTriggered);
        }
    }
    state.run.refresh_score(&state.tuning);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_state() -> GameState {
        let mut state = GameState::new(2024);
        state.begin_run();
        state.entities.obstacles.clear();
        state.entities.pickups.clear();
        state.run.distance = 1000.0;
        state
    }

    fn pickup_at(state: &mut GameState, lane: Lane, relative: f32, kind: PickupKind) {
        let z = state.run.distance + relative;
        state.entities.add_pickup(Pickup {
            id: 0,
            lane,
            z,
            kind,
            phase: 0.0,
            spin: 1.0,
        });
    }

    #[test]
    fn test_obstacle_in_lane_is_fatal() {
        let mut state = playing_state();
        let z = state.run.distance + state.tuning.player_collision_depth;
        state.entities.add_obstacle(Obstacle::new(0, Lane::CENTER, z));

        check_collisions(&mut state);

        assert_eq!(state.phase, RunPhase::GameOver);
        assert!(state.entities.obstacles.is_empty());
        assert!(!state.entities.particles.is_empty());
        assert!(state.feedback.shake.is_active());
        let events = state.drain_events();
        assert!(events.contains(&RunEvent::Collision { lane: Lane::CENTER }));
        assert!(events.iter().any(|e| matches!(
            e,
            RunEvent::RunEnded { reason: EndReason::CollisionDetected, .. }
        )));
    }

    #[test]
    fn test_obstacle_in_other_lane_is_harmless() {
        let mut state = playing_state();
        let z = state.run.distance + state.tuning.player_collision_depth;
        state.entities.add_obstacle(Obstacle::new(0, Lane::LEFT, z));

        check_collisions(&mut state);

        assert_eq!(state.phase, RunPhase::Playing);
        assert_eq!(state.entities.obstacles.len(), 1);
    }

    #[test]
    fn test_collision_window_edges() {
        let tuning = Tuning::default();
        let at = |offset: f32| {
            let obstacle = Obstacle::new(1, Lane::RIGHT, 500.0 + tuning.player_collision_depth + offset);
            obstacle_hits(&obstacle, Lane::RIGHT, 500.0, &tuning)
        };
        assert!(at(0.0));
        assert!(at(tuning.collision_window - 0.5));
        assert!(at(-tuning.collision_window + 0.5));
        assert!(!at(tuning.collision_window + 1.0));
        assert!(!at(-tuning.collision_window - 1.0));
    }

    #[test]
    fn test_no_checks_outside_playing() {
        let mut state = playing_state();
        let z = state.run.distance + state.tuning.player_collision_depth;
        state.entities.add_obstacle(Obstacle::new(0, Lane::CENTER, z));
        state.pause();

        check_collisions(&mut state);
        assert_eq!(state.phase, RunPhase::Paused);
        assert_eq!(state.entities.obstacles.len(), 1);
    }

    #[test]
    fn test_energy_fragment_applies_once() {
        let mut state = playing_state();
        state.run.energy = 50.0;
        let depth = state.tuning.player_collision_depth;
        pickup_at(&mut state, Lane::CENTER, depth, PickupKind::EnergyFragment);

        check_collisions(&mut state);
        assert_eq!(state.run.energy, 50.0 + state.tuning.fragment_energy);
        assert_eq!(state.run.pickups, 1);
        assert!(state.entities.pickups.is_empty());

        check_collisions(&mut state);
        assert_eq!(state.run.pickups, 1);
        assert_eq!(
            state.drain_events(),
            vec![RunEvent::PickupCollected { kind: PickupKind::EnergyFragment }]
        );
    }

    #[test]
    fn test_energy_gain_clamped_to_max() {
        let mut state = playing_state();
        state.run.energy = state.tuning.energy_max - 1.0;
        let depth = state.tuning.player_collision_depth;
        pickup_at(&mut state, Lane::CENTER, depth, PickupKind::EnergyFragment);

        check_collisions(&mut state);
        assert_eq!(state.run.energy, state.tuning.energy_max);
    }

    #[test]
    fn test_boost_refreshes_instead_of_stacking() {
        let mut state = playing_state();
        let tuning = state.tuning.clone();
        let depth = tuning.player_collision_depth;

        pickup_at(&mut state, Lane::CENTER, depth, PickupKind::Boost);
        pickup_at(&mut state, Lane::CENTER, depth + 10.0, PickupKind::Boost);
        check_collisions(&mut state);

        assert_eq!(state.run.boosts, 2);
        assert_eq!(state.run.boost_timer, tuning.boost_time);
        assert_eq!(state.run.base_speed, tuning.start_speed + 2.0 * tuning.boost_speed_bonus);
        let events = state.drain_events();
        assert_eq!(events.iter().filter(|e| **e == RunEvent::BoostTriggered).count(), 2);
    }

    #[test]
    fn test_boost_speed_bonus_capped() {
        let tuning = Tuning::default();
        let mut run = RunState::new(&tuning);
        run.base_speed = tuning.max_speed - 1.0;
        run.boost_timer = tuning.boost_time * 2.0;
        apply_pickup(&mut run, PickupKind::Boost, &tuning);
        assert_eq!(run.base_speed, tuning.max_speed);
        // A longer running timer is kept
        assert_eq!(run.boost_timer, tuning.boost_time * 2.0);
    }

    #[test]
    fn test_pickups_swept_by_depth() {
        let mut state = playing_state();
        let depth = state.tuning.player_collision_depth;
        // Passed long ago
        pickup_at(&mut state, Lane::CENTER, -60.0, PickupKind::EnergyFragment);
        // Ahead in another lane
        pickup_at(&mut state, Lane::LEFT, depth + 400.0, PickupKind::EnergyFragment);
        // In the window but another lane: still reachable
        pickup_at(&mut state, Lane::RIGHT, depth, PickupKind::EnergyFragment);

        check_collisions(&mut state);
        assert_eq!(state.run.pickups, 0);
        assert_eq!(state.entities.pickups.len(), 2);
        assert!(state.entities.pickups.iter().all(|p| p.z > state.run.distance));
    }
}
