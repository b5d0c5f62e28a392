//! Procedural wave spawning
//!
//! The scheduler keeps a cursor ahead of the player and emits waves until the
//! cursor clears the visible range plus a lookahead buffer. Every wave leaves
//! one lane free of obstacles.

use rand::Rng;
use rand::seq::SliceRandom;

use super::entities::{EntityRegistry, Obstacle, Pickup, PickupKind};
use super::state::{Lane, RunState};
use crate::tuning::Tuning;

/// What a single wave placed
#[derive(Debug, Clone, PartialEq)]
pub struct WaveReport {
    pub depth: f32,
    /// Lane guaranteed obstacle-free at this wave
    pub safe_lane: Lane,
    /// Lanes that received an obstacle
    pub hazard_lanes: Vec<Lane>,
    pub pickups: Vec<PickupKind>,
}

/// Spawn cursor state
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    cursor: f32,
    waves: u32,
}

impl SpawnScheduler {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            cursor: tuning.initial_spawn_depth,
            waves: 0,
        }
    }

    /// Depth at which the next wave will be placed
    #[inline]
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Waves emitted this run
    #[inline]
    pub fn waves(&self) -> u32 {
        self.waves
    }

    /// Depth the cursor must reach for the track to count as populated
    pub fn horizon(distance: f32, tuning: &Tuning) -> f32 {
        distance + tuning.view_depth + tuning.lookahead_buffer
    }

    /// Emit waves until the cursor is past the horizon
    pub fn fill<R: Rng + ?Sized>(
        &mut self,
        entities: &mut EntityRegistry,
        run: &RunState,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Vec<WaveReport> {
        let horizon = Self::horizon(run.distance, tuning);
        let difficulty = tuning.difficulty(run.distance);
        let mut reports = Vec::new();

        while self.cursor < horizon {
            let report = generate_wave(entities, self.cursor, difficulty, run.region, tuning, rng);
            log::debug!(
                "Wave {} at {:.0}: safe {:?}, hazards {:?}, pickups {:?}",
                self.waves,
                report.depth,
                report.safe_lane.index(),
                report.hazard_lanes,
                report.pickups
            );
            reports.push(report);
            self.waves += 1;
            self.cursor += next_spacing(difficulty, run.is_boosting(), tuning, rng);
        }

        reports
    }
}

/// Distance to the next wave
///
/// Drawn from the spacing range, tightened by difficulty and loosened while
/// boosting, never below 80% of the minimum spacing.
pub fn next_spacing<R: Rng + ?Sized>(
    difficulty: f32,
    boosting: bool,
    tuning: &Tuning,
    rng: &mut R,
) -> f32 {
    let mut spacing = rng.random_range(tuning.min_spacing..=tuning.max_spacing);
    spacing *= 1.0 - tuning.spacing_difficulty_cut * difficulty.clamp(0.0, 1.0);
    if boosting {
        spacing *= tuning.boost_spacing_factor;
    }
    spacing.max(0.8 * tuning.min_spacing)
}

/// Place one wave at `depth`
pub fn generate_wave<R: Rng + ?Sized>(
    entities: &mut EntityRegistry,
    depth: f32,
    difficulty: f32,
    region: u32,
    tuning: &Tuning,
    rng: &mut R,
) -> WaveReport {
    let difficulty = difficulty.clamp(0.0, 1.0);
    let mut lanes = Lane::ALL;
    lanes.shuffle(rng);
    let [safe_lane, first_hazard, second_hazard] = lanes;

    // Each region gets its own hue band
    let region_hue = (region.saturating_sub(1) as f32 * 47.0).rem_euclid(360.0);

    let mut hazard_lanes = vec![first_hazard];
    spawn_obstacle(entities, first_hazard, depth, region_hue, rng);

    let second_chance = tuning.second_obstacle_base + tuning.second_obstacle_scale * difficulty;
    if rng.random_bool(second_chance as f64) {
        let offset = rng.random_range(
            tuning.second_obstacle_offset_min..=tuning.second_obstacle_offset_max,
        );
        spawn_obstacle(entities, second_hazard, depth + offset, region_hue, rng);
        hazard_lanes.push(second_hazard);
    }

    let mut pickups = Vec::new();
    if rng.random_bool(tuning.fragment_chance as f64) {
        spawn_pickup(entities, PickupKind::EnergyFragment, safe_lane, depth + tuning.fragment_offset, rng);
        pickups.push(PickupKind::EnergyFragment);
    }

    let boost_chance = tuning.boost_chance_base + tuning.boost_chance_scale * difficulty;
    if rng.random_bool(boost_chance as f64) {
        spawn_pickup(entities, PickupKind::Boost, safe_lane, depth + tuning.boost_offset, rng);
        pickups.push(PickupKind::Boost);
    }

    WaveReport {
        depth,
        safe_lane,
        hazard_lanes,
        pickups,
    }
}

fn spawn_obstacle<R: Rng + ?Sized>(
    entities: &mut EntityRegistry,
    lane: Lane,
    z: f32,
    region_hue: f32,
    rng: &mut R,
) {
    let mut obstacle = Obstacle::new(0, lane, z);
    obstacle.width = rng.random_range(0.85..1.25);
    obstacle.height = rng.random_range(0.8..1.4);
    obstacle.tilt = rng.random_range(-0.25..0.25);
    obstacle.hue = (region_hue + rng.random_range(-18.0..18.0)).rem_euclid(360.0);
    entities.add_obstacle(obstacle);
}

fn spawn_pickup<R: Rng + ?Sized>(
    entities: &mut EntityRegistry,
    kind: PickupKind,
    lane: Lane,
    z: f32,
    rng: &mut R,
) {
    entities.add_pickup(Pickup {
        id: 0,
        lane,
        z,
        kind,
        phase: rng.random_range(0.0..std::f32::consts::TAU),
        spin: rng.random_range(1.5..3.5),
    });
}
