//! Data-driven game balance
//!
//! Every number that shapes a run lives here so balance passes never touch
//! simulation code. Partial JSON files override individual fields and fall
//! back to the shipped defaults for the rest.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("`{field}` must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("`{field}` must be within [0, 1] (got {value})")]
    NotProbability { field: &'static str, value: f32 },
    #[error("`{low}` ({low_value}) must not exceed `{high}` ({high_value})")]
    InvertedRange {
        low: &'static str,
        low_value: f32,
        high: &'static str,
        high_value: f32,
    },
    #[error(
        "depth windows too narrow: top speed covers {per_tick} per tick but the narrowest window spans {window}"
    )]
    WindowTooNarrow { per_tick: f32, window: f32 },
}

/// Balance constants for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed ===
    /// Base speed at run start (units/s)
    pub start_speed: f32,
    /// Base speed ceiling (units/s)
    pub max_speed: f32,
    /// Base speed gain per second
    pub acceleration: f32,

    // === Boost ===
    /// Speed multiplier while the boost timer runs
    pub boost_multiplier: f32,
    /// Boost duration (seconds), refreshed on pickup rather than stacked
    pub boost_time: f32,
    /// Permanent base speed bonus per boost pickup
    pub boost_speed_bonus: f32,
    /// Energy drain multiplier while boosting
    pub boost_drain_factor: f32,

    // === Energy ===
    pub energy_max: f32,
    /// Flat drain per second
    pub base_drain: f32,
    /// Additional drain per second per unit of speed
    pub drain_per_speed: f32,
    pub fragment_energy: f32,
    pub boost_energy: f32,

    // === Collision ===
    /// Depth ahead of the camera where the ship sits
    pub player_collision_depth: f32,
    /// Obstacle depth tolerance around the ship
    pub collision_window: f32,
    /// Pickup depth tolerance around the ship
    pub pickup_window: f32,

    // === Spawning ===
    pub min_spacing: f32,
    pub max_spacing: f32,
    /// Fraction of spacing removed at full difficulty
    pub spacing_difficulty_cut: f32,
    /// Spacing multiplier while boosting
    pub boost_spacing_factor: f32,
    /// Extra depth beyond the visible range kept populated
    pub lookahead_buffer: f32,
    /// Depth of the first wave on a fresh run
    pub initial_spawn_depth: f32,
    /// Distance over which difficulty ramps from 0 to 1
    pub difficulty_span: f32,
    pub second_obstacle_base: f32,
    pub second_obstacle_scale: f32,
    pub second_obstacle_offset_min: f32,
    pub second_obstacle_offset_max: f32,
    pub fragment_chance: f32,
    pub fragment_offset: f32,
    pub boost_chance_base: f32,
    pub boost_chance_scale: f32,
    pub boost_offset: f32,

    // === Progress ===
    /// Distance per region
    pub region_span: f32,
    pub score_per_distance: f32,
    pub score_per_pickup: u64,
    pub score_per_boost: u64,

    // === View ===
    /// Farthest depth that is projected and drawn
    pub view_depth: f32,
    /// Entities this far behind the ship are removed
    pub cleanup_margin: f32,
    /// Visual lane smoothing rate (1/s)
    pub lane_smoothing: f32,
    /// Upper bound on a single tick's delta time
    pub max_frame_dt: f32,

    // === Feedback ===
    pub max_particles: usize,
    pub crash_particles: u32,
    pub fragment_particles: u32,
    pub boost_particles: u32,
    /// Downward acceleration on particle lift
    pub particle_gravity: f32,
    pub crash_shake: (f32, f32),
    pub boost_shake: (f32, f32),
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_speed: 260.0,
            max_speed: 620.0,
            acceleration: 6.0,

            boost_multiplier: 1.4,
            boost_time: 3.2,
            boost_speed_bonus: 60.0,
            boost_drain_factor: 0.45,

            energy_max: 100.0,
            base_drain: 2.0,
            drain_per_speed: 0.006,
            fragment_energy: 12.0,
            boost_energy: 22.0,

            player_collision_depth: 120.0,
            collision_window: 45.0,
            pickup_window: 58.0,

            min_spacing: 340.0,
            max_spacing: 560.0,
            spacing_difficulty_cut: 0.4,
            boost_spacing_factor: 1.15,
            lookahead_buffer: 600.0,
            initial_spawn_depth: 900.0,
            difficulty_span: 12000.0,
            second_obstacle_base: 0.25,
            second_obstacle_scale: 0.45,
            second_obstacle_offset_min: 40.0,
            second_obstacle_offset_max: 140.0,
            fragment_chance: 0.82,
            fragment_offset: 140.0,
            boost_chance_base: 0.06,
            boost_chance_scale: 0.1,
            boost_offset: 260.0,

            region_span: 2500.0,
            score_per_distance: 0.1,
            score_per_pickup: 50,
            score_per_boost: 120,

            view_depth: 1600.0,
            cleanup_margin: 120.0,
            lane_smoothing: 14.0,
            max_frame_dt: 0.1,

            max_particles: 384,
            crash_particles: 28,
            fragment_particles: 12,
            boost_particles: 20,
            particle_gravity: 380.0,
            crash_shake: (0.45, 14.0),
            boost_shake: (0.2, 5.0),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a tuning file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Check ranges that the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("start_speed", self.start_speed),
            ("max_speed", self.max_speed),
            ("boost_multiplier", self.boost_multiplier),
            ("boost_time", self.boost_time),
            ("energy_max", self.energy_max),
            ("player_collision_depth", self.player_collision_depth),
            ("collision_window", self.collision_window),
            ("pickup_window", self.pickup_window),
            ("min_spacing", self.min_spacing),
            ("difficulty_span", self.difficulty_span),
            ("region_span", self.region_span),
            ("view_depth", self.view_depth),
            ("max_frame_dt", self.max_frame_dt),
        ];
        for (field, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(TuningError::NonPositive { field, value });
            }
        }

        let non_negative = [
            ("acceleration", self.acceleration),
            ("boost_speed_bonus", self.boost_speed_bonus),
            ("boost_drain_factor", self.boost_drain_factor),
            ("base_drain", self.base_drain),
            ("drain_per_speed", self.drain_per_speed),
            ("fragment_energy", self.fragment_energy),
            ("boost_energy", self.boost_energy),
            ("boost_spacing_factor", self.boost_spacing_factor),
            ("lookahead_buffer", self.lookahead_buffer),
            ("initial_spawn_depth", self.initial_spawn_depth),
            ("second_obstacle_offset_min", self.second_obstacle_offset_min),
            ("fragment_offset", self.fragment_offset),
            ("boost_offset", self.boost_offset),
            ("score_per_distance", self.score_per_distance),
            ("cleanup_margin", self.cleanup_margin),
            ("lane_smoothing", self.lane_smoothing),
            ("crash_shake.0", self.crash_shake.0),
            ("crash_shake.1", self.crash_shake.1),
            ("boost_shake.0", self.boost_shake.0),
            ("boost_shake.1", self.boost_shake.1),
        ];
        for (field, value) in non_negative {
            if value < 0.0 || !value.is_finite() {
                return Err(TuningError::Negative { field, value });
            }
        }

        let probabilities = [
            ("spacing_difficulty_cut", self.spacing_difficulty_cut),
            ("second_obstacle_base", self.second_obstacle_base),
            (
                "second_obstacle_base + second_obstacle_scale",
                self.second_obstacle_base + self.second_obstacle_scale,
            ),
            ("fragment_chance", self.fragment_chance),
            ("boost_chance_base", self.boost_chance_base),
            (
                "boost_chance_base + boost_chance_scale",
                self.boost_chance_base + self.boost_chance_scale,
            ),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::NotProbability { field, value });
            }
        }

        let ranges = [
            ("start_speed", self.start_speed, "max_speed", self.max_speed),
            ("min_spacing", self.min_spacing, "max_spacing", self.max_spacing),
            (
                "second_obstacle_offset_min",
                self.second_obstacle_offset_min,
                "second_obstacle_offset_max",
                self.second_obstacle_offset_max,
            ),
        ];
        for (low, low_value, high, high_value) in ranges {
            if low_value > high_value {
                return Err(TuningError::InvertedRange {
                    low,
                    low_value,
                    high,
                    high_value,
                });
            }
        }

        // A full-speed tick must not step over a whole window
        let per_tick = self.max_speed * self.boost_multiplier * self.max_frame_dt;
        let window = 2.0 * self.collision_window.min(self.pickup_window);
        if per_tick > window {
            return Err(TuningError::WindowTooNarrow { per_tick, window });
        }

        Ok(())
    }

    /// Difficulty in [0, 1] for a travelled distance
    pub fn difficulty(&self, distance: f32) -> f32 {
        (distance / self.difficulty_span).clamp(0.0, 1.0)
    }
}
