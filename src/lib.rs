//! Sunlane - an endless three-lane solar runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (run state, spawning, collisions, feedback)
//! - `renderer`: Pseudo-3D projection and back-to-front frame building
//! - `tuning`: Data-driven game balance
//! - `settings`: Cosmetic feedback preferences

pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the native driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 6;

    /// Leftmost lane
    pub const MIN_LANE: i8 = -1;
    /// Rightmost lane
    pub const MAX_LANE: i8 = 1;
    /// Number of lanes on the track
    pub const LANE_COUNT: usize = 3;

    /// Entities further behind the camera than this cannot be projected
    pub const PROJECTION_NEAR_LIMIT: f32 = -80.0;
    /// Pickups further behind the player than this count as missed
    pub const PICKUP_MISS_DEPTH: f32 = -40.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Frame-rate independent exponential smoothing factor for a rate (1/s)
#[inline]
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}
