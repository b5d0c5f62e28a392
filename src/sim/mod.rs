//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Delta time clamped before use
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No drawing or platform dependencies (the layout is plain data)

pub mod collision;
pub mod entities;
pub mod events;
pub mod feedback;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{apply_pickup, check_collisions, find_fatal_obstacle, obstacle_hits, sweep_pickups};
pub use entities::{EntityRegistry, Obstacle, Particle, Pickup, PickupKind};
pub use events::{EndReason, RunEvent};
pub use feedback::{Burst, FeedbackEmitter, ScreenShake};
pub use spawn::{SpawnScheduler, WaveReport, generate_wave, next_spacing};
pub use state::{GameState, Hud, Lane, RunPhase, RunState};
pub use tick::{TickInput, step, tick};
