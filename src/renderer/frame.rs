//! Frame building for an external rasterizer
//!
//! Projects every visible entity, drops the ones outside the view range and
//! orders the rest back-to-front so later instances occlude earlier ones.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::projection::Layout;
use crate::settings::Settings;
use crate::sim::{GameState, PickupKind, RunPhase};

/// Sprite kinds understood by the rasterizer
pub mod kinds {
    pub const OBSTACLE: u32 = 0;
    pub const ENERGY_FRAGMENT: u32 = 1;
    pub const BOOST: u32 = 2;
    pub const PARTICLE: u32 = 3;
    pub const SHIP: u32 = 4;
}

/// Lift of a pickup's resting height above the track
const PICKUP_HOVER: f32 = 18.0;
/// Bob amplitude of pickups
const PICKUP_BOB: f32 = 6.0;

/// One projected sprite, laid out for direct upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 2],
    pub ground_y: f32,
    pub scale: f32,
    /// Normalized depth (0 far, 1 near)
    pub depth: f32,
    /// Per-kind size factor (obstacle width, particle size)
    pub size: f32,
    pub hue: f32,
    pub rotation: f32,
    pub alpha: f32,
    pub kind: u32,
}

/// Everything a rasterizer needs for one frame
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Back-to-front
    pub instances: Vec<SpriteInstance>,
    /// Offset to apply to the whole frame
    pub shake: Vec2,
}

impl Frame {
    /// Raw instance bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

/// Build the draw list for the current state
pub fn build_frame(state: &GameState, settings: &Settings) -> Frame {
    let layout: &Layout = &state.layout;
    let distance = state.run.distance;
    let mut items: Vec<(f32, SpriteInstance)> = Vec::with_capacity(
        state.entities.obstacles.len() + state.entities.pickups.len() + state.entities.particles.len() + 1,
    );

    let mut push = |lane: f32, relative: f32, lift: f32, size: f32, hue: f32, rotation: f32, alpha: f32, kind: u32| {
        if let Some(point) = layout.project(lane, relative, lift) {
            items.push((
                relative,
                SpriteInstance {
                    position: point.pos.to_array(),
                    ground_y: point.ground_y,
                    scale: point.scale,
                    depth: point.depth,
                    size,
                    hue,
                    rotation,
                    alpha,
                    kind,
                },
            ));
        }
    };

    for obstacle in &state.entities.obstacles {
        push(
            obstacle.lane.offset(),
            obstacle.z - distance,
            0.0,
            obstacle.width,
            obstacle.hue,
            obstacle.tilt,
            1.0,
            kinds::OBSTACLE,
        );
    }

    for pickup in &state.entities.pickups {
        let kind = match pickup.kind {
            PickupKind::EnergyFragment => kinds::ENERGY_FRAGMENT,
            PickupKind::Boost => kinds::BOOST,
        };
        push(
            pickup.lane.offset(),
            pickup.z - distance,
            PICKUP_HOVER + pickup.phase.sin() * PICKUP_BOB,
            1.0,
            0.0,
            pickup.phase,
            1.0,
            kind,
        );
    }

    // Newest particles win when the preset caps the count
    let particles = &state.entities.particles;
    let shown = particles.len().min(settings.max_particles());
    for particle in &particles[particles.len() - shown..] {
        push(
            particle.pos.x,
            particle.pos.z - distance,
            particle.pos.y,
            particle.size,
            particle.hue,
            0.0,
            particle.life_fraction(),
            kinds::PARTICLE,
        );
    }

    if state.phase != RunPhase::Start {
        let alpha = if state.phase == RunPhase::GameOver { 0.0 } else { 1.0 };
        let bank = (state.run.lane.offset() - state.run.visual_lane) * -0.35;
        push(
            state.run.visual_lane,
            state.tuning.player_collision_depth,
            0.0,
            1.0,
            if state.run.is_boosting() { 188.0 } else { 40.0 },
            bank,
            alpha,
            kinds::SHIP,
        );
    }

    // Stable sort keeps insertion order among equal depths
    items.sort_by(|a, b| b.0.total_cmp(&a.0));

    let shake = if settings.effective_screen_shake() {
        state.feedback.shake.offset()
    } else {
        Vec2::ZERO
    };

    Frame {
        instances: items.into_iter().map(|(_, instance)| instance).collect(),
        shake,
    }
}
