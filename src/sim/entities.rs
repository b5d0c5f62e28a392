//! Track entities and the registry that owns them
//!
//! Containers keep insertion order, which is also id order, so iteration is
//! stable across runs with the same seed.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::Lane;

/// A solid block on the track; touching it ends the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub lane: Lane,
    /// Track depth
    pub z: f32,
    /// Width scale factor
    pub width: f32,
    /// Height scale factor
    pub height: f32,
    /// Rotation tilt (radians)
    pub tilt: f32,
    /// Hue in degrees
    pub hue: f32,
}

impl Obstacle {
    pub fn new(id: u32, lane: Lane, z: f32) -> Self {
        Self {
            id,
            lane,
            z,
            width: 1.0,
            height: 1.0,
            tilt: 0.0,
            hue: 0.0,
        }
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Restores a fixed amount of energy
    EnergyFragment,
    /// Energy, a refreshed boost timer and a permanent speed bonus
    Boost,
}

impl PickupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickupKind::EnergyFragment => "energy-fragment",
            PickupKind::Boost => "boost",
        }
    }
}

/// A collectible on the track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub lane: Lane,
    pub z: f32,
    pub kind: PickupKind,
    /// Animation phase (radians), render only
    pub phase: f32,
    /// Phase advance per second
    pub spin: f32,
}

impl Pickup {
    /// Advance the spin animation
    pub fn animate(&mut self, dt: f32) {
        self.phase = (self.phase + self.spin * dt).rem_euclid(std::f32::consts::TAU);
    }
}

/// A cosmetic particle in lane space
///
/// `pos.x` is a lane offset, `pos.y` lift above the ground, `pos.z` track depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec3,
    pub vel: Vec3,
    /// Seconds left
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub hue: f32,
}

impl Particle {
    /// Remaining life as a fraction in [0, 1]
    pub fn life_fraction(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Owns every obstacle, pickup and particle of a run
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    pub obstacles: Vec<Obstacle>,
    pub pickups: Vec<Pickup>,
    pub particles: Vec<Particle>,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Insert an obstacle with a fresh id and return that id
    pub fn add_obstacle(&mut self, mut obstacle: Obstacle) -> u32 {
        obstacle.id = self.next_entity_id();
        let id = obstacle.id;
        self.obstacles.push(obstacle);
        id
    }

    /// Insert a pickup with a fresh id and return that id
    pub fn add_pickup(&mut self, mut pickup: Pickup) -> u32 {
        pickup.id = self.next_entity_id();
        let id = pickup.id;
        self.pickups.push(pickup);
        id
    }

    /// Append particles, dropping the oldest beyond `cap`
    pub fn add_particles(&mut self, particles: impl IntoIterator<Item = Particle>, cap: usize) {
        self.particles.extend(particles);
        if self.particles.len() > cap {
            let excess = self.particles.len() - cap;
            self.particles.drain(..excess);
        }
    }

    /// Remove entities more than `margin` behind the player at `distance`,
    /// along with expired particles
    pub fn cleanup(&mut self, distance: f32, margin: f32) {
        let behind = |z: f32| z - distance < -margin;
        self.obstacles.retain(|o| !behind(o.z));
        self.pickups.retain(|p| !behind(p.z));
        self.particles.retain(|p| p.life > 0.0 && !behind(p.pos.z));
    }

    /// Remove an obstacle by id
    pub fn remove_obstacle(&mut self, id: u32) -> Option<Obstacle> {
        let index = self.obstacles.iter().position(|o| o.id == id)?;
        Some(self.obstacles.remove(index))
    }

    /// Lanes holding an obstacle within `tolerance` of depth `z`
    pub fn blocked_lanes(&self, z: f32, tolerance: f32) -> Vec<Lane> {
        let mut lanes: Vec<Lane> = self
            .obstacles
            .iter()
            .filter(|o| (o.z - z).abs() <= tolerance)
            .map(|o| o.lane)
            .collect();
        lanes.sort_by_key(|l| l.index());
        lanes.dedup();
        lanes
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty() && self.pickups.is_empty() && self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(z: f32, life: f32) -> Particle {
        Particle {
            pos: Vec3::new(0.0, 0.0, z),
            vel: Vec3::ZERO,
            life,
            max_life: 1.0,
            size: 2.0,
            hue: 0.0,
        }
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut registry = EntityRegistry::new();
        let a = registry.add_obstacle(Obstacle::new(0, Lane::LEFT, 100.0));
        let b = registry.add_pickup(Pickup {
            id: 0,
            lane: Lane::CENTER,
            z: 120.0,
            kind: PickupKind::Boost,
            phase: 0.0,
            spin: 1.0,
        });
        let c = registry.add_obstacle(Obstacle::new(0, Lane::RIGHT, 140.0));
        assert!(a < b && b < c);
        assert_eq!(registry.obstacles[1].id, c);
    }

    #[test]
    fn test_cleanup_removes_entities_behind_margin() {
        let mut registry = EntityRegistry::new();
        registry.add_obstacle(Obstacle::new(0, Lane::LEFT, 100.0));
        registry.add_obstacle(Obstacle::new(0, Lane::LEFT, 900.0));
        registry.add_particles([particle(950.0, 0.5), particle(100.0, 0.5), particle(950.0, 0.0)], 64);

        registry.cleanup(1000.0, 120.0);

        assert_eq!(registry.obstacles.len(), 1);
        assert_eq!(registry.obstacles[0].z, 900.0);
        assert_eq!(registry.particles.len(), 1);
        assert_eq!(registry.particles[0].pos.z, 950.0);
    }

    #[test]
    fn test_particle_cap_drops_oldest() {
        let mut registry = EntityRegistry::new();
        registry.add_particles((0..10).map(|i| particle(i as f32, 1.0)), 4);
        assert_eq!(registry.particles.len(), 4);
        assert_eq!(registry.particles[0].pos.z, 6.0);
    }

    #[test]
    fn test_blocked_lanes() {
        let mut registry = EntityRegistry::new();
        registry.add_obstacle(Obstacle::new(0, Lane::RIGHT, 500.0));
        registry.add_obstacle(Obstacle::new(0, Lane::LEFT, 510.0));
        registry.add_obstacle(Obstacle::new(0, Lane::CENTER, 800.0));
        assert_eq!(registry.blocked_lanes(500.0, 20.0), vec![Lane::LEFT, Lane::RIGHT]);
    }

    #[test]
    fn test_pickup_animation_wraps() {
        let mut pickup = Pickup {
            id: 1,
            lane: Lane::CENTER,
            z: 0.0,
            kind: PickupKind::EnergyFragment,
            phase: 6.0,
            spin: 3.0,
        };
        pickup.animate(0.5);
        assert!(pickup.phase >= 0.0 && pickup.phase < std::f32::consts::TAU);
    }
}
