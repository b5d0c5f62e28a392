//! Cosmetic feedback: particle bursts and screen shake
//!
//! Nothing here feeds back into collisions, energy or score.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::Particle;
use crate::tuning::Tuning;

/// Parameters for one particle burst
#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    pub count: u32,
    pub hue: f32,
    /// Radial speed scale
    pub speed: f32,
    /// Base lifetime in seconds
    pub life: f32,
    pub size: f32,
}

impl Burst {
    /// Crash debris, tinted by the obstacle that was hit
    pub fn crash(tuning: &Tuning, hue: f32) -> Self {
        Self {
            count: tuning.crash_particles,
            hue,
            speed: 1.6,
            life: 0.9,
            size: 4.5,
        }
    }

    /// Golden sparkle for an energy fragment
    pub fn fragment(tuning: &Tuning) -> Self {
        Self {
            count: tuning.fragment_particles,
            hue: 48.0,
            speed: 0.9,
            life: 0.6,
            size: 3.0,
        }
    }

    /// Cyan streaks for a boost
    pub fn boost(tuning: &Tuning) -> Self {
        Self {
            count: tuning.boost_particles,
            hue: 188.0,
            speed: 1.2,
            life: 0.75,
            size: 3.5,
        }
    }
}

/// Decaying camera shake
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenShake {
    /// Seconds left
    pub remaining: f32,
    /// Length of the current shake
    pub duration: f32,
    /// Peak offset in pixels
    pub magnitude: f32,
    /// Oscillator clock
    time: f32,
}

impl ScreenShake {
    /// Start a shake unless a stronger one is already running
    pub fn trigger(&mut self, duration: f32, magnitude: f32) {
        if duration <= 0.0 || magnitude <= 0.0 {
            return;
        }
        if magnitude >= self.current_magnitude() {
            self.remaining = duration;
            self.duration = duration;
            self.magnitude = magnitude;
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.remaining <= 0.0 {
            return;
        }
        self.time += dt;
        self.remaining = (self.remaining - dt).max(0.0);
        if self.remaining == 0.0 {
            self.magnitude = 0.0;
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Magnitude after decay
    pub fn current_magnitude(&self) -> f32 {
        if self.duration <= 0.0 || self.remaining <= 0.0 {
            return 0.0;
        }
        let t = self.remaining / self.duration;
        self.magnitude * t * t
    }

    /// Positional offset for this frame
    ///
    /// Two sinusoids at different frequencies with a phase offset keep the
    /// motion from reading as a straight line.
    pub fn offset(&self) -> Vec2 {
        let amp = self.current_magnitude();
        if amp == 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            (self.time * 53.0).sin() * amp,
            (self.time * 37.0 + 1.7).sin() * amp * 0.8,
        )
    }
}

/// Spawns and integrates particles, owns the screen shake
#[derive(Debug, Clone, Default)]
pub struct FeedbackEmitter {
    pub shake: ScreenShake,
    /// Particles spawned this run
    pub emitted: u64,
}

impl FeedbackEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a radial burst at `origin` (lane space)
    pub fn burst<R: Rng + ?Sized>(&mut self, burst: &Burst, origin: Vec3, rng: &mut R) -> Vec<Particle> {
        let particles: Vec<Particle> = (0..burst.count)
            .map(|_| {
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                let speed = burst.speed * rng.random_range(0.6..1.4);
                let vel = Vec3::new(
                    angle.cos() * speed * 1.4,
                    angle.sin() * speed * 160.0 + 60.0,
                    rng.random_range(-1.0..1.0) * speed * 90.0,
                );
                let life = burst.life * rng.random_range(0.7..1.3);
                Particle {
                    pos: origin,
                    vel,
                    life,
                    max_life: life,
                    size: burst.size * rng.random_range(0.6..1.2),
                    hue: (burst.hue + rng.random_range(-12.0..12.0)).rem_euclid(360.0),
                }
            })
            .collect();
        self.emitted += particles.len() as u64;
        particles
    }

    /// Integrate particles and decay the shake
    pub fn update(&mut self, particles: &mut Vec<Particle>, gravity: f32, dt: f32) {
        for particle in particles.iter_mut() {
            particle.pos += particle.vel * dt;
            particle.vel.y -= gravity * dt;
            particle.life -= dt;
        }
        particles.retain(|p| p.life > 0.0);
        self.shake.update(dt);
    }
}
