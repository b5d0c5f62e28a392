//! Cosmetic feedback preferences
//!
//! Owned by the host (menus, storage). The core only reads them when building
//! a render frame; they never influence the simulation.

use serde::{Deserialize, Serialize};

/// Particle density presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ParticleDensity {
    Off,
    Low,
    #[default]
    Full,
}

impl ParticleDensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleDensity::Off => "Off",
            ParticleDensity::Low => "Low",
            ParticleDensity::Full => "Full",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "none" => Some(ParticleDensity::Off),
            "low" => Some(ParticleDensity::Low),
            "full" | "high" => Some(ParticleDensity::Full),
            _ => None,
        }
    }

    /// Particles drawn per frame for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            ParticleDensity::Off => 0,
            ParticleDensity::Low => 96,
            ParticleDensity::Full => usize::MAX,
        }
    }
}

/// Feedback preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub particles: ParticleDensity,
    /// Screen shake on crashes and boosts
    pub screen_shake: bool,
    /// Reduced motion (suppresses shake regardless of `screen_shake`)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            particles: ParticleDensity::Full,
            screen_shake: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particle cap
    pub fn max_particles(&self) -> usize {
        self.particles.max_particles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_disables_shake() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_screen_shake());
        assert!(Settings::default().effective_screen_shake());
    }

    #[test]
    fn test_density_parsing() {
        assert_eq!(ParticleDensity::from_str("LOW"), Some(ParticleDensity::Low));
        assert_eq!(ParticleDensity::from_str("none"), Some(ParticleDensity::Off));
        assert_eq!(ParticleDensity::from_str("ultra"), None);
        assert_eq!(ParticleDensity::Off.max_particles(), 0);
    }
}
