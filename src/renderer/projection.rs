//! Pseudo-3D ground projection
//!
//! Maps (lane offset, relative depth, lift) onto the screen for a single fixed
//! camera looking down a flat track. Depth is eased quadratically so entities
//! bunch up near the horizon and spread out near the camera.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::PROJECTION_NEAR_LIMIT;
use crate::lerp;
use crate::tuning::Tuning;

/// Viewport-derived projection constants
///
/// Pure derived state: rebuilt on every resize, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub center_x: f32,
    pub horizon_y: f32,
    /// Screen height from horizon to bottom edge
    pub ground_height: f32,
    /// Pixels per lane at the camera
    pub near_spread: f32,
    /// Pixels per lane at the horizon
    pub far_spread: f32,
    /// Farthest projectable relative depth
    pub max_depth: f32,
    /// Scale at the horizon
    pub base_scale: f32,
    /// Scale gained from horizon to camera
    pub scale_range: f32,
    /// Ship anchor on screen (center lane, collision depth)
    pub ship: Vec2,
    pub ship_scale: f32,
}

/// A projected point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// Screen position including lift
    pub pos: Vec2,
    /// Ground line under the point
    pub ground_y: f32,
    pub scale: f32,
    /// 0 at the far edge, 1 at (or behind) the camera
    pub depth: f32,
}

impl Layout {
    pub fn new(width: f32, height: f32, tuning: &Tuning) -> Self {
        let width = sanitize_extent(width);
        let height = sanitize_extent(height);
        let horizon_y = height * 0.34;
        let unit = height / 720.0;

        let mut layout = Self {
            width,
            height,
            center_x: width * 0.5,
            horizon_y,
            ground_height: height - horizon_y,
            near_spread: width * 0.26,
            far_spread: width * 0.03,
            max_depth: tuning.view_depth,
            base_scale: 0.12 * unit,
            scale_range: unit,
            ship: Vec2::new(width * 0.5, height),
            ship_scale: unit,
        };

        // Anchor the ship where its collision depth projects
        if let Some(point) = layout.project(0.0, tuning.player_collision_depth, 0.0) {
            layout.ship = point.pos;
            layout.ship_scale = point.scale;
        }
        layout
    }

    /// Project a lane-space point
    ///
    /// Returns `None` for depths outside `[-80, max_depth]`; callers skip
    /// drawing those.
    pub fn project(&self, lane_offset: f32, relative_depth: f32, lift: f32) -> Option<ScreenPoint> {
        if !(PROJECTION_NEAR_LIMIT..=self.max_depth).contains(&relative_depth) {
            return None;
        }

        let normalized = (1.0 - relative_depth / self.max_depth).clamp(0.0, 1.0);
        let eased = normalized * normalized;

        let spread = lerp(self.far_spread, self.near_spread, eased);
        let ground_y = self.horizon_y + eased * self.ground_height;
        let scale = self.base_scale + eased * self.scale_range;
        let x = self.center_x + lane_offset * spread;
        let y = ground_y - lift * scale;

        Some(ScreenPoint {
            pos: Vec2::new(x, y),
            ground_y,
            scale,
            depth: normalized,
        })
    }
}

fn sanitize_extent(value: f32) -> f32 {
    if value.is_finite() { value.max(1.0) } else { 1.0 }
}
