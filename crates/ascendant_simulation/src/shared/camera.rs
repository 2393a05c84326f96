//! Smoothed follow camera
//!
//! Works in level space with the view's top-left corner as its position.
//! The focus may drift inside a dead zone around the viewport centre; past
//! it the view moves toward the focus at `max_speed` scaled by how far the
//! focus is outside the zone, never slower than `min_speed`, and never past
//! the level bounds. Speeds are px per tick.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Speed at full deviation (px/tick)
    pub max_speed: f32,
    /// Floor on any non-zero move (px/tick)
    pub min_speed: f32,
    /// Half-extent of the dead zone as a fraction of the viewport
    pub dead_zone: Vec2,
    /// Visible area in level pixels
    pub viewport: Vec2,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            max_speed: 30.0,
            min_speed: 1.0,
            dead_zone: Vec2::new(0.1, 0.02),
            viewport: Vec2::new(480.0, 270.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    config: CameraConfig,
    view: Vec2,
    bounds: Aabb,
}

impl Camera {
    pub fn new(config: CameraConfig, bounds: Aabb) -> Self {
        Self {
            config,
            view: bounds.min(),
            bounds,
        }
    }

    pub fn set_bounds(&mut self, bounds: Aabb) {
        self.bounds = bounds;
    }

    pub fn view_origin(&self) -> Vec2 {
        self.view
    }

    pub fn view_rect(&self) -> Aabb {
        Aabb::from_min_size(self.view, self.config.viewport)
    }

    /// Centre the view on `focus` immediately, respecting bounds.
    pub fn snap(&mut self, focus: Vec2) {
        let viewport = self.config.viewport;
        let target = focus - viewport * 0.5;
        let max = Vec2::new(self.bounds.right(), self.bounds.bottom()) - viewport;
        self.view = target.min(max).max(self.bounds.min());
    }

    /// One smoothing step toward `focus`. Returns whether the view moved.
    pub fn follow(&mut self, focus: Vec2) -> bool {
        let before = self.view;
        let screen = focus - self.view;
        let viewport = self.config.viewport;
        let dead_zone = self.config.dead_zone;

        self.view.x = self.follow_axis(
            self.view.x,
            screen.x,
            viewport.x,
            dead_zone.x,
            self.bounds.left(),
            self.bounds.right(),
        );
        self.view.y = self.follow_axis(
            self.view.y,
            screen.y,
            viewport.y,
            dead_zone.y,
            self.bounds.top(),
            self.bounds.bottom(),
        );

        self.view != before
    }

    fn follow_axis(&self, view: f32, screen: f32, extent: f32, dead_zone: f32, lo: f32, hi: f32) -> f32 {
        let far = extent * (0.5 + dead_zone);
        let near = extent * (0.5 - dead_zone);
        let span = near.max(f32::EPSILON);

        if screen > far {
            let deviation = (screen - far) / span;
            let step = (self.config.max_speed * deviation).max(self.config.min_speed);
            (view + step).min(hi - extent)
        } else if screen < near {
            let deviation = (near - screen) / span;
            let step = (self.config.max_speed * deviation).max(self.config.min_speed);
            (view - step).max(lo)
        } else {
            view
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(CameraConfig::default(), Aabb::new(0.0, 0.0, 2000.0, 600.0))
    }

    #[test]
    fn test_focus_inside_dead_zone_keeps_view() {
        let mut camera = camera();
        camera.snap(Vec2::new(500.0, 300.0));
        let before = camera.view_origin();

        assert!(!camera.follow(Vec2::new(510.0, 301.0)));
        assert_eq!(camera.view_origin(), before);
    }

    #[test]
    fn test_follow_lags_behind_focus() {
        let mut camera = camera();
        camera.snap(Vec2::new(500.0, 300.0));
        let start = camera.view_origin();

        assert!(camera.follow(Vec2::new(900.0, 300.0)));
        let moved = camera.view_origin().x - start.x;
        assert!(moved > 0.0 && moved < 400.0);
    }

    #[test]
    fn test_snap_clamped_to_bounds() {
        let mut camera = camera();
        camera.snap(Vec2::new(0.0, 0.0));
        assert_eq!(camera.view_origin(), Vec2::ZERO);

        camera.snap(Vec2::new(5000.0, 5000.0));
        assert_eq!(camera.view_origin(), Vec2::new(2000.0 - 480.0, 600.0 - 270.0));
    }
}
