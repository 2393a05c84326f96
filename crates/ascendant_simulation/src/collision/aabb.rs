//! Axis-aligned rectangle in level space (y grows downward)

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// Penetration at or below this depth counts as touching, not overlapping.
///
/// An exact push-out leaves the two rectangles sharing an edge, but float
/// rounding in `position + offset` can leave a sliver of overlap behind.
pub const CONTACT_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self::new(min.x, min.y, size.x.max(0.0), size.y.max(0.0))
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap: shared edges and sub-epsilon slivers do not count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let depth_x = self.right().min(other.right()) - self.left().max(other.left());
        let depth_y = self.bottom().min(other.bottom()) - self.top().max(other.top());
        depth_x > CONTACT_EPSILON && depth_y > CONTACT_EPSILON
    }

    /// Index of the first rectangle in `others` this one overlaps.
    pub fn first_overlap(&self, others: &[Aabb]) -> Option<usize> {
        others.iter().position(|other| self.overlaps(other))
    }

    pub fn overlaps_any(&self, others: &[Aabb]) -> bool {
        self.first_overlap(others).is_some()
    }

    /// Grow by `dx` total width and `dy` total height around the same centre.
    /// Negative amounts shrink; size never goes below zero.
    pub fn inflate(&self, dx: f32, dy: f32) -> Aabb {
        let w = (self.w + dx).max(0.0);
        let h = (self.h + dy).max(0.0);
        let center = self.center();
        Aabb::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    pub fn translate(&self, offset: Vec2) -> Aabb {
        Aabb::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }

    pub fn is_valid(&self) -> bool {
        self.w >= 0.0 && self.h >= 0.0 && self.x.is_finite() && self.y.is_finite()
    }
}
