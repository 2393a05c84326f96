//! Kinematic body shared by every entity
//!
//! Architecture:
//! - Position is the top-left anchor of the sprite, not of the collider
//! - Collider is derived: position + fixed offset, fixed size
//! - Velocity integrated explicitly, dv = a·dt then dx = v·dt
//! - Solids resolved through [`crate::collision::sweep_solids`]

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::{sweep_solids, Aabb, ContactResponse, Sweep};

/// Medium the body currently moves through, picks the drag coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Medium {
    #[default]
    Air,
    Floor,
    Water,
}

/// Linear drag coefficients per medium (1/s)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resistance {
    pub air: f32,
    pub floor: f32,
    pub water: f32,
}

impl Default for Resistance {
    fn default() -> Self {
        Self {
            air: 1.0,
            floor: 10.0,
            water: 9.0,
        }
    }
}

impl Resistance {
    pub fn coefficient(&self, medium: Medium) -> f32 {
        match medium {
            Medium::Air => self.air,
            Medium::Floor => self.floor,
            Medium::Water => self.water,
        }
    }
}

/// Collider geometry relative to the body position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColliderShape {
    pub offset: Vec2,
    pub size: Vec2,
}

impl ColliderShape {
    pub fn new(offset: Vec2, size: Vec2) -> Self {
        Self { offset, size }
    }

    pub fn at(&self, position: Vec2) -> Aabb {
        Aabb::from_min_size(position + self.offset, self.size)
    }

    /// Body position that puts the collider's top-left corner at `collider_min`.
    pub fn position_for(&self, collider_min: Vec2) -> Vec2 {
        collider_min - self.offset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub shape: ColliderShape,
    collider: Aabb,
}

impl Body {
    pub fn new(position: Vec2, shape: ColliderShape) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            shape,
            collider: shape.at(position),
        }
    }

    pub fn collider(&self) -> Aabb {
        self.collider
    }

    pub fn center(&self) -> Vec2 {
        self.collider.center()
    }

    pub fn apply_gravity(&mut self, gravity: Vec2, dt: f32) {
        self.velocity += gravity * dt;
    }

    /// v -= v·dt·k
    pub fn apply_drag(&mut self, coefficient: f32, dt: f32) {
        if self.velocity != Vec2::ZERO {
            self.velocity -= self.velocity * dt * coefficient;
        }
    }

    /// Moves by `(velocity + extra)·dt` and re-derives the collider.
    /// `extra` is for velocity that collisions never cancel (walking).
    pub fn integrate(&mut self, extra: Vec2, dt: f32) {
        self.position += (self.velocity + extra) * dt;
        self.sync_collider();
    }

    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.sync_collider();
    }

    pub fn sync_collider(&mut self) {
        self.collider = self.shape.at(self.position);
    }

    /// Push the body out of every overlapping solid, updating velocity
    /// according to `response`.
    pub fn resolve(&mut self, solids: &[Aabb], dt: f32, response: ContactResponse) -> Sweep {
        let sweep = sweep_solids(self.collider, &mut self.velocity, dt, solids, response);
        if sweep.shift != Vec2::ZERO {
            self.position += sweep.shift;
            self.sync_collider();
        }
        sweep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn body() -> Body {
        Body::new(
            Vec2::new(0.0, 0.0),
            ColliderShape::new(Vec2::new(4.0, 2.0), Vec2::new(10.0, 20.0)),
        )
    }

    #[test]
    fn test_collider_follows_position() {
        let mut body = body();
        assert_eq!(body.collider(), Aabb::new(4.0, 2.0, 10.0, 20.0));

        body.velocity = Vec2::new(60.0, 0.0);
        body.integrate(Vec2::new(0.0, 120.0), DT);
        assert!(body.position.abs_diff_eq(Vec2::new(1.0, 2.0), 1e-5));
        assert!(body.collider().min().abs_diff_eq(Vec2::new(5.0, 4.0), 1e-5));
        assert_eq!(body.collider().size(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_drag_regimes_differ() {
        let resistance = Resistance::default();
        let mut air = body();
        let mut floor = body();
        air.velocity = Vec2::new(100.0, 0.0);
        floor.velocity = Vec2::new(100.0, 0.0);

        air.apply_drag(resistance.coefficient(Medium::Air), DT);
        floor.apply_drag(resistance.coefficient(Medium::Floor), DT);

        assert!(floor.velocity.x < air.velocity.x);
        assert!((air.velocity.x - (100.0 - 100.0 * DT)).abs() < 1e-4);
    }

    #[test]
    fn test_resting_on_platform_after_gravity() {
        let floor = Aabb::new(-50.0, 22.0, 200.0, 10.0);
        let mut body = body(); // collider bottom exactly at 22

        for _ in 0..120 {
            body.apply_gravity(Vec2::new(0.0, 1500.0), DT);
            body.integrate(Vec2::ZERO, DT);
            body.resolve(&[floor], DT, ContactResponse::Inelastic { fast_movers: true });
        }

        assert!((body.collider().bottom() - 22.0).abs() < 1e-3);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_position_for_inverts_shape() {
        let shape = ColliderShape::new(Vec2::new(4.0, 2.0), Vec2::new(10.0, 20.0));
        let position = shape.position_for(Vec2::new(30.0, 40.0));
        assert_eq!(shape.at(position).min(), Vec2::new(30.0, 40.0));
    }
}
