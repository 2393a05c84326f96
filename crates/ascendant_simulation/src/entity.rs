//! Common entity interface and the per-tick context
//!
//! Every simulated kind (player, patrol enemy, flying enemy, collectable)
//! implements [`PhysicsEntity`]. A tick hands each one a read-only
//! [`WorldView`] of the level and a [`SimulationContext`] carrying the few
//! shared services (audio, RNG, config) that would otherwise be globals.

use bevy::math::Vec2;
use rand_chacha::ChaCha8Rng;

use crate::audio::AudioSink;
use crate::collision::Aabb;
use crate::config::SimulationConfig;
use crate::level::LevelColliders;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Player,
    PatrolEnemy,
    FlyingEnemy,
    Collectable,
}

/// Shared services for one tick
pub struct SimulationContext<'a> {
    /// Fixed tick length (s)
    pub dt: f32,
    pub audio: &'a mut dyn AudioSink,
    pub rng: &'a mut ChaCha8Rng,
    pub level_bounds: Aabb,
    pub config: &'a SimulationConfig,
}

/// What an entity may see of the level during its step
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    pub colliders: &'a LevelColliders,
    pub player_collider: Aabb,
    /// Live player attack reach, if any
    pub player_attacks: &'a [Aabb],
    /// Enemy hitboxes the player can be hurt by
    pub damage: &'a [Aabb],
    /// Some enemy took damage from the player earlier this tick
    pub hit_occurred: bool,
    /// Cleared by hosts while e.g. a dialog owns the controls
    pub allow_movement: bool,
}

impl<'a> WorldView<'a> {
    pub fn new(colliders: &'a LevelColliders, player_collider: Aabb) -> Self {
        Self {
            colliders,
            player_collider,
            player_attacks: &[],
            damage: &[],
            hit_occurred: false,
            allow_movement: true,
        }
    }

    pub fn player_center(&self) -> Vec2 {
        self.player_collider.center()
    }
}

pub trait PhysicsEntity {
    /// What the caller learns from one step
    type Signal;

    fn kind(&self) -> EntityKind;

    fn position(&self) -> Vec2;

    fn collider(&self) -> Aabb;

    fn step(&mut self, world: &WorldView<'_>, ctx: &mut SimulationContext<'_>) -> Self::Signal;
}
