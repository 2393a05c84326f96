//! Enemy AI
//!
//! Two kinds, each a small FSM driven by the player's position and its own
//! animation events:
//! - `patrol`: walks a platform, stabs when the player is close and level
//! - `flying`: drifts around an anchor, charges when the player comes near
//!
//! [`Enemy`] is the closed set the level iterates over.

pub mod flying;
pub mod patrol;

use bevy::math::Vec2;

pub use flying::{FlyingClip, FlyingEnemy, FlyingState};
pub use patrol::{PatrolClip, PatrolEnemy, PatrolState};

use crate::collision::Aabb;
use crate::entity::{EntityKind, PhysicsEntity, SimulationContext, WorldView};

#[derive(Debug, Clone)]
pub enum Enemy {
    Patrol(PatrolEnemy),
    Flying(FlyingEnemy),
}

impl Enemy {
    /// Terminal: the level drops it on its next sweep.
    pub fn is_dead(&self) -> bool {
        match self {
            Enemy::Patrol(enemy) => enemy.state() == PatrolState::Dead,
            Enemy::Flying(enemy) => enemy.state() == FlyingState::Dead,
        }
    }

    pub fn damage_colliders(&self, out: &mut Vec<Aabb>) {
        match self {
            Enemy::Patrol(enemy) => enemy.damage_colliders(out),
            Enemy::Flying(enemy) => enemy.damage_colliders(out),
        }
    }
}

impl PhysicsEntity for Enemy {
    /// Took damage from the player this tick
    type Signal = bool;

    fn kind(&self) -> EntityKind {
        match self {
            Enemy::Patrol(_) => EntityKind::PatrolEnemy,
            Enemy::Flying(_) => EntityKind::FlyingEnemy,
        }
    }

    fn position(&self) -> Vec2 {
        match self {
            Enemy::Patrol(enemy) => enemy.position(),
            Enemy::Flying(enemy) => enemy.position(),
        }
    }

    fn collider(&self) -> Aabb {
        match self {
            Enemy::Patrol(enemy) => enemy.collider(),
            Enemy::Flying(enemy) => enemy.collider(),
        }
    }

    fn step(&mut self, world: &WorldView<'_>, ctx: &mut SimulationContext<'_>) -> bool {
        match self {
            Enemy::Patrol(enemy) => enemy.step(world, ctx),
            Enemy::Flying(enemy) => enemy.step(world, ctx),
        }
    }
}
