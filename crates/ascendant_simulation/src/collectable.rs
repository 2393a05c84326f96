//! Floating challenge pickup
//!
//! Bobs on a sine around its spawn point. Touching it plays the pickup clip;
//! once that finishes the step reports "collected", exactly once.

use bevy::math::Vec2;
use std::sync::Arc;

use crate::animation::{AnimationEvent, AnimationPlayer};
use crate::collision::Aabb;
use crate::config::CollectableConfig;
use crate::entity::{EntityKind, PhysicsEntity, SimulationContext, WorldView};
use crate::physics::Body;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectableState {
    Loop,
    Death,
    Dead,
}

#[derive(Debug, Clone)]
pub struct Collectable {
    config: Arc<CollectableConfig>,
    body: Body,
    anchor: Vec2,
    float_time: f32,
    state: CollectableState,
    animation: AnimationPlayer<CollectableState>,
    reported: bool,
}

impl Collectable {
    pub fn spawn(config: Arc<CollectableConfig>, spawn: Vec2) -> Self {
        let anchor = config.collider.position_for(spawn);
        Self {
            body: Body::new(anchor, config.collider),
            anchor,
            float_time: 0.0,
            state: CollectableState::Loop,
            animation: AnimationPlayer::new(CollectableState::Loop, config.clips.idle),
            reported: false,
            config,
        }
    }

    pub fn state(&self) -> CollectableState {
        self.state
    }

    pub fn frame(&self) -> u32 {
        self.animation.frame()
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn collider(&self) -> Aabb {
        self.body.collider()
    }

    /// Pickup clip playing; the level slows time and flashes the player meanwhile.
    pub fn is_dying(&self) -> bool {
        self.state == CollectableState::Death
    }

    fn on_animation_event(&mut self, event: AnimationEvent<CollectableState>) {
        match event {
            AnimationEvent::Finished(CollectableState::Death)
            | AnimationEvent::Interrupted(CollectableState::Death) => self.state = CollectableState::Dead,
            _ => {}
        }
    }
}

impl PhysicsEntity for Collectable {
    /// Collected, reported on the one tick the pickup completes
    type Signal = bool;

    fn kind(&self) -> EntityKind {
        EntityKind::Collectable
    }

    fn position(&self) -> Vec2 {
        self.body.position
    }

    fn collider(&self) -> Aabb {
        self.body.collider()
    }

    fn step(&mut self, world: &WorldView<'_>, ctx: &mut SimulationContext<'_>) -> bool {
        if self.state == CollectableState::Loop {
            self.float_time += ctx.dt;
            let bob = self.config.amplitude * (self.float_time / self.config.period).sin();
            self.body.teleport(self.anchor + Vec2::new(0.0, bob));

            if self.collider().overlaps(&world.player_collider) {
                self.state = CollectableState::Death;
                if let Some(event) = self
                    .animation
                    .play(CollectableState::Death, self.config.clips.death)
                {
                    self.on_animation_event(event);
                }
            }
        }

        if let Some(event) = self.animation.advance(ctx.dt) {
            self.on_animation_event(event);
        }

        if self.state == CollectableState::Dead && !self.reported {
            self.reported = true;
            return true;
        }
        false
    }
}
