//! Drifting flyer that charges the player
//!
//! FSM: Idle ⇄ Alert, any → Death → Dead (or → Reviving → Idle when the
//! config sets `revive_after`). The state is re-evaluated after movement,
//! from where the player stands at the end of the tick.

use bevy::math::Vec2;
use rand::Rng;
use std::sync::Arc;

use crate::animation::{AnimationEvent, AnimationPlayer};
use crate::collision::{Aabb, ContactResponse};
use crate::config::FlyingEnemyConfig;
use crate::entity::{SimulationContext, WorldView};
use crate::logger::log;
use crate::physics::Body;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlyingState {
    Idle,
    Alert,
    Death,
    /// Hidden, back at the anchor once `remaining` (s) runs out
    Reviving { remaining: f32 },
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlyingClip {
    Fly,
    Death,
}

#[derive(Debug, Clone)]
pub struct FlyingEnemy {
    config: Arc<FlyingEnemyConfig>,
    body: Body,
    state: FlyingState,
    animation: AnimationPlayer<FlyingClip>,
    /// Centre of the idle drift
    anchor: Vec2,
    /// Last seen player centre while alert
    attack_position: Vec2,
}

impl FlyingEnemy {
    pub fn spawn(config: Arc<FlyingEnemyConfig>, spawn: Vec2) -> Self {
        let position = config.collider.position_for(spawn);
        Self {
            body: Body::new(position, config.collider),
            state: FlyingState::Idle,
            animation: AnimationPlayer::new(FlyingClip::Fly, config.clips.fly),
            anchor: position,
            attack_position: Vec2::ZERO,
            config,
        }
    }

    pub fn state(&self) -> FlyingState {
        self.state
    }

    pub fn clip(&self) -> FlyingClip {
        self.animation.current()
    }

    pub fn frame(&self) -> u32 {
        self.animation.frame()
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.velocity
    }

    pub fn collider(&self) -> Aabb {
        self.body.collider()
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn facing_left(&self) -> bool {
        self.body.velocity.x < 0.0
    }

    pub fn is_dying(&self) -> bool {
        !matches!(self.state, FlyingState::Idle | FlyingState::Alert)
    }

    /// Nothing to draw while reviving or dead
    pub fn is_visible(&self) -> bool {
        matches!(self.state, FlyingState::Idle | FlyingState::Alert | FlyingState::Death)
    }

    /// The body itself is the only hitbox.
    pub fn damage_colliders(&self, out: &mut Vec<Aabb>) {
        if !self.is_dying() {
            out.push(self.collider());
        }
    }

    pub(super) fn step(&mut self, world: &WorldView<'_>, ctx: &mut SimulationContext<'_>) -> bool {
        let dt = ctx.dt;

        if let FlyingState::Reviving { remaining } = self.state {
            self.tick_revive(remaining - dt);
            return false;
        }
        if self.is_dying() {
            self.advance_animation(dt);
            return false;
        }

        let drift = self.config.drift_acceleration;
        let impulse = if drift > 0.0 {
            Vec2::new(ctx.rng.gen_range(-drift..=drift), ctx.rng.gen_range(-drift..=drift))
        } else {
            Vec2::ZERO
        };
        self.body.velocity += impulse;

        if self.state == FlyingState::Alert {
            let to_target = (self.attack_position - self.collider().center()).normalize_or_zero();
            self.body.velocity += to_target * self.config.attack_acceleration;
            self.body.velocity = self.body.velocity.clamp_length_max(self.config.max_attack_speed);
        } else {
            let offset = self.body.position - self.anchor;
            if offset.length() >= self.config.max_drift_distance {
                self.body.velocity = reflect(self.body.velocity, offset) / 2.0;
            }
            self.body.velocity = self.body.velocity.clamp_length_max(self.config.max_speed);
        }

        self.body.integrate(Vec2::ZERO, dt);

        let grown = self
            .collider()
            .inflate(self.config.damage_inflation, self.config.damage_inflation);
        let damaged = grown.overlaps_any(world.player_attacks);
        if damaged {
            self.state = FlyingState::Death;
            self.play(FlyingClip::Death);
        }

        self.body.resolve(
            &world.colliders.solid,
            dt,
            ContactResponse::Bounce {
                retain: self.config.bounce_retain,
            },
        );

        if !self.collider().overlaps(&ctx.level_bounds) {
            self.state = FlyingState::Dead;
        }

        self.observe(world.player_center());
        self.advance_animation(dt);
        damaged
    }

    fn observe(&mut self, player_center: Vec2) {
        if self.is_dying() {
            return;
        }

        if self.collider().center().distance(player_center) < self.config.alert_distance {
            self.state = FlyingState::Alert;
            self.attack_position = player_center;
        } else if self.state == FlyingState::Alert {
            // Lost the player: drift around wherever the chase ended
            self.state = FlyingState::Idle;
            self.anchor = self.body.position;
        }
    }

    fn tick_revive(&mut self, remaining: f32) {
        if remaining > 0.0 {
            self.state = FlyingState::Reviving { remaining };
            return;
        }

        log(&format!("flying enemy revived at {:?}", self.anchor));
        self.state = FlyingState::Idle;
        self.body.velocity = Vec2::ZERO;
        self.body.teleport(self.anchor);
        self.play(FlyingClip::Fly);
    }

    fn play(&mut self, clip: FlyingClip) {
        let timing = match clip {
            FlyingClip::Fly => self.config.clips.fly,
            FlyingClip::Death => self.config.clips.death,
        };
        if let Some(event) = self.animation.play(clip, timing) {
            self.on_animation_event(event);
        }
    }

    fn advance_animation(&mut self, dt: f32) {
        if let Some(event) = self.animation.advance(dt) {
            self.on_animation_event(event);
        }
    }

    fn on_animation_event(&mut self, event: AnimationEvent<FlyingClip>) {
        match event {
            AnimationEvent::Finished(FlyingClip::Death) | AnimationEvent::Interrupted(FlyingClip::Death) => {
                if self.state != FlyingState::Death {
                    return;
                }
                self.state = match self.config.revive_after {
                    Some(seconds) => FlyingState::Reviving { remaining: seconds },
                    None => FlyingState::Dead,
                };
            }
            _ => {}
        }
    }
}

/// Mirror `velocity` about the line with normal `normal`.
fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    let n = normal.normalize_or_zero();
    velocity - 2.0 * velocity.dot(n) * n
}
