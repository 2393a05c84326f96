//! Player controller
//!
//! Architecture:
//! - One [`PlayerState`] at a time, held by the animation player (the clip
//!   playing *is* the state)
//! - `controller`: the per-tick physics step, returns a [`PlayerSignal`]
//! - `input`: key presses/releases, jump and attack starts, saving
//! - `transition`: level exit choreography and arrival placement
//! - `effects`: splash and dust requests for the renderer
//!
//! Clip completion feeds a transition table (see [`PlayerState::after_finish`])
//! once per tick, after physics, so nothing mutates the player from inside
//! an animation callback.

mod controller;
mod effects;
mod input;
mod transition;

use bevy::math::Vec2;
use std::sync::Arc;

use crate::animation::{AnimationClip, AnimationEvent, AnimationPlayer};
use crate::collision::Aabb;
use crate::combat::{flash_visible, AttackKind, Hearts};
use crate::config::PlayerConfig;
use crate::level::Transition;
use crate::physics::Body;

pub use effects::{EffectKind, EffectRequest};
pub use input::{Action, InputEvent, InputOutcome, KeyState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Idle,
    Walk,
    Jump,
    /// Side slash
    Attack0,
    /// Up slash
    Attack1,
    /// Down slash
    Attack2,
    Damage,
    Sit,
    Unsit,
    Death,
}

impl PlayerState {
    pub fn attack_kind(&self) -> Option<AttackKind> {
        match self {
            PlayerState::Attack0 => Some(AttackKind::Side),
            PlayerState::Attack1 => Some(AttackKind::Up),
            PlayerState::Attack2 => Some(AttackKind::Down),
            _ => None,
        }
    }

    pub fn for_attack(kind: AttackKind) -> Self {
        match kind {
            AttackKind::Side => PlayerState::Attack0,
            AttackKind::Up => PlayerState::Attack1,
            AttackKind::Down => PlayerState::Attack2,
        }
    }

    pub fn is_attack(&self) -> bool {
        self.attack_kind().is_some()
    }

    /// State entered when this state's one-shot clip runs out.
    /// `None` holds the last frame (sitting, dead).
    pub fn after_finish(&self) -> Option<PlayerState> {
        match self {
            PlayerState::Jump
            | PlayerState::Attack0
            | PlayerState::Attack1
            | PlayerState::Attack2
            | PlayerState::Damage
            | PlayerState::Unsit => Some(PlayerState::Idle),
            PlayerState::Idle | PlayerState::Walk | PlayerState::Sit | PlayerState::Death => None,
        }
    }
}

/// Outcome of one player step, for the level to act on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerSignal {
    /// Environmental death: rebuild the current level, hearts kept
    pub reset: bool,
    /// Exit countdown finished through this transition
    pub transition: Option<Transition>,
    /// Out of hearts: reload from the last save
    pub respawn: bool,
    /// Took damage from an enemy
    pub hit: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    config: Arc<PlayerConfig>,
    body: Body,
    /// Walking velocity, added on top of `body.velocity` and never cancelled by contacts
    walk_velocity: Vec2,
    animation: AnimationPlayer<PlayerState>,
    facing_left: bool,
    hearts: Hearts,
    keys: KeyState,
    /// Current swing may still land; cleared on contact until its clip ends
    can_attack: bool,
    iframes: u32,
    on_ground: bool,
    jump_grace_frames: u32,
    jump_add_time: f32,
    jumping: bool,
    in_water: bool,
    transition_frames: u32,
    transition: Option<Transition>,
    can_save: bool,
    /// Screen-flash override set by the level while a pickup plays
    highlight: bool,
    effects: effects::EffectTimers,
    pending_effects: Vec<EffectRequest>,
}

impl Player {
    /// Fresh copy of the base at `spawn` (collider top-left).
    pub fn spawn(config: Arc<PlayerConfig>, spawn: Vec2, max_hearts: u32) -> Self {
        let body = Body::new(config.collider.position_for(spawn), config.collider);
        let animation = AnimationPlayer::new(PlayerState::Idle, config.clips.idle);
        Self {
            body,
            walk_velocity: Vec2::ZERO,
            animation,
            facing_left: false,
            hearts: Hearts::full(max_hearts),
            keys: KeyState::default(),
            can_attack: true,
            iframes: 0,
            on_ground: false,
            jump_grace_frames: 0,
            jump_add_time: 0.0,
            jumping: false,
            in_water: false,
            transition_frames: 0,
            transition: None,
            can_save: false,
            highlight: false,
            effects: effects::EffectTimers::default(),
            pending_effects: Vec::new(),
            config,
        }
    }

    /// Fresh copy at `spawn` carrying over hearts and held keys.
    pub fn respawn_from(previous: &Player, spawn: Vec2) -> Self {
        let mut player = Self::spawn(previous.config.clone(), spawn, previous.hearts.max());
        player.hearts = previous.hearts;
        player.keys = previous.keys;
        player
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn state(&self) -> PlayerState {
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

    pub fn walk_velocity(&self) -> Vec2 {
        self.walk_velocity
    }

    pub fn collider(&self) -> Aabb {
        self.body.collider()
    }

    pub fn hearts(&self) -> Hearts {
        self.hearts
    }

    pub fn restore_hearts(&mut self) {
        self.hearts.restore();
    }

    /// Stand up slowly at the save point; movement stays locked until the
    /// clip ends.
    pub fn rise_at_save(&mut self) {
        let clip = self.config.clips.unsit.at_speed(self.config.respawn_unsit_speed);
        if let Some(event) = self.animation.play(PlayerState::Unsit, clip) {
            self.on_animation_event(event);
        }
    }

    pub fn keys(&self) -> KeyState {
        self.keys
    }

    pub fn facing_left(&self) -> bool {
        self.facing_left
    }

    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn is_in_water(&self) -> bool {
        self.in_water
    }

    pub fn iframes(&self) -> u32 {
        self.iframes
    }

    pub fn can_save(&self) -> bool {
        self.can_save
    }

    pub fn can_attack(&self) -> bool {
        self.can_attack
    }

    pub fn jump_grace_frames(&self) -> u32 {
        self.jump_grace_frames
    }

    pub fn transition_frames(&self) -> u32 {
        self.transition_frames
    }

    pub fn pending_transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Draw the white flash overlay this tick.
    pub fn is_flashing(&self) -> bool {
        self.highlight || flash_visible(self.iframes, self.config.iframes)
    }

    pub fn set_highlight(&mut self, on: bool) {
        self.highlight = on;
    }

    /// Death clip has played out; the level should reload now.
    pub fn is_death_finished(&self) -> bool {
        self.state() == PlayerState::Death && self.animation.is_finished()
    }

    /// Attack reach active this tick, if any.
    pub fn attack_collider(&self) -> Option<Aabb> {
        if !self.can_attack || !self.animation.is_playing() {
            return None;
        }
        let kind = self.state().attack_kind()?;
        let reach = self.config.attacks.get(kind);
        self.animation
            .in_frames(&reach.active_frames())
            .then(|| reach.rect(kind, &self.collider(), self.facing_left))
    }

    pub fn drain_effects(&mut self) -> Vec<EffectRequest> {
        std::mem::take(&mut self.pending_effects)
    }

    /// Start the death clip (respawn/reset path). No-op if already dying.
    pub fn begin_death(&mut self) {
        if self.state() != PlayerState::Death {
            self.play(PlayerState::Death);
            self.walk_velocity = Vec2::ZERO;
        }
    }

    fn clip(&self, state: PlayerState) -> AnimationClip {
        let clips = &self.config.clips;
        match state {
            PlayerState::Idle => clips.idle,
            PlayerState::Walk => clips.walk,
            PlayerState::Jump => clips.jump,
            PlayerState::Attack0 => clips.attack0,
            PlayerState::Attack1 => clips.attack1,
            PlayerState::Attack2 => clips.attack2,
            PlayerState::Damage => clips.damage,
            PlayerState::Sit => clips.sit,
            PlayerState::Unsit => clips.unsit,
            PlayerState::Death => clips.death,
        }
    }

    fn play(&mut self, state: PlayerState) {
        let clip = self.clip(state);
        if let Some(event) = self.animation.play(state, clip) {
            self.on_animation_event(event);
        }
    }

    /// Transition table keyed on clip events.
    fn on_animation_event(&mut self, event: AnimationEvent<PlayerState>) {
        match event {
            AnimationEvent::Interrupted(state) => {
                if state.is_attack() {
                    self.can_attack = true;
                }
            }
            AnimationEvent::Finished(state) => {
                if state.is_attack() {
                    self.can_attack = true;
                }
                if let Some(next) = state.after_finish() {
                    self.play(next);
                }
            }
        }
    }

    fn advance_animation(&mut self, dt: f32) {
        if let Some(event) = self.animation.advance(dt) {
            self.on_animation_event(event);
        }
    }
}
