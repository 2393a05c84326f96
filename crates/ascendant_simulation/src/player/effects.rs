//! Splash and dust requests
//!
//! The simulation only decides *when* and *where* an effect starts. Each
//! kind has a cooldown equal to its clip length so the same effect is not
//! restarted while a previous one would still be on screen.

use bevy::math::Vec2;

use super::Player;
use crate::collision::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Entering water
    BigSplash,
    /// Wading
    SmallSplash,
    /// Running dust
    ShortStop,
    /// Instant direction reversal
    HardTurn,
    /// Heavy landing, emitted as a mirrored pair
    HardLanding,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectRequest {
    pub kind: EffectKind,
    /// Top-left of the effect sprite in level space
    pub position: Vec2,
    pub flip: bool,
}

#[derive(Debug, Clone, Default)]
pub(super) struct EffectTimers {
    big_splash: f32,
    small_splash: f32,
    short_stop: f32,
    hard_turn: f32,
    hard_landing: f32,
}

impl EffectTimers {
    pub(super) fn tick(&mut self, dt: f32) {
        for timer in [
            &mut self.big_splash,
            &mut self.small_splash,
            &mut self.short_stop,
            &mut self.hard_turn,
            &mut self.hard_landing,
        ] {
            *timer = (*timer - dt).max(0.0);
        }
    }

    fn slot(&mut self, kind: EffectKind) -> &mut f32 {
        match kind {
            EffectKind::BigSplash => &mut self.big_splash,
            EffectKind::SmallSplash => &mut self.small_splash,
            EffectKind::ShortStop => &mut self.short_stop,
            EffectKind::HardTurn => &mut self.hard_turn,
            EffectKind::HardLanding => &mut self.hard_landing,
        }
    }

    pub(super) fn is_playing(&self, kind: EffectKind) -> bool {
        let remaining = match kind {
            EffectKind::BigSplash => self.big_splash,
            EffectKind::SmallSplash => self.small_splash,
            EffectKind::ShortStop => self.short_stop,
            EffectKind::HardTurn => self.hard_turn,
            EffectKind::HardLanding => self.hard_landing,
        };
        remaining > 0.0
    }
}

impl Player {
    fn effect_seconds(&self, kind: EffectKind) -> f32 {
        let effects = &self.config.effects;
        match kind {
            EffectKind::BigSplash => effects.big_splash_seconds,
            EffectKind::SmallSplash => effects.small_splash_seconds,
            EffectKind::ShortStop | EffectKind::HardTurn | EffectKind::HardLanding => effects.dust_seconds,
        }
    }

    fn start_effect(&mut self, kind: EffectKind, position: Vec2, flip: bool) {
        *self.effects.slot(kind) = self.effect_seconds(kind);
        self.pending_effects.push(EffectRequest { kind, position, flip });
    }

    /// Splash centred on the body, sitting on the water surface.
    pub(super) fn splash(&mut self, kind: EffectKind, surface: &Aabb) {
        let size = self.config.effects.splash_size;
        let position = Vec2::new(self.collider().center().x - size.x / 2.0, surface.top() - size.y);
        self.start_effect(kind, position, false);
    }

    /// Dust trailing behind the feet.
    pub(super) fn dust(&mut self, kind: EffectKind) {
        let size = self.config.effects.dust_size;
        let body = self.collider();
        let y = body.bottom() - size.y;

        if kind == EffectKind::HardLanding {
            self.start_effect(kind, Vec2::new(body.right() - size.x, y), false);
            self.start_effect(kind, Vec2::new(body.left(), y), true);
            return;
        }

        let x = if self.facing_left {
            body.right() - size.x
        } else {
            body.left()
        };
        self.start_effect(kind, Vec2::new(x, y), self.facing_left);
    }

    pub(super) fn effect_playing(&self, kind: EffectKind) -> bool {
        self.effects.is_playing(kind)
    }
}
