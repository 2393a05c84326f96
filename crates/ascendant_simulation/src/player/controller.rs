//! Per-tick player physics
//!
//! One step, in order:
//! 1. Transition entry and exit countdown (input-free, limited physics)
//! 2. Water, attack recoil, iframes, walking, drag, gravity, held jump
//! 3. Integrate, floor probe, push out of solids
//! 4. Enemy damage, death colliders, out-of-hearts, save eligibility
//! 5. Effect and audio requests, then the animation clock

use bevy::math::Vec2;
use rand::Rng;

use super::{EffectKind, Player, PlayerSignal, PlayerState};
use crate::audio::{AudioCue, AudioSink};
use crate::collision::{is_on_floor, Aabb, ContactResponse};
use crate::combat::knockback_direction;
use crate::entity::{EntityKind, PhysicsEntity, SimulationContext, WorldView};
use crate::level::LevelColliders;
use crate::physics::Medium;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Landing {
    Hard,
    Soft,
}

impl Player {
    pub(crate) fn step_physics(&mut self, world: &WorldView<'_>, ctx: &mut SimulationContext<'_>) -> PlayerSignal {
        let mut signal = PlayerSignal::default();
        let dt = ctx.dt;
        let colliders = world.colliders;
        let mut hard_turn = false;

        if self.transition_frames == 0 {
            if let Some(transition) = colliders.transition_at(&self.collider()) {
                self.begin_exit(transition.clone(), &mut *ctx.audio);
            }
        }

        if self.transition_frames > 0 {
            self.transition_frames -= 1;
            if self.transition_frames == 0 {
                signal.transition = self.transition.clone();
            }
            // Horizontal exits keep falling so a jump into the edge still lands
            if self.transition.as_ref().is_some_and(|t| !t.direction.is_vertical()) {
                self.body.apply_gravity(self.config.gravity, dt);
            }
        } else {
            self.jump_grace_frames = self.jump_grace_frames.saturating_sub(1);
            self.update_water(colliders);
            self.attack_recoil(world);

            if self.iframes > 0 && self.state() != PlayerState::Death {
                self.iframes -= 1;
            }

            hard_turn = self.walk(world.allow_movement);
            self.apply_resistance(ctx);
            self.body.apply_gravity(self.config.gravity, dt);
            self.held_jump(dt);
        }

        let old_position = self.body.position;
        self.body.integrate(self.walk_velocity, dt);

        let landing = self.probe_floor(&colliders.solid);
        self.body
            .resolve(&colliders.solid, dt, ContactResponse::Inelastic { fast_movers: true });

        self.take_damage(world.damage, &mut signal);

        if self.state() != PlayerState::Death && self.collider().overlaps_any(&colliders.death) {
            self.hearts.lose_one();
            signal.reset = true;
        }

        // Out of hearts outranks an environmental reset in the same tick
        if self.hearts.is_empty() && self.state() != PlayerState::Death {
            signal.respawn = true;
            signal.reset = false;
        }

        self.can_save = self.collider().overlaps_any(&colliders.save);

        let moved = (self.body.position.x - old_position.x).abs();
        self.request_dust(moved, hard_turn, landing);

        if self.transition.is_none() {
            self.play_cues(&mut *ctx.audio, &signal, landing);
        }

        self.effects.tick(dt);
        self.advance_animation(dt);

        signal
    }

    fn update_water(&mut self, colliders: &LevelColliders) {
        let collider = self.collider();
        let Some(surface) = colliders.water.iter().find(|water| collider.overlaps(water)).copied() else {
            self.in_water = false;
            return;
        };

        if !self.in_water {
            self.splash(EffectKind::BigSplash, &surface);
        } else if !self.effect_playing(EffectKind::SmallSplash) && self.walk_velocity.x.abs() > 0.0 {
            self.splash(EffectKind::SmallSplash, &surface);
        }
        self.in_water = true;
    }

    /// Recoil after the current swing connects. A hitable surface bounces the
    /// player and takes precedence over enemy-hit knockback.
    fn attack_recoil(&mut self, world: &WorldView<'_>) {
        let bounced = self
            .attack_collider()
            .is_some_and(|reach| reach.overlaps_any(&world.colliders.hitable));
        if !bounced && !world.hit_occurred {
            return;
        }

        self.can_attack = false;
        let speed = if bounced {
            self.config.bounce_speed
        } else {
            self.config.knockback_speed
        };
        let away = if self.facing_left { 1.0 } else { -1.0 };

        match self.state() {
            PlayerState::Attack0 => {
                self.body.velocity.x = away * speed.x;
                if bounced {
                    self.body.velocity.y = -speed.y / 2.0;
                }
            }
            PlayerState::Attack1 if !self.on_ground => self.body.velocity.y = speed.y,
            PlayerState::Attack2 => self.body.velocity.y = -speed.y,
            _ => {}
        }
    }

    /// Keyboard walking. Returns whether the walk direction flipped this tick.
    fn walk(&mut self, allow_movement: bool) -> bool {
        let state = self.state();
        let locked = matches!(state, PlayerState::Sit | PlayerState::Unsit | PlayerState::Death)
            && !(self.animation.is_finished() && state != PlayerState::Sit);

        if locked || !allow_movement {
            self.walk_velocity.x = 0.0;
            if !allow_movement && (state == PlayerState::Walk || !self.animation.is_playing()) {
                self.play(PlayerState::Idle);
            }
            return false;
        }

        let speed = if self.in_water {
            self.config.water_walk_speed
        } else {
            self.config.walk_speed
        };

        let direction = match (self.keys.left, self.keys.right) {
            (false, true) => 1.0,
            (true, false) => -1.0,
            // Neither or both: stand still
            _ => {
                self.walk_velocity.x = 0.0;
                if state == PlayerState::Walk || !self.animation.is_playing() {
                    self.play(PlayerState::Idle);
                }
                return false;
            }
        };

        let hard_turn = self.walk_velocity.x * direction < 0.0;
        self.facing_left = direction < 0.0;
        self.walk_velocity.x = direction * speed;
        if state == PlayerState::Idle || !self.animation.is_playing() {
            self.play(PlayerState::Walk);
        }
        hard_turn
    }

    fn apply_resistance(&mut self, ctx: &mut SimulationContext<'_>) {
        if self.body.velocity == Vec2::ZERO {
            return;
        }

        let medium = if self.in_water {
            Medium::Water
        } else if self.on_ground {
            Medium::Floor
        } else {
            Medium::Air
        };
        self.body.apply_drag(self.config.resistance.coefficient(medium), ctx.dt);

        if self.in_water {
            // Buoyancy jitter
            let bound = self.config.gravity.y * self.config.water_jitter;
            if bound > 0.0 {
                self.body.velocity.y -= ctx.dt * ctx.rng.gen_range(0.0..bound);
            }
        }
    }

    fn held_jump(&mut self, dt: f32) {
        if (self.jumping && !self.keys.jump) || self.jump_add_time > self.config.jump_add_max_time {
            self.jumping = false;
        }
        if self.jumping {
            self.jump_add_time += dt;
            self.body.velocity.y += dt * self.config.jump_add_speed;
        }
    }

    /// Ground check ahead of resolution; refills grace frames while grounded.
    fn probe_floor(&mut self, solids: &[Aabb]) -> Option<Landing> {
        if !is_on_floor(&self.collider(), solids) {
            self.on_ground = false;
            return None;
        }

        let mut landing = None;
        if !self.on_ground {
            let vy = self.body.velocity.y;
            if vy > self.config.hard_landing_speed {
                landing = Some(Landing::Hard);
            } else if vy > self.config.soft_landing_speed {
                landing = Some(Landing::Soft);
            }
        }

        self.on_ground = true;
        self.jump_grace_frames = self.config.jump_grace_frames;
        landing
    }

    /// First overlapping enemy hitbox hurts, unless invincible or dying.
    fn take_damage(&mut self, damage: &[Aabb], signal: &mut PlayerSignal) {
        if self.iframes > 0 || self.state() == PlayerState::Death {
            return;
        }
        let Some(index) = self.collider().first_overlap(damage) else {
            return;
        };

        signal.hit = true;
        self.iframes = self.config.iframes;
        self.play(PlayerState::Damage);
        self.hearts.lose_one();

        let push = knockback_direction(&damage[index], self.collider().center());
        self.body.velocity += push * self.config.damage_knockback_speed;
    }

    fn request_dust(&mut self, moved: f32, hard_turn: bool, landing: Option<Landing>) {
        if self.on_ground && moved > 1.0 {
            if !hard_turn && !self.effect_playing(EffectKind::ShortStop) {
                self.dust(EffectKind::ShortStop);
            } else if hard_turn && !self.effect_playing(EffectKind::HardTurn) {
                self.dust(EffectKind::HardTurn);
            }
        }

        if landing == Some(Landing::Hard) && !self.effect_playing(EffectKind::HardLanding) {
            self.dust(EffectKind::HardLanding);
        }
    }

    fn play_cues(&self, audio: &mut dyn AudioSink, signal: &PlayerSignal, landing: Option<Landing>) {
        let falling = self.body.velocity.y > self.config.falling_cue_speed && !self.on_ground;
        if falling {
            if !audio.is_playing(AudioCue::Falling) {
                audio.play(AudioCue::Falling, 200);
            }
        } else {
            audio.stop(AudioCue::Falling, 100);
        }

        if self.walk_velocity.x.abs() > 0.0 && self.on_ground {
            if self.in_water {
                audio.stop(AudioCue::Run, 0);
                if !audio.is_playing(AudioCue::Swim) {
                    audio.play(AudioCue::Swim, 700);
                }
            } else {
                audio.stop(AudioCue::Swim, 400);
                if !audio.is_playing(AudioCue::Run) {
                    audio.play(AudioCue::Run, 0);
                }
            }
        } else {
            audio.stop(AudioCue::Swim, 400);
            audio.stop(AudioCue::Run, 0);
        }

        match landing {
            Some(_) if self.in_water => audio.play(AudioCue::LandSplash, 100),
            Some(Landing::Hard) => audio.play(AudioCue::LandHard, 200),
            Some(Landing::Soft) => audio.play(AudioCue::LandSoft, 200),
            None => {}
        }

        if signal.hit || signal.reset {
            audio.play(AudioCue::Damage, 200);
        }
        if signal.respawn && !audio.is_playing(AudioCue::Death) {
            audio.play(AudioCue::Death, 200);
        }
    }
}

impl PhysicsEntity for Player {
    type Signal = PlayerSignal;

    fn kind(&self) -> EntityKind {
        EntityKind::Player
    }

    fn position(&self) -> Vec2 {
        self.body.position
    }

    fn collider(&self) -> Aabb {
        self.body.collider()
    }

    fn step(&mut self, world: &WorldView<'_>, ctx: &mut SimulationContext<'_>) -> PlayerSignal {
        self.step_physics(world, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::{Action, EffectKind};
    use super::*;
    use crate::audio::AudioCommand;

    #[test]
    fn test_rests_on_floor() {
        let mut h = Harness::new();
        let colliders = flat_floor();
        let mut player = standing_player();

        for _ in 0..30 {
            let world = WorldView::new(&colliders, player.collider());
            let signal = h.step(&mut player, &world);
            assert_eq!(signal, PlayerSignal::default());
        }

        assert!(player.is_on_ground());
        assert!((player.collider().bottom() - 300.0).abs() < 1e-3);
        assert_eq!(player.jump_grace_frames(), player.config.jump_grace_frames);
    }

    #[test]
    fn test_side_attack_reach_only_in_active_frames() {
        let mut h = Harness::new();
        let mut player = standing_player();
        h.press(&mut player, Action::Attack);

        assert_eq!(player.state(), PlayerState::Attack0);
        assert_eq!(player.frame(), 0);
        assert!(player.attack_collider().is_none());

        player.animation.seek_frame(3);
        let body = player.collider();
        let reach = player.config.attacks.side;
        let expected = body
            .inflate(reach.length, reach.width)
            .translate(Vec2::new(reach.length / 2.0 + body.w / 2.0, 0.0));
        assert_eq!(player.attack_collider(), Some(expected));
        assert!(expected.left() > body.left());
    }

    #[test]
    fn test_iframes_make_damage_idempotent() {
        let mut h = Harness::new();
        let colliders = flat_floor();
        let mut player = standing_player();
        let body = player.collider();
        // Two hitboxes covering the player, well beyond any knockback distance
        let damage = [body.inflate(200.0, 200.0), body.inflate(150.0, 150.0)];

        for _ in 0..10 {
            let mut world = WorldView::new(&colliders, player.collider());
            world.damage = &damage;
            h.step(&mut player, &world);
        }

        assert_eq!(player.hearts().current(), 4);
        assert!(player.iframes() > 0);
        assert!(player.is_flashing());
    }

    #[test]
    fn test_death_collider_resets_while_hearts_remain() {
        let mut h = Harness::new();
        let mut colliders = flat_floor();
        colliders.death.push(Aabb::new(150.0, 250.0, 100.0, 60.0));

        let mut player = standing_player();
        let world = WorldView::new(&colliders, player.collider());
        let signal = h.step(&mut player, &world);

        assert!(signal.reset);
        assert!(!signal.respawn);
        assert_eq!(player.hearts().current(), 4);
        assert!(h
            .audio
            .pending()
            .contains(&AudioCommand::Play { cue: AudioCue::Damage, fade_in_ms: 200 }));
    }

    #[test]
    fn test_last_heart_respawns_instead_of_reset() {
        let mut h = Harness::new();
        let mut colliders = flat_floor();
        colliders.death.push(Aabb::new(150.0, 250.0, 100.0, 60.0));

        let mut player = standing_player();
        player.hearts.set(1);
        let world = WorldView::new(&colliders, player.collider());
        let signal = h.step(&mut player, &world);

        assert!(signal.respawn);
        assert!(!signal.reset, "never both in one tick");
        assert_eq!(player.hearts().current(), 0);

        // Once dying, nothing else is signalled
        player.begin_death();
        let world = WorldView::new(&colliders, player.collider());
        let signal = h.step(&mut player, &world);
        assert_eq!(signal, PlayerSignal::default());
        assert_eq!(player.hearts().current(), 0);
    }

    #[test]
    fn test_water_entry_splashes_once_then_wades() {
        let mut h = Harness::new();
        let mut colliders = flat_floor();
        colliders.water.push(Aabb::new(0.0, 250.0, 1000.0, 50.0));

        let mut player = standing_player();
        h.press(&mut player, Action::Right);

        let mut big = 0;
        let mut small_ticks = Vec::new();
        for tick in 0..90 {
            let world = WorldView::new(&colliders, player.collider());
            h.step(&mut player, &world);
            for effect in player.drain_effects() {
                match effect.kind {
                    EffectKind::BigSplash => big += 1,
                    EffectKind::SmallSplash => small_ticks.push(tick),
                    _ => {}
                }
            }
        }

        assert!(player.is_in_water());
        assert_eq!(big, 1);
        assert!(!small_ticks.is_empty());
        assert!(small_ticks.windows(2).all(|pair| pair[1] - pair[0] >= 24));
    }

    #[test]
    fn test_bounce_beats_enemy_knockback() {
        let mut h = Harness::new();
        let mut colliders = flat_floor();
        colliders.hitable.push(Aabb::new(230.0, 250.0, 20.0, 60.0));

        let mut player = standing_player();
        h.press(&mut player, Action::Attack);
        player.animation.seek_frame(3);

        let mut world = WorldView::new(&colliders, player.collider());
        world.hit_occurred = true;
        h.step(&mut player, &world);

        // Facing right: bounced back left at bounce speed, not knockback speed
        assert!(player.velocity().x < -350.0);
        assert!(!player.can_attack());
        assert!(player.attack_collider().is_none());
    }

    #[test]
    fn test_hard_landing_cue_and_dust() {
        let mut h = Harness::new();
        let colliders = flat_floor();
        let mut player = standing_player();
        player.body.teleport(player.config.collider.position_for(Vec2::new(200.0, 220.0)));
        player.body.velocity.y = 400.0;

        let mut dust = 0;
        for _ in 0..20 {
            let world = WorldView::new(&colliders, player.collider());
            h.step(&mut player, &world);
            dust += player
                .drain_effects()
                .iter()
                .filter(|e| e.kind == EffectKind::HardLanding)
                .count();
        }

        assert!(player.is_on_ground());
        assert_eq!(dust, 2, "one mirrored pair");
        let commands = h.audio.drain();
        assert!(commands.contains(&AudioCommand::Play { cue: AudioCue::LandHard, fade_in_ms: 200 }));
        assert!(commands.contains(&AudioCommand::Stop { cue: AudioCue::Falling, fade_out_ms: 100 }));
    }

    #[test]
    fn test_walking_plays_run_loop_once() {
        let mut h = Harness::new();
        let colliders = flat_floor();
        let mut player = standing_player();
        h.press(&mut player, Action::Right);

        for _ in 0..20 {
            let world = WorldView::new(&colliders, player.collider());
            h.step(&mut player, &world);
        }

        assert_eq!(player.state(), PlayerState::Walk);
        assert!(player.position().x > 200.0);
        let runs = h
            .audio
            .pending()
            .iter()
            .filter(|c| matches!(c, AudioCommand::Play { cue: AudioCue::Run, .. }))
            .count();
        assert_eq!(runs, 1);
    }
}
