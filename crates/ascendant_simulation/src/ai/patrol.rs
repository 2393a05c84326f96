//! Spear-carrying ground patrol
//!
//! FSM: Patrol → Alert → Attack → Wait → Alert, any → Death → Dead
//!
//! - Patrol: walks, turns around at platform edges
//! - Alert: stands facing the player, spear lowered
//! - Attack: one stab, the spear hitbox is live for a frame window
//! - Wait: cooldown after a stab before the next can start

use bevy::math::Vec2;
use std::sync::Arc;

use crate::animation::{AnimationClip, AnimationEvent, AnimationPlayer};
use crate::collision::{Aabb, ContactResponse};
use crate::config::PatrolEnemyConfig;
use crate::entity::{SimulationContext, WorldView};
use crate::physics::Body;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatrolState {
    Patrol,
    Alert,
    Attack,
    Wait,
    Death,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatrolClip {
    Walk,
    Idle,
    Ready,
    Stab,
    Death,
}

#[derive(Debug, Clone)]
pub struct PatrolEnemy {
    config: Arc<PatrolEnemyConfig>,
    body: Body,
    state: PatrolState,
    animation: AnimationPlayer<PatrolClip>,
    facing_left: bool,
    /// Time since the last stab ended; the cooldown is over once it reaches `attack_gap`
    attack_gap_time: f32,
}

impl PatrolEnemy {
    /// Fresh copy of the base with its collider's top-left at `spawn`.
    pub fn spawn(config: Arc<PatrolEnemyConfig>, spawn: Vec2) -> Self {
        let body = Body::new(config.collider.position_for(spawn), config.collider);
        Self {
            animation: AnimationPlayer::new(PatrolClip::Walk, config.clips.walk),
            attack_gap_time: config.attack_gap,
            body,
            state: PatrolState::Patrol,
            facing_left: false,
            config,
        }
    }

    pub fn state(&self) -> PatrolState {
        self.state
    }

    pub fn clip(&self) -> PatrolClip {
        self.animation.current()
    }

    pub fn frame(&self) -> u32 {
        self.animation.frame()
    }

    pub fn facing_left(&self) -> bool {
        self.facing_left
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

    pub fn is_dying(&self) -> bool {
        matches!(self.state, PatrolState::Death | PatrolState::Dead)
    }

    /// Spear hitbox, flush against the body on the facing side.
    pub fn weapon_collider(&self) -> Aabb {
        let body = self.collider();
        let size = self.config.weapon_size;
        let x = if self.facing_left {
            body.left() - size.x
        } else {
            body.right()
        };
        Aabb::new(x, self.body.position.y + self.config.weapon_offset_y, size.x, size.y)
    }

    fn weapon_live(&self) -> bool {
        self.state == PatrolState::Attack
            && self
                .animation
                .in_frames(&(self.config.weapon_first_frame..=self.config.weapon_last_frame))
    }

    /// Hitboxes that hurt the player this tick.
    pub fn damage_colliders(&self, out: &mut Vec<Aabb>) {
        if !self.is_dying() {
            out.push(self.collider());
        }
        if self.weapon_live() {
            out.push(self.weapon_collider());
        }
    }

    /// React to the player's position. Attacks, cooldowns and death run to
    /// completion before the enemy looks again.
    pub fn observe(&mut self, player_center: Vec2) {
        if matches!(
            self.state,
            PatrolState::Attack | PatrolState::Wait | PatrolState::Death | PatrolState::Dead
        ) {
            return;
        }

        let center = self.collider().center();
        let distance = player_center.distance(center);

        if distance < self.config.alert_distance {
            if self.state != PatrolState::Alert {
                self.state = PatrolState::Alert;
                self.play(PatrolClip::Ready);
            } else if distance < self.config.attack_distance && self.is_level_with(player_center) {
                self.state = PatrolState::Attack;
                self.play(PatrolClip::Stab);
            }
        } else if self.state == PatrolState::Alert {
            self.state = PatrolState::Patrol;
            self.play(PatrolClip::Walk);
        }
    }

    /// Player centre between this body's centre and one body height below it,
    /// so the spear never reaches through a floor.
    fn is_level_with(&self, player_center: Vec2) -> bool {
        let center_y = self.collider().center().y;
        player_center.y >= center_y && player_center.y <= center_y + self.config.collider.size.y
    }

    pub(super) fn step(&mut self, world: &WorldView<'_>, ctx: &mut SimulationContext<'_>) -> bool {
        if self.is_dying() {
            self.advance_animation(ctx.dt);
            return false;
        }

        let dt = ctx.dt;
        self.observe(world.player_center());
        self.tick_cooldown(dt);

        if self.state == PatrolState::Patrol {
            self.body.velocity.x = if self.facing_left {
                -self.config.walk_speed
            } else {
                self.config.walk_speed
            };
        } else {
            self.body.velocity.x = 0.0;
            if self.animation.is(PatrolClip::Walk) {
                self.play(PatrolClip::Idle);
            }
            if self.state != PatrolState::Attack {
                self.facing_left = world.player_center().x < self.collider().center().x;
            }
        }

        self.body.apply_gravity(self.config.gravity, dt);
        self.body.integrate(Vec2::ZERO, dt);

        let damaged = self.collider().overlaps_any(world.player_attacks);
        if damaged {
            self.state = PatrolState::Death;
            self.play(PatrolClip::Death);
        }

        let sweep = self
            .body
            .resolve(&world.colliders.solid, dt, ContactResponse::Inelastic { fast_movers: false });
        for contact in &sweep.contacts {
            // Close to a floor's end: turn back toward the middle
            if contact.push.x.abs() < self.config.platform_edge_distance {
                self.facing_left = contact.push.x > 0.0;
            }
        }

        if !self.collider().overlaps(&ctx.level_bounds) {
            self.state = PatrolState::Dead;
        }

        self.advance_animation(dt);
        damaged
    }

    fn tick_cooldown(&mut self, dt: f32) {
        if self.attack_gap_time < self.config.attack_gap {
            self.attack_gap_time += dt;
            if self.attack_gap_time >= self.config.attack_gap && self.state == PatrolState::Wait {
                self.state = PatrolState::Alert;
            }
        }
    }

    fn clip_for(&self, clip: PatrolClip) -> AnimationClip {
        let clips = &self.config.clips;
        match clip {
            PatrolClip::Walk => clips.walk,
            PatrolClip::Idle => clips.idle,
            PatrolClip::Ready => clips.ready,
            PatrolClip::Stab => clips.stab,
            PatrolClip::Death => clips.death,
        }
    }

    fn play(&mut self, clip: PatrolClip) {
        let timing = self.clip_for(clip);
        if let Some(event) = self.animation.play(clip, timing) {
            self.on_animation_event(event);
        }
    }

    fn advance_animation(&mut self, dt: f32) {
        if let Some(event) = self.animation.advance(dt) {
            self.on_animation_event(event);
        }
    }

    fn on_animation_event(&mut self, event: AnimationEvent<PatrolClip>) {
        match event {
            AnimationEvent::Finished(PatrolClip::Stab) => {
                if self.state == PatrolState::Attack {
                    self.state = PatrolState::Wait;
                }
                self.attack_gap_time = 0.0;
            }
            AnimationEvent::Finished(PatrolClip::Death) | AnimationEvent::Interrupted(PatrolClip::Death) => {
                self.state = PatrolState::Dead;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioQueue;
    use crate::config::SimulationConfig;
    use crate::level::LevelColliders;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const DT: f32 = 1.0 / 60.0;

    struct Rig {
        colliders: LevelColliders,
        audio: AudioQueue,
        rng: ChaCha8Rng,
        config: SimulationConfig,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                colliders: LevelColliders {
                    solid: vec![Aabb::new(0.0, 300.0, 1000.0, 40.0)],
                    ..Default::default()
                },
                audio: AudioQueue::default(),
                rng: ChaCha8Rng::seed_from_u64(3),
                config: SimulationConfig::default(),
            }
        }

        fn step(&mut self, enemy: &mut PatrolEnemy, player: Aabb, attacks: &[Aabb]) -> bool {
            let mut world = WorldView::new(&self.colliders, player);
            world.player_attacks = attacks;
            let mut ctx = SimulationContext {
                dt: DT,
                audio: &mut self.audio,
                rng: &mut self.rng,
                level_bounds: Aabb::new(0.0, 0.0, 1000.0, 400.0),
                config: &self.config,
            };
            enemy.step(&world, &mut ctx)
        }
    }

    fn config(alert: f32, attack: f32) -> Arc<PatrolEnemyConfig> {
        Arc::new(PatrolEnemyConfig {
            alert_distance: alert,
            attack_distance: attack,
            walk_speed: 0.0,
            ..Default::default()
        })
    }

    fn enemy_on_floor(config: Arc<PatrolEnemyConfig>, x: f32) -> PatrolEnemy {
        let y = 300.0 - config.collider.size.y;
        PatrolEnemy::spawn(config, Vec2::new(x, y))
    }

    /// Player collider whose centre sits `dx` to the right of the enemy's, level with it.
    fn player_at(enemy: &PatrolEnemy, dx: f32) -> Aabb {
        let center = enemy.collider().center() + Vec2::new(dx, 0.0);
        Aabb::new(center.x - 6.0, center.y - 10.0, 12.0, 20.0)
    }

    #[test]
    fn test_alert_then_attack_on_distinct_ticks() {
        let mut rig = Rig::new();
        let mut enemy = enemy_on_floor(config(90.0, 75.0), 400.0);

        let mut alert_tick = None;
        let mut attack_tick = None;
        for (tick, distance) in (0..).zip((0..).map(|i| 200.0 - 10.0 * i as f32).take_while(|d| *d > 20.0)) {
            let player = player_at(&enemy, distance);
            rig.step(&mut enemy, player, &[]);
            match enemy.state() {
                PatrolState::Alert if alert_tick.is_none() => {
                    alert_tick = Some(tick);
                    assert!(distance < 90.0);
                }
                PatrolState::Attack if attack_tick.is_none() => {
                    attack_tick = Some(tick);
                    assert!(distance < 75.0);
                }
                _ => {}
            }
        }

        let (alert, attack) = (alert_tick.expect("went alert"), attack_tick.expect("attacked"));
        assert!(attack > alert, "alert and attack must happen on different ticks");
    }

    #[test]
    fn test_no_attack_through_floor() {
        let mut rig = Rig::new();
        let mut enemy = enemy_on_floor(config(90.0, 75.0), 400.0);

        // Player directly above: in range but not level
        let above = enemy.collider().translate(Vec2::new(10.0, -40.0));
        for _ in 0..10 {
            rig.step(&mut enemy, above, &[]);
        }
        assert_eq!(enemy.state(), PatrolState::Alert);
    }

    #[test]
    fn test_stab_then_cooldown_then_alert() {
        let mut rig = Rig::new();
        let mut enemy = enemy_on_floor(config(90.0, 75.0), 400.0);
        let player = player_at(&enemy, 30.0);

        rig.step(&mut enemy, player, &[]);
        rig.step(&mut enemy, player, &[]);
        assert_eq!(enemy.state(), PatrolState::Attack);
        assert!(!enemy.facing_left());

        let mut saw_weapon = false;
        let mut saw_wait = false;
        let mut stabbed_again = false;
        for _ in 0..120 {
            rig.step(&mut enemy, player, &[]);
            let mut hitboxes = Vec::new();
            enemy.damage_colliders(&mut hitboxes);
            if hitboxes.len() == 2 {
                saw_weapon = true;
                assert_eq!(hitboxes[1].left(), enemy.collider().right());
            }
            saw_wait |= enemy.state() == PatrolState::Wait;
            stabbed_again |= saw_wait && enemy.state() == PatrolState::Attack;
        }

        assert!(saw_weapon);
        assert!(saw_wait);
        assert!(stabbed_again, "cooldown ends and the player is still in reach");
    }

    #[test]
    fn test_struck_enemy_dies_then_is_dead() {
        let mut rig = Rig::new();
        let mut enemy = enemy_on_floor(config(90.0, 75.0), 400.0);
        let far = player_at(&enemy, 300.0);
        let strike = [enemy.collider().inflate(4.0, 4.0)];

        assert!(rig.step(&mut enemy, far, &strike));
        assert_eq!(enemy.state(), PatrolState::Death);

        // Dying never reports a second hit, and stops hurting the player
        let mut hitboxes = Vec::new();
        enemy.damage_colliders(&mut hitboxes);
        assert!(hitboxes.is_empty());

        let mut again = false;
        for _ in 0..60 {
            again |= rig.step(&mut enemy, far, &strike);
        }
        assert!(!again);
        assert_eq!(enemy.state(), PatrolState::Dead);
    }

    #[test]
    fn test_turns_at_platform_edge() {
        let mut rig = Rig::new();
        rig.colliders.solid = vec![Aabb::new(100.0, 300.0, 200.0, 40.0)];
        let config = Arc::new(PatrolEnemyConfig::default());
        let mut enemy = enemy_on_floor(config, 200.0);
        let far = Aabb::new(900.0, 0.0, 12.0, 20.0);

        let mut turned = false;
        for _ in 0..600 {
            rig.step(&mut enemy, far, &[]);
            turned |= enemy.facing_left();
        }

        assert!(turned);
        assert!(enemy.collider().left() >= 100.0 && enemy.collider().right() <= 300.0);
        assert_eq!(enemy.state(), PatrolState::Patrol);
    }

    #[test]
    fn test_falling_out_of_level_is_dead() {
        let mut rig = Rig::new();
        rig.colliders.solid.clear();
        let mut enemy = enemy_on_floor(Arc::new(PatrolEnemyConfig::default()), 400.0);
        let far = Aabb::new(900.0, 0.0, 12.0, 20.0);

        for _ in 0..120 {
            rig.step(&mut enemy, far, &[]);
        }
        assert_eq!(enemy.state(), PatrolState::Dead);
    }
}
