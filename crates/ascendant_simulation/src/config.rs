//! Tunables for the simulation and every entity type
//!
//! Every struct has a `Default` carrying the shipped values, and every field
//! is `#[serde(default)]`, so a RON file only needs to list what it changes.
//! [`EntityTemplates`] freezes the entity configs behind `Arc`s: those are
//! the read-only "base" objects every spawned entity is cloned from.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::animation::AnimationClip;
use crate::combat::AttackSet;
use crate::physics::{ColliderShape, Resistance};
use crate::shared::CameraConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse RON: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub(crate) fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn check(condition: bool, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Invalid(message()))
    }
}

fn check_shape(name: &str, shape: &ColliderShape) -> Result<(), ConfigError> {
    check(shape.size.x > 0.0 && shape.size.y > 0.0, || {
        format!("{} collider size must be positive, got {:?}", name, shape.size)
    })
}

fn check_clip(name: &str, clip: &AnimationClip) -> Result<(), ConfigError> {
    check(clip.is_valid(), || {
        format!("clip {} needs at least one frame and a positive length", name)
    })
}

/// Simulation-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Physics tick rate (Hz)
    pub tick_hz: f32,
    /// Render deltas above this (s) are treated as a stall: no tick that frame
    pub frame_spike_threshold: f32,
    /// Fade length between leaving a level and loading the next (ticks)
    pub transition_fade_frames: u32,
    pub player_hearts: u32,
    /// Hit-stop after the player damages an enemy (ticks)
    pub enemy_hit_freeze_frames: u32,
    /// Hit-stop after the player takes damage (ticks)
    pub player_hit_freeze_frames: u32,
    /// Hit-stop per tick while a collectable plays its pickup (ticks)
    pub collect_freeze_frames: u32,
    pub camera: CameraConfig,
    pub entities: EntityConfigs,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            frame_spike_threshold: 0.25,
            transition_fade_frames: 30,
            player_hearts: 5,
            enemy_hit_freeze_frames: 3,
            player_hit_freeze_frames: 8,
            collect_freeze_frames: 3,
            camera: CameraConfig::default(),
            entities: EntityConfigs::default(),
        }
    }
}

impl SimulationConfig {
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_hz
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_ron_str(&read_file(path.as_ref())?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.tick_hz > 0.0, || format!("tick_hz must be positive, got {}", self.tick_hz))?;
        check(self.player_hearts > 0, || "player_hearts must be at least 1".to_string())?;
        self.entities.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfigs {
    pub player: PlayerConfig,
    pub patrol: PatrolEnemyConfig,
    pub flying: FlyingEnemyConfig,
    pub collectable: CollectableConfig,
}

impl EntityConfigs {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let player = &self.player;
        check_shape("player", &player.collider)?;
        check(player.iframes > 0, || "player iframes must be at least 1".to_string())?;
        check(player.respawn_unsit_speed > 0.0, || {
            format!("respawn_unsit_speed must be positive, got {}", player.respawn_unsit_speed)
        })?;
        for (name, clip) in player.clips.named() {
            check_clip(name, clip)?;
        }

        check_shape("patrol", &self.patrol.collider)?;
        check(self.patrol.weapon_size.x > 0.0 && self.patrol.weapon_size.y > 0.0, || {
            "patrol weapon size must be positive".to_string()
        })?;
        for (name, clip) in self.patrol.clips.named() {
            check_clip(name, clip)?;
        }

        check_shape("flying", &self.flying.collider)?;
        check_clip("flying.fly", &self.flying.clips.fly)?;
        check_clip("flying.death", &self.flying.clips.death)?;

        check_shape("collectable", &self.collectable.collider)?;
        check(self.collectable.period > 0.0, || "collectable period must be positive".to_string())?;
        check_clip("collectable.idle", &self.collectable.clips.idle)?;
        check_clip("collectable.death", &self.collectable.clips.death)
    }
}

// ============================================================================
// Player
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub collider: ColliderShape,
    /// Gravitational acceleration (px/s²)
    pub gravity: Vec2,
    pub walk_speed: f32,
    pub water_walk_speed: f32,
    /// Instant vertical velocity on jump (negative = up)
    pub jump_speed: f32,
    /// Extra vertical acceleration while jump is held (px/s²)
    pub jump_add_speed: f32,
    /// Longest the held-jump boost may last (s)
    pub jump_add_max_time: f32,
    /// Ticks after leaving a ledge during which jumping is still allowed
    pub jump_grace_frames: u32,
    /// Recoil after an attack connects with an enemy
    pub knockback_speed: Vec2,
    /// Recoil after an attack connects with a hitable surface
    pub bounce_speed: Vec2,
    /// Speed added away from whatever damaged the player
    pub damage_knockback_speed: f32,
    pub attacks: AttackSet,
    /// Invincibility after a hit (ticks)
    pub iframes: u32,
    /// Length of the exit/arrival choreography (ticks)
    pub transition_frames: u32,
    pub resistance: Resistance,
    /// Upper bound of the random upward push in water, as a multiple of gravity
    pub water_jitter: f32,
    pub hard_landing_speed: f32,
    pub soft_landing_speed: f32,
    pub falling_cue_speed: f32,
    /// Side attacks before this frame can still turn into a down attack
    pub late_down_slash_frames: u32,
    /// Playback speed of the stand-up clip after a respawn
    pub respawn_unsit_speed: f32,
    pub effects: EffectConfig,
    pub clips: PlayerClips,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            collider: ColliderShape::new(Vec2::new(49.875, 52.5), Vec2::new(12.25, 29.75)),
            gravity: Vec2::new(0.0, 1500.0),
            walk_speed: 150.0,
            water_walk_speed: 120.0,
            jump_speed: -300.0,
            jump_add_speed: -1200.0,
            jump_add_max_time: 0.3,
            jump_grace_frames: 4,
            knockback_speed: Vec2::new(200.0, 500.0),
            bounce_speed: Vec2::new(400.0, 530.0),
            damage_knockback_speed: 100.0,
            attacks: AttackSet::default(),
            iframes: 90,
            transition_frames: 30,
            resistance: Resistance::default(),
            water_jitter: 1.5,
            hard_landing_speed: 200.0,
            soft_landing_speed: 10.0,
            falling_cue_speed: 100.0,
            late_down_slash_frames: 4,
            respawn_unsit_speed: 0.5,
            effects: EffectConfig::default(),
            clips: PlayerClips::default(),
        }
    }
}

/// Size and lifetime of the player's one-shot effects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub splash_size: Vec2,
    pub big_splash_seconds: f32,
    pub small_splash_seconds: f32,
    pub dust_size: Vec2,
    pub dust_seconds: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            splash_size: Vec2::new(24.0, 16.0),
            big_splash_seconds: 0.5,
            small_splash_seconds: 0.4,
            dust_size: Vec2::new(16.0, 8.0),
            dust_seconds: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerClips {
    pub idle: AnimationClip,
    pub walk: AnimationClip,
    pub jump: AnimationClip,
    pub attack0: AnimationClip,
    pub attack1: AnimationClip,
    pub attack2: AnimationClip,
    pub damage: AnimationClip,
    pub sit: AnimationClip,
    pub unsit: AnimationClip,
    pub death: AnimationClip,
}

impl Default for PlayerClips {
    fn default() -> Self {
        Self {
            idle: AnimationClip::looped(8, 0.8),
            walk: AnimationClip::looped(8, 0.6),
            jump: AnimationClip::once(6, 0.4),
            attack0: AnimationClip::once(8, 0.35),
            attack1: AnimationClip::once(8, 0.35),
            attack2: AnimationClip::once(8, 0.35),
            damage: AnimationClip::once(4, 0.3),
            sit: AnimationClip::once(6, 0.5),
            unsit: AnimationClip::once(6, 0.5),
            death: AnimationClip::once(10, 1.0),
        }
    }
}

impl PlayerClips {
    fn named(&self) -> [(&'static str, &AnimationClip); 10] {
        [
            ("player.idle", &self.idle),
            ("player.walk", &self.walk),
            ("player.jump", &self.jump),
            ("player.attack0", &self.attack0),
            ("player.attack1", &self.attack1),
            ("player.attack2", &self.attack2),
            ("player.damage", &self.damage),
            ("player.sit", &self.sit),
            ("player.unsit", &self.unsit),
            ("player.death", &self.death),
        ]
    }
}

// ============================================================================
// Enemies
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolEnemyConfig {
    pub collider: ColliderShape,
    /// Spear hitbox, placed flush against the body on the facing side
    pub weapon_size: Vec2,
    /// Vertical offset of the weapon from the body position
    pub weapon_offset_y: f32,
    pub weapon_first_frame: u32,
    pub weapon_last_frame: u32,
    pub gravity: Vec2,
    pub walk_speed: f32,
    pub alert_distance: f32,
    pub attack_distance: f32,
    /// Turn around when a floor's horizontal push-out is shorter than this
    pub platform_edge_distance: f32,
    /// Cooldown between stabs (s)
    pub attack_gap: f32,
    pub clips: PatrolClips,
}

impl Default for PatrolEnemyConfig {
    fn default() -> Self {
        let weapon_size = Vec2::new(35.0, 29.75);
        Self {
            collider: ColliderShape::new(Vec2::new(49.875, 52.5), Vec2::new(12.25, 29.75)),
            weapon_size,
            weapon_offset_y: 52.5,
            weapon_first_frame: 2,
            weapon_last_frame: 5,
            gravity: Vec2::new(0.0, 1600.0),
            walk_speed: 50.0,
            alert_distance: 110.0,
            attack_distance: weapon_size.x + 10.0,
            platform_edge_distance: 20.0,
            attack_gap: 0.5,
            clips: PatrolClips::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolClips {
    pub walk: AnimationClip,
    pub idle: AnimationClip,
    /// Spear lowered when the player is first spotted
    pub ready: AnimationClip,
    pub stab: AnimationClip,
    pub death: AnimationClip,
}

impl Default for PatrolClips {
    fn default() -> Self {
        Self {
            walk: AnimationClip::looped(8, 0.8),
            idle: AnimationClip::looped(4, 0.6),
            ready: AnimationClip::once(4, 0.25),
            stab: AnimationClip::once(8, 0.6),
            death: AnimationClip::once(6, 0.5),
        }
    }
}

impl PatrolClips {
    fn named(&self) -> [(&'static str, &AnimationClip); 5] {
        [
            ("patrol.walk", &self.walk),
            ("patrol.idle", &self.idle),
            ("patrol.ready", &self.ready),
            ("patrol.stab", &self.stab),
            ("patrol.death", &self.death),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyingEnemyConfig {
    pub collider: ColliderShape,
    /// Bound of the random per-tick impulse on each axis (px/s)
    pub drift_acceleration: f32,
    /// Per-tick impulse toward the target while alert (px/s)
    pub attack_acceleration: f32,
    pub max_speed: f32,
    pub max_attack_speed: f32,
    /// Radius around the anchor the idle drift stays within
    pub max_drift_distance: f32,
    pub alert_distance: f32,
    /// Attacks are tested against the collider grown by this much
    pub damage_inflation: f32,
    /// Wall bounce keeps this fraction of speed
    pub bounce_retain: f32,
    /// When set, a killed enemy comes back after this many seconds
    pub revive_after: Option<f32>,
    pub clips: FlyingClips,
}

impl Default for FlyingEnemyConfig {
    fn default() -> Self {
        Self {
            collider: ColliderShape::new(Vec2::new(43.75, 43.75), Vec2::new(21.0, 21.0)),
            drift_acceleration: 3.0,
            attack_acceleration: 7.0,
            max_speed: 200.0,
            max_attack_speed: 500.0,
            max_drift_distance: 15.0,
            alert_distance: 120.0,
            damage_inflation: 1.2,
            bounce_retain: 0.5,
            revive_after: None,
            clips: FlyingClips::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyingClips {
    pub fly: AnimationClip,
    pub death: AnimationClip,
}

impl Default for FlyingClips {
    fn default() -> Self {
        Self {
            fly: AnimationClip::looped(4, 0.4),
            death: AnimationClip::once(6, 0.5),
        }
    }
}

// ============================================================================
// Collectable
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectableConfig {
    pub collider: ColliderShape,
    /// Bob amplitude (px)
    pub amplitude: f32,
    /// Bob time constant (s), position = anchor + amplitude·sin(t/period)
    pub period: f32,
    pub clips: CollectableClips,
}

impl Default for CollectableConfig {
    fn default() -> Self {
        Self {
            collider: ColliderShape::new(Vec2::new(17.6, 17.6), Vec2::new(16.0, 16.0)),
            amplitude: 5.0,
            period: 0.7,
            clips: CollectableClips::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectableClips {
    pub idle: AnimationClip,
    pub death: AnimationClip,
}

impl Default for CollectableClips {
    fn default() -> Self {
        Self {
            idle: AnimationClip::looped(6, 0.6),
            death: AnimationClip::once(6, 0.4),
        }
    }
}

// ============================================================================
// Templates
// ============================================================================

/// Immutable per-type bases shared by every spawned copy
#[derive(Debug, Clone)]
pub struct EntityTemplates {
    pub player: Arc<PlayerConfig>,
    pub patrol: Arc<PatrolEnemyConfig>,
    pub flying: Arc<FlyingEnemyConfig>,
    pub collectable: Arc<CollectableConfig>,
}

impl EntityTemplates {
    pub fn from_config(config: &EntityConfigs) -> Self {
        Self {
            player: Arc::new(config.player.clone()),
            patrol: Arc::new(config.patrol.clone()),
            flying: Arc::new(config.flying.clone()),
            collectable: Arc::new(config.collectable.clone()),
        }
    }
}

impl Default for EntityTemplates {
    fn default() -> Self {
        Self::from_config(&EntityConfigs::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_overrides_only_named_fields() {
        let config = SimulationConfig::from_ron_str(
            "(player_hearts: 3, entities: (patrol: (alert_distance: 90.0, attack_distance: 75.0)))",
        )
        .expect("partial config should parse");

        assert_eq!(config.player_hearts, 3);
        assert_eq!(config.entities.patrol.alert_distance, 90.0);
        assert_eq!(config.entities.patrol.attack_distance, 75.0);
        assert_eq!(config.entities.patrol.walk_speed, 50.0);
        assert_eq!(config.tick_hz, 60.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SimulationConfig::from_ron_str("(tick_hz: 0.0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err =
            SimulationConfig::from_ron_str("(entities: (player: (respawn_unsit_speed: 0.0)))").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SimulationConfig::from_ron_str("(player_hearts: \"five\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SimulationConfig::from_file("/nonexistent/ascendant.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_templates_share_one_base() {
        let templates = EntityTemplates::default();
        let copy = templates.clone();
        assert!(Arc::ptr_eq(&templates.player, &copy.player));
    }
}
