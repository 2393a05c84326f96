//! Level aggregate
//!
//! A [`Level`] owns everything that lives in one loaded level: the static
//! [`LevelData`], the player, the enemy and collectable lists, the camera and
//! the save state carried across loads. Every entity is a fresh copy made
//! from the shared [`EntityTemplates`] on each load, reset or respawn; nothing
//! survives a reload except what the player explicitly carries (hearts, held
//! keys) and the [`SaveState`].
//!
//! The per-tick orchestration lives in `step`.

pub mod data;
mod step;

use bevy::math::Vec2;
use bevy::prelude::Event;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use data::{Direction, LevelColliders, LevelData, LevelLibrary, LevelSource, Transition};
pub use step::StepReport;

use crate::ai::{Enemy, FlyingEnemy, PatrolEnemy};
use crate::audio::{AudioCue, AudioSink};
use crate::collectable::Collectable;
use crate::collision::Aabb;
use crate::config::{EntityTemplates, SimulationConfig};
use crate::logger::log_info;
use crate::player::{InputEvent, Player};
use crate::shared::Camera;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LevelError {
    #[error("unknown level '{0}'")]
    UnknownLevel(String),

    #[error("level '{level}' has no transition #{index}")]
    UnknownTransition { level: String, index: usize },
}

/// Progress that outlives a level: where to respawn and which challenges
/// are done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveState {
    pub save_level: String,
    /// Levels whose collectable has been taken
    pub challenges: Vec<String>,
}

impl SaveState {
    pub fn new(save_level: impl Into<String>) -> Self {
        Self {
            save_level: save_level.into(),
            challenges: Vec::new(),
        }
    }

    pub fn is_completed(&self, level: &str) -> bool {
        self.challenges.iter().any(|name| name == level)
    }
}

/// What happened during a tick, for hosts (and the Bevy plugin) to react to
#[derive(Event, Debug, Clone, PartialEq)]
pub enum LevelEvent {
    /// Out of hearts: reloaded at the save level with full hearts
    Respawned { level: String },
    /// Environmental death: current level rebuilt
    Reset { level: String },
    /// Fade toward `to_level` started
    TransitionStarted { to_level: String },
    LevelLoaded { level: String },
    Hit { hearts: u32 },
    Saved { level: String },
    ChallengeCompleted { level: String },
}

/// Reload waiting on the player's death clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingReload {
    Respawn,
    Reset,
}

#[derive(Debug, Clone)]
pub struct Level {
    data: LevelData,
    templates: EntityTemplates,
    player: Player,
    enemies: Vec<Enemy>,
    collectables: Vec<Collectable>,
    save: SaveState,
    camera: Camera,
    /// Hit-stop ticks left; physics does not run meanwhile
    freeze_frames: u32,
    /// Fade ticks left before `pending_transition` loads
    fade_frames: u32,
    pending_transition: Option<Transition>,
    pending_reload: Option<PendingReload>,
    /// Controls locked by the host; input is only buffered
    movement_locked: bool,
}

impl Level {
    /// Fresh game at the library's start level.
    pub fn new_game(library: &LevelLibrary, config: &SimulationConfig) -> Result<Self, LevelError> {
        Self::load(library, &library.start, SaveState::new(library.start.clone()), config)
    }

    /// Load `name` with a full-hearts player at its spawn point.
    pub fn load(
        source: &dyn LevelSource,
        name: &str,
        save: SaveState,
        config: &SimulationConfig,
    ) -> Result<Self, LevelError> {
        let data = lookup(source, name)?;
        let templates = EntityTemplates::from_config(&config.entities);
        let player = Player::spawn(templates.player.clone(), data.player_spawn, config.player_hearts);
        let camera = Camera::new(config.camera, data.bounds());

        let mut level = Self {
            data,
            templates,
            player,
            enemies: Vec::new(),
            collectables: Vec::new(),
            save,
            camera,
            freeze_frames: 0,
            fade_frames: 0,
            pending_transition: None,
            pending_reload: None,
            movement_locked: false,
        };
        level.populate();
        level.snap_camera();

        log_info(&format!("Level '{}' loaded", level.data.name));
        Ok(level)
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn data(&self) -> &LevelData {
        &self.data
    }

    pub fn bounds(&self) -> Aabb {
        self.data.bounds()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn collectables(&self) -> &[Collectable] {
        &self.collectables
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn save(&self) -> &SaveState {
        &self.save
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_frames > 0
    }

    /// Screen fade toward the next level, 0 (clear) to 1 (black).
    pub fn fade(&self, config: &SimulationConfig) -> f32 {
        if self.fade_frames == 0 || config.transition_fade_frames == 0 {
            return 0.0;
        }
        1.0 - self.fade_frames as f32 / config.transition_fade_frames as f32
    }

    pub fn set_movement_locked(&mut self, locked: bool) {
        self.movement_locked = locked;
    }

    /// Frame without a tick (paused, spiked): keep held keys current.
    pub fn buffer_input(&mut self, inputs: &[InputEvent]) {
        self.player.handle_input_static(inputs);
    }

    /// Rebuild the current level from templates. Hearts and held keys carry over.
    pub fn reset(&mut self) {
        self.rebuild();
        self.snap_camera();
        log_info(&format!("Level '{}' reset", self.data.name));
    }

    /// Reload the save level with full hearts.
    pub fn respawn(&mut self, source: &dyn LevelSource) -> Result<(), LevelError> {
        self.data = lookup(source, &self.save.save_level)?;
        self.rebuild();
        self.player.restore_hearts();
        self.player.rise_at_save();
        self.snap_camera();
        log_info(&format!("Respawned in '{}'", self.data.name));
        Ok(())
    }

    /// Load `name` and place the carried-over player at its transition
    /// `arrival`.
    pub fn enter(&mut self, source: &dyn LevelSource, name: &str, arrival: usize) -> Result<(), LevelError> {
        let data = lookup(source, name)?;
        let transition = data
            .colliders
            .transitions
            .get(arrival)
            .cloned()
            .ok_or_else(|| LevelError::UnknownTransition {
                level: name.to_string(),
                index: arrival,
            })?;

        self.data = data;
        self.rebuild();
        self.player.arrive_via(&transition);
        self.snap_camera();
        log_info(&format!("Entered '{}' via transition #{}", self.data.name, arrival));
        Ok(())
    }

    fn rebuild(&mut self) {
        self.player = Player::respawn_from(&self.player, self.data.player_spawn);
        self.camera.set_bounds(self.data.bounds());
        self.freeze_frames = 0;
        self.pending_reload = None;
        self.populate();
    }

    fn populate(&mut self) {
        let templates = &self.templates;
        self.enemies = self
            .data
            .patrol_enemies
            .iter()
            .map(|&spawn| Enemy::Patrol(PatrolEnemy::spawn(templates.patrol.clone(), spawn)))
            .chain(
                self.data
                    .flying_enemies
                    .iter()
                    .map(|&spawn| Enemy::Flying(FlyingEnemy::spawn(templates.flying.clone(), spawn))),
            )
            .collect();

        self.collectables = if self.save.is_completed(&self.data.name) {
            Vec::new()
        } else {
            self.data
                .collectables
                .iter()
                .map(|&spawn| Collectable::spawn(templates.collectable.clone(), spawn))
                .collect()
        };
    }

    /// Player collider centre lifted by one collider height.
    fn camera_focus(&self) -> Vec2 {
        let collider = self.player.collider();
        collider.center() - Vec2::new(0.0, collider.h)
    }

    fn snap_camera(&mut self) {
        let focus = self.camera_focus();
        self.camera.snap(focus);
    }
}

fn lookup(source: &dyn LevelSource, name: &str) -> Result<LevelData, LevelError> {
    source
        .level(name)
        .cloned()
        .ok_or_else(|| LevelError::UnknownLevel(name.to_string()))
}

/// Looping cues never survive a reload.
fn silence_loops(audio: &mut dyn AudioSink) {
    for cue in [AudioCue::Run, AudioCue::Swim, AudioCue::Falling] {
        audio.stop(cue, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> LevelLibrary {
        let room = |name: &str| LevelData {
            name: name.to_string(),
            colliders: LevelColliders {
                solid: vec![Aabb::new(0.0, 250.0, 480.0, 20.0)],
                ..Default::default()
            },
            player_spawn: Vec2::new(40.0, 200.0),
            patrol_enemies: vec![Vec2::new(300.0, 200.0)],
            flying_enemies: vec![Vec2::new(200.0, 100.0)],
            collectables: vec![Vec2::new(100.0, 150.0)],
            ..Default::default()
        };
        LevelLibrary {
            start: "a".to_string(),
            levels: vec![room("a"), room("b")],
        }
    }

    #[test]
    fn test_new_game_spawns_from_templates() {
        let config = SimulationConfig::default();
        let level = Level::new_game(&library(), &config).expect("start level exists");

        assert_eq!(level.name(), "a");
        assert_eq!(level.save().save_level, "a");
        assert_eq!(level.enemies().len(), 2);
        assert_eq!(level.collectables().len(), 1);
        assert_eq!(level.player().hearts().current(), config.player_hearts);
        assert!(level.player().collider().min().abs_diff_eq(Vec2::new(40.0, 200.0), 1e-4));
    }

    #[test]
    fn test_completed_challenge_skips_collectables() {
        let mut save = SaveState::new("a");
        save.challenges.push("b".to_string());
        let level = Level::load(&library(), "b", save, &SimulationConfig::default()).expect("level b exists");

        assert!(level.collectables().is_empty());
        assert_eq!(level.enemies().len(), 2);
    }

    #[test]
    fn test_unknown_level_and_transition() {
        let config = SimulationConfig::default();
        let err = Level::load(&library(), "nowhere", SaveState::new("a"), &config).unwrap_err();
        assert_eq!(err, LevelError::UnknownLevel("nowhere".to_string()));

        let mut level = Level::new_game(&library(), &config).expect("start level exists");
        let err = level.enter(&library(), "b", 2).unwrap_err();
        assert_eq!(
            err,
            LevelError::UnknownTransition {
                level: "b".to_string(),
                index: 2
            }
        );
        assert_eq!(level.name(), "a", "failed load leaves the level untouched");
    }

    #[test]
    fn test_camera_snaps_inside_bounds() {
        let level = Level::new_game(&library(), &SimulationConfig::default()).expect("start level exists");
        let view = level.camera().view_rect();
        let bounds = level.bounds();

        assert!(view.left() >= bounds.left() && view.top() >= bounds.top());
        assert!(view.right() <= bounds.right() + 1e-3 && view.bottom() <= bounds.bottom() + 1e-3);
    }

    #[test]
    fn test_save_state_ron() {
        let save = SaveState {
            save_level: "a".to_string(),
            challenges: vec!["b".to_string()],
        };
        let text = ron::to_string(&save).expect("save state serializes");
        let back: SaveState = ron::from_str(&text).expect("save state parses");
        assert_eq!(back, save);
        assert!(back.is_completed("b"));
    }
}
