//! Static level description: categorised colliders, transitions, spawns
//!
//! This is everything the simulation reads from a level file. The library
//! type loads a whole set of levels from RON and checks that every
//! transition lands somewhere real.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::collision::Aabb;
use crate::config::{read_file, ConfigError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    E,
    S,
    W,
}

impl Direction {
    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::N | Direction::S)
    }
}

/// Edge-of-level trigger leading into another level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub collider: Aabb,
    pub to_level: String,
    /// Index into the destination level's transitions, where the player arrives
    pub to_transition: usize,
    pub direction: Direction,
}

/// Static rectangles by category. Any list may be empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelColliders {
    pub solid: Vec<Aabb>,
    pub death: Vec<Aabb>,
    pub hitable: Vec<Aabb>,
    pub save: Vec<Aabb>,
    pub water: Vec<Aabb>,
    pub transitions: Vec<Transition>,
}

impl LevelColliders {
    pub fn transition_at(&self, collider: &Aabb) -> Option<&Transition> {
        self.transitions.iter().find(|t| collider.overlaps(&t.collider))
    }

    fn all_rects(&self) -> impl Iterator<Item = &Aabb> {
        self.solid
            .iter()
            .chain(&self.death)
            .chain(&self.hitable)
            .chain(&self.save)
            .chain(&self.water)
            .chain(self.transitions.iter().map(|t| &t.collider))
    }
}

/// One level. Spawn points are collider top-left corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelData {
    pub name: String,
    /// Level extent from the origin (px), bounds the camera
    pub size: Vec2,
    pub colliders: LevelColliders,
    pub player_spawn: Vec2,
    pub patrol_enemies: Vec<Vec2>,
    pub flying_enemies: Vec<Vec2>,
    pub collectables: Vec<Vec2>,
}

impl Default for LevelData {
    fn default() -> Self {
        Self {
            name: String::new(),
            size: Vec2::new(480.0, 270.0),
            colliders: LevelColliders::default(),
            player_spawn: Vec2::ZERO,
            patrol_enemies: Vec::new(),
            flying_enemies: Vec::new(),
            collectables: Vec::new(),
        }
    }
}

impl LevelData {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_min_size(Vec2::ZERO, self.size)
    }
}

/// Read access to levels by name
pub trait LevelSource {
    fn level(&self, name: &str) -> Option<&LevelData>;
}

const DEMO_LEVELS: &str = include_str!("../../assets/demo_levels.ron");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelLibrary {
    /// Level a fresh game starts (and first saves) in
    pub start: String,
    pub levels: Vec<LevelData>,
}

impl LevelLibrary {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let library: Self = ron::from_str(text)?;
        library.validate()?;
        Ok(library)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_ron_str(&read_file(path.as_ref())?)
    }

    /// Built-in two-room library used by the headless demo and the client.
    pub fn demo() -> Result<Self, ConfigError> {
        Self::from_ron_str(DEMO_LEVELS)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level(&self.start).is_none() {
            return Err(ConfigError::Invalid(format!("start level '{}' not in library", self.start)));
        }

        for level in &self.levels {
            if let Some(rect) = level.colliders.all_rects().find(|r| !r.is_valid()) {
                return Err(ConfigError::Invalid(format!(
                    "level '{}' has a malformed collider {:?}",
                    level.name, rect
                )));
            }

            for transition in &level.colliders.transitions {
                let target = self.level(&transition.to_level).ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "level '{}' transitions to unknown level '{}'",
                        level.name, transition.to_level
                    ))
                })?;
                if transition.to_transition >= target.colliders.transitions.len() {
                    return Err(ConfigError::Invalid(format!(
                        "level '{}' transitions to '{}' #{}, which has {} transitions",
                        level.name,
                        transition.to_level,
                        transition.to_transition,
                        target.colliders.transitions.len()
                    )));
                }
            }
        }

        Ok(())
    }
}

impl LevelSource for LevelLibrary {
    fn level(&self, name: &str) -> Option<&LevelData> {
        self.levels.iter().find(|level| level.name == name)
    }
}
