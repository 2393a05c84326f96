//! Combat rules shared by the player and enemies
//!
//! Two halves:
//! 1. attack: reach rectangles and their active frame windows
//! 2. damage: hearts, knockback direction, invincibility flash

pub mod attack;
pub mod damage;

pub use attack::{AttackKind, AttackReach, AttackSet};
pub use damage::{flash_visible, knockback_direction, Hearts, FLASH_PATTERN};
