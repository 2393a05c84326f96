//! Hearts, knockback direction and the invincibility flash

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::Aabb;
use crate::logger::log_warning;

/// On/off flash sequence over the invincibility window, sparser at the end.
pub const FLASH_PATTERN: [bool; 19] = [
    true, true, true, true, false, true, true, true, false, false, true, true, false, false, false,
    true, false, false, false,
];

/// Integer health, never below zero and never above `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hearts {
    current: u32,
    max: u32,
}

impl Hearts {
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    pub fn lose_one(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }

    pub fn set(&mut self, value: u32) {
        self.current = value.min(self.max);
    }
}

/// Per-axis unit push away from `source`'s centre.
///
/// A zero difference on an axis (target centre exactly level with the
/// source centre, common inside long colliders) has no meaningful direction;
/// it resolves to negative and is logged.
pub fn knockback_direction(source: &Aabb, target_center: Vec2) -> Vec2 {
    let s = source.center() - target_center;
    if s.x == 0.0 || s.y == 0.0 {
        log_warning(&format!(
            "ambiguous knockback: source centre {:?} level with target centre {:?}",
            source.center(),
            target_center
        ));
    }
    Vec2::new(
        if s.x < 0.0 { 1.0 } else { -1.0 },
        if s.y < 0.0 { 1.0 } else { -1.0 },
    )
}

/// Whether the flash overlay is on for `remaining` of `length` iframes.
pub fn flash_visible(remaining: u32, length: u32) -> bool {
    if remaining == 0 || length == 0 {
        return false;
    }
    let elapsed = length.saturating_sub(remaining) as f32 / length as f32;
    let index = (elapsed * (FLASH_PATTERN.len() - 1) as f32) as usize;
    FLASH_PATTERN[index.min(FLASH_PATTERN.len() - 1)]
}
