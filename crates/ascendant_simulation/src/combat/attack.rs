//! Player attack reach rectangles
//!
//! Each directional attack grows the player's body collider and slides it
//! out on the attacking side. The reach only exists during a frame window of
//! the attack clip.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::collision::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackKind {
    /// Horizontal slash toward the facing side
    Side,
    Up,
    Down,
}

/// Geometry and timing of one attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackReach {
    /// Extent along the attack direction (px)
    pub length: f32,
    /// Extent across the attack direction, added to the body (px, may be negative)
    pub width: f32,
    pub first_frame: u32,
    pub last_frame: u32,
}

impl AttackReach {
    pub fn active_frames(&self) -> RangeInclusive<u32> {
        self.first_frame..=self.last_frame
    }

    /// Reach rectangle for `body`. `facing_left` only matters for side attacks.
    pub fn rect(&self, kind: AttackKind, body: &Aabb, facing_left: bool) -> Aabb {
        match kind {
            AttackKind::Side => {
                let dir = if facing_left { -1.0 } else { 1.0 };
                body.inflate(self.length, self.width)
                    .translate(Vec2::new(dir * (self.length / 2.0 + body.w / 2.0), 0.0))
            }
            AttackKind::Up => body
                .inflate(self.width, self.length)
                .translate(Vec2::new(0.0, -(self.length / 2.0 + body.h / 2.0))),
            AttackKind::Down => body
                .inflate(self.width, self.length)
                .translate(Vec2::new(0.0, self.length / 2.0 + body.h / 2.0)),
        }
    }
}

/// Reach of all three attacks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackSet {
    pub side: AttackReach,
    pub up: AttackReach,
    pub down: AttackReach,
}

impl AttackSet {
    pub fn get(&self, kind: AttackKind) -> &AttackReach {
        match kind {
            AttackKind::Side => &self.side,
            AttackKind::Up => &self.up,
            AttackKind::Down => &self.down,
        }
    }
}

impl Default for AttackSet {
    fn default() -> Self {
        Self {
            side: AttackReach {
                length: 29.75,
                width: -1.75,
                first_frame: 2,
                last_frame: 5,
            },
            up: AttackReach {
                length: 27.125,
                width: 43.75,
                first_frame: 3,
                last_frame: 5,
            },
            down: AttackReach {
                length: 8.75,
                width: 43.75,
                first_frame: 0,
                last_frame: 4,
            },
        }
    }
}
