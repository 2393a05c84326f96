//! Frame-indexed animation clock
//!
//! Only the timing side of sprite animation lives here: which clip is
//! active, which frame it is on, and when it finished or was cut short.
//! Entities turn the returned [`AnimationEvent`]s into state transitions
//! through their own tables, after the rest of the tick has run.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Timing of one clip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    /// Number of frames, ≥ 1
    pub frames: u32,
    /// Nominal clip length (s)
    pub seconds: f32,
    pub looping: bool,
}

impl AnimationClip {
    pub const fn once(frames: u32, seconds: f32) -> Self {
        Self {
            frames,
            seconds,
            looping: false,
        }
    }

    pub const fn looped(frames: u32, seconds: f32) -> Self {
        Self {
            frames,
            seconds,
            looping: true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.frames >= 1 && self.seconds > 0.0
    }

    /// Same clip played `speed` times as fast.
    pub fn at_speed(self, speed: f32) -> Self {
        Self {
            seconds: self.seconds / speed,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent<C> {
    /// One-shot clip ran past its last frame.
    Finished(C),
    /// Clip was replaced while still playing.
    Interrupted(C),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPlayer<C> {
    current: C,
    clip: AnimationClip,
    time: f32,
    frame: u32,
    playing: bool,
    finished: bool,
}

impl<C: Copy + Eq> AnimationPlayer<C> {
    pub fn new(current: C, clip: AnimationClip) -> Self {
        Self {
            current,
            clip,
            time: 0.0,
            frame: 0,
            playing: true,
            finished: false,
        }
    }

    /// Start `name` from frame 0. Replacing a clip that is still playing
    /// reports it as interrupted.
    pub fn play(&mut self, name: C, clip: AnimationClip) -> Option<AnimationEvent<C>> {
        let interrupted = self.playing.then_some(AnimationEvent::Interrupted(self.current));

        self.current = name;
        self.clip = clip;
        self.time = 0.0;
        self.frame = 0;
        self.playing = true;
        self.finished = false;

        interrupted
    }

    pub fn advance(&mut self, dt: f32) -> Option<AnimationEvent<C>> {
        self.time += dt;
        if !self.playing {
            return None;
        }

        let last = self.clip.frames.saturating_sub(1);
        let raw = if last == 0 {
            // Single-frame clip: done once its nominal length is up
            if self.time >= self.clip.seconds { 1 } else { 0 }
        } else {
            (self.time / self.clip.seconds * last as f32).floor() as u32
        };

        if raw <= last {
            self.frame = raw;
            return None;
        }

        if self.clip.looping {
            self.frame = 0;
            self.time = 0.0;
            None
        } else {
            self.frame = last;
            self.playing = false;
            self.finished = true;
            Some(AnimationEvent::Finished(self.current))
        }
    }

    pub fn current(&self) -> C {
        self.current
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is(&self, name: C) -> bool {
        self.current == name
    }

    pub fn in_frames(&self, window: &RangeInclusive<u32>) -> bool {
        window.contains(&self.frame)
    }

    /// Jump to the start of `frame`, clamped to the clip.
    pub fn seek_frame(&mut self, frame: u32) {
        let last = self.clip.frames.saturating_sub(1);
        let frame = frame.min(last);
        self.frame = frame;
        if last > 0 {
            self.time = frame as f32 / last as f32 * self.clip.seconds;
        }
    }
}
