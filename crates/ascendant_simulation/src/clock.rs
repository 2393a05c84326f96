//! Render-frame to physics-tick mapping
//!
//! Exactly one fixed tick per render frame, never a catch-up burst. A frame
//! whose delta spikes past the threshold (window drag, resize, debugger) is
//! treated like a paused one: input is buffered and physics stays put.

use bevy::prelude::Resource;

use crate::config::SimulationConfig;
use crate::logger::log;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameAdvance {
    /// Run one tick of this length (s)
    Tick(f32),
    /// Buffer input only
    Static,
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    spike_threshold: f32,
    dt: f32,
}

impl FrameClock {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            spike_threshold: config.frame_spike_threshold,
            dt: config.fixed_dt(),
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn frame(&self, render_dt: f32, paused: bool) -> FrameAdvance {
        if paused {
            return FrameAdvance::Static;
        }
        if render_dt > self.spike_threshold {
            log(&format!("Frame spike {:.3}s, tick skipped", render_dt));
            return FrameAdvance::Static;
        }
        FrameAdvance::Tick(self.dt)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}
