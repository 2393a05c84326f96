//! Audio cues produced by the simulation
//!
//! The core never plays sound: it talks to an [`AudioSink`]. The default
//! sink, [`AudioQueue`], records commands for the host to drain once per
//! frame and remembers which looping cues are running so the per-tick
//! "keep playing / stop" calls collapse into edges.

use bevy::prelude::Resource;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AudioCue {
    Jump,
    LandHard,
    LandSoft,
    LandSplash,
    Run,
    Swim,
    Falling,
    Attack,
    BigAttack,
    Damage,
    Death,
}

impl AudioCue {
    pub fn name(&self) -> &'static str {
        match self {
            AudioCue::Jump => "jump",
            AudioCue::LandHard => "land_hard",
            AudioCue::LandSoft => "land_soft",
            AudioCue::LandSplash => "land_splash",
            AudioCue::Run => "run",
            AudioCue::Swim => "swim",
            AudioCue::Falling => "falling",
            AudioCue::Attack => "attack",
            AudioCue::BigAttack => "big_attack",
            AudioCue::Damage => "damage",
            AudioCue::Death => "death",
        }
    }

    /// Cues that keep playing until stopped.
    pub fn is_loop(&self) -> bool {
        matches!(self, AudioCue::Run | AudioCue::Swim | AudioCue::Falling)
    }
}

pub trait AudioSink {
    fn play(&mut self, cue: AudioCue, fade_in_ms: u32);
    fn stop(&mut self, cue: AudioCue, fade_out_ms: u32);
    fn is_playing(&self, cue: AudioCue) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCommand {
    Play { cue: AudioCue, fade_in_ms: u32 },
    Stop { cue: AudioCue, fade_out_ms: u32 },
}

#[derive(Resource, Debug, Default)]
pub struct AudioQueue {
    commands: Vec<AudioCommand>,
    playing: BTreeSet<AudioCue>,
}

impl AudioQueue {
    pub fn drain(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn pending(&self) -> &[AudioCommand] {
        &self.commands
    }

    /// Forget every running loop, e.g. on level reload.
    pub fn stop_all(&mut self) {
        let running: Vec<AudioCue> = self.playing.iter().copied().collect();
        for cue in running {
            self.stop(cue, 0);
        }
    }
}

impl AudioSink for AudioQueue {
    fn play(&mut self, cue: AudioCue, fade_in_ms: u32) {
        if cue.is_loop() && !self.playing.insert(cue) {
            return;
        }
        self.commands.push(AudioCommand::Play { cue, fade_in_ms });
    }

    fn stop(&mut self, cue: AudioCue, fade_out_ms: u32) {
        if cue.is_loop() && !self.playing.remove(&cue) {
            return;
        }
        self.commands.push(AudioCommand::Stop { cue, fade_out_ms });
    }

    fn is_playing(&self, cue: AudioCue) -> bool {
        self.playing.contains(&cue)
    }
}
