//! Ascendant simulation core
//!
//! Physics, collision and per-entity state machines for a 2D action
//! platformer, plus the Bevy glue that drives them.
//!
//! Architecture:
//! - The core (`collision`, `physics`, `player`, `ai`, `collectable`, `level`)
//!   is plain Rust: a [`Level`] is stepped once per fixed tick with the
//!   player's input and a [`SimulationContext`] carrying audio, RNG and config
//! - [`SimulationPlugin`] wraps it for a Bevy `App`: one `advance_level` run
//!   per frame, gated by [`FrameClock`], publishing [`LevelEvent`]s
//! - Rendering and audio playback belong to the host (see `ascendant_client`)

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod ai;
pub mod animation;
pub mod audio;
pub mod clock;
pub mod collectable;
pub mod collision;
pub mod combat;
pub mod config;
pub mod entity;
pub mod level;
pub mod logger;
pub mod physics;
pub mod player;
pub mod shared;

pub use ai::{Enemy, FlyingEnemy, FlyingState, PatrolEnemy, PatrolState};
pub use animation::{AnimationClip, AnimationEvent, AnimationPlayer};
pub use audio::{AudioCommand, AudioCue, AudioQueue, AudioSink};
pub use clock::{FrameAdvance, FrameClock};
pub use collectable::{Collectable, CollectableState};
pub use collision::{Aabb, ContactResponse, PushOut};
pub use config::{ConfigError, EntityTemplates, SimulationConfig};
pub use entity::{EntityKind, PhysicsEntity, SimulationContext, WorldView};
pub use level::{
    Direction, Level, LevelColliders, LevelData, LevelError, LevelEvent, LevelLibrary, LevelSource, SaveState,
    StepReport, Transition,
};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use physics::Body;
pub use player::{Action, EffectKind, EffectRequest, InputEvent, Player, PlayerSignal, PlayerState};
pub use shared::{Camera, CameraConfig};

/// Main simulation plugin
///
/// Expects the host to insert an [`ActiveLevel`]; until then frames only
/// discard queued input.
#[derive(Debug, Clone, Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
    pub seed: u64,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(self.seed));
        }

        app.insert_resource(SimulationSettings {
            config: self.config.clone(),
        })
        .insert_resource(FrameClock::new(&self.config))
        .init_resource::<PlayerInputQueue>()
        .init_resource::<AudioQueue>()
        .init_resource::<SimulationPaused>()
        .add_event::<LevelEvent>()
        .add_systems(Update, advance_level.in_set(SimulationSet));
    }
}

/// The level tick. Hosts order input gathering before it and drawing after.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationSet;

#[derive(Resource, Debug, Clone, Default)]
pub struct SimulationSettings {
    pub config: SimulationConfig,
}

/// Deterministic RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Input gathered by the host since the last frame
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInputQueue {
    events: Vec<InputEvent>,
}

impl PlayerInputQueue {
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Host-controlled pause (menus, focus loss)
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationPaused(pub bool);

/// The level being played and the library it came from
#[derive(Resource, Debug, Clone)]
pub struct ActiveLevel {
    pub level: Level,
    pub library: LevelLibrary,
    /// Effect requests since the host last drained them
    pub effects: Vec<EffectRequest>,
}

impl ActiveLevel {
    /// New game at the library's start level.
    pub fn load(library: LevelLibrary, config: &SimulationConfig) -> Result<Self, LevelError> {
        let level = Level::new_game(&library, config)?;
        Ok(Self {
            level,
            library,
            effects: Vec::new(),
        })
    }
}

/// One frame: at most one level tick, then its events.
#[allow(clippy::too_many_arguments)]
fn advance_level(
    time: Res<Time>,
    settings: Res<SimulationSettings>,
    clock: Res<FrameClock>,
    paused: Res<SimulationPaused>,
    mut rng: ResMut<DeterministicRng>,
    mut audio: ResMut<AudioQueue>,
    mut input: ResMut<PlayerInputQueue>,
    active: Option<ResMut<ActiveLevel>>,
    mut events: EventWriter<LevelEvent>,
) {
    let inputs = input.drain();
    let Some(mut active) = active else {
        return;
    };
    let ActiveLevel {
        level,
        library,
        effects,
    } = &mut *active;

    match clock.frame(time.delta_secs(), paused.0) {
        FrameAdvance::Static => level.buffer_input(&inputs),
        FrameAdvance::Tick(dt) => {
            let mut ctx = SimulationContext {
                dt,
                audio: &mut *audio,
                rng: &mut rng.rng,
                level_bounds: level.bounds(),
                config: &settings.config,
            };
            let report = level.step(&inputs, &mut ctx, &*library);
            effects.extend(report.effects);
            for event in report.events {
                events.write(event);
            }
        }
    }
}

/// Creates a minimal Bevy App for headless simulation
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Level state in a comparable byte form, for determinism checks
pub fn level_snapshot(level: &Level) -> Vec<u8> {
    let mut snapshot = Vec::new();
    snapshot.extend_from_slice(level.name().as_bytes());

    let player = level.player();
    for value in [player.position(), player.velocity(), level.camera().view_origin()] {
        snapshot.extend_from_slice(&value.x.to_bits().to_le_bytes());
        snapshot.extend_from_slice(&value.y.to_bits().to_le_bytes());
    }
    snapshot.extend_from_slice(
        format!("{:?}{}{:?}", player.state(), player.frame(), player.hearts()).as_bytes(),
    );

    // Enemy and collectable order is spawn order, already deterministic
    for enemy in level.enemies() {
        snapshot.extend_from_slice(format!("{:?}", enemy).as_bytes());
    }
    for collectable in level.collectables() {
        snapshot.extend_from_slice(format!("{:?}", collectable).as_bytes());
    }
    snapshot.extend_from_slice(format!("{:?}", level.save()).as_bytes());

    snapshot
}
