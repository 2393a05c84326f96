use bevy::prelude::*;
use ascendant_simulation::{
    init_logger, log_error, log_info, ActiveLevel, LevelLibrary, SimulationConfig, SimulationPlugin,
};

mod camera;
mod rendering;

use camera::CameraPlugin;
use rendering::RenderingSyncPlugin;

fn main() {
    init_logger();

    // Optional config path; defaults otherwise
    let config = match std::env::args().nth(1) {
        Some(path) => match SimulationConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                log_error(&format!("Config '{}' rejected: {}", path, err));
                return;
            }
        },
        None => SimulationConfig::default(),
    };

    let active = match LevelLibrary::demo() {
        Ok(library) => match ActiveLevel::load(library, &config) {
            Ok(active) => active,
            Err(err) => {
                log_error(&format!("Demo start level missing: {}", err));
                return;
            }
        },
        Err(err) => {
            log_error(&format!("Demo levels failed to parse: {}", err));
            return;
        }
    };
    log_info(&format!("Starting in '{}'", active.level.name()));

    let viewport = config.camera.viewport;
    App::new()
        // Bevy defaults (rendering, input, time, etc.)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Ascendant".to_string(),
                resolution: (viewport.x * 3.0, viewport.y * 3.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Simulation core (fixed tick per frame)
        .add_plugins(SimulationPlugin { config, seed: 42 })
        .insert_resource(active)
        // Flat-rectangle drawing, audio cue log
        .add_plugins(RenderingSyncPlugin)
        // Keyboard → input queue, level camera → 2D camera
        .add_plugins(CameraPlugin)
        .run();
}
