//! Headless Ascendant simulation
//!
//! Runs the built-in demo levels through the Bevy plugin with a scripted
//! input track and logs what happens.

use bevy::prelude::*;

use ascendant_simulation::{
    create_headless_app, log_error, log_info, Action, ActiveLevel, AudioQueue, InputEvent, LevelEvent, LevelLibrary,
    PlayerInputQueue, SimulationConfig, SimulationPlugin,
};

const TICKS: u32 = 1200;

fn main() {
    let seed = 42;
    println!("Starting Ascendant headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    let config = SimulationConfig::default();

    let active = match LevelLibrary::demo().map_err(|e| e.to_string()).and_then(|library| {
        ActiveLevel::load(library, &config).map_err(|e| e.to_string())
    }) {
        Ok(active) => active,
        Err(err) => {
            log_error(&format!("Demo levels failed to load: {}", err));
            std::process::exit(1);
        }
    };

    app.add_plugins(SimulationPlugin { config, seed }).insert_resource(active);

    let mut cues = 0;
    for tick in 0..TICKS {
        {
            let mut input = app.world_mut().resource_mut::<PlayerInputQueue>();
            for event in scripted_input(tick) {
                input.push(event);
            }
        }

        app.update();

        let events: Vec<LevelEvent> = app.world_mut().resource_mut::<Events<LevelEvent>>().drain().collect();
        for event in events {
            log_info(&format!("Tick {}: {:?}", tick, event));
        }
        cues += app.world_mut().resource_mut::<AudioQueue>().drain().len();

        if tick % 100 == 0 {
            let active = app.world().resource::<ActiveLevel>();
            let player = active.level.player();
            println!(
                "Tick {}: '{}' player at ({:.1}, {:.1}) {:?}, hearts {}",
                tick,
                active.level.name(),
                player.position().x,
                player.position().y,
                player.state(),
                player.hearts().current()
            );
        }
    }

    println!("Simulation complete! {} audio commands issued", cues);
}

/// Walk right the whole time, hop every 1.5 s, swing every 2/3 s.
fn scripted_input(tick: u32) -> Vec<InputEvent> {
    let mut events = Vec::new();
    if tick == 0 {
        events.push(InputEvent::Pressed(Action::Right));
    }
    match tick % 90 {
        0 => events.push(InputEvent::Pressed(Action::Jump)),
        18 => events.push(InputEvent::Released(Action::Jump)),
        _ => {}
    }
    match tick % 40 {
        10 => events.push(InputEvent::Pressed(Action::Attack)),
        12 => events.push(InputEvent::Released(Action::Attack)),
        _ => {}
    }
    events
}
