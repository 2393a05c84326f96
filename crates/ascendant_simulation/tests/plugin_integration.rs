//! SimulationPlugin driven through a headless app, schedule run by hand

use ascendant_simulation::{
    create_headless_app, Aabb, Action, ActiveLevel, AudioCommand, AudioCue, AudioQueue, InputEvent, LevelColliders,
    LevelData, LevelEvent, LevelLibrary, PlayerInputQueue, SimulationConfig, SimulationPaused, SimulationPlugin,
};
use bevy::prelude::*;

fn flat_library() -> LevelLibrary {
    LevelLibrary {
        start: "flat".to_string(),
        levels: vec![LevelData {
            name: "flat".to_string(),
            size: Vec2::new(1200.0, 300.0),
            colliders: LevelColliders {
                solid: vec![Aabb::new(0.0, 250.0, 1200.0, 20.0)],
                ..Default::default()
            },
            player_spawn: Vec2::new(100.0, 250.0 - 29.75),
            collectables: vec![Vec2::new(400.0, 220.0)],
            ..Default::default()
        }],
    }
}

/// Headless app with the plugin and a level; spikes never skip a tick here
/// since test frames can be arbitrarily slow.
fn app_with_level(library: LevelLibrary) -> App {
    let config = SimulationConfig {
        frame_spike_threshold: f32::MAX,
        ..Default::default()
    };
    let active = ActiveLevel::load(library, &config).expect("start level exists");

    let mut app = create_headless_app(9);
    app.add_plugins(SimulationPlugin { config, seed: 9 })
        .insert_resource(active);
    app
}

fn push(app: &mut App, event: InputEvent) {
    app.world_mut().resource_mut::<PlayerInputQueue>().push(event);
}

fn player_x(app: &App) -> f32 {
    app.world().resource::<ActiveLevel>().level.player().position().x
}

#[test]
fn test_plugin_steps_level_once_per_update() {
    let mut app = app_with_level(flat_library());
    app.update();
    let start = player_x(&app);

    push(&mut app, InputEvent::Pressed(Action::Right));
    for _ in 0..30 {
        app.update();
    }

    // 30 ticks at walk speed, no catch-up
    let walked = player_x(&app) - start;
    let expected = 150.0 * 30.0 / 60.0;
    assert!((walked - expected).abs() < 5.0, "walked {} px, expected about {}", walked, expected);

    let commands = app.world_mut().resource_mut::<AudioQueue>().drain();
    assert!(commands.contains(&AudioCommand::Play { cue: AudioCue::Run, fade_in_ms: 0 }));
}

#[test]
fn test_pause_buffers_input_without_ticking() {
    let mut app = app_with_level(flat_library());
    app.update();

    app.world_mut().resource_mut::<SimulationPaused>().0 = true;
    let start = player_x(&app);
    push(&mut app, InputEvent::Pressed(Action::Right));
    for _ in 0..10 {
        app.update();
    }

    let active = app.world().resource::<ActiveLevel>();
    assert_eq!(active.level.player().position().x, start);
    assert!(active.level.player().keys().right, "press while paused is not lost");

    app.world_mut().resource_mut::<SimulationPaused>().0 = false;
    for _ in 0..5 {
        app.update();
    }
    assert!(player_x(&app) > start);
}

#[test]
fn test_level_events_are_published() {
    let mut app = app_with_level(flat_library());
    push(&mut app, InputEvent::Pressed(Action::Right));

    let mut completed = Vec::new();
    for _ in 0..400 {
        app.update();
        let mut events = app.world_mut().resource_mut::<Events<LevelEvent>>();
        completed.extend(
            events
                .drain()
                .filter(|e| matches!(e, LevelEvent::ChallengeCompleted { .. })),
        );
    }

    assert_eq!(completed, vec![LevelEvent::ChallengeCompleted { level: "flat".to_string() }]);
    let active = app.world().resource::<ActiveLevel>();
    assert!(active.level.collectables().is_empty());
    assert!(!active.effects.is_empty(), "walking kicks up dust");
}

#[test]
fn test_input_without_level_is_discarded() {
    let mut app = create_headless_app(1);
    app.add_plugins(SimulationPlugin::default());

    push(&mut app, InputEvent::Pressed(Action::Jump));
    app.update();

    assert!(app.world().resource::<PlayerInputQueue>().is_empty());
}
