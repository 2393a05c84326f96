//! Keyboard input and the 2D camera
//!
//! The simulation owns the camera logic; this only mirrors its view onto a
//! Bevy `Camera2d`. Level space has y pointing down, Bevy's world has y up.

use bevy::prelude::*;
use ascendant_simulation::{
    Action, ActiveLevel, AudioQueue, InputEvent, PlayerInputQueue, SimulationPaused, SimulationSet,
    SimulationSettings,
};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(Update, (toggle_pause, gather_input).chain().before(SimulationSet))
            .add_systems(Update, follow_level_camera.after(SimulationSet));
    }
}

const BINDINGS: [(KeyCode, Action); 8] = [
    (KeyCode::ArrowUp, Action::Up),
    (KeyCode::ArrowDown, Action::Down),
    (KeyCode::ArrowLeft, Action::Left),
    (KeyCode::ArrowRight, Action::Right),
    (KeyCode::KeyZ, Action::Jump),
    (KeyCode::Space, Action::Jump),
    (KeyCode::KeyX, Action::Attack),
    (KeyCode::KeyJ, Action::Attack),
];

/// Level point to world point
pub fn to_world(point: Vec2) -> Vec2 {
    Vec2::new(point.x, -point.y)
}

fn spawn_camera(mut commands: Commands, settings: Res<SimulationSettings>, windows: Query<&Window>) {
    let viewport = settings.config.camera.viewport;
    // Fit the level viewport into the window
    let scale = match windows.single() {
        Ok(window) => (viewport.x / window.width()).max(viewport.y / window.height()),
        Err(_) => 1.0,
    };

    commands.spawn((
        Camera2d,
        Projection::from(OrthographicProjection {
            scale,
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_translation(to_world(viewport * 0.5).extend(100.0)),
    ));
}

/// Loops go quiet while paused; the next tick starts them again.
fn toggle_pause(
    keys: Res<ButtonInput<KeyCode>>,
    mut paused: ResMut<SimulationPaused>,
    mut audio: ResMut<AudioQueue>,
) {
    if keys.just_pressed(KeyCode::KeyP) || keys.just_pressed(KeyCode::Escape) {
        paused.0 = !paused.0;
        if paused.0 {
            audio.stop_all();
        }
    }
}

fn gather_input(keys: Res<ButtonInput<KeyCode>>, mut queue: ResMut<PlayerInputQueue>) {
    for (key, action) in BINDINGS {
        if keys.just_pressed(key) {
            queue.push(InputEvent::Pressed(action));
        }
        if keys.just_released(key) {
            queue.push(InputEvent::Released(action));
        }
    }
}

fn follow_level_camera(active: Option<Res<ActiveLevel>>, mut query: Query<&mut Transform, With<Camera2d>>) {
    let Some(active) = active else {
        return;
    };
    let Ok(mut transform) = query.single_mut() else {
        return;
    };

    let center = to_world(active.level.camera().view_rect().center());
    transform.translation.x = center.x;
    transform.translation.y = center.y;
}
