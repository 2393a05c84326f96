//! Flat-rectangle rendering of the active level
//!
//! Everything is drawn with gizmos every frame straight from the simulation
//! state; there are no visual entities to keep in sync.

use bevy::prelude::*;
use ascendant_simulation::{
    log, log_info, Aabb, ActiveLevel, AudioCommand, AudioQueue, EffectKind, Enemy, LevelEvent, SimulationSet,
    SimulationSettings,
};

use crate::camera::to_world;

pub struct RenderingSyncPlugin;

impl Plugin for RenderingSyncPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LiveEffects>().add_systems(
            Update,
            (log_audio_cues, log_level_events, collect_effects, draw_level, draw_entities, draw_effects)
                .chain()
                .after(SimulationSet),
        );
    }
}

/// Effect shown for a few frames after its request
struct LiveEffect {
    kind: EffectKind,
    position: Vec2,
    frames_left: u32,
}

#[derive(Resource, Default)]
struct LiveEffects(Vec<LiveEffect>);

const EFFECT_FRAMES: u32 = 12;

fn rect(gizmos: &mut Gizmos, aabb: &Aabb, color: Color) {
    let center = to_world(aabb.center());
    gizmos.rect_2d(Isometry2d::from_translation(center), Vec2::new(aabb.w, aabb.h), color);
}

/// Audio playback is out of scope; cues are logged.
fn log_audio_cues(mut audio: ResMut<AudioQueue>) {
    for command in audio.drain() {
        match command {
            AudioCommand::Play { cue, fade_in_ms } => log(&format!("audio: play {} ({} ms)", cue.name(), fade_in_ms)),
            AudioCommand::Stop { cue, fade_out_ms } => log(&format!("audio: stop {} ({} ms)", cue.name(), fade_out_ms)),
        }
    }
}

fn log_level_events(mut events: EventReader<LevelEvent>) {
    for event in events.read() {
        log_info(&format!("{:?}", event));
    }
}

fn collect_effects(active: Option<ResMut<ActiveLevel>>, mut live: ResMut<LiveEffects>) {
    let Some(mut active) = active else {
        return;
    };
    live.0.retain_mut(|effect| {
        effect.frames_left = effect.frames_left.saturating_sub(1);
        effect.frames_left > 0
    });
    live.0.extend(active.effects.drain(..).map(|request| LiveEffect {
        kind: request.kind,
        position: request.position,
        frames_left: EFFECT_FRAMES,
    }));
}

fn draw_level(active: Option<Res<ActiveLevel>>, settings: Res<SimulationSettings>, mut gizmos: Gizmos) {
    let Some(active) = active else {
        return;
    };
    let colliders = &active.level.data().colliders;

    rect(&mut gizmos, &active.level.bounds(), Color::srgb(0.2, 0.2, 0.25));
    for solid in &colliders.solid {
        rect(&mut gizmos, solid, Color::srgb(0.6, 0.6, 0.6));
    }
    for death in &colliders.death {
        rect(&mut gizmos, death, Color::srgb(0.9, 0.1, 0.1));
    }
    for hitable in &colliders.hitable {
        rect(&mut gizmos, hitable, Color::srgb(0.9, 0.5, 0.1));
    }
    for save in &colliders.save {
        rect(&mut gizmos, save, Color::srgb(0.2, 0.9, 0.3));
    }
    for water in &colliders.water {
        rect(&mut gizmos, water, Color::srgb(0.2, 0.4, 0.9));
    }
    for transition in &colliders.transitions {
        rect(&mut gizmos, &transition.collider, Color::srgb(0.7, 0.3, 0.9));
    }

    // Fade to black toward the next level
    let fade = active.level.fade(&settings.config);
    if fade > 0.0 {
        rect(&mut gizmos, &active.level.camera().view_rect(), Color::srgba(0.0, 0.0, 0.0, fade));
    }
}

fn draw_entities(active: Option<Res<ActiveLevel>>, mut gizmos: Gizmos) {
    let Some(active) = active else {
        return;
    };
    let level = &active.level;

    for enemy in level.enemies() {
        match enemy {
            Enemy::Patrol(patrol) => {
                let color = if patrol.is_dying() {
                    Color::srgb(0.4, 0.1, 0.1)
                } else {
                    Color::srgb(0.9, 0.3, 0.3)
                };
                rect(&mut gizmos, &patrol.collider(), color);
                let mut hitboxes = Vec::new();
                patrol.damage_colliders(&mut hitboxes);
                for hitbox in hitboxes.iter().skip(1) {
                    rect(&mut gizmos, hitbox, Color::srgb(1.0, 0.8, 0.2));
                }
            }
            Enemy::Flying(flying) if flying.is_visible() => {
                let color = if flying.is_dying() {
                    Color::srgb(0.3, 0.1, 0.4)
                } else {
                    Color::srgb(0.8, 0.3, 0.9)
                };
                rect(&mut gizmos, &flying.collider(), color);
            }
            Enemy::Flying(_) => {}
        }
    }

    for collectable in level.collectables() {
        rect(&mut gizmos, &collectable.collider(), Color::srgb(1.0, 0.9, 0.2));
    }

    let player = level.player();
    let color = if player.is_flashing() {
        Color::WHITE
    } else {
        Color::srgb(0.3, 0.8, 1.0)
    };
    rect(&mut gizmos, &player.collider(), color);
    if let Some(reach) = player.attack_collider() {
        rect(&mut gizmos, &reach, Color::srgb(1.0, 1.0, 1.0));
    }
}

fn draw_effects(live: Res<LiveEffects>, mut gizmos: Gizmos) {
    for effect in &live.0 {
        let color = match effect.kind {
            EffectKind::BigSplash | EffectKind::SmallSplash => Color::srgb(0.5, 0.7, 1.0),
            _ => Color::srgb(0.8, 0.7, 0.5),
        };
        let radius = 2.0 + (EFFECT_FRAMES - effect.frames_left) as f32 * 0.5;
        gizmos.circle_2d(Isometry2d::from_translation(to_world(effect.position)), radius, color);
    }
}
