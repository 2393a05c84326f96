//! One fixed tick of a level
//!
//! Order matters and is fixed:
//! 1. fade countdown (loads the next level when it runs out)
//! 2. hit-stop: while frozen only held keys are updated
//! 3. enemies, collecting the damage colliders they expose
//! 4. the player, against those colliders
//! 5. player signals, at most one acted on: respawn > reset > transition > hit
//! 6. input (after physics, so a press acts on this tick's contacts)
//! 7. collectables
//! 8. camera, frozen while the player is on its way out
//! 9. reload once the death clip has played

use super::{silence_loops, Level, LevelEvent, LevelSource, PendingReload};
use crate::collision::Aabb;
use crate::entity::{PhysicsEntity, SimulationContext, WorldView};
use crate::logger::{log, log_error, log_info};
use crate::player::{EffectRequest, InputEvent};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Physics did not run this tick (hit-stop)
    pub frozen: bool,
    pub events: Vec<LevelEvent>,
    pub effects: Vec<EffectRequest>,
    /// The player damaged an enemy this tick
    pub enemy_damaged: bool,
}

impl Level {
    pub fn step(
        &mut self,
        inputs: &[InputEvent],
        ctx: &mut SimulationContext<'_>,
        source: &dyn LevelSource,
    ) -> StepReport {
        let mut report = StepReport::default();

        self.tick_fade(ctx, source, &mut report);
        ctx.level_bounds = self.data.bounds();

        if self.freeze_frames > 0 {
            self.freeze_frames -= 1;
            self.player.handle_input_static(inputs);
            report.frozen = true;
            return report;
        }

        let (damage, enemy_damaged) = self.step_enemies(ctx);
        report.enemy_damaged = enemy_damaged;

        let mut world = WorldView::new(&self.data.colliders, self.player.collider());
        world.damage = &damage;
        world.hit_occurred = enemy_damaged;
        world.allow_movement = !self.movement_locked;
        let signal = self.player.step(&world, ctx);

        if signal.respawn {
            self.player.begin_death();
            self.pending_reload = Some(PendingReload::Respawn);
        } else if signal.reset {
            self.player.begin_death();
            self.pending_reload = Some(PendingReload::Reset);
        } else if let Some(transition) = signal.transition {
            // A second exit while already fading is ignored
            if self.pending_transition.is_none() {
                log_info(&format!("Leaving '{}' for '{}'", self.data.name, transition.to_level));
                report.events.push(LevelEvent::TransitionStarted {
                    to_level: transition.to_level.clone(),
                });
                self.fade_frames = ctx.config.transition_fade_frames.max(1);
                self.pending_transition = Some(transition);
            }
        } else if signal.hit {
            self.freeze_frames = ctx.config.player_hit_freeze_frames;
            report.events.push(LevelEvent::Hit {
                hearts: self.player.hearts().current(),
            });
        }

        if self.movement_locked {
            self.player.handle_input_static(inputs);
        } else {
            let outcome = self.player.handle_input(inputs, &mut *ctx.audio);
            if outcome.save_requested {
                self.player.restore_hearts();
                self.save.save_level = self.data.name.clone();
                log_info(&format!("Saved in '{}'", self.data.name));
                report.events.push(LevelEvent::Saved {
                    level: self.data.name.clone(),
                });
            }
        }

        self.step_collectables(ctx, &mut report);

        if self.player.pending_transition().is_none() {
            let focus = self.camera_focus();
            self.camera.follow(focus);
        }

        if self.player.is_death_finished() {
            self.reload(ctx, source, &mut report);
        }

        report.effects = self.player.drain_effects();
        report
    }

    fn tick_fade(&mut self, ctx: &mut SimulationContext<'_>, source: &dyn LevelSource, report: &mut StepReport) {
        if self.fade_frames == 0 {
            return;
        }
        self.fade_frames -= 1;
        if self.fade_frames > 0 {
            return;
        }
        let Some(transition) = self.pending_transition.take() else {
            return;
        };

        match self.enter(source, &transition.to_level, transition.to_transition) {
            Ok(()) => {
                silence_loops(&mut *ctx.audio);
                report.events.push(LevelEvent::LevelLoaded {
                    level: self.data.name.clone(),
                });
            }
            Err(err) => log_error(&format!("Transition from '{}' dropped: {}", self.data.name, err)),
        }
    }

    /// Drop finished enemies, step the rest. Returns the hitboxes the player
    /// can be hurt by and whether the player's attack landed on anything.
    fn step_enemies(&mut self, ctx: &mut SimulationContext<'_>) -> (Vec<Aabb>, bool) {
        self.enemies.retain(|enemy| !enemy.is_dead());

        let attacks: Vec<Aabb> = self.player.attack_collider().into_iter().collect();
        let mut world = WorldView::new(&self.data.colliders, self.player.collider());
        world.player_attacks = &attacks;

        let mut damage = Vec::new();
        let mut damaged = false;
        for enemy in &mut self.enemies {
            if enemy.step(&world, ctx) {
                log(&format!("{:?} struck", enemy.kind()));
                damaged = true;
                self.freeze_frames = ctx.config.enemy_hit_freeze_frames;
            }
            enemy.damage_colliders(&mut damage);
        }
        (damage, damaged)
    }

    fn step_collectables(&mut self, ctx: &mut SimulationContext<'_>, report: &mut StepReport) {
        let world = WorldView::new(&self.data.colliders, self.player.collider());
        let mut collecting = false;
        let mut collected = false;

        self.collectables.retain_mut(|collectable| {
            if collectable.is_dying() {
                collecting = true;
            }
            let done = collectable.step(&world, ctx);
            collected |= done;
            !done
        });

        if collecting {
            self.freeze_frames = ctx.config.collect_freeze_frames;
        }
        self.player.set_highlight(collecting);

        if collected {
            let level = self.data.name.clone();
            log(&format!("Challenge in '{}' completed", level));
            if !self.save.is_completed(&level) {
                self.save.challenges.push(level.clone());
            }
            report.events.push(LevelEvent::ChallengeCompleted { level });
        }
    }

    fn reload(&mut self, ctx: &mut SimulationContext<'_>, source: &dyn LevelSource, report: &mut StepReport) {
        match self.pending_reload.take() {
            Some(PendingReload::Respawn) => match self.respawn(source) {
                Ok(()) => report.events.push(LevelEvent::Respawned {
                    level: self.data.name.clone(),
                }),
                Err(err) => log_error(&format!("Respawn failed: {}", err)),
            },
            Some(PendingReload::Reset) => {
                self.reset();
                report.events.push(LevelEvent::Reset {
                    level: self.data.name.clone(),
                });
            }
            None => return,
        }
        self.pending_transition = None;
        self.fade_frames = 0;
        silence_loops(&mut *ctx.audio);
    }
}
