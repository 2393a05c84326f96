//! Level exit choreography and arrival placement
//!
//! Exiting: the player walks, jumps or falls off-screen on a fixed velocity
//! while `transition_frames` counts down, then the pending [`Transition`] is
//! handed back to the level. Arriving: the player is placed just inside the
//! destination transition with enough velocity not to fall straight back.

use bevy::math::Vec2;

use super::{Player, PlayerState};
use crate::audio::{AudioCue, AudioSink};
use crate::level::{Direction, Transition};

impl Player {
    /// Lock into the exit countdown through `transition`.
    pub(super) fn begin_exit(&mut self, transition: Transition, audio: &mut dyn AudioSink) {
        self.transition_frames = self.config.transition_frames;

        match transition.direction {
            Direction::S => {
                self.body.velocity.x = 0.0;
                self.body.velocity.y = self.body.velocity.y.abs();
                audio.play(AudioCue::Jump, 200);
                self.play(PlayerState::Idle);
            }
            Direction::N => {
                self.body.velocity.x = 0.0;
                // Make sure the player clears the top edge
                self.body.velocity.y = -self.body.velocity.y.abs().max(self.config.gravity.y / 5.0);
                audio.play(AudioCue::Falling, 200);
                self.play(PlayerState::Idle);
            }
            Direction::W => {
                self.walk_velocity = Vec2::new(-self.config.walk_speed, 0.0);
                self.facing_left = true;
                self.play(PlayerState::Walk);
                audio.play(AudioCue::Run, 200);
            }
            Direction::E => {
                self.walk_velocity = Vec2::new(self.config.walk_speed, 0.0);
                self.facing_left = false;
                self.play(PlayerState::Walk);
                audio.play(AudioCue::Run, 200);
            }
        }

        self.transition = Some(transition);
    }

    /// Place a freshly spawned player at `arrival`, the destination level's
    /// transition it came in through, and start the arrival countdown.
    pub fn arrive_via(&mut self, arrival: &Transition) {
        let rect = arrival.collider;
        let size = self.config.collider.size;
        let g = self.config.gravity.y;
        let walk = self.config.walk_speed;

        self.transition_frames = self.config.transition_frames;

        let collider_min = match arrival.direction {
            Direction::S => {
                self.body.velocity = Vec2::new(g / 25.0, -g / 9.6);
                Vec2::new(rect.right() - 3.0 * size.x, rect.top())
            }
            Direction::N => {
                self.body.velocity.y = g / 4.0;
                Vec2::new(rect.center().x, rect.top())
            }
            Direction::W => {
                self.body.velocity.x = walk;
                self.facing_left = false;
                self.play(PlayerState::Walk);
                Vec2::new(rect.left() - rect.w + size.y / 2.0, rect.bottom() - size.y)
            }
            Direction::E => {
                self.body.velocity.x = -walk;
                self.facing_left = true;
                self.play(PlayerState::Walk);
                Vec2::new(rect.right() - size.y / 2.0, rect.bottom() - size.y)
            }
        };

        self.body.teleport(self.config.collider.position_for(collider_min));
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::Action;
    use super::*;
    use crate::collision::Aabb;
    use crate::entity::WorldView;
    use crate::level::LevelColliders;

    fn east_exit() -> Transition {
        Transition {
            collider: Aabb::new(400.0, 0.0, 20.0, 300.0),
            to_level: "next".to_string(),
            to_transition: 0,
            direction: Direction::E,
        }
    }

    #[test]
    fn test_exit_countdown_surfaces_transition_once() {
        let mut h = Harness::new();
        let mut colliders = flat_floor();
        colliders.transitions.push(east_exit());

        let mut player = standing_player();
        player.body.teleport(player.config.collider.position_for(Vec2::new(395.0, 270.25)));

        let frames = player.config.transition_frames;
        let mut surfaced = Vec::new();
        for tick in 0..frames + 5 {
            let world = WorldView::new(&colliders, player.collider());
            let signal = h.step(&mut player, &world);
            if tick == 0 {
                assert!(player.walk_velocity().x > 0.0, "east exit walks right");
            }
            if let Some(transition) = signal.transition {
                surfaced.push((tick, transition));
            }
        }

        assert_eq!(surfaced.len(), 1, "transition must be surfaced exactly once");
        assert_eq!(surfaced[0].0, frames - 1);
        assert_eq!(surfaced[0].1.to_level, "next");
    }

    #[test]
    fn test_north_exit_has_minimum_upward_speed() {
        let mut h = Harness::new();
        let mut player = standing_player();
        player.body.velocity.y = -10.0;

        let north = Transition {
            direction: Direction::N,
            ..east_exit()
        };
        player.begin_exit(north, &mut h.audio);

        assert_eq!(player.velocity().x, 0.0);
        assert_eq!(player.velocity().y, -player.config.gravity.y / 5.0);
        assert!(h.audio.is_playing(AudioCue::Falling));
    }

    #[test]
    fn test_arrival_from_east_faces_left_inside_rect() {
        let mut player = standing_player();
        let arrival = east_exit();
        player.arrive_via(&arrival);

        let size = player.config.collider.size;
        assert!(player.facing_left());
        assert_eq!(player.state(), PlayerState::Walk);
        assert_eq!(player.velocity().x, -player.config.walk_speed);
        assert_eq!(player.transition_frames(), player.config.transition_frames);
        assert!(player.pending_transition().is_none());
        assert!(player
            .collider()
            .min()
            .abs_diff_eq(Vec2::new(420.0 - size.y / 2.0, 300.0 - size.y), 1e-4));
    }

    #[test]
    fn test_arrival_countdown_suppresses_jump() {
        let mut h = Harness::new();
        let colliders = LevelColliders::default();
        let mut player = standing_player();
        player.arrive_via(&Transition {
            direction: Direction::S,
            ..east_exit()
        });
        assert!(player.velocity().y < 0.0, "south arrival pops the player upward");

        let world = WorldView::new(&colliders, player.collider());
        h.step(&mut player, &world);
        player.on_ground = true;
        h.press(&mut player, Action::Jump);
        assert!(!player.jumping);
    }
}
