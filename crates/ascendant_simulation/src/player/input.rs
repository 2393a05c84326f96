//! Player input handling
//!
//! Runs after the physics step each tick. While the simulation is frozen or
//! paused only [`Player::handle_input_static`] runs, so held-key state never
//! misses a release.

use bevy::math::Vec2;

use super::{Player, PlayerState};
use crate::audio::{AudioCue, AudioSink};
use crate::combat::AttackKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Jump,
    Attack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(Action),
    Released(Action),
}

/// Held state per action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub attack: bool,
}

impl KeyState {
    fn slot(&mut self, action: Action) -> &mut bool {
        match action {
            Action::Up => &mut self.up,
            Action::Down => &mut self.down,
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
            Action::Jump => &mut self.jump,
            Action::Attack => &mut self.attack,
        }
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pressed(action) => *self.slot(action) = true,
            InputEvent::Released(action) => *self.slot(action) = false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputOutcome {
    /// Player sat down at a save point this tick
    pub save_requested: bool,
}

impl Player {
    /// Held-key bookkeeping only, no actions.
    pub fn handle_input_static(&mut self, events: &[InputEvent]) {
        for event in events {
            self.keys.apply(*event);
        }
    }

    pub fn handle_input(&mut self, events: &[InputEvent], audio: &mut dyn AudioSink) -> InputOutcome {
        let mut outcome = InputOutcome::default();

        for event in events {
            match *event {
                InputEvent::Released(_) => self.keys.apply(*event),
                InputEvent::Pressed(Action::Up) => {
                    self.keys.up = true;
                    if self.state() == PlayerState::Sit {
                        self.play(PlayerState::Unsit);
                    }
                }
                InputEvent::Pressed(Action::Down) => {
                    self.keys.down = true;
                    if self.press_down(audio) {
                        outcome.save_requested = true;
                    }
                }
                InputEvent::Pressed(action @ (Action::Left | Action::Right)) => {
                    self.keys.apply(InputEvent::Pressed(action));
                    if self.state() == PlayerState::Sit {
                        self.play(PlayerState::Unsit);
                    }
                }
                InputEvent::Pressed(Action::Attack) => {
                    if self.state() == PlayerState::Sit {
                        self.play(PlayerState::Unsit);
                    } else {
                        self.keys.attack = true;
                        self.try_attack(audio);
                    }
                }
                InputEvent::Pressed(Action::Jump) => {
                    if self.state() == PlayerState::Sit {
                        self.play(PlayerState::Unsit);
                    } else {
                        self.keys.jump = true;
                        self.try_jump(audio);
                    }
                }
            }
        }

        outcome
    }

    /// Down toggles sitting at a save point; elsewhere it can turn an early
    /// airborne side slash into a down slash. Returns whether a save happened.
    fn press_down(&mut self, audio: &mut dyn AudioSink) -> bool {
        let state = self.state();

        if self.can_save && state != PlayerState::Death {
            if state == PlayerState::Sit {
                self.play(PlayerState::Unsit);
                return false;
            }
            self.body.velocity = Vec2::ZERO;
            self.walk_velocity = Vec2::ZERO;
            self.play(PlayerState::Sit);
            return true;
        }

        if state == PlayerState::Attack0
            && self.animation.is_playing()
            && self.frame() < self.config.late_down_slash_frames
            && !self.on_ground
        {
            audio.stop(AudioCue::Attack, 50);
            audio.play(AudioCue::BigAttack, 50);
            self.play(PlayerState::Attack2);
        }
        false
    }

    fn try_attack(&mut self, audio: &mut dyn AudioSink) {
        let state = self.state();
        if state == PlayerState::Death {
            return;
        }
        // One swing at a time: the running one must end or be interrupted first
        if state.is_attack() && self.animation.is_playing() {
            return;
        }

        let kind = if self.keys.down && !self.on_ground {
            AttackKind::Down
        } else if self.keys.up {
            AttackKind::Up
        } else {
            AttackKind::Side
        };

        match kind {
            AttackKind::Side => audio.play(AudioCue::Attack, 200),
            AttackKind::Up | AttackKind::Down => audio.play(AudioCue::BigAttack, 200),
        }
        self.can_attack = true;
        self.play(PlayerState::for_attack(kind));
    }

    /// Returns whether the jump started.
    pub(super) fn try_jump(&mut self, audio: &mut dyn AudioSink) -> bool {
        let grounded = self.on_ground || self.jump_grace_frames > 0;
        if !grounded || self.transition_frames > 0 || self.state() == PlayerState::Death {
            return false;
        }

        self.jumping = true;
        self.jump_add_time = 0.0;
        self.jump_grace_frames = 0;
        // Keep the damage clip visible through iframes
        if self.iframes == 0 {
            self.play(PlayerState::Jump);
        }
        self.body.velocity.y += self.config.jump_speed;
        audio.play(AudioCue::Jump, 0);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::entity::WorldView;

    #[test]
    fn test_grace_frame_jump_succeeds_then_expires() {
        let mut h = Harness::new();
        let mut player = standing_player();
        player.on_ground = false;
        player.jump_grace_frames = 2;

        assert!(player.try_jump(&mut h.audio));
        assert!(player.jumping);
        assert!(player.velocity().y < 0.0);

        let mut late = standing_player();
        late.on_ground = false;
        late.jump_grace_frames = 0;
        assert!(!late.try_jump(&mut h.audio));
        assert_eq!(late.velocity().y, 0.0);
    }

    #[test]
    fn test_grace_frames_run_out_after_leaving_ledge() {
        let mut h = Harness::new();
        // Nothing underneath: free fall from the first tick
        let colliders = crate::level::LevelColliders::default();
        let mut player = standing_player();
        player.on_ground = true;
        player.jump_grace_frames = player.config.jump_grace_frames;

        let grace = player.config.jump_grace_frames;
        for _ in 0..grace {
            let world = WorldView::new(&colliders, player.collider());
            h.step(&mut player, &world);
        }
        assert!(!player.is_on_ground());
        assert_eq!(player.jump_grace_frames(), 0);

        h.press(&mut player, Action::Jump);
        assert!(!player.jumping, "jump must fail once grace is spent");
    }

    #[test]
    fn test_jump_blocked_during_transition() {
        let mut h = Harness::new();
        let mut player = standing_player();
        player.on_ground = true;
        player.transition_frames = 5;

        h.press(&mut player, Action::Jump);
        assert!(!player.jumping);
        assert!(player.keys().jump);
    }

    #[test]
    fn test_attack_direction_from_held_keys() {
        let mut h = Harness::new();

        let mut side = standing_player();
        h.press(&mut side, Action::Attack);
        assert_eq!(side.state(), PlayerState::Attack0);

        let mut up = standing_player();
        h.press(&mut up, Action::Up);
        h.press(&mut up, Action::Attack);
        assert_eq!(up.state(), PlayerState::Attack1);

        // Down only counts in the air
        let mut grounded_down = standing_player();
        grounded_down.on_ground = true;
        h.press(&mut grounded_down, Action::Down);
        h.press(&mut grounded_down, Action::Attack);
        assert_eq!(grounded_down.state(), PlayerState::Attack0);

        let mut airborne_down = standing_player();
        airborne_down.on_ground = false;
        h.press(&mut airborne_down, Action::Down);
        h.press(&mut airborne_down, Action::Attack);
        assert_eq!(airborne_down.state(), PlayerState::Attack2);
    }

    #[test]
    fn test_running_attack_blocks_new_attack() {
        let mut h = Harness::new();
        let mut player = standing_player();
        h.press(&mut player, Action::Attack);
        player.animation.seek_frame(3);

        h.press(&mut player, Action::Up);
        h.press(&mut player, Action::Attack);
        assert_eq!(player.state(), PlayerState::Attack0);
        assert_eq!(player.frame(), 3, "running swing must not restart");
    }

    #[test]
    fn test_late_down_slash() {
        let mut h = Harness::new();
        let mut player = standing_player();
        player.on_ground = false;
        h.press(&mut player, Action::Attack);
        player.animation.seek_frame(2);

        h.press(&mut player, Action::Down);
        assert_eq!(player.state(), PlayerState::Attack2);

        // Too late in the swing
        let mut late = standing_player();
        late.on_ground = false;
        h.press(&mut late, Action::Attack);
        late.animation.seek_frame(5);
        h.press(&mut late, Action::Down);
        assert_eq!(late.state(), PlayerState::Attack0);
    }

    #[test]
    fn test_save_sits_and_down_again_unsits() {
        let mut h = Harness::new();
        let mut player = standing_player();
        player.can_save = true;
        player.body.velocity = Vec2::new(30.0, 10.0);

        let outcome = h.press(&mut player, Action::Down);
        assert!(outcome.save_requested);
        assert_eq!(player.state(), PlayerState::Sit);
        assert_eq!(player.velocity(), Vec2::ZERO);

        h.release(&mut player, Action::Down);
        let outcome = h.press(&mut player, Action::Down);
        assert!(!outcome.save_requested);
        assert_eq!(player.state(), PlayerState::Unsit);
    }

    #[test]
    fn test_direction_press_stands_up_from_save() {
        let mut h = Harness::new();
        let colliders = flat_floor();
        let mut player = standing_player();
        player.can_save = true;

        h.press(&mut player, Action::Down);
        h.release(&mut player, Action::Down);
        assert_eq!(player.state(), PlayerState::Sit);
        let seated_x = player.position().x;

        h.press(&mut player, Action::Right);
        assert_eq!(player.state(), PlayerState::Unsit);
        assert!(player.keys().right);

        for _ in 0..60 {
            let world = WorldView::new(&colliders, player.collider());
            h.step(&mut player, &world);
        }
        assert_eq!(player.state(), PlayerState::Walk);
        assert!(player.position().x > seated_x, "held direction walks once standing");
    }

    #[test]
    fn test_static_input_only_tracks_keys() {
        let mut player = standing_player();
        player.on_ground = true;
        player.handle_input_static(&[
            InputEvent::Pressed(Action::Jump),
            InputEvent::Pressed(Action::Left),
        ]);

        assert!(player.keys().jump);
        assert!(player.keys().left);
        assert!(!player.jumping);
        assert_eq!(player.state(), PlayerState::Idle);

        player.handle_input_static(&[InputEvent::Released(Action::Left)]);
        assert!(!player.keys().left);
    }
}
