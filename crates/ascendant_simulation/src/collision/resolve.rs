//! Minimal-translation push-out against static solids
//!
//! For an overlapping pair, each axis has two candidate pushes (out through
//! either side); the smaller-magnitude one is that axis' candidate, and the
//! smaller of the two axis candidates is the one applied. Fast movers skip
//! minimisation on the offending axis and are pushed back against their
//! velocity instead. A body moving more than its own span per tick can still
//! pass through a thin solid without ever overlapping it; that case is not
//! detected.

use bevy::math::Vec2;

use super::Aabb;
use crate::logger::log_warning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Push-out candidates for one overlapping pair. Positive x moves right,
/// positive y moves down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushOut {
    pub x: f32,
    pub y: f32,
}

impl PushOut {
    pub fn minimal(body: &Aabb, solid: &Aabb) -> Self {
        Self {
            x: min_abs(solid.left() - body.right(), solid.right() - body.left()),
            y: min_abs(solid.top() - body.bottom(), solid.bottom() - body.top()),
        }
    }

    /// Like [`PushOut::minimal`], but an axis on which the body travels more
    /// than half its own size this tick is pushed out opposite the velocity.
    pub fn with_fast_mover_correction(body: &Aabb, solid: &Aabb, velocity: Vec2, dt: f32) -> Self {
        let mut push = Self::minimal(body, solid);

        if (velocity.x * dt).abs() > body.w / 2.0 {
            push.x = if velocity.x > 0.0 {
                solid.left() - body.right()
            } else {
                solid.right() - body.left()
            };
            log_warning(&format!(
                "fast mover on x: |v*dt|={:.2} > half width {:.2}, pushing out against velocity",
                (velocity.x * dt).abs(),
                body.w / 2.0
            ));
        }

        if (velocity.y * dt).abs() > body.h / 2.0 {
            push.y = if velocity.y > 0.0 {
                solid.top() - body.bottom()
            } else {
                solid.bottom() - body.top()
            };
            log_warning(&format!(
                "fast mover on y: |v*dt|={:.2} > half height {:.2}, pushing out against velocity",
                (velocity.y * dt).abs(),
                body.h / 2.0
            ));
        }

        push
    }

    /// Ties resolve on y so resting contact stays vertical.
    pub fn axis(&self) -> Axis {
        if self.x.abs() < self.y.abs() {
            Axis::X
        } else {
            Axis::Y
        }
    }

    pub fn shift(&self) -> Vec2 {
        match self.axis() {
            Axis::X => Vec2::new(self.x, 0.0),
            Axis::Y => Vec2::new(0.0, self.y),
        }
    }
}

/// Smaller magnitude of the two; the first wins ties.
fn min_abs(a: f32, b: f32) -> f32 {
    if b.abs() < a.abs() {
        b
    } else {
        a
    }
}

/// How a body's velocity reacts to a resolved contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactResponse {
    /// Zero the resolved component if it points into the surface.
    Inelastic { fast_movers: bool },
    /// Point the resolved component away from the surface, scaled by `retain`.
    Bounce { retain: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub solid: Aabb,
    pub push: PushOut,
}

impl Contact {
    pub fn axis(&self) -> Axis {
        self.push.axis()
    }

    pub fn shift(&self) -> Vec2 {
        self.push.shift()
    }

    pub fn apply(&self, response: ContactResponse, velocity: &mut Vec2) {
        let shift = self.shift();
        match response {
            ContactResponse::Inelastic { .. } => match self.axis() {
                Axis::X => {
                    if shift.x * velocity.x < 0.0 {
                        velocity.x = 0.0;
                    }
                }
                Axis::Y => {
                    if shift.y * velocity.y < 0.0 {
                        velocity.y = 0.0;
                    }
                }
            },
            ContactResponse::Bounce { retain } => match self.axis() {
                Axis::X => velocity.x = velocity.x.abs() * retain * shift.x.signum(),
                Axis::Y => velocity.y = velocity.y.abs() * retain * shift.y.signum(),
            },
        }
    }
}

/// Result of sweeping one collider against a solid list
#[derive(Debug, Clone, Default)]
pub struct Sweep {
    /// Total translation to add to the owner's position.
    pub shift: Vec2,
    pub contacts: Vec<Contact>,
}

/// Resolve `collider` against every solid it overlaps, in list order.
///
/// Each contact is computed against the collider as already shifted by the
/// previous contacts, and `velocity` is updated in place per contact.
pub fn sweep_solids(
    collider: Aabb,
    velocity: &mut Vec2,
    dt: f32,
    solids: &[Aabb],
    response: ContactResponse,
) -> Sweep {
    let mut sweep = Sweep::default();
    let mut current = collider;

    for solid in solids {
        if !current.overlaps(solid) {
            continue;
        }

        let push = match response {
            ContactResponse::Inelastic { fast_movers: true } => {
                PushOut::with_fast_mover_correction(&current, solid, *velocity, dt)
            }
            _ => PushOut::minimal(&current, solid),
        };
        let contact = Contact { solid: *solid, push };

        contact.apply(response, velocity);
        current = current.translate(contact.shift());
        sweep.shift += contact.shift();
        sweep.contacts.push(contact);
    }

    sweep
}

/// Thin probe under the feet: `w/1.6` wide, 1 px tall, centred.
pub fn floor_probe(collider: &Aabb) -> Aabb {
    let width = collider.w / 1.6;
    Aabb::new(
        collider.x + (collider.w - width) / 2.0,
        collider.bottom(),
        width,
        1.0,
    )
}

pub fn is_on_floor(collider: &Aabb, solids: &[Aabb]) -> bool {
    floor_probe(collider).overlaps_any(solids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_shallow_landing_resolves_vertically() {
        let platform = Aabb::new(0.0, 100.0, 200.0, 20.0);
        let body = Aabb::new(50.0, 72.0, 12.0, 30.0); // 2px into the platform

        let push = PushOut::minimal(&body, &platform);
        assert_eq!(push.axis(), Axis::Y);
        assert_eq!(push.shift(), Vec2::new(0.0, -2.0));
    }

    #[test]
    fn test_wall_contact_resolves_horizontally() {
        let wall = Aabb::new(100.0, 0.0, 20.0, 200.0);
        let body = Aabb::new(91.0, 50.0, 12.0, 30.0); // 3px into the wall

        let push = PushOut::minimal(&body, &wall);
        assert_eq!(push.axis(), Axis::X);
        assert_eq!(push.shift(), Vec2::new(-3.0, 0.0));
    }

    #[test]
    fn test_inelastic_only_cancels_velocity_into_surface() {
        let platform = Aabb::new(0.0, 100.0, 200.0, 20.0);
        let body = Aabb::new(50.0, 72.0, 12.0, 30.0);

        let mut falling = Vec2::new(40.0, 120.0);
        sweep_solids(body, &mut falling, DT, &[platform], ContactResponse::Inelastic { fast_movers: true });
        assert_eq!(falling, Vec2::new(40.0, 0.0));

        // Already moving away (e.g. a bounce): keep it
        let mut rising = Vec2::new(0.0, -80.0);
        sweep_solids(body, &mut rising, DT, &[platform], ContactResponse::Inelastic { fast_movers: true });
        assert_eq!(rising, Vec2::new(0.0, -80.0));
    }

    #[test]
    fn test_fast_mover_pushed_against_velocity() {
        // Thin platform; body has sunk more than half way through in one tick
        let platform = Aabb::new(0.0, 100.0, 200.0, 4.0);
        let body = Aabb::new(50.0, 100.0, 12.0, 30.0); // top at the platform top, 4px of overlap
        let velocity = Vec2::new(0.0, 1200.0); // 20 px per tick > 15

        let minimal = PushOut::minimal(&body, &platform);
        assert_eq!(minimal.y, 4.0, "minimal push would shove it through");

        let corrected = PushOut::with_fast_mover_correction(&body, &platform, velocity, DT);
        assert_eq!(corrected.y, 100.0 - 130.0);
    }

    #[test]
    fn test_bounce_reflects_with_retention() {
        let wall = Aabb::new(100.0, 0.0, 20.0, 200.0);
        let body = Aabb::new(91.0, 50.0, 12.0, 12.0);
        let mut velocity = Vec2::new(80.0, 10.0);

        sweep_solids(body, &mut velocity, DT, &[wall], ContactResponse::Bounce { retain: 0.5 });
        assert_eq!(velocity, Vec2::new(-40.0, 10.0));
    }

    #[test]
    fn test_sweep_empty_solids_is_noop() {
        let mut velocity = Vec2::new(1.0, 2.0);
        let sweep = sweep_solids(
            Aabb::new(0.0, 0.0, 10.0, 10.0),
            &mut velocity,
            DT,
            &[],
            ContactResponse::Inelastic { fast_movers: true },
        );
        assert_eq!(sweep.shift, Vec2::ZERO);
        assert!(sweep.contacts.is_empty());
        assert_eq!(velocity, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_floor_probe_geometry() {
        let body = Aabb::new(10.0, 20.0, 16.0, 30.0);
        let probe = floor_probe(&body);

        assert_eq!(probe.top(), 50.0);
        assert_eq!(probe.h, 1.0);
        assert_eq!(probe.w, 10.0);
        assert_eq!(probe.center().x, body.center().x);

        let floor = Aabb::new(0.0, 50.0, 100.0, 10.0);
        assert!(is_on_floor(&body, &[floor]));
        assert!(!is_on_floor(&body.translate(Vec2::new(0.0, -2.0)), &[floor]));
    }

    /// Seeded sweep over random overlapping pairs: the applied push is the
    /// smaller of the two axis candidates and leaves no overlap behind.
    #[test]
    fn test_resolution_minimality_random_pairs() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut checked = 0;

        while checked < 2000 {
            let solid = Aabb::new(
                rng.gen_range(-200.0..200.0),
                rng.gen_range(-200.0..200.0),
                rng.gen_range(1.0..150.0),
                rng.gen_range(1.0..150.0),
            );
            let body = Aabb::new(
                rng.gen_range(-250.0..250.0),
                rng.gen_range(-250.0..250.0),
                rng.gen_range(1.0..60.0),
                rng.gen_range(1.0..60.0),
            );
            if !body.overlaps(&solid) {
                continue;
            }

            let push = PushOut::minimal(&body, &solid);
            let shift = push.shift();
            let applied = shift.x.abs().max(shift.y.abs());
            assert_eq!(applied, push.x.abs().min(push.y.abs()));
            assert!(
                !body.translate(shift).overlaps(&solid),
                "{:?} still overlaps {:?} after {:?}",
                body,
                solid,
                shift
            );
            checked += 1;
        }
    }
}
