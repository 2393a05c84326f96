//! AABB geometry and collision resolution
//!
//! Pure functions over [`Aabb`]: no entity state, no side effects beyond a
//! warning log when the fast-mover override kicks in.

mod aabb;
mod resolve;

pub use aabb::{Aabb, CONTACT_EPSILON};
pub use resolve::{
    floor_probe, is_on_floor, sweep_solids, Axis, Contact, ContactResponse, PushOut, Sweep,
};
