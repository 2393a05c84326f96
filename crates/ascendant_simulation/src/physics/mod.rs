//! Entity physics base: gravity, drag, integration, collider derivation

pub mod body;

pub use body::{Body, ColliderShape, Medium, Resistance};
