//! Components shared between the simulation and its hosts

pub mod camera;

pub use camera::{Camera, CameraConfig};
