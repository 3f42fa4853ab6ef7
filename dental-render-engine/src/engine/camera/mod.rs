//! Camera control for the dental viewer.
//!
//! The rig owns scripted moves (focus on a tooth, return home); the orbit
//! controller handles user rotation, zoom and auto-rotate in between.

/// Orbit camera resource and the per-frame controller system.
pub mod orbit_camera;
/// Single active camera animation with a generation counter.
pub mod rig;
