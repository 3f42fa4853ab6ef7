//! Asset loading for the dental viewer.
//!
//! Settings are resolved first (JSON asset or compiled-in defaults), then the
//! glTF scene is spawned and its mesh nodes are registered into the scene
//! graph.

/// glTF scene spawning, mesh node registration and load failure reporting.
pub mod model_loader;

/// Viewer tuning asset with compiled-in fallbacks.
pub mod settings;
