pub mod camera;
pub mod core;
pub mod loading;
pub mod materials;
pub mod mirror;
pub mod scene;
pub mod viewer_state;
