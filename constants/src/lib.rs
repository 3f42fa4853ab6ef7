pub mod camera;
pub mod interaction;
pub mod model_hierarchy;
pub mod render_settings;
