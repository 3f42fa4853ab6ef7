use std::f32::consts::PI;

/// Initial and home camera position.
pub const CAMERA_HOME: [f32; 3] = [0.0, 0.0, 0.4];
pub const CAMERA_FOV_DEGREES: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Point the orbit controls revolve around.
pub const ORBIT_TARGET: [f32; 3] = [0.0, 0.0, 0.0];
pub const ORBIT_MIN_DISTANCE: f32 = 0.4;
pub const ORBIT_MAX_DISTANCE: f32 = 1.0;
/// Polar angle limits, measured from +Y.
pub const ORBIT_MIN_POLAR: f32 = PI / 4.0;
pub const ORBIT_MAX_POLAR: f32 = PI * 0.75;
/// 2.0 corresponds to one full revolution every 30 seconds.
pub const ORBIT_AUTO_ROTATE_SPEED: f32 = 1.5;
pub const ORBIT_DAMPING: f32 = 0.05;
pub const ORBIT_ROTATE_SENSITIVITY: f32 = 0.005;
pub const ORBIT_ZOOM_SENSITIVITY: f32 = 0.05;
