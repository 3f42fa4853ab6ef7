use std::f32::consts::TAU;

use bevy::input::mouse::MouseScrollUnit;
use bevy::{
    input::mouse::{MouseMotion, MouseWheel},
    prelude::*,
};

use crate::engine::camera::rig::CameraFrame;
use crate::engine::loading::settings::ViewerSettings;
use crate::engine::viewer_state::ViewerState;

/// Orbit controls around a fixed target, with damping and auto-rotate.
///
/// Angles are spherical: `yaw` around +Y measured from +Z, `polar` down from
/// +Y. Input accumulates into deltas that are bled off every frame.
#[derive(Resource, Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub polar: f32,
    pub distance: f32,
    pub yaw_delta: f32,
    pub polar_delta: f32,
    pub zoom_scale: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub rotate_sensitivity: f32,
    pub zoom_sensitivity: f32,
    home_target: Vec3,
    home_position: Vec3,
    // Rig generation the angles were last derived from.
    synced_generation: u64,
}

impl OrbitCamera {
    pub fn from_settings(settings: &ViewerSettings) -> Self {
        let mut orbit = Self {
            target: settings.orbit_target(),
            yaw: 0.0,
            polar: std::f32::consts::FRAC_PI_2,
            distance: settings.min_distance,
            yaw_delta: 0.0,
            polar_delta: 0.0,
            zoom_scale: 1.0,
            auto_rotate: settings.auto_rotate,
            auto_rotate_speed: settings.auto_rotate_speed,
            damping: settings.damping,
            min_distance: settings.min_distance,
            max_distance: settings.max_distance,
            min_polar: settings.min_polar_angle,
            max_polar: settings.max_polar_angle,
            rotate_sensitivity: settings.rotate_sensitivity,
            zoom_sensitivity: settings.zoom_sensitivity,
            home_target: settings.orbit_target(),
            home_position: settings.camera_home(),
            synced_generation: 0,
        };
        orbit.set_from_position(settings.camera_home());
        orbit
    }

    /// Derive the angles from a camera position, clamped into the limits.
    /// Pending input is dropped.
    pub fn set_from_position(&mut self, position: Vec3) {
        let offset = position - self.target;
        let distance = offset.length();
        if distance > f32::EPSILON {
            self.yaw = offset.x.atan2(offset.z);
            self.polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
        }
        self.distance = distance.clamp(self.min_distance, self.max_distance);
        self.polar = self.polar.clamp(self.min_polar, self.max_polar);
        self.yaw_delta = 0.0;
        self.polar_delta = 0.0;
        self.zoom_scale = 1.0;
    }

    pub fn position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + self.distance
                * Vec3::new(
                    sin_polar * self.yaw.sin(),
                    self.polar.cos(),
                    sin_polar * self.yaw.cos(),
                )
    }

    /// Pointer drag in pixels.
    pub fn rotate(&mut self, drag: Vec2) {
        self.yaw_delta -= drag.x * self.rotate_sensitivity;
        self.polar_delta -= drag.y * self.rotate_sensitivity;
    }

    /// Positive steps zoom in.
    pub fn zoom(&mut self, steps: f32) {
        self.zoom_scale *= (1.0 - self.zoom_sensitivity).powf(steps);
    }

    /// Back to the home framing, motion and auto-rotate stopped.
    pub fn reset(&mut self) {
        self.target = self.home_target;
        self.auto_rotate = false;
        self.set_from_position(self.home_position);
    }

    fn auto_rotate_angle(&self, dt: f32) -> f32 {
        TAU / 60.0 * self.auto_rotate_speed * dt
    }

    /// Apply accumulated input for one frame.
    pub fn update(&mut self, dt: f32) {
        if self.auto_rotate {
            self.yaw_delta -= self.auto_rotate_angle(dt);
        }

        self.yaw += self.yaw_delta * self.damping;
        self.polar += self.polar_delta * self.damping;
        self.yaw_delta *= 1.0 - self.damping;
        self.polar_delta *= 1.0 - self.damping;

        self.polar = self.polar.clamp(self.min_polar, self.max_polar);
        self.distance = (self.distance * self.zoom_scale).clamp(self.min_distance, self.max_distance);
        self.zoom_scale = 1.0;
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_settings(&ViewerSettings::default())
    }
}

fn place_camera(transform: &mut Mut<Transform>, position: Vec3, target: Vec3) {
    let placed = Transform::from_translation(position).looking_at(target, Vec3::Y);
    transform.set_if_neq(placed);
}

/// Drives the camera. Rig animations take priority; otherwise the orbit
/// controls move it and the rig follows.
pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut orbit: ResMut<OrbitCamera>,
    mut viewer: ResMut<ViewerState>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    // Read mouse motion
    let drag: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    // Mouse wheel scroll accumulation (pixel and line scroll)
    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    match viewer.camera.advance(time.elapsed_secs()) {
        CameraFrame::Moving(position) => {
            place_camera(&mut camera_transform, position, orbit.target);
            return;
        }
        CameraFrame::Finished(position) => {
            orbit.set_from_position(position);
            orbit.synced_generation = viewer.camera.generation();
            place_camera(&mut camera_transform, position, orbit.target);
            return;
        }
        CameraFrame::Idle => {}
    }

    // A snap happened since the last frame.
    if orbit.synced_generation != viewer.camera.generation() {
        let position = viewer.camera.position();
        orbit.set_from_position(position);
        orbit.synced_generation = viewer.camera.generation();
    }

    if mouse_button.pressed(MouseButton::Left) && drag != Vec2::ZERO {
        orbit.rotate(drag);
    }
    if scroll_accum.abs() > f32::EPSILON {
        orbit.zoom(scroll_accum);
    }
    orbit.update(time.delta_secs());

    let position = orbit.position();
    if viewer.camera.position() != position {
        viewer.camera.set_position(position);
    }
    place_camera(&mut camera_transform, position, orbit.target);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_position_round_trips() {
        let orbit = OrbitCamera::default();
        let home = ViewerSettings::default().camera_home();
        assert!((orbit.position() - home).length() < 1e-5);
    }

    #[test]
    fn distance_and_polar_are_clamped() {
        let mut orbit = OrbitCamera::default();
        orbit.set_from_position(Vec3::new(0.0, 5.0, 0.01));
        assert!(orbit.distance <= orbit.max_distance);
        assert!(orbit.polar >= orbit.min_polar - 1e-6);

        for _ in 0..200 {
            orbit.zoom(10.0);
            orbit.update(0.016);
        }
        assert!((orbit.distance - orbit.min_distance).abs() < 1e-5);
    }

    #[test]
    fn auto_rotate_advances_yaw() {
        let mut orbit = OrbitCamera::default();
        let start = orbit.yaw;
        orbit.auto_rotate = true;
        for _ in 0..60 {
            orbit.update(1.0 / 60.0);
        }
        assert!(orbit.yaw < start);
    }

    #[test]
    fn damping_bleeds_off_drag() {
        let mut orbit = OrbitCamera::default();
        orbit.rotate(Vec2::new(100.0, 0.0));
        for _ in 0..400 {
            orbit.update(0.016);
        }
        assert!(orbit.yaw_delta.abs() < 1e-3);
        assert!(orbit.yaw < 0.0);
    }

    #[test]
    fn reset_restores_home_and_stops_rotation() {
        let mut orbit = OrbitCamera::default();
        orbit.auto_rotate = true;
        orbit.rotate(Vec2::new(50.0, 20.0));
        orbit.update(0.5);
        orbit.reset();

        assert!(!orbit.auto_rotate);
        assert!((orbit.position() - ViewerSettings::default().camera_home()).length() < 1e-5);
    }
}
