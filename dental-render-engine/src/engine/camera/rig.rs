use bevy::math::Vec3;
use bevy::math::curve::{Curve, EaseFunction, EasingCurve};

/// Easing curves used by camera moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    EaseInOut,
    EaseOut,
}

impl Easing {
    fn function(self) -> EaseFunction {
        match self {
            Self::EaseInOut => EaseFunction::QuadraticInOut,
            Self::EaseOut => EaseFunction::QuadraticOut,
        }
    }

    pub fn apply(self, t: f32) -> f32 {
        EasingCurve::new(0.0_f32, 1.0, self.function()).sample_clamped(t)
    }
}

/// The single in-flight camera move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAnimation {
    pub start_time: f32,
    pub duration: f32,
    pub start: Vec3,
    pub end: Vec3,
    pub easing: Easing,
    pub generation: u64,
}

impl CameraAnimation {
    /// Linear progress in `[0, 1]`.
    pub fn progress(&self, now: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
    }

    pub fn sample(&self, now: f32) -> Vec3 {
        self.start.lerp(self.end, self.easing.apply(self.progress(now)))
    }
}

/// What the camera should do this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraFrame {
    /// No animation; the orbit controls own the camera.
    Idle,
    Moving(Vec3),
    /// Last frame of an animation.
    Finished(Vec3),
}

/// Camera position owned by the viewer core. The shell copies it onto the
/// Bevy camera and writes orbit-driven positions back.
#[derive(Debug, Clone)]
pub struct CameraRig {
    position: Vec3,
    home: Vec3,
    animation: Option<CameraAnimation>,
    generation: u64,
    // Highest progress sampled for the current animation.
    last_progress: f32,
}

impl CameraRig {
    pub fn new(home: Vec3) -> Self {
        Self {
            position: home,
            home,
            animation: None,
            generation: 0,
            last_progress: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn home(&self) -> Vec3 {
        self.home
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn animation(&self) -> Option<&CameraAnimation> {
        self.animation.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// True while `generation` is the latest move or snap.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Start a new move from the current position, superseding any other.
    pub fn animate_to(&mut self, end: Vec3, duration: f32, easing: Easing, now: f32) -> u64 {
        self.generation += 1;
        self.last_progress = 0.0;
        self.animation = Some(CameraAnimation {
            start_time: now,
            duration,
            start: self.position,
            end,
            easing,
            generation: self.generation,
        });
        self.generation
    }

    /// Jump without animating. Cancels whatever move was running.
    pub fn snap_to(&mut self, position: Vec3) -> u64 {
        self.generation += 1;
        self.animation = None;
        self.position = position;
        self.generation
    }

    /// Orbit controls moved the camera. Ignored while animating.
    pub fn set_position(&mut self, position: Vec3) {
        if self.animation.is_none() {
            self.position = position;
        }
    }

    /// Sample the active animation once for this frame.
    pub fn advance(&mut self, now: f32) -> CameraFrame {
        let Some(animation) = self.animation else {
            return CameraFrame::Idle;
        };

        let progress = animation.progress(now).max(self.last_progress);
        self.last_progress = progress;
        self.position = animation
            .start
            .lerp(animation.end, animation.easing.apply(progress));

        if progress >= 1.0 {
            self.animation = None;
            self.position = animation.end;
            CameraFrame::Finished(self.position)
        } else {
            CameraFrame::Moving(self.position)
        }
    }

    #[cfg(test)]
    pub fn last_progress(&self) -> f32 {
        self.last_progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animation_reaches_end_and_goes_idle() {
        let mut rig = CameraRig::new(Vec3::ZERO);
        rig.animate_to(Vec3::X, 1.0, Easing::EaseInOut, 0.0);

        assert!(matches!(rig.advance(0.5), CameraFrame::Moving(_)));
        assert_eq!(rig.advance(1.2), CameraFrame::Finished(Vec3::X));
        assert_eq!(rig.advance(1.3), CameraFrame::Idle);
        assert_eq!(rig.position(), Vec3::X);
    }

    #[test]
    fn new_animation_supersedes_previous_generation() {
        let mut rig = CameraRig::new(Vec3::ZERO);
        let first = rig.animate_to(Vec3::X, 1.0, Easing::EaseOut, 0.0);
        rig.advance(0.5);
        let second = rig.animate_to(Vec3::Y, 1.0, Easing::EaseOut, 0.5);

        assert!(!rig.is_current(first));
        assert!(rig.is_current(second));
        // The new move starts where the old one was interrupted.
        let start = rig.animation().unwrap().start;
        assert!(start.x > 0.0 && start.x < 1.0);
    }

    #[test]
    fn snap_cancels_animation() {
        let mut rig = CameraRig::new(Vec3::ZERO);
        let moving = rig.animate_to(Vec3::X, 1.0, Easing::EaseOut, 0.0);
        rig.snap_to(Vec3::Z);

        assert!(!rig.is_current(moving));
        assert!(!rig.is_animating());
        assert_eq!(rig.advance(0.5), CameraFrame::Idle);
        assert_eq!(rig.position(), Vec3::Z);
    }

    #[test]
    fn progress_is_clamped_and_monotonic() {
        let mut rig = CameraRig::new(Vec3::ZERO);
        rig.animate_to(Vec3::X, 1.0, Easing::EaseInOut, 10.0);

        rig.advance(9.0);
        assert_eq!(rig.last_progress(), 0.0);
        rig.advance(10.6);
        let ahead = rig.last_progress();
        // A timestamp from the past cannot move the camera backwards.
        rig.advance(10.2);
        assert_eq!(rig.last_progress(), ahead);
        assert!((rig.position().x - Easing::EaseInOut.apply(0.6)).abs() < 1e-5);
    }

    #[test]
    fn orbit_writes_are_ignored_while_animating() {
        let mut rig = CameraRig::new(Vec3::ZERO);
        rig.animate_to(Vec3::X, 1.0, Easing::EaseOut, 0.0);
        rig.set_position(Vec3::splat(9.0));
        assert_eq!(rig.position(), Vec3::ZERO);
    }

    #[test]
    fn easing_curves_hit_endpoints() {
        for easing in [Easing::EaseInOut, Easing::EaseOut] {
            assert!(easing.apply(0.0).abs() < 1e-6);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
        }
        assert!(Easing::EaseOut.apply(0.5) > 0.5);
    }
}
