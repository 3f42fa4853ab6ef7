use bevy::prelude::*;

use crate::engine::camera::rig::CameraRig;
use crate::engine::loading::settings::ViewerSettings;
use crate::engine::scene::graph::SceneGraph;
use crate::tools::interaction::state::InteractionState;
use crate::tools::view_transition::SceneTransitionState;

/// Numbers the interaction and view controllers read.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionTuning {
    pub home: Vec3,
    pub focus_offset: Vec3,
    pub selected_tag_offset_x: f32,
    pub upper_tag_lift: f32,
    pub lower_tag_lift: f32,
    pub hover_emissive_intensity: f32,
    pub selected_emissive_intensity: f32,
    pub camera_animation_seconds: f32,
    pub view_transition_seconds: f32,
    pub clone_grid_spacing: f32,
}

impl InteractionTuning {
    pub fn from_settings(settings: &ViewerSettings) -> Self {
        Self {
            home: settings.camera_home(),
            focus_offset: settings.focus_offset(),
            selected_tag_offset_x: settings.selected_tag_offset_x,
            upper_tag_lift: settings.upper_tag_lift,
            lower_tag_lift: settings.lower_tag_lift,
            hover_emissive_intensity: settings.hover_emissive_intensity,
            selected_emissive_intensity: settings.selected_emissive_intensity,
            camera_animation_seconds: settings.camera_animation_seconds,
            view_transition_seconds: settings.view_transition_seconds,
            clone_grid_spacing: settings.clone_grid_spacing,
        }
    }
}

impl Default for InteractionTuning {
    fn default() -> Self {
        Self::from_settings(&ViewerSettings::default())
    }
}

/// Everything the viewer core owns. Lives from model registration until the
/// app exits.
#[derive(Resource, Debug)]
pub struct ViewerState {
    pub scene: SceneGraph,
    pub interaction: InteractionState,
    pub view: SceneTransitionState,
    pub camera: CameraRig,
    pub tuning: InteractionTuning,
}

impl ViewerState {
    pub fn new(scene: SceneGraph, tuning: InteractionTuning) -> Self {
        Self {
            scene,
            interaction: InteractionState::default(),
            view: SceneTransitionState::default(),
            camera: CameraRig::new(tuning.home),
            tuning,
        }
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(SceneGraph::new(), InteractionTuning::default())
    }
}
