use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::camera::*;
use constants::interaction::*;
use constants::model_hierarchy::MODEL_PATH;
use serde::Deserialize;

pub const SETTINGS_PATH: &str = "viewer.settings.json";

/// Viewer tuning. Every field falls back to the compiled-in constant when
/// the JSON asset leaves it out.
#[derive(Asset, TypePath, Resource, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ViewerSettings {
    pub model_path: String,
    pub camera_home: [f32; 3],
    pub fov_degrees: f32,
    pub orbit_target: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub damping: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub rotate_sensitivity: f32,
    pub zoom_sensitivity: f32,
    pub focus_offset: [f32; 3],
    pub selected_tag_offset_x: f32,
    pub upper_tag_lift: f32,
    pub lower_tag_lift: f32,
    pub hover_emissive_intensity: f32,
    pub selected_emissive_intensity: f32,
    pub camera_animation_seconds: f32,
    pub view_transition_seconds: f32,
    pub double_click_seconds: f32,
    pub clone_grid_spacing: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            model_path: MODEL_PATH.to_string(),
            camera_home: CAMERA_HOME,
            fov_degrees: CAMERA_FOV_DEGREES,
            orbit_target: ORBIT_TARGET,
            min_distance: ORBIT_MIN_DISTANCE,
            max_distance: ORBIT_MAX_DISTANCE,
            min_polar_angle: ORBIT_MIN_POLAR,
            max_polar_angle: ORBIT_MAX_POLAR,
            damping: ORBIT_DAMPING,
            auto_rotate: false,
            auto_rotate_speed: ORBIT_AUTO_ROTATE_SPEED,
            rotate_sensitivity: ORBIT_ROTATE_SENSITIVITY,
            zoom_sensitivity: ORBIT_ZOOM_SENSITIVITY,
            focus_offset: FOCUS_OFFSET,
            selected_tag_offset_x: SELECTED_TAG_OFFSET_X,
            upper_tag_lift: UPPER_TAG_LIFT,
            lower_tag_lift: LOWER_TAG_LIFT,
            hover_emissive_intensity: HOVER_EMISSIVE_INTENSITY,
            selected_emissive_intensity: SELECTED_EMISSIVE_INTENSITY,
            camera_animation_seconds: CAMERA_ANIMATION_SECONDS,
            view_transition_seconds: VIEW_TRANSITION_SECONDS,
            double_click_seconds: DOUBLE_CLICK_SECONDS,
            clone_grid_spacing: CLONE_GRID_SPACING,
        }
    }
}

impl ViewerSettings {
    pub fn camera_home(&self) -> Vec3 {
        Vec3::from_array(self.camera_home)
    }

    pub fn orbit_target(&self) -> Vec3 {
        Vec3::from_array(self.orbit_target)
    }

    pub fn focus_offset(&self) -> Vec3 {
        Vec3::from_array(self.focus_offset)
    }
}

#[derive(Resource, Default)]
pub struct SettingsLoader {
    pub handle: Option<Handle<ViewerSettings>>,
    pub resolved: bool,
}

pub fn start_settings_load(mut loader: ResMut<SettingsLoader>, asset_server: Res<AssetServer>) {
    info!("Loading viewer settings from: {}", SETTINGS_PATH);
    loader.handle = Some(asset_server.load(SETTINGS_PATH));
}

/// Publish the settings resource once the asset arrives, or fall back to
/// the defaults when it is missing or malformed.
pub fn resolve_settings(
    mut commands: Commands,
    mut loader: ResMut<SettingsLoader>,
    asset_server: Res<AssetServer>,
    settings_assets: Res<Assets<ViewerSettings>>,
) {
    if loader.resolved {
        return;
    }
    let Some(handle) = loader.handle.clone() else {
        return;
    };

    if let Some(settings) = settings_assets.get(&handle) {
        info!("Viewer settings loaded");
        commands.insert_resource(settings.clone());
        loader.resolved = true;
    } else if let Some(LoadState::Failed(err)) = asset_server.get_load_state(&handle) {
        warn!("Viewer settings unavailable ({err}), using defaults");
        commands.insert_resource(ViewerSettings::default());
        loader.resolved = true;
    }
}
