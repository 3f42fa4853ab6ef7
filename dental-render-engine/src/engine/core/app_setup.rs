use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy::render::camera::{PerspectiveProjection, Projection};
use bevy_common_assets::json::JsonAssetPlugin;
use constants::camera::{CAMERA_FAR, CAMERA_NEAR};
use constants::render_settings::*;

// Crate engine modules
use crate::engine::camera::orbit_camera::{OrbitCamera, camera_controller};
use crate::engine::core::app_state::{AppState, spawn_loading_text, transition_to_running};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::model_loader::{
    ModelLoader, model_registered, report_model_failure, spawn_model,
};
use crate::engine::loading::settings::{
    SettingsLoader, ViewerSettings, resolve_settings, start_settings_load,
};
use crate::engine::mirror::{SceneBindings, mirror_scene};
use crate::engine::viewer_state::ViewerState;
// Crate tools modules
use crate::tools::{
    control_panel::{control_button_interaction, reflect_control_state, spawn_control_panel},
    interaction::{
        cursor::apply_cursor_style,
        picking::{PointerTracker, pointer_picking},
    },
    tooth_tag::{close_button_interaction, spawn_tooth_tag, update_tooth_tag},
    viewer_commands::{
        AutoRotateChangedEvent, InteractionEffectEvent, ViewModeChangedEvent, ViewerCommandEvent,
        handle_viewer_commands, handle_viewer_keyboard_shortcuts,
    },
};
// Web RPC
use crate::rpc::web_rpc::WebRpcPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Viewer tuning overrides from `viewer.settings.json`.
        .add_plugins(JsonAssetPlugin::<ViewerSettings>::new(&["settings.json"]))
        .add_plugins(WebRpcPlugin)
        .insert_resource(ClearColor(CLEAR_COLOUR))
        .insert_resource(AmbientLight {
            color: AMBIENT_COLOUR,
            brightness: AMBIENT_BRIGHTNESS,
            ..default()
        });

    // Initialise resources early; model registration replaces the viewer
    // state and orbit camera with ones built from the loaded settings.
    app.init_resource::<SettingsLoader>()
        .init_resource::<ModelLoader>()
        .init_resource::<ViewerState>()
        .init_resource::<OrbitCamera>()
        .init_resource::<SceneBindings>()
        .init_resource::<PointerTracker>()
        .add_event::<ViewerCommandEvent>()
        .add_event::<InteractionEffectEvent>()
        .add_event::<ViewModeChangedEvent>()
        .add_event::<AutoRotateChangedEvent>();

    app.add_systems(
        Startup,
        (setup, spawn_loading_text, spawn_tooth_tag, start_settings_load),
    )
    .add_systems(
        Update,
        (
            resolve_settings,
            spawn_model,
            report_model_failure,
            transition_to_running.run_if(model_registered),
        )
            .chain()
            .run_if(in_state(AppState::Loading)),
    )
    .add_systems(
        OnEnter(AppState::Running),
        (configure_camera, spawn_control_panel),
    );

    // Input first, then the controllers, then everything that reads the result.
    let runtime_systems = (
        handle_viewer_keyboard_shortcuts, // Native shortcuts or no-op for WASM
        control_button_interaction,
        close_button_interaction,
        pointer_picking,
        handle_viewer_commands,
        camera_controller,
        mirror_scene,
        apply_cursor_style,
        update_tooth_tag,
        reflect_control_state,
    )
        .chain();

    app.add_systems(Update, runtime_systems.run_if(in_state(AppState::Running)));

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            color: KEY_LIGHT_COLOUR,
            illuminance: KEY_LIGHT_ILLUMINANCE,
            ..default()
        },
        Transform::from_xyz(5.0, 5.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        PointLight {
            color: FILL_LIGHT_COLOUR,
            intensity: FILL_LIGHT_INTENSITY,
            range: FILL_LIGHT_RANGE,
            ..default()
        },
        Transform::from_xyz(-5.0, -5.0, -5.0),
    ));
}

fn spawn_camera(commands: &mut Commands, settings: &ViewerSettings) {
    commands.spawn((
        Camera3d::default(),
        camera_projection(settings),
        Transform::from_translation(settings.camera_home())
            .looking_at(settings.orbit_target(), Vec3::Y),
    ));
}

fn camera_projection(settings: &ViewerSettings) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: settings.fov_degrees.to_radians(),
        near: CAMERA_NEAR,
        far: CAMERA_FAR,
        ..default()
    })
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands) {
    spawn_lighting(&mut commands);
    spawn_camera(&mut commands, &ViewerSettings::default());
}

/// Apply the resolved settings to the camera spawned with defaults.
fn configure_camera(
    settings: Res<ViewerSettings>,
    mut cameras: Query<(&mut Projection, &mut Transform), With<Camera3d>>,
) {
    let Ok((mut projection, mut transform)) = cameras.single_mut() else {
        return;
    };
    *projection = camera_projection(&settings);
    *transform = Transform::from_translation(settings.camera_home())
        .looking_at(settings.orbit_target(), Vec3::Y);
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
