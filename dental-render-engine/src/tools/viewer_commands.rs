use bevy::prelude::*;

use crate::engine::camera::orbit_camera::OrbitCamera;
use crate::engine::viewer_state::ViewerState;
use crate::tools::interaction::controller::{InteractionEffect, InteractionEvent, handle_event};
use crate::tools::view_transition::{ViewChange, ViewMode, change_view};

/// Viewer-level actions shared by the control panel, keyboard and RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    SetAutoRotate(bool),
    ToggleAutoRotate,
    ResetView,
    SetViewMode(ViewMode),
    CloseSelection,
}

/// Source of a command for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    Rpc,
    Ui,
    Pointer,
    Keyboard,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ViewerCommandEvent {
    pub command: ViewerCommand,
    pub source: CommandSource,
}

/// Effect produced by the interaction controller, fanned out to the cursor,
/// the tag panel and the RPC bridge.
#[derive(Event, Debug, Clone, Copy)]
pub struct InteractionEffectEvent(pub InteractionEffect);

/// Fired after a view-mode change was applied.
#[derive(Event, Debug, Clone, Copy)]
pub struct ViewModeChangedEvent {
    pub view: ViewMode,
    pub cleared_selection: bool,
}

/// Fired when auto-rotate flips.
#[derive(Event, Debug, Clone, Copy)]
pub struct AutoRotateChangedEvent {
    pub enabled: bool,
}

pub fn handle_viewer_commands(
    mut events: EventReader<ViewerCommandEvent>,
    mut viewer: ResMut<ViewerState>,
    mut orbit: ResMut<OrbitCamera>,
    mut effects: EventWriter<InteractionEffectEvent>,
    mut view_changes: EventWriter<ViewModeChangedEvent>,
    mut auto_rotate_changes: EventWriter<AutoRotateChangedEvent>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();

    for event in events.read() {
        debug!("Viewer command {:?} via {:?}", event.command, event.source);

        match event.command {
            ViewerCommand::SetAutoRotate(enabled) => {
                set_auto_rotate(&mut orbit, enabled, &mut auto_rotate_changes);
            }
            ViewerCommand::ToggleAutoRotate => {
                let enabled = !orbit.auto_rotate;
                set_auto_rotate(&mut orbit, enabled, &mut auto_rotate_changes);
            }
            ViewerCommand::ResetView => {
                if reset_view(&mut viewer, &mut orbit) {
                    auto_rotate_changes.write(AutoRotateChangedEvent { enabled: false });
                }
                info!("View reset via {:?}", event.source);
            }
            ViewerCommand::SetViewMode(view) => match change_view(&mut viewer, view, now) {
                ViewChange::Applied { cleared_selection } => {
                    if cleared_selection {
                        effects.write(InteractionEffectEvent(InteractionEffect::SelectionCleared));
                    }
                    view_changes.write(ViewModeChangedEvent {
                        view,
                        cleared_selection,
                    });
                }
                ViewChange::Busy => {
                    debug!("View change to {} ignored while settling", view.as_str());
                }
            },
            ViewerCommand::CloseSelection => {
                for effect in handle_event(&mut viewer, InteractionEvent::Close, now) {
                    effects.write(InteractionEffectEvent(effect));
                }
            }
        }
    }
}

/// Orbit back to its defaults and the rig snapped home. Selection is left
/// alone. Returns whether auto-rotate was switched off.
pub(crate) fn reset_view(viewer: &mut ViewerState, orbit: &mut OrbitCamera) -> bool {
    let was_rotating = orbit.auto_rotate;
    orbit.reset();
    let home = viewer.camera.home();
    viewer.camera.snap_to(home);
    was_rotating
}

fn set_auto_rotate(
    orbit: &mut OrbitCamera,
    enabled: bool,
    changes: &mut EventWriter<AutoRotateChangedEvent>,
) {
    if orbit.auto_rotate == enabled {
        return;
    }
    orbit.auto_rotate = enabled;
    info!("Auto-rotate {}", if enabled { "enabled" } else { "disabled" });
    changes.write(AutoRotateChangedEvent { enabled });
}

/// Native keyboard shortcuts. The web build drives these through RPC.
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_viewer_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut commands: EventWriter<ViewerCommandEvent>,
) {
    let shortcuts = [
        (KeyCode::Space, ViewerCommand::ToggleAutoRotate),
        (KeyCode::KeyR, ViewerCommand::ResetView),
        (KeyCode::Digit1, ViewerCommand::SetViewMode(ViewMode::Default)),
        (KeyCode::Digit2, ViewerCommand::SetViewMode(ViewMode::Perspective)),
        (KeyCode::Escape, ViewerCommand::CloseSelection),
    ];

    for (key, command) in shortcuts {
        if keyboard.just_pressed(key) {
            commands.write(ViewerCommandEvent {
                command,
                source: CommandSource::Keyboard,
            });
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn handle_viewer_keyboard_shortcuts() {}
