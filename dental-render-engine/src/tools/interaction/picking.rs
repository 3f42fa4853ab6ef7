use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::loading::settings::ViewerSettings;
use crate::engine::scene::graph::{NodeId, SceneGraph, SceneNode};
use crate::engine::viewer_state::ViewerState;
use crate::tools::view_transition::settle_view;
use crate::tools::viewer_commands::{
    CommandSource, InteractionEffectEvent, ViewerCommand, ViewerCommandEvent,
};

use super::controller::{InteractionEvent, handle_event, settle};

/// Pointer travel in pixels beyond which a press-release is a drag.
const CLICK_DRAG_TOLERANCE: f32 = 4.0;

/// Pointer bookkeeping between frames.
#[derive(Resource, Debug, Default)]
pub struct PointerTracker {
    /// Tooth under the pointer last frame.
    over: Option<NodeId>,
    press_position: Option<Vec2>,
    last_click_at: Option<f32>,
}

impl PointerTracker {
    /// Pointer events for moving from the previous tooth to `hit`.
    fn hover_events(&mut self, hit: Option<NodeId>) -> Vec<InteractionEvent> {
        if self.over == hit {
            return Vec::new();
        }
        let mut events = Vec::new();
        if let Some(previous) = self.over {
            events.push(InteractionEvent::PointerOut(previous));
        }
        if let Some(node) = hit {
            events.push(InteractionEvent::PointerOver(node));
        }
        self.over = hit;
        events
    }

    /// Record a click. Returns true when it completes a double click.
    fn register_click(&mut self, now: f32, double_click_seconds: f32) -> bool {
        match self.last_click_at {
            Some(previous) if now - previous <= double_click_seconds => {
                self.last_click_at = None;
                true
            }
            _ => {
                self.last_click_at = Some(now);
                false
            }
        }
    }

    fn release_is_click(&mut self, cursor: Option<Vec2>) -> bool {
        match (self.press_position.take(), cursor) {
            (Some(pressed), Some(released)) => {
                pressed.distance(released) <= CLICK_DRAG_TOLERANCE
            }
            _ => false,
        }
    }
}

fn is_pickable_tooth(node: &SceneNode) -> bool {
    node.is_tooth() && node.interactive
}

/// Nearest tooth that takes hover under the ray.
fn hovered_tooth(scene: &SceneGraph, ray: &Ray3d) -> Option<NodeId> {
    scene
        .raycast(ray, is_pickable_tooth)
        .first()
        .map(|hit| hit.node)
}

/// What a single click under `ray` means.
fn click_event(scene: &SceneGraph, ray: Option<&Ray3d>) -> InteractionEvent {
    let Some(ray) = ray else {
        return InteractionEvent::BackgroundClick { hits: Vec::new() };
    };
    if let Some(tooth) = hovered_tooth(scene, ray) {
        return InteractionEvent::Click(tooth);
    }
    let hits = scene.raycast(ray, |_| true).into_iter().map(|hit| hit.node).collect();
    InteractionEvent::BackgroundClick { hits }
}

/// Viewer commands a double click issues alongside the interaction event.
/// With nothing selected the controller has no camera move to make, so the
/// view is reset instead.
fn double_click_commands(viewer: &ViewerState) -> Vec<ViewerCommand> {
    let mut commands = vec![ViewerCommand::SetAutoRotate(false)];
    if !viewer.interaction.is_selected() {
        commands.push(ViewerCommand::ResetView);
    }
    commands
}

/// Turns pointer input over the viewport into interaction events.
pub fn pointer_picking(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    buttons: Res<ButtonInput<MouseButton>>,
    ui_interactions: Query<&Interaction>,
    settings: Res<ViewerSettings>,
    mut tracker: ResMut<PointerTracker>,
    mut viewer: ResMut<ViewerState>,
    mut effects: EventWriter<InteractionEffectEvent>,
    mut commands: EventWriter<ViewerCommandEvent>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();
    settle(&mut viewer);
    settle_view(&mut viewer, now);

    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((cam_xf, camera)) = cameras.single() else {
        return;
    };

    // Buttons and panels swallow the pointer.
    let over_ui = ui_interactions
        .iter()
        .any(|interaction| *interaction != Interaction::None);
    let cursor = window.cursor_position();
    let ray = cursor
        .filter(|_| !over_ui)
        .and_then(|pos| camera.viewport_to_world(cam_xf, pos).ok());

    let mut events = tracker.hover_events(
        ray.as_ref()
            .and_then(|ray| hovered_tooth(&viewer.scene, ray)),
    );

    if buttons.just_pressed(MouseButton::Left) && !over_ui {
        tracker.press_position = cursor;
    }
    if buttons.just_released(MouseButton::Left) && tracker.release_is_click(cursor) {
        if tracker.register_click(now, settings.double_click_seconds) {
            for command in double_click_commands(&viewer) {
                commands.write(ViewerCommandEvent {
                    command,
                    source: CommandSource::Pointer,
                });
            }
            events.push(InteractionEvent::DoubleClick);
        } else {
            events.push(click_event(&viewer.scene, ray.as_ref()));
        }
    }

    for event in events {
        for effect in handle_event(&mut viewer, event, now) {
            effects.write(InteractionEffectEvent(effect));
        }
    }
}
