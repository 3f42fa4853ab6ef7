//! Default / perspective layout switching.
//!
//! Perspective mode hides the skull and lays copies of every tooth out on a
//! flat grid; default mode puts the original teeth back where the asset had
//! them.

use bevy::log::{debug, info};
use bevy::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::engine::scene::graph::{NodeId, SceneNode};
use crate::engine::viewer_state::ViewerState;
use crate::tools::interaction::controller::reset_interaction;

pub const CLONE_GROUP_NAME: &str = "ClonedTeeth";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Default,
    Perspective,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Perspective => "perspective",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneTransitionState {
    pub current_view: ViewMode,
    pub is_transitioning: bool,
    pub settle_deadline: Option<f32>,
    /// Created on the first perspective entry, then only shown or hidden.
    pub clone_group: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewChange {
    Applied { cleared_selection: bool },
    /// A previous change is still settling.
    Busy,
}

pub fn change_view(viewer: &mut ViewerState, view: ViewMode, now: f32) -> ViewChange {
    if viewer.view.is_transitioning {
        debug!("View change to {} rejected, transition in progress", view.as_str());
        return ViewChange::Busy;
    }

    let interaction = &viewer.interaction;
    let cleared_selection = if interaction.hovered_tooth.is_some() || interaction.is_selected() {
        reset_interaction(viewer)
    } else {
        false
    };

    viewer.scene.capture_original_placements();
    match view {
        ViewMode::Perspective => enter_perspective(viewer),
        ViewMode::Default => enter_default(viewer),
    }

    let state = &mut viewer.view;
    state.current_view = view;
    state.is_transitioning = true;
    state.settle_deadline = Some(now + viewer.tuning.view_transition_seconds);

    info!("View mode changed to {}", view.as_str());
    ViewChange::Applied { cleared_selection }
}

/// Clear the transition flag once its window has passed.
pub fn settle_view(viewer: &mut ViewerState, now: f32) {
    let state = &mut viewer.view;
    if state.settle_deadline.is_some_and(|deadline| now >= deadline) {
        state.is_transitioning = false;
        state.settle_deadline = None;
    }
}

fn live_nodes(viewer: &ViewerState, keep: impl Fn(&SceneNode) -> bool) -> Vec<NodeId> {
    viewer
        .scene
        .iter()
        .filter(|(_, node)| !node.is_clone() && keep(*node))
        .map(|(id, _)| id)
        .collect()
}

fn enter_perspective(viewer: &mut ViewerState) {
    for skull in live_nodes(viewer, SceneNode::is_skull) {
        if let Some(node) = viewer.scene.node_mut(skull) {
            node.visible = false;
        }
    }

    let group = match viewer.view.clone_group {
        Some(group) => group,
        None => build_clone_grid(viewer),
    };
    if let Some(node) = viewer.scene.node_mut(group) {
        node.visible = true;
    }

    for tooth in live_nodes(viewer, SceneNode::is_tooth) {
        if let Some(node) = viewer.scene.node_mut(tooth) {
            node.visible = false;
            node.interactive = false;
        }
    }
}

/// Copy every live tooth onto a square grid centred on the origin.
fn build_clone_grid(viewer: &mut ViewerState) -> NodeId {
    let teeth = live_nodes(viewer, SceneNode::is_tooth);
    let group = viewer.scene.add_group(CLONE_GROUP_NAME, None);
    let side = (teeth.len() as f32).sqrt().ceil() as usize;
    let half = side as f32 / 2.0;
    let spacing = viewer.tuning.clone_grid_spacing;

    for (index, source) in teeth.iter().enumerate() {
        let Some(copy) = viewer.scene.clone_mesh(*source, group) else {
            continue;
        };
        let (row, col) = (index / side, index % side);
        if let Some(node) = viewer.scene.node_mut(copy) {
            node.translation = Vec3::new(
                (col as f32 - half) * spacing,
                (row as f32 - half) * spacing,
                0.0,
            );
            node.rotation = Quat::IDENTITY;
            node.visible = true;
            node.interactive = true;
        }
    }

    info!("Created {} cloned teeth on a {side}x{side} grid", teeth.len());
    viewer.view.clone_group = Some(group);
    group
}

fn enter_default(viewer: &mut ViewerState) {
    if let Some(node) = viewer.view.clone_group.and_then(|g| viewer.scene.node_mut(g)) {
        node.visible = false;
    }

    for id in live_nodes(viewer, |_| true) {
        let Some(placement) = viewer.scene.original_placement(id) else {
            continue;
        };
        if let Some(node) = viewer.scene.node_mut(id) {
            node.translation = placement.translation;
            node.visible = placement.visible;
            if node.is_tooth() {
                node.interactive = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::graph::SceneGraph;
    use crate::engine::scene::graph::tests::add_simple_mesh;
    use crate::engine::viewer_state::InteractionTuning;
    use crate::tools::interaction::controller::{InteractionEvent, handle_event, settle};
    use crate::tools::interaction::state::InteractionPhase;

    fn viewer_with_teeth(count: usize) -> ViewerState {
        let mut scene = SceneGraph::new();
        add_simple_mesh(&mut scene, "Skeletal_Cranium", Vec3::ZERO);
        add_simple_mesh(&mut scene, "Skeletal_Mandible", Vec3::new(0.0, -0.1, 0.0));
        for i in 0..count {
            add_simple_mesh(
                &mut scene,
                &format!("Tooth_{i}"),
                Vec3::new(i as f32 * 0.01, 0.02, 0.03),
            );
        }
        ViewerState::new(scene, InteractionTuning::default())
    }

    fn clones(viewer: &ViewerState) -> Vec<NodeId> {
        viewer
            .scene
            .iter()
            .filter(|(_, node)| node.is_clone())
            .map(|(id, _)| id)
            .collect()
    }

    #[test]
    fn perspective_twice_does_not_duplicate_clones() {
        let mut viewer = viewer_with_teeth(5);
        change_view(&mut viewer, ViewMode::Perspective, 0.0);
        settle_view(&mut viewer, 1.0);
        change_view(&mut viewer, ViewMode::Default, 1.0);
        settle_view(&mut viewer, 2.0);
        change_view(&mut viewer, ViewMode::Perspective, 2.0);

        assert_eq!(clones(&viewer).len(), 5);
        let groups = viewer
            .scene
            .iter()
            .filter(|(_, node)| node.name == CLONE_GROUP_NAME)
            .count();
        assert_eq!(groups, 1);
    }

    #[test]
    fn perspective_hides_skull_and_live_teeth() {
        let mut viewer = viewer_with_teeth(4);
        change_view(&mut viewer, ViewMode::Perspective, 0.0);

        for (id, node) in viewer.scene.iter() {
            if node.is_clone() {
                assert!(viewer.scene.is_visible(id));
                assert_eq!(node.rotation, Quat::IDENTITY);
            } else if node.category().is_some() {
                assert!(!viewer.scene.is_visible(id), "{} still visible", node.name);
            }
            if node.is_tooth() && !node.is_clone() {
                assert!(!node.interactive);
            }
        }
        assert_eq!(viewer.view.current_view, ViewMode::Perspective);
    }

    #[test]
    fn clones_sit_on_square_grid() {
        let mut viewer = viewer_with_teeth(4);
        change_view(&mut viewer, ViewMode::Perspective, 0.0);

        let positions: Vec<Vec3> = clones(&viewer)
            .into_iter()
            .map(|id| viewer.scene.node(id).unwrap().translation)
            .collect();
        let s = 0.05;
        assert_eq!(
            positions,
            vec![
                Vec3::new(-s, -s, 0.0),
                Vec3::new(0.0, -s, 0.0),
                Vec3::new(-s, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
            ]
        );
    }

    #[test]
    fn round_trip_restores_positions_and_visibility() {
        let mut viewer = viewer_with_teeth(6);
        let before: Vec<(NodeId, Vec3, bool)> = viewer
            .scene
            .iter()
            .map(|(id, node)| (id, node.translation, node.visible))
            .collect();

        change_view(&mut viewer, ViewMode::Perspective, 0.0);
        // Something moved a live node while in perspective.
        viewer.scene.node_mut(NodeId(2)).unwrap().translation = Vec3::splat(3.0);
        settle_view(&mut viewer, 1.0);
        change_view(&mut viewer, ViewMode::Default, 1.0);

        for (id, translation, visible) in before {
            let node = viewer.scene.node(id).unwrap();
            assert!((node.translation - translation).length() < 1e-6);
            assert_eq!(node.visible, visible);
            if node.is_tooth() {
                assert!(node.interactive);
            }
        }
        let group = viewer.view.clone_group.unwrap();
        assert!(!viewer.scene.is_visible(group));
        assert!(clones(&viewer).iter().all(|id| !viewer.scene.is_visible(*id)));
    }

    #[test]
    fn requests_inside_settle_window_are_rejected() {
        let mut viewer = viewer_with_teeth(2);
        assert!(matches!(
            change_view(&mut viewer, ViewMode::Perspective, 0.0),
            ViewChange::Applied { .. }
        ));
        assert_eq!(change_view(&mut viewer, ViewMode::Default, 0.5), ViewChange::Busy);
        assert_eq!(viewer.view.current_view, ViewMode::Perspective);

        settle_view(&mut viewer, 0.99);
        assert!(viewer.view.is_transitioning);
        settle_view(&mut viewer, 1.0);
        assert!(!viewer.view.is_transitioning);
        assert!(matches!(
            change_view(&mut viewer, ViewMode::Default, 1.0),
            ViewChange::Applied { .. }
        ));
    }

    #[test]
    fn view_change_clears_selection() {
        let mut viewer = viewer_with_teeth(3);
        let tooth = viewer.scene.find_by_name("Tooth_1").unwrap();
        handle_event(&mut viewer, InteractionEvent::Click(tooth), 0.0);
        viewer.camera.advance(2.0);
        settle(&mut viewer);

        let change = change_view(&mut viewer, ViewMode::Perspective, 2.0);
        assert_eq!(change, ViewChange::Applied { cleared_selection: true });
        assert_eq!(viewer.interaction.phase(), InteractionPhase::Idle);
        assert!(viewer.interaction.tag.is_none());
    }

    #[test]
    fn originals_are_captured_before_first_move() {
        let mut viewer = viewer_with_teeth(1);
        assert!(!viewer.scene.has_original_placements());
        change_view(&mut viewer, ViewMode::Default, 0.0);
        assert!(viewer.scene.has_original_placements());
    }

    #[test]
    fn view_mode_serialises_lowercase() {
        assert_eq!(
            serde_json::to_string(&ViewMode::Perspective).unwrap(),
            "\"perspective\""
        );
        let parsed: ViewMode = serde_json::from_str("\"default\"").unwrap();
        assert_eq!(parsed, ViewMode::Default);
    }
}
