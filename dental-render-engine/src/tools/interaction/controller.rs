//! Tooth hover and selection state machine.
//!
//! `handle_event` is the only entry point that mutates interaction state.
//! It is synchronous and engine independent: it edits the scene graph's
//! materials, asks the camera rig for moves and returns the effects the
//! shell has to act on (cursor changes, notifications).

use bevy::log::{debug, info};
use bevy::math::Vec3;

use crate::dental::classifier::{Arch, MeshCategory};
use crate::engine::camera::rig::Easing;
use crate::engine::materials::{default_tooth_material, highlight_tooth_material, skull_material};
use crate::engine::scene::graph::{NodeId, SceneNode};
use crate::engine::viewer_state::ViewerState;

use super::state::{CursorStyle, TagMode, ToothTag};

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    PointerOver(NodeId),
    PointerOut(NodeId),
    Click(NodeId),
    /// Click that did not land on an interactive tooth. `hits` is every mesh
    /// under the pointer, nearest first.
    BackgroundClick { hits: Vec<NodeId> },
    DoubleClick,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEffect {
    Cursor(CursorStyle),
    Hovered(NodeId),
    HoverCleared(NodeId),
    Selected(NodeId),
    SelectionCleared,
}

pub fn handle_event(
    viewer: &mut ViewerState,
    event: InteractionEvent,
    now: f32,
) -> Vec<InteractionEffect> {
    match event {
        InteractionEvent::PointerOver(node) => pointer_over(viewer, node),
        InteractionEvent::PointerOut(node) => pointer_out(viewer, node),
        InteractionEvent::Click(node) => click(viewer, node, now),
        InteractionEvent::BackgroundClick { hits } => background_click(viewer, &hits),
        InteractionEvent::DoubleClick => double_click(viewer, now),
        InteractionEvent::Close => close(viewer),
    }
}

/// Drop the transition flag once the camera move it waits on has finished
/// or been superseded.
pub fn settle(viewer: &mut ViewerState) {
    let Some(generation) = viewer.interaction.transition_generation else {
        return;
    };
    if !viewer.camera.is_current(generation) || !viewer.camera.is_animating() {
        viewer.interaction.transition_generation = None;
        viewer.interaction.is_transitioning = false;
    }
}

/// Tooth that can take pointer input right now.
fn interactive_tooth(viewer: &ViewerState, node: NodeId) -> Option<&SceneNode> {
    let scene_node = viewer.scene.node(node)?;
    (scene_node.is_tooth() && scene_node.interactive && viewer.scene.is_visible(node))
        .then_some(scene_node)
}

fn pointer_over(viewer: &mut ViewerState, node: NodeId) -> Vec<InteractionEffect> {
    if viewer.interaction.is_selected() || viewer.interaction.is_transitioning {
        debug!("Hover on {:?} ignored while selected or transitioning", node);
        return Vec::new();
    }
    let Some(tooth) = interactive_tooth(viewer, node) else {
        return Vec::new();
    };
    if viewer.interaction.hovered_tooth == Some(node) {
        return Vec::new();
    }
    let mesh_name = tooth.name.clone();

    let mut effects = Vec::new();
    if let Some(previous) = viewer.interaction.hovered_tooth {
        effects.extend(pointer_out(viewer, previous));
    }

    let anchor = hover_anchor(viewer, node);
    viewer.scene.cache_previous_material(node);
    viewer.scene.assign_material(
        node,
        highlight_tooth_material().with_emissive_intensity(viewer.tuning.hover_emissive_intensity),
    );

    let interaction = &mut viewer.interaction;
    interaction.hovered_tooth = Some(node);
    interaction.tag = Some(ToothTag {
        node,
        mesh_name,
        anchor,
        mode: TagMode::Hovered,
    });
    interaction.cursor = CursorStyle::Pointer;

    effects.push(InteractionEffect::Hovered(node));
    effects.push(InteractionEffect::Cursor(CursorStyle::Pointer));
    effects
}

fn pointer_out(viewer: &mut ViewerState, node: NodeId) -> Vec<InteractionEffect> {
    if viewer.interaction.is_selected() {
        return Vec::new();
    }
    if !viewer.scene.node(node).is_some_and(SceneNode::is_tooth) {
        return Vec::new();
    }

    if !viewer.scene.restore_previous_material(node) {
        viewer.scene.assign_material(node, default_tooth_material());
    }

    let mut effects = Vec::new();
    let interaction = &mut viewer.interaction;
    if interaction.hovered_tooth == Some(node) {
        interaction.hovered_tooth = None;
        interaction.tag = None;
        effects.push(InteractionEffect::HoverCleared(node));
    }
    interaction.cursor = CursorStyle::Default;
    effects.push(InteractionEffect::Cursor(CursorStyle::Default));
    effects
}

fn click(viewer: &mut ViewerState, node: NodeId, now: f32) -> Vec<InteractionEffect> {
    if viewer.interaction.is_transitioning {
        debug!("Click on {:?} ignored during camera transition", node);
        return Vec::new();
    }
    let Some(tooth) = interactive_tooth(viewer, node) else {
        return Vec::new();
    };
    let mesh_name = tooth.name.clone();
    let Some(bounds) = viewer.scene.world_bounds(node) else {
        return Vec::new();
    };

    let center = bounds.center();
    let offset = viewer.tuning.focus_offset;
    let target = Vec3::new(
        center.x + offset.x,
        viewer.camera.position().y,
        center.z + offset.z,
    );
    let generation = viewer.camera.animate_to(
        target,
        viewer.tuning.camera_animation_seconds,
        Easing::EaseInOut,
        now,
    );

    let selected_intensity = viewer.tuning.selected_emissive_intensity;
    for mesh in viewer.scene.meshes() {
        let material = match viewer.scene.category(mesh) {
            Some(MeshCategory::Skull) => skull_material(),
            Some(MeshCategory::Tooth) if mesh == node => {
                highlight_tooth_material().with_emissive_intensity(selected_intensity)
            }
            Some(MeshCategory::Tooth) => default_tooth_material(),
            None => continue,
        };
        viewer.scene.assign_material(mesh, material);
    }
    viewer.scene.clear_previous_materials();

    info!("Selected tooth {}", mesh_name);
    let interaction = &mut viewer.interaction;
    interaction.hovered_tooth = None;
    interaction.selected_tooth = Some(node);
    interaction.is_transitioning = true;
    interaction.transition_generation = Some(generation);
    interaction.tag = Some(ToothTag {
        node,
        mesh_name,
        anchor: center + Vec3::X * viewer.tuning.selected_tag_offset_x,
        mode: TagMode::Selected,
    });
    interaction.cursor = CursorStyle::Default;

    vec![
        InteractionEffect::Selected(node),
        InteractionEffect::Cursor(CursorStyle::Default),
    ]
}

fn background_click(viewer: &mut ViewerState, hits: &[NodeId]) -> Vec<InteractionEffect> {
    if !viewer.interaction.is_selected() || viewer.interaction.is_transitioning {
        return Vec::new();
    }
    let first = hits.first().and_then(|node| viewer.scene.category(*node));
    if matches!(first, Some(MeshCategory::Tooth)) {
        return Vec::new();
    }

    info!("Background click, clearing selection");
    reset_interaction(viewer);
    vec![
        InteractionEffect::SelectionCleared,
        InteractionEffect::Cursor(CursorStyle::Default),
    ]
}

fn double_click(viewer: &mut ViewerState, now: f32) -> Vec<InteractionEffect> {
    if !viewer.interaction.is_selected() {
        return Vec::new();
    }

    reset_interaction(viewer);
    let home = viewer.camera.home();
    let generation = viewer.camera.animate_to(
        home,
        viewer.tuning.camera_animation_seconds,
        Easing::EaseOut,
        now,
    );
    viewer.interaction.is_transitioning = true;
    viewer.interaction.transition_generation = Some(generation);

    info!("Double click, returning camera home");
    vec![
        InteractionEffect::SelectionCleared,
        InteractionEffect::Cursor(CursorStyle::Default),
    ]
}

fn close(viewer: &mut ViewerState) -> Vec<InteractionEffect> {
    let was_selected = viewer.interaction.is_selected();
    let home = viewer.camera.home();
    viewer.camera.snap_to(home);
    reset_interaction(viewer);
    viewer.interaction.is_transitioning = false;
    viewer.interaction.transition_generation = None;

    let mut effects = Vec::new();
    if was_selected {
        effects.push(InteractionEffect::SelectionCleared);
    }
    effects.push(InteractionEffect::Cursor(CursorStyle::Default));
    effects
}

/// Every mesh back to its category material, hover and selection cleared.
/// Returns whether a tooth was selected.
pub(crate) fn reset_interaction(viewer: &mut ViewerState) -> bool {
    viewer.scene.reset_category_materials();
    let interaction = &mut viewer.interaction;
    let was_selected = interaction.selected_tooth.take().is_some();
    interaction.hovered_tooth = None;
    interaction.tag = None;
    interaction.cursor = CursorStyle::Default;
    was_selected
}

/// Bounding-box center lifted above upper teeth and dropped below lower ones.
fn hover_anchor(viewer: &ViewerState, node: NodeId) -> Vec3 {
    let Some(bounds) = viewer.scene.world_bounds(node) else {
        return Vec3::ZERO;
    };
    let lift = match viewer.scene.node(node).and_then(|n| n.arch) {
        Some(Arch::Upper) => viewer.tuning.upper_tag_lift,
        _ => viewer.tuning.lower_tag_lift,
    };
    let mut anchor = bounds.center();
    anchor.y += bounds.size().y * lift;
    anchor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::materials::MaterialPreset;
    use crate::engine::scene::graph::tests::add_simple_mesh;
    use crate::engine::scene::graph::SceneGraph;
    use crate::engine::viewer_state::InteractionTuning;
    use crate::tools::interaction::state::InteractionPhase;

    struct Fixture {
        viewer: ViewerState,
        skull: NodeId,
        a: NodeId,
        b: NodeId,
    }

    fn fixture() -> Fixture {
        let mut scene = SceneGraph::new();
        let skull = add_simple_mesh(&mut scene, "Skeletal_Cranium", Vec3::new(0.0, 0.0, -0.1));
        let a = add_simple_mesh(&mut scene, "1stMolar", Vec3::new(-0.05, 0.0, 0.0));
        let b = add_simple_mesh(&mut scene, "2ndMolar_2", Vec3::new(0.05, 0.0, 0.0));
        scene.node_mut(b).unwrap().arch = Some(Arch::Upper);
        Fixture {
            viewer: ViewerState::new(scene, InteractionTuning::default()),
            skull,
            a,
            b,
        }
    }

    fn preset(viewer: &ViewerState, node: NodeId) -> MaterialPreset {
        viewer.scene.material_of(node).unwrap().preset
    }

    fn intensity(viewer: &ViewerState, node: NodeId) -> f32 {
        viewer.scene.material_of(node).unwrap().emissive_intensity
    }

    fn finish_camera(viewer: &mut ViewerState, now: f32) {
        viewer.camera.advance(now);
        settle(viewer);
    }

    #[test]
    fn hover_then_unhover_restores_same_material_id() {
        let Fixture { mut viewer, a, .. } = fixture();
        let before = viewer.scene.node(a).unwrap().material;

        let effects = handle_event(&mut viewer, InteractionEvent::PointerOver(a), 0.0);
        assert!(effects.contains(&InteractionEffect::Cursor(CursorStyle::Pointer)));
        assert_eq!(preset(&viewer, a), MaterialPreset::Highlight);
        assert_eq!(viewer.interaction.phase(), InteractionPhase::Hovering);

        handle_event(&mut viewer, InteractionEvent::PointerOut(a), 0.1);
        assert_eq!(viewer.scene.node(a).unwrap().material, before);
        assert_eq!(viewer.interaction.phase(), InteractionPhase::Idle);
        assert_eq!(viewer.interaction.cursor, CursorStyle::Default);
        assert!(viewer.interaction.tag.is_none());
    }

    #[test]
    fn unhover_without_cache_applies_fresh_default() {
        let Fixture { mut viewer, a, .. } = fixture();
        let before = viewer.scene.node(a).unwrap().material;
        handle_event(&mut viewer, InteractionEvent::PointerOut(a), 0.0);

        assert_ne!(viewer.scene.node(a).unwrap().material, before);
        assert_eq!(preset(&viewer, a), MaterialPreset::Default);
    }

    #[test]
    fn skull_never_takes_hover() {
        let Fixture { mut viewer, skull, .. } = fixture();
        let effects = handle_event(&mut viewer, InteractionEvent::PointerOver(skull), 0.0);
        assert!(effects.is_empty());
        assert_eq!(preset(&viewer, skull), MaterialPreset::SkullTranslucent);
        assert!(viewer.interaction.hovered_tooth.is_none());
    }

    #[test]
    fn hover_tag_lifts_by_arch() {
        let Fixture { mut viewer, a, b, .. } = fixture();

        handle_event(&mut viewer, InteractionEvent::PointerOver(a), 0.0);
        let lower = viewer.interaction.tag.clone().unwrap().anchor;
        handle_event(&mut viewer, InteractionEvent::PointerOut(a), 0.0);
        handle_event(&mut viewer, InteractionEvent::PointerOver(b), 0.0);
        let upper = viewer.interaction.tag.clone().unwrap().anchor;

        // Test meshes are 0.02 tall.
        assert!((lower.y - (-0.3 * 0.02)).abs() < 1e-5);
        assert!((upper.y - (0.8 * 0.02)).abs() < 1e-5);
    }

    #[test]
    fn hover_moving_between_teeth_restores_the_first() {
        let Fixture { mut viewer, a, b, .. } = fixture();
        let a_before = viewer.scene.node(a).unwrap().material;

        handle_event(&mut viewer, InteractionEvent::PointerOver(a), 0.0);
        handle_event(&mut viewer, InteractionEvent::PointerOver(b), 0.0);

        assert_eq!(viewer.scene.node(a).unwrap().material, a_before);
        assert_eq!(viewer.interaction.hovered_tooth, Some(b));
    }

    #[test]
    fn selecting_while_other_is_hovered_leaves_one_highlight() {
        let Fixture { mut viewer, skull, a, b } = fixture();

        handle_event(&mut viewer, InteractionEvent::PointerOver(b), 0.0);
        let effects = handle_event(&mut viewer, InteractionEvent::Click(a), 0.0);

        assert!(effects.contains(&InteractionEffect::Selected(a)));
        assert_eq!(preset(&viewer, a), MaterialPreset::Highlight);
        assert!((intensity(&viewer, a) - 0.8).abs() < 1e-6);
        assert_eq!(preset(&viewer, b), MaterialPreset::Default);
        assert_eq!(preset(&viewer, skull), MaterialPreset::SkullTranslucent);
        assert!(viewer.interaction.hovered_tooth.is_none());
        assert_eq!(viewer.interaction.selected_tooth, Some(a));
        assert!(viewer.scene.previous_material(b).is_none());
        // One live material per mesh, nothing leaked.
        assert_eq!(viewer.scene.live_materials().count(), 3);
    }

    #[test]
    fn click_moves_camera_keeping_height() {
        let Fixture { mut viewer, a, .. } = fixture();
        viewer.camera.snap_to(Vec3::new(0.0, 0.1, 0.4));

        handle_event(&mut viewer, InteractionEvent::Click(a), 0.0);
        let animation = *viewer.camera.animation().unwrap();
        assert_eq!(animation.easing, Easing::EaseInOut);
        assert!((animation.end - Vec3::new(-0.05 + 0.5, 0.1, 0.5)).length() < 1e-5);

        let tag = viewer.interaction.tag.clone().unwrap();
        assert_eq!(tag.mode, TagMode::Selected);
        assert!((tag.anchor.x - (-0.05 + 0.5)).abs() < 1e-5);
        assert!(viewer.interaction.visible_tag().is_none());

        finish_camera(&mut viewer, 1.5);
        assert!(!viewer.interaction.is_transitioning);
        assert!(viewer.interaction.visible_tag().is_some());
    }

    #[test]
    fn input_is_suspended_while_transitioning() {
        let Fixture { mut viewer, a, b, .. } = fixture();
        handle_event(&mut viewer, InteractionEvent::Click(a), 0.0);

        let before_b = viewer.scene.node(b).unwrap().material;
        assert!(handle_event(&mut viewer, InteractionEvent::Click(b), 0.2).is_empty());
        assert!(handle_event(&mut viewer, InteractionEvent::PointerOver(b), 0.2).is_empty());
        assert_eq!(viewer.scene.node(b).unwrap().material, before_b);
        assert_eq!(viewer.interaction.selected_tooth, Some(a));
    }

    #[test]
    fn hover_while_selected_is_a_no_op() {
        let Fixture { mut viewer, a, b, .. } = fixture();
        handle_event(&mut viewer, InteractionEvent::Click(a), 0.0);
        finish_camera(&mut viewer, 2.0);

        let before_b = viewer.scene.node(b).unwrap().material;
        assert!(handle_event(&mut viewer, InteractionEvent::PointerOver(b), 2.1).is_empty());
        assert!(handle_event(&mut viewer, InteractionEvent::PointerOut(a), 2.1).is_empty());
        assert_eq!(viewer.scene.node(b).unwrap().material, before_b);
        assert!(viewer.interaction.hovered_tooth.is_none());
    }

    #[test]
    fn background_click_on_nothing_and_on_skull_match() {
        let mut results = Vec::new();
        for use_skull in [false, true] {
            let Fixture { mut viewer, skull, a, b } = fixture();
            handle_event(&mut viewer, InteractionEvent::Click(a), 0.0);
            finish_camera(&mut viewer, 2.0);

            let hits = if use_skull { vec![skull] } else { Vec::new() };
            let effects = handle_event(&mut viewer, InteractionEvent::BackgroundClick { hits }, 2.1);
            assert!(effects.contains(&InteractionEffect::SelectionCleared));

            results.push((
                viewer.interaction.phase(),
                viewer.interaction.tag.clone(),
                [skull, a, b].map(|node| preset(&viewer, node)),
                viewer.camera.position(),
            ));
        }
        assert_eq!(results[0], results[1]);
        assert_eq!(results[0].0, InteractionPhase::Idle);
    }

    #[test]
    fn background_click_with_tooth_first_is_ignored() {
        let Fixture { mut viewer, skull, a, b } = fixture();
        handle_event(&mut viewer, InteractionEvent::Click(a), 0.0);
        finish_camera(&mut viewer, 2.0);

        let effects = handle_event(
            &mut viewer,
            InteractionEvent::BackgroundClick { hits: vec![b, skull] },
            2.1,
        );
        assert!(effects.is_empty());
        assert_eq!(viewer.interaction.selected_tooth, Some(a));
    }

    #[test]
    fn background_click_during_transition_is_ignored() {
        let Fixture { mut viewer, a, .. } = fixture();
        handle_event(&mut viewer, InteractionEvent::Click(a), 0.0);
        let effects =
            handle_event(&mut viewer, InteractionEvent::BackgroundClick { hits: Vec::new() }, 0.3);
        assert!(effects.is_empty());
        assert!(viewer.interaction.is_selected());
    }

    #[test]
    fn double_click_animates_home_and_clears() {
        let Fixture { mut viewer, a, .. } = fixture();
        assert!(handle_event(&mut viewer, InteractionEvent::DoubleClick, 0.0).is_empty());

        handle_event(&mut viewer, InteractionEvent::Click(a), 0.0);
        finish_camera(&mut viewer, 2.0);
        handle_event(&mut viewer, InteractionEvent::DoubleClick, 2.0);

        let animation = *viewer.camera.animation().unwrap();
        assert_eq!(animation.easing, Easing::EaseOut);
        assert_eq!(animation.end, viewer.tuning.home);
        assert!(viewer.interaction.is_transitioning);
        assert_eq!(viewer.interaction.phase(), InteractionPhase::Idle);
        assert_eq!(preset(&viewer, a), MaterialPreset::Default);

        finish_camera(&mut viewer, 3.5);
        assert_eq!(viewer.camera.position(), viewer.tuning.home);
        assert!(!viewer.interaction.is_transitioning);
    }

    #[test]
    fn close_snaps_home_and_supersedes_animation() {
        let Fixture { mut viewer, a, .. } = fixture();
        handle_event(&mut viewer, InteractionEvent::Click(a), 0.0);
        let effects = handle_event(&mut viewer, InteractionEvent::Close, 0.5);

        assert!(effects.contains(&InteractionEffect::SelectionCleared));
        assert!(!viewer.camera.is_animating());
        assert_eq!(viewer.camera.position(), viewer.tuning.home);
        assert!(!viewer.interaction.is_transitioning);
        assert_eq!(viewer.interaction.phase(), InteractionPhase::Idle);
    }

    #[test]
    fn hidden_or_unknown_nodes_are_ignored() {
        let Fixture { mut viewer, a, .. } = fixture();
        viewer.scene.node_mut(a).unwrap().visible = false;
        assert!(handle_event(&mut viewer, InteractionEvent::PointerOver(a), 0.0).is_empty());
        assert!(handle_event(&mut viewer, InteractionEvent::Click(NodeId(999)), 0.0).is_empty());
        assert_eq!(viewer.interaction.phase(), InteractionPhase::Idle);
    }
}
