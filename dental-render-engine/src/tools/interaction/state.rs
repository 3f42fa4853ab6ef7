use bevy::math::Vec3;
use serde::Serialize;

use crate::engine::scene::graph::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionPhase {
    Idle,
    Hovering,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    Hovered,
    Selected,
}

/// Info tag for the hovered or selected tooth.
#[derive(Debug, Clone, PartialEq)]
pub struct ToothTag {
    pub node: NodeId,
    pub mesh_name: String,
    pub anchor: Vec3,
    pub mode: TagMode,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    pub hovered_tooth: Option<NodeId>,
    pub selected_tooth: Option<NodeId>,
    pub is_transitioning: bool,
    pub tag: Option<ToothTag>,
    pub cursor: CursorStyle,
    /// Camera move the transition flag is waiting on.
    pub transition_generation: Option<u64>,
}

impl InteractionState {
    pub fn phase(&self) -> InteractionPhase {
        if self.selected_tooth.is_some() {
            InteractionPhase::Selected
        } else if self.hovered_tooth.is_some() {
            InteractionPhase::Hovering
        } else {
            InteractionPhase::Idle
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selected_tooth.is_some()
    }

    /// The tag to draw this frame. Hidden while the camera is moving.
    pub fn visible_tag(&self) -> Option<&ToothTag> {
        if self.is_transitioning {
            None
        } else {
            self.tag.as_ref()
        }
    }
}
