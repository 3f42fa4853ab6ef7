use bevy::prelude::*;

use crate::dental::registry::{self, ToothRecord};
use crate::engine::scene::graph::NodeId;
use crate::engine::viewer_state::ViewerState;
use crate::tools::interaction::state::TagMode;
use crate::tools::viewer_commands::{CommandSource, ViewerCommand, ViewerCommandEvent};

const PANEL_WIDTH: f32 = 260.0;
const TEXT_COLOUR: Color = Color::srgb(1.0, 1.0, 1.0);
const MUTED_TEXT_COLOUR: Color = Color::srgb(0.70, 0.74, 0.80);

#[derive(Component)]
pub struct ToothTagPanel;

#[derive(Component)]
pub struct ToothTagCloseButton;

/// Text shown on the tag for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct TagContent {
    pub title: String,
    pub name: String,
    pub status_label: &'static str,
    pub status_colour: Color,
    pub details: Vec<(&'static str, String)>,
    pub history: Vec<String>,
    pub closable: bool,
}

pub fn tag_content(record: &ToothRecord, mode: TagMode) -> TagContent {
    let selected = mode == TagMode::Selected;
    TagContent {
        title: format!("Tooth #{}", record.dental_number),
        name: record.display_name.clone(),
        status_label: record.status.label(),
        status_colour: record.status.colour(),
        details: if selected {
            vec![
                ("Last treatment", record.last_treatment.clone()),
                ("Notes", record.notes.clone()),
            ]
        } else {
            Vec::new()
        },
        history: if selected {
            record.history.clone()
        } else {
            Vec::new()
        },
        closable: selected,
    }
}

pub fn spawn_tooth_tag(mut commands: Commands) {
    commands.spawn((
        ToothTagPanel,
        Name::new("ToothTag"),
        BackgroundColor(Color::srgba(0.10, 0.11, 0.13, 0.92)),
        BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
        Node {
            width: Val::Px(PANEL_WIDTH),
            position_type: PositionType::Absolute,
            display: Display::None,
            flex_direction: FlexDirection::Column,
            padding: UiRect::all(Val::Px(10.0)),
            row_gap: Val::Px(4.0),
            border: UiRect::all(Val::Px(1.0)),
            ..default()
        },
    ));
}

fn label(parent: &mut ChildSpawnerCommands, text: impl Into<String>, size: f32, colour: Color) {
    parent.spawn((
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(colour),
    ));
}

fn build_tag(parent: &mut ChildSpawnerCommands, content: &TagContent) {
    parent
        .spawn(Node {
            width: Val::Percent(100.0),
            display: Display::Flex,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::SpaceBetween,
            ..default()
        })
        .with_children(|header| {
            label(header, content.title.clone(), 16.0, TEXT_COLOUR);
            if content.closable {
                header
                    .spawn((
                        ToothTagCloseButton,
                        Button,
                        Name::new("CloseSelectionButton"),
                        BackgroundColor(Color::srgb(0.22, 0.24, 0.28)),
                        Node {
                            width: Val::Px(22.0),
                            height: Val::Px(22.0),
                            display: Display::Flex,
                            align_items: AlignItems::Center,
                            justify_content: JustifyContent::Center,
                            ..default()
                        },
                    ))
                    .with_children(|button| label(button, "x", 14.0, TEXT_COLOUR));
            }
        });

    parent
        .spawn(Node {
            display: Display::Flex,
            align_items: AlignItems::Center,
            column_gap: Val::Px(6.0),
            ..default()
        })
        .with_children(|row| {
            row.spawn((
                BackgroundColor(content.status_colour),
                Node {
                    width: Val::Px(8.0),
                    height: Val::Px(8.0),
                    ..default()
                },
            ));
            label(row, content.status_label, 13.0, content.status_colour);
        });

    label(parent, content.name.clone(), 14.0, TEXT_COLOUR);

    for (heading, value) in &content.details {
        label(parent, *heading, 12.0, MUTED_TEXT_COLOUR);
        label(parent, value.clone(), 13.0, TEXT_COLOUR);
    }

    if !content.history.is_empty() {
        label(parent, "History", 12.0, MUTED_TEXT_COLOUR);
        for entry in &content.history {
            label(parent, format!("- {entry}"), 13.0, TEXT_COLOUR);
        }
    }
}

/// Rebuild the tag when the tagged tooth changes and keep it on the
/// projected anchor every frame.
pub fn update_tooth_tag(
    mut commands: Commands,
    viewer: Res<ViewerState>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    mut panels: Query<(Entity, &mut Node), With<ToothTagPanel>>,
    mut shown: Local<Option<(NodeId, TagMode)>>,
) {
    let Ok((panel, mut node)) = panels.single_mut() else {
        return;
    };

    let projected = viewer.interaction.visible_tag().and_then(|tag| {
        let (cam_xf, camera) = cameras.single().ok()?;
        let screen = camera.world_to_viewport(cam_xf, tag.anchor).ok()?;
        Some((tag, screen))
    });

    let Some((tag, screen)) = projected else {
        if node.display != Display::None {
            node.display = Display::None;
        }
        return;
    };

    let key = (tag.node, tag.mode);
    if *shown != Some(key) {
        let content = tag_content(registry::lookup(&tag.mesh_name), tag.mode);
        let mut panel_commands = commands.entity(panel);
        panel_commands.despawn_related::<Children>();
        panel_commands.with_children(|parent| build_tag(parent, &content));
        // Only the selected tag takes the pointer.
        if content.closable {
            panel_commands.insert(Interaction::None);
        } else {
            panel_commands.remove::<Interaction>();
        }
        *shown = Some(key);
    }

    node.display = Display::Flex;
    node.left = Val::Px(screen.x);
    node.top = Val::Px(screen.y);
}

pub fn close_button_interaction(
    mut q: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>, With<ToothTagCloseButton>),
    >,
    mut commands: EventWriter<ViewerCommandEvent>,
) {
    for (interaction, mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => {
                commands.write(ViewerCommandEvent {
                    command: ViewerCommand::CloseSelection,
                    source: CommandSource::Ui,
                });
                *bg = BackgroundColor(Color::srgb(0.18, 0.20, 0.24));
            }
            Interaction::Hovered => *bg = BackgroundColor(Color::srgb(0.26, 0.28, 0.32)),
            Interaction::None => *bg = BackgroundColor(Color::srgb(0.22, 0.24, 0.28)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hovered_tag_is_summary_only() {
        let record = registry::lookup("1stMolar");
        let content = tag_content(record, TagMode::Hovered);
        assert_eq!(content.title, "Tooth #46");
        assert_eq!(content.name, record.display_name);
        assert_eq!(content.status_label, record.status.label());
        assert!(content.details.is_empty());
        assert!(content.history.is_empty());
        assert!(!content.closable);
    }

    #[test]
    fn selected_tag_adds_clinical_detail() {
        let record = registry::lookup("1stMolar");
        let content = tag_content(record, TagMode::Selected);
        assert_eq!(content.history, record.history);
        assert!(content.details.iter().any(|(h, v)| *h == "Notes" && *v == record.notes));
        assert!(content.closable);
    }

    #[test]
    fn unknown_tooth_still_renders() {
        let content = tag_content(registry::lookup("mystery"), TagMode::Selected);
        assert_eq!(content.title, "Tooth #00");
        assert_eq!(content.name, "Unknown Tooth");
    }
}
