use bevy::prelude::*;

use crate::engine::camera::orbit_camera::OrbitCamera;
use crate::engine::viewer_state::ViewerState;
use crate::tools::view_transition::ViewMode;
use crate::tools::viewer_commands::{CommandSource, ViewerCommand, ViewerCommandEvent};

const BUTTON_IDLE: Color = Color::srgb(0.22, 0.24, 0.28);
const BUTTON_HOVER: Color = Color::srgb(0.26, 0.28, 0.32);
const BUTTON_PRESSED: Color = Color::srgb(0.18, 0.20, 0.24);
const BUTTON_ACTIVE: Color = Color::srgb(0.30, 0.34, 0.40);

pub const TITLE: &str = "Interactive Dental Model";
pub const HINT: &str =
    "Hover a tooth for details, click to focus, double-click to return. Drag to orbit, scroll to zoom.";

/// Button that sends a fixed command.
#[derive(Component, Debug, Clone, Copy)]
pub struct ControlButton(pub ViewerCommand);

#[derive(Component)]
pub struct ControlPanelRoot;

#[derive(Component)]
pub struct AutoRotateLabel;

fn auto_rotate_text(enabled: bool) -> &'static str {
    if enabled {
        "Stop Rotation"
    } else {
        "Auto Rotate"
    }
}

/// Whether a button reflects current state as "on".
fn is_active(command: ViewerCommand, orbit: &OrbitCamera, viewer: &ViewerState) -> bool {
    match command {
        ViewerCommand::ToggleAutoRotate | ViewerCommand::SetAutoRotate(_) => orbit.auto_rotate,
        ViewerCommand::SetViewMode(view) => viewer.view.current_view == view,
        ViewerCommand::ResetView | ViewerCommand::CloseSelection => false,
    }
}

fn spawn_button(parent: &mut ChildSpawnerCommands, command: ViewerCommand, text: &str, name: &str) {
    parent
        .spawn((
            ControlButton(command),
            Button,
            Name::new(name.to_string()),
            BackgroundColor(BUTTON_IDLE),
            BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
            Node {
                height: Val::Px(32.0),
                padding: UiRect::axes(Val::Px(12.0), Val::Px(4.0)),
                display: Display::Flex,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
        ))
        .with_children(|btn| {
            let mut label = btn.spawn((
                Text::new(text),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 1.0, 1.0)),
            ));
            if command == ViewerCommand::ToggleAutoRotate {
                label.insert(AutoRotateLabel);
            }
        });
}

// Header with title and hint across the top, buttons along the bottom
pub fn spawn_control_panel(mut commands: Commands) {
    commands
        .spawn((
            Name::new("Header"),
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                left: Val::Px(16.0),
                right: Val::Px(16.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                ..default()
            },
        ))
        .with_children(|header| {
            header.spawn((
                Text::new(TITLE),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 1.0, 1.0)),
            ));
            header.spawn((
                Text::new(HINT),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(Color::srgb(0.70, 0.74, 0.80)),
            ));
        });

    commands
        .spawn((
            ControlPanelRoot,
            Name::new("ControlPanel"),
            Interaction::None,
            BackgroundColor(Color::srgba(0.10, 0.11, 0.13, 0.85)),
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(16.0),
                left: Val::Px(16.0),
                padding: UiRect::all(Val::Px(8.0)),
                column_gap: Val::Px(8.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Row,
                ..default()
            },
        ))
        .with_children(|panel| {
            spawn_button(
                panel,
                ViewerCommand::ToggleAutoRotate,
                auto_rotate_text(false),
                "AutoRotateButton",
            );
            spawn_button(panel, ViewerCommand::ResetView, "Reset View", "ResetViewButton");
            spawn_button(
                panel,
                ViewerCommand::SetViewMode(ViewMode::Default),
                "Default View",
                "DefaultViewButton",
            );
            spawn_button(
                panel,
                ViewerCommand::SetViewMode(ViewMode::Perspective),
                "Perspective View",
                "PerspectiveViewButton",
            );
        });
}

pub fn control_button_interaction(
    mut q: Query<
        (&Interaction, &ControlButton, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>),
    >,
    orbit: Res<OrbitCamera>,
    viewer: Res<ViewerState>,
    mut commands: EventWriter<ViewerCommandEvent>,
) {
    for (interaction, ControlButton(command), mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => {
                commands.write(ViewerCommandEvent {
                    command: *command,
                    source: CommandSource::Ui,
                });
                *bg = BackgroundColor(BUTTON_PRESSED);
            }
            Interaction::Hovered => *bg = BackgroundColor(BUTTON_HOVER),
            Interaction::None => {
                *bg = BackgroundColor(if is_active(*command, &orbit, &viewer) {
                    BUTTON_ACTIVE
                } else {
                    BUTTON_IDLE
                })
            }
        }
    }
}

/// Keep labels and active colours in step with changes from RPC or keys.
pub fn reflect_control_state(
    orbit: Res<OrbitCamera>,
    viewer: Res<ViewerState>,
    mut buttons: Query<(&Interaction, &ControlButton, &mut BackgroundColor)>,
    mut labels: Query<&mut Text, With<AutoRotateLabel>>,
) {
    if !orbit.is_changed() && !viewer.is_changed() {
        return;
    }

    for mut text in &mut labels {
        let wanted = auto_rotate_text(orbit.auto_rotate);
        if text.0 != wanted {
            *text = Text::new(wanted);
        }
    }

    for (interaction, ControlButton(command), mut bg) in &mut buttons {
        if *interaction != Interaction::None {
            continue;
        }
        let colour = if is_active(*command, &orbit, &viewer) {
            BUTTON_ACTIVE
        } else {
            BUTTON_IDLE
        };
        bg.set_if_neq(BackgroundColor(colour));
    }
}
