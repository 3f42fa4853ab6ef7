use bevy::prelude::*;
use bevy::window::{PrimaryWindow, SystemCursorIcon};
use bevy::winit::cursor::CursorIcon;

use crate::engine::viewer_state::ViewerState;

use super::state::CursorStyle;

fn cursor_icon(style: CursorStyle) -> CursorIcon {
    match style {
        CursorStyle::Default => CursorIcon::System(SystemCursorIcon::Default),
        CursorStyle::Pointer => CursorIcon::System(SystemCursorIcon::Pointer),
    }
}

/// Mirror the interaction cursor onto the primary window.
pub fn apply_cursor_style(
    mut commands: Commands,
    viewer: Res<ViewerState>,
    windows: Query<Entity, With<PrimaryWindow>>,
    mut applied: Local<Option<CursorStyle>>,
) {
    let style = viewer.interaction.cursor;
    if *applied == Some(style) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    commands.entity(window).insert(cursor_icon(style));
    *applied = Some(style);
}
