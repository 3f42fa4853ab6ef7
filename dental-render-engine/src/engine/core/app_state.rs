use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

/// "Loading dental model..." indicator, removed once the model is registered.
#[derive(Component)]
pub struct LoadingText;

pub const LOADING_MESSAGE: &str = "Loading dental model...";

pub fn spawn_loading_text(mut commands: Commands) {
    commands.spawn((
        LoadingText,
        Name::new("LoadingText"),
        Text::new(LOADING_MESSAGE),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::srgb(1.0, 1.0, 1.0)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(50.0),
            left: Val::Percent(50.0),
            margin: UiRect {
                left: Val::Px(-110.0),
                ..default()
            },
            ..default()
        },
    ));
}

// Final transition to running state
pub fn transition_to_running(
    mut commands: Commands,
    loading_text: Query<Entity, With<LoadingText>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for entity in &loading_text {
        commands.entity(entity).despawn();
    }
    info!("Dental model ready, transitioning to Running state");
    next_state.set(AppState::Running);
}
