/// Duration of the focus and return camera animations, in seconds.
pub const CAMERA_ANIMATION_SECONDS: f32 = 1.0;

/// Settling window after a view-mode change, in seconds.
pub const VIEW_TRANSITION_SECONDS: f32 = 1.0;

/// Two clicks closer together than this are a double click.
pub const DOUBLE_CLICK_SECONDS: f32 = 0.3;

/// Camera offset from the focused tooth center. Y is ignored, the camera
/// keeps its height while focusing.
pub const FOCUS_OFFSET: [f32; 3] = [0.5, 0.0, 0.5];

/// Horizontal shift of the info tag away from a selected tooth.
pub const SELECTED_TAG_OFFSET_X: f32 = 0.5;

/// Tag anchor height as a fraction of the tooth bounding-box height.
pub const UPPER_TAG_LIFT: f32 = 0.8;
pub const LOWER_TAG_LIFT: f32 = -0.3;

/// Emissive intensity for hover and for the selected tooth.
pub const HOVER_EMISSIVE_INTENSITY: f32 = 0.6;
pub const SELECTED_EMISSIVE_INTENSITY: f32 = 0.8;

/// Spacing between cells of the perspective clone grid.
pub const CLONE_GRID_SPACING: f32 = 0.05;
