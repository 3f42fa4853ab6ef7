//! User-facing tools layered on the dental scene.
//!
//! ## Command Flow
//!
//! Every viewer-level action goes through one event so the control panel,
//! keyboard shortcuts and the RPC bridge behave identically:
//!
//! ```text
//! Button / Key / RPC / Double-click
//!   └─> ViewerCommandEvent
//!       └─> handle_viewer_commands()
//!           ├─> OrbitCamera (auto-rotate, reset)
//!           ├─> change_view() for default / perspective
//!           └─> interaction Close for the tag's close button
//! ```
//!
//! Pointer input takes a separate path: `picking` raycasts the scene graph
//! and feeds `InteractionEvent`s straight into the interaction controller.
//! Effects it returns are re-published as `InteractionEffectEvent` for the
//! cursor and the RPC notifications.
//!
//! ## Shortcuts (native only)
//!
//! - `Space`: toggle auto-rotate
//! - `R`: reset view
//! - `1` / `2`: default / perspective view
//! - `Escape`: close the current selection

/// Bottom button bar plus the header title and hint.
pub mod control_panel;

/// Hover and selection state machine with pointer picking.
pub mod interaction;

/// Floating info tag that follows the hovered or selected tooth.
pub mod tooth_tag;

/// Default and perspective layouts, including the clone grid.
pub mod view_transition;

/// Shared command events and their handler.
pub mod viewer_commands;
