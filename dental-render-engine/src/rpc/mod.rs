//! JSON-RPC 2.0 bridge to the page embedding the viewer.
//!
//! When built for wasm and hosted in an iframe, the parent page talks to the
//! viewer with `postMessage`:
//!
//! ```text
//! Page (parent window)  <──postMessage──>  Viewer (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │ <───────────────── Response (with ID) ─┤
//!        │ <────────── Notification (no ID) ──────┤
//! ```
//!
//! ## Methods
//!
//! - `set_auto_rotate {enabled}` / `toggle_auto_rotate`
//! - `reset_view`
//! - `set_view_mode {mode}` with `"default"` or `"perspective"`
//! - `close_selection`
//! - `get_tooth_data {mesh}`: clinical record for a mesh name
//! - `get_viewer_state`: phase, hovered/selected tooth, view mode, camera
//! - `get_fps`
//!
//! ## Notifications
//!
//! `tooth_hovered`, `tooth_selected`, `selection_cleared`,
//! `view_mode_changed`, `auto_rotate_changed`.
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error

/// Request handling, notification publishing and the wasm message listener.
pub mod web_rpc;
