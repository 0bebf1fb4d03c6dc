//! JSON-RPC 2.0 communication layer between the host page and the canvas.
//!
//! The host page owns the WebXR session and the DOM controls; the engine owns
//! the configurator. Messages travel over `postMessage`.
//!
//! ## Message Flow
//!
//! ```text
//! Host page (parent window)  <──postMessage──>  Bevy (canvas / iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Dispatch command
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        ├─ Notification (no ID) ───────────────> │  surface_hit, viewer_pose
//!        │ <────────── Notification (no ID) ─────┤  footprint_update, ...
//! ```
//!
//! ## Methods
//!
//! ### Configuration
//! - `select_variant { variant }`
//! - `pick_color { color }`: `#rrggbb`
//! - `set_scale { scale }`: clamped to the catalog limits
//! - `set_rotation { yaw }`: radians
//! - `toggle_attachment { name, enabled }`: `guard`, `stand` or `hose`
//!
//! ### Placement
//! - `place`: XR select on the tracked surface
//! - `reposition`: arm the next `place` to move the product
//! - `reset`
//! - `export`: answered with a `config_export` notification
//!
//! ### XR feed
//! - `surface_hit { position: [x, y, z], orientation: [x, y, z, w] }`, or
//!   `{ hit: null }` when nothing is tracked
//! - `viewer_pose { position, orientation }`
//!
//! ### Queries
//! - `get_catalog`
//! - `get_configuration`
//!
//! ## Notifications sent by the engine
//! - `variant_status { status }`: `loaded`, `placeholder` or `(waiting)`
//! - `scale_changed { scale, label }`
//! - `footprint_update { w, d, h, area }`
//! - `placement_changed { placed, reposition_armed }`
//! - `config_export { filename, content }`
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error

/// JSON-RPC 2.0 bidirectional communication system for host page integration.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
