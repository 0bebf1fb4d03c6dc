/// Per-frame footprint measurement and its notifications.
pub mod footprint_tracking;

/// Session state pushed to the host page and the native overlay.
pub mod ui_sync;
