/// UI actions as commands, keyboard shortcuts and pointer taps.
pub mod commands;

/// Configuration export to disk or to the host page.
pub mod export_writer;

/// Two-finger touch gestures on the placed product.
pub mod gestures;

/// Latest tracked surface pose, fed by the host or the cursor.
pub mod surface_tracker;
