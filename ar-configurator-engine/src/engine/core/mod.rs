//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, state transitions
//! and system ordering for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with the configurator session, asset loading,
/// scene adapter and platform-specific input.
pub mod app_setup;

/// Application states and the per-frame runtime phases.
pub mod app_state;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
