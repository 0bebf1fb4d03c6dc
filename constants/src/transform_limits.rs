/// Lower bound for the uniform product scale.
pub const MIN_SCALE: f32 = 0.5;

/// Upper bound for the uniform product scale.
pub const MAX_SCALE: f32 = 2.0;

/// Scale on start-up and after a reset.
pub const DEFAULT_SCALE: f32 = 1.0;

/// Slider / keyboard increment.
pub const SCALE_STEP: f32 = 0.1;

/// Keyboard yaw increment (15 degrees).
pub const YAW_STEP: f32 = std::f32::consts::PI / 12.0;

/// Two-finger gestures starting closer than this (logical pixels) never scale.
pub const MIN_GESTURE_DISTANCE: f32 = 1.0e-3;
