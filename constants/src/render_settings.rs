pub const RETICLE_INNER_RADIUS: f32 = 0.08;
pub const RETICLE_OUTER_RADIUS: f32 = 0.1;
pub const RETICLE_OPACITY: f32 = 0.9;

/// Frames a surface hit stays usable without a fresh one from the host.
pub const SURFACE_POSE_GRACE_FRAMES: u32 = 2;

/// Radial resolution for cylinders, rings and the guard wall.
pub const ROUND_SEGMENTS: usize = 48;

/// Centreline segments of the hose curve.
pub const HOSE_CURVE_SEGMENTS: usize = 32;

/// Radial segments of the hose tube.
pub const HOSE_RADIAL_SEGMENTS: usize = 16;
