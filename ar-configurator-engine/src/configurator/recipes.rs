//! Procedural geometry: the placeholder base and the fixed attachment set.

use bevy::prelude::*;
use constants::render_settings::HOSE_CURVE_SEGMENTS;
use std::f32::consts::FRAC_PI_2;

use super::composite::AttachmentKind;
use super::shapes::{Part, Shape, SurfaceStyle, sample_catmull_rom};

const PRO_BODY_COLOR: u32 = 0x0ea5e9;
const STANDARD_BODY_COLOR: u32 = 0x60a5fa;

/// Stand-in base used when a variant's model is unavailable.
///
/// Deterministic in `variant`: `pro` gets its own body colour, every other id
/// the standard one.
pub fn placeholder_parts(variant: &str) -> Vec<Part> {
    let body_color = if variant == "pro" {
        PRO_BODY_COLOR
    } else {
        STANDARD_BODY_COLOR
    };

    vec![
        Part::new(
            "body",
            Shape::Cuboid {
                size: Vec3::new(0.6, 0.16, 0.4),
            },
            Transform::from_xyz(0.0, 0.08, 0.0),
            SurfaceStyle::lit(body_color, 0.0, 0.6),
        ),
        Part::new(
            "head",
            Shape::Cuboid {
                size: Vec3::new(0.5, 0.14, 0.34),
            },
            Transform::from_xyz(0.0, 0.23, 0.0),
            SurfaceStyle::lit(0x1f2937, 0.0, 0.6),
        ),
        Part::new(
            "outlet",
            Shape::Cylinder {
                radius: 0.06,
                height: 0.36,
                open_ended: false,
            },
            Transform::from_xyz(0.18, 0.23, 0.0).with_rotation(Quat::from_rotation_z(FRAC_PI_2)),
            SurfaceStyle::lit(0xf59e0b, 0.2, 0.4),
        ),
    ]
}

pub fn attachment_parts(kind: AttachmentKind) -> Vec<Part> {
    match kind {
        AttachmentKind::Guard => guard_parts(),
        AttachmentKind::Stand => stand_parts(),
        AttachmentKind::Hose => hose_parts(),
    }
}

fn guard_parts() -> Vec<Part> {
    const RADIUS: f32 = 0.36;
    const HEIGHT: f32 = 0.22;
    const RIM: f32 = 0.01;
    const CENTER_Y: f32 = 0.23;
    const GREEN: u32 = 0x22c55e;

    let rim = |name, y| {
        Part::new(
            name,
            Shape::Torus {
                major_radius: RADIUS,
                minor_radius: RIM,
            },
            Transform::from_xyz(0.0, y, 0.0),
            SurfaceStyle::translucent(GREEN, 0.35),
        )
    };

    vec![
        Part::new(
            "guard_wall",
            Shape::Cylinder {
                radius: RADIUS,
                height: HEIGHT,
                open_ended: true,
            },
            Transform::from_xyz(0.0, CENTER_Y, 0.0),
            SurfaceStyle::translucent(GREEN, 0.25).double_sided(),
        ),
        rim("guard_rim_top", CENTER_Y + HEIGHT * 0.5),
        rim("guard_rim_bottom", CENTER_Y - HEIGHT * 0.5),
    ]
}

fn stand_parts() -> Vec<Part> {
    vec![Part::new(
        "stand",
        Shape::Cylinder {
            radius: 0.28,
            height: 0.06,
            open_ended: false,
        },
        Transform::from_xyz(0.0, 0.03, 0.0),
        SurfaceStyle::lit(0x475569, 0.0, 0.8),
    )]
}

fn hose_parts() -> Vec<Part> {
    let controls = [
        Vec3::new(0.18, 0.23, 0.0),
        Vec3::new(0.35, 0.30, 0.10),
        Vec3::new(0.50, 0.20, 0.20),
    ];

    vec![Part::new(
        "hose",
        Shape::Tube {
            path: sample_catmull_rom(&controls, HOSE_CURVE_SEGMENTS),
            radius: 0.02,
        },
        Transform::IDENTITY,
        SurfaceStyle::lit(0x0ea5e9, 0.1, 0.5),
    )]
}
