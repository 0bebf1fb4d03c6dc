use bevy::prelude::*;
use constants::render_settings::{RETICLE_INNER_RADIUS, RETICLE_OPACITY, RETICLE_OUTER_RADIUS};
use std::f32::consts::FRAC_PI_2;

use crate::tools::surface_tracker::SurfaceTracker;

#[derive(Component)]
pub struct Reticle;

/// Lifts the ring just above the surface to avoid z-fighting.
const SURFACE_OFFSET: f32 = 0.001;

pub fn spawn_reticle(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let mesh = meshes.add(Annulus::new(RETICLE_INNER_RADIUS, RETICLE_OUTER_RADIUS));
    let material = materials.add(StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, RETICLE_OPACITY),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    commands.spawn((
        Name::new("Reticle"),
        Mesh3d(mesh),
        MeshMaterial3d(material),
        Transform::default(),
        Visibility::Hidden,
        Reticle,
    ));
}

/// The reticle mirrors the tracker: posed on the hit, hidden without one.
pub fn update_reticle(
    tracker: Res<SurfaceTracker>,
    mut reticles: Query<(&mut Transform, &mut Visibility), With<Reticle>>,
) {
    for (mut transform, mut visibility) in &mut reticles {
        match tracker.latest() {
            Some(pose) => {
                // Annulus meshes face +Z; the hit pose's +Y is the surface normal.
                let rotation = pose.orientation * Quat::from_rotation_x(-FRAC_PI_2);
                transform.translation = pose.position + rotation * Vec3::Z * SURFACE_OFFSET;
                transform.rotation = rotation;
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}
