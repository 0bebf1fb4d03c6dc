use bevy::prelude::*;

#[derive(Component)]
pub struct ViewerCamera;

/// Latest viewer pose reported by the host XR session, applied once.
#[derive(Resource, Default)]
pub struct ViewerPose {
    pending: Option<Transform>,
}

impl ViewerPose {
    pub fn set(&mut self, position: Vec3, orientation: Quat) {
        self.pending = Some(Transform::from_translation(position).with_rotation(orientation));
    }

    pub fn take(&mut self) -> Option<Transform> {
        self.pending.take()
    }
}

pub fn spawn_viewer_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 1.4, 1.8).looking_at(Vec3::ZERO, Vec3::Y),
        ViewerCamera,
    ));
}

pub fn apply_viewer_pose(
    mut viewer_pose: ResMut<ViewerPose>,
    mut cameras: Query<&mut Transform, With<ViewerCamera>>,
) {
    let Some(pose) = viewer_pose.take() else {
        return;
    };
    for mut transform in &mut cameras {
        *transform = pose;
    }
}

/// Intersects the ray under `cursor_pos` with the ground plane `y = 0`.
pub fn cursor_to_ground_plane(
    cursor_pos: Vec2,
    camera: &Camera,
    camera_transform: &GlobalTransform,
) -> Option<Vec3> {
    let ray = camera.viewport_to_world(camera_transform, cursor_pos).ok()?;
    let distance = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y))?;
    Some(ray.get_point(distance))
}
