use bevy::prelude::*;
use constants::render_settings::SURFACE_POSE_GRACE_FRAMES;

use crate::configurator::SurfacePose;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::camera::viewer_camera::{ViewerCamera, cursor_to_ground_plane};
#[cfg(not(target_arch = "wasm32"))]
use bevy::window::PrimaryWindow;

/// Best surface hit of the current frame, if any.
#[derive(Resource, Default, Debug)]
pub struct SurfaceTracker {
    latest: Option<SurfacePose>,
    frames_since_update: u32,
}

impl SurfaceTracker {
    pub fn latest(&self) -> Option<&SurfacePose> {
        self.latest.as_ref()
    }

    pub fn update(&mut self, pose: Option<SurfacePose>) {
        self.latest = pose;
        self.frames_since_update = 0;
    }

    /// Ages the held pose by one frame, dropping it once it outlives the
    /// grace period.
    pub fn advance_frame(&mut self) {
        if self.latest.is_none() {
            return;
        }
        self.frames_since_update += 1;
        if self.frames_since_update > SURFACE_POSE_GRACE_FRAMES {
            debug!("Surface hit expired");
            self.latest = None;
        }
    }
}

/// End-of-frame ageing of the tracked hit.
pub fn expire_stale_surface(mut tracker: ResMut<SurfaceTracker>) {
    if tracker.latest().is_some() {
        tracker.advance_frame();
    }
}

/// Native stand-in for XR hit testing: the cursor ray against the floor.
#[cfg(not(target_arch = "wasm32"))]
pub fn track_cursor_surface(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<ViewerCamera>>,
    mut tracker: ResMut<SurfaceTracker>,
) {
    let pose = windows
        .single()
        .ok()
        .and_then(|window| window.cursor_position())
        .zip(cameras.single().ok())
        .and_then(|(cursor, (camera, camera_transform))| {
            cursor_to_ground_plane(cursor, camera, camera_transform)
        })
        .map(|position| SurfacePose {
            position,
            orientation: Quat::IDENTITY,
        });

    tracker.update(pose);
}

/// Surface hits arrive through RPC in WASM builds.
#[cfg(target_arch = "wasm32")]
pub fn track_cursor_surface() {}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit() -> SurfacePose {
        SurfacePose {
            position: Vec3::new(0.2, 0.0, -0.8),
            orientation: Quat::IDENTITY,
        }
    }

    #[test]
    fn pose_survives_grace_period_then_expires() {
        let mut tracker = SurfaceTracker::default();
        tracker.update(Some(hit()));

        for _ in 0..SURFACE_POSE_GRACE_FRAMES {
            tracker.advance_frame();
            assert_eq!(tracker.latest(), Some(&hit()));
        }
        tracker.advance_frame();
        assert!(tracker.latest().is_none());
    }

    #[test]
    fn fresh_hit_restarts_the_clock() {
        let mut tracker = SurfaceTracker::default();
        tracker.update(Some(hit()));
        tracker.advance_frame();
        tracker.advance_frame();

        tracker.update(Some(hit()));
        tracker.advance_frame();
        assert!(tracker.latest().is_some());
    }

    #[test]
    fn stalled_feed_stops_placement() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<SurfaceTracker>()
            .add_systems(Update, expire_stale_surface);

        app.world_mut()
            .resource_mut::<SurfaceTracker>()
            .update(Some(hit()));
        for _ in 0..=SURFACE_POSE_GRACE_FRAMES {
            app.update();
        }

        let mut session = crate::configurator::ConfiguratorSession::default();
        let tracker = app.world().resource::<SurfaceTracker>();
        assert!(tracker.latest().is_none());
        assert_eq!(
            session.request_place_or_reposition(tracker.latest()),
            crate::configurator::PlacementOutcome::Ignored
        );
    }
}
