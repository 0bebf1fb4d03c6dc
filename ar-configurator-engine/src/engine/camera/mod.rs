/// Viewer camera, host-driven pose updates and ground-plane picking.
pub mod viewer_camera;
