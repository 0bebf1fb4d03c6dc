//! Two-finger pinch and twist on the placed product.

use bevy::math::Vec2;
use constants::transform_limits::MIN_GESTURE_DISTANCE;

use super::catalog::ScaleLimits;

/// One active touch, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub id: u64,
    pub position: Vec2,
}

/// Values captured when two contacts went down.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GestureStart {
    ids: (u64, u64),
    distance: f32,
    angle: f32,
    scale: f32,
    yaw: f32,
}

/// Scale and yaw to apply to the composite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureUpdate {
    pub scale: f32,
    pub yaw: f32,
}

#[derive(Debug, Default)]
pub struct GestureInterpreter {
    active: Option<GestureStart>,
}

impl GestureInterpreter {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Feeds the contacts of the current frame.
    ///
    /// `current` is the composite's `(scale, yaw)`, or `None` when nothing is
    /// placed. The frame on which a gesture starts only records start values
    /// and yields no update. Any contact count other than two, or a different
    /// pair of contacts, ends the gesture.
    pub fn update(
        &mut self,
        contacts: &[ContactPoint],
        current: Option<(f32, f32)>,
        limits: &ScaleLimits,
    ) -> Option<GestureUpdate> {
        let (Some((scale, yaw)), [first, second]) = (current, contacts) else {
            self.active = None;
            return None;
        };

        let (a, b) = if first.id <= second.id {
            (first, second)
        } else {
            (second, first)
        };
        let ids = (a.id, b.id);
        let delta = b.position - a.position;
        let distance = delta.length();
        let angle = delta.y.atan2(delta.x);

        match self.active {
            Some(start) if start.ids == ids => {
                let factor = if start.distance < MIN_GESTURE_DISTANCE {
                    1.0
                } else {
                    distance / start.distance
                };
                Some(GestureUpdate {
                    scale: limits.clamp(start.scale * factor),
                    yaw: start.yaw + (angle - start.angle),
                })
            }
            _ => {
                self.active = Some(GestureStart {
                    ids,
                    distance,
                    angle,
                    scale,
                    yaw,
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn contact(id: u64, x: f32, y: f32) -> ContactPoint {
        ContactPoint {
            id,
            position: Vec2::new(x, y),
        }
    }

    #[test]
    fn pinch_scales_relative_to_start() {
        let mut gesture = GestureInterpreter::default();
        let limits = ScaleLimits::default();

        let start = [contact(1, 0.0, 0.0), contact(2, 100.0, 0.0)];
        assert_eq!(gesture.update(&start, Some((1.0, 0.0)), &limits), None);

        let spread = [contact(1, 0.0, 0.0), contact(2, 150.0, 0.0)];
        let update = gesture.update(&spread, Some((1.0, 0.0)), &limits);
        assert_eq!(update.map(|u| u.scale), Some(1.5));
    }

    #[test]
    fn scale_is_clamped() {
        let mut gesture = GestureInterpreter::default();
        let limits = ScaleLimits::default();

        gesture.update(&[contact(1, 0.0, 0.0), contact(2, 10.0, 0.0)], Some((1.5, 0.0)), &limits);
        let grow = gesture.update(&[contact(1, 0.0, 0.0), contact(2, 100.0, 0.0)], Some((1.5, 0.0)), &limits);
        assert_eq!(grow.map(|u| u.scale), Some(2.0));

        let shrink = gesture.update(&[contact(1, 0.0, 0.0), contact(2, 1.0, 0.0)], Some((2.0, 0.0)), &limits);
        assert_eq!(shrink.map(|u| u.scale), Some(0.5));
    }

    #[test]
    fn twist_adds_angle_delta_to_start_yaw() {
        let mut gesture = GestureInterpreter::default();
        let limits = ScaleLimits::default();

        gesture.update(&[contact(3, 0.0, 0.0), contact(4, 50.0, 0.0)], Some((1.0, 0.25)), &limits);
        let update = gesture
            .update(&[contact(4, 0.0, 50.0), contact(3, 0.0, 0.0)], Some((1.0, 0.25)), &limits)
            .unwrap();

        assert!((update.yaw - (0.25 + FRAC_PI_2)).abs() < 1.0e-5);
        assert!((update.scale - 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn degenerate_start_distance_keeps_scale() {
        let mut gesture = GestureInterpreter::default();
        let limits = ScaleLimits::default();

        gesture.update(&[contact(1, 5.0, 5.0), contact(2, 5.0, 5.0)], Some((1.2, 0.0)), &limits);
        let update = gesture.update(&[contact(1, 0.0, 0.0), contact(2, 80.0, 0.0)], Some((1.2, 0.0)), &limits);
        assert_eq!(update.map(|u| u.scale), Some(1.2));
    }

    #[test]
    fn contact_count_change_restarts_gesture() {
        let mut gesture = GestureInterpreter::default();
        let limits = ScaleLimits::default();

        gesture.update(&[contact(1, 0.0, 0.0), contact(2, 100.0, 0.0)], Some((1.0, 0.0)), &limits);
        assert!(gesture.update(&[contact(1, 0.0, 0.0)], Some((1.0, 0.0)), &limits).is_none());
        assert!(!gesture.is_active());

        // Fresh start values: the new pair begins at 200px, so no jump to 2.0.
        assert!(gesture
            .update(&[contact(1, 0.0, 0.0), contact(2, 200.0, 0.0)], Some((1.0, 0.0)), &limits)
            .is_none());
        let update = gesture.update(&[contact(1, 0.0, 0.0), contact(2, 200.0, 0.0)], Some((1.0, 0.0)), &limits);
        assert_eq!(update.map(|u| u.scale), Some(1.0));
    }

    #[test]
    fn nothing_placed_means_no_gesture() {
        let mut gesture = GestureInterpreter::default();
        let pair = [contact(1, 0.0, 0.0), contact(2, 100.0, 0.0)];
        assert!(gesture.update(&pair, None, &ScaleLimits::default()).is_none());
        assert!(!gesture.is_active());
    }
}
