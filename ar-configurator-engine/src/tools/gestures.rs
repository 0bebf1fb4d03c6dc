use bevy::prelude::*;

use crate::configurator::{ConfiguratorSession, ContactPoint, GestureInterpreter};

#[derive(Resource, Default, Deref, DerefMut)]
pub struct TouchGestures(pub GestureInterpreter);

/// Feeds the active touches to the interpreter and applies its output.
pub fn touch_gesture_system(
    touches: Res<Touches>,
    mut gestures: ResMut<TouchGestures>,
    mut session: ResMut<ConfiguratorSession>,
) {
    let mut contacts: Vec<ContactPoint> = touches
        .iter()
        .map(|touch| ContactPoint {
            id: touch.id(),
            position: touch.position(),
        })
        .collect();
    contacts.sort_by_key(|contact| contact.id);

    if contacts.is_empty() && !gestures.is_active() {
        return;
    }

    let current = session.composite_scale_yaw();
    let limits = session.catalog().scale_limits;
    if let Some(update) = gestures.update(&contacts, current, &limits) {
        session.apply_gesture(update);
    }
}
