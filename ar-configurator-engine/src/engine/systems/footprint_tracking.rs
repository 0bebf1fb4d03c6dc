use bevy::prelude::*;

use crate::configurator::{ConfiguratorSession, FootprintText};
use crate::rpc::web_rpc::WebRpcInterface;

/// Measures the placed product every frame. Idle frames keep the last value.
pub fn track_footprint(mut session: ResMut<ConfiguratorSession>) {
    if !session.is_placed() {
        return;
    }
    session.measure_footprint();
}

pub fn footprint_notification_system(
    session: Res<ConfiguratorSession>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut last_sent: Local<Option<FootprintText>>,
) {
    let text = session.footprint_text();
    if last_sent.as_ref() == Some(&text) {
        return;
    }

    rpc_interface.send_notification(
        "footprint_update",
        serde_json::json!({
            "w": text.w,
            "d": text.d,
            "h": text.h,
            "area": text.area,
        }),
    );
    *last_sent = Some(text);
}
