use bevy::prelude::*;

use crate::configurator::{ConfiguratorSession, VariantStatus};
use crate::engine::core::app_state::ReadoutText;
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Default, PartialEq)]
pub struct SentState {
    status: Option<VariantStatus>,
    scale: Option<f32>,
    placement: Option<(bool, bool)>,
}

pub fn scale_label(scale: f32) -> String {
    format!("{scale:.2}×")
}

/// Pushes variant status, scale and placement changes to the host page.
pub fn session_notification_system(
    session: Res<ConfiguratorSession>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut sent: Local<SentState>,
) {
    if !session.is_changed() {
        return;
    }

    let status = session.status();
    if sent.status != Some(status) {
        rpc_interface.send_notification(
            "variant_status",
            serde_json::json!({ "status": status.as_str() }),
        );
        sent.status = Some(status);
    }

    let scale = session.selection().scale;
    if sent.scale != Some(scale) {
        rpc_interface.send_notification(
            "scale_changed",
            serde_json::json!({ "scale": scale, "label": scale_label(scale) }),
        );
        sent.scale = Some(scale);
    }

    let placement = (session.is_placed(), session.is_reposition_armed());
    if sent.placement != Some(placement) {
        rpc_interface.send_notification(
            "placement_changed",
            serde_json::json!({
                "placed": placement.0,
                "reposition_armed": placement.1,
            }),
        );
        sent.placement = Some(placement);
    }
}

pub fn readout_text_update_system(
    session: Res<ConfiguratorSession>,
    mut query: Query<&mut Text, With<ReadoutText>>,
) {
    if !session.is_changed() {
        return;
    }

    let selection = session.selection();
    let footprint = session.footprint_text();
    let placement = match (session.is_placed(), session.is_reposition_armed()) {
        (false, _) => "tap the floor to place",
        (true, false) => "placed",
        (true, true) => "tap to move",
    };

    for mut text in &mut query {
        text.0 = format!(
            "Variant: {} [{}]\nColour: {}  Scale: {}\nGuard: {}  Stand: {}  Hose: {}\n\
             W {}  D {}  H {}  Area {}\n{}",
            selection.variant,
            session.status(),
            selection.color,
            scale_label(selection.scale),
            selection.attachments.guard,
            selection.attachments.stand,
            selection.attachments.hose,
            footprint.w,
            footprint.d,
            footprint.h,
            footprint.area,
            placement,
        );
    }
}
