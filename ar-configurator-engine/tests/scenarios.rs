use ar_configurator_engine::configurator::composite::CompositeNode;
use ar_configurator_engine::configurator::loading::LoadRequest;
use ar_configurator_engine::configurator::scene_ops::{NodeRole, SceneOp};
use ar_configurator_engine::configurator::shapes::Bounds3;
use ar_configurator_engine::configurator::{
    AssetLoadError, AttachmentKind, ColorHex, ConfiguratorSession, ContactPoint,
    GestureInterpreter, LoadedAsset, PlacementOutcome, SurfacePose, VariantStatus,
};
use bevy::prelude::*;

fn pose(x: f32, z: f32) -> SurfacePose {
    SurfacePose {
        position: Vec3::new(x, 0.0, z),
        orientation: Quat::IDENTITY,
    }
}

fn model() -> LoadedAsset {
    LoadedAsset {
        scene: Handle::default(),
        bounds: Bounds3::new(Vec3::new(-0.3, 0.0, -0.3), Vec3::new(0.3, 0.32, 0.3)),
    }
}

fn placed_session() -> (ConfiguratorSession, LoadRequest) {
    let mut session = ConfiguratorSession::default();
    assert_eq!(
        session.request_place_or_reposition(Some(&pose(0.0, -1.0))),
        PlacementOutcome::Placed
    );
    let mut loads = session.take_load_requests();
    assert_eq!(loads.len(), 1);
    (session, loads.remove(0))
}

fn base_attach_count(ops: &[SceneOp]) -> usize {
    ops.iter()
        .filter(|op| {
            matches!(
                op,
                SceneOp::AttachNode {
                    role: NodeRole::Base,
                    ..
                }
            )
        })
        .count()
}

#[test]
fn placing_with_missing_model_falls_back_to_placeholder() {
    let (mut session, load) = placed_session();
    assert_eq!(session.status(), VariantStatus::Waiting);

    let failure = AssetLoadError::Failed {
        path: load.path.clone(),
        reason: "not found".into(),
    };
    assert_eq!(
        session.complete_load(load.ticket, Err(failure)),
        Some(VariantStatus::Placeholder)
    );

    let footprint = session.measure_footprint().unwrap();
    assert!(footprint.area > 0.0);
    assert_eq!(session.export().footprint.area, session.footprint_text().area);
}

#[test]
fn placing_with_model_reports_loaded() {
    let (mut session, load) = placed_session();
    assert_eq!(
        session.complete_load(load.ticket, Ok(model())),
        Some(VariantStatus::Loaded)
    );
    assert!(session.measure_footprint().is_some_and(|fp| fp.area > 0.0));
}

#[test]
fn toggling_attachment_constructs_it_once() {
    let (mut session, _) = placed_session();

    for enabled in [true, false, true] {
        session.set_attachment(AttachmentKind::Guard, enabled);
    }
    session.set_attachment(AttachmentKind::Hose, true);
    session.set_attachment(AttachmentKind::Hose, false);

    let composite = session.composite().unwrap();
    for kind in AttachmentKind::ALL {
        assert_eq!(composite.construction_count(kind), 1, "{}", kind.as_str());
    }
    assert!(composite.attachment(AttachmentKind::Guard).unwrap().is_visible());
    assert!(!composite.attachment(AttachmentKind::Hose).unwrap().is_visible());
}

#[test]
fn pinch_from_100_to_150_pixels_scales_by_half() {
    let (mut session, _) = placed_session();
    let mut gestures = GestureInterpreter::default();
    let limits = session.catalog().scale_limits;

    let down = [
        ContactPoint { id: 7, position: Vec2::new(100.0, 300.0) },
        ContactPoint { id: 9, position: Vec2::new(200.0, 300.0) },
    ];
    let spread = [
        ContactPoint { id: 7, position: Vec2::new(100.0, 300.0) },
        ContactPoint { id: 9, position: Vec2::new(250.0, 300.0) },
    ];

    assert!(gestures.update(&down, session.composite_scale_yaw(), &limits).is_none());
    let update = gestures
        .update(&spread, session.composite_scale_yaw(), &limits)
        .unwrap();
    session.apply_gesture(update);

    assert_eq!(session.composite_scale_yaw().map(|(s, _)| s), Some(1.5));
    assert_eq!(session.selection().scale, 1.5);
}

#[test]
fn superseded_variant_never_attaches() {
    let (mut session, first) = placed_session();
    let ops_before = session.take_scene_ops();
    assert_eq!(base_attach_count(&ops_before), 0);

    session.set_variant("pro");
    session.set_variant("standard");
    let loads = session.take_load_requests();
    let pro = loads.iter().find(|l| l.variant == "pro").unwrap();
    let standard = loads.iter().find(|l| l.variant == "standard").unwrap();

    // Results arrive out of order.
    assert_eq!(session.complete_load(standard.ticket, Ok(model())), Some(VariantStatus::Loaded));
    assert_eq!(session.complete_load(pro.ticket, Ok(model())), None);
    assert_eq!(session.complete_load(first.ticket, Ok(model())), None);

    let base = session.composite().and_then(|c| c.base()).unwrap();
    assert_eq!(base.variant(), "standard");
    assert_eq!(base_attach_count(&session.take_scene_ops()), 1);
}

#[test]
fn reposition_moves_without_rebuilding() {
    let (mut session, load) = placed_session();
    session.complete_load(load.ticket, Ok(model()));
    session.set_attachment(AttachmentKind::Stand, true);
    session.set_color(ColorHex::new(0xef4444));
    session.set_scale(1.3);
    session.take_scene_ops();

    let nodes_before: Vec<_> = session
        .composite()
        .unwrap()
        .nodes()
        .map(|n| n.node_id())
        .collect();

    assert!(session.arm_reposition());
    assert_eq!(
        session.request_place_or_reposition(Some(&pose(2.0, 0.5))),
        PlacementOutcome::Repositioned
    );

    assert_eq!(session.anchor().map(|a| a.position), Some(Vec3::new(2.0, 0.0, 0.5)));
    assert!(!session.is_reposition_armed());
    assert!(session.take_scene_ops().is_empty());
    assert!(session.take_load_requests().is_empty());

    let composite = session.composite().unwrap();
    let nodes_after: Vec<_> = composite.nodes().map(|n| n.node_id()).collect();
    assert_eq!(nodes_before, nodes_after);
    assert_eq!(composite.scale(), 1.3);
    assert_eq!(composite.representative_color(), Some(ColorHex::new(0xef4444)));
    assert_eq!(composite.construction_count(AttachmentKind::Stand), 1);
}

#[test]
fn composite_exists_only_with_anchor() {
    let mut session = ConfiguratorSession::default();
    assert!(session.composite().is_none() && session.anchor().is_none());

    session.request_place_or_reposition(Some(&pose(0.0, 0.0)));
    assert!(session.composite().is_some() && session.anchor().is_some());

    session.reset();
    assert!(session.composite().is_none() && session.anchor().is_none());
}

#[test]
fn export_is_idempotent() {
    let (mut session, load) = placed_session();
    session.complete_load(load.ticket, Ok(model()));
    session.measure_footprint();

    let first = session.export().to_json_pretty().unwrap();
    let second = session.export().to_json_pretty().unwrap();
    assert_eq!(first, second);
}

#[test]
fn reset_returns_to_fresh_session() {
    let fresh = ConfiguratorSession::default();
    let (mut session, _) = placed_session();
    session.set_variant("pro");
    session.set_color(ColorHex::new(0x22c55e));
    session.set_scale(1.8);
    session.set_attachment(AttachmentKind::Hose, true);
    session.measure_footprint();

    session.reset();

    assert_eq!(session.selection(), fresh.selection());
    assert_eq!(session.status(), fresh.status());
    assert_eq!(session.footprint_text(), fresh.footprint_text());
    assert_eq!(session.export(), fresh.export());
    assert!(!session.is_placed());
    assert!(session.outbox().pending_loads().is_empty());
}

#[test]
fn scale_is_clamped_at_both_limits() {
    let (mut session, _) = placed_session();
    assert_eq!(session.set_scale(0.5), 0.5);
    assert_eq!(session.set_scale(0.49), 0.5);
    assert_eq!(session.set_scale(2.0), 2.0);
    assert_eq!(session.set_scale(7.0), 2.0);
    assert_eq!(session.composite_scale_yaw().map(|(s, _)| s), Some(2.0));
}
