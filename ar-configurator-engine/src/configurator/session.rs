//! Placement state machine and the UI-facing configuration.
//!
//! `ConfiguratorSession` owns the anchor, the composite and the selection the
//! UI shows. Every UI action is one method call here; scene edits and asset
//! loads leave through the [`SceneOutbox`].

use bevy::prelude::*;
use constants::transform_limits::DEFAULT_SCALE;

use super::catalog::ProductCatalog;
use super::color::ColorHex;
use super::composite::{AttachmentFlags, AttachmentKind, ProductComposite};
use super::export::ConfigRecord;
use super::footprint::{Footprint, FootprintText};
use super::gesture::GestureUpdate;
use super::loading::{AssetLoadError, LoadRequest, LoadTicket, LoadedAsset, VariantStatus};
use super::scene_ops::{CompositeId, SceneOp, SceneOutbox};

/// Best surface hit under the viewer's ray for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePose {
    pub position: Vec3,
    pub orientation: Quat,
}

/// World-space point the product is attached to. Orientation follows world up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub position: Vec3,
}

#[derive(Debug)]
pub struct PlacedProduct {
    pub anchor: Anchor,
    pub composite: ProductComposite,
    pub reposition_armed: bool,
}

#[derive(Debug, Default)]
pub enum PlacementState {
    #[default]
    Idle,
    Placed(PlacedProduct),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    Ignored,
    Placed,
    Repositioned,
}

/// Values the UI controls display.
#[derive(Debug, Clone, PartialEq)]
pub struct UiSelection {
    pub variant: String,
    pub color: ColorHex,
    pub scale: f32,
    pub attachments: AttachmentFlags,
}

impl UiSelection {
    pub fn from_catalog(catalog: &ProductCatalog) -> Self {
        Self {
            variant: catalog.default_variant.clone(),
            color: catalog.default_color,
            scale: catalog.scale_limits.clamp(DEFAULT_SCALE),
            attachments: catalog.default_attachments,
        }
    }
}

#[derive(Resource, Debug)]
pub struct ConfiguratorSession {
    catalog: ProductCatalog,
    selection: UiSelection,
    state: PlacementState,
    status: VariantStatus,
    footprint: Option<Footprint>,
    outbox: SceneOutbox,
    color_revision: u64,
    next_composite: u64,
}

impl Default for ConfiguratorSession {
    fn default() -> Self {
        Self::new(ProductCatalog::default())
    }
}

impl ConfiguratorSession {
    pub fn new(catalog: ProductCatalog) -> Self {
        Self {
            selection: UiSelection::from_catalog(&catalog),
            catalog,
            state: PlacementState::Idle,
            status: VariantStatus::Waiting,
            footprint: None,
            outbox: SceneOutbox::default(),
            color_revision: 0,
            next_composite: 0,
        }
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    /// Swaps in a freshly loaded catalog. Ignored once a product is placed.
    pub fn replace_catalog(&mut self, catalog: ProductCatalog) -> bool {
        if self.is_placed() {
            return false;
        }
        let catalog = catalog.validated();
        self.selection = UiSelection::from_catalog(&catalog);
        self.catalog = catalog;
        true
    }

    pub fn selection(&self) -> &UiSelection {
        &self.selection
    }

    pub fn status(&self) -> VariantStatus {
        self.status
    }

    pub fn footprint(&self) -> Option<&Footprint> {
        self.footprint.as_ref()
    }

    pub fn footprint_text(&self) -> FootprintText {
        FootprintText::from_footprint(self.footprint.as_ref())
    }

    pub fn color_revision(&self) -> u64 {
        self.color_revision
    }

    pub fn is_placed(&self) -> bool {
        matches!(self.state, PlacementState::Placed(_))
    }

    pub fn is_reposition_armed(&self) -> bool {
        matches!(&self.state, PlacementState::Placed(p) if p.reposition_armed)
    }

    pub fn anchor(&self) -> Option<&Anchor> {
        match &self.state {
            PlacementState::Placed(placed) => Some(&placed.anchor),
            PlacementState::Idle => None,
        }
    }

    pub fn composite(&self) -> Option<&ProductComposite> {
        match &self.state {
            PlacementState::Placed(placed) => Some(&placed.composite),
            PlacementState::Idle => None,
        }
    }

    pub fn outbox(&self) -> &SceneOutbox {
        &self.outbox
    }

    pub fn take_scene_ops(&mut self) -> Vec<SceneOp> {
        self.outbox.take_ops()
    }

    pub fn take_load_requests(&mut self) -> Vec<LoadRequest> {
        self.outbox.take_load_requests()
    }

    /// Accepts a tap on the tracked surface.
    ///
    /// Without a pose nothing happens. The first accepted tap anchors and
    /// builds the product; later taps only move the anchor while reposition
    /// is armed.
    pub fn request_place_or_reposition(&mut self, pose: Option<&SurfacePose>) -> PlacementOutcome {
        let Some(pose) = pose else {
            debug!("Tap ignored: no surface tracked");
            return PlacementOutcome::Ignored;
        };

        if let PlacementState::Placed(placed) = &mut self.state {
            if !placed.reposition_armed {
                debug!("Tap ignored: already placed and reposition not armed");
                return PlacementOutcome::Ignored;
            }
            placed.anchor.position = pose.position;
            placed.reposition_armed = false;
            info!("Product repositioned to {:?}", pose.position);
            return PlacementOutcome::Repositioned;
        }

        self.place(pose.position);
        PlacementOutcome::Placed
    }

    fn place(&mut self, position: Vec3) {
        self.next_composite += 1;
        let id = CompositeId(self.next_composite);
        let mut composite = ProductComposite::new(id, self.selection.scale);
        self.outbox.push(SceneOp::SpawnComposite { composite: id });

        info!(
            "Product placed at {:?} (variant '{}')",
            position, self.selection.variant
        );

        let color = self.selection.color;
        self.status = composite.begin_variant(
            &self.selection.variant,
            self.catalog.model_path(&self.selection.variant),
            color,
            &mut self.outbox,
        );
        for kind in AttachmentKind::ALL {
            let enabled = self.selection.attachments.get(kind);
            composite.set_attachment(kind, enabled, color, &mut self.outbox);
        }

        self.state = PlacementState::Placed(PlacedProduct {
            anchor: Anchor { position },
            composite,
            reposition_armed: false,
        });
    }

    /// Arms the next accepted tap to move the anchor. No effect while idle.
    pub fn arm_reposition(&mut self) -> bool {
        match &mut self.state {
            PlacementState::Placed(placed) => {
                placed.reposition_armed = true;
                true
            }
            PlacementState::Idle => false,
        }
    }

    /// Tears the product down and restores the catalog defaults.
    pub fn reset(&mut self) {
        if let PlacementState::Placed(placed) = std::mem::take(&mut self.state) {
            let id = placed.composite.id();
            self.outbox.cancel_loads_for(id);
            self.outbox.push(SceneOp::DespawnComposite { composite: id });
            info!("Product removed");
        }

        self.selection = UiSelection::from_catalog(&self.catalog);
        self.status = VariantStatus::Waiting;
        self.footprint = None;
        self.color_revision += 1;
    }

    /// Records the selected variant and, once placed, swaps the base.
    pub fn set_variant(&mut self, variant: &str) -> VariantStatus {
        self.selection.variant = variant.to_string();

        let PlacementState::Placed(placed) = &mut self.state else {
            return self.status;
        };

        let model_path = self.catalog.model_path(variant);
        if model_path.is_none() {
            warn!(
                "{}; using placeholder",
                AssetLoadError::Unmapped(variant.to_string())
            );
        }
        info!("Variant '{variant}' requested");

        self.status = placed.composite.begin_variant(
            variant,
            model_path,
            self.selection.color,
            &mut self.outbox,
        );
        self.status
    }

    /// Whether a load issued with `ticket` would still be accepted.
    pub fn is_ticket_current(&self, ticket: LoadTicket) -> bool {
        self.composite().is_some_and(|c| {
            c.current_ticket() == ticket && c.base().is_none() && c.pending_variant().is_some()
        })
    }

    /// Delivers an asset load result. Stale results are dropped.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<LoadedAsset, AssetLoadError>,
    ) -> Option<VariantStatus> {
        let PlacementState::Placed(placed) = &mut self.state else {
            debug!("Discarding load result for removed product");
            return None;
        };

        let Some(status) = placed.composite.complete_variant(
            ticket,
            result,
            self.selection.color,
            &mut self.outbox,
        ) else {
            debug!("Discarding stale load result {:?}", ticket);
            return None;
        };

        self.status = status;
        Some(status)
    }

    pub fn set_attachment(&mut self, kind: AttachmentKind, enabled: bool) {
        self.selection.attachments.set(kind, enabled);

        if let PlacementState::Placed(placed) = &mut self.state {
            let color = self.selection.color;
            if placed
                .composite
                .set_attachment(kind, enabled, color, &mut self.outbox)
            {
                info!("Attachment '{}' constructed", kind.as_str());
            }
        }
    }

    pub fn set_color(&mut self, color: ColorHex) {
        self.selection.color = color;
        if let PlacementState::Placed(placed) = &mut self.state {
            placed.composite.apply_color(color);
        }
        self.color_revision += 1;
    }

    /// Clamps and stores the scale; returns the value actually applied.
    pub fn set_scale(&mut self, scale: f32) -> f32 {
        let scale = self.catalog.scale_limits.clamp(scale);
        self.selection.scale = scale;
        if let PlacementState::Placed(placed) = &mut self.state {
            placed.composite.set_scale(scale);
        }
        scale
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        if let PlacementState::Placed(placed) = &mut self.state {
            placed.composite.set_yaw(yaw);
        }
    }

    /// Current `(scale, yaw)` of the composite.
    pub fn composite_scale_yaw(&self) -> Option<(f32, f32)> {
        self.composite().map(|c| (c.scale(), c.yaw()))
    }

    pub fn apply_gesture(&mut self, update: GestureUpdate) {
        let PlacementState::Placed(placed) = &mut self.state else {
            return;
        };
        let scale = self.catalog.scale_limits.clamp(update.scale);
        placed.composite.set_scale(scale);
        placed.composite.set_yaw(update.yaw);
        self.selection.scale = scale;
    }

    /// World transform of the composite root.
    pub fn composite_transform(&self) -> Option<Transform> {
        let PlacementState::Placed(placed) = &self.state else {
            return None;
        };
        Some(
            Transform::from_translation(placed.anchor.position)
                .with_rotation(Quat::from_rotation_y(placed.composite.yaw()))
                .with_scale(Vec3::splat(placed.composite.scale())),
        )
    }

    /// Recomputes the footprint. Leaves the last value untouched while idle.
    pub fn measure_footprint(&mut self) -> Option<Footprint> {
        let PlacementState::Placed(placed) = &self.state else {
            return None;
        };
        let bounds = placed.composite.world_bounds(placed.anchor.position);
        let footprint = Footprint::from_bounds(&bounds);
        self.footprint = Some(footprint);
        Some(footprint)
    }

    /// Snapshot of the current configuration.
    pub fn export(&self) -> ConfigRecord {
        let color = self
            .composite()
            .and_then(|c| c.representative_color())
            .unwrap_or(self.selection.color);

        ConfigRecord {
            variant: self.selection.variant.clone(),
            color,
            scale: self.selection.scale,
            attachments: self.selection.attachments,
            footprint: self.footprint_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurator::composite::CompositeNode;
    use crate::configurator::shapes::Bounds3;

    fn pose(x: f32, z: f32) -> SurfacePose {
        SurfacePose {
            position: Vec3::new(x, 0.0, z),
            orientation: Quat::IDENTITY,
        }
    }

    fn loaded() -> LoadedAsset {
        LoadedAsset {
            scene: Handle::default(),
            bounds: Bounds3::new(Vec3::new(-0.3, 0.0, -0.2), Vec3::new(0.3, 0.3, 0.2)),
        }
    }

    #[test]
    fn catalog_with_inverted_limits_installs_defaults() {
        let mut session = ConfiguratorSession::default();
        let mut catalog = ProductCatalog::default();
        catalog.scale_limits.min = 2.0;
        catalog.scale_limits.max = 0.5;

        assert!(session.replace_catalog(catalog));
        assert_eq!(
            session.catalog().scale_limits,
            crate::configurator::catalog::ScaleLimits::default()
        );
        assert_eq!(session.selection().scale, 1.0);
        assert_eq!(session.set_scale(5.0), 2.0);
    }

    #[test]
    fn tap_without_surface_is_ignored() {
        let mut session = ConfiguratorSession::default();
        assert_eq!(session.request_place_or_reposition(None), PlacementOutcome::Ignored);
        assert!(!session.is_placed());
        assert!(session.outbox().pending_ops().is_empty());
    }

    #[test]
    fn second_tap_without_arming_is_ignored() {
        let mut session = ConfiguratorSession::default();
        session.request_place_or_reposition(Some(&pose(1.0, 2.0)));

        let outcome = session.request_place_or_reposition(Some(&pose(5.0, 5.0)));
        assert_eq!(outcome, PlacementOutcome::Ignored);
        assert_eq!(session.anchor().map(|a| a.position), Some(Vec3::new(1.0, 0.0, 2.0)));
    }

    #[test]
    fn arming_before_placement_has_no_effect() {
        let mut session = ConfiguratorSession::default();
        assert!(!session.arm_reposition());
        assert!(!session.is_reposition_armed());
    }

    #[test]
    fn placement_requests_default_model_and_builds_attachments() {
        let mut session = ConfiguratorSession::default();
        session.request_place_or_reposition(Some(&pose(0.0, 0.0)));

        assert_eq!(session.status(), VariantStatus::Waiting);
        let loads = session.take_load_requests();
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].path, "models/standard.glb");

        let composite = session.composite().unwrap();
        assert!(
            composite
                .attachment(AttachmentKind::Guard)
                .is_some_and(|a| a.is_visible())
        );
        assert!(
            composite
                .attachment(AttachmentKind::Hose)
                .is_some_and(|a| !a.is_visible())
        );
    }

    #[test]
    fn completed_load_is_accepted_once() {
        let mut session = ConfiguratorSession::default();
        session.request_place_or_reposition(Some(&pose(0.0, 0.0)));
        let ticket = session.take_load_requests()[0].ticket;

        assert!(session.is_ticket_current(ticket));
        assert_eq!(session.complete_load(ticket, Ok(loaded())), Some(VariantStatus::Loaded));
        assert!(!session.is_ticket_current(ticket));
        assert_eq!(session.complete_load(ticket, Ok(loaded())), None);
    }

    #[test]
    fn variant_change_before_placement_is_deferred() {
        let mut session = ConfiguratorSession::default();
        session.set_variant("pro");
        assert!(session.take_load_requests().is_empty());

        session.request_place_or_reposition(Some(&pose(0.0, 0.0)));
        let loads = session.take_load_requests();
        assert_eq!(loads[0].variant, "pro");
    }

    #[test]
    fn unmapped_variant_uses_placeholder_immediately() {
        let mut session = ConfiguratorSession::default();
        session.request_place_or_reposition(Some(&pose(0.0, 0.0)));

        assert_eq!(session.set_variant("deluxe"), VariantStatus::Placeholder);
        assert!(session.composite().and_then(|c| c.base()).is_some_and(|b| b.is_placeholder()));
    }

    #[test]
    fn reset_drops_pending_loads() {
        let mut session = ConfiguratorSession::default();
        session.request_place_or_reposition(Some(&pose(0.0, 0.0)));
        let ticket = session.composite().unwrap().current_ticket();

        session.reset();

        assert!(session.outbox().pending_loads().is_empty());
        assert_eq!(session.complete_load(ticket, Ok(loaded())), None);
        assert!(matches!(
            session.take_scene_ops().last(),
            Some(SceneOp::DespawnComposite { .. })
        ));
    }

    #[test]
    fn footprint_follows_scale_and_yaw() {
        let mut session = ConfiguratorSession::default();
        session.set_attachment(AttachmentKind::Guard, false);
        session.request_place_or_reposition(Some(&pose(0.0, 0.0)));
        let ticket = session.take_load_requests()[0].ticket;
        session.complete_load(ticket, Ok(loaded()));

        let base = session.measure_footprint().unwrap();
        assert!((base.width - 0.6).abs() < 1.0e-5);
        assert!((base.depth - 0.4).abs() < 1.0e-5);

        session.set_scale(2.0);
        let doubled = session.measure_footprint().unwrap();
        assert!((doubled.width - 1.2).abs() < 1.0e-5);
        assert!((doubled.height - 0.6).abs() < 1.0e-5);

        session.set_yaw(std::f32::consts::FRAC_PI_2);
        let turned = session.measure_footprint().unwrap();
        assert!((turned.width - 0.8).abs() < 1.0e-4);
        assert!((turned.depth - 1.2).abs() < 1.0e-4);
    }

    #[test]
    fn gesture_pushes_scale_into_selection() {
        let mut session = ConfiguratorSession::default();
        session.request_place_or_reposition(Some(&pose(0.0, 0.0)));

        session.apply_gesture(GestureUpdate { scale: 1.75, yaw: 0.5 });

        assert_eq!(session.selection().scale, 1.75);
        assert_eq!(session.composite_scale_yaw(), Some((1.75, 0.5)));
    }
}
