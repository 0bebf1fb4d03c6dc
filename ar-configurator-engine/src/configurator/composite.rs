//! The assembled product: one base model plus the optional attachments.
//!
//! Every mutation that changes the scene graph is mirrored into the
//! [`SceneOutbox`] so the renderer can follow along without owning any of
//! this state.

use bevy::math::Affine3A;
use bevy::prelude::*;
use constants::product::{DEFAULT_GUARD_ENABLED, DEFAULT_HOSE_ENABLED, DEFAULT_STAND_ENABLED};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::color::ColorHex;
use super::loading::{AssetLoadError, LoadRequest, LoadTicket, LoadedAsset, VariantStatus};
use super::recipes::{attachment_parts, placeholder_parts};
use super::scene_ops::{CompositeId, NodeContent, NodeId, NodeRole, SceneOp, SceneOutbox};
use super::shapes::{Bounds3, Part};

/// Fixed set of optional sub-objects a product can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Guard,
    Stand,
    Hose,
}

impl AttachmentKind {
    pub const ALL: [AttachmentKind; 3] = [Self::Guard, Self::Stand, Self::Hose];

    /// Convert string identifier to attachment kind for RPC compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "guard" => Some(Self::Guard),
            "stand" => Some(Self::Stand),
            "hose" => Some(Self::Hose),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guard => "guard",
            Self::Stand => "stand",
            Self::Hose => "hose",
        }
    }
}

/// Checkbox state for every attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentFlags {
    pub guard: bool,
    pub stand: bool,
    pub hose: bool,
}

impl Default for AttachmentFlags {
    fn default() -> Self {
        Self {
            guard: DEFAULT_GUARD_ENABLED,
            stand: DEFAULT_STAND_ENABLED,
            hose: DEFAULT_HOSE_ENABLED,
        }
    }
}

impl AttachmentFlags {
    pub fn get(&self, kind: AttachmentKind) -> bool {
        match kind {
            AttachmentKind::Guard => self.guard,
            AttachmentKind::Stand => self.stand,
            AttachmentKind::Hose => self.hose,
        }
    }

    pub fn set(&mut self, kind: AttachmentKind, enabled: bool) {
        match kind {
            AttachmentKind::Guard => self.guard = enabled,
            AttachmentKind::Stand => self.stand = enabled,
            AttachmentKind::Hose => self.hose = enabled,
        }
    }
}

/// Read/write capabilities shared by everything attached to a composite.
pub trait CompositeNode {
    fn node_id(&self) -> NodeId;

    fn is_visible(&self) -> bool;

    /// World-space extent of the node under the composite's transform.
    fn bounds_in(&self, parent: &Affine3A) -> Bounds3;

    /// Base colour of the first colourable surface, if any.
    fn surface_color(&self) -> Option<ColorHex>;

    fn apply_color(&mut self, color: ColorHex);
}

fn parts_bounds(parts: &[Part], parent: &Affine3A) -> Bounds3 {
    parts
        .iter()
        .fold(Bounds3::EMPTY, |acc, part| acc.union(&part.bounds_in(parent)))
}

fn tint_parts(parts: &mut [Part], color: ColorHex) {
    for part in parts {
        part.surface.base_color = color;
    }
}

#[derive(Debug, Clone)]
pub enum BaseContent {
    /// A loaded model; its materials are tinted with `tint` by the renderer.
    Asset {
        asset: LoadedAsset,
        tint: Option<ColorHex>,
    },
    Placeholder(Vec<Part>),
}

#[derive(Debug, Clone)]
pub struct BaseModel {
    node: NodeId,
    variant: String,
    content: BaseContent,
}

impl BaseModel {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, BaseContent::Placeholder(_))
    }

    fn node_content(&self) -> NodeContent {
        match &self.content {
            BaseContent::Asset { asset, .. } => NodeContent::Asset(asset.clone()),
            BaseContent::Placeholder(parts) => NodeContent::Parts(parts.clone()),
        }
    }
}

impl CompositeNode for BaseModel {
    fn node_id(&self) -> NodeId {
        self.node
    }

    fn is_visible(&self) -> bool {
        true
    }

    fn bounds_in(&self, parent: &Affine3A) -> Bounds3 {
        match &self.content {
            BaseContent::Asset { asset, .. } => asset.bounds.transformed(parent),
            BaseContent::Placeholder(parts) => parts_bounds(parts, parent),
        }
    }

    fn surface_color(&self) -> Option<ColorHex> {
        match &self.content {
            BaseContent::Asset { tint, .. } => *tint,
            BaseContent::Placeholder(parts) => parts.first().map(|p| p.surface.base_color),
        }
    }

    fn apply_color(&mut self, color: ColorHex) {
        match &mut self.content {
            BaseContent::Asset { tint, .. } => *tint = Some(color),
            BaseContent::Placeholder(parts) => tint_parts(parts, color),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attachment {
    node: NodeId,
    parts: Vec<Part>,
    visible: bool,
}

impl Attachment {
    pub fn node(&self) -> NodeId {
        self.node
    }

}

impl CompositeNode for Attachment {
    fn node_id(&self) -> NodeId {
        self.node
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn bounds_in(&self, parent: &Affine3A) -> Bounds3 {
        parts_bounds(&self.parts, parent)
    }

    fn surface_color(&self) -> Option<ColorHex> {
        self.parts.first().map(|p| p.surface.base_color)
    }

    fn apply_color(&mut self, color: ColorHex) {
        tint_parts(&mut self.parts, color);
    }
}

/// Root of the placed product.
///
/// Holds at most one base at any time. A variant change detaches the current
/// base before the replacement is requested, and a load completion is only
/// accepted for the newest base slot.
#[derive(Debug)]
pub struct ProductComposite {
    id: CompositeId,
    base: Option<BaseModel>,
    slot: u64,
    pending_variant: Option<String>,
    attachments: BTreeMap<AttachmentKind, Attachment>,
    constructions: BTreeMap<AttachmentKind, u32>,
    scale: f32,
    yaw: f32,
}

impl ProductComposite {
    pub fn new(id: CompositeId, scale: f32) -> Self {
        Self {
            id,
            base: None,
            slot: 0,
            pending_variant: None,
            attachments: BTreeMap::new(),
            constructions: BTreeMap::new(),
            scale,
            yaw: 0.0,
        }
    }

    pub fn id(&self) -> CompositeId {
        self.id
    }

    pub fn base(&self) -> Option<&BaseModel> {
        self.base.as_ref()
    }

    pub fn attachment(&self, kind: AttachmentKind) -> Option<&Attachment> {
        self.attachments.get(&kind)
    }

    /// How many times an attachment of `kind` has been built for this composite.
    pub fn construction_count(&self, kind: AttachmentKind) -> u32 {
        self.constructions.get(&kind).copied().unwrap_or(0)
    }

    /// Variant whose model is still loading, if any.
    pub fn pending_variant(&self) -> Option<&str> {
        self.pending_variant.as_deref()
    }

    pub fn current_ticket(&self) -> LoadTicket {
        LoadTicket {
            composite: self.id,
            slot: self.slot,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    /// Starts a base swap.
    ///
    /// The current base is detached first. With a model path a load is
    /// queued and the slot stays empty until [`Self::complete_variant`];
    /// without one the placeholder is attached straight away.
    pub fn begin_variant(
        &mut self,
        variant: &str,
        model_path: Option<&str>,
        color: ColorHex,
        outbox: &mut SceneOutbox,
    ) -> VariantStatus {
        self.detach_base(outbox);
        self.slot += 1;

        match model_path {
            Some(path) => {
                self.pending_variant = Some(variant.to_string());
                outbox.request_load(LoadRequest {
                    ticket: self.current_ticket(),
                    variant: variant.to_string(),
                    path: path.to_string(),
                });
                VariantStatus::Waiting
            }
            None => {
                self.pending_variant = None;
                let content = BaseContent::Placeholder(placeholder_parts(variant));
                self.attach_base(variant.to_string(), content, color, outbox);
                VariantStatus::Placeholder
            }
        }
    }

    /// Resolves the pending base load. Returns `None` for stale tickets.
    pub fn complete_variant(
        &mut self,
        ticket: LoadTicket,
        result: Result<LoadedAsset, AssetLoadError>,
        color: ColorHex,
        outbox: &mut SceneOutbox,
    ) -> Option<VariantStatus> {
        if ticket != self.current_ticket() || self.base.is_some() {
            return None;
        }
        let variant = self.pending_variant.take()?;

        let (content, status) = match result {
            Ok(asset) => (
                BaseContent::Asset { asset, tint: None },
                VariantStatus::Loaded,
            ),
            Err(err) => {
                warn!("{err}; falling back to placeholder for '{variant}'");
                (
                    BaseContent::Placeholder(placeholder_parts(&variant)),
                    VariantStatus::Placeholder,
                )
            }
        };

        self.attach_base(variant, content, color, outbox);
        Some(status)
    }

    fn attach_base(
        &mut self,
        variant: String,
        content: BaseContent,
        color: ColorHex,
        outbox: &mut SceneOutbox,
    ) {
        self.detach_base(outbox);

        let mut base = BaseModel {
            node: outbox.alloc_node(),
            variant,
            content,
        };
        base.apply_color(color);

        outbox.push(SceneOp::AttachNode {
            composite: self.id,
            node: base.node,
            role: NodeRole::Base,
            content: base.node_content(),
            visible: true,
        });
        self.base = Some(base);
    }

    /// Detaches the base, if any. Its resources are released by the renderer
    /// in the same frame.
    pub fn detach_base(&mut self, outbox: &mut SceneOutbox) -> bool {
        let Some(base) = self.base.take() else {
            return false;
        };
        outbox.push(SceneOp::DetachNode { node: base.node });
        true
    }

    /// Shows or hides an attachment, building it on first use.
    ///
    /// Returns `true` when this call constructed the attachment.
    pub fn set_attachment(
        &mut self,
        kind: AttachmentKind,
        enabled: bool,
        color: ColorHex,
        outbox: &mut SceneOutbox,
    ) -> bool {
        if let Some(existing) = self.attachments.get_mut(&kind) {
            existing.visible = enabled;
            return false;
        }

        let mut attachment = Attachment {
            node: outbox.alloc_node(),
            parts: attachment_parts(kind),
            visible: enabled,
        };
        attachment.apply_color(color);

        outbox.push(SceneOp::AttachNode {
            composite: self.id,
            node: attachment.node,
            role: NodeRole::Attachment(kind),
            content: NodeContent::Parts(attachment.parts.clone()),
            visible: enabled,
        });

        *self.constructions.entry(kind).or_default() += 1;
        self.attachments.insert(kind, attachment);
        true
    }

    /// Base first, then attachments in a fixed order.
    pub fn nodes(&self) -> impl Iterator<Item = &dyn CompositeNode> {
        self.base
            .iter()
            .map(|base| base as &dyn CompositeNode)
            .chain(
                self.attachments
                    .values()
                    .map(|attachment| attachment as &dyn CompositeNode),
            )
    }

    pub fn apply_color(&mut self, color: ColorHex) {
        if let Some(base) = self.base.as_mut() {
            base.apply_color(color);
        }
        for attachment in self.attachments.values_mut() {
            attachment.apply_color(color);
        }
    }

    pub fn representative_color(&self) -> Option<ColorHex> {
        self.nodes().find_map(|node| node.surface_color())
    }

    /// Anchor translation, then yaw about +Y, then uniform scale.
    pub fn world_affine(&self, anchor_position: Vec3) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_rotation_y(self.yaw),
            anchor_position,
        )
    }

    /// World AABB of every visible node.
    pub fn world_bounds(&self, anchor_position: Vec3) -> Bounds3 {
        let xf = self.world_affine(anchor_position);
        self.nodes()
            .filter(|node| node.is_visible())
            .fold(Bounds3::EMPTY, |acc, node| acc.union(&node.bounds_in(&xf)))
    }

    pub fn node_visibility(&self) -> impl Iterator<Item = (NodeId, bool)> {
        self.nodes().map(|node| (node.node_id(), node.is_visible()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: ColorHex = ColorHex::new(0x3b82f6);
    const RED: ColorHex = ColorHex::new(0xef4444);

    fn asset() -> LoadedAsset {
        LoadedAsset {
            scene: Handle::default(),
            bounds: Bounds3::new(Vec3::new(-0.5, 0.0, -0.25), Vec3::new(0.5, 0.4, 0.25)),
        }
    }

    fn attach_nodes(outbox: &SceneOutbox) -> usize {
        outbox
            .pending_ops()
            .iter()
            .filter(|op| matches!(op, SceneOp::AttachNode { .. }))
            .count()
    }

    #[test]
    fn attachment_is_built_once_and_then_toggled() {
        let mut outbox = SceneOutbox::default();
        let mut composite = ProductComposite::new(CompositeId(1), 1.0);

        assert!(composite.set_attachment(AttachmentKind::Guard, true, BLUE, &mut outbox));
        assert!(!composite.set_attachment(AttachmentKind::Guard, false, BLUE, &mut outbox));
        assert!(!composite.set_attachment(AttachmentKind::Guard, true, BLUE, &mut outbox));

        assert_eq!(composite.construction_count(AttachmentKind::Guard), 1);
        assert_eq!(attach_nodes(&outbox), 1);
        assert!(composite.attachment(AttachmentKind::Guard).is_some_and(|a| a.is_visible()));
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut outbox = SceneOutbox::default();
        let mut composite = ProductComposite::new(CompositeId(1), 1.0);

        composite.begin_variant("pro", Some("models/pro.glb"), BLUE, &mut outbox);
        let stale = composite.current_ticket();
        composite.begin_variant("standard", Some("models/standard.glb"), BLUE, &mut outbox);
        let fresh = composite.current_ticket();

        assert_eq!(composite.complete_variant(stale, Ok(asset()), BLUE, &mut outbox), None);
        assert!(composite.base().is_none());

        let status = composite.complete_variant(fresh, Ok(asset()), BLUE, &mut outbox);
        assert_eq!(status, Some(VariantStatus::Loaded));
        assert_eq!(composite.base().map(|b| b.variant()), Some("standard"));
        assert_eq!(composite.representative_color(), Some(BLUE));
    }

    #[test]
    fn swapping_base_detaches_previous_node_first() {
        let mut outbox = SceneOutbox::default();
        let mut composite = ProductComposite::new(CompositeId(1), 1.0);

        composite.begin_variant("custom", None, BLUE, &mut outbox);
        let first = composite.base().map(|b| b.node());
        composite.begin_variant("other", None, BLUE, &mut outbox);

        let ops = outbox.take_ops();
        let detach_at = ops
            .iter()
            .position(|op| matches!(op, SceneOp::DetachNode { node } if Some(*node) == first));
        let last_attach = ops
            .iter()
            .rposition(|op| matches!(op, SceneOp::AttachNode { .. }));
        assert!(detach_at.is_some());
        assert!(detach_at < last_attach);
    }

    #[test]
    fn failed_load_falls_back_to_placeholder() {
        let mut outbox = SceneOutbox::default();
        let mut composite = ProductComposite::new(CompositeId(1), 1.0);

        composite.begin_variant("pro", Some("models/pro.glb"), RED, &mut outbox);
        let err = AssetLoadError::Failed {
            path: "models/pro.glb".into(),
            reason: "404".into(),
        };
        let status = composite.complete_variant(composite.current_ticket(), Err(err), RED, &mut outbox);

        assert_eq!(status, Some(VariantStatus::Placeholder));
        assert!(composite.base().is_some_and(|b| b.is_placeholder()));
        assert_eq!(composite.representative_color(), Some(RED));
    }

    #[test]
    fn hidden_attachments_do_not_widen_bounds() {
        let mut outbox = SceneOutbox::default();
        let mut composite = ProductComposite::new(CompositeId(1), 1.0);
        composite.begin_variant("standard", None, BLUE, &mut outbox);

        let bare = composite.world_bounds(Vec3::ZERO);
        composite.set_attachment(AttachmentKind::Guard, false, BLUE, &mut outbox);
        assert_eq!(composite.world_bounds(Vec3::ZERO), bare);

        composite.set_attachment(AttachmentKind::Guard, true, BLUE, &mut outbox);
        assert!(composite.world_bounds(Vec3::ZERO).size().z > bare.size().z);
    }

    #[test]
    fn apply_color_reaches_every_node() {
        let mut outbox = SceneOutbox::default();
        let mut composite = ProductComposite::new(CompositeId(1), 1.0);
        composite.begin_variant("standard", None, BLUE, &mut outbox);
        composite.set_attachment(AttachmentKind::Hose, true, BLUE, &mut outbox);

        composite.apply_color(RED);

        assert!(composite.nodes().all(|node| node.surface_color() == Some(RED)));
    }
}
