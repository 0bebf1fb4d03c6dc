use super::composite::AttachmentKind;
use super::loading::{LoadRequest, LoadedAsset};
use super::shapes::Part;

/// Identity of one composite lifetime. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeId(pub u64);

/// Identity of a node (base or attachment) attached to a composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Base,
    Attachment(AttachmentKind),
}

#[derive(Debug, Clone)]
pub enum NodeContent {
    Parts(Vec<Part>),
    Asset(LoadedAsset),
}

/// Scene-graph edit emitted by the session for the renderer to apply.
#[derive(Debug, Clone)]
pub enum SceneOp {
    SpawnComposite {
        composite: CompositeId,
    },
    /// Removes the composite and every node still attached to it.
    DespawnComposite {
        composite: CompositeId,
    },
    AttachNode {
        composite: CompositeId,
        node: NodeId,
        role: NodeRole,
        content: NodeContent,
        visible: bool,
    },
    /// Releases the node's meshes and materials in the frame it is applied.
    DetachNode {
        node: NodeId,
    },
}

/// Pending scene edits and asset requests, drained once per frame.
#[derive(Debug, Default)]
pub struct SceneOutbox {
    ops: Vec<SceneOp>,
    load_requests: Vec<LoadRequest>,
    next_node: u64,
}

impl SceneOutbox {
    pub fn alloc_node(&mut self) -> NodeId {
        self.next_node += 1;
        NodeId(self.next_node)
    }

    pub fn push(&mut self, op: SceneOp) {
        self.ops.push(op);
    }

    pub fn request_load(&mut self, request: LoadRequest) {
        self.load_requests.push(request);
    }

    /// Drops queued loads for a composite that no longer exists.
    pub fn cancel_loads_for(&mut self, composite: CompositeId) {
        self.load_requests
            .retain(|request| request.ticket.composite != composite);
    }

    pub fn pending_ops(&self) -> &[SceneOp] {
        &self.ops
    }

    pub fn pending_loads(&self) -> &[LoadRequest] {
        &self.load_requests
    }

    pub fn take_ops(&mut self) -> Vec<SceneOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn take_load_requests(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.load_requests)
    }
}
