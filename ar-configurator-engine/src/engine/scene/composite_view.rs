//! Applies the session's scene ops and keeps entities in step with it.

use bevy::color::Alpha;
use bevy::prelude::*;
use bevy::scene::SceneInstanceReady;
use std::collections::HashMap;

use crate::configurator::ConfiguratorSession;
use crate::configurator::scene_ops::{CompositeId, NodeContent, NodeId, NodeRole, SceneOp};
use crate::engine::scene::part_mesh::{shape_mesh, surface_material};

#[derive(Component)]
pub struct CompositeRoot(pub CompositeId);

#[derive(Component)]
pub struct SceneNode(pub NodeId);

/// Marks a glTF instance whose materials are cloned and tinted when ready.
#[derive(Component)]
pub struct TintedScene(pub NodeId);

/// Entity and owned render assets of one attached node.
struct NodeView {
    entity: Entity,
    meshes: Vec<Handle<Mesh>>,
    materials: Vec<Handle<StandardMaterial>>,
}

#[derive(Resource, Default)]
pub struct CompositeView {
    root: Option<(CompositeId, Entity)>,
    nodes: HashMap<NodeId, NodeView>,
    applied_color_revision: u64,
}

impl CompositeView {
    pub fn root(&self) -> Option<Entity> {
        self.root.map(|(_, entity)| entity)
    }

    pub fn node_entity(&self, node: NodeId) -> Option<Entity> {
        self.nodes.get(&node).map(|view| view.entity)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Mesh and material handles owned by all nodes.
    pub fn owned_asset_count(&self) -> usize {
        self.nodes
            .values()
            .map(|view| view.meshes.len() + view.materials.len())
            .sum()
    }
}

fn release_node(
    view: NodeView,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    for handle in &view.meshes {
        meshes.remove(handle);
    }
    for handle in &view.materials {
        materials.remove(handle);
    }
}

pub fn apply_scene_ops(
    mut commands: Commands,
    mut session: ResMut<ConfiguratorSession>,
    mut view: ResMut<CompositeView>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if session.outbox().pending_ops().is_empty() {
        return;
    }

    for op in session.take_scene_ops() {
        match op {
            SceneOp::SpawnComposite { composite } => {
                if let Some((_, stale)) = view.root.take() {
                    warn!("Replacing composite root that was never despawned");
                    commands.entity(stale).despawn();
                }
                let entity = commands
                    .spawn((
                        Name::new(format!("Product {}", composite.0)),
                        CompositeRoot(composite),
                        Transform::default(),
                        Visibility::default(),
                    ))
                    .id();
                view.root = Some((composite, entity));
            }
            SceneOp::DespawnComposite { composite } => {
                let Some((current, entity)) = view.root else {
                    continue;
                };
                if current != composite {
                    continue;
                }
                for (_, node_view) in view.nodes.drain() {
                    release_node(node_view, &mut meshes, &mut materials);
                }
                commands.entity(entity).despawn();
                view.root = None;
            }
            SceneOp::AttachNode {
                composite,
                node,
                role,
                content,
                visible,
            } => {
                let Some((current, root)) = view.root else {
                    warn!("Node {:?} attached without a composite", node);
                    continue;
                };
                if current != composite {
                    warn!("Node {:?} targets a removed composite", node);
                    continue;
                }

                let name = match role {
                    NodeRole::Base => "base".to_string(),
                    NodeRole::Attachment(kind) => kind.as_str().to_string(),
                };
                let visibility = if visible {
                    Visibility::Inherited
                } else {
                    Visibility::Hidden
                };
                let entity = commands
                    .spawn((
                        Name::new(name),
                        SceneNode(node),
                        Transform::IDENTITY,
                        visibility,
                        ChildOf(root),
                    ))
                    .id();

                let mut node_view = NodeView {
                    entity,
                    meshes: Vec::new(),
                    materials: Vec::new(),
                };

                match content {
                    NodeContent::Parts(parts) => {
                        for part in &parts {
                            let mesh = meshes.add(shape_mesh(&part.shape));
                            let material = materials.add(surface_material(&part.surface));
                            commands.spawn((
                                Name::new(part.name),
                                Mesh3d(mesh.clone()),
                                MeshMaterial3d(material.clone()),
                                part.offset,
                                ChildOf(entity),
                            ));
                            node_view.meshes.push(mesh);
                            node_view.materials.push(material);
                        }
                    }
                    NodeContent::Asset(asset) => {
                        commands
                            .entity(entity)
                            .insert((SceneRoot(asset.scene.clone()), TintedScene(node)));
                    }
                }

                view.nodes.insert(node, node_view);
            }
            SceneOp::DetachNode { node } => {
                let Some(node_view) = view.nodes.remove(&node) else {
                    continue;
                };
                commands.entity(node_view.entity).despawn();
                release_node(node_view, &mut meshes, &mut materials);
            }
        }
    }
}

/// Mirrors transform, visibility and colour from the session every frame.
pub fn sync_composite_view(
    session: Res<ConfiguratorSession>,
    mut view: ResMut<CompositeView>,
    mut roots: Query<&mut Transform, With<CompositeRoot>>,
    mut nodes: Query<&mut Visibility, With<SceneNode>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let (Some(composite), Some(transform), Some(root)) = (
        session.composite(),
        session.composite_transform(),
        view.root(),
    ) else {
        return;
    };

    if let Ok(mut root_transform) = roots.get_mut(root) {
        if *root_transform != transform {
            *root_transform = transform;
        }
    }

    for (node, visible) in composite.node_visibility() {
        let Some(entity) = view.node_entity(node) else {
            continue;
        };
        if let Ok(mut visibility) = nodes.get_mut(entity) {
            let wanted = if visible {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
            if *visibility != wanted {
                *visibility = wanted;
            }
        }
    }

    if view.applied_color_revision != session.color_revision() {
        let color = session.selection().color;
        for node_view in view.nodes.values() {
            for handle in &node_view.materials {
                if let Some(material) = materials.get_mut(handle) {
                    let alpha = material.base_color.alpha();
                    material.base_color = color.to_color_with_alpha(alpha);
                }
            }
        }
        view.applied_color_revision = session.color_revision();
    }
}

/// Gives a freshly spawned glTF instance its own tinted material copies,
/// owned by the node so they are released with it.
pub fn tint_scene_instance(
    trigger: Trigger<SceneInstanceReady>,
    mut commands: Commands,
    tinted: Query<&TintedScene>,
    children: Query<&Children>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut view: ResMut<CompositeView>,
    session: Res<ConfiguratorSession>,
) {
    let root = trigger.target();
    let Ok(TintedScene(node)) = tinted.get(root) else {
        return;
    };
    let Some(node_view) = view.nodes.get_mut(node) else {
        return;
    };

    let color = session.selection().color;
    for entity in children.iter_descendants(root) {
        let Ok(MeshMaterial3d(handle)) = mesh_materials.get(entity) else {
            continue;
        };
        let Some(original) = materials.get(handle) else {
            continue;
        };

        let mut tinted_material = original.clone();
        let alpha = tinted_material.base_color.alpha();
        tinted_material.base_color = color.to_color_with_alpha(alpha);

        let cloned = materials.add(tinted_material);
        commands
            .entity(entity)
            .insert(MeshMaterial3d(cloned.clone()));
        node_view.materials.push(cloned);
    }
}
