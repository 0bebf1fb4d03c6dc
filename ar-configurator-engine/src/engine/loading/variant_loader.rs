use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::gltf::{Gltf, GltfMesh, GltfNode};
use bevy::math::Affine3A;
use bevy::prelude::*;
use std::collections::HashSet;

use crate::configurator::loading::{AssetLoadError, LoadTicket, LoadedAsset};
use crate::configurator::shapes::Bounds3;
use crate::configurator::ConfiguratorSession;

struct PendingLoad {
    ticket: LoadTicket,
    path: String,
    handle: Handle<Gltf>,
}

/// glTF loads in flight, one per requested base slot.
#[derive(Resource, Default)]
pub struct VariantLoader {
    pending: Vec<PendingLoad>,
}

pub fn dispatch_variant_loads(
    mut session: ResMut<ConfiguratorSession>,
    mut variant_loader: ResMut<VariantLoader>,
    asset_server: Res<AssetServer>,
) {
    if session.outbox().pending_loads().is_empty() {
        return;
    }

    for request in session.take_load_requests() {
        info!(
            "Loading model '{}' for variant '{}'",
            request.path, request.variant
        );
        let handle = asset_server.load::<Gltf>(request.path.clone());
        variant_loader.pending.push(PendingLoad {
            ticket: request.ticket,
            path: request.path,
            handle,
        });
    }
}

/// Completes tickets whose glTF finished loading or failed. Loads for
/// superseded slots are dropped without touching the session.
pub fn poll_variant_loads(
    mut session: ResMut<ConfiguratorSession>,
    mut variant_loader: ResMut<VariantLoader>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    gltf_nodes: Res<Assets<GltfNode>>,
    gltf_meshes: Res<Assets<GltfMesh>>,
    meshes: Res<Assets<Mesh>>,
) {
    if variant_loader.pending.is_empty() {
        return;
    }

    let mut still_pending = Vec::new();
    for load in std::mem::take(&mut variant_loader.pending) {
        if !session.is_ticket_current(load.ticket) {
            debug!("Dropping superseded load of '{}'", load.path);
            continue;
        }

        if let Some(LoadState::Failed(err)) = asset_server.get_load_state(&load.handle) {
            let result = Err(AssetLoadError::Failed {
                path: load.path.clone(),
                reason: err.to_string(),
            });
            session.complete_load(load.ticket, result);
            continue;
        }

        match asset_server.get_recursive_dependency_load_state(&load.handle) {
            Some(RecursiveDependencyLoadState::Loaded) => {
                let result = resolve_gltf(&load, &gltfs, &gltf_nodes, &gltf_meshes, &meshes);
                if let Ok(asset) = &result {
                    info!(
                        "Model '{}' ready, extent {:?}",
                        load.path,
                        asset.bounds.size()
                    );
                }
                session.complete_load(load.ticket, result);
            }
            Some(RecursiveDependencyLoadState::Failed(err)) => {
                let result = Err(AssetLoadError::Failed {
                    path: load.path.clone(),
                    reason: err.to_string(),
                });
                session.complete_load(load.ticket, result);
            }
            _ => still_pending.push(load),
        }
    }
    variant_loader.pending = still_pending;
}

fn resolve_gltf(
    load: &PendingLoad,
    gltfs: &Assets<Gltf>,
    gltf_nodes: &Assets<GltfNode>,
    gltf_meshes: &Assets<GltfMesh>,
    meshes: &Assets<Mesh>,
) -> Result<LoadedAsset, AssetLoadError> {
    let malformed = |reason: &str| AssetLoadError::Malformed {
        path: load.path.clone(),
        reason: reason.to_string(),
    };

    let gltf = gltfs
        .get(&load.handle)
        .ok_or_else(|| malformed("asset missing after load"))?;
    let scene = gltf
        .default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
        .ok_or_else(|| malformed("file contains no scene"))?;

    let bounds = gltf_bounds(gltf, gltf_nodes, gltf_meshes, meshes);
    if bounds.is_empty() {
        return Err(malformed("file contains no mesh geometry"));
    }

    Ok(LoadedAsset { scene, bounds })
}

/// Union of all mesh vertex positions, in scene space.
fn gltf_bounds(
    gltf: &Gltf,
    gltf_nodes: &Assets<GltfNode>,
    gltf_meshes: &Assets<GltfMesh>,
    meshes: &Assets<Mesh>,
) -> Bounds3 {
    let child_ids: HashSet<AssetId<GltfNode>> = gltf
        .nodes
        .iter()
        .filter_map(|handle| gltf_nodes.get(handle))
        .flat_map(|node| node.children.iter().map(|child| child.id()))
        .collect();

    let mut bounds = Bounds3::EMPTY;
    for root in gltf.nodes.iter().filter(|h| !child_ids.contains(&h.id())) {
        accumulate_node_bounds(
            root,
            Affine3A::IDENTITY,
            gltf_nodes,
            gltf_meshes,
            meshes,
            &mut bounds,
        );
    }
    bounds
}

fn accumulate_node_bounds(
    handle: &Handle<GltfNode>,
    parent: Affine3A,
    gltf_nodes: &Assets<GltfNode>,
    gltf_meshes: &Assets<GltfMesh>,
    meshes: &Assets<Mesh>,
    bounds: &mut Bounds3,
) {
    let Some(node) = gltf_nodes.get(handle) else {
        return;
    };
    let local = Affine3A::from_scale_rotation_translation(
        node.transform.scale,
        node.transform.rotation,
        node.transform.translation,
    );
    let xf = parent * local;

    if let Some(gltf_mesh) = node.mesh.as_ref().and_then(|h| gltf_meshes.get(h)) {
        for primitive in &gltf_mesh.primitives {
            let positions = meshes
                .get(&primitive.mesh)
                .and_then(|mesh| mesh.attribute(Mesh::ATTRIBUTE_POSITION))
                .and_then(|attribute| attribute.as_float3());
            for p in positions.into_iter().flatten() {
                bounds.include_point(xf.transform_point3(Vec3::from_array(*p)));
            }
        }
    }

    for child in &node.children {
        accumulate_node_bounds(child, xf, gltf_nodes, gltf_meshes, meshes, bounds);
    }
}
