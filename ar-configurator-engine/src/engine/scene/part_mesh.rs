use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::Face;
use constants::render_settings::{HOSE_RADIAL_SEGMENTS, ROUND_SEGMENTS};
use std::f32::consts::TAU;

use crate::configurator::shapes::{Shape, SurfaceStyle};

pub fn shape_mesh(shape: &Shape) -> Mesh {
    match shape {
        Shape::Cuboid { size } => Mesh::from(Cuboid::from_size(*size)),
        Shape::Cylinder {
            radius,
            height,
            open_ended: false,
        } => Mesh::from(Cylinder::new(*radius, *height)),
        Shape::Cylinder {
            radius,
            height,
            open_ended: true,
        } => {
            let half = height * 0.5;
            tube_mesh(
                &[Vec3::new(0.0, -half, 0.0), Vec3::new(0.0, half, 0.0)],
                *radius,
                ROUND_SEGMENTS,
            )
        }
        Shape::Torus {
            major_radius,
            minor_radius,
        } => Mesh::from(Torus {
            minor_radius: *minor_radius,
            major_radius: *major_radius,
        }),
        Shape::Tube { path, radius } => tube_mesh(path, *radius, HOSE_RADIAL_SEGMENTS),
    }
}

pub fn surface_material(style: &SurfaceStyle) -> StandardMaterial {
    StandardMaterial {
        base_color: style.base_color.to_color_with_alpha(style.opacity),
        metallic: style.metallic,
        perceptual_roughness: style.roughness,
        unlit: style.unlit,
        alpha_mode: if style.is_translucent() {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        },
        double_sided: style.double_sided,
        cull_mode: if style.double_sided {
            None
        } else {
            Some(Face::Back)
        },
        ..default()
    }
}

/// Open tube of `radius` swept along `path`, without end caps.
///
/// Ring frames are carried along the path by parallel transport so the
/// surface does not twist on curved sections.
pub fn tube_mesh(path: &[Vec3], radius: f32, radial_segments: usize) -> Mesh {
    let radial_segments = radial_segments.max(3);
    let ring = radial_segments + 1;

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(path.len() * ring);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(path.len() * ring);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(path.len() * ring);
    let mut indices: Vec<u32> = Vec::new();

    if path.len() >= 2 {
        let tangents = path_tangents(path);
        let mut normal = tangents[0].any_orthonormal_vector();
        let last = (path.len() - 1) as f32;

        for (i, (&point, &tangent)) in path.iter().zip(&tangents).enumerate() {
            if i > 0 {
                normal = Quat::from_rotation_arc(tangents[i - 1], tangent) * normal;
            }
            let binormal = tangent.cross(normal);

            for j in 0..ring {
                let theta = j as f32 / radial_segments as f32 * TAU;
                let dir = normal * theta.cos() + binormal * theta.sin();
                positions.push((point + dir * radius).to_array());
                normals.push(dir.to_array());
                uvs.push([i as f32 / last, j as f32 / radial_segments as f32]);
            }
        }

        for i in 0..path.len() - 1 {
            for j in 0..radial_segments {
                let a = (i * ring + j) as u32;
                let b = ((i + 1) * ring + j) as u32;
                let c = b + 1;
                let d = a + 1;
                indices.extend_from_slice(&[a, d, b, d, c, b]);
            }
        }
    }

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(indices))
}

fn path_tangents(path: &[Vec3]) -> Vec<Vec3> {
    let last = path.len() - 1;
    (0..path.len())
        .map(|i| {
            let ahead = path[(i + 1).min(last)];
            let behind = path[i.saturating_sub(1)];
            (ahead - behind).normalize_or(Vec3::Y)
        })
        .collect()
}
