//! Mesh generators for common shapes.
//!
//! These generators produce [`MeshBufferRecord`] values with per-slot
//! attribute buffers, ready to be handed to the mesh packer.

use std::f32::consts::PI;

use super::layout::{VertexAttributeDescriptor, VertexAttributeFormat, VertexAttributeSlot};
use super::record::{IndexFormat, MeshBufferRecord};

fn position_desc() -> VertexAttributeDescriptor {
    VertexAttributeDescriptor::new(VertexAttributeFormat::Float3)
}

fn normal_desc() -> VertexAttributeDescriptor {
    VertexAttributeDescriptor::new(VertexAttributeFormat::Float3)
}

fn texcoord_desc() -> VertexAttributeDescriptor {
    VertexAttributeDescriptor::new(VertexAttributeFormat::Float2)
}

/// Generate a quad record on the XY plane.
///
/// Creates a quad centered at the origin with the given half-width and
/// half-height, binding position and texcoord slots with u16 indices.
///
/// UV coordinates go from (0,0) at top-left to (1,1) at bottom-right.
pub fn generate_quad(half_width: f32, half_height: f32) -> MeshBufferRecord {
    let positions: [[f32; 3]; 4] = [
        [-half_width, -half_height, 0.0],
        [half_width, -half_height, 0.0],
        [half_width, half_height, 0.0],
        [-half_width, half_height, 0.0],
    ];
    let uvs: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let indices: [u16; 6] = [0, 1, 2, 2, 3, 0];

    MeshBufferRecord::new(4)
        .with_attribute(
            VertexAttributeSlot::Position,
            position_desc(),
            bytemuck::cast_slice(&positions).to_vec(),
        )
        .with_attribute(
            VertexAttributeSlot::TexCoord0,
            texcoord_desc(),
            bytemuck::cast_slice(&uvs).to_vec(),
        )
        .with_indices(IndexFormat::Uint16, bytemuck::cast_slice(&indices).to_vec())
        .with_label("quad")
}

/// Generate a cube record centered at the origin.
///
/// 24 vertices (4 per face, so normals and UVs stay per-face) and 36 u16
/// indices. Binds position, normal, and texcoord slots.
pub fn generate_cube(half_extent: f32) -> MeshBufferRecord {
    let h = half_extent;
    // (face normal, four corners in CCW order)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
        ),
        (
            [0.0, 0.0, -1.0],
            [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]],
        ),
        (
            [1.0, 0.0, 0.0],
            [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]],
        ),
        (
            [-1.0, 0.0, 0.0],
            [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]],
        ),
        (
            [0.0, 1.0, 0.0],
            [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]],
        ),
        (
            [0.0, -1.0, 0.0],
            [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]],
        ),
    ];

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(24);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(24);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(24);
    let mut indices: Vec<u16> = Vec::with_capacity(36);

    for (normal, corners) in faces {
        let base = positions.len() as u16;
        positions.extend_from_slice(&corners);
        normals.extend_from_slice(&[normal; 4]);
        uvs.extend_from_slice(&[[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]);
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    MeshBufferRecord::new(24)
        .with_attribute(
            VertexAttributeSlot::Position,
            position_desc(),
            bytemuck::cast_slice(&positions).to_vec(),
        )
        .with_attribute(
            VertexAttributeSlot::Normal,
            normal_desc(),
            bytemuck::cast_slice(&normals).to_vec(),
        )
        .with_attribute(
            VertexAttributeSlot::TexCoord0,
            texcoord_desc(),
            bytemuck::cast_slice(&uvs).to_vec(),
        )
        .with_indices(IndexFormat::Uint16, bytemuck::cast_slice(&indices).to_vec())
        .with_label("cube")
}

/// Generate a UV sphere record.
///
/// Creates a sphere with the given radius, number of longitudinal
/// segments, and number of latitudinal rings, binding position, normal,
/// and texcoord slots with u32 indices.
pub fn generate_uv_sphere(radius: f32, segments: u32, rings: u32) -> MeshBufferRecord {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for ring in 0..=rings {
        let theta = ring as f32 * PI / rings as f32;
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for segment in 0..=segments {
            let phi = segment as f32 * 2.0 * PI / segments as f32;

            let x = sin_theta * phi.cos();
            let y = cos_theta;
            let z = sin_theta * phi.sin();

            positions.push([x * radius, y * radius, z * radius]);
            normals.push([x, y, z]);
            uvs.push([segment as f32 / segments as f32, ring as f32 / rings as f32]);
        }
    }

    for ring in 0..rings {
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;

            indices.extend_from_slice(&[current, next, current + 1]);
            indices.extend_from_slice(&[current + 1, next, next + 1]);
        }
    }

    MeshBufferRecord::new(positions.len() as u32)
        .with_attribute(
            VertexAttributeSlot::Position,
            position_desc(),
            bytemuck::cast_slice(&positions).to_vec(),
        )
        .with_attribute(
            VertexAttributeSlot::Normal,
            normal_desc(),
            bytemuck::cast_slice(&normals).to_vec(),
        )
        .with_attribute(
            VertexAttributeSlot::TexCoord0,
            texcoord_desc(),
            bytemuck::cast_slice(&uvs).to_vec(),
        )
        .with_indices(IndexFormat::Uint32, bytemuck::cast_slice(&indices).to_vec())
        .with_label("sphere")
}
