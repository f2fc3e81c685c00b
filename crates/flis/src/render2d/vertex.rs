//! # Vertex — Per-Corner Data Sent to the GPU
//!
//! Every quad in a batch has four vertices. Unlike a renderer that bakes each
//! sprite's transform into its vertex positions, our positions never change:
//! each quad is the same unit square spanning [-1, 1]². What tells the GPU
//! where a quad goes is the *slot index* attribute, which the vertex shader
//! uses to pick that slot's placement matrix out of a uniform array.
//!
//! ## Memory Layout
//!
//! `#[repr(C)]` fixes the field order and the `bytemuck` traits let us cast
//! `&[Quad]` to `&[u8]` for upload without copies.
//!
//! ```text
//! QuadVertex (32 bytes per vertex, 8 floats, no padding)
//! ┌────────────────┬────────────────────────┬──────────────┐
//! │ position       │ color                  │ slot         │
//! │ [f32; 3]       │ [f32; 4]               │ f32          │
//! │ 12 bytes       │ 16 bytes               │ 4 bytes      │
//! │ offset 0       │ offset 12              │ offset 28    │
//! │ location(0)    │ location(1)            │ location(2)  │
//! └────────────────┴────────────────────────┴──────────────┘
//! ```
//!
//! A [`Quad`] is four of these back to back (128 bytes), so slot `i` lives at
//! byte offset `i * 128` in the vertex buffer. That is what makes a per-slot
//! color update a single small `write_buffer` call.
//!
//! ## Why the Slot Is a Float
//!
//! The slot index is stored as `f32` so every attribute in the vertex is the
//! same scalar type. The shader converts it back with `u32(slot)`. Float
//! precision is exact for integers up to 2^24, far beyond any batch capacity
//! a uniform buffer can hold.

use bytemuck::{Pod, Zeroable};

/// One corner of a batched quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub slot: f32,
}

impl QuadVertex {
    pub const SIZE: u64 = std::mem::size_of::<QuadVertex>() as u64;

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: Self::SIZE as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // color
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
            // slot
            wgpu::VertexAttribute {
                offset: 28,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32,
            },
        ],
    };
}

/// The four vertices of one batch slot, in the order the index table expects:
/// top-left, bottom-left, top-right, bottom-right.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Quad {
    pub vertices: [QuadVertex; 4],
}

impl Quad {
    pub const SIZE: u64 = std::mem::size_of::<Quad>() as u64;

    /// Local-space corner positions of the unit quad.
    pub const CORNERS: [[f32; 3]; 4] = [
        [-1.0, 1.0, 0.0],  // top-left
        [-1.0, -1.0, 0.0], // bottom-left
        [1.0, 1.0, 0.0],   // top-right
        [1.0, -1.0, 0.0],  // bottom-right
    ];

    /// An opaque white unit quad tagged with `slot`.
    pub fn unit(slot: u32) -> Self {
        let vertex = |position: [f32; 3]| QuadVertex {
            position,
            color: [1.0, 1.0, 1.0, 1.0],
            slot: slot as f32,
        };
        Self {
            vertices: Self::CORNERS.map(vertex),
        }
    }

    /// Overwrite the color of all four corners.
    pub fn set_color(&mut self, color: [f32; 4]) {
        for v in &mut self.vertices {
            v.color = color;
        }
    }
}

/// One slot of the placement-matrix uniform array.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransformUniform {
    pub matrix: [[f32; 4]; 4],
}

impl TransformUniform {
    pub const SIZE: u64 = std::mem::size_of::<TransformUniform>() as u64;

    /// Collapses every vertex onto the origin with `w = 0`, so the quad
    /// rasterizes nothing.
    pub const ZERO: Self = Self { matrix: [[0.0; 4]; 4] };

    pub fn from_mat4(m: glam::Mat4) -> Self {
        Self {
            matrix: m.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_shader_layout() {
        assert_eq!(QuadVertex::SIZE, 32);
        assert_eq!(Quad::SIZE, 4 * QuadVertex::SIZE);
        assert_eq!(TransformUniform::SIZE, 64);
    }

    #[test]
    fn attribute_offsets_are_tightly_packed() {
        let attrs = QuadVertex::LAYOUT.attributes;
        let offsets: Vec<u64> = attrs.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 28]);
        let last = attrs[2].offset + attrs[2].format.size();
        assert_eq!(last, QuadVertex::SIZE);
    }

    #[test]
    fn unit_quad_corners_and_slot() {
        let quad = Quad::unit(7);
        assert_eq!(quad.vertices[0].position, [-1.0, 1.0, 0.0]);
        assert_eq!(quad.vertices[3].position, [1.0, -1.0, 0.0]);
        for v in &quad.vertices {
            assert_eq!(v.slot, 7.0);
            assert_eq!(v.color, [1.0; 4]);
        }
    }

    #[test]
    fn set_color_touches_every_corner() {
        let mut quad = Quad::unit(0);
        quad.set_color([0.5, 0.25, 0.0, 1.0]);
        assert!(quad.vertices.iter().all(|v| v.color == [0.5, 0.25, 0.0, 1.0]));
        assert_eq!(quad.vertices[1].position, [-1.0, -1.0, 0.0]);
    }
}
