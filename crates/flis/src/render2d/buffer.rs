//! # Batch Buffer — GPU Storage for a Fixed Number of Quads
//!
//! A [`BatchBuffer`] owns three device buffers, all sized once for its
//! capacity `N` and never resized:
//!
//! ```text
//!  vertex buffer     N × Quad (128 B)        static positions, per-slot colors
//!  index buffer      6N × u32                static, uploaded once
//!  transform buffer  N × mat4x4<f32> (64 B)  one placement matrix per slot
//! ```
//!
//! It knows nothing about which slots are "in use". Callers write a slot's
//! matrix or color and the write goes straight to the device, touching only
//! that slot's byte range. [`BatchBuffer::draw`] always draws the whole
//! capacity.
//!
//! Transform slots start zeroed, so a slot that has never been written
//! rasterizes nothing.

use super::geometry::{INDICES_PER_QUAD, generate_indices, generate_quads};
use super::vertex::{Quad, TransformUniform};
use super::Color;
use crate::error::RenderError;
use crate::math::{Vec2, placement_matrix};
use crate::render::backend::{BatchBindings, BufferDesc, BufferKind, RenderBackend};

/// Device-side storage for one batch of quads.
pub struct BatchBuffer<B: RenderBackend> {
    backend: B,
    capacity: u32,
    /// CPU mirror of the vertex buffer, so a color write can upload a whole quad.
    quads: Box<[Quad]>,
    /// Byte offset of each slot's matrix, resolved once at construction.
    transform_slots: Box<[u64]>,
    vertex_buffer: B::Buffer,
    index_buffer: B::Buffer,
    transform_buffer: B::Buffer,
}

impl<B: RenderBackend> BatchBuffer<B> {
    /// Allocate and upload storage for `capacity` quads, then link the quad
    /// program against it.
    pub fn new(mut backend: B, capacity: u32) -> Result<Self, RenderError> {
        let max = max_capacity(&backend);
        if capacity == 0 || capacity > max {
            return Err(RenderError::InvalidCapacity { capacity, max });
        }

        let quads = generate_quads(capacity).into_boxed_slice();
        let indices = generate_indices(capacity);
        let transforms = vec![TransformUniform::ZERO; capacity as usize];

        let vertex_buffer = backend.create_buffer(BufferDesc {
            label: "batch vertex buffer",
            kind: BufferKind::Vertex,
            contents: bytemuck::cast_slice(&quads),
        });
        let index_buffer = backend.create_buffer(BufferDesc {
            label: "batch index buffer",
            kind: BufferKind::Index,
            contents: bytemuck::cast_slice(&indices),
        });
        let transform_buffer = backend.create_buffer(BufferDesc {
            label: "batch transform buffer",
            kind: BufferKind::Uniform,
            contents: bytemuck::cast_slice(&transforms),
        });

        let transform_slots = (0..capacity)
            .map(|slot| backend.transform_location(slot))
            .collect();

        let mut buffer = Self {
            backend,
            capacity,
            quads,
            transform_slots,
            vertex_buffer,
            index_buffer,
            transform_buffer,
        };
        // On failure `buffer` drops here and releases its device buffers.
        buffer.backend.link_program(capacity, &buffer.transform_buffer)?;

        log::info!("Created batch buffer for {capacity} quads");
        Ok(buffer)
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of indices every [`draw`](Self::draw) covers.
    pub fn index_count(&self) -> u32 {
        self.capacity * INDICES_PER_QUAD
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The CPU copy of a slot's quad.
    pub fn quad(&self, slot: usize) -> Option<&Quad> {
        self.quads.get(slot)
    }

    /// Place `slot` over an axis-aligned pixel rectangle centered at
    /// `position`.
    pub fn update_transform(
        &mut self,
        slot: usize,
        position: Vec2,
        size: Vec2,
    ) -> Result<(), RenderError> {
        self.update_transform_rotated(slot, position, size, 1.0, 0.0)
    }

    /// Place `slot` over a pixel rectangle, with extra uniform scale and a
    /// clockwise rotation in degrees.
    ///
    /// The viewport size is queried from the backend on every call, so a
    /// resize between flushes is picked up immediately.
    pub fn update_transform_rotated(
        &mut self,
        slot: usize,
        position: Vec2,
        size: Vec2,
        scale: f32,
        angle_degrees: f32,
    ) -> Result<(), RenderError> {
        self.check_slot(slot)?;
        let matrix = placement_matrix(
            self.backend.viewport_size(),
            position,
            size.x,
            size.y,
            scale,
            angle_degrees,
        )?;
        self.write_transform(slot, TransformUniform::from_mat4(matrix));
        Ok(())
    }

    /// Recolor all four vertices of `slot` and upload just that quad.
    pub fn update_vertex_color(&mut self, slot: usize, color: Color) -> Result<(), RenderError> {
        self.check_slot(slot)?;
        let quad = &mut self.quads[slot];
        quad.set_color(color.to_array());
        self.backend.write_buffer(
            &self.vertex_buffer,
            slot as u64 * Quad::SIZE,
            bytemuck::bytes_of(quad),
        );
        Ok(())
    }

    /// Zero `slot`'s matrix so its quad collapses and draws nothing.
    pub fn clear_slot(&mut self, slot: usize) -> Result<(), RenderError> {
        self.check_slot(slot)?;
        self.write_transform(slot, TransformUniform::ZERO);
        Ok(())
    }

    /// Draw every slot with one indexed draw call.
    pub fn draw(&mut self) -> Result<(), RenderError> {
        let index_count = self.index_count();
        let bindings = BatchBindings {
            vertices: &self.vertex_buffer,
            indices: &self.index_buffer,
        };
        self.backend.draw_indexed(bindings, 0..index_count)
    }

    /// Release the device buffers. Dropping the buffer does the same.
    pub fn dispose(self) {
        log::debug!("Disposing batch buffer ({} quads)", self.capacity);
        drop(self);
    }

    fn write_transform(&mut self, slot: usize, transform: TransformUniform) {
        self.backend.write_buffer(
            &self.transform_buffer,
            self.transform_slots[slot],
            bytemuck::bytes_of(&transform),
        );
    }

    fn check_slot(&self, slot: usize) -> Result<(), RenderError> {
        if slot >= self.capacity as usize {
            return Err(RenderError::SlotOutOfRange {
                slot,
                capacity: self.capacity as usize,
            });
        }
        Ok(())
    }
}

impl<B: RenderBackend> Drop for BatchBuffer<B> {
    fn drop(&mut self) {
        self.backend.destroy_buffer(&self.vertex_buffer);
        self.backend.destroy_buffer(&self.index_buffer);
        self.backend.destroy_buffer(&self.transform_buffer);
    }
}

/// Largest capacity whose transform array fits in one uniform binding.
fn max_capacity<B: RenderBackend>(backend: &B) -> u32 {
    let slots = backend.max_uniform_binding_size() / TransformUniform::SIZE;
    slots.min(u32::MAX as u64) as u32
}
