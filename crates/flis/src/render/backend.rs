//! The device seam between the batch logic and the GPU.
//!
//! [`BatchBuffer`](crate::render2d::BatchBuffer) never talks to wgpu directly.
//! It drives a [`RenderBackend`]: create a few buffers, write byte ranges into
//! them, link the quad program once, and issue indexed draws. The production
//! implementation is [`WgpuBackend`](crate::render2d::WgpuBackend).
//!
//! Binding state is never left dangling between calls. A backend binds
//! pipeline, uniforms and buffers inside [`RenderBackend::draw_indexed`] and
//! releases them before it returns, so there is no separate unbind step for
//! callers to forget.

use std::ops::Range;

use crate::error::RenderError;
use crate::render2d::vertex::TransformUniform;

/// What a buffer will be bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
    Uniform,
}

/// Description of a buffer to create with initial contents.
#[derive(Debug, Clone, Copy)]
pub struct BufferDesc<'a> {
    pub label: &'a str,
    pub kind: BufferKind,
    pub contents: &'a [u8],
}

/// The buffers bound for a batch draw.
pub struct BatchBindings<'a, B> {
    pub vertices: &'a B,
    pub indices: &'a B,
}

/// GPU operations the batch renderer needs.
pub trait RenderBackend {
    /// Handle to a device buffer.
    type Buffer;

    /// Current drawable size in pixels, queried at call time.
    fn viewport_size(&self) -> (u32, u32);

    /// Largest uniform binding the device allows, in bytes.
    fn max_uniform_binding_size(&self) -> u64;

    /// Create a buffer initialized with `desc.contents`.
    fn create_buffer(&mut self, desc: BufferDesc<'_>) -> Self::Buffer;

    /// Overwrite `data.len()` bytes of `buffer` starting at `offset`.
    fn write_buffer(&mut self, buffer: &Self::Buffer, offset: u64, data: &[u8]);

    /// Compile and link the quad program for a batch of `capacity` slots,
    /// reading placement matrices from `transforms`.
    fn link_program(&mut self, capacity: u32, transforms: &Self::Buffer) -> Result<(), RenderError>;

    /// Byte offset of `transform[slot]` inside the transform uniform buffer.
    fn transform_location(&self, slot: u32) -> u64 {
        slot as u64 * TransformUniform::SIZE
    }

    /// Draw `indices` as a triangle list with the linked program.
    fn draw_indexed(
        &mut self,
        bindings: BatchBindings<'_, Self::Buffer>,
        indices: Range<u32>,
    ) -> Result<(), RenderError>;

    /// Release a buffer's device memory.
    fn destroy_buffer(&mut self, buffer: &Self::Buffer);
}
