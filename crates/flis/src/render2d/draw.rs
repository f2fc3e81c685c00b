//! # Draw — The wgpu Backend
//!
//! [`WgpuBackend`] implements [`RenderBackend`] on top of a [`GpuContext`].
//! It is what a [`SpriteBatch`](super::SpriteBatch) drives in a real
//! application.
//!
//! ## Per-Frame Flow
//!
//! ```text
//!  SpriteBatch::end() / full table
//!   │
//!   ├─ per-slot writes ─── queue.write_buffer(slot range)
//!   │
//!   └─ draw_indexed
//!        ├─ acquire surface texture (first draw of the frame only)
//!        ├─ render pass: Clear on first pass, Load afterwards
//!        │    bind pipeline, transforms, vertex + index buffers
//!        │    draw_indexed(0..6N)
//!        │  (pass ends here, before submit)
//!        └─ queue.submit
//!
//!  WgpuBackend::present() ─── clear if nothing drew, present
//! ```
//!
//! ## Why Submit Every Flush
//!
//! `queue.write_buffer` stages data that lands before the *next* submit. If
//! two flushes in one frame were recorded into the same submission, the
//! second flush's slot writes would overwrite the first flush's data before
//! either draw ran, and the first batch would never appear. Submitting after
//! each draw keeps every flush's writes paired with its own draw.
//!
//! ## Surface Errors
//!
//! Acquiring the surface texture can fail with `Outdated` or `Lost` after a
//! resize or display change. The error propagates as
//! [`RenderError::SurfaceTexture`]; the caller reconfigures via
//! [`WgpuBackend::resize`] or [`WgpuBackend::reconfigure`] and renders the
//! next frame.

use std::ops::Range;

use wgpu::util::DeviceExt;

use super::pipeline::QuadPipeline;
use crate::error::RenderError;
use crate::render::backend::{BatchBindings, BufferDesc, BufferKind, RenderBackend};
use crate::render::gpu::GpuContext;
use crate::render::pass::{ClearColor, Frame, current_frame};

/// Renders batches into a window surface with wgpu.
pub struct WgpuBackend {
    gpu: GpuContext,
    clear_color: ClearColor,
    pipeline: Option<QuadPipeline>,
    frame: Option<Frame>,
}

impl WgpuBackend {
    pub fn new(gpu: GpuContext, clear_color: ClearColor) -> Self {
        Self {
            gpu,
            clear_color,
            pipeline: None,
            frame: None,
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn set_clear_color(&mut self, clear_color: ClearColor) {
        self.clear_color = clear_color;
    }

    /// Resize the surface. Any frame acquired at the old size is discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.frame = None;
        self.gpu.resize(width, height);
    }

    /// Reconfigure the surface after a `Lost` or `Outdated` error.
    pub fn reconfigure(&mut self) {
        self.frame = None;
        self.gpu.reconfigure();
    }

    /// Present the current frame, clearing it first if nothing was drawn.
    pub fn present(&mut self) -> Result<(), RenderError> {
        let mut frame = match self.frame.take() {
            Some(frame) => frame,
            None => Frame::acquire(&self.gpu)?,
        };
        if !frame.cleared {
            frame.clear(&self.gpu, self.clear_color);
        }
        frame.present();
        Ok(())
    }
}

impl RenderBackend for WgpuBackend {
    type Buffer = wgpu::Buffer;

    fn viewport_size(&self) -> (u32, u32) {
        self.gpu.surface_size()
    }

    fn max_uniform_binding_size(&self) -> u64 {
        self.gpu.device.limits().max_uniform_buffer_binding_size as u64
    }

    fn create_buffer(&mut self, desc: BufferDesc<'_>) -> wgpu::Buffer {
        let usage = match desc.kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
            BufferKind::Uniform => wgpu::BufferUsages::UNIFORM,
        };
        self.gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(desc.label),
                contents: desc.contents,
                usage: usage | wgpu::BufferUsages::COPY_DST,
            })
    }

    fn write_buffer(&mut self, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) {
        self.gpu.queue.write_buffer(buffer, offset, data);
    }

    fn link_program(
        &mut self,
        capacity: u32,
        transforms: &wgpu::Buffer,
    ) -> Result<(), RenderError> {
        self.pipeline = Some(QuadPipeline::new(&self.gpu, capacity, transforms)?);
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        bindings: BatchBindings<'_, wgpu::Buffer>,
        indices: Range<u32>,
    ) -> Result<(), RenderError> {
        let Some(pipeline) = self.pipeline.as_ref() else {
            return Err(RenderError::ShaderLink("draw before the quad program was linked".into()));
        };
        let frame = current_frame(&mut self.frame, &self.gpu)?;

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("flis batch encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("batch render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: frame.load_op(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&pipeline.pipeline);
            render_pass.set_bind_group(0, &pipeline.bind_group, &[]);
            render_pass.set_vertex_buffer(0, bindings.vertices.slice(..));
            render_pass.set_index_buffer(bindings.indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(indices, 0, 0..1);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.cleared = true;
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: &wgpu::Buffer) {
        buffer.destroy();
    }
}
