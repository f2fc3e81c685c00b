//! Frame acquisition and clearing.
//!
//! A frame may carry several batch flushes. The first render pass of a frame
//! clears the surface with [`ClearColor`]; later passes load what is already
//! there. A frame with no flushes at all still gets a clear pass before it
//! is presented.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::render::gpu::GpuContext;

/// The background color a frame starts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClearColor(pub [f64; 4]);

impl ClearColor {
    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b, a] = self.0;
        wgpu::Color { r, g, b, a }
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        // A pleasant dark blue, like a night sky.
        Self([0.1, 0.1, 0.15, 1.0])
    }
}

/// The surface texture being rendered this frame.
pub(crate) struct Frame {
    texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    /// Whether a pass has already cleared this frame.
    pub cleared: bool,
}

impl Frame {
    pub fn acquire(gpu: &GpuContext) -> Result<Self, RenderError> {
        let texture = gpu.surface.get_current_texture()?;
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            cleared: false,
        })
    }

    /// Clear on the first pass of the frame, load afterwards.
    pub fn load_op(&self, clear_color: ClearColor) -> wgpu::LoadOp<wgpu::Color> {
        if self.cleared {
            wgpu::LoadOp::Load
        } else {
            wgpu::LoadOp::Clear(clear_color.to_wgpu())
        }
    }

    /// Record and submit a pass that only clears.
    pub fn clear(&mut self, gpu: &GpuContext, clear_color: ClearColor) {
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("flis clear encoder"),
            });
        {
            let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: self.load_op(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        self.cleared = true;
    }

    pub fn present(self) {
        self.texture.present();
    }
}

/// Take the frame in `slot`, acquiring a new one if there is none.
pub(crate) fn current_frame<'a>(
    slot: &'a mut Option<Frame>,
    gpu: &GpuContext,
) -> Result<&'a mut Frame, RenderError> {
    let frame = match slot.take() {
        Some(frame) => frame,
        None => Frame::acquire(gpu)?,
    };
    Ok(slot.insert(frame))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_color_converts_channel_order() {
        let c = ClearColor([0.1, 0.2, 0.3, 0.4]).to_wgpu();
        assert_eq!((c.r, c.g, c.b, c.a), (0.1, 0.2, 0.3, 0.4));
    }
}
