//! # Pipeline — Linking the Quad Program
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ QuadPipeline                                                │
//! │                                                             │
//! │  Shader module ─── vs_main + fs_main from shader.wgsl,      │
//! │                    BATCH_CAPACITY prepended as a const      │
//! │                                                             │
//! │  Vertex layout ─── QuadVertex { position, color, slot }     │
//! │                                                             │
//! │  Bind group 0 ──── transforms: array<mat4x4, N> (vertex)    │
//! │                                                             │
//! │  Blend ─────────── ALPHA_BLENDING                           │
//! │  Primitive ─────── TriangleList, no culling                 │
//! │  Depth/stencil ─── None, draw order is submission order     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! WGSL needs the uniform array length at compile time, so the program is
//! linked per batch capacity. Validation errors are caught with an error
//! scope and turned into [`RenderError::ShaderLink`] instead of panicking
//! inside wgpu's default error handler.

use super::vertex::QuadVertex;
use crate::error::RenderError;
use crate::render::GpuContext;

const SHADER_SOURCE: &str = include_str!("shader.wgsl");

/// GPU program and bindings for drawing one batch.
pub(crate) struct QuadPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group: wgpu::BindGroup,
}

impl QuadPipeline {
    /// Compile the quad shader for `capacity` slots and bind `transforms`.
    pub fn new(
        gpu: &GpuContext,
        capacity: u32,
        transforms: &wgpu::Buffer,
    ) -> Result<Self, RenderError> {
        let device = &gpu.device;

        // Validation errors land in this scope instead of the device's panic handler.
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("quad shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source(capacity).into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quad transforms bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quad pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[QuadVertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // rotated quads may flip winding
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quad transforms bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transforms.as_entire_binding(),
            }],
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ShaderLink(err.to_string()));
        }

        log::debug!("Linked quad program for {capacity} slots");
        Ok(Self {
            pipeline,
            bind_group,
        })
    }
}

/// The WGSL source with the batch capacity filled in.
fn shader_source(capacity: u32) -> String {
    format!("const BATCH_CAPACITY: u32 = {capacity}u;\n\n{SHADER_SOURCE}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_prepended_as_const() {
        let src = shader_source(250);
        assert!(src.starts_with("const BATCH_CAPACITY: u32 = 250u;"));
        assert!(src.contains("array<mat4x4<f32>, BATCH_CAPACITY>"));
    }

    #[test]
    fn shader_declares_layout_locations() {
        for decl in ["@location(0) position", "@location(1) color", "@location(2) slot"] {
            assert!(SHADER_SOURCE.contains(decl), "missing {decl}");
        }
    }
}
