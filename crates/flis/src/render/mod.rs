//! Rendering subsystem — the device seam and its wgpu plumbing.

pub mod backend;
pub mod gpu;
pub mod pass;

pub use backend::{BatchBindings, BufferDesc, BufferKind, RenderBackend};
pub use gpu::GpuContext;
pub use pass::ClearColor;
