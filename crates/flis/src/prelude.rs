//! Convenience re-exports. `use flis::prelude::*` brings in everything
//! needed to set up a batch and draw rectangles.

pub use crate::config::BatchConfig;
pub use crate::diag::{BatchStats, init_logger};
pub use crate::error::RenderError;
pub use crate::math::{Mat4, Vec2, Vec3, Viewport, map_value, placement_matrix};
pub use crate::render::{ClearColor, GpuContext, RenderBackend};
pub use crate::render2d::{BatchBuffer, Color, Rectangle, SpriteBatch, WgpuBackend};
