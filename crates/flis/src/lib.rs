//! # Flis — Batched Quad Renderer
//!
//! Draws thousands of colored, positioned, rotatable rectangles with a
//! handful of GPU draw calls. Rectangles are queued into a fixed-capacity
//! [`SpriteBatch`](render2d::SpriteBatch); every full batch becomes one
//! `draw_indexed` call over a static quad buffer, with each rectangle placed
//! by its own matrix in a uniform array.
//!
//! Start with `use flis::prelude::*`, build a
//! [`WgpuBackend`](render2d::WgpuBackend) from a
//! [`GpuContext`](render::GpuContext), and wrap it in a `SpriteBatch`.

pub mod config;
pub mod diag;
pub mod error;
pub mod math;
pub mod prelude;
pub mod render;
pub mod render2d;
