//! # Render2d — Batched Rectangle Rendering
//!
//! Drawing each rectangle with its own draw call is expensive: every call
//! carries driver validation and state setup. This module packs up to `N`
//! rectangles into one vertex buffer and draws them with a single
//! `draw_indexed` call.
//!
//! ## Architecture
//!
//! ```text
//!  caller                SpriteBatch                 BatchBuffer           GPU
//!    │ begin()              │                            │                  │
//!    │ submit(rect) ×k ───► │ fill slot 0..N             │                  │
//!    │                      │ slot table full? ──flush──►│ per-slot writes ►│
//!    │                      │                            │ draw 0..6N ─────►│
//!    │ end() ─────────────► │ final flush ──────────────►│ ... ────────────►│
//! ```
//!
//! - [`SpriteBatch`] is the state machine: it collects rectangles into a
//!   fixed table of `N` slots and flushes when the table is full or the
//!   frame ends.
//! - [`BatchBuffer`] owns the GPU side: `N` static unit quads, a static index
//!   table, and `N` placement-matrix uniform slots.
//! - [`WgpuBackend`] is the wgpu implementation of the device seam the
//!   buffer drives.
//!
//! ## Design Decisions
//!
//! **Per-slot transforms instead of per-vertex positions.** Vertex positions
//! are uploaded once and never rewritten. Each rectangle's position, size,
//! rotation and scale go into a 64-byte placement matrix, and the vertex
//! shader picks the matrix by the vertex's slot index. Moving a rectangle
//! means writing one matrix, not four vertices.
//!
//! **Full-range draws.** Every flush draws all `6N` indices regardless of how
//! many slots were filled. Slots that held a rectangle in an earlier cycle
//! but are empty now get a zero matrix on flush, which collapses their quad
//! to nothing, so leftovers never reappear on screen.
//!
//! **One submit per flush.** Per-slot writes for the next flush reuse the
//! same buffer ranges, so each flush's draw is submitted to the queue before
//! the next flush writes anything.
//!
//! ## Comparison
//!
//! - **XNA / MonoGame `SpriteBatch`**: Same begin/draw/end shape. It rebuilds
//!   vertex positions on the CPU each flush and uploads them; we upload
//!   matrices instead.
//! - **Instanced rendering**: A per-instance attribute buffer would replace
//!   the uniform array and lift the capacity limit. The uniform array keeps
//!   the pipeline to a single vertex buffer and a single bind group.

pub mod batch;
pub mod buffer;
pub mod draw;
pub mod geometry;
pub(crate) mod pipeline;
pub mod vertex;

pub use batch::{BatchItem, SpriteBatch};
pub use buffer::BatchBuffer;
pub use draw::WgpuBackend;

use serde::{Deserialize, Serialize};

use crate::math::{Vec2, map_value};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// The "no color" sentinel: all channels zero. Marks empty batch slots.
    pub const NONE: Self = Self::rgba(0, 0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Create a color from RGB (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color from RGBA.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels normalized to [0, 1], in vertex attribute order.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|c| map_value(c as f32, 0.0, 255.0, 0.0, 1.0))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A rectangle to batch, in pixel space.
///
/// `position` is the rectangle's center; (0, 0) is the top-left of the
/// viewport with Y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub position: Vec2,
    pub width: u32,
    pub height: u32,
    pub color: Color,
    /// Uniform scale applied on top of `width`/`height`.
    pub scale: f32,
    /// Rotation in degrees, clockwise on screen.
    pub rotation: f32,
}

impl Rectangle {
    /// A rectangle centered at `(x, y)` with no rotation and unit scale.
    pub fn new(x: f32, y: f32, width: u32, height: u32, color: Color) -> Self {
        Self {
            position: Vec2::new(x, y),
            width,
            height,
            color,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    /// Set the rotation in degrees.
    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Set the uniform scale.
    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_normalizes_linearly() {
        let [r, g, b, a] = Color::rgba(255, 128, 0, 255).to_array();
        assert_eq!(r, 1.0);
        assert!((g - 0.502).abs() < 1e-3);
        assert_eq!(b, 0.0);
        assert_eq!(a, 1.0);
    }

    #[test]
    fn none_is_fully_transparent_black() {
        assert_eq!(Color::NONE.to_array(), [0.0; 4]);
        assert_ne!(Color::NONE, Color::BLACK);
    }

    #[test]
    fn rectangle_builders() {
        let rect = Rectangle::new(10.0, 20.0, 30, 40, Color::RED).rotated(45.0).scaled(2.0);
        assert_eq!(rect.position, Vec2::new(10.0, 20.0));
        assert_eq!(rect.rotation, 45.0);
        assert_eq!(rect.scale, 2.0);
    }
}
