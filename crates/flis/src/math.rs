//! Math types, glam re-exports, and pixel ↔ NDC conversion.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly.
//!
//! ## Coordinate Spaces
//!
//! Callers describe rectangles in *pixel space*: origin at the top-left of
//! the viewport, X to the right, Y down. The GPU rasterizer expects
//! *normalized device coordinates* (NDC): [-1, 1] on both axes, origin at
//! the center, Y up.
//!
//! ```text
//!  pixel space                     NDC
//!  (0,0) ───────► x               (-1,1) ────────── (1,1)
//!    │                               │       ▲ y      │
//!    │                               │       │        │
//!    ▼ y        (w,h)                │       └──► x   │
//!                                 (-1,-1) ───────── (1,-1)
//! ```
//!
//! Both conversions go through [`map_value`], a plain linear remap. The Y
//! range is remapped onto `[1, -1]` rather than `[-1, 1]`, which is what
//! flips the axis.
//!
//! ## Placement Matrices
//!
//! Every quad in a batch is the same unit square spanning [-1, 1]². A
//! [`Viewport::placement`] matrix turns that unit square into the on-screen
//! rectangle: rotate it, scale it down to the rectangle's share of the
//! viewport, then translate it to the rectangle's center in NDC.

pub use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::error::RenderError;

/// Linearly remap `value` from `[from_lo, from_hi]` onto `[to_lo, to_hi]`.
///
/// The source range must not be empty. Values outside the source range
/// extrapolate.
pub fn map_value(value: f32, from_lo: f32, from_hi: f32, to_lo: f32, to_hi: f32) -> f32 {
    debug_assert!(from_hi != from_lo, "map_value: empty source range");
    to_lo + (to_hi - to_lo) * (value - from_lo) / (from_hi - from_lo)
}

/// A non-degenerate viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    /// Validate a viewport size. Both sides must be strictly positive.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size as floats, for the math below.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Convert a pixel-space point to NDC.
    pub fn to_ndc(&self, pixel: Vec2) -> Vec2 {
        let size = self.size();
        Vec2::new(
            map_value(pixel.x, 0.0, size.x, -1.0, 1.0),
            map_value(pixel.y, 0.0, size.y, 1.0, -1.0),
        )
    }

    /// Convert an NDC point back to pixel space.
    pub fn to_pixel(&self, ndc: Vec2) -> Vec2 {
        let size = self.size();
        Vec2::new(
            map_value(ndc.x, -1.0, 1.0, 0.0, size.x),
            map_value(ndc.y, 1.0, -1.0, 0.0, size.y),
        )
    }

    /// Build the matrix that places the unit quad over a pixel rectangle.
    ///
    /// `center` is the rectangle's center in pixels. `scale` multiplies both
    /// axes on top of the size-derived scale. Positive `angle_degrees`
    /// rotates clockwise on screen.
    ///
    /// The quad is rotated first, then scaled, then translated. In glam's
    /// column-vector convention that is `T * S * R`.
    pub fn placement(&self, center: Vec2, size: Vec2, scale: f32, angle_degrees: f32) -> Mat4 {
        let viewport = self.size();
        let scale_x = (size.x / viewport.x) * scale;
        let scale_y = (size.y / viewport.y) * scale;
        let ndc = self.to_ndc(center);
        // NDC is Y-up, so screen-clockwise is a negative rotation about Z.
        let angle = -angle_degrees.to_radians();

        Mat4::from_translation(Vec3::new(ndc.x, ndc.y, 0.0))
            * Mat4::from_scale(Vec3::new(scale_x, scale_y, 1.0))
            * Mat4::from_rotation_z(angle)
    }
}

/// Build a placement matrix from a raw viewport size.
///
/// Fails with [`RenderError::InvalidViewport`] if either side is zero.
pub fn placement_matrix(
    viewport_size: (u32, u32),
    center: Vec2,
    width: f32,
    height: f32,
    scale: f32,
    angle_degrees: f32,
) -> Result<Mat4, RenderError> {
    let viewport = Viewport::new(viewport_size.0, viewport_size.1)?;
    Ok(viewport.placement(center, Vec2::new(width, height), scale, angle_degrees))
}
