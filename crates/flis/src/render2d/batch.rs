//! # Batch — Accumulate Rectangles, Flush in One Draw
//!
//! [`SpriteBatch`] is a two-state machine:
//!
//! ```text
//!            begin()                    submit(rect)
//!   ┌──────┐ ───────► ┌──────────────┐ ◄─────────┐
//!   │ Idle │          │ Accumulating │ ──────────┘  (flushes first if all
//!   └──────┘ ◄─────── └──────────────┘               N slots are taken)
//!            end(): final flush
//! ```
//!
//! Rectangles go into a fixed table of `N` [`BatchItem`]s, one per batch
//! slot. The table is allocated once and reset in place after every flush.
//!
//! ## Lazy Flush
//!
//! `submit` checks for a full table *before* writing. Filling the last slot
//! doesn't flush; the next `submit` does. So `N` submissions followed by
//! `end()` produce exactly one draw call, and `N + 1` submissions produce one
//! intermediate flush with the last rectangle landing in slot 0 of the next
//! cycle.
//!
//! ## Empty Slots
//!
//! A slot is empty when its item equals [`BatchItem::EMPTY`]: origin
//! position, zero size, [`Color::NONE`]. There is no separate occupancy flag.
//! `submit` rejects zero-area rectangles, so a real submission never looks
//! empty.
//!
//! Flush skips the draw entirely when every slot is empty. Otherwise it
//! writes the filled slots, collapses slots that were drawn in an earlier
//! cycle but are empty now, and draws the full capacity once.
//!
//! ## Misuse
//!
//! `submit` or `end` without `begin` fails with [`RenderError::NotBegun`].
//! A second `begin` without `end` fails with [`RenderError::AlreadyBegun`];
//! pending rectangles are left untouched.

use super::buffer::BatchBuffer;
use super::{Color, Rectangle};
use crate::diag::BatchStats;
use crate::error::RenderError;
use crate::math::Vec2;
use crate::render::backend::RenderBackend;

/// A pending rectangle stored in a batch slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchItem {
    pub position: Vec2,
    pub width: u32,
    pub height: u32,
    pub color: Color,
    pub scale: f32,
    pub rotation: f32,
}

impl BatchItem {
    /// The sentinel a slot is reset to after each flush.
    pub const EMPTY: Self = Self {
        position: Vec2::ZERO,
        width: 0,
        height: 0,
        color: Color::NONE,
        scale: 1.0,
        rotation: 0.0,
    };

    pub fn is_empty(&self) -> bool {
        self.position == Vec2::ZERO
            && self.width == 0
            && self.height == 0
            && self.color == Color::NONE
    }

    fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

impl Default for BatchItem {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<Rectangle> for BatchItem {
    fn from(rect: Rectangle) -> Self {
        Self {
            position: rect.position,
            width: rect.width,
            height: rect.height,
            color: rect.color,
            scale: rect.scale,
            rotation: rect.rotation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchState {
    Idle,
    Accumulating,
}

/// Collects rectangles and draws them in batches of up to `capacity`.
pub struct SpriteBatch<B: RenderBackend> {
    buffer: BatchBuffer<B>,
    items: Box<[BatchItem]>,
    /// Slots whose placement matrix currently draws something.
    live: Box<[bool]>,
    cursor: usize,
    state: BatchState,
    stats: BatchStats,
}

impl<B: RenderBackend> SpriteBatch<B> {
    /// Create a batch of `capacity` slots on `backend`.
    pub fn new(backend: B, capacity: u32) -> Result<Self, RenderError> {
        Ok(Self::from_buffer(BatchBuffer::new(backend, capacity)?))
    }

    /// Wrap an existing batch buffer.
    pub fn from_buffer(buffer: BatchBuffer<B>) -> Self {
        let capacity = buffer.capacity() as usize;
        Self {
            buffer,
            items: vec![BatchItem::EMPTY; capacity].into_boxed_slice(),
            live: vec![false; capacity].into_boxed_slice(),
            cursor: 0,
            state: BatchState::Idle,
            stats: BatchStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// Whether `begin` has been called without a matching `end`.
    pub fn is_active(&self) -> bool {
        self.state == BatchState::Accumulating
    }

    /// Rectangles waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.cursor
    }

    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Return the counters collected so far and reset them.
    pub fn take_stats(&mut self) -> BatchStats {
        std::mem::take(&mut self.stats)
    }

    pub fn buffer(&self) -> &BatchBuffer<B> {
        &self.buffer
    }

    pub fn backend(&self) -> &B {
        self.buffer.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.buffer.backend_mut()
    }

    /// Start accumulating rectangles.
    pub fn begin(&mut self) -> Result<(), RenderError> {
        if self.state == BatchState::Accumulating {
            return Err(RenderError::AlreadyBegun);
        }
        self.state = BatchState::Accumulating;
        Ok(())
    }

    /// Queue a rectangle, flushing first if every slot is taken.
    pub fn submit(&mut self, rect: Rectangle) -> Result<(), RenderError> {
        if self.state != BatchState::Accumulating {
            return Err(RenderError::NotBegun);
        }
        if rect.width == 0 || rect.height == 0 {
            return Err(RenderError::DegenerateRect {
                width: rect.width,
                height: rect.height,
            });
        }

        if self.cursor >= self.items.len() {
            self.flush()?;
        }
        self.items[self.cursor] = BatchItem::from(rect);
        self.cursor += 1;
        self.stats.quads_submitted = self.stats.quads_submitted.saturating_add(1);
        Ok(())
    }

    /// Flush what's left and stop accumulating.
    ///
    /// The batch returns to idle even when the flush fails. A failed frame
    /// is not counted in [`BatchStats::frames`].
    pub fn end(&mut self) -> Result<(), RenderError> {
        if self.state != BatchState::Accumulating {
            return Err(RenderError::NotBegun);
        }
        let result = self.flush();
        self.state = BatchState::Idle;
        if result.is_ok() {
            self.stats.frames = self.stats.frames.saturating_add(1);
        }
        result
    }

    /// Release the GPU storage.
    pub fn dispose(self) {
        if self.cursor > 0 {
            log::warn!("Disposing sprite batch with {} unflushed rectangles", self.cursor);
        }
        self.buffer.dispose();
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        if self.items.iter().all(BatchItem::is_empty) {
            return Ok(());
        }

        // Reset even when a write or the draw failed.
        let result = self.write_slots().and_then(|()| self.buffer.draw());
        let drawn = self.cursor;
        self.items.fill(BatchItem::EMPTY);
        self.cursor = 0;
        result?;

        self.stats.draw_calls = self.stats.draw_calls.saturating_add(1);
        log::trace!("Flushed {drawn} of {} batch slots", self.items.len());
        Ok(())
    }

    fn write_slots(&mut self) -> Result<(), RenderError> {
        for slot in 0..self.items.len() {
            let item = self.items[slot];
            if item.is_empty() {
                if self.live[slot] {
                    self.buffer.clear_slot(slot)?;
                    self.live[slot] = false;
                    self.stats.slots_cleared = self.stats.slots_cleared.saturating_add(1);
                }
                continue;
            }
            self.buffer.update_transform_rotated(
                slot,
                item.position,
                item.size(),
                item.scale,
                item.rotation,
            )?;
            self.buffer.update_vertex_color(slot, item.color)?;
            self.live[slot] = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Mat4, Viewport};
    use crate::render::backend::recording::RecordingBackend;
    use crate::render2d::vertex::{Quad, TransformUniform};

    fn batch(capacity: u32) -> SpriteBatch<RecordingBackend> {
        SpriteBatch::new(RecordingBackend::new(800, 600), capacity).unwrap()
    }

    fn rect(i: u32) -> Rectangle {
        Rectangle::new(10.0 * i as f32 + 5.0, 20.0, 10 + i, 8, Color::rgb(i as u8, 0, 255))
    }

    fn matrix_at(batch: &SpriteBatch<RecordingBackend>, slot: usize) -> Mat4 {
        let bytes = batch.backend().contents("batch transform buffer");
        let start = slot * TransformUniform::SIZE as usize;
        let uniform: TransformUniform =
            bytemuck::pod_read_unaligned(&bytes[start..start + TransformUniform::SIZE as usize]);
        Mat4::from_cols_array_2d(&uniform.matrix)
    }

    fn color_at(batch: &SpriteBatch<RecordingBackend>, slot: usize) -> [f32; 4] {
        let bytes = batch.backend().contents("batch vertex buffer");
        let start = slot * Quad::SIZE as usize;
        let quad: Quad = bytemuck::pod_read_unaligned(&bytes[start..start + Quad::SIZE as usize]);
        quad.vertices[0].color
    }

    fn expected_matrix(r: &Rectangle) -> Mat4 {
        Viewport::new(800, 600).unwrap().placement(
            r.position,
            Vec2::new(r.width as f32, r.height as f32),
            r.scale,
            r.rotation,
        )
    }

    #[test]
    fn full_batch_flushes_once_on_end() {
        let mut b = batch(4);
        b.begin().unwrap();
        for i in 0..4 {
            b.submit(rect(i)).unwrap();
        }
        assert!(b.backend().draws().is_empty(), "filling the last slot must not flush");
        b.end().unwrap();

        assert_eq!(b.backend().draws(), vec![0..24]);
        for i in 0..4 {
            let r = rect(i);
            assert!(matrix_at(&b, i as usize).abs_diff_eq(expected_matrix(&r), 1e-6));
            assert_eq!(color_at(&b, i as usize), r.color.to_array());
        }
        assert_eq!(b.stats().draw_calls, 1);
        assert_eq!(b.stats().quads_submitted, 4);
    }

    #[test]
    fn overflow_flushes_on_next_submit() {
        let mut b = batch(3);
        b.begin().unwrap();
        for i in 0..3 {
            b.submit(rect(i)).unwrap();
        }
        b.submit(rect(9)).unwrap();

        assert_eq!(b.backend().draws().len(), 1);
        assert_eq!(b.pending(), 1);

        b.end().unwrap();
        assert_eq!(b.backend().draws().len(), 2);
        assert_eq!(color_at(&b, 0), rect(9).color.to_array());
        assert!(matrix_at(&b, 0).abs_diff_eq(expected_matrix(&rect(9)), 1e-6));
    }

    #[test]
    fn end_without_submissions_draws_nothing() {
        let mut b = batch(4);
        b.begin().unwrap();
        b.end().unwrap();
        assert!(b.backend().draws().is_empty());
        assert_eq!(b.stats().frames, 1);
        assert_eq!(b.stats().draw_calls, 0);
    }

    #[test]
    fn exactly_full_then_end_leaves_nothing_to_flush() {
        let mut b = batch(2);
        b.begin().unwrap();
        b.submit(rect(0)).unwrap();
        b.submit(rect(1)).unwrap();
        b.end().unwrap();
        b.begin().unwrap();
        b.end().unwrap();
        assert_eq!(b.backend().draws().len(), 1);
    }

    #[test]
    fn stale_slots_are_collapsed() {
        let mut b = batch(4);
        b.begin().unwrap();
        for i in 0..3 {
            b.submit(rect(i)).unwrap();
        }
        b.end().unwrap();

        b.backend_mut().clear_calls();
        b.begin().unwrap();
        b.submit(rect(7)).unwrap();
        b.end().unwrap();

        assert!(matrix_at(&b, 0).abs_diff_eq(expected_matrix(&rect(7)), 1e-6));
        assert_eq!(matrix_at(&b, 1), Mat4::ZERO);
        assert_eq!(matrix_at(&b, 2), Mat4::ZERO);
        assert_eq!(b.stats().slots_cleared, 2);

        // Slot 3 was never drawn, so it isn't rewritten.
        let transform_writes = b.backend().writes_to("batch transform buffer");
        assert_eq!(transform_writes, vec![(0, 64), (64, 64), (128, 64)]);
    }

    #[test]
    fn rotation_and_scale_reach_the_matrix() {
        let mut b = batch(1);
        let r = Rectangle::new(400.0, 300.0, 100, 50, Color::WHITE)
            .rotated(30.0)
            .scaled(1.5);
        b.begin().unwrap();
        b.submit(r).unwrap();
        b.end().unwrap();
        assert!(matrix_at(&b, 0).abs_diff_eq(expected_matrix(&r), 1e-6));
    }

    #[test]
    fn usage_order_is_enforced() {
        let mut b = batch(2);
        assert!(matches!(b.submit(rect(0)), Err(RenderError::NotBegun)));
        assert!(matches!(b.end(), Err(RenderError::NotBegun)));

        b.begin().unwrap();
        assert!(matches!(b.begin(), Err(RenderError::AlreadyBegun)));
        assert!(b.is_active());
        b.end().unwrap();
        assert!(!b.is_active());
        assert!(matches!(b.end(), Err(RenderError::NotBegun)));
    }

    #[test]
    fn zero_area_rectangles_are_rejected() {
        let mut b = batch(2);
        b.begin().unwrap();
        let err = b.submit(Rectangle::new(1.0, 1.0, 0, 5, Color::RED)).unwrap_err();
        assert!(matches!(err, RenderError::DegenerateRect { width: 0, height: 5 }));
        assert_eq!(b.pending(), 0);
    }

    #[test]
    fn failed_flush_still_returns_to_idle() {
        let mut b = batch(2);
        b.begin().unwrap();
        b.submit(rect(0)).unwrap();
        b.backend_mut().viewport = (0, 0);

        assert!(matches!(b.end(), Err(RenderError::InvalidViewport { .. })));
        assert!(!b.is_active());
        assert_eq!(b.pending(), 0);
        assert!(b.backend().draws().is_empty());
        assert_eq!(b.stats().frames, 0, "a failed frame is not counted");

        b.backend_mut().viewport = (800, 600);
        b.begin().unwrap();
        b.end().unwrap();
        assert!(b.backend().draws().is_empty(), "failed items must not be redrawn");
        assert_eq!(b.stats().frames, 1);
    }

    #[test]
    fn empty_sentinel() {
        assert!(BatchItem::EMPTY.is_empty());
        assert!(BatchItem::default().is_empty());
        assert!(!BatchItem::from(rect(0)).is_empty());

        // A transparent black rect at the origin still has a size.
        let invisible = Rectangle::new(0.0, 0.0, 1, 1, Color::NONE);
        assert!(!BatchItem::from(invisible).is_empty());
    }

    #[test]
    fn take_stats_resets_counters() {
        let mut b = batch(2);
        b.begin().unwrap();
        b.submit(rect(0)).unwrap();
        b.end().unwrap();

        let stats = b.take_stats();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.quads_submitted, 1);
        assert_eq!(b.stats(), BatchStats::default());
    }

    #[test]
    fn counters_saturate_instead_of_overflowing() {
        let mut b = batch(2);
        b.stats.quads_submitted = u64::MAX;
        b.stats.draw_calls = u64::MAX;
        b.stats.frames = u64::MAX;

        b.begin().unwrap();
        b.submit(Rectangle::new(10.0, 10.0, 5, 5, Color::RED)).unwrap();
        b.end().unwrap();

        assert_eq!(b.backend().draws().len(), 1);
        assert_eq!(b.stats().quads_submitted, u64::MAX);
        assert_eq!(b.stats().draw_calls, u64::MAX);
        assert_eq!(b.stats().frames, u64::MAX);
    }
}
