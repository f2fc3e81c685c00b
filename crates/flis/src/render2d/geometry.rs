//! # Geometry — The Static Quad and Index Tables
//!
//! A batch of capacity `N` is drawn from two tables that are built once and
//! uploaded once:
//!
//! - `N` unit quads, quad `i` tagged with slot index `i` on all four corners.
//! - `6N` indices, two triangles per slot.
//!
//! ## Index Topology
//!
//! ```text
//!   0 (TL) ──── 2 (TR)        slot i, base = 4i
//!     │  ╲        │
//!     │    ╲      │           triangle 1: base,   base+1, base+2
//!     │      ╲    │           triangle 2: base+2, base+1, base+3
//!   1 (BL) ──── 3 (BR)
//! ```
//!
//! Neither table depends on anything but the capacity. Rectangles change
//! what goes in the per-slot placement matrices and vertex colors, never
//! the topology.

use super::vertex::Quad;

/// Indices emitted per batch slot.
pub const INDICES_PER_QUAD: u32 = 6;

/// Build `capacity` opaque white unit quads, one per slot.
pub fn generate_quads(capacity: u32) -> Vec<Quad> {
    (0..capacity).map(Quad::unit).collect()
}

/// Build the index table for `capacity` slots.
pub fn generate_indices(capacity: u32) -> Vec<u32> {
    let mut indices = Vec::with_capacity((capacity * INDICES_PER_QUAD) as usize);
    for slot in 0..capacity {
        let base = slot * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_count_is_six_per_slot() {
        for n in [1, 2, 10, 1000] {
            assert_eq!(generate_indices(n).len(), (6 * n) as usize);
        }
    }

    #[test]
    fn each_slot_references_its_own_four_vertices() {
        let indices = generate_indices(16);
        for (slot, chunk) in indices.chunks(6).enumerate() {
            let base = slot as u32 * 4;
            assert_eq!(chunk[0], base, "slot {slot} base offset");

            let mut distinct = chunk.to_vec();
            distinct.sort_unstable();
            distinct.dedup();
            assert_eq!(distinct, vec![base, base + 1, base + 2, base + 3]);
        }
    }

    #[test]
    fn triangles_share_the_diagonal() {
        let indices = generate_indices(1);
        assert_eq!(indices, vec![0, 1, 2, 2, 1, 3]);
    }

    #[test]
    fn quads_are_tagged_in_slot_order() {
        let quads = generate_quads(5);
        assert_eq!(quads.len(), 5);
        for (i, quad) in quads.iter().enumerate() {
            assert!(quad.vertices.iter().all(|v| v.slot == i as f32));
        }
    }

    #[test]
    fn zero_capacity_yields_empty_tables() {
        assert!(generate_quads(0).is_empty());
        assert!(generate_indices(0).is_empty());
    }
}
