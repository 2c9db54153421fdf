//! Panel packing.
//!
//! Packing copies a block of A or B out of its strided row-major home into
//! the contiguous order a microkernel reads, so the inner loop walks memory
//! with stride 1 no matter how wide the source matrix is.
//!
//! Two families live here:
//! - `panel`: the 4-row zigzag for A and `width`-column tiles for B, read
//!   by the packed 4×4 / 4×8 kernels
//! - `pairs`: 2-row / 2-column panels for the small path
//!
//! The two layouts are not interchangeable; a panel must be consumed by a
//! kernel of the family that produced it.

pub mod pairs;
pub mod panel;

pub use pairs::{pack_a_pairs, pack_b_pairs};
pub use panel::{pack_a, pack_b, pack_b_transposed};
