//! 2-wide panels for the small path.
//!
//! A row pair `q` occupies `2 * k` elements starting at `q * 2 * k`, with
//! the two rows' values for one K index adjacent. B column pairs use the
//! same shape. A 2×4 kernel therefore reads its two column pairs `2 * k`
//! apart, which the strided small kernels express through `b_pair`.
//!
//! Only complete pairs are packed; an odd last row or column is handled
//! by the caller from unpacked memory.

use crate::matrix::MatRef;

/// Pack the complete row pairs of `src` (m × k).
pub fn pack_a_pairs(src: MatRef<'_>, dst: &mut [f64]) {
    let (pairs, k) = (src.rows() / 2, src.cols());
    assert!(dst.len() >= pairs * 2 * k, "pack_a_pairs: panel holds {} of {}", dst.len(), pairs * 2 * k);

    for q in 0..pairs {
        let (top, bottom) = (src.row(2 * q), src.row(2 * q + 1));
        let panel = &mut dst[q * 2 * k..(q + 1) * 2 * k];
        for (p, out) in panel.chunks_exact_mut(2).enumerate() {
            out[0] = top[p];
            out[1] = bottom[p];
        }
    }
}

/// Pack the complete column pairs of `src` (k × n).
pub fn pack_b_pairs(src: MatRef<'_>, dst: &mut [f64]) {
    let (k, pairs) = (src.rows(), src.cols() / 2);
    assert!(dst.len() >= pairs * 2 * k, "pack_b_pairs: panel holds {} of {}", dst.len(), pairs * 2 * k);

    for p in 0..k {
        let row = src.row(p);
        for q in 0..pairs {
            let start = q * 2 * k + p * 2;
            dst[start..start + 2].copy_from_slice(&row[2 * q..2 * q + 2]);
        }
    }
}
