//! Zigzag panels for the packed kernels.
//!
//! A panel (rows × k): 4-row tiles, tile `t` at `t * 4 * k`, and inside a
//! tile the 4 values of one K index are adjacent.
//!
//! B panel (k × cols): `width`-column tiles, tile `u` at `u * width * k`,
//! and inside a tile the `width` values of one K index are adjacent.

use crate::config::UNROLL;
use crate::matrix::MatRef;

/// Pack a `rows × k` block of A. `rows` must be a multiple of 4.
///
/// # Panics
///
/// Panics if `rows` is unaligned or `dst` is shorter than `rows * k`.
pub fn pack_a(src: MatRef<'_>, dst: &mut [f64]) {
    let (rows, k) = (src.rows(), src.cols());
    assert!(rows % UNROLL == 0, "pack_a: {rows} rows is not a multiple of {UNROLL}");
    assert!(dst.len() >= rows * k, "pack_a: panel holds {} of {}", dst.len(), rows * k);

    for t in (0..rows).step_by(UNROLL) {
        let tile_rows = [src.row(t), src.row(t + 1), src.row(t + 2), src.row(t + 3)];
        let tile = &mut dst[t * k..(t + UNROLL) * k];

        for p in 0..k {
            let out = &mut tile[p * UNROLL..(p + 1) * UNROLL];
            for (slot, row) in out.iter_mut().zip(&tile_rows) {
                *slot = row[p];
            }
        }
    }
}

/// Pack a `k × cols` block of row-major B into `width`-column tiles.
///
/// # Panics
///
/// Panics if `cols` is not a multiple of `width` or `dst` is too short.
pub fn pack_b(src: MatRef<'_>, dst: &mut [f64], width: usize) {
    let (k, cols) = (src.rows(), src.cols());
    assert!(width > 0 && cols % width == 0, "pack_b: {cols} cols is not a multiple of {width}");
    assert!(dst.len() >= k * cols, "pack_b: panel holds {} of {}", dst.len(), k * cols);

    for p in 0..k {
        let row = src.row(p);
        for j0 in (0..cols).step_by(width) {
            let start = j0 * k + p * width;
            dst[start..start + width].copy_from_slice(&row[j0..j0 + width]);
        }
    }
}

/// Same layout as [`pack_b`], read from a `cols × k` source holding Bᵗ.
///
/// Lets A · Bᵗ run on the unchanged kernels without transposing B first.
pub fn pack_b_transposed(src: MatRef<'_>, dst: &mut [f64], width: usize) {
    let (cols, k) = (src.rows(), src.cols());
    assert!(width > 0 && cols % width == 0, "pack_b_transposed: {cols} cols is not a multiple of {width}");
    assert!(dst.len() >= k * cols, "pack_b_transposed: panel holds {} of {}", dst.len(), k * cols);

    for j0 in (0..cols).step_by(width) {
        let tile = &mut dst[j0 * k..(j0 + width) * k];
        for w in 0..width {
            // row j of the source is column j of B
            let column = src.row(j0 + w);
            for (p, &value) in column.iter().enumerate() {
                tile[p * width + w] = value;
            }
        }
    }
}
