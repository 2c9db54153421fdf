//! 2×4 microkernel for the small-matrix path.

use super::portable::strided_tile;

/// Computes a 2×4 tile: C[0:2, 0:4] += A × B (strided operands)
///
/// Columns 0..2 are read at `b + p * b_rs`, columns 2..4 at
/// `b + p * b_rs + b_pair`.
///
/// # Safety
///
/// - `a.add(r * a_rs + p * a_cs)` readable for r in 0..2, p in 0..k
/// - `b.add(p * b_rs)` and `b.add(p * b_rs + b_pair)` readable for 2 f64s each, p in 0..k
/// - `c.add(row * ldc)` valid for row in 0..2, each allowing read/write of 4 f64s
#[allow(unsafe_op_in_unsafe_fn)]
#[allow(clippy::too_many_arguments)]
pub unsafe fn kernel_2x4_portable(
    a: *const f64,
    a_rs: usize,
    a_cs: usize,
    b: *const f64,
    b_rs: usize,
    b_pair: usize,
    c: *mut f64,
    k: usize,
    ldc: usize,
) {
    strided_tile::<2, 4>(a, a_rs, a_cs, b, b_rs, b_pair, c, k, ldc);
}

/// Computes a 2×4 tile with four XMM accumulators.
///
/// The two column pairs are loaded separately because on light panels
/// they are `2 * k` elements apart.
///
/// # Safety
///
/// Same as [`kernel_2x4_portable`], plus the CPU must support AVX2 and FMA.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
#[allow(unsafe_op_in_unsafe_fn)]
#[allow(clippy::too_many_arguments)]
pub unsafe fn kernel_2x4_avx2(
    a: *const f64,
    a_rs: usize,
    a_cs: usize,
    b: *const f64,
    b_rs: usize,
    b_pair: usize,
    c: *mut f64,
    k: usize,
    ldc: usize,
) {
    use std::arch::x86_64::*;

    let mut c00 = _mm_setzero_pd();
    let mut c01 = _mm_setzero_pd();
    let mut c10 = _mm_setzero_pd();
    let mut c11 = _mm_setzero_pd();

    for p in 0..k {
        let b_row = b.add(p * b_rs);
        let b0 = _mm_loadu_pd(b_row);
        let b1 = _mm_loadu_pd(b_row.add(b_pair));

        let a0 = _mm_set1_pd(*a.add(p * a_cs));
        let a1 = _mm_set1_pd(*a.add(a_rs + p * a_cs));

        c00 = _mm_fmadd_pd(a0, b0, c00);
        c01 = _mm_fmadd_pd(a0, b1, c01);
        c10 = _mm_fmadd_pd(a1, b0, c10);
        c11 = _mm_fmadd_pd(a1, b1, c11);
    }

    let c1 = c.add(ldc);
    _mm_storeu_pd(c, _mm_add_pd(_mm_loadu_pd(c), c00));
    _mm_storeu_pd(c.add(2), _mm_add_pd(_mm_loadu_pd(c.add(2)), c01));
    _mm_storeu_pd(c1, _mm_add_pd(_mm_loadu_pd(c1), c10));
    _mm_storeu_pd(c1.add(2), _mm_add_pd(_mm_loadu_pd(c1.add(2)), c11));
}
