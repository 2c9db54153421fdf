//! 2×2 microkernel for the small-matrix path.
//!
//! Takes strided operands instead of fixed panels so the same kernel runs
//! on unpacked row-major memory and on 2-wide light panels. See
//! [`super::SmallKernelFn`] for the addressing rules.

use super::portable::strided_tile;

/// Computes a 2×2 tile: C[0:2, 0:2] += A × B (strided operands)
///
/// # Safety
///
/// - `a.add(r * a_rs + p * a_cs)` readable for r in 0..2, p in 0..k
/// - `b.add(p * b_rs)` readable for 2 f64s, p in 0..k
/// - `c.add(row * ldc)` valid for row in 0..2, each allowing read/write of 2 f64s
#[allow(unsafe_op_in_unsafe_fn)]
#[allow(clippy::too_many_arguments)]
pub unsafe fn kernel_2x2_portable(
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
    strided_tile::<2, 2>(a, a_rs, a_cs, b, b_rs, b_pair, c, k, ldc);
}

/// Computes a 2×2 tile with SSE2-width FMA.
///
/// Two XMM accumulators, one per output row; no prefetching since the
/// whole problem is already cache resident.
///
/// # Safety
///
/// Same as [`kernel_2x2_portable`], plus the CPU must support AVX2 and FMA.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
#[allow(unsafe_op_in_unsafe_fn)]
#[allow(clippy::too_many_arguments)]
pub unsafe fn kernel_2x2_avx2(
    a: *const f64,
    a_rs: usize,
    a_cs: usize,
    b: *const f64,
    b_rs: usize,
    _b_pair: usize,
    c: *mut f64,
    k: usize,
    ldc: usize,
) {
    use std::arch::x86_64::*;

    let mut c0 = _mm_setzero_pd();
    let mut c1 = _mm_setzero_pd();

    for p in 0..k {
        let b_vec = _mm_loadu_pd(b.add(p * b_rs));
        let a0 = _mm_set1_pd(*a.add(p * a_cs));
        let a1 = _mm_set1_pd(*a.add(a_rs + p * a_cs));

        c0 = _mm_fmadd_pd(a0, b_vec, c0);
        c1 = _mm_fmadd_pd(a1, b_vec, c1);
    }

    _mm_storeu_pd(c, _mm_add_pd(_mm_loadu_pd(c), c0));
    _mm_storeu_pd(c.add(ldc), _mm_add_pd(_mm_loadu_pd(c.add(ldc)), c1));
}
