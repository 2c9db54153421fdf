//! 4×8 microkernel over packed panels.

use super::portable::packed_tile;

/// Computes a 4×8 tile: C[0:4, 0:8] += A_packed × B_packed
///
/// Portable version. Same summation order as [`kernel_4x8_avx2`].
///
/// # Safety
///
/// - `a_pack` points to `k * 4` packed A values (4 per K step)
/// - `b_pack` points to `k * 8` packed B values (8 per K step)
/// - `c.add(row * ldc)` is valid for row in 0..4, each allowing read/write of 8 f64s
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_4x8_portable(
    a_pack: *const f64,
    b_pack: *const f64,
    c: *mut f64,
    k: usize,
    ldc: usize,
) {
    packed_tile::<4, 8>(a_pack, b_pack, c, k, ldc);
}

/// Computes a 4×8 tile: C[0:4, 0:8] += A_packed × B_packed
///
/// Twice the arithmetic of the 4×4 kernel per A broadcast: each row of C
/// is split across two YMM accumulators, so 8 registers hold the tile and
/// the two B halves of a K step are loaded once for all four rows.
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports AVX2 and FMA
/// - `a_pack` points to `k * 4` contiguous f64 values (packed A panel)
/// - `b_pack` points to `k * 8` contiguous f64 values (packed B panel)
/// - `c.add(row * ldc)` is valid for row in 0..4, each allowing read/write of 8 f64s
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
#[allow(clippy::identity_op)]
#[allow(clippy::erasing_op)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_4x8_avx2(
    a_pack: *const f64,
    b_pack: *const f64,
    c: *mut f64,
    k: usize,
    ldc: usize,
) {
    use std::arch::x86_64::*;

    let mut c0_lo = _mm256_setzero_pd();
    let mut c0_hi = _mm256_setzero_pd();
    let mut c1_lo = _mm256_setzero_pd();
    let mut c1_hi = _mm256_setzero_pd();
    let mut c2_lo = _mm256_setzero_pd();
    let mut c2_hi = _mm256_setzero_pd();
    let mut c3_lo = _mm256_setzero_pd();
    let mut c3_hi = _mm256_setzero_pd();

    for p in 0..k {
        let b_lo = _mm256_loadu_pd(b_pack.add(p * 8));
        let b_hi = _mm256_loadu_pd(b_pack.add(p * 8 + 4));

        let a0 = _mm256_broadcast_sd(&*a_pack.add(p * 4 + 0));
        c0_lo = _mm256_fmadd_pd(a0, b_lo, c0_lo);
        c0_hi = _mm256_fmadd_pd(a0, b_hi, c0_hi);

        let a1 = _mm256_broadcast_sd(&*a_pack.add(p * 4 + 1));
        c1_lo = _mm256_fmadd_pd(a1, b_lo, c1_lo);
        c1_hi = _mm256_fmadd_pd(a1, b_hi, c1_hi);

        let a2 = _mm256_broadcast_sd(&*a_pack.add(p * 4 + 2));
        c2_lo = _mm256_fmadd_pd(a2, b_lo, c2_lo);
        c2_hi = _mm256_fmadd_pd(a2, b_hi, c2_hi);

        let a3 = _mm256_broadcast_sd(&*a_pack.add(p * 4 + 3));
        c3_lo = _mm256_fmadd_pd(a3, b_lo, c3_lo);
        c3_hi = _mm256_fmadd_pd(a3, b_hi, c3_hi);
    }

    let rows = [(c0_lo, c0_hi), (c1_lo, c1_hi), (c2_lo, c2_hi), (c3_lo, c3_hi)];
    for (r, (lo, hi)) in rows.into_iter().enumerate() {
        let c_row = c.add(r * ldc);
        _mm256_storeu_pd(c_row, _mm256_add_pd(_mm256_loadu_pd(c_row), lo));
        _mm256_storeu_pd(c_row.add(4), _mm256_add_pd(_mm256_loadu_pd(c_row.add(4)), hi));
    }
}
