//! Portable tile bodies shared by every geometry.
//!
//! These use `f64::mul_add`, so each step is a single-rounding FMA exactly
//! like the AVX2 variants. Accumulators start at zero and are added into C
//! once after the K loop; any two kernels that follow this order produce
//! identical bits.

/// Packed tile: `a_pack` holds `k * R` values (R per K step), `b_pack`
/// holds `k * C` values (C per K step).
///
/// # Safety
///
/// - `a_pack` valid for `k * R` reads, `b_pack` valid for `k * C` reads
/// - `c.add(r * ldc)` valid for `C` reads and writes for every `r < R`
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub(crate) unsafe fn packed_tile<const R: usize, const C: usize>(
    a_pack: *const f64,
    b_pack: *const f64,
    c: *mut f64,
    k: usize,
    ldc: usize,
) {
    let mut acc = [[0.0f64; C]; R];

    for p in 0..k {
        let a = a_pack.add(p * R);
        let b = b_pack.add(p * C);
        for (r, acc_row) in acc.iter_mut().enumerate() {
            let a_val = *a.add(r);
            for (j, acc_val) in acc_row.iter_mut().enumerate() {
                *acc_val = a_val.mul_add(*b.add(j), *acc_val);
            }
        }
    }

    for (r, acc_row) in acc.iter().enumerate() {
        let c_row = c.add(r * ldc);
        for (j, acc_val) in acc_row.iter().enumerate() {
            *c_row.add(j) += *acc_val;
        }
    }
}

/// Strided tile used by the small path.
///
/// Element `A(r, p)` lives at `a[r * a_rs + p * a_cs]`. Columns come in
/// pairs: `B(p, j)` lives at `b[p * b_rs + (j / 2) * b_pair + j % 2]`.
/// With `a_rs = lda, a_cs = 1, b_rs = ldb, b_pair = 2` this reads plain
/// row-major memory; with `a_rs = 1, a_cs = 2, b_rs = 2, b_pair = 2 * k`
/// it reads 2-wide panels.
///
/// # Safety
///
/// Every address described above must be readable for `r < R`, `p < k`,
/// `j < C`, and `c.add(r * ldc)` must be valid for `C` reads and writes.
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn strided_tile<const R: usize, const C: usize>(
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
    let mut acc = [[0.0f64; C]; R];

    for p in 0..k {
        let b_row = b.add(p * b_rs);
        for (r, acc_row) in acc.iter_mut().enumerate() {
            let a_val = *a.add(r * a_rs + p * a_cs);
            for (j, acc_val) in acc_row.iter_mut().enumerate() {
                let b_val = *b_row.add((j / 2) * b_pair + j % 2);
                *acc_val = a_val.mul_add(b_val, *acc_val);
            }
        }
    }

    for (r, acc_row) in acc.iter().enumerate() {
        let c_row = c.add(r * ldc);
        for (j, acc_val) in acc_row.iter().enumerate() {
            *c_row.add(j) += *acc_val;
        }
    }
}
