//! Triple-loop reference products.
//!
//! Slow on purpose: no blocking, no packing, no SIMD. These are the
//! correctness baseline every optimised path is compared against. All
//! accumulate into C (C += ...) and index through leading dimensions, so
//! they accept the same strided operands as the engine.

/// Reference C += A · B, i-k-j loop order.
///
/// The innermost loop walks B and C rows with stride 1, which keeps even
/// the reference usable on 256×256 problems.
///
/// # Arguments
///
/// * `a` - Matrix A (m × k), row-major with stride `lda`
/// * `b` - Matrix B (k × n), row-major with stride `ldb`
/// * `c` - Matrix C (m × n), row-major with stride `ldc`, accumulated into
///
/// # Panics
///
/// Panics if a slice is too short for its dimensions.
#[allow(clippy::too_many_arguments)]
pub fn gemm_naive(
    m: usize,
    n: usize,
    k: usize,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    c: &mut [f64],
    ldc: usize,
) {
    for i in 0..m {
        for p in 0..k {
            let a_ip = a[i * lda + p];
            for j in 0..n {
                c[i * ldc + j] += a_ip * b[p * ldb + j];
            }
        }
    }
}

/// Reference C += A · Bᵗ where B is stored as n × k.
///
/// Each output element is a dot product of two rows, so both operands are
/// read sequentially.
#[allow(clippy::too_many_arguments)]
pub fn gemm_naive_abt(
    m: usize,
    n: usize,
    k: usize,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    c: &mut [f64],
    ldc: usize,
) {
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0;
            for p in 0..k {
                sum += a[i * lda + p] * b[j * ldb + p];
            }
            c[i * ldc + j] += sum;
        }
    }
}

/// Reference C += A · B · Aᵗ with A m × k, B k × k and C m × m.
///
/// Forms T = A · B first, then C += T · Aᵗ.
#[allow(clippy::too_many_arguments)]
pub fn gemm_naive_abat(
    m: usize,
    k: usize,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    c: &mut [f64],
    ldc: usize,
) {
    let mut t = vec![0.0; m * k];
    gemm_naive(m, k, k, a, lda, b, ldb, &mut t, k);
    gemm_naive_abt(m, m, k, &t, k, a, lda, c, ldc);
}
