//! Double precision GEMM built from cache blocking, panel packing and
//! small register-tile kernels.
//!
//! All entry points accumulate: `C += A · B`. Matrices are row-major with
//! an explicit leading dimension, so any sub-matrix of a larger buffer can
//! be passed without copying.
//!
//! ## Usage
//!
//! ```
//! let (m, n, k) = (64, 48, 32);
//! let a = vec![1.0f64; m * k];
//! let b = vec![1.0f64; k * n];
//! let mut c = vec![0.0f64; m * n];
//!
//! dgemm::gemm(m, n, k, &a, k, &b, n, &mut c, n).unwrap();
//! assert!(c.iter().all(|&x| x == k as f64));
//! ```
//!
//! For repeated calls, build a [`Gemm`] once and pass it an arena from
//! [`Gemm::scratch`] so no call allocates:
//!
//! ```
//! use dgemm::{BlockConfig, Gemm, MatMut, MatRef};
//!
//! let engine = Gemm::new(BlockConfig::default()).unwrap();
//! let mut scratch = engine.scratch().unwrap();
//!
//! let a = vec![2.0f64; 100 * 100];
//! let mut c = vec![0.0f64; 100 * 100];
//! let a_view = MatRef::dense(&a, 100, 100).unwrap();
//! let mut c_view = MatMut::dense(&mut c, 100, 100).unwrap();
//! engine.gemm(a_view, a_view, &mut c_view, Some(&mut scratch)).unwrap();
//! assert_eq!(c[0], 400.0);
//! ```
//!
//! ## What's inside
//!
//! - 4×4 and 4×8 kernels over packed panels, 2×2 and 2×4 kernels for
//!   small problems, each portable and AVX2+FMA
//! - A blocked scheduler with the M/K/N chunking tuned for L1/L2
//! - A size ladder that skips packing when it would not pay off
//! - A · Bᵗ and A · B · Aᵗ on the same machinery

pub mod blocked;
pub mod config;
mod engine;
pub mod error;
pub mod kernels;
pub mod matrix;
pub mod packing;
mod small;

pub use blocked::Scratch;
pub use config::{BlockConfig, SmallPolicy};
pub use engine::Gemm;
pub use error::{GemmError, Result};
pub use kernels::{Geometry, Isa, SmallGeometry};
pub use matrix::naive::{gemm_naive, gemm_naive_abat, gemm_naive_abt};
pub use matrix::verify::{DEFAULT_EPSILON, first_mismatch, max_relative_error};
pub use matrix::{MatMut, MatRef};

/// C += A · B with the default engine.
///
/// A is m × k (stride `lda`), B is k × n (stride `ldb`), C is m × n
/// (stride `ldc`). Shapes are checked before anything is computed.
///
/// # Errors
///
/// Fails if a leading dimension is shorter than its row, a slice is too
/// short, or scratch cannot be allocated. C is unchanged on error.
#[allow(clippy::too_many_arguments)]
pub fn gemm(
    m: usize,
    n: usize,
    k: usize,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    c: &mut [f64],
    ldc: usize,
) -> Result<()> {
    let a = MatRef::new(a, m, k, lda)?;
    let b = MatRef::new(b, k, n, ldb)?;
    let mut c = MatMut::new(c, m, n, ldc)?;
    Gemm::default().gemm(a, b, &mut c, None)
}

/// C += A · Bᵗ with the default engine. B is stored n × k.
#[allow(clippy::too_many_arguments)]
pub fn gemm_abt(
    m: usize,
    n: usize,
    k: usize,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    c: &mut [f64],
    ldc: usize,
) -> Result<()> {
    let a = MatRef::new(a, m, k, lda)?;
    let bt = MatRef::new(b, n, k, ldb)?;
    let mut c = MatMut::new(c, m, n, ldc)?;
    Gemm::default().gemm_abt(a, bt, &mut c, None)
}

/// C += A · B · Aᵗ with the default engine. A is m × k, B is k × k and C
/// is m × m.
#[allow(clippy::too_many_arguments)]
pub fn gemm_abat(
    m: usize,
    k: usize,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    c: &mut [f64],
    ldc: usize,
) -> Result<()> {
    let a = MatRef::new(a, m, k, lda)?;
    let b = MatRef::new(b, k, k, ldb)?;
    let mut c = MatMut::new(c, m, m, ldc)?;
    Gemm::default().gemm_abat(a, b, &mut c, None)
}
