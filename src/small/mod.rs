//! Small-matrix path.
//!
//! Below a few dozen elements per side, packing into 4-row panels costs
//! about as much as the multiplication. This module sweeps C with 2×4 and
//! 2×2 tiles instead:
//!
//! - direct: kernels read A and B where they live
//! - light pack: complete row pairs of A and column pairs of B are copied
//!   into 2-wide panels first, so both kernels stream contiguous memory
//!
//! An odd last column and an odd last row are finished by the scalar edge
//! loop of the blocked path.

use tracing::trace;

use crate::blocked::{BOperand, Scratch, scalar_block};
use crate::error::Result;
use crate::kernels::{Isa, SmallGeometry};
use crate::matrix::{MatMut, MatRef};
use crate::packing::{pack_a_pairs, pack_b_pairs};

/// Where the kernels find A and B, in the strided-kernel convention.
#[derive(Debug, Clone, Copy)]
struct Operands {
    a: *const f64,
    /// Distance between consecutive row pairs of A.
    a_pair: usize,
    a_rs: usize,
    a_cs: usize,
    b: *const f64,
    b_rs: usize,
    /// Distance between consecutive column pairs of B.
    b_pair: usize,
}

/// Scratch the light-pack rung needs for an `m × n × k` problem.
pub fn light_pack_scratch_len(m: usize, n: usize, k: usize) -> usize {
    (m / 2) * 2 * k + (n / 2) * 2 * k
}

/// C += A · B with the small kernels reading unpacked memory.
///
/// Shapes must agree and `k` must be non-zero.
pub(crate) fn gemm_direct(isa: Isa, a: MatRef<'_>, b: MatRef<'_>, c: &mut MatMut<'_>) {
    let operands = Operands {
        a: a.ptr_at(0, 0),
        a_pair: 2 * a.ld(),
        a_rs: a.ld(),
        a_cs: 1,
        b: b.ptr_at(0, 0),
        b_rs: b.ld(),
        b_pair: 2,
    };
    trace!(m = c.rows(), n = c.cols(), k = a.cols(), "direct sweep");
    sweep(isa, operands, a, b, c);
}

/// C += A · B after packing A and B into 2-wide panels.
pub(crate) fn gemm_light_pack(
    isa: Isa,
    a: MatRef<'_>,
    b: MatRef<'_>,
    c: &mut MatMut<'_>,
    scratch: &mut Scratch,
) -> Result<()> {
    let (m, n, k) = (a.rows(), b.cols(), a.cols());
    let (a_panel, b_panel) = scratch.panels((m / 2) * 2 * k, (n / 2) * 2 * k)?;
    pack_a_pairs(a, a_panel);
    pack_b_pairs(b, b_panel);

    let operands = Operands {
        a: a_panel.as_ptr(),
        a_pair: 2 * k,
        a_rs: 1,
        a_cs: 2,
        b: b_panel.as_ptr(),
        b_rs: 2,
        b_pair: 2 * k,
    };
    trace!(m, n, k, "light pack sweep");
    sweep(isa, operands, a, b, c);
    Ok(())
}

fn sweep(isa: Isa, ops: Operands, a: MatRef<'_>, b: MatRef<'_>, c: &mut MatMut<'_>) {
    let (m, n, k) = (c.rows(), c.cols(), a.cols());
    let wide = SmallGeometry::Tile2x4.kernel(isa);
    let narrow = SmallGeometry::Tile2x2.kernel(isa);
    let ldc = c.ld();

    for i in (0..m - m % 2).step_by(2) {
        // SAFETY: row pair i / 2 exists in A (or its panel), every column
        // pair below is complete in B (or its panel), and each tile lies
        // inside C. The kernels were selected for a supported ISA.
        unsafe {
            let a_tile = ops.a.add((i / 2) * ops.a_pair);
            let mut j = 0;
            while j + 4 <= n {
                let b_tile = ops.b.add((j / 2) * ops.b_pair);
                wide(a_tile, ops.a_rs, ops.a_cs, b_tile, ops.b_rs, ops.b_pair, c.ptr_at_mut(i, j), k, ldc);
                j += 4;
            }
            if j + 2 <= n {
                let b_tile = ops.b.add((j / 2) * ops.b_pair);
                narrow(a_tile, ops.a_rs, ops.a_cs, b_tile, ops.b_rs, ops.b_pair, c.ptr_at_mut(i, j), k, ldc);
            }
        }
    }

    let b = BOperand::RowMajor(b);
    if n % 2 == 1 {
        scalar_block(a, &b, c, 0..m - m % 2, n - 1..n);
    }
    if m % 2 == 1 {
        scalar_block(a, &b, c, m - 1..m, 0..n);
    }
}
