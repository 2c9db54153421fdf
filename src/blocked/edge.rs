//! Scalar loops for rows and columns outside the 4-aligned region.

use std::ops::Range;

use super::BOperand;
use crate::matrix::{MatMut, MatRef};

/// C[rows, cols] += A[rows, :] · B[:, cols], straight from unpacked memory.
///
/// Each element is one K-ordered FMA chain added into C once, the same
/// summation the microkernels perform.
pub(crate) fn scalar_block(
    a: MatRef<'_>,
    b: &BOperand<'_>,
    c: &mut MatMut<'_>,
    rows: Range<usize>,
    cols: Range<usize>,
) {
    for i in rows {
        let a_row = a.row(i);
        for j in cols.clone() {
            let mut acc = 0.0f64;
            for (p, &a_ip) in a_row.iter().enumerate() {
                acc = a_ip.mul_add(b.at(p, j), acc);
            }
            *c.at_mut(i, j) += acc;
        }
    }
}
