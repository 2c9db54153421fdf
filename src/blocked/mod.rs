//! Cache-blocked GEMM over packed panels.
//!
//! The scheduler breaks the product into M blocks, K chunks and N chunks
//! sized by a [`BlockConfig`](crate::config::BlockConfig), packs each
//! piece into a [`Scratch`] arena and hands aligned tiles to the
//! microkernels. Rows and columns past the last full 4-tile go through a
//! scalar loop on the unpacked operands.

mod edge;
mod scheduler;
mod scratch;
pub mod tiling;

pub use scheduler::blocked_scratch_len;
pub use scratch::Scratch;
pub use tiling::{Block, next_chunk, round_up, row_panel_len};

pub(crate) use edge::scalar_block;
pub(crate) use scheduler::gemm_blocked;

use crate::error::Result;
use crate::matrix::MatRef;
use crate::packing::{pack_b, pack_b_transposed};

/// Right-hand operand as stored by the caller.
#[derive(Debug, Clone, Copy)]
pub(crate) enum BOperand<'a> {
    /// B itself, k × n.
    RowMajor(MatRef<'a>),
    /// Bᵗ, n × k. Used for A · Bᵗ.
    Transposed(MatRef<'a>),
}

impl BOperand<'_> {
    /// Logical column count of B.
    pub(crate) fn cols(&self) -> usize {
        match self {
            BOperand::RowMajor(b) => b.cols(),
            BOperand::Transposed(bt) => bt.rows(),
        }
    }

    /// Logical row count of B, the shared K extent.
    pub(crate) fn depth(&self) -> usize {
        match self {
            BOperand::RowMajor(b) => b.rows(),
            BOperand::Transposed(bt) => bt.cols(),
        }
    }

    #[inline]
    pub(crate) fn at(&self, p: usize, j: usize) -> f64 {
        match self {
            BOperand::RowMajor(b) => b.at(p, j),
            BOperand::Transposed(bt) => bt.at(j, p),
        }
    }

    /// Pack rows `k` and columns `n` of B into `width`-column tiles.
    fn pack(&self, k: Block, n: Block, width: usize, dst: &mut [f64]) -> Result<()> {
        match self {
            BOperand::RowMajor(b) => pack_b(b.submatrix(k.offset, n.offset, k.len, n.len)?, dst, width),
            BOperand::Transposed(bt) => {
                pack_b_transposed(bt.submatrix(n.offset, k.offset, n.len, k.len)?, dst, width)
            }
        }
        Ok(())
    }
}
