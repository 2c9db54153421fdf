//! The blocked driver: cache blocking, packing and kernel dispatch.

use tracing::trace;

use super::edge::scalar_block;
use super::scratch::Scratch;
use super::tiling::{Block, chunks, next_chunk, outer_blocks, row_panels};
use super::BOperand;
use crate::config::{BlockConfig, UNROLL};
use crate::error::Result;
use crate::kernels::{Geometry, Isa};
use crate::matrix::{MatMut, MatRef};
use crate::packing::pack_a;

/// Scratch elements the blocked path needs for an `m × n × k` problem.
///
/// Only the 4-aligned part of M and N is packed, and no chunk is ever
/// wider than its block, so this is at most `config.scratch_len()`.
pub fn blocked_scratch_len(config: &BlockConfig, m: usize, n: usize, k: usize) -> usize {
    let (a_len, b_len) = panel_lens(config, m, n, k);
    a_len + b_len
}

fn panel_lens(config: &BlockConfig, m: usize, n: usize, k: usize) -> (usize, usize) {
    let m_main = m - m % UNROLL;
    let n_main = n - n % UNROLL;
    if m_main == 0 || n_main == 0 || k == 0 {
        return (0, 0);
    }
    let kc = k.min(config.k_block);
    (m_main.min(config.m_block) * kc, n_main.min(config.n_block) * kc)
}

/// C += A · B over the blocked path.
///
/// Shapes must already agree: A is m × k, `b` describes k × n, C is
/// m × n. `isa` must be supported by this CPU.
///
/// For each M block and K chunk, the first B panel is packed, then A is
/// packed 12/8/4 rows at a time and multiplied against it. When N needs
/// more than one chunk, the A sub-panels are laid out back to back so the
/// remaining N chunks only repack B.
pub(crate) fn gemm_blocked(
    config: &BlockConfig,
    isa: Isa,
    a: MatRef<'_>,
    b: BOperand<'_>,
    c: &mut MatMut<'_>,
    scratch: &mut Scratch,
) -> Result<()> {
    let (m, n, k) = (c.rows(), c.cols(), a.cols());
    let m_main = m - m % UNROLL;
    let n_main = n - n % UNROLL;

    if m_main > 0 && n_main > 0 && k > 0 {
        let (a_len, b_len) = panel_lens(config, m, n, k);
        let (a_region, b_region) = scratch.panels(a_len, b_len)?;
        let reuse_a = next_chunk(n_main, config.n_block) < n_main;

        for mb in outer_blocks(m_main, config.m_block) {
            for kb in chunks(k, config.k_block) {
                trace!(
                    m_offset = mb.offset,
                    m_len = mb.len,
                    k_offset = kb.offset,
                    k_len = kb.len,
                    reuse_a,
                    "block"
                );

                let mut n_chunks = chunks(n_main, config.n_block);
                let Some(first) = n_chunks.next() else {
                    continue;
                };

                let geometry = Geometry::for_block_cols(first.len);
                b.pack(kb, first, geometry.cols(), b_region)?;

                for panel in row_panels(mb.len) {
                    let start = if reuse_a { panel.offset * kb.len } else { 0 };
                    let a_panel = &mut a_region[start..start + panel.len * kb.len];
                    pack_a(
                        a.submatrix(mb.offset + panel.offset, kb.offset, panel.len, kb.len)?,
                        a_panel,
                    );

                    let rows = Block {
                        offset: mb.offset + panel.offset,
                        len: panel.len,
                    };
                    run_panel(geometry, isa, a_panel, b_region, c, rows, first, kb.len);
                }

                for nb in n_chunks {
                    let geometry = Geometry::for_block_cols(nb.len);
                    b.pack(kb, nb, geometry.cols(), b_region)?;
                    run_panel(geometry, isa, &a_region[..mb.len * kb.len], b_region, c, mb, nb, kb.len);
                }
            }
        }
    }

    if m_main < m {
        scalar_block(a, &b, c, m_main..m, 0..n);
    }
    if n_main < n {
        scalar_block(a, &b, c, 0..m_main, n_main..n);
    }
    Ok(())
}

/// Run the geometry's kernel over every tile of a packed A/B panel pair.
///
/// `rows` and `cols` locate the panel in C; their lengths must be
/// multiples of the geometry's tile.
#[allow(clippy::too_many_arguments)]
fn run_panel(
    geometry: Geometry,
    isa: Isa,
    a_panel: &[f64],
    b_panel: &[f64],
    c: &mut MatMut<'_>,
    rows: Block,
    cols: Block,
    kc: usize,
) {
    let (r, cn) = (geometry.rows(), geometry.cols());
    assert!(rows.len % r == 0 && cols.len % cn == 0);
    assert!(a_panel.len() >= rows.len * kc && b_panel.len() >= cols.len * kc);
    assert!(rows.end() <= c.rows() && cols.end() <= c.cols());

    let kernel = geometry.kernel(isa);
    let ldc = c.ld();

    for i in (0..rows.len).step_by(r) {
        for j in (0..cols.len).step_by(cn) {
            // SAFETY: the asserts above keep the R × Cn tile inside C and
            // the K-deep tiles at i * kc / j * kc inside the panels; the
            // kernel was selected for an ISA this CPU supports.
            unsafe {
                kernel(
                    a_panel.as_ptr().add(i * kc),
                    b_panel.as_ptr().add(j * kc),
                    c.ptr_at_mut(rows.offset + i, cols.offset + j),
                    kc,
                    ldc,
                );
            }
        }
    }
}
