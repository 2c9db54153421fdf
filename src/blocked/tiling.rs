//! Chunking rules of the blocked scheduler.
//!
//! K and N are cut into `block`-sized chunks, except that a tail between
//! one and two blocks is split into two near-equal halves rounded up to
//! [`UNROLL`]. That avoids a full block followed by a sliver that would
//! waste a whole pass over the packed panels. M is cut at `m_block`
//! directly and then into 12-, 8- or 4-row sub-panels.

use crate::config::UNROLL;

/// One chunk of a dimension: `offset..offset + len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub offset: usize,
    pub len: usize,
}

impl Block {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Round `x` up to the next multiple of `unit`.
pub fn round_up(x: usize, unit: usize) -> usize {
    x.div_ceil(unit) * unit
}

/// Length of the next K or N chunk given what is left.
///
/// ```
/// use dgemm::blocked::next_chunk;
///
/// assert_eq!(next_chunk(1000, 256), 256);
/// assert_eq!(next_chunk(300, 256), 152);
/// assert_eq!(next_chunk(200, 256), 200);
/// ```
pub fn next_chunk(remaining: usize, block: usize) -> usize {
    if remaining >= 2 * block {
        block
    } else if remaining > block {
        round_up(remaining / 2, UNROLL)
    } else {
        remaining
    }
}

/// Rows of the next A sub-panel inside an M block: 12, 8 or 4.
///
/// `remaining` is a multiple of 4 on the blocked path; anything shorter
/// than a tile is returned unchanged.
pub fn row_panel_len(remaining: usize) -> usize {
    if remaining >= 3 * UNROLL {
        3 * UNROLL
    } else if remaining >= 2 * UNROLL {
        2 * UNROLL
    } else if remaining > UNROLL {
        UNROLL
    } else {
        remaining
    }
}

fn blocks(total: usize, mut len_of: impl FnMut(usize) -> usize) -> impl Iterator<Item = Block> {
    let mut offset = 0;
    std::iter::from_fn(move || {
        if offset >= total {
            return None;
        }
        let len = len_of(total - offset);
        let block = Block { offset, len };
        offset += len;
        Some(block)
    })
}

/// K or N chunks following [`next_chunk`]. `block` must be non-zero.
pub fn chunks(total: usize, block: usize) -> impl Iterator<Item = Block> {
    blocks(total, move |remaining| next_chunk(remaining, block))
}

/// Outer M blocks of at most `block` rows.
pub fn outer_blocks(total: usize, block: usize) -> impl Iterator<Item = Block> {
    blocks(total, move |remaining| remaining.min(block))
}

/// Sub-panels of an M block following [`row_panel_len`].
pub fn row_panels(total: usize) -> impl Iterator<Item = Block> {
    blocks(total, row_panel_len)
}
