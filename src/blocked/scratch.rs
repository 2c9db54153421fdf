//! Reusable packing arena.

use crate::config::BlockConfig;
use crate::error::{GemmError, Result};

/// Buffer the packed panels are written into.
///
/// The A region comes first, the B region right after it. Contents are
/// overwritten by every block and mean nothing between calls, so one
/// arena can serve any number of sequential multiplications. Concurrent
/// callers each need their own: a call borrows the arena mutably.
#[derive(Debug)]
pub struct Scratch {
    buf: Vec<f64>,
}

impl Scratch {
    /// Allocate `len` elements, reporting failure instead of aborting.
    pub fn new(len: usize) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| GemmError::Allocation { elements: len })?;
        buf.resize(len, 0.0);
        Ok(Self { buf })
    }

    /// Arena big enough for the blocked path run with `config`.
    ///
    /// The small ladder of an engine packs with its own constants; size an
    /// arena for every path of an engine with [`Gemm::scratch`].
    ///
    /// [`Gemm::scratch`]: crate::Gemm::scratch
    pub fn for_config(config: &BlockConfig) -> Result<Self> {
        Self::new(config.scratch_len())
    }

    /// Usable length in elements.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Split off an A region of `a_len` and a B region of `b_len`.
    pub(crate) fn panels(&mut self, a_len: usize, b_len: usize) -> Result<(&mut [f64], &mut [f64])> {
        let needed = a_len + b_len;
        if needed > self.buf.len() {
            return Err(GemmError::ScratchTooSmall {
                needed,
                capacity: self.buf.len(),
            });
        }
        let (a, rest) = self.buf.split_at_mut(a_len);
        Ok((a, &mut rest[..b_len]))
    }
}
