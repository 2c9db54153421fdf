//! Block-size and small-path configuration.
//!
//! The defaults are the constant table the engine was tuned with on an
//! ARMv8 part with 32 KiB L1d and 2 MiB L2, halved from the single
//! precision values because every element is twice as wide:
//!
//! | constant  | default | cache target                          |
//! |-----------|---------|---------------------------------------|
//! | `m_block` | 2048    | A block kept in L2 across N chunks    |
//! | `k_block` | 128     | one K panel of A and B fits L1        |
//! | `n_block` | 256     | packed B panel reused by all M panels |
//!
//! Every constant must be a non-zero multiple of [`UNROLL`]. They are
//! empirical; revalidate them per target.

use crate::error::{GemmError, Result};

/// Row tile of the generic kernels, and the rounding unit of every block.
pub const UNROLL: usize = 4;

/// Cache blocking constants for the generic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockConfig {
    /// Rows of A kept packed per outer block.
    pub m_block: usize,
    /// Depth of one K panel.
    pub k_block: usize,
    /// Columns of B packed per N chunk.
    pub n_block: usize,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            m_block: 2048,
            k_block: 128,
            n_block: 256,
        }
    }
}

impl BlockConfig {
    /// Build a configuration, rejecting unusable constants.
    pub fn new(m_block: usize, k_block: usize, n_block: usize) -> Result<Self> {
        let config = Self {
            m_block,
            k_block,
            n_block,
        };
        config.validate()?;
        Ok(config)
    }

    /// Constants used by the small path once a problem outgrows the
    /// light-pack threshold.
    pub fn compact() -> Self {
        Self {
            m_block: 64,
            k_block: 64,
            n_block: 64,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("m_block", self.m_block),
            ("k_block", self.k_block),
            ("n_block", self.n_block),
        ] {
            if value == 0 || value % UNROLL != 0 {
                return Err(GemmError::InvalidConfig(format!(
                    "{name} = {value} must be a non-zero multiple of {UNROLL}"
                )));
            }
        }
        Ok(())
    }

    /// Minimum scratch length for this configuration:
    /// `m_block * k_block + k_block * n_block` elements.
    pub fn scratch_len(&self) -> usize {
        self.m_block * self.k_block + self.k_block * self.n_block
    }
}

/// Size thresholds of the small-matrix ladder.
///
/// A problem whose three extents are all `<= direct_max` runs unpacked,
/// `<= light_pack_max` runs on 2-wide panels, `<= compact_max` runs the
/// blocked path with `compact` constants. Anything larger takes the main
/// [`BlockConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmallPolicy {
    pub direct_max: usize,
    pub light_pack_max: usize,
    pub compact_max: usize,
    pub compact: BlockConfig,
}

impl Default for SmallPolicy {
    fn default() -> Self {
        Self {
            direct_max: 16,
            light_pack_max: 32,
            compact_max: 64,
            compact: BlockConfig::compact(),
        }
    }
}

impl SmallPolicy {
    /// A policy that never takes the small ladder.
    pub fn disabled() -> Self {
        Self {
            direct_max: 0,
            light_pack_max: 0,
            compact_max: 0,
            compact: BlockConfig::compact(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.direct_max > self.light_pack_max || self.light_pack_max > self.compact_max {
            return Err(GemmError::InvalidConfig(format!(
                "small thresholds must be ordered: direct {} <= light pack {} <= compact {}",
                self.direct_max, self.light_pack_max, self.compact_max
            )));
        }
        self.compact.validate()
    }

    /// Scratch needed by the light-pack rung: both operands packed whole.
    pub fn light_pack_scratch_len(&self) -> usize {
        2 * self.light_pack_max * self.light_pack_max
    }
}
