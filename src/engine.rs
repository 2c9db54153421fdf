//! The `Gemm` engine: validation, path selection and scratch ownership.

use tracing::debug;

use crate::blocked::{BOperand, Scratch, blocked_scratch_len, gemm_blocked};
use crate::config::{BlockConfig, SmallPolicy};
use crate::error::{GemmError, Result};
use crate::kernels::Isa;
use crate::matrix::{MatMut, MatRef};
use crate::small::{gemm_direct, gemm_light_pack, light_pack_scratch_len};

/// A configured multiplier.
///
/// Holds only constants, so one engine can be shared across threads; the
/// mutable state of a call lives in the [`Scratch`] passed to it (or one
/// the engine allocates for that call).
///
/// ```
/// use dgemm::{Gemm, MatMut, MatRef};
///
/// let a = [1.0, 2.0, 3.0, 4.0];
/// let b = [5.0, 6.0, 7.0, 8.0];
/// let mut c = [0.0; 4];
///
/// let engine = Gemm::default();
/// let mut c_view = MatMut::dense(&mut c, 2, 2).unwrap();
/// engine
///     .gemm(MatRef::dense(&a, 2, 2).unwrap(), MatRef::dense(&b, 2, 2).unwrap(), &mut c_view, None)
///     .unwrap();
///
/// assert_eq!(c, [19.0, 22.0, 43.0, 50.0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Gemm {
    config: BlockConfig,
    small: SmallPolicy,
    isa: Isa,
}

impl Default for Gemm {
    fn default() -> Self {
        Self {
            config: BlockConfig::default(),
            small: SmallPolicy::default(),
            isa: Isa::detect(),
        }
    }
}

/// Which rung of the ladder a call takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Path {
    Direct,
    LightPack,
    Blocked(BlockConfig),
}

impl Gemm {
    pub fn new(config: BlockConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn with_small_policy(mut self, policy: SmallPolicy) -> Result<Self> {
        policy.validate()?;
        self.small = policy;
        Ok(self)
    }

    /// Force an instruction set instead of the detected one.
    pub fn with_isa(mut self, isa: Isa) -> Result<Self> {
        if !isa.is_supported() {
            return Err(GemmError::UnsupportedIsa(isa.name()));
        }
        self.isa = isa;
        Ok(self)
    }

    pub fn config(&self) -> &BlockConfig {
        &self.config
    }

    pub fn small_policy(&self) -> &SmallPolicy {
        &self.small
    }

    pub fn isa(&self) -> Isa {
        self.isa
    }

    /// Scratch length that serves every call this engine can make: the
    /// main blocks, the compact blocks and the light-pack panels.
    pub fn scratch_len(&self) -> usize {
        self.config
            .scratch_len()
            .max(self.small.compact.scratch_len())
            .max(self.small.light_pack_scratch_len())
    }

    /// Allocate an arena of [`Gemm::scratch_len`] elements.
    pub fn scratch(&self) -> Result<Scratch> {
        Scratch::new(self.scratch_len())
    }

    /// C += A · B. Picks the small ladder or the blocked path by size.
    ///
    /// Without `scratch` the engine allocates exactly what the call needs.
    pub fn gemm(
        &self,
        a: MatRef<'_>,
        b: MatRef<'_>,
        c: &mut MatMut<'_>,
        scratch: Option<&mut Scratch>,
    ) -> Result<()> {
        check_product(&a, &BOperand::RowMajor(b), c)?;
        let (m, n, k) = (a.rows(), b.cols(), a.cols());
        let path = if m.max(n).max(k) <= self.small.compact_max {
            self.small_path(m, n, k)
        } else {
            Path::Blocked(self.config)
        };
        self.run(path, a, b, c, scratch)
    }

    /// C += A · B, always over the blocked path with the main configuration.
    pub fn gemm_blocked(
        &self,
        a: MatRef<'_>,
        b: MatRef<'_>,
        c: &mut MatMut<'_>,
        scratch: Option<&mut Scratch>,
    ) -> Result<()> {
        check_product(&a, &BOperand::RowMajor(b), c)?;
        self.run(Path::Blocked(self.config), a, b, c, scratch)
    }

    /// C += A · B, always through the small ladder.
    ///
    /// Problems beyond the light-pack threshold run blocked with the
    /// compact constants, however large they are.
    pub fn gemm_small(
        &self,
        a: MatRef<'_>,
        b: MatRef<'_>,
        c: &mut MatMut<'_>,
        scratch: Option<&mut Scratch>,
    ) -> Result<()> {
        check_product(&a, &BOperand::RowMajor(b), c)?;
        let path = self.small_path(a.rows(), b.cols(), a.cols());
        self.run(path, a, b, c, scratch)
    }

    /// C += A · Bᵗ where `bt` stores Bᵗ as n × k.
    pub fn gemm_abt(
        &self,
        a: MatRef<'_>,
        bt: MatRef<'_>,
        c: &mut MatMut<'_>,
        scratch: Option<&mut Scratch>,
    ) -> Result<()> {
        let b = BOperand::Transposed(bt);
        check_product(&a, &b, c)?;
        let (m, n, k) = (a.rows(), bt.rows(), a.cols());
        if m == 0 || n == 0 || k == 0 {
            return Ok(());
        }

        let config = if m.max(n).max(k) <= self.small.compact_max {
            self.small.compact
        } else {
            self.config
        };
        debug!(m, n, k, isa = self.isa.name(), "gemm_abt: blocked");
        with_scratch(scratch, blocked_scratch_len(&config, m, n, k), |s| {
            gemm_blocked(&config, self.isa, a, b, c, s)
        })
    }

    /// C += A · B · Aᵗ with A m × k, B k × k and C m × m.
    ///
    /// T = A · B is formed in a temporary first; C is not touched if that
    /// allocation fails.
    pub fn gemm_abat(
        &self,
        a: MatRef<'_>,
        b: MatRef<'_>,
        c: &mut MatMut<'_>,
        mut scratch: Option<&mut Scratch>,
    ) -> Result<()> {
        let (m, k) = (a.rows(), a.cols());
        if b.rows() != k || b.cols() != k {
            return Err(GemmError::DimensionMismatch(format!(
                "B is {}x{}, expected {k}x{k} for A of {m}x{k}",
                b.rows(),
                b.cols()
            )));
        }
        if c.rows() != m || c.cols() != m {
            return Err(GemmError::DimensionMismatch(format!(
                "C is {}x{}, expected {m}x{m}",
                c.rows(),
                c.cols()
            )));
        }
        if m == 0 || k == 0 {
            return Ok(());
        }

        let mut t = Vec::new();
        t.try_reserve_exact(m * k)
            .map_err(|_| GemmError::Allocation { elements: m * k })?;
        t.resize(m * k, 0.0);

        let mut t_view = MatMut::dense(&mut t, m, k)?;
        self.gemm(a, b, &mut t_view, scratch.as_deref_mut())?;
        self.gemm_abt(t_view.rb(), a, c, scratch)
    }

    fn small_path(&self, m: usize, n: usize, k: usize) -> Path {
        let extent = m.max(n).max(k);
        if extent <= self.small.direct_max {
            Path::Direct
        } else if extent <= self.small.light_pack_max {
            Path::LightPack
        } else {
            Path::Blocked(self.small.compact)
        }
    }

    fn run(
        &self,
        path: Path,
        a: MatRef<'_>,
        b: MatRef<'_>,
        c: &mut MatMut<'_>,
        scratch: Option<&mut Scratch>,
    ) -> Result<()> {
        let (m, n, k) = (a.rows(), b.cols(), a.cols());
        if m == 0 || n == 0 || k == 0 {
            debug!(m, n, k, "gemm: empty product");
            return Ok(());
        }
        debug!(m, n, k, ?path, isa = self.isa.name(), "gemm");

        match path {
            Path::Direct => {
                gemm_direct(self.isa, a, b, c);
                Ok(())
            }
            Path::LightPack => with_scratch(scratch, light_pack_scratch_len(m, n, k), |s| {
                gemm_light_pack(self.isa, a, b, c, s)
            }),
            Path::Blocked(config) => with_scratch(scratch, blocked_scratch_len(&config, m, n, k), |s| {
                gemm_blocked(&config, self.isa, a, BOperand::RowMajor(b), c, s)
            }),
        }
    }
}

/// Run `f` on the caller's arena, or on a fresh one of `needed` elements.
fn with_scratch<F>(scratch: Option<&mut Scratch>, needed: usize, f: F) -> Result<()>
where
    F: FnOnce(&mut Scratch) -> Result<()>,
{
    match scratch {
        Some(scratch) => f(scratch),
        None => {
            let mut owned = Scratch::new(needed)?;
            f(&mut owned)
        }
    }
}

fn check_product(a: &MatRef<'_>, b: &BOperand<'_>, c: &MatMut<'_>) -> Result<()> {
    if a.cols() != b.depth() {
        return Err(GemmError::DimensionMismatch(format!(
            "A has {} columns but B has {} rows",
            a.cols(),
            b.depth()
        )));
    }
    if c.rows() != a.rows() || c.cols() != b.cols() {
        return Err(GemmError::DimensionMismatch(format!(
            "C is {}x{}, expected {}x{}",
            c.rows(),
            c.cols(),
            a.rows(),
            b.cols()
        )));
    }
    Ok(())
}
