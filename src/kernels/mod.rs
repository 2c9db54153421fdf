//! Microkernels for the inner loop of the multiplication.
//!
//! Every kernel computes one small tile of C += A × B and adds into C,
//! never overwriting it. Accumulation runs k = 0..K in order with one FMA
//! per output element per step, so geometry and instruction set change
//! speed only: any two kernels given the same operands produce the same
//! bits.
//!
//! Available kernels:
//! - `kernel_4x4`: 4×4 tile over packed panels (generic path)
//! - `kernel_4x8`: 4×8 tile over packed panels, used when the N chunk is a multiple of 8
//! - `kernel_2x2`, `kernel_2x4`: strided tiles for the small-matrix path
//!
//! Each comes as a portable function and, on x86_64, an AVX2+FMA function.
//! [`Isa`] picks between them at runtime.

pub mod kernel_2x2;
pub mod kernel_2x4;
pub mod kernel_4x4;
pub mod kernel_4x8;
mod portable;

/// Packed-panel kernel: `(a_pack, b_pack, c, k, ldc)`.
pub type KernelFn = unsafe fn(*const f64, *const f64, *mut f64, usize, usize);

/// Strided small-path kernel:
/// `(a, a_rs, a_cs, b, b_rs, b_pair, c, k, ldc)`.
///
/// `A(r, p)` is read at `a + r * a_rs + p * a_cs`; the column pair
/// `2q..2q + 2` of B row `p` is read at `b + p * b_rs + q * b_pair`.
pub type SmallKernelFn =
    unsafe fn(*const f64, usize, usize, *const f64, usize, usize, *mut f64, usize, usize);

/// Instruction set a kernel is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isa {
    /// Scalar `f64::mul_add`, available everywhere.
    Portable,
    /// 256/128-bit AVX2 with FMA3 (x86_64 only).
    Avx2Fma,
}

impl Isa {
    /// Fastest instruction set this CPU supports.
    pub fn detect() -> Self {
        if Isa::Avx2Fma.is_supported() {
            Isa::Avx2Fma
        } else {
            Isa::Portable
        }
    }

    pub fn is_supported(self) -> bool {
        match self {
            Isa::Portable => true,
            Isa::Avx2Fma => avx2_fma_available(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Isa::Portable => "portable",
            Isa::Avx2Fma => "avx2+fma",
        }
    }
}

#[cfg(target_arch = "x86_64")]
fn avx2_fma_available() -> bool {
    is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")
}

#[cfg(not(target_arch = "x86_64"))]
fn avx2_fma_available() -> bool {
    false
}

/// Tile shape of the generic packed path.
///
/// A geometry picks both the B packing width and the kernel, so a panel is
/// always consumed by the kernel it was packed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Tile4x4,
    Tile4x8,
}

impl Geometry {
    /// Widest tile whose column count divides `cols`.
    ///
    /// `cols` is an N chunk of the blocked path and is always a multiple
    /// of 4.
    pub fn for_block_cols(cols: usize) -> Self {
        if cols % 8 == 0 {
            Geometry::Tile4x8
        } else {
            Geometry::Tile4x4
        }
    }

    pub const fn rows(self) -> usize {
        4
    }

    pub const fn cols(self) -> usize {
        match self {
            Geometry::Tile4x4 => 4,
            Geometry::Tile4x8 => 8,
        }
    }

    pub fn kernel(self, isa: Isa) -> KernelFn {
        match (self, isa) {
            #[cfg(target_arch = "x86_64")]
            (Geometry::Tile4x4, Isa::Avx2Fma) => kernel_4x4::kernel_4x4_avx2 as KernelFn,
            #[cfg(target_arch = "x86_64")]
            (Geometry::Tile4x8, Isa::Avx2Fma) => kernel_4x8::kernel_4x8_avx2 as KernelFn,
            (Geometry::Tile4x4, _) => kernel_4x4::kernel_4x4_portable as KernelFn,
            (Geometry::Tile4x8, _) => kernel_4x8::kernel_4x8_portable as KernelFn,
        }
    }
}

/// Tile shape of the small-matrix path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmallGeometry {
    Tile2x2,
    Tile2x4,
}

impl SmallGeometry {
    pub const fn rows(self) -> usize {
        2
    }

    pub const fn cols(self) -> usize {
        match self {
            SmallGeometry::Tile2x2 => 2,
            SmallGeometry::Tile2x4 => 4,
        }
    }

    pub fn kernel(self, isa: Isa) -> SmallKernelFn {
        match (self, isa) {
            #[cfg(target_arch = "x86_64")]
            (SmallGeometry::Tile2x2, Isa::Avx2Fma) => kernel_2x2::kernel_2x2_avx2 as SmallKernelFn,
            #[cfg(target_arch = "x86_64")]
            (SmallGeometry::Tile2x4, Isa::Avx2Fma) => kernel_2x4::kernel_2x4_avx2 as SmallKernelFn,
            (SmallGeometry::Tile2x2, _) => kernel_2x2::kernel_2x2_portable as SmallKernelFn,
            (SmallGeometry::Tile2x4, _) => kernel_2x4::kernel_2x4_portable as SmallKernelFn,
        }
    }
}
