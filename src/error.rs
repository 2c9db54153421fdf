//! Error types for GEMM calls.

use thiserror::Error;

/// Errors a GEMM call can report.
///
/// Every variant is raised before C is touched, so a failed call leaves
/// the output exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GemmError {
    /// Leading dimension shorter than the logical column count.
    #[error("leading dimension {ld} is smaller than column count {cols}")]
    InvalidLeadingDimension { ld: usize, cols: usize },

    /// Backing slice cannot hold the described view.
    #[error("buffer holds {len} elements but the view needs {needed}")]
    BufferTooSmall { needed: usize, len: usize },

    /// `rows`, `cols` and `ld` describe more elements than `usize` can address.
    #[error("a {rows}x{cols} view with leading dimension {ld} overflows the address space")]
    ShapeOverflow { rows: usize, cols: usize, ld: usize },

    /// Operand shapes do not agree.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Block constants or small-path thresholds are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Caller-supplied scratch arena is smaller than the call requires.
    #[error("scratch arena holds {capacity} elements but {needed} are required")]
    ScratchTooSmall { needed: usize, capacity: usize },

    /// Scratch or temporary buffer could not be allocated.
    #[error("failed to allocate {elements} f64 elements")]
    Allocation { elements: usize },

    /// A forced instruction set is not available on this CPU.
    #[error("instruction set not supported on this CPU: {0}")]
    UnsupportedIsa(&'static str),
}

/// Result type for GEMM calls.
pub type Result<T> = std::result::Result<T, GemmError>;
