//! Strided row-major matrix views.
//!
//! A view is a slice plus `rows`, `cols` and a leading dimension `ld`
//! (distance between row starts). `ld > cols` describes a sub-matrix of a
//! wider buffer, so the engine works on sub-matrices without copying.

use crate::error::{GemmError, Result};

/// Elements a slice must hold for a `rows × cols` view with stride `ld`.
///
/// `None` when the extent does not fit in `usize`.
pub fn required_len(rows: usize, cols: usize, ld: usize) -> Option<usize> {
    if rows == 0 || cols == 0 {
        Some(0)
    } else {
        (rows - 1).checked_mul(ld)?.checked_add(cols)
    }
}

fn check_shape(len: usize, rows: usize, cols: usize, ld: usize) -> Result<()> {
    if ld < cols {
        return Err(GemmError::InvalidLeadingDimension { ld, cols });
    }
    // every in-view offset i * ld + j is at most `needed`, so indexing
    // a validated view cannot overflow
    let needed = required_len(rows, cols, ld).ok_or(GemmError::ShapeOverflow { rows, cols, ld })?;
    if len < needed {
        return Err(GemmError::BufferTooSmall { needed, len });
    }
    Ok(())
}

fn check_window(
    parent: (usize, usize),
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
) -> Result<()> {
    if row + rows > parent.0 || col + cols > parent.1 {
        return Err(GemmError::DimensionMismatch(format!(
            "window {}x{} at ({}, {}) exceeds {}x{} view",
            rows, cols, row, col, parent.0, parent.1
        )));
    }
    Ok(())
}

/// Read-only matrix view.
#[derive(Debug, Clone, Copy)]
pub struct MatRef<'a> {
    data: &'a [f64],
    rows: usize,
    cols: usize,
    ld: usize,
}

impl<'a> MatRef<'a> {
    pub fn new(data: &'a [f64], rows: usize, cols: usize, ld: usize) -> Result<Self> {
        check_shape(data.len(), rows, cols, ld)?;
        Ok(Self {
            data,
            rows,
            cols,
            ld,
        })
    }

    /// Dense view (`ld == cols`).
    pub fn dense(data: &'a [f64], rows: usize, cols: usize) -> Result<Self> {
        Self::new(data, rows, cols, cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn ld(&self) -> usize {
        self.ld
    }

    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[i * self.ld + j]
    }

    /// Logical elements of row `i`.
    #[inline]
    pub fn row(&self, i: usize) -> &'a [f64] {
        let data: &'a [f64] = self.data;
        if self.cols == 0 {
            return &[];
        }
        let start = i * self.ld;
        &data[start..start + self.cols]
    }

    /// `rows × cols` window starting at (`row`, `col`), sharing the buffer.
    pub fn submatrix(&self, row: usize, col: usize, rows: usize, cols: usize) -> Result<MatRef<'a>> {
        check_window((self.rows, self.cols), row, col, rows, cols)?;
        let data: &'a [f64] = self.data;
        let offset = (row * self.ld + col).min(data.len());
        MatRef::new(&data[offset..], rows, cols, self.ld)
    }

    /// Pointer to element (`i`, `j`). Caller keeps reads inside the view.
    #[inline]
    pub(crate) fn ptr_at(&self, i: usize, j: usize) -> *const f64 {
        debug_assert!(i * self.ld + j < self.data.len());
        // SAFETY: the offset is inside `data` for any element of the view
        unsafe { self.data.as_ptr().add(i * self.ld + j) }
    }
}

/// Mutable matrix view. The output operand of every GEMM call.
#[derive(Debug)]
pub struct MatMut<'a> {
    data: &'a mut [f64],
    rows: usize,
    cols: usize,
    ld: usize,
}

impl<'a> MatMut<'a> {
    pub fn new(data: &'a mut [f64], rows: usize, cols: usize, ld: usize) -> Result<Self> {
        check_shape(data.len(), rows, cols, ld)?;
        Ok(Self {
            data,
            rows,
            cols,
            ld,
        })
    }

    pub fn dense(data: &'a mut [f64], rows: usize, cols: usize) -> Result<Self> {
        Self::new(data, rows, cols, cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn ld(&self) -> usize {
        self.ld
    }

    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[i * self.ld + j]
    }

    #[inline]
    pub fn at_mut(&mut self, i: usize, j: usize) -> &mut f64 {
        debug_assert!(i < self.rows && j < self.cols);
        &mut self.data[i * self.ld + j]
    }

    /// Read-only view of the same elements.
    pub fn rb(&self) -> MatRef<'_> {
        MatRef {
            data: &*self.data,
            rows: self.rows,
            cols: self.cols,
            ld: self.ld,
        }
    }

    /// Splits into rows `0..mid` and `mid..rows`.
    ///
    /// The halves borrow disjoint memory, so they can be handed to
    /// different threads.
    pub fn split_rows_at(self, mid: usize) -> Result<(MatMut<'a>, MatMut<'a>)> {
        check_window((self.rows, self.cols), 0, 0, mid, self.cols)?;
        let MatMut {
            data,
            rows,
            cols,
            ld,
        } = self;
        let at = (mid * ld).min(data.len());
        let (top, bottom) = data.split_at_mut(at);
        Ok((
            MatMut {
                data: top,
                rows: mid,
                cols,
                ld,
            },
            MatMut {
                data: bottom,
                rows: rows - mid,
                cols,
                ld,
            },
        ))
    }

    /// Mutable `rows × cols` window starting at (`row`, `col`).
    pub fn submatrix_mut(
        self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> Result<MatMut<'a>> {
        check_window((self.rows, self.cols), row, col, rows, cols)?;
        let MatMut { data, ld, .. } = self;
        let offset = (row * ld + col).min(data.len());
        MatMut::new(&mut data[offset..], rows, cols, ld)
    }

    /// Pointer to element (`i`, `j`). Caller keeps accesses inside the view.
    #[inline]
    pub(crate) fn ptr_at_mut(&mut self, i: usize, j: usize) -> *mut f64 {
        debug_assert!(i * self.ld + j < self.data.len());
        // SAFETY: the offset is inside `data` for any element of the view
        unsafe { self.data.as_mut_ptr().add(i * self.ld + j) }
    }
}
