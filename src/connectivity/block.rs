//! Dense rows×cols connectivity blocks.
//!
//! [`BlockConnectivity`] owns its storage and grows by whole rows of one
//! fixed column count. [`BlockView`] is the non-owning counterpart handed out
//! by [`MultiBlockConnectivity`](super::MultiBlockConnectivity): a slice of
//! the parent's value arena plus shape arithmetic, never a copy.

use crate::remap_error::MeshRemapError;

use super::Idx;

/// Owned dense table where every row has the same column count.
#[derive(Debug, Clone, Default)]
pub struct BlockConnectivity {
    values: Vec<Idx>,
    rows: usize,
    cols: usize,
    missing_value: Idx,
}

impl BlockConnectivity {
    /// Empty block; the column count is fixed by the first `add`.
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            rows: 0,
            cols: 0,
            missing_value: -1,
        }
    }

    /// Dense block from a row-major value buffer.
    pub fn from_values(rows: usize, cols: usize, values: Vec<Idx>) -> Result<Self, MeshRemapError> {
        if values.len() != rows * cols {
            return Err(MeshRemapError::ValuesLengthMismatch {
                expected: rows * cols,
                found: values.len(),
            });
        }
        Ok(Self {
            values,
            rows,
            cols,
            missing_value: -1,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn missing_value(&self) -> Idx {
        self.missing_value
    }

    /// Row-major flat buffer.
    #[inline]
    pub fn values(&self) -> &[Idx] {
        &self.values
    }

    /// Entry `(row, col)`.
    ///
    /// # Panics
    /// Panics if the indices are out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Idx {
        debug_assert!(row < self.rows && col < self.cols);
        self.values[row * self.cols + col]
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[Idx] {
        &self.values[row * self.cols..(row + 1) * self.cols]
    }

    /// Append `rows` rows copied from `values`.
    ///
    /// The column count must match the block's, unless the block is still
    /// empty (in which case it is adopted).
    pub fn add(&mut self, rows: usize, cols: usize, values: &[Idx]) -> Result<(), MeshRemapError> {
        if self.cols != 0 && self.cols != cols {
            return Err(MeshRemapError::BlockColsMismatch {
                expected: self.cols,
                found: cols,
            });
        }
        if values.len() != rows * cols {
            return Err(MeshRemapError::ValuesLengthMismatch {
                expected: rows * cols,
                found: values.len(),
            });
        }
        self.values.extend_from_slice(values);
        self.rows += rows;
        self.cols = cols;
        Ok(())
    }
}

/// Non-owning dense view over a contiguous row range of a value arena.
#[derive(Debug, Clone, Copy)]
pub struct BlockView<'a> {
    values: &'a [Idx],
    rows: usize,
    cols: usize,
}

impl<'a> BlockView<'a> {
    pub(crate) fn new(values: &'a [Idx], rows: usize, cols: usize) -> Self {
        debug_assert_eq!(values.len(), rows * cols);
        Self { values, rows, cols }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn values(&self) -> &'a [Idx] {
        self.values
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Idx {
        debug_assert!(row < self.rows && col < self.cols);
        self.values[row * self.cols + col]
    }

    #[inline]
    pub fn row(&self, row: usize) -> &'a [Idx] {
        &self.values[row * self.cols..(row + 1) * self.cols]
    }

    /// Copy the viewed rows into an owned block.
    pub fn to_owned_block(&self) -> BlockConnectivity {
        BlockConnectivity::from_values(self.rows, self.cols, self.values.to_vec())
            .expect("view shape is consistent")
    }
}
