//! MultiBlockConnectivity: a ragged table partitioned into uniform blocks.
//!
//! Meshes mixing element shapes store all elements in one ragged table while
//! keeping a dense 2D view per shape (all triangles, then all quads, ...).
//! Each `add_*` call appends one block; `insert_*` grows an existing block in
//! place. Block descriptors are plain (starting row, column count) pairs, so
//! a [`BlockView`] is recomputed from displacement arithmetic on the value
//! arena after every mutation rather than stored.

use crate::debug_invariants::DebugInvariants;
use crate::remap_error::MeshRemapError;

use super::block::{BlockConnectivity, BlockView};
use super::irregular::{ConnectivityObserver, IrregularConnectivity};
use super::Idx;

/// Ragged connectivity with uniform-column-count block bookkeeping.
#[derive(Debug)]
pub struct MultiBlockConnectivity {
    conn: IrregularConnectivity,
    /// Starting row of each block, `blocks + 1` entries; the last entry is
    /// the total row count.
    block_displs: Vec<usize>,
    /// Column count of each block, `blocks` entries.
    block_cols: Vec<usize>,
}

impl MultiBlockConnectivity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            conn: IrregularConnectivity::new(name),
            block_displs: vec![0],
            block_cols: Vec::new(),
        }
    }

    /// The underlying ragged table (read-only).
    #[inline]
    pub fn as_irregular(&self) -> &IrregularConnectivity {
        &self.conn
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.conn.name()
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.conn.rows()
    }

    #[inline]
    pub fn cols(&self, row: usize) -> usize {
        self.conn.cols(row)
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[Idx] {
        self.conn.row(row)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Idx {
        self.conn.get(row, col)
    }

    #[inline]
    pub fn missing_value(&self) -> Idx {
        self.conn.missing_value()
    }

    #[inline]
    pub fn blocks(&self) -> usize {
        self.block_cols.len()
    }

    /// Dense view of block `b`.
    ///
    /// # Panics
    /// Panics if `b >= blocks()`.
    pub fn block(&self, b: usize) -> BlockView<'_> {
        self.try_block(b).expect("block index out of bounds")
    }

    pub fn try_block(&self, b: usize) -> Result<BlockView<'_>, MeshRemapError> {
        if b >= self.blocks() {
            return Err(MeshRemapError::BlockOutOfBounds {
                block: b,
                blocks: self.blocks(),
            });
        }
        let row0 = self.block_displs[b];
        let nrows = self.block_displs[b + 1] - row0;
        let cols = self.block_cols[b];
        let start = if nrows == 0 {
            0
        } else {
            self.conn.displs()[row0] as usize
        };
        Ok(BlockView::new(
            &self.conn.values()[start..start + nrows * cols],
            nrows,
            cols,
        ))
    }

    /// Append one block of `rows` rows with `cols` missing-value entries.
    pub fn add_uniform(&mut self, rows: usize, cols: usize) -> Result<(), MeshRemapError> {
        self.conn.add_uniform(rows, cols)?;
        self.push_block(rows, cols);
        self.rebuild_block_connectivity();
        Ok(())
    }

    /// Append one block of `rows` rows copied from `values`.
    pub fn add_values(
        &mut self,
        rows: usize,
        cols: usize,
        values: &[Idx],
    ) -> Result<(), MeshRemapError> {
        self.conn.add_values(rows, cols, values)?;
        self.push_block(rows, cols);
        self.rebuild_block_connectivity();
        Ok(())
    }

    /// Append a dense block.
    pub fn add_block(&mut self, block: &BlockConnectivity) -> Result<(), MeshRemapError> {
        self.add_values(block.rows(), block.cols(), block.values())
    }

    /// Append one block with per-row column counts, which must all be equal.
    pub fn add_ragged(&mut self, cols_per_row: &[usize]) -> Result<(), MeshRemapError> {
        let cols = Self::uniform_cols(cols_per_row)?;
        self.conn.add_ragged(cols_per_row)?;
        self.push_block(cols_per_row.len(), cols);
        self.rebuild_block_connectivity();
        Ok(())
    }

    /// Splice `rows` missing-value rows before row `position`.
    ///
    /// The insertion must land in a block whose column count matches `cols`.
    pub fn insert_uniform(
        &mut self,
        position: usize,
        rows: usize,
        cols: usize,
    ) -> Result<(), MeshRemapError> {
        if self.rows() == 0 {
            return self.add_uniform(rows, cols);
        }
        let blk = self.compatible_block(position, cols)?;
        self.conn.insert_uniform(position, rows, cols)?;
        self.widen_block(blk, rows);
        self.rebuild_block_connectivity();
        Ok(())
    }

    /// Splice `rows` rows copied from `values` before row `position`.
    pub fn insert_values(
        &mut self,
        position: usize,
        rows: usize,
        cols: usize,
        values: &[Idx],
    ) -> Result<(), MeshRemapError> {
        if self.rows() == 0 {
            return self.add_values(rows, cols, values);
        }
        let blk = self.compatible_block(position, cols)?;
        self.conn.insert_values(position, rows, cols, values)?;
        self.widen_block(blk, rows);
        self.rebuild_block_connectivity();
        Ok(())
    }

    /// Splice rows with per-row column counts, which must all be equal.
    pub fn insert_ragged(
        &mut self,
        position: usize,
        cols_per_row: &[usize],
    ) -> Result<(), MeshRemapError> {
        let cols = Self::uniform_cols(cols_per_row)?;
        if self.rows() == 0 {
            return self.add_ragged(cols_per_row);
        }
        let blk = self.compatible_block(position, cols)?;
        self.conn.insert_ragged(position, cols_per_row)?;
        self.widen_block(blk, cols_per_row.len());
        self.rebuild_block_connectivity();
        Ok(())
    }

    /// Reset to zero rows and zero blocks.
    pub fn clear(&mut self) {
        self.conn.clear();
        self.block_displs = vec![0];
        self.block_cols = Vec::new();
    }

    pub fn register_observer(&mut self, observer: Box<dyn ConnectivityObserver>) {
        self.conn.register_observer(observer);
    }

    pub fn clone_to_device(&mut self) {
        self.conn.clone_to_device();
    }

    pub fn clone_from_device(&mut self) {
        self.conn.clone_from_device();
    }

    pub fn sync_host_device(&mut self) {
        self.conn.sync_host_device();
    }

    pub fn valid(&self) -> bool {
        self.conn.valid()
    }

    pub fn host_needs_update(&self) -> bool {
        self.conn.host_needs_update()
    }

    pub fn device_needs_update(&self) -> bool {
        self.conn.device_needs_update()
    }

    fn uniform_cols(cols_per_row: &[usize]) -> Result<usize, MeshRemapError> {
        let first = cols_per_row.first().copied().unwrap_or(0);
        if cols_per_row.iter().any(|&c| c != first) {
            return Err(MeshRemapError::NonUniformColumns);
        }
        Ok(first)
    }

    fn push_block(&mut self, rows: usize, cols: usize) {
        let end = self.block_displs.last().copied().unwrap_or(0) + rows;
        self.block_displs.push(end);
        self.block_cols.push(cols);
    }

    /// Last block whose row range can absorb an insertion of `cols`-column
    /// rows at `position`.
    fn compatible_block(&self, position: usize, cols: usize) -> Result<usize, MeshRemapError> {
        (0..self.blocks())
            .rev()
            .find(|&b| {
                self.block_displs[b] <= position
                    && position <= self.block_displs[b + 1]
                    && self.block_cols[b] == cols
            })
            .ok_or(MeshRemapError::IncompatibleBlockInsert { position, cols })
    }

    fn widen_block(&mut self, blk: usize, rows: usize) {
        for end in &mut self.block_displs[blk + 1..] {
            *end += rows;
        }
    }

    /// Re-slice block bookkeeping after a structural mutation.
    ///
    /// Views are computed on demand from `block_displs`/`block_cols`, so the
    /// rebuild reduces to checking that the descriptors still tile the table.
    fn rebuild_block_connectivity(&mut self) {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
    }
}

impl DebugInvariants for MultiBlockConnectivity {
    fn debug_assert_invariants(&self) {
        crate::debug_assert_ok!(self.validate_invariants(), "MultiBlockConnectivity invalid");
    }

    fn validate_invariants(&self) -> Result<(), MeshRemapError> {
        self.conn.validate_invariants()?;
        if self.block_displs.len() != self.block_cols.len() + 1 || self.block_displs[0] != 0 {
            return Err(MeshRemapError::ShapeMismatch {
                axis: 0,
                expected: self.block_cols.len() + 1,
                found: self.block_displs.len(),
            });
        }
        let last = *self.block_displs.last().expect("non-empty displs");
        if last != self.rows() {
            return Err(MeshRemapError::ShapeMismatch {
                axis: 0,
                expected: self.rows(),
                found: last,
            });
        }
        for b in 0..self.blocks() {
            if self.block_displs[b] > self.block_displs[b + 1] {
                return Err(MeshRemapError::ShapeMismatch {
                    axis: 0,
                    expected: self.block_displs[b],
                    found: self.block_displs[b + 1],
                });
            }
            for r in self.block_displs[b]..self.block_displs[b + 1] {
                if self.cols(r) != self.block_cols[b] {
                    return Err(MeshRemapError::ShapeMismatch {
                        axis: 1,
                        expected: self.block_cols[b],
                        found: self.cols(r),
                    });
                }
            }
        }
        Ok(())
    }
}
