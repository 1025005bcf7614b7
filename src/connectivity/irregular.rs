//! IrregularConnectivity: a CSR-like ragged element→node table.
//!
//! Row `r` has `counts[r]` entries starting at `displs[r]` in the flat
//! `values` buffer. The three parallel buffers are [`Array`]s so the table
//! participates in the host/device residency contract. A table either owns
//! its buffers (and may be grown, spliced and cleared) or wraps caller-built
//! ones read-only; structural mutation of a wrapped table fails with
//! [`MeshRemapError::NotOwned`].
//!
//! # Invariants
//!
//! - `displs[0] == 0` and `displs` is monotonically non-decreasing.
//! - `displs[r + 1] == displs[r] + counts[r]` for every valid row.
//! - `values.len() >= displs[rows]`.
//!
//! These are checked after mutations in debug builds and when the
//! `check-invariants` feature is enabled, and can be verified manually via
//! [`validate_invariants`](DebugInvariants::validate_invariants).

use crate::data::Array;
use crate::debug_invariants::DebugInvariants;
use crate::remap_error::MeshRemapError;

use super::block::BlockConnectivity;
use super::Idx;

/// Observer notified whenever a connectivity is structurally mutated or is
/// about to be destroyed. Used to keep external views (e.g. foreign-language
/// bindings holding raw pointers into the buffers) in sync.
pub trait ConnectivityObserver: Send {
    /// Called after every structural mutation.
    fn on_update(&mut self);
    /// Called once when the connectivity is dropped.
    fn on_delete(&mut self) {}
}

/// Ragged table of non-negative node/edge/cell indices.
pub struct IrregularConnectivity {
    name: String,
    /// Flat entry buffer; row `r` occupies `displs[r] .. displs[r] + counts[r]`.
    values: Array<Idx>,
    /// Row start offsets, `rows + 1` entries.
    displs: Array<Idx>,
    /// Row lengths, `rows` entries.
    counts: Array<Idx>,
    rows: usize,
    maxcols: usize,
    mincols: usize,
    missing_value: Idx,
    owns: bool,
    observers: Vec<Box<dyn ConnectivityObserver>>,
}

impl std::fmt::Debug for IrregularConnectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IrregularConnectivity")
            .field("name", &self.name)
            .field("rows", &self.rows)
            .field("maxcols", &self.maxcols)
            .field("mincols", &self.mincols)
            .field("owns", &self.owns)
            .finish()
    }
}

impl IrregularConnectivity {
    /// New owning table with zero rows.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Array::from(Vec::new()),
            displs: Array::from(vec![0]),
            counts: Array::from(Vec::new()),
            rows: 0,
            maxcols: 0,
            mincols: usize::MAX,
            missing_value: -1,
            owns: true,
            observers: Vec::new(),
        }
    }

    /// Adopt caller-built buffers as a read-only table.
    ///
    /// `displs` must have `counts.len() + 1` monotone entries starting at 0
    /// and `values` must cover `displs` last offset. The resulting table
    /// rejects every structural mutation with [`MeshRemapError::NotOwned`].
    pub fn wrap(
        name: impl Into<String>,
        values: Vec<Idx>,
        displs: Vec<Idx>,
        counts: Vec<Idx>,
    ) -> Result<Self, MeshRemapError> {
        let rows = counts.len();
        let mut maxcols = 0usize;
        let mut mincols = usize::MAX;
        for &c in &counts {
            maxcols = maxcols.max(c as usize);
            mincols = mincols.min(c as usize);
        }
        let conn = Self {
            name: name.into(),
            values: Array::from(values),
            displs: Array::from(displs),
            counts: Array::from(counts),
            rows,
            maxcols,
            mincols,
            missing_value: -1,
            owns: false,
            observers: Vec::new(),
        };
        conn.validate_invariants()?;
        Ok(conn)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count of `row`.
    ///
    /// # Panics
    /// Panics if `row >= rows()`.
    #[inline]
    pub fn cols(&self, row: usize) -> usize {
        self.counts.as_slice()[row] as usize
    }

    /// Entries of `row` as a slice.
    ///
    /// # Panics
    /// Panics if `row >= rows()`.
    #[inline]
    pub fn row(&self, row: usize) -> &[Idx] {
        let start = self.displs.as_slice()[row] as usize;
        let len = self.counts.as_slice()[row] as usize;
        &self.values.as_slice()[start..start + len]
    }

    /// Entry `(row, col)`.
    ///
    /// # Panics
    /// Panics if `row >= rows()` or `col >= cols(row)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Idx {
        debug_assert!(col < self.cols(row), "column out of bounds");
        let start = self.displs.as_slice()[row] as usize;
        self.values.as_slice()[start + col]
    }

    /// Largest column count seen so far.
    #[inline]
    pub fn maxcols(&self) -> usize {
        self.maxcols
    }

    /// Smallest column count seen so far; 0 when the table is empty.
    #[inline]
    pub fn mincols(&self) -> usize {
        if self.rows == 0 { 0 } else { self.mincols }
    }

    /// Sentinel stored in entries that were added without values.
    #[inline]
    pub fn missing_value(&self) -> Idx {
        self.missing_value
    }

    #[inline]
    pub fn owns(&self) -> bool {
        self.owns
    }

    /// Host bytes of the three backing buffers.
    pub fn bytes(&self) -> usize {
        self.values.bytes() + self.displs.bytes() + self.counts.bytes()
    }

    /// Raw row start offsets (`rows + 1` entries).
    pub fn displs(&self) -> &[Idx] {
        self.displs.as_slice()
    }

    /// Raw row lengths (`rows` entries).
    pub fn counts(&self) -> &[Idx] {
        self.counts.as_slice()
    }

    /// Raw flat entry buffer.
    pub fn values(&self) -> &[Idx] {
        self.values.as_slice()
    }

    pub fn register_observer(&mut self, observer: Box<dyn ConnectivityObserver>) {
        self.observers.push(observer);
    }

    fn on_update(&mut self) {
        for obs in &mut self.observers {
            obs.on_update();
        }
    }

    fn ensure_owned(&self) -> Result<(), MeshRemapError> {
        if self.owns {
            Ok(())
        } else {
            Err(MeshRemapError::NotOwned("IrregularConnectivity"))
        }
    }

    /// Append `rows` rows of `cols` entries each, filled with the missing
    /// value sentinel.
    pub fn add_uniform(&mut self, rows: usize, cols: usize) -> Result<(), MeshRemapError> {
        self.add_rows(rows, cols, None)
    }

    /// Append `rows` rows of `cols` entries each, copied from `values` in
    /// row-major order.
    pub fn add_values(
        &mut self,
        rows: usize,
        cols: usize,
        values: &[Idx],
    ) -> Result<(), MeshRemapError> {
        if values.len() != rows * cols {
            return Err(MeshRemapError::ValuesLengthMismatch {
                expected: rows * cols,
                found: values.len(),
            });
        }
        self.add_rows(rows, cols, Some(values))
    }

    fn add_rows(
        &mut self,
        rows: usize,
        cols: usize,
        values: Option<&[Idx]>,
    ) -> Result<(), MeshRemapError> {
        self.ensure_owned()?;
        let old_size = self.displs.as_slice()[self.rows] as usize;
        let new_size = old_size + rows * cols;
        let new_rows = self.rows + rows;

        self.displs.resize(new_rows + 1, 0);
        self.counts.resize(new_rows, 0);
        {
            let displs = self.displs.as_mut_slice();
            for r in self.rows..new_rows {
                displs[r + 1] = displs[r] + cols as Idx;
            }
        }
        self.counts.as_mut_slice()[self.rows..new_rows].fill(cols as Idx);

        self.values.resize(new_size, self.missing_value);
        if let Some(src) = values {
            self.values.as_mut_slice()[old_size..new_size].copy_from_slice(src);
        }

        self.rows = new_rows;
        if rows > 0 {
            self.maxcols = self.maxcols.max(cols);
            self.mincols = self.mincols.min(cols);
        }
        self.on_update();
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Append rows with heterogeneous column counts, filled with the missing
    /// value sentinel.
    pub fn add_ragged(&mut self, cols_per_row: &[usize]) -> Result<(), MeshRemapError> {
        self.ensure_owned()?;
        let old_size = self.displs.as_slice()[self.rows] as usize;
        let added: usize = cols_per_row.iter().sum();
        let new_rows = self.rows + cols_per_row.len();

        self.displs.resize(new_rows + 1, 0);
        self.counts.resize(new_rows, 0);
        {
            let displs = self.displs.as_mut_slice();
            let counts = self.counts.as_mut_slice();
            for (j, &cols) in cols_per_row.iter().enumerate() {
                let r = self.rows + j;
                displs[r + 1] = displs[r] + cols as Idx;
                counts[r] = cols as Idx;
            }
        }
        self.values.resize(old_size + added, self.missing_value);

        self.rows = new_rows;
        for &cols in cols_per_row {
            self.maxcols = self.maxcols.max(cols);
            self.mincols = self.mincols.min(cols);
        }
        self.on_update();
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Append all rows of a dense block.
    pub fn add_block(&mut self, block: &BlockConnectivity) -> Result<(), MeshRemapError> {
        self.add_values(block.rows(), block.cols(), block.values())
    }

    /// Splice `rows` rows of `cols` missing-value entries before `position`.
    pub fn insert_uniform(
        &mut self,
        position: usize,
        rows: usize,
        cols: usize,
    ) -> Result<(), MeshRemapError> {
        self.insert_rows(position, rows, cols, None)
    }

    /// Splice `rows` rows of `cols` entries before `position`, copied from
    /// `values` in row-major order.
    pub fn insert_values(
        &mut self,
        position: usize,
        rows: usize,
        cols: usize,
        values: &[Idx],
    ) -> Result<(), MeshRemapError> {
        if values.len() != rows * cols {
            return Err(MeshRemapError::ValuesLengthMismatch {
                expected: rows * cols,
                found: values.len(),
            });
        }
        self.insert_rows(position, rows, cols, Some(values))
    }

    fn insert_rows(
        &mut self,
        position: usize,
        rows: usize,
        cols: usize,
        values: Option<&[Idx]>,
    ) -> Result<(), MeshRemapError> {
        self.ensure_owned()?;
        // Inserting into an empty table is an append, whatever the position.
        if self.rows == 0 {
            return self.add_rows(rows, cols, values);
        }
        if position > self.rows {
            return Err(MeshRemapError::RowOutOfBounds {
                row: position,
                rows: self.rows,
            });
        }

        let position_displ = self.displs.as_slice()[position] as usize;
        let insert_size = rows * cols;

        self.counts.insert(position, rows, cols as Idx)?;
        self.displs.insert(position + 1, rows, 0)?;
        {
            // Recompute every displacement from the splice point onward.
            let (displs, counts) = (self.displs.as_mut_slice(), self.counts.as_slice());
            for r in position..self.rows + rows {
                displs[r + 1] = displs[r] + counts[r];
            }
        }

        self.values
            .insert(position_displ, insert_size, self.missing_value)?;
        if let Some(src) = values {
            self.values.as_mut_slice()[position_displ..position_displ + insert_size]
                .copy_from_slice(src);
        }

        self.rows += rows;
        if rows > 0 {
            self.maxcols = self.maxcols.max(cols);
            self.mincols = self.mincols.min(cols);
        }
        self.on_update();
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Splice rows with heterogeneous column counts before `position`,
    /// filled with the missing value sentinel.
    pub fn insert_ragged(
        &mut self,
        position: usize,
        cols_per_row: &[usize],
    ) -> Result<(), MeshRemapError> {
        self.ensure_owned()?;
        if self.rows == 0 {
            return self.add_ragged(cols_per_row);
        }
        if position > self.rows {
            return Err(MeshRemapError::RowOutOfBounds {
                row: position,
                rows: self.rows,
            });
        }

        let rows = cols_per_row.len();
        let position_displ = self.displs.as_slice()[position] as usize;
        let insert_size: usize = cols_per_row.iter().sum();

        self.counts.insert(position, rows, 0)?;
        self.displs.insert(position + 1, rows, 0)?;
        {
            let counts = self.counts.as_mut_slice();
            for (j, &cols) in cols_per_row.iter().enumerate() {
                counts[position + j] = cols as Idx;
            }
        }
        {
            let (displs, counts) = (self.displs.as_mut_slice(), self.counts.as_slice());
            for r in position..self.rows + rows {
                displs[r + 1] = displs[r] + counts[r];
            }
        }
        self.values
            .insert(position_displ, insert_size, self.missing_value)?;

        self.rows += rows;
        for &cols in cols_per_row {
            self.maxcols = self.maxcols.max(cols);
            self.mincols = self.mincols.min(cols);
        }
        self.on_update();
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(())
    }

    /// Reset to zero rows.
    ///
    /// Owning tables shrink their buffers to the minimal layout; wrapped
    /// tables drop their adopted buffers (they never owned external memory,
    /// so there is nothing to free beyond the local copies).
    pub fn clear(&mut self) {
        self.values = Array::from(Vec::new());
        self.displs = Array::from(vec![0]);
        self.counts = Array::from(Vec::new());
        self.rows = 0;
        self.maxcols = 0;
        self.mincols = usize::MAX;
        self.on_update();
    }

    /// Copy all three buffers to their device mirrors.
    pub fn clone_to_device(&mut self) {
        self.values.clone_to_device();
        self.displs.clone_to_device();
        self.counts.clone_to_device();
    }

    /// Copy all three device mirrors back to the host.
    pub fn clone_from_device(&mut self) {
        self.values.clone_from_device();
        self.displs.clone_from_device();
        self.counts.clone_from_device();
    }

    /// Synchronize whichever side of each buffer is stale.
    pub fn sync_host_device(&mut self) {
        self.values.sync_host_device();
        self.displs.sync_host_device();
        self.counts.sync_host_device();
    }

    /// True only if all three buffers are in a valid sync state.
    pub fn valid(&self) -> bool {
        self.values.valid() && self.displs.valid() && self.counts.valid()
    }

    /// True only if all three buffers need a host update.
    pub fn host_needs_update(&self) -> bool {
        self.values.host_needs_update()
            && self.displs.host_needs_update()
            && self.counts.host_needs_update()
    }

    /// True only if all three buffers need a device update.
    pub fn device_needs_update(&self) -> bool {
        self.values.device_needs_update()
            && self.displs.device_needs_update()
            && self.counts.device_needs_update()
    }
}

impl Drop for IrregularConnectivity {
    fn drop(&mut self) {
        for obs in &mut self.observers {
            obs.on_delete();
        }
    }
}

impl DebugInvariants for IrregularConnectivity {
    fn debug_assert_invariants(&self) {
        crate::debug_assert_ok!(self.validate_invariants(), "IrregularConnectivity invalid");
    }

    fn validate_invariants(&self) -> Result<(), MeshRemapError> {
        let displs = self.displs.as_slice();
        let counts = self.counts.as_slice();

        if displs.len() != self.rows + 1 || counts.len() != self.rows {
            return Err(MeshRemapError::ShapeMismatch {
                axis: 0,
                expected: self.rows + 1,
                found: displs.len(),
            });
        }
        if displs[0] != 0 {
            return Err(MeshRemapError::ShapeMismatch {
                axis: 0,
                expected: 0,
                found: displs[0] as usize,
            });
        }
        for r in 0..self.rows {
            if counts[r] < 0 || displs[r + 1] != displs[r] + counts[r] {
                return Err(MeshRemapError::ShapeMismatch {
                    axis: 0,
                    expected: (displs[r] + counts[r]) as usize,
                    found: displs[r + 1] as usize,
                });
            }
        }
        if self.values.len() < displs[self.rows] as usize {
            return Err(MeshRemapError::ValuesLengthMismatch {
                expected: displs[self.rows] as usize,
                found: self.values.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn add_values_reads_back() {
        let mut c = IrregularConnectivity::new("cells");
        c.add_values(2, 3, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(c.rows(), 2);
        assert_eq!(c.cols(0), 3);
        assert_eq!(c.row(1), &[4, 5, 6]);
        assert_eq!(c.get(1, 2), 6);
        assert_eq!(c.maxcols(), 3);
        assert_eq!(c.mincols(), 3);
    }

    #[test]
    fn add_uniform_fills_missing() {
        let mut c = IrregularConnectivity::new("cells");
        c.add_uniform(2, 4).unwrap();
        assert_eq!(c.row(0), &[-1, -1, -1, -1]);
        assert_eq!(c.get(1, 3), c.missing_value());
    }

    #[test]
    fn add_ragged_tracks_extrema() {
        let mut c = IrregularConnectivity::new("cells");
        c.add_ragged(&[3, 4, 3]).unwrap();
        assert_eq!(c.rows(), 3);
        assert_eq!(c.cols(1), 4);
        assert_eq!(c.maxcols(), 4);
        assert_eq!(c.mincols(), 3);
        assert_eq!(c.displs(), &[0, 3, 7, 10]);
    }

    #[test]
    fn insert_shifts_displacements() {
        let mut c = IrregularConnectivity::new("cells");
        c.add_values(3, 2, &[0, 1, 2, 3, 4, 5]).unwrap();
        c.insert_uniform(1, 1, 2).unwrap();
        assert_eq!(c.rows(), 4);
        assert_eq!(c.row(0), &[0, 1]);
        assert_eq!(c.row(1), &[-1, -1]);
        assert_eq!(c.row(2), &[2, 3]);
        assert_eq!(c.row(3), &[4, 5]);
        assert_eq!(c.displs(), &[0, 2, 4, 6, 8]);
    }

    #[test]
    fn insert_values_at_front() {
        let mut c = IrregularConnectivity::new("cells");
        c.add_values(1, 3, &[7, 8, 9]).unwrap();
        c.insert_values(0, 1, 3, &[1, 2, 3]).unwrap();
        assert_eq!(c.row(0), &[1, 2, 3]);
        assert_eq!(c.row(1), &[7, 8, 9]);
    }

    #[test]
    fn insert_into_empty_is_append() {
        let mut c = IrregularConnectivity::new("cells");
        c.insert_uniform(5, 2, 3).unwrap();
        assert_eq!(c.rows(), 2);
        assert_eq!(c.displs(), &[0, 3, 6]);
    }

    #[test]
    fn insert_ragged_recomputes_suffix() {
        let mut c = IrregularConnectivity::new("cells");
        c.add_values(2, 2, &[0, 1, 2, 3]).unwrap();
        c.insert_ragged(1, &[3, 1]).unwrap();
        assert_eq!(c.rows(), 4);
        assert_eq!(c.counts(), &[2, 3, 1, 2]);
        assert_eq!(c.displs(), &[0, 2, 5, 6, 8]);
        assert_eq!(c.row(3), &[2, 3]);
    }

    #[test]
    fn wrapped_rejects_mutation() {
        let mut c =
            IrregularConnectivity::wrap("wrapped", vec![1, 2, 3], vec![0, 2, 3], vec![2, 1])
                .unwrap();
        assert_eq!(c.rows(), 2);
        assert_eq!(c.row(0), &[1, 2]);
        assert_eq!(
            c.add_uniform(1, 2).unwrap_err(),
            MeshRemapError::NotOwned("IrregularConnectivity")
        );
        assert_eq!(
            c.insert_uniform(0, 1, 2).unwrap_err(),
            MeshRemapError::NotOwned("IrregularConnectivity")
        );
        // Reads are always fine.
        assert_eq!(c.get(1, 0), 3);
    }

    #[test]
    fn wrap_validates_invariants() {
        assert!(IrregularConnectivity::wrap("bad", vec![1], vec![0, 2], vec![2]).is_err());
        assert!(IrregularConnectivity::wrap("bad", vec![1, 2], vec![1, 3], vec![2]).is_err());
    }

    #[test]
    fn clear_resets() {
        let mut c = IrregularConnectivity::new("cells");
        c.add_uniform(4, 3).unwrap();
        c.clear();
        assert_eq!(c.rows(), 0);
        assert_eq!(c.maxcols(), 0);
        assert_eq!(c.mincols(), 0);
        assert_eq!(c.displs(), &[0]);
        // An owning table can be refilled after clear.
        c.add_uniform(1, 2).unwrap();
        assert_eq!(c.rows(), 1);
    }

    #[test]
    fn block_append_copies_rows() {
        let block = BlockConnectivity::from_values(2, 2, vec![1, 2, 3, 4]).unwrap();
        let mut c = IrregularConnectivity::new("cells");
        c.add_block(&block).unwrap();
        assert_eq!(c.rows(), 2);
        assert_eq!(c.row(1), &[3, 4]);
    }

    struct CountingObserver {
        updates: Arc<AtomicUsize>,
        deletes: Arc<AtomicUsize>,
    }

    impl ConnectivityObserver for CountingObserver {
        fn on_update(&mut self) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }
        fn on_delete(&mut self) {
            self.deletes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn observers_see_mutations_and_drop() {
        let updates = Arc::new(AtomicUsize::new(0));
        let deletes = Arc::new(AtomicUsize::new(0));
        {
            let mut c = IrregularConnectivity::new("cells");
            c.register_observer(Box::new(CountingObserver {
                updates: updates.clone(),
                deletes: deletes.clone(),
            }));
            c.add_uniform(1, 3).unwrap();
            c.insert_uniform(0, 1, 3).unwrap();
            c.clear();
        }
        assert_eq!(updates.load(Ordering::SeqCst), 3);
        assert_eq!(deletes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn device_status_is_conjunctive() {
        let mut c = IrregularConnectivity::new("cells");
        c.add_uniform(2, 3).unwrap();
        assert!(c.valid());
        assert!(!c.device_needs_update());
        c.clone_to_device();
        assert!(c.valid());
        c.sync_host_device();
        assert!(!c.host_needs_update());
    }
}
