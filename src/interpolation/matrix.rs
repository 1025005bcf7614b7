//! Triplet assembly and the compressed-row weight matrix.

use itertools::Itertools;

use crate::remap_error::MeshRemapError;

/// One interpolation weight: target row, source column, weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triplet {
    pub row: usize,
    pub col: usize,
    pub weight: f64,
}

impl Triplet {
    pub fn new(row: usize, col: usize, weight: f64) -> Self {
        Self { row, col, weight }
    }
}

/// Scale the weights so they sum to one.
///
/// Interpolation stencils must partition unity; a non-positive sum means the
/// stencil is degenerate and cannot be repaired by scaling.
pub fn normalise(triplets: &mut [Triplet]) -> Result<(), MeshRemapError> {
    let sum: f64 = triplets.iter().map(|t| t.weight).sum();
    if !(sum > 0.0) {
        return Err(MeshRemapError::ZeroWeightSum);
    }
    // Divide rather than multiply by a reciprocal: w / w is exactly 1.0,
    // so a single-entry stencil stays an exact copy.
    for t in triplets.iter_mut() {
        t.weight /= sum;
    }
    Ok(())
}

/// Immutable CSR matrix of interpolation weights, rows = target points,
/// columns = source points.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    /// Row start offsets, `rows + 1` entries.
    outer: Vec<usize>,
    /// Column index per stored entry.
    inner: Vec<usize>,
    weights: Vec<f64>,
}

impl SparseMatrix {
    /// Assemble from triplets in any order. Duplicate `(row, col)` entries
    /// are summed. Out-of-range indices are rejected.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        mut triplets: Vec<Triplet>,
    ) -> Result<Self, MeshRemapError> {
        for t in &triplets {
            if t.row >= rows {
                return Err(MeshRemapError::RowOutOfBounds { row: t.row, rows });
            }
            if t.col >= cols {
                return Err(MeshRemapError::NodeIndexOutOfBounds {
                    index: t.col,
                    points: cols,
                });
            }
        }
        triplets.sort_unstable_by_key(|t| (t.row, t.col));

        let mut outer = vec![0usize; rows + 1];
        let mut inner = Vec::with_capacity(triplets.len());
        let mut weights = Vec::with_capacity(triplets.len());
        for ((row, col), group) in &triplets.iter().chunk_by(|t| (t.row, t.col)) {
            outer[row + 1] += 1;
            inner.push(col);
            weights.push(group.map(|t| t.weight).sum());
        }
        for r in 0..rows {
            outer[r + 1] += outer[r];
        }
        Ok(Self {
            rows,
            cols,
            outer,
            inner,
            weights,
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

    /// Stored entry count.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.inner.len()
    }

    /// The stored `(column, weight)` pairs of one row.
    #[inline]
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.outer[row]..self.outer[row + 1];
        self.inner[range.clone()]
            .iter()
            .copied()
            .zip(self.weights[range].iter().copied())
    }
}
