//! The `Method` abstraction: assemble once, apply many times.

use num_traits::Float;
use rayon::prelude::*;

use crate::data::Field;
use crate::mesh::{Mesh, Nodes};
use crate::remap_error::MeshRemapError;
use crate::runtime::Runtime;

use super::matrix::SparseMatrix;

/// An interpolation method: `setup` assembles the weight matrix for a fixed
/// source/target pair, `execute` applies it to fields.
///
/// `execute` has a default implementation shared by all methods; concrete
/// methods only differ in how they assemble the matrix.
pub trait Method: Send + Sync {
    fn name(&self) -> &str;

    /// Assemble the weight matrix. On error the method stays unusable and
    /// `execute` fails with [`MeshRemapError::MatrixNotAssembled`].
    fn setup(&mut self, source: &Mesh, target: &Nodes) -> Result<(), MeshRemapError>;

    /// The assembled matrix, or `MatrixNotAssembled` before a successful
    /// `setup`.
    fn matrix(&self) -> Result<&SparseMatrix, MeshRemapError>;

    fn runtime(&self) -> &dyn Runtime;

    /// Interpolate `src` into `tgt`.
    ///
    /// Checks value kind, rank and shape compatibility, refreshes the source
    /// halo if it is dirty, applies the matrix row-parallel over all inner
    /// dimensions and marks the target dirty (its ghost rows were not
    /// computed here).
    fn execute(&self, src: &mut Field, tgt: &mut Field) -> Result<(), MeshRemapError> {
        let matrix = self.matrix()?;
        check_compatible(matrix, src, tgt)?;

        if src.dirty() {
            self.runtime().halo_exchange(src);
        }

        let inner = src.inner_len();
        match src.kind() {
            "real64" => apply(matrix, src.values_f64()?, tgt.values_f64_mut()?, inner),
            "real32" => apply(matrix, src.values_f32()?, tgt.values_f32_mut()?, inner),
            other => {
                return Err(MeshRemapError::NotImplemented(format!(
                    "interpolation of {other} fields"
                )));
            }
        }
        tgt.set_dirty(true);
        Ok(())
    }
}

fn check_compatible(
    matrix: &SparseMatrix,
    src: &Field,
    tgt: &Field,
) -> Result<(), MeshRemapError> {
    if src.kind() != tgt.kind() {
        return Err(MeshRemapError::KindMismatch {
            src: src.kind(),
            tgt: tgt.kind(),
        });
    }
    if src.rank() != tgt.rank() {
        return Err(MeshRemapError::RankMismatch {
            src: src.rank(),
            tgt: tgt.rank(),
        });
    }
    if src.shape(0) != matrix.cols() {
        return Err(MeshRemapError::ShapeMismatch {
            axis: 0,
            expected: matrix.cols(),
            found: src.shape(0),
        });
    }
    if tgt.shape(0) != matrix.rows() {
        return Err(MeshRemapError::ShapeMismatch {
            axis: 0,
            expected: matrix.rows(),
            found: tgt.shape(0),
        });
    }
    for axis in 1..src.rank() {
        if src.shape(axis) != tgt.shape(axis) {
            return Err(MeshRemapError::ShapeMismatch {
                axis,
                expected: src.shape(axis),
                found: tgt.shape(axis),
            });
        }
    }
    Ok(())
}

/// Row-parallel sparse matrix application over `inner` values per point.
///
/// Accumulation is in the field's own precision; the weight is cast once per
/// stored entry.
fn apply<T: Float + Send + Sync>(matrix: &SparseMatrix, src: &[T], tgt: &mut [T], inner: usize) {
    if inner == 0 {
        return;
    }
    tgt.par_chunks_mut(inner)
        .enumerate()
        .for_each(|(row, out)| {
            out.fill(T::zero());
            for (col, weight) in matrix.row(row) {
                let w = T::from(weight).unwrap_or_else(T::zero);
                let block = &src[col * inner..(col + 1) * inner];
                for (o, &s) in out.iter_mut().zip(block) {
                    *o = *o + w * s;
                }
            }
        });
}
