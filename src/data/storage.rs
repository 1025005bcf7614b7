//! Pluggable storage for flat numeric buffers.
//!
//! This trait abstracts how the crate's flat buffers are stored (Vec today,
//! mmap or accelerator-staged memory later). Connectivity tables and field
//! data are both built on top of it, so a backend swap does not touch their
//! public APIs.

use core::fmt::{self, Debug};

use crate::remap_error::MeshRemapError;

/// Contiguous, indexable storage for `V` with slice access.
pub trait Storage<V>: Debug {
    /// Construct a buffer of `len`, filled with `fill`.
    fn with_len(len: usize, fill: V) -> Self
    where
        V: Clone;

    /// Current length in elements.
    fn len(&self) -> usize;

    /// Whether the buffer holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resize to `new_len`, filling new cells with `fill`.
    fn resize(&mut self, new_len: usize, fill: V)
    where
        V: Clone;

    /// Entire read-only buffer.
    fn as_slice(&self) -> &[V];

    /// Entire mutable buffer.
    fn as_mut_slice(&mut self) -> &mut [V];

    /// Open a gap of `count` cells before `pos`, filled with `fill`.
    ///
    /// Existing elements at `pos..` shift towards the end. Used by
    /// connectivity row splicing; O(len) suffix move.
    fn insert_gap(&mut self, pos: usize, count: usize, fill: V) -> Result<(), MeshRemapError>
    where
        V: Clone,
    {
        let old_len = self.len();
        if pos > old_len {
            return Err(MeshRemapError::ShapeMismatch {
                axis: 0,
                expected: old_len,
                found: pos,
            });
        }
        self.resize(old_len + count, fill);
        self.as_mut_slice()[pos..].rotate_right(count);
        Ok(())
    }

    /// Copy `src` into the range `[offset .. offset + src.len())`.
    fn write_at(&mut self, offset: usize, src: &[V]) -> Result<(), MeshRemapError>
    where
        V: Clone,
    {
        let end = offset + src.len();
        let len = self.len();
        if end > len {
            return Err(MeshRemapError::ShapeMismatch {
                axis: 0,
                expected: end,
                found: len,
            });
        }
        self.as_mut_slice()[offset..end].clone_from_slice(src);
        Ok(())
    }
}

/// `Vec`-backed storage (default).
#[derive(Clone)]
pub struct VecStorage<V>(pub(crate) Vec<V>);

impl<V> Debug for VecStorage<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecStorage")
            .field("len", &self.0.len())
            .finish()
    }
}

impl<V> Storage<V> for VecStorage<V> {
    fn with_len(len: usize, fill: V) -> Self
    where
        V: Clone,
    {
        Self(vec![fill; len])
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn resize(&mut self, new_len: usize, fill: V)
    where
        V: Clone,
    {
        self.0.resize(new_len, fill);
    }

    fn as_slice(&self) -> &[V] {
        &self.0
    }

    fn as_mut_slice(&mut self) -> &mut [V] {
        &mut self.0
    }
}

impl<V> From<Vec<V>> for VecStorage<V> {
    fn from(v: Vec<V>) -> Self {
        Self(v)
    }
}

impl<V> VecStorage<V> {
    pub fn into_inner(self) -> Vec<V> {
        self.0
    }
}
