//! Field: named multi-dimensional data attached to mesh points.
//!
//! A field stores its values in one flat buffer with a shape of rank 1 to 3:
//! `(points)`, `(points, levels)` or `(points, levels, variables)`. The value
//! kind is dynamic so interpolation can dispatch on it at run time and reject
//! kinds it does not support. The `dirty` flag tracks halo staleness: a dirty
//! field must go through a halo exchange before its ghost rows are read.

use crate::remap_error::MeshRemapError;

/// Value kinds a field can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    I64(Vec<i64>),
}

impl FieldData {
    /// Kind name for diagnostics and compatibility checks.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldData::F32(_) => "real32",
            FieldData::F64(_) => "real64",
            FieldData::I32(_) => "int32",
            FieldData::I64(_) => "int64",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FieldData::F32(v) => v.len(),
            FieldData::F64(v) => v.len(),
            FieldData::I32(v) => v.len(),
            FieldData::I64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named field of rank 1-3 over mesh points.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    data: FieldData,
    /// `[points]`, `[points, levels]` or `[points, levels, variables]`.
    shape: Vec<usize>,
    dirty: bool,
}

impl Field {
    /// Build a field; the flat buffer length must equal the shape product.
    pub fn new(
        name: impl Into<String>,
        shape: Vec<usize>,
        data: FieldData,
    ) -> Result<Self, MeshRemapError> {
        assert!(
            (1..=3).contains(&shape.len()),
            "field rank must be 1, 2 or 3"
        );
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(MeshRemapError::ValuesLengthMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            data,
            shape,
            dirty: false,
        })
    }

    /// Zero-filled double-precision field.
    pub fn zeros_f64(name: impl Into<String>, shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self::new(name, shape, FieldData::F64(vec![0.0; len])).expect("shape product matches")
    }

    /// Zero-filled single-precision field.
    pub fn zeros_f32(name: impl Into<String>, shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self::new(name, shape, FieldData::F32(vec![0.0; len])).expect("shape product matches")
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn shape(&self, axis: usize) -> usize {
        self.shape[axis]
    }

    /// Vertical levels; 1 for rank-1 fields.
    #[inline]
    pub fn levels(&self) -> usize {
        self.shape.get(1).copied().unwrap_or(1)
    }

    /// Variables per level; 1 for rank-1/2 fields.
    #[inline]
    pub fn variables(&self) -> usize {
        self.shape.get(2).copied().unwrap_or(1)
    }

    /// Values per point (product of the inner axes).
    #[inline]
    pub fn inner_len(&self) -> usize {
        self.shape[1..].iter().product()
    }

    #[inline]
    pub fn data(&self) -> &FieldData {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut FieldData {
        &mut self.data
    }

    #[inline]
    pub fn kind(&self) -> &'static str {
        self.data.kind()
    }

    /// Halo staleness: true when ghost rows must be refreshed before reads.
    #[inline]
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    pub fn values_f64(&self) -> Result<&[f64], MeshRemapError> {
        match &self.data {
            FieldData::F64(v) => Ok(v),
            other => Err(MeshRemapError::KindMismatch {
                src: other.kind(),
                tgt: "real64",
            }),
        }
    }

    pub fn values_f64_mut(&mut self) -> Result<&mut [f64], MeshRemapError> {
        match &mut self.data {
            FieldData::F64(v) => Ok(v),
            other => Err(MeshRemapError::KindMismatch {
                src: other.kind(),
                tgt: "real64",
            }),
        }
    }

    pub fn values_f32(&self) -> Result<&[f32], MeshRemapError> {
        match &self.data {
            FieldData::F32(v) => Ok(v),
            other => Err(MeshRemapError::KindMismatch {
                src: other.kind(),
                tgt: "real32",
            }),
        }
    }

    pub fn values_f32_mut(&mut self) -> Result<&mut [f32], MeshRemapError> {
        match &mut self.data {
            FieldData::F32(v) => Ok(v),
            other => Err(MeshRemapError::KindMismatch {
                src: other.kind(),
                tgt: "real32",
            }),
        }
    }
}
