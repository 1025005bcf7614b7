//! Crate-wide error type.
//!
//! Every fallible public operation returns `Result<_, MeshRemapError>`.
//! Structural mutations check their contract up front and leave the data
//! structure untouched on error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshRemapError {
    /// Structural mutation attempted on a table that wraps caller-owned
    /// buffers.
    #[error("{0} does not own its buffers; structural mutation is not allowed")]
    NotOwned(&'static str),

    #[error("row {row} out of bounds for table with {rows} rows")]
    RowOutOfBounds { row: usize, rows: usize },

    #[error("block {block} out of bounds for table with {blocks} blocks")]
    BlockOutOfBounds { block: usize, blocks: usize },

    #[error("value buffer length mismatch: expected {expected}, found {found}")]
    ValuesLengthMismatch { expected: usize, found: usize },

    /// A multiblock append or splice received rows with differing column
    /// counts.
    #[error("rows added to a block table must share one column count")]
    NonUniformColumns,

    /// No block can absorb the splice at this position with this column
    /// count.
    #[error("no block accepts an insert of {cols}-column rows at row {position}")]
    IncompatibleBlockInsert { position: usize, cols: usize },

    #[error("block column count mismatch: expected {expected}, found {found}")]
    BlockColsMismatch { expected: usize, found: usize },

    /// Interpolation only handles triangles and quadrilaterals.
    #[error("element {element} has {vertices} vertices; only 3 or 4 are supported")]
    InvalidElementType { element: usize, vertices: usize },

    #[error("node index {index} out of bounds for {points} points")]
    NodeIndexOutOfBounds { index: usize, points: usize },

    /// A weight stencil summed to zero or below and cannot be normalised.
    #[error("interpolation weights sum to a non-positive value")]
    ZeroWeightSum,

    /// Aggregate element-location failure; carries the (lon, lat) of every
    /// target point no source element was found for.
    #[error("failed to locate {} target point(s) in the source mesh", .0.len())]
    PointLocationFailed(Vec<(f64, f64)>),

    #[error("field value kind mismatch: source {src}, target {tgt}")]
    KindMismatch {
        src: &'static str,
        tgt: &'static str,
    },

    #[error("field rank mismatch: source {src}, target {tgt}")]
    RankMismatch { src: usize, tgt: usize },

    #[error("shape mismatch on axis {axis}: expected {expected}, found {found}")]
    ShapeMismatch {
        axis: usize,
        expected: usize,
        found: usize,
    },

    /// `execute` called before a successful `setup`.
    #[error("interpolation matrix has not been assembled")]
    MatrixNotAssembled,

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("interpolation method {0:?} is already registered")]
    DuplicateMethod(String),

    #[error("unknown interpolation method {0:?}")]
    UnknownMethod(String),

    #[error("configuration key {key:?} has the wrong type; expected {expected}")]
    ConfigTypeMismatch { key: String, expected: &'static str },

    #[error("configuration key {key:?} out of range; requires {requirement}")]
    ConfigOutOfRange {
        key: String,
        requirement: &'static str,
    },
}
