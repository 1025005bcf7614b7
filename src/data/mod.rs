//! Typed array storage and field data.
//!
//! [`storage`] provides the pluggable flat-buffer abstraction, [`array`] adds
//! the host/device residency contract on top of it, and [`field`] holds
//! multi-dimensional values attached to mesh points.

pub mod array;
pub mod field;
pub mod storage;

pub use array::Array;
pub use field::{Field, FieldData};
pub use storage::{Storage, VecStorage};
