//! # mesh-remap
//!
//! mesh-remap is a Rust library for unstructured-mesh connectivity and
//! interpolation-weight construction on global Earth-system grids. It
//! provides CSR-like ragged element→node tables with owned or wrapped
//! storage, dense per-shape block views over them, and sparse remapping
//! matrices built by finite-element projection or k-nearest-neighbour
//! weighting.
//!
//! ## Features
//! - `IrregularConnectivity` ragged tables with append/splice mutation,
//!   running column extrema and a missing-value sentinel
//! - `MultiBlockConnectivity` partitioning a ragged table into dense
//!   uniform-column blocks, one per element shape
//! - Typed `Array` storage with host/device residency flags and a lazy
//!   device mirror
//! - `Method` interpolation: assemble a compressed-row weight matrix once,
//!   apply it to rank-1/2/3 fields row-parallel via rayon
//! - Built-in methods `finite-element`, `k-nearest-neighbours` and
//!   `nearest-neighbour`, reachable by name through `MethodRegistry`
//! - A `Runtime` seam for rank/barrier/halo-exchange so serial and
//!   distributed builds share the numerics
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! mesh-remap = "0.4"
//! ```
//!
//! Structural invariants of the connectivity tables are checked after every
//! mutation in debug builds; enable the `check-invariants` feature to keep
//! the checks in release builds.

pub mod config;
pub mod connectivity;
pub mod data;
pub mod debug_invariants;
pub mod geometry;
pub mod interpolation;
pub mod mesh;
pub mod remap_error;
pub mod runtime;
pub mod spatial;

pub use debug_invariants::DebugInvariants;
pub use remap_error::MeshRemapError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::config::{Config, ConfigValue};
    pub use crate::connectivity::{
        BlockConnectivity, BlockView, ConnectivityObserver, Idx, IrregularConnectivity,
        MultiBlockConnectivity,
    };
    pub use crate::data::{Array, Field, FieldData, Storage, VecStorage};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::{lonlat_to_xyz, xyz_to_lonlat, EARTH_RADIUS};
    pub use crate::interpolation::{
        FiniteElement, KNearestNeighbours, Method, MethodRegistry, SparseMatrix, Triplet,
    };
    pub use crate::mesh::{Cells, Mesh, Nodes, PointCloud};
    pub use crate::remap_error::MeshRemapError;
    pub use crate::runtime::{Runtime, SerialRuntime};
    pub use crate::spatial::PointIndex3;
}
