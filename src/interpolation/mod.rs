//! Sparse interpolation-weight construction and application.
//!
//! A [`Method`] assembles a compressed-row weight matrix mapping source mesh
//! nodes to target points during `setup`, then applies it to any number of
//! fields with `execute`. Built-in methods: [`FiniteElement`] (barycentric /
//! bilinear element projection) and [`KNearestNeighbours`] (inverse squared
//! distance), both reachable by name through [`MethodRegistry`].

pub mod factory;
pub mod finite_element;
pub mod knn;
pub mod matrix;
pub mod method;

pub use factory::{MethodBuilder, MethodRegistry};
pub use finite_element::FiniteElement;
pub use knn::{KNearestNeighbours, CONFIG_K};
pub use matrix::{normalise, SparseMatrix, Triplet};
pub use method::Method;
