//! k-nearest-neighbour interpolation with inverse-squared-distance weights.

use std::sync::Arc;

use log::debug;

use crate::config::Config;
use crate::geometry::{lonlat_to_xyz, EARTH_RADIUS};
use crate::mesh::{Mesh, Nodes};
use crate::remap_error::MeshRemapError;
use crate::runtime::Runtime;
use crate::spatial::PointIndex3;

use super::matrix::{normalise, SparseMatrix, Triplet};
use super::method::Method;

/// Configuration key holding the neighbour count.
pub const CONFIG_K: &str = "k-nearest-neighbours";

pub struct KNearestNeighbours {
    runtime: Arc<dyn Runtime>,
    k: usize,
    matrix: Option<SparseMatrix>,
}

impl KNearestNeighbours {
    /// `k` is read from the `"k-nearest-neighbours"` key; absent means 1.
    pub fn new(runtime: Arc<dyn Runtime>, config: &Config) -> Result<Self, MeshRemapError> {
        let k = config.get_int(CONFIG_K)?.unwrap_or(1);
        if k < 1 {
            return Err(MeshRemapError::ConfigOutOfRange {
                key: CONFIG_K.to_owned(),
                requirement: "k >= 1",
            });
        }
        Ok(Self {
            runtime,
            k: k as usize,
            matrix: None,
        })
    }

    /// The k=1 special case.
    pub fn nearest_neighbour(runtime: Arc<dyn Runtime>) -> Self {
        Self {
            runtime,
            k: 1,
            matrix: None,
        }
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }
}

impl Method for KNearestNeighbours {
    fn name(&self) -> &str {
        if self.k == 1 {
            "nearest-neighbour"
        } else {
            "k-nearest-neighbours"
        }
    }

    fn setup(&mut self, source: &Mesh, target: &Nodes) -> Result<(), MeshRemapError> {
        self.matrix = None;

        let xyz = source.nodes().to_xyz(EARTH_RADIUS);
        let index = PointIndex3::build(xyz);
        debug!(
            "{} setup: {} source nodes, {} target points, k = {}",
            self.name(),
            index.len(),
            target.len(),
            self.k
        );

        let mut triplets = Vec::with_capacity(self.k * target.len());
        for ip in 0..target.len() {
            if target.is_ghost(ip) {
                continue;
            }
            let (lon, lat) = target.lonlat(ip);
            let p = lonlat_to_xyz(lon, lat, EARTH_RADIUS);
            let start = triplets.len();
            for hit in index.k_nearest(p, self.k) {
                // Inverse squared distance, bounded at a coincident point.
                triplets.push(Triplet::new(ip, hit.payload, 1.0 / (1.0 + hit.distance2)));
            }
            normalise(&mut triplets[start..])?;
        }

        self.matrix = Some(SparseMatrix::from_triplets(
            target.len(),
            source.nodes().len(),
            triplets,
        )?);
        Ok(())
    }

    fn matrix(&self) -> Result<&SparseMatrix, MeshRemapError> {
        self.matrix
            .as_ref()
            .ok_or(MeshRemapError::MatrixNotAssembled)
    }

    fn runtime(&self) -> &dyn Runtime {
        &*self.runtime
    }
}
