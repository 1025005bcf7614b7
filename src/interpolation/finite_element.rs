//! Finite-element interpolation: locate each target point in a source
//! element and take the element's shape-function values as weights.
//!
//! Element location casts a ray from the target point (on the sphere
//! surface) toward the geocenter and intersects it with candidate elements,
//! searched in order of centroid distance through a k-d tree. The candidate
//! count widens 1, 2, 4, ... up to `max(64, 0.2 × n_elements)`; points still
//! unlocated after the widest search are reported together in one aggregate
//! error so a bad run shows every hole in the source mesh, not just the
//! first.

use std::sync::Arc;

use log::{debug, error};

use crate::connectivity::Idx;
use crate::geometry::{lonlat_to_xyz, Quad3D, Ray, Triag3D, Vec3, EARTH_RADIUS};
use crate::mesh::{Mesh, Nodes};
use crate::remap_error::MeshRemapError;
use crate::runtime::Runtime;
use crate::spatial::PointIndex3;

use super::matrix::{normalise, SparseMatrix, Triplet};
use super::method::Method;

/// Relative parametric tolerance for edge hits, scaled by `sqrt(area)` so it
/// is invariant under geometry scale.
const PARAMETRIC_EPSILON: f64 = 1e-15;

/// Floor of the widening candidate search.
const MIN_MAX_CANDIDATES: usize = 64;

/// Fraction of the element count the widening search gives up at.
const MAX_CANDIDATE_FRACTION: f64 = 0.2;

pub struct FiniteElement {
    runtime: Arc<dyn Runtime>,
    matrix: Option<SparseMatrix>,
}

impl FiniteElement {
    pub fn new(runtime: Arc<dyn Runtime>) -> Self {
        Self {
            runtime,
            matrix: None,
        }
    }

    /// Shape-function weights of `point` in element `elem`, if the ray
    /// through `point` hits it.
    fn element_weights(
        elem: usize,
        nodes: &[Idx],
        xyz: &[Vec3],
        ray: &Ray,
    ) -> Result<Option<Vec<(usize, f64)>>, MeshRemapError> {
        let vertex = |i: usize| -> Result<(usize, Vec3), MeshRemapError> {
            let n = nodes[i] as usize;
            let p = *xyz.get(n).ok_or(MeshRemapError::NodeIndexOutOfBounds {
                index: n,
                points: xyz.len(),
            })?;
            Ok((n, p))
        };
        match nodes.len() {
            3 => {
                let (n0, v0) = vertex(0)?;
                let (n1, v1) = vertex(1)?;
                let (n2, v2) = vertex(2)?;
                let triag = Triag3D::new(v0, v1, v2);
                let eps = PARAMETRIC_EPSILON * triag.area().sqrt();
                Ok(triag.intersects(ray, eps).map(|isect| {
                    vec![
                        (n0, 1.0 - isect.u - isect.v),
                        (n1, isect.u),
                        (n2, isect.v),
                    ]
                }))
            }
            4 => {
                let (n0, v0) = vertex(0)?;
                let (n1, v1) = vertex(1)?;
                let (n2, v2) = vertex(2)?;
                let (n3, v3) = vertex(3)?;
                let quad = Quad3D::new(v0, v1, v2, v3);
                let eps = PARAMETRIC_EPSILON * quad.area().sqrt();
                Ok(quad.intersects(ray, eps).map(|isect| {
                    let (u, v) = (isect.u, isect.v);
                    vec![
                        (n0, (1.0 - u) * (1.0 - v)),
                        (n1, u * (1.0 - v)),
                        (n2, u * v),
                        (n3, (1.0 - u) * v),
                    ]
                }))
            }
            vertices => Err(MeshRemapError::InvalidElementType {
                element: elem,
                vertices,
            }),
        }
    }
}

impl Method for FiniteElement {
    fn name(&self) -> &str {
        "finite-element"
    }

    fn setup(&mut self, source: &Mesh, target: &Nodes) -> Result<(), MeshRemapError> {
        self.matrix = None;

        let xyz = source.nodes().to_xyz(EARTH_RADIUS);
        let centres = source.cell_centres(EARTH_RADIUS)?;
        let conn = source.cells().node_connectivity();
        let nelems = conn.rows();
        let index = PointIndex3::build(centres);

        let max_candidates =
            MIN_MAX_CANDIDATES.max((MAX_CANDIDATE_FRACTION * nelems as f64).ceil() as usize);
        debug!(
            "finite-element setup: {} source nodes, {} elements, {} target points, search cap {}",
            xyz.len(),
            nelems,
            target.len(),
            max_candidates
        );

        let mut triplets = Vec::new();
        let mut failed: Vec<(f64, f64)> = Vec::new();

        for ip in 0..target.len() {
            if target.is_ghost(ip) {
                continue;
            }
            let (lon, lat) = target.lonlat(ip);
            let p = lonlat_to_xyz(lon, lat, EARTH_RADIUS);
            let ray = Ray::from_surface_point(p);

            let mut located = false;
            let mut k = 1;
            'search: loop {
                for hit in index.k_nearest(p, k) {
                    let elem = hit.payload;
                    if let Some(weights) =
                        Self::element_weights(elem, conn.row(elem), &xyz, &ray)?
                    {
                        let start = triplets.len();
                        triplets.extend(
                            weights
                                .into_iter()
                                .map(|(col, w)| Triplet::new(ip, col, w)),
                        );
                        normalise(&mut triplets[start..])?;
                        located = true;
                        break 'search;
                    }
                }
                if k >= max_candidates.min(nelems) {
                    break;
                }
                k = (2 * k).min(max_candidates);
            }
            if !located {
                failed.push((lon, lat));
            }
        }

        self.runtime.barrier();
        if !failed.is_empty() {
            error!(
                "finite-element setup failed to locate {} of {} target points",
                failed.len(),
                target.len()
            );
            return Err(MeshRemapError::PointLocationFailed(failed));
        }

        let matrix = SparseMatrix::from_triplets(target.len(), source.nodes().len(), triplets)?;
        debug!(
            "finite-element setup done: {} weights for {} target points",
            matrix.nnz(),
            matrix.rows()
        );
        self.matrix = Some(matrix);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::MultiBlockConnectivity;
    use crate::mesh::Cells;

    /// Two triangles tiling the lonlat unit square near the equator.
    fn triangle_mesh() -> Mesh {
        let nodes = Nodes::new(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let mut conn = MultiBlockConnectivity::new("cells");
        conn.add_values(2, 3, &[0, 1, 2, 0, 2, 3]).unwrap();
        Mesh::new(nodes, Cells::new(conn))
    }

    #[test]
    fn source_nodes_interpolate_to_themselves() {
        let mesh = triangle_mesh();
        let target = Nodes::new(vec![(0.0, 0.0), (1.0, 1.0)]);
        let mut fe = FiniteElement::new(Arc::new(crate::runtime::SerialRuntime));
        fe.setup(&mesh, &target).unwrap();
        let m = fe.matrix().unwrap();
        for row in 0..2 {
            let entries: Vec<_> = m.row(row).collect();
            let sum: f64 = entries.iter().map(|&(_, w)| w).sum();
            assert!((sum - 1.0).abs() < 1e-12);
            // A vertex hit concentrates the weight on that vertex.
            let max = entries
                .iter()
                .map(|&(_, w)| w)
                .fold(f64::MIN, f64::max);
            assert!(max > 1.0 - 1e-9, "row {row}: {entries:?}");
        }
    }

    #[test]
    fn weights_partition_unity_at_interior_points() {
        let mesh = triangle_mesh();
        let target = Nodes::new(vec![(0.4, 0.2), (0.6, 0.9)]);
        let mut fe = FiniteElement::new(Arc::new(crate::runtime::SerialRuntime));
        fe.setup(&mesh, &target).unwrap();
        let m = fe.matrix().unwrap();
        for row in 0..2 {
            let sum: f64 = m.row(row).map(|(_, w)| w).sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn unlocated_points_reported_in_aggregate() {
        let mesh = triangle_mesh();
        // Both targets a quarter turn away; their geocentric rays never
        // come near the source patch.
        let target = Nodes::new(vec![(90.0, 0.0), (0.0, 90.0)]);
        let mut fe = FiniteElement::new(Arc::new(crate::runtime::SerialRuntime));
        let err = fe.setup(&mesh, &target).unwrap_err();
        match err {
            MeshRemapError::PointLocationFailed(points) => {
                assert_eq!(points.len(), 2);
                assert_eq!(points[0], (90.0, 0.0));
            }
            other => panic!("expected PointLocationFailed, got {other:?}"),
        }
        assert_eq!(fe.matrix().unwrap_err(), MeshRemapError::MatrixNotAssembled);
    }

    #[test]
    fn five_vertex_element_rejected() {
        let nodes = Nodes::new(vec![(0.0, 0.0), (1.0, 0.0), (1.5, 1.0), (0.5, 2.0), (-0.5, 1.0)]);
        let mut conn = MultiBlockConnectivity::new("cells");
        conn.add_values(1, 5, &[0, 1, 2, 3, 4]).unwrap();
        let mesh = Mesh::new(nodes, Cells::new(conn));
        let target = Nodes::new(vec![(0.5, 1.0)]);
        let mut fe = FiniteElement::new(Arc::new(crate::runtime::SerialRuntime));
        assert_eq!(
            fe.setup(&mesh, &target).unwrap_err(),
            MeshRemapError::InvalidElementType {
                element: 0,
                vertices: 5
            }
        );
    }

    #[test]
    fn ghost_targets_are_skipped() {
        let mesh = triangle_mesh();
        let target =
            Nodes::with_ghost(vec![(0.4, 0.2), (120.0, -60.0)], vec![false, true]).unwrap();
        let mut fe = FiniteElement::new(Arc::new(crate::runtime::SerialRuntime));
        fe.setup(&mesh, &target).unwrap();
        let m = fe.matrix().unwrap();
        assert!(m.row(0).next().is_some());
        assert!(m.row(1).next().is_none());
    }
}
