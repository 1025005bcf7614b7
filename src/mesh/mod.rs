//! Minimal mesh entity collections consumed by interpolation setup.

use crate::connectivity::MultiBlockConnectivity;
use crate::geometry::{lonlat_to_xyz, Vec3};
use crate::remap_error::MeshRemapError;

/// Mesh node coordinates plus per-node ghost flags.
///
/// Ghost nodes mirror nodes owned by another partition; they carry valid
/// coordinates but no interpolation weights are built for them.
#[derive(Debug, Clone, Default)]
pub struct Nodes {
    lonlat: Vec<(f64, f64)>,
    ghost: Vec<bool>,
}

impl Nodes {
    pub fn new(lonlat: Vec<(f64, f64)>) -> Self {
        let ghost = vec![false; lonlat.len()];
        Self { lonlat, ghost }
    }

    pub fn with_ghost(
        lonlat: Vec<(f64, f64)>,
        ghost: Vec<bool>,
    ) -> Result<Self, MeshRemapError> {
        if ghost.len() != lonlat.len() {
            return Err(MeshRemapError::ValuesLengthMismatch {
                expected: lonlat.len(),
                found: ghost.len(),
            });
        }
        Ok(Self { lonlat, ghost })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lonlat.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lonlat.is_empty()
    }

    #[inline]
    pub fn lonlat(&self, node: usize) -> (f64, f64) {
        self.lonlat[node]
    }

    #[inline]
    pub fn is_ghost(&self, node: usize) -> bool {
        self.ghost[node]
    }

    /// All node coordinates projected onto a sphere of radius `radius`.
    pub fn to_xyz(&self, radius: f64) -> Vec<Vec3> {
        self.lonlat
            .iter()
            .map(|&(lon, lat)| lonlat_to_xyz(lon, lat, radius))
            .collect()
    }
}

/// Mesh cells: an element→node table partitioned by element shape.
#[derive(Debug)]
pub struct Cells {
    node_connectivity: MultiBlockConnectivity,
}

impl Cells {
    pub fn new(node_connectivity: MultiBlockConnectivity) -> Self {
        Self { node_connectivity }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.node_connectivity.rows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn node_connectivity(&self) -> &MultiBlockConnectivity {
        &self.node_connectivity
    }

    #[inline]
    pub fn node_connectivity_mut(&mut self) -> &mut MultiBlockConnectivity {
        &mut self.node_connectivity
    }
}

/// An unstructured mesh: nodes plus cells over them.
#[derive(Debug)]
pub struct Mesh {
    nodes: Nodes,
    cells: Cells,
}

impl Mesh {
    pub fn new(nodes: Nodes, cells: Cells) -> Self {
        Self { nodes, cells }
    }

    #[inline]
    pub fn nodes(&self) -> &Nodes {
        &self.nodes
    }

    #[inline]
    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    /// Per-cell centroid: the average of the cell's vertex coordinates on a
    /// sphere of radius `radius`. Fails if a cell references a node outside
    /// the node set.
    pub fn cell_centres(&self, radius: f64) -> Result<Vec<Vec3>, MeshRemapError> {
        let xyz = self.nodes.to_xyz(radius);
        let conn = self.cells.node_connectivity();
        let mut centres = Vec::with_capacity(conn.rows());
        for e in 0..conn.rows() {
            let row = conn.row(e);
            let mut c = [0.0; 3];
            for &n in row {
                let n = n as usize;
                let p = xyz.get(n).ok_or(MeshRemapError::NodeIndexOutOfBounds {
                    index: n,
                    points: xyz.len(),
                })?;
                c[0] += p[0];
                c[1] += p[1];
                c[2] += p[2];
            }
            let inv = 1.0 / row.len() as f64;
            centres.push([c[0] * inv, c[1] * inv, c[2] * inv]);
        }
        Ok(centres)
    }
}

/// A bare set of target points with no connectivity.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    points: Nodes,
}

impl PointCloud {
    pub fn new(lonlat: Vec<(f64, f64)>) -> Self {
        Self {
            points: Nodes::new(lonlat),
        }
    }

    #[inline]
    pub fn points(&self) -> &Nodes {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangle_mesh() -> Mesh {
        // Unit square split along the diagonal, in a small lonlat patch.
        let nodes = Nodes::new(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let mut conn = MultiBlockConnectivity::new("cells");
        conn.add_values(2, 3, &[0, 1, 2, 0, 2, 3]).unwrap();
        Mesh::new(nodes, Cells::new(conn))
    }

    #[test]
    fn centres_average_vertices() {
        let mesh = two_triangle_mesh();
        let centres = mesh.cell_centres(1.0).unwrap();
        assert_eq!(centres.len(), 2);
        let xyz = mesh.nodes().to_xyz(1.0);
        for axis in 0..3 {
            let expected = (xyz[0][axis] + xyz[1][axis] + xyz[2][axis]) / 3.0;
            assert!((centres[0][axis] - expected).abs() < 1e-14);
        }
    }

    #[test]
    fn bad_node_reference_is_reported() {
        let nodes = Nodes::new(vec![(0.0, 0.0), (1.0, 0.0)]);
        let mut conn = MultiBlockConnectivity::new("cells");
        conn.add_values(1, 3, &[0, 1, 9]).unwrap();
        let mesh = Mesh::new(nodes, Cells::new(conn));
        assert_eq!(
            mesh.cell_centres(1.0).unwrap_err(),
            MeshRemapError::NodeIndexOutOfBounds {
                index: 9,
                points: 2
            }
        );
    }

    #[test]
    fn ghost_flags_align_with_nodes() {
        let n = Nodes::with_ghost(vec![(0.0, 0.0), (1.0, 1.0)], vec![false, true]).unwrap();
        assert!(!n.is_ghost(0));
        assert!(n.is_ghost(1));
        assert!(Nodes::with_ghost(vec![(0.0, 0.0)], vec![false, true]).is_err());
    }
}
