//! Nearest-neighbour search over Cartesian point sets.

use kiddo::{ImmutableKdTree, SquaredEuclidean};

use crate::geometry::Vec3;

/// A neighbour returned by [`PointIndex3::k_nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    /// The indexed point's coordinates.
    pub point: Vec3,
    /// Payload id given at build time (position in the build slice).
    pub payload: usize,
    /// Squared Euclidean distance to the query point.
    pub distance2: f64,
}

/// Immutable k-d tree over 3D points, each tagged with its position in the
/// build slice as payload.
pub struct PointIndex3 {
    tree: ImmutableKdTree<f64, 3>,
    points: Vec<Vec3>,
}

impl std::fmt::Debug for PointIndex3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointIndex3")
            .field("points", &self.points.len())
            .finish()
    }
}

impl PointIndex3 {
    pub fn build(points: Vec<Vec3>) -> Self {
        let tree = ImmutableKdTree::new_from_slice(&points);
        Self { tree, points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The `k` indexed points nearest to `query`, closest first. `k` is
    /// clamped to the point count.
    pub fn k_nearest(&self, query: Vec3, k: usize) -> Vec<Neighbour> {
        let k = k.min(self.points.len());
        if k == 0 {
            return Vec::new();
        }
        self.tree
            .nearest_n::<SquaredEuclidean>(&query, k)
            .into_iter()
            .map(|n| {
                let payload = n.item as usize;
                Neighbour {
                    point: self.points[payload],
                    payload,
                    distance2: n.distance,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> PointIndex3 {
        PointIndex3::build(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [2.0, 2.0, 0.0],
        ])
    }

    #[test]
    fn nearest_is_first_and_ordered() {
        let idx = grid();
        let hits = idx.k_nearest([0.9, 0.1, 0.0], 3);
        assert_eq!(hits[0].payload, 1);
        assert!(hits[0].distance2 <= hits[1].distance2);
        assert!(hits[1].distance2 <= hits[2].distance2);
    }

    #[test]
    fn coincident_query_has_zero_distance() {
        let idx = grid();
        let hits = idx.k_nearest([2.0, 2.0, 0.0], 1);
        assert_eq!(hits[0].payload, 3);
        assert_eq!(hits[0].distance2, 0.0);
        assert_eq!(hits[0].point, [2.0, 2.0, 0.0]);
    }

    #[test]
    fn k_clamped_to_point_count() {
        let idx = grid();
        assert_eq!(idx.k_nearest([0.0, 0.0, 0.0], 100).len(), 4);
    }
}
