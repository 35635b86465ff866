use crate::SquareGraphError;
use calib_squares_core::{segment_intersection, LineSegment, Quad};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Handle of a node inside a [`SquareGraph`](crate::SquareGraph).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of an edge slot in the edge pool. Only meaningful while the edge
/// is live; the pool reuses handles after release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Adjacency between side `side_a` of node `a` and side `side_b` of node `b`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquareEdge {
    pub a: NodeId,
    pub side_a: usize,
    pub b: NodeId,
    pub side_b: usize,
    /// Comparison key for the greedy tie-break; smaller is better.
    pub distance: f64,
}

impl SquareEdge {
    /// The node and side at the far end of the edge, seen from `node`.
    pub fn opposite(&self, node: NodeId) -> Option<(NodeId, usize)> {
        if node == self.a {
            Some((self.b, self.side_b))
        } else if node == self.b {
            Some((self.a, self.side_a))
        } else {
            None
        }
    }
}

/// One detected square and its four side slots.
#[derive(Clone, Debug, Serialize)]
pub struct SquareNode {
    pub corners: Quad,
    /// Crossing of the two diagonals, or the corner centroid when the
    /// diagonals do not cross.
    pub center: Point2<f64>,
    pub largest_side: f64,
    pub smallest_side: f64,
    pub(crate) edges: [Option<EdgeId>; 4],
}

impl SquareNode {
    pub fn new(corners: Quad) -> Result<Self, SquareGraphError> {
        let mut largest_side = 0.0f64;
        let mut smallest_side = f64::INFINITY;
        for side in 0..4 {
            let length = LineSegment::side_of(&corners, side).length();
            if length <= 0.0 || !length.is_finite() {
                return Err(SquareGraphError::DegenerateSide { side });
            }
            largest_side = largest_side.max(length);
            smallest_side = smallest_side.min(length);
        }

        let diag0 = LineSegment::new(corners[0], corners[2]);
        let diag1 = LineSegment::new(corners[1], corners[3]);
        let center = segment_intersection(&diag0, &diag1).unwrap_or_else(|| {
            let sum = corners.iter().fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
            Point2::from(sum / 4.0)
        });

        Ok(Self {
            corners,
            center,
            largest_side,
            smallest_side,
            edges: [None; 4],
        })
    }

    /// Build a node from a polygon that must have exactly 4 corners.
    pub fn from_polygon(polygon: &[Point2<f64>]) -> Result<Self, SquareGraphError> {
        let corners: Quad = polygon
            .try_into()
            .map_err(|_| SquareGraphError::CornerCount {
                corners: polygon.len(),
            })?;
        Self::new(corners)
    }

    pub fn side(&self, side: usize) -> LineSegment {
        LineSegment::side_of(&self.corners, side)
    }

    /// Edge attached to `side`, if any.
    ///
    /// # Panics
    /// If `side` is not in `0..4`.
    pub fn edge(&self, side: usize) -> Option<EdgeId> {
        self.edges[side]
    }

    pub fn edges(&self) -> &[Option<EdgeId>; 4] {
        &self.edges
    }

    /// Number of occupied side slots.
    pub fn degree(&self) -> usize {
        self.edges.iter().flatten().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derives_center_and_side_lengths() {
        let node = SquareNode::new([
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(0.0, 2.0),
        ])
        .unwrap();
        assert_relative_eq!(node.center.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(node.center.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(node.largest_side, 4.0);
        assert_relative_eq!(node.smallest_side, 2.0);
        assert_eq!(node.degree(), 0);
    }

    #[test]
    fn polygon_must_have_four_corners() {
        let tri = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        assert!(matches!(
            SquareNode::from_polygon(&tri),
            Err(SquareGraphError::CornerCount { corners: 3 })
        ));
    }

    #[test]
    fn repeated_corner_is_degenerate() {
        let p = Point2::new(1.0, 1.0);
        let err = SquareNode::new([p, p, Point2::new(2.0, 2.0), Point2::new(1.0, 2.0)]);
        assert!(matches!(err, Err(SquareGraphError::DegenerateSide { side: 0 })));
    }

    #[test]
    #[should_panic]
    fn side_slot_out_of_range_panics() {
        let node = SquareNode::new([
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
        .unwrap();
        node.edge(4);
    }

    #[test]
    fn opposite_end_of_edge() {
        let edge = SquareEdge {
            a: NodeId(0),
            side_a: 1,
            b: NodeId(3),
            side_b: 3,
            distance: 2.0,
        };
        assert_eq!(edge.opposite(NodeId(0)), Some((NodeId(3), 3)));
        assert_eq!(edge.opposite(NodeId(3)), Some((NodeId(0), 1)));
        assert_eq!(edge.opposite(NodeId(7)), None);
    }
}
