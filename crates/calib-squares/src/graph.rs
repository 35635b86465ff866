use crate::node::{EdgeId, NodeId, SquareEdge, SquareNode};
use crate::params::SquareGraphParams;
use crate::pool::EdgePool;
use crate::SquareGraphError;
use calib_squares_core::{
    acute_angle, add_offset, segment_intersection, side_direction, LineSegment, Quad,
};
use log::{debug, trace};
use nalgebra::Point2;

/// Graph of squares that form a regular grid. Each square can have one edge
/// per side.
///
/// Nodes live in an arena addressed by [`NodeId`]; edges come from an
/// [`EdgePool`] and are addressed by [`EdgeId`]. A live edge is referenced
/// from exactly `a.edges[side_a]` and `b.edges[side_b]`.
#[derive(Clone, Debug, Default)]
pub struct SquareGraph {
    params: SquareGraphParams,
    pub(crate) nodes: Vec<SquareNode>,
    edges: EdgePool,
}

impl SquareGraph {
    /// Graph with unchecked parameters; see [`try_new`](Self::try_new) for
    /// parameters that come from user input.
    pub fn new(params: SquareGraphParams) -> Self {
        Self {
            params,
            nodes: Vec::new(),
            edges: EdgePool::new(),
        }
    }

    /// Graph with validated parameters.
    pub fn try_new(params: SquareGraphParams) -> Result<Self, SquareGraphError> {
        params.validate()?;
        Ok(Self::new(params))
    }

    pub fn params(&self) -> &SquareGraphParams {
        &self.params
    }

    pub fn add_node(&mut self, corners: Quad) -> Result<NodeId, SquareGraphError> {
        let node = SquareNode::new(corners)?;
        self.nodes.push(node);
        Ok(NodeId(self.nodes.len() - 1))
    }

    pub fn add_polygon(&mut self, polygon: &[Point2<f64>]) -> Result<NodeId, SquareGraphError> {
        let node = SquareNode::from_polygon(polygon)?;
        self.nodes.push(node);
        Ok(NodeId(self.nodes.len() - 1))
    }

    pub fn node(&self, id: NodeId) -> &SquareNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[SquareNode] {
        &self.nodes
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// A live edge; `None` once the edge went back to the pool.
    pub fn edge(&self, id: EdgeId) -> Option<&SquareEdge> {
        self.edges.get(id)
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &SquareEdge)> {
        self.edges.iter_live()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.live()
    }

    pub fn pool(&self) -> &EdgePool {
        &self.edges
    }

    /// Node and side connected to `side` of `node`.
    pub fn neighbor(&self, node: NodeId, side: usize) -> Option<(NodeId, usize)> {
        let edge = self.nodes[node.0].edge(side)?;
        self.edges.get(edge)?.opposite(node)
    }

    /// Removes the edge from the two nodes and recycles it.
    ///
    /// # Panics
    /// If the edge is idle or not installed in both of its slots.
    pub fn detach_edge(&mut self, id: EdgeId) {
        let edge = *self
            .edges
            .get(id)
            .unwrap_or_else(|| panic!("detaching edge {} which is not live", id.0));

        for (node, side) in [(edge.a, edge.side_a), (edge.b, edge.side_b)] {
            let slot = &mut self.nodes[node.0].edges[side];
            assert_eq!(
                *slot,
                Some(id),
                "edge {} is not installed on node {} side {}",
                id.0,
                node.0,
                side
            );
            *slot = None;
        }

        self.edges.release(id);
    }

    /// Detach every edge of `node`, e.g. after the square was rejected.
    pub fn isolate_node(&mut self, node: NodeId) {
        for side in 0..4 {
            if let Some(edge) = self.nodes[node.0].edges[side] {
                self.detach_edge(edge);
            }
        }
    }

    /// Drop all nodes and return every live edge to the pool. Pool storage
    /// is kept for the next frame.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.edges.release_all();
    }

    /// Checks whether the two sides can be connected.
    ///
    /// An existing edge on either side is dropped only if it is strictly
    /// longer than `distance`. A new edge is created only when both sides
    /// end up free; its handle is returned.
    ///
    /// # Panics
    /// If a side index is not in `0..4`, both endpoints are the same side of
    /// the same node, or `distance` is NaN.
    pub fn check_connect(
        &mut self,
        a: NodeId,
        side_a: usize,
        b: NodeId,
        side_b: usize,
        distance: f64,
    ) -> Option<EdgeId> {
        assert!(side_a < 4 && side_b < 4, "side index out of range: {side_a}, {side_b}");
        assert!(
            (a, side_a) != (b, side_b),
            "cannot connect node {} side {side_a} to itself",
            a.0
        );
        assert!(!distance.is_nan(), "edge distance is NaN");

        for (node, side) in [(a, side_a), (b, side_b)] {
            if let Some(existing) = self.nodes[node.0].edges[side] {
                let old = self.edges.get(existing).map_or(f64::NEG_INFINITY, |e| e.distance);
                if old > distance {
                    trace!(
                        "replacing edge {} on node {} side {}: {old:.3} > {distance:.3}",
                        existing.0,
                        node.0,
                        side
                    );
                    self.detach_edge(existing);
                }
            }
        }

        if self.nodes[a.0].edges[side_a].is_none() && self.nodes[b.0].edges[side_b].is_none() {
            Some(self.connect(a, side_a, b, side_b, distance))
        } else {
            None
        }
    }

    /// Creates an edge between two free sides. The caller guarantees both
    /// slots are empty.
    pub(crate) fn connect(
        &mut self,
        a: NodeId,
        side_a: usize,
        b: NodeId,
        side_b: usize,
        distance: f64,
    ) -> EdgeId {
        assert!((a, side_a) != (b, side_b), "edge from a side to itself");

        let id = self.edges.acquire(SquareEdge {
            a,
            side_a,
            b,
            side_b,
            distance,
        });
        self.nodes[a.0].edges[side_a] = Some(id);
        self.nodes[b.0].edges[side_b] = Some(id);
        id
    }

    /// First side of `node`, in index order, crossed by `line`, together
    /// with the crossing point.
    ///
    /// `line` is expected to pass through the square, so `None` signals a
    /// geometric anomaly the caller should skip rather than an error. A line
    /// through a corner reports the lower-indexed of the two sides.
    pub fn find_side_intersect(
        &self,
        node: NodeId,
        line: &LineSegment,
    ) -> Option<(usize, Point2<f64>)> {
        let node = &self.nodes[node.0];
        (0..4).find_map(|side| segment_intersection(line, &node.side(side)).map(|p| (side, p)))
    }

    /// True if the two sides are about as parallel as their neighbouring
    /// side pairs. Only the two adjacent pairings are compared.
    pub fn almost_parallel(&self, a: NodeId, side_a: usize, b: NodeId, side_b: usize) -> bool {
        let selected = self.acute_angle(a, side_a, b, side_b);
        let left = self.acute_angle(a, add(side_a, -1), b, add(side_b, 1));
        let right = self.acute_angle(a, add(side_a, 1), b, add(side_b, -1));
        within_parallel_tolerance(selected, left, right, self.params.parallel_tolerance_rad())
    }

    /// Angle in `[0, π/2]` between the slopes of the two sides.
    pub fn acute_angle(&self, a: NodeId, side_a: usize, b: NodeId, side_b: usize) -> f64 {
        let da = side_direction(&self.nodes[a.0].corners, side_a);
        let db = side_direction(&self.nodes[b.0].corners, side_b);
        acute_angle(&da, &db)
    }

    /// Verify that every live edge sits in exactly its two slots and that
    /// no slot refers to an idle edge.
    pub fn is_consistent(&self) -> bool {
        let mut references = 0usize;
        for (n, node) in self.nodes.iter().enumerate() {
            for (side, slot) in node.edges.iter().enumerate() {
                let Some(id) = slot else { continue };
                let Some(edge) = self.edges.get(*id) else {
                    debug!("node {n} side {side} refers to idle edge {}", id.0);
                    return false;
                };
                let owns = (edge.a.0 == n && edge.side_a == side)
                    || (edge.b.0 == n && edge.side_b == side);
                if !owns {
                    debug!("node {n} side {side} holds foreign edge {}", id.0);
                    return false;
                }
                references += 1;
            }
        }

        for (id, edge) in self.edges.iter_live() {
            let installed = |node: NodeId, side: usize| {
                self.nodes.get(node.0).and_then(|n| n.edges[side]) == Some(id)
            };
            if !installed(edge.a, edge.side_a) || !installed(edge.b, edge.side_b) {
                debug!("edge {} is not installed in both slots", id.0);
                return false;
            }
        }

        references == 2 * self.edges.live()
    }
}

/// Accept unless a neighbouring pairing is worse than `selected` by more
/// than `tol`. The boundary itself is accepted.
pub(crate) fn within_parallel_tolerance(selected: f64, left: f64, right: f64, tol: f64) -> bool {
    left <= selected + tol && right <= selected + tol
}

#[inline]
fn add(side: usize, offset: isize) -> usize {
    add_offset(side, offset, 4)
}
