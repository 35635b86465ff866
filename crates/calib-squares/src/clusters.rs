//! Candidate pairing over square centres and connected components of the
//! resulting graph.

use crate::graph::SquareGraph;
use crate::node::NodeId;
use calib_squares_core::LineSegment;
use kiddo::{KdTree, SquaredEuclidean};
use log::{debug, info};
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Counters from one [`SquareGraph::connect_nodes`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConnectStats {
    /// Ordered (node, neighbour) pairs returned by the k-NN search.
    pub candidates: usize,
    /// Pairs whose centres are too far apart for their size.
    pub too_far: usize,
    /// Pairs where the centre line missed a side of either square.
    pub missing_intersection: usize,
    /// Pairs rejected by the near-parallel test.
    pub not_parallel: usize,
    /// Edges created, including ones replaced later in the pass.
    pub connected: usize,
    /// Live edges after the pass.
    pub live_edges: usize,
}

impl SquareGraph {
    /// Connect every square to its grid neighbours.
    ///
    /// For each square, the `nearest_neighbors` closest centres are tested:
    /// the segment between the two centres selects the facing side on each
    /// square, the pairing must pass [`almost_parallel`](Self::almost_parallel),
    /// and [`check_connect`](Self::check_connect) arbitrates with the centre
    /// distance. Each unordered pair is seen twice; the second visit ties and
    /// is a no-op.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self), fields(nodes = self.nodes.len()))
    )]
    pub fn connect_nodes(&mut self) -> ConnectStats {
        let mut stats = ConnectStats::default();
        let n = self.nodes.len();
        if n >= 2 {
            let coords = self
                .nodes
                .iter()
                .map(|node| [node.center.x, node.center.y])
                .collect::<Vec<_>>();
            let tree: KdTree<f64, 2> = (&coords).into();
            let k = (self.params().nearest_neighbors + 1).min(n);

            for (i, query) in coords.iter().enumerate() {
                for nn in tree.nearest_n::<SquaredEuclidean>(query, k) {
                    let j = nn.item as usize;
                    if j == i {
                        continue;
                    }
                    stats.candidates += 1;
                    self.try_pair(NodeId(i), NodeId(j), &mut stats);
                }
            }
        }

        stats.live_edges = self.edge_count();
        info!(
            "connected {} squares: {} live edges from {} candidates ({} too far, {} missed sides, {} not parallel)",
            n,
            stats.live_edges,
            stats.candidates,
            stats.too_far,
            stats.missing_intersection,
            stats.not_parallel
        );
        stats
    }

    fn try_pair(&mut self, a: NodeId, b: NodeId, stats: &mut ConnectStats) {
        let (node_a, node_b) = (self.node(a), self.node(b));
        let distance = (node_b.center - node_a.center).norm();
        let max_distance = self.params().max_center_distance_ratio
            * node_a.largest_side.max(node_b.largest_side);
        if distance > max_distance {
            stats.too_far += 1;
            return;
        }

        let line = LineSegment::new(node_a.center, node_b.center);
        let (Some((side_a, _)), Some((side_b, _))) = (
            self.find_side_intersect(a, &line),
            self.find_side_intersect(b, &line),
        ) else {
            debug!(
                "centre line {} -> {} misses a side, skipping pair",
                a.index(),
                b.index()
            );
            stats.missing_intersection += 1;
            return;
        };

        if !self.almost_parallel(a, side_a, b, side_b) {
            stats.not_parallel += 1;
            return;
        }

        if self.check_connect(a, side_a, b, side_b, distance).is_some() {
            stats.connected += 1;
        }
    }

    /// Node sets of the connected components, each sorted, ordered by their
    /// smallest node.
    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let n = self.nodes.len();
        let mut visited = vec![false; n];
        let mut components = Vec::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }

            let mut component = Vec::new();
            let mut stack = vec![start];
            while let Some(node) = stack.pop() {
                if visited[node] {
                    continue;
                }
                visited[node] = true;
                component.push(NodeId(node));

                for side in 0..4 {
                    if let Some((next, _)) = self.neighbor(NodeId(node), side) {
                        if !visited[next.index()] {
                            stack.push(next.index());
                        }
                    }
                }
            }

            component.sort_unstable();
            components.push(component);
        }

        components
    }
}
