//! Square-adjacency graph for grid-based calibration targets.
//!
//! Detected squares (4 ordered corners each) become nodes with one edge slot
//! per side. Connecting them into a grid:
//! 1. Find the nearest square centres with a k-d tree.
//! 2. The segment between two centres selects the facing side of each square.
//! 3. Reject pairings whose neighbouring sides are much less parallel than
//!    the selected ones.
//! 4. Each side keeps only its shortest connection; a longer edge is dropped
//!    when a strictly shorter candidate arrives and both sides are free.
//!
//! Edges are recycled through a free-list pool so a graph rebuilt every
//! frame stops allocating once warm.
//!
//! ```
//! use calib_squares::{SquareGraph, SquareGraphParams};
//! use nalgebra::Point2;
//!
//! let mut graph = SquareGraph::new(SquareGraphParams::default());
//! for i in 0..3 {
//!     let x = i as f64 * 14.0;
//!     graph
//!         .add_node([
//!             Point2::new(x, 0.0),
//!             Point2::new(x + 10.0, 0.0),
//!             Point2::new(x + 10.0, 10.0),
//!             Point2::new(x, 10.0),
//!         ])
//!         .unwrap();
//! }
//! let stats = graph.connect_nodes();
//! assert_eq!(stats.live_edges, 2);
//! assert_eq!(graph.connected_components().len(), 1);
//! ```

mod clusters;
mod error;
mod graph;
mod node;
mod params;
mod pool;

pub use clusters::ConnectStats;
pub use error::SquareGraphError;
pub use graph::SquareGraph;
pub use node::{EdgeId, NodeId, SquareEdge, SquareNode};
pub use params::SquareGraphParams;
pub use pool::EdgePool;

pub use calib_squares_core::{LineSegment, Quad};
