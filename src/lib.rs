//! # weightgraph — In-Memory Property Graph with Shortest Paths
//!
//! A mutable, directed property graph that keeps everything in memory,
//! plus a Dijkstra engine driven by an indexed binary min-heap.
//!
//! ## Design Principles
//!
//! 1. **Arena + ids**: the `Graph` owns every node and edge; callers hold
//!    `NodeId` / `EdgeId` handles, never references into the graph
//! 2. **Entity-local locks**: each node, edge and property store has its own
//!    `RwLock`; the only multi-entity section (linking) locks edge before node
//! 3. **Traversals own their state**: tentative distances, heap slots and
//!    parent pointers live in side arrays, so searches never mutate the graph
//!
//! ## Quick Start
//!
//! ```rust
//! use weightgraph::Graph;
//!
//! # fn example() -> weightgraph::Result<()> {
//! let graph = Graph::new("people");
//! let tom = graph.add_node("1", "Tom")?;
//! let bob = graph.add_node("2", "Bob")?;
//! graph.add_edge("e1", "knows", 1.0, tom, bob)?;
//!
//! assert_eq!(graph.distance(tom, bob)?, 1.0);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod graph;
pub mod search;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    Node, NodeId, Incidence,
    Edge, EdgeId,
    Path, PathStep,
    PropertyStore, PropertyMap,
};

pub use graph::{Graph, GraphConfig};

pub use search::{distance, search, filter_path, IndexedMinHeap};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    #[error("Negative edge length: edge {edge} has distance {distance}")]
    NegativeEdgeLength { edge: EdgeId, distance: f64 },

    #[error("Node {finish} is not reachable from node {start}")]
    Unreachable { start: NodeId, finish: NodeId },
}

pub type Result<T> = std::result::Result<T, Error>;
