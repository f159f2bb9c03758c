//! # Shortest-Path Engine
//!
//! Dijkstra over a snapshot of the graph, driven by `IndexedMinHeap`.
//!
//! ## Traversal state
//!
//! Each call captures a `Topology` (node order plus outgoing linked edges
//! with their distances) under a shared arena lock, then works on its own
//! side arrays indexed by node position:
//!
//! | Array | Meaning |
//! |-------|---------|
//! | `dist` | tentative distance from the source, `INFINITY` until reached |
//! | `parent` | `(position, edge)` the node was last improved through |
//! | heap slot | inside `IndexedMinHeap`; `None` once the node is final |
//!
//! Nothing on `Node` or `Edge` is written, so any number of traversals may
//! run over the same `&Graph` at once. Weight changes made after the
//! snapshot are not seen by that traversal.
//!
//! All edge distances must be non-negative. `Edge` setters already clamp,
//! but the relaxation step still rejects any edge that would lower a
//! tentative distance.

mod heap;

pub use heap::IndexedMinHeap;

use tracing::{debug, trace, warn};

use crate::graph::Graph;
use crate::model::{EdgeId, NodeId, Path, PathStep};
use crate::{Error, Result};

// ============================================================================
// Topology snapshot
// ============================================================================

/// An outgoing, linked edge as seen by a traversal.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutEdge {
    pub edge: EdgeId,
    /// Position of the child node in `Topology::order`.
    pub child: usize,
    pub distance: f64,
}

/// Node order and adjacency captured at traversal start.
#[derive(Debug, Clone)]
pub(crate) struct Topology {
    order: Vec<NodeId>,
    outgoing: Vec<Vec<OutEdge>>,
}

impl Topology {
    pub(crate) fn new(order: Vec<NodeId>, outgoing: Vec<Vec<OutEdge>>) -> Self {
        debug_assert_eq!(order.len(), outgoing.len());
        Self { order, outgoing }
    }

    fn position(&self, id: NodeId) -> Result<usize> {
        self.order
            .iter()
            .position(|n| *n == id)
            .ok_or(Error::NodeNotFound(id))
    }
}

// ============================================================================
// Dijkstra state machine
// ============================================================================

struct Traversal<'t> {
    topo: &'t Topology,
    dist: Vec<f64>,
    parent: Vec<Option<(usize, EdgeId)>>,
    heap: IndexedMinHeap<f64>,
}

impl<'t> Traversal<'t> {
    fn start(topo: &'t Topology, source: usize) -> Self {
        let n = topo.order.len();
        let mut dist = vec![f64::INFINITY; n];
        dist[source] = 0.0;
        let heap = IndexedMinHeap::from_keys(dist.iter().copied());
        Self { topo, dist, parent: vec![None; n], heap }
    }

    /// Pop the closest queued node and relax its outgoing edges.
    /// `None` once the heap is drained.
    fn step(&mut self) -> Result<Option<usize>> {
        let Some((u, du)) = self.heap.pop() else {
            return Ok(None);
        };
        let topo = self.topo;
        trace!(node = %topo.order[u], dist = du, remaining = self.heap.len(), "pop");

        if du.is_infinite() {
            return Ok(Some(u));
        }

        for out in &topo.outgoing[u] {
            let candidate = du + out.distance;
            // Also rejects NaN.
            if !(candidate >= du) {
                warn!(edge = %out.edge, distance = out.distance, "negative edge length");
                return Err(Error::NegativeEdgeLength { edge: out.edge, distance: out.distance });
            }
            let v = out.child;
            if self.heap.contains(v) && candidate < self.dist[v] {
                self.dist[v] = candidate;
                self.parent[v] = Some((u, out.edge));
                self.heap.decrease_key(v, candidate);
            }
        }

        Ok(Some(u))
    }
}

fn shortest_distance(topo: &Topology, start: NodeId, finish: NodeId) -> Result<f64> {
    let s = topo.position(start)?;
    let f = topo.position(finish)?;

    let mut t = Traversal::start(topo, s);
    while let Some(u) = t.step()? {
        if u == f {
            let d = t.dist[u];
            if d.is_infinite() {
                break;
            }
            return Ok(d);
        }
        if t.dist[u].is_infinite() {
            // Everything still queued is unreachable too.
            break;
        }
    }

    Err(Error::Unreachable { start, finish })
}

fn shortest_path_tree(topo: &Topology, root: NodeId) -> Result<Vec<Path>> {
    let r = topo.position(root)?;

    let mut t = Traversal::start(topo, r);
    let mut paths: Vec<Option<Path>> = vec![None; topo.order.len()];

    while let Some(u) = t.step()? {
        let target = topo.order[u];
        let weight = t.dist[u];
        let path = match t.parent[u] {
            Some((p, edge)) => {
                let step = PathStep {
                    edge,
                    parent: topo.order[p],
                    child: target,
                    distance: weight - t.dist[p],
                };
                // A parent is always popped before the nodes it improves.
                match &paths[p] {
                    Some(base) => base.extended(step, weight),
                    None => Path::empty(topo.order[p], t.dist[p]).extended(step, weight),
                }
            }
            None => Path::empty(target, weight),
        };
        paths[u] = Some(path);
    }

    Ok(paths.into_iter().flatten().collect())
}

// ============================================================================
// Public API
// ============================================================================

/// Weight of the shortest path from `start` to `finish`.
///
/// Stops as soon as `finish` is finalized. Fails with `Unreachable` when no
/// path exists and with `NegativeEdgeLength` when a negative edge is met
/// before that.
pub fn distance(graph: &Graph, start: NodeId, finish: NodeId) -> Result<f64> {
    let topo = graph.topology();
    let d = shortest_distance(&topo, start, finish)?;
    debug!(graph = graph.label(), %start, %finish, distance = d, "distance");
    Ok(d)
}

/// Shortest path from `root` to every node, one `Path` per node in graph
/// order. The root and unreachable nodes get paths without steps; the
/// unreachable ones weigh `f64::INFINITY`.
pub fn search(graph: &Graph, root: NodeId) -> Result<Vec<Path>> {
    let topo = graph.topology();
    let paths = shortest_path_tree(&topo, root)?;
    debug!(
        graph = graph.label(), %root,
        reachable = paths.iter().filter(|p| p.is_reachable()).count(),
        "search"
    );
    Ok(paths)
}

/// Keep the paths `predicate` accepts. An empty input is a validation error.
pub fn filter_path<F>(paths: &[Path], predicate: F) -> Result<Vec<Path>>
where
    F: Fn(&Path) -> bool,
{
    if paths.is_empty() {
        return Err(Error::Validation("paths required".into()));
    }
    Ok(paths.iter().filter(|p| predicate(p)).cloned().collect())
}

impl Graph {
    /// See [`distance`].
    pub fn distance(&self, start: NodeId, finish: NodeId) -> Result<f64> {
        distance(self, start, finish)
    }

    /// See [`search`].
    pub fn search(&self, root: NodeId) -> Result<Vec<Path>> {
        search(self, root)
    }

    /// See [`filter_path`].
    pub fn filter_path<F>(&self, paths: &[Path], predicate: F) -> Result<Vec<Path>>
    where
        F: Fn(&Path) -> bool,
    {
        filter_path(paths, predicate)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn out(edge: u64, child: usize, distance: f64) -> OutEdge {
        OutEdge { edge: EdgeId(edge), child, distance }
    }

    /// 0 -> 1 (1.0), 1 -> 2 (-5.0)
    fn negative_chain() -> Topology {
        Topology::new(
            vec![NodeId(1), NodeId(2), NodeId(3)],
            vec![vec![out(1, 1, 1.0)], vec![out(2, 2, -5.0)], vec![]],
        )
    }

    #[test]
    fn test_negative_edge_on_frontier() {
        let topo = negative_chain();
        assert_eq!(
            shortest_distance(&topo, NodeId(1), NodeId(3)),
            Err(Error::NegativeEdgeLength { edge: EdgeId(2), distance: -5.0 }),
        );
        assert!(matches!(
            shortest_path_tree(&topo, NodeId(1)),
            Err(Error::NegativeEdgeLength { .. })
        ));
    }

    #[test]
    fn test_negative_edge_off_frontier_is_not_seen() {
        // The target pops before the negative edge's tail is relaxed.
        let topo = negative_chain();
        assert_eq!(shortest_distance(&topo, NodeId(1), NodeId(1)), Ok(0.0));
    }

    #[test]
    fn test_nan_edge_is_rejected() {
        let topo = Topology::new(vec![NodeId(1), NodeId(2)], vec![vec![out(1, 1, f64::NAN)], vec![]]);
        assert!(matches!(
            shortest_distance(&topo, NodeId(1), NodeId(2)),
            Err(Error::NegativeEdgeLength { .. })
        ));
    }

    #[test]
    fn test_unknown_endpoints() {
        let topo = negative_chain();
        assert_eq!(shortest_distance(&topo, NodeId(9), NodeId(1)), Err(Error::NodeNotFound(NodeId(9))));
        assert_eq!(shortest_path_tree(&topo, NodeId(9)), Err(Error::NodeNotFound(NodeId(9))));
    }

    #[test]
    fn test_tree_step_distances_are_deltas() {
        // 0 -> 1 (2.0), 1 -> 2 (3.0), 0 -> 2 (10.0)
        let topo = Topology::new(
            vec![NodeId(1), NodeId(2), NodeId(3)],
            vec![vec![out(1, 1, 2.0), out(3, 2, 10.0)], vec![out(2, 2, 3.0)], vec![]],
        );
        let paths = shortest_path_tree(&topo, NodeId(1)).unwrap();
        assert_eq!(paths.len(), 3);

        let to_c = &paths[2];
        assert_eq!(to_c.weight, 5.0);
        assert_eq!(to_c.edges(), vec![EdgeId(1), EdgeId(2)]);
        assert_eq!(to_c.steps[1].distance, 3.0);
    }

    #[test]
    fn test_filter_path_validation() {
        assert!(matches!(filter_path(&[], |_| true), Err(Error::Validation(_))));
        let paths = vec![Path::empty(NodeId(1), 0.0)];
        assert_eq!(filter_path(&paths, |_| false), Ok(vec![]));
        assert_eq!(filter_path(&paths, |p| p.weight == 0.0).unwrap().len(), 1);
    }
}
