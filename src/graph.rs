//! # Graph — the owning container
//!
//! The `Graph` owns every node and edge in an id-addressed arena and is the
//! only place cross-entity work happens: linking, unlinking and cascade
//! removal.
//!
//! ## Locking
//!
//! - One `RwLock` over the arena (node order + node and edge maps).
//!   Structural mutations take it exclusively, lookups and traversal
//!   snapshots share it.
//! - One lock per node (incidence list), per edge (endpoints + distance)
//!   and per property store.
//! - Acquisition order is always arena → edge → node, and at most one
//!   entity lock is held at a time. Property store locks are leaves.
//!
//! Property writes only touch the entity's own store, so they never wait
//! on the arena lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::model::*;
use crate::search::{OutEdge, Topology};
use crate::{Error, Result};

// ============================================================================
// Configuration
// ============================================================================

/// Construction-time settings for a `Graph`.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Identifying label.
    pub label: String,
    /// Expected number of nodes; pre-sizes the arena.
    pub node_capacity: usize,
    /// Expected number of edges; pre-sizes the arena.
    pub edge_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            label: "graph".to_string(),
            node_capacity: 0,
            edge_capacity: 0,
        }
    }
}

impl GraphConfig {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_node_capacity(mut self, n: usize) -> Self {
        self.node_capacity = n;
        self
    }

    pub fn with_edge_capacity(mut self, n: usize) -> Self {
        self.edge_capacity = n;
        self
    }
}

// ============================================================================
// Graph
// ============================================================================

/// In-memory directed property graph.
pub struct Graph {
    config: GraphConfig,
    inner: RwLock<GraphInner>,
    next_node_id: AtomicU64,
    next_edge_id: AtomicU64,
}

struct GraphInner {
    /// Insertion order; a node's index here is its sequence index.
    order: Vec<NodeId>,
    nodes: HashMap<NodeId, Arc<Node>>,
    edges: HashMap<EdgeId, Arc<Edge>>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Graph")
            .field("label", &self.config.label)
            .field("nodes", &inner.order.len())
            .field("edges", &inner.edges.len())
            .finish()
    }
}

impl Graph {
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_config(GraphConfig::default().with_label(label))
    }

    pub fn with_config(config: GraphConfig) -> Self {
        let inner = GraphInner {
            order: Vec::with_capacity(config.node_capacity),
            nodes: HashMap::with_capacity(config.node_capacity),
            edges: HashMap::with_capacity(config.edge_capacity),
        };
        Self {
            config,
            inner: RwLock::new(inner),
            next_node_id: AtomicU64::new(1),
            next_edge_id: AtomicU64::new(1),
        }
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn num_nodes(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn num_edges(&self) -> usize {
        self.inner.read().edges.len()
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.inner.read().order.clone()
    }

    /// Edge ids in creation order.
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self.inner.read().edges.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn node(&self, id: NodeId) -> Option<Arc<Node>> {
        self.inner.read().nodes.get(&id).cloned()
    }

    pub fn edge(&self, id: EdgeId) -> Option<Arc<Edge>> {
        self.inner.read().edges.get(&id).cloned()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.inner.read().nodes.contains_key(&id)
    }

    /// Current sequence index of `id` in the node order.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.inner.read().order.iter().position(|n| *n == id)
    }

    // ========================================================================
    // Node CRUD
    // ========================================================================

    /// Create a node stamped with `id` and `name` properties.
    pub fn add_node(&self, id: &str, name: &str) -> Result<NodeId> {
        require_id_and_name(id, name)?;

        let node_id = NodeId(self.next_node_id.fetch_add(1, Ordering::Relaxed));
        let node = Node::new(node_id);
        node.set_property("id", id);
        node.set_property("name", name);

        let mut inner = self.inner.write();
        inner.order.push(node_id);
        inner.nodes.insert(node_id, Arc::new(node));
        debug!(graph = %self.config.label, node = %node_id, id, name, "added node");

        Ok(node_id)
    }

    /// Remove a node, unlinking every incident edge first.
    ///
    /// Returns false when the node is not in this graph.
    pub fn remove_node(&self, id: NodeId) -> bool {
        let mut inner = self.inner.write();
        let Some(node) = inner.nodes.get(&id).cloned() else {
            return false;
        };

        let incidences = node.incidences();
        for inc in &incidences {
            inner.unlink_edge(inc.edge);
        }

        if let Some(pos) = inner.order.iter().position(|n| *n == id) {
            inner.order.remove(pos);
        }
        inner.nodes.remove(&id);
        debug!(graph = %self.config.label, node = %id, edges = incidences.len(), "removed node");

        true
    }

    // ========================================================================
    // Edge CRUD
    // ========================================================================

    /// Create an edge stamped with `id` and `name`, apply `set_weight(weight)`
    /// and link it from `parent` to `child`.
    pub fn add_edge(
        &self,
        id: &str,
        name: &str,
        weight: f64,
        parent: NodeId,
        child: NodeId,
    ) -> Result<EdgeId> {
        require_id_and_name(id, name)?;

        let mut inner = self.inner.write();
        for n in [parent, child] {
            if !inner.nodes.contains_key(&n) {
                return Err(Error::NodeNotFound(n));
            }
        }

        let edge = Arc::new(self.build_edge(id, name));
        edge.set_weight(weight);
        inner.link_edge(&edge, parent, child)?;
        inner.edges.insert(edge.id(), Arc::clone(&edge));
        debug!(
            graph = %self.config.label, edge = %edge.id(), %parent, %child,
            distance = edge.distance(), "added edge"
        );

        Ok(edge.id())
    }

    /// Create an edge with no endpoints. It is not traversable until linked.
    pub fn new_edge(&self, id: &str, name: &str) -> Result<EdgeId> {
        require_id_and_name(id, name)?;

        let edge = self.build_edge(id, name);
        let edge_id = edge.id();
        self.inner.write().edges.insert(edge_id, Arc::new(edge));
        Ok(edge_id)
    }

    /// Connect a detached edge from `parent` to `child`.
    pub fn link(&self, edge: EdgeId, parent: NodeId, child: NodeId) -> Result<()> {
        let inner = self.inner.write();
        let e = inner.edges.get(&edge).cloned().ok_or(Error::EdgeNotFound(edge))?;
        inner.link_edge(&e, parent, child)?;
        debug!(graph = %self.config.label, %edge, %parent, %child, "linked edge");
        Ok(())
    }

    /// Detach an edge from both endpoints and drop it from the graph.
    ///
    /// Works for edges missing one or both endpoints.
    pub fn unlink(&self, edge: EdgeId) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.unlink_edge(edge) {
            return Err(Error::EdgeNotFound(edge));
        }
        debug!(graph = %self.config.label, %edge, "unlinked edge");
        Ok(())
    }

    fn build_edge(&self, id: &str, name: &str) -> Edge {
        let edge = Edge::new(EdgeId(self.next_edge_id.fetch_add(1, Ordering::Relaxed)));
        edge.set_property("id", id);
        edge.set_property("name", name);
        edge
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn get_node_by_id(&self, id: &str) -> Option<NodeId> {
        self.get_node_by_property("id", id)
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.get_node_by_property("name", name)
    }

    /// First node, in insertion order, whose `key` property equals `value`.
    pub fn get_node_by_property(&self, key: &str, value: &str) -> Option<NodeId> {
        if key.is_empty() || value.is_empty() {
            return None;
        }
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .copied()
            .find(|id| inner.nodes.get(id).is_some_and(|n| n.properties().matches(key, value)))
    }

    // ========================================================================
    // Property passthroughs
    // ========================================================================

    pub fn set_node_property(&self, id: NodeId, key: &str, value: &str) -> Result<()> {
        let node = self.node(id).ok_or(Error::NodeNotFound(id))?;
        node.set_property(key, value);
        Ok(())
    }

    /// `None` for a missing node or a missing key.
    pub fn node_property(&self, id: NodeId, key: &str) -> Option<String> {
        self.node(id)?.get_property(key)
    }

    pub fn set_edge_property(&self, id: EdgeId, key: &str, value: &str) -> Result<()> {
        let edge = self.edge(id).ok_or(Error::EdgeNotFound(id))?;
        edge.set_property(key, value);
        Ok(())
    }

    /// `None` for a missing edge or a missing key.
    pub fn edge_property(&self, id: EdgeId, key: &str) -> Option<String> {
        self.edge(id)?.get_property(key)
    }

    // ========================================================================
    // Traversal snapshot
    // ========================================================================

    /// Capture node order and outgoing linked edges for one traversal.
    ///
    /// Edge distances are read once here; later weight changes do not
    /// affect a traversal already in flight.
    pub(crate) fn topology(&self) -> Topology {
        let inner = self.inner.read();
        let position: HashMap<NodeId, usize> =
            inner.order.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let outgoing: Vec<Vec<OutEdge>> = inner
            .order
            .iter()
            .map(|id| {
                let Some(node) = inner.nodes.get(id) else {
                    return Vec::new();
                };
                node.incidences()
                    .into_iter()
                    .filter(|inc| inc.parent == *id)
                    .filter_map(|inc| {
                        let edge = inner.edges.get(&inc.edge)?;
                        Some(OutEdge {
                            edge: inc.edge,
                            child: *position.get(&inc.child)?,
                            distance: edge.distance(),
                        })
                    })
                    .collect()
            })
            .collect();

        Topology::new(inner.order.clone(), outgoing)
    }
}

impl GraphInner {
    /// Caller holds the arena lock exclusively.
    fn link_edge(&self, edge: &Edge, parent: NodeId, child: NodeId) -> Result<()> {
        let p = self.nodes.get(&parent).ok_or(Error::NodeNotFound(parent))?;
        let c = self.nodes.get(&child).ok_or(Error::NodeNotFound(child))?;

        if !edge.attach(parent, child) {
            return Err(Error::InvalidArgument(format!("edge {} is already linked", edge.id())));
        }

        let inc = Incidence { edge: edge.id(), parent, child };
        p.add_incidence(inc);
        if parent != child {
            c.add_incidence(inc);
        }
        Ok(())
    }

    /// Returns false when the edge is not in the arena.
    fn unlink_edge(&mut self, edge: EdgeId) -> bool {
        let Some(e) = self.edges.remove(&edge) else {
            return false;
        };
        let (parent, child) = e.detach();
        for n in parent.into_iter().chain(child) {
            if let Some(node) = self.nodes.get(&n) {
                node.remove_incidence(edge);
            }
        }
        true
    }
}

fn require_id_and_name(id: &str, name: &str) -> Result<()> {
    if id.is_empty() || name.is_empty() {
        return Err(Error::Validation("id and name required".into()));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
