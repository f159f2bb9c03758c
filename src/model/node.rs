//! Node in the property graph.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{EdgeId, PropertyMap, PropertyStore};

/// Opaque node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One incident edge as seen from a node: the edge and both of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incidence {
    pub edge: EdgeId,
    pub parent: NodeId,
    pub child: NodeId,
}

#[derive(Debug, Default)]
struct Links {
    /// Incident edges in link order. A self-loop appears once.
    incidences: SmallVec<[Incidence; 4]>,
    /// Edge through which this node was most recently linked as a child.
    linked_via: Option<Incidence>,
}

/// A node in the property graph.
///
/// Nodes are created by `Graph::add_node` and handed out as `Arc<Node>`.
/// The incidence list is written only by the graph's link/unlink protocol.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    properties: PropertyStore,
    links: RwLock<Links>,
}

impl Node {
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            properties: PropertyStore::new(),
            links: RwLock::new(Links::default()),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    pub fn set_property(&self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.set(key, value);
    }

    pub fn remove_property(&self, key: &str) -> Option<String> {
        self.properties.remove(key)
    }

    pub fn get_property(&self, key: &str) -> Option<String> {
        self.properties.get(key)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.has(key)
    }

    pub fn property_map(&self) -> PropertyMap {
        self.properties.snapshot()
    }

    // ========================================================================
    // Neighborhood
    // ========================================================================

    /// Nodes with an edge into this node, one entry per edge.
    pub fn parent_nodes(&self) -> Vec<NodeId> {
        self.scan(|inc| inc.child == self.id, |inc| inc.parent)
    }

    /// Nodes this node has an edge into, one entry per edge.
    pub fn child_nodes(&self) -> Vec<NodeId> {
        self.scan(|inc| inc.parent == self.id, |inc| inc.child)
    }

    /// Edges pointing into this node.
    pub fn parent_edges(&self) -> Vec<EdgeId> {
        self.scan(|inc| inc.child == self.id, |inc| inc.edge)
    }

    /// Edges leaving this node.
    pub fn child_edges(&self) -> Vec<EdgeId> {
        self.scan(|inc| inc.parent == self.id, |inc| inc.edge)
    }

    /// `(parents, children)` link counts. A self-loop counts once on each side.
    pub fn num_links(&self) -> (usize, usize) {
        let links = self.links.read();
        links.incidences.iter().fold((0, 0), |(p, c), inc| {
            (
                p + usize::from(inc.child == self.id),
                c + usize::from(inc.parent == self.id),
            )
        })
    }

    /// All incident edges, in link order.
    pub fn incidences(&self) -> Vec<Incidence> {
        self.links.read().incidences.to_vec()
    }

    /// The parent endpoint of the edge this node was most recently linked
    /// through as a child, while that edge stays linked.
    ///
    /// This is link-time bookkeeping only; shortest-path parents are
    /// reported in `Path` values, never stored here.
    pub fn linked_parent(&self) -> Option<NodeId> {
        self.links.read().linked_via.map(|inc| inc.parent)
    }

    fn scan<T>(&self, keep: impl Fn(&Incidence) -> bool, map: impl Fn(&Incidence) -> T) -> Vec<T> {
        let links = self.links.read();
        links.incidences.iter().filter(|inc| keep(inc)).map(map).collect()
    }

    // ========================================================================
    // Link protocol (Graph only)
    // ========================================================================

    pub(crate) fn add_incidence(&self, inc: Incidence) {
        let mut links = self.links.write();
        links.incidences.push(inc);
        if inc.child == self.id {
            links.linked_via = Some(inc);
        }
    }

    /// No-op when `edge` is not incident to this node.
    pub(crate) fn remove_incidence(&self, edge: EdgeId) {
        let mut links = self.links.write();
        links.incidences.retain(|inc| inc.edge != edge);
        if links.linked_via.is_some_and(|inc| inc.edge == edge) {
            links.linked_via = None;
        }
    }
}
