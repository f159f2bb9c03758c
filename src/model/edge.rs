//! Edge (directed, weighted link) in the property graph.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::{NodeId, PropertyMap, PropertyStore};

/// Opaque edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
struct EdgeState {
    parent: Option<NodeId>,
    child: Option<NodeId>,
    distance: f64,
}

/// A directed edge from a parent (source) node to a child (target) node.
///
/// `distance` is never negative. An edge missing either endpoint is not
/// linked and never traversed.
#[derive(Debug)]
pub struct Edge {
    id: EdgeId,
    properties: PropertyStore,
    state: RwLock<EdgeState>,
}

impl Edge {
    pub(crate) fn new(id: EdgeId) -> Self {
        Self {
            id,
            properties: PropertyStore::new(),
            state: RwLock::new(EdgeState::default()),
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.state.read().parent
    }

    pub fn child(&self) -> Option<NodeId> {
        self.state.read().child
    }

    /// `(parent, child)` when both endpoints are set.
    pub fn endpoints(&self) -> Option<(NodeId, NodeId)> {
        let state = self.state.read();
        state.parent.zip(state.child)
    }

    pub fn is_linked(&self) -> bool {
        self.endpoints().is_some()
    }

    pub fn distance(&self) -> f64 {
        self.state.read().distance
    }

    /// Store `|v|`; NaN stores 0.
    pub fn set_distance(&self, v: f64) {
        self.state.write().distance = clamp_distance(v);
    }

    /// Store the distance for weight `w`, i.e. `|1 / w|`.
    ///
    /// Weight is the inverse of cost: a heavier edge is a shorter one.
    /// `w == 0` and NaN store a distance of 0.
    pub fn set_weight(&self, w: f64) {
        self.state.write().distance = weight_to_distance(w);
    }

    // ========================================================================
    // Properties
    // ========================================================================

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
    // Link protocol (Graph only)
    // ========================================================================

    /// Record both endpoints. Returns false, leaving the edge untouched,
    /// when it already has an endpoint.
    pub(crate) fn attach(&self, parent: NodeId, child: NodeId) -> bool {
        let mut state = self.state.write();
        if state.parent.is_some() || state.child.is_some() {
            return false;
        }
        state.parent = Some(parent);
        state.child = Some(child);
        true
    }

    /// Clear both endpoints, returning whatever was set.
    pub(crate) fn detach(&self) -> (Option<NodeId>, Option<NodeId>) {
        let mut state = self.state.write();
        (state.parent.take(), state.child.take())
    }
}

pub(crate) fn clamp_distance(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.abs() }
}

pub(crate) fn weight_to_distance(w: f64) -> f64 {
    if w == 0.0 || w.is_nan() { 0.0 } else { (1.0 / w).abs() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_set_weight_inverts() {
        let e = Edge::new(EdgeId(1));
        e.set_weight(4.0);
        assert_eq!(e.distance(), 0.25);
        e.set_weight(-0.5);
        assert_eq!(e.distance(), 2.0);
    }

    #[test]
    fn test_zero_and_nan_weight_store_zero() {
        let e = Edge::new(EdgeId(1));
        e.set_weight(0.0);
        assert_eq!(e.distance(), 0.0);
        e.set_distance(3.0);
        e.set_weight(f64::NAN);
        assert_eq!(e.distance(), 0.0);
    }

    #[test]
    fn test_set_distance_clamps() {
        let e = Edge::new(EdgeId(1));
        e.set_distance(-7.5);
        assert_eq!(e.distance(), 7.5);
        e.set_distance(f64::NAN);
        assert_eq!(e.distance(), 0.0);
    }

    #[test]
    fn test_attach_detach() {
        let e = Edge::new(EdgeId(1));
        assert!(!e.is_linked());
        assert!(e.attach(NodeId(1), NodeId(2)));
        assert_eq!(e.endpoints(), Some((NodeId(1), NodeId(2))));
        assert!(!e.attach(NodeId(3), NodeId(4)));
        assert_eq!(e.detach(), (Some(NodeId(1)), Some(NodeId(2))));
        assert_eq!(e.detach(), (None, None));
    }

    proptest! {
        #[test]
        fn prop_set_distance_never_negative(v in any::<f64>()) {
            let e = Edge::new(EdgeId(1));
            e.set_distance(v);
            let d = e.distance();
            prop_assert!(d >= 0.0);
            if v.is_nan() {
                prop_assert_eq!(d, 0.0);
            } else {
                prop_assert_eq!(d, v.abs());
            }
        }

        #[test]
        fn prop_set_weight_is_abs_reciprocal(w in any::<f64>()) {
            let e = Edge::new(EdgeId(1));
            e.set_weight(w);
            if w == 0.0 || w.is_nan() {
                prop_assert_eq!(e.distance(), 0.0);
            } else {
                prop_assert_eq!(e.distance(), (1.0 / w).abs());
            }
        }
    }
}
