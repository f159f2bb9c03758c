//! Path — a traversal result: cumulative weight plus the edges that got there.

use serde::{Deserialize, Serialize};
use super::{EdgeId, NodeId};

/// One hop of a shortest path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub edge: EdgeId,
    pub parent: NodeId,
    pub child: NodeId,
    /// Increase in tentative distance from `parent` to `child`.
    pub distance: f64,
}

/// A path from a traversal root to `target`: root -[step]-> ... -[step]-> target.
///
/// The root's own path and paths to unreachable nodes have no steps; the
/// latter carry an infinite weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub target: NodeId,
    pub weight: f64,
    pub steps: Vec<PathStep>,
}

impl Path {
    pub fn empty(target: NodeId, weight: f64) -> Self {
        Self { target, weight, steps: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_reachable(&self) -> bool {
        self.weight.is_finite()
    }

    /// First node of the path, `None` for a path without steps.
    pub fn start(&self) -> Option<NodeId> {
        self.steps.first().map(|s| s.parent)
    }

    /// Node ids from the root to the target.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self.steps.iter().map(|s| s.parent).collect();
        out.push(self.target);
        out
    }

    pub fn edges(&self) -> Vec<EdgeId> {
        self.steps.iter().map(|s| s.edge).collect()
    }

    /// Extend a copy of this path by one hop to `step.child`.
    pub fn extended(&self, step: PathStep, weight: f64) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(step);
        Self { target: step.child, weight, steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_leaves_base_untouched() {
        let root = Path::empty(NodeId(1), 0.0);
        let step = PathStep { edge: EdgeId(5), parent: NodeId(1), child: NodeId(2), distance: 1.5 };
        let next = root.extended(step, 1.5);

        assert!(root.is_empty());
        assert_eq!(next.len(), 1);
        assert_eq!(next.target, NodeId(2));
        assert_eq!(next.start(), Some(NodeId(1)));
        assert_eq!(next.nodes(), vec![NodeId(1), NodeId(2)]);
        assert_eq!(next.edges(), vec![EdgeId(5)]);
    }

    #[test]
    fn test_unreachable() {
        let p = Path::empty(NodeId(3), f64::INFINITY);
        assert!(!p.is_reachable());
        assert_eq!(p.nodes(), vec![NodeId(3)]);
    }
}
