//! ExploreAll: visit every child.

use std::sync::Arc;

use crate::node::Node;
use super::{child_segments, ExploredChild, Selector, SelectorRef};

/// Explores every entry of a map or element of a list with one continuation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExploreAll {
    next: SelectorRef,
}

impl ExploreAll {
    /// Explore every child with `next`.
    pub fn new(next: Selector) -> Self {
        Self { next: Arc::new(next) }
    }

    /// Continuation applied to each child.
    pub fn next(&self) -> &Selector {
        &self.next
    }

    /// Delegates to the continuation's decision for this node.
    pub fn decide(&self, node: &dyn Node) -> bool {
        self.next.decide(node)
    }

    /// Every child the node reports, in its own order. Scalars have none.
    pub fn explore(&self, node: &dyn Node) -> Vec<ExploredChild> {
        child_segments(node)
            .into_iter()
            .map(|segment| ExploredChild::new(segment, Selector::clone(&self.next)))
            .collect()
    }
}
