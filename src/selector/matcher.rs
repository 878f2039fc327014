//! Matcher: the traversal leaf.

use crate::node::Node;
use super::ExploredChild;

/// Matches every node it is applied to and explores nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Matcher {
    /// Optional label carried through from the description.
    pub label: Option<String>,
}

impl Matcher {
    /// Matcher with a label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self { label: Some(label.into()) }
    }

    /// Always true.
    pub fn decide(&self, _node: &dyn Node) -> bool {
        true
    }

    /// Always empty.
    pub fn explore(&self, _node: &dyn Node) -> Vec<ExploredChild> {
        Vec::new()
    }
}
