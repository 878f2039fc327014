//! ExploreIndex and ExploreRange: visit list positions.

use std::sync::Arc;

use crate::node::Node;
use crate::types::{PathSegment, ReprKind};
use super::{ExploredChild, Selector, SelectorRef};

fn list_length(node: &dyn Node) -> Option<usize> {
    if node.repr_kind() != ReprKind::List {
        return None;
    }
    usize::try_from(node.length()).ok()
}

/// Explores a single list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExploreIndex {
    index: usize,
    next: SelectorRef,
}

impl ExploreIndex {
    /// Explore `index` with `next`.
    pub fn new(index: usize, next: Selector) -> Self {
        Self { index, next: Arc::new(next) }
    }

    /// Index explored.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Continuation for the element.
    pub fn next(&self) -> &Selector {
        &self.next
    }

    /// Never a match by itself.
    pub fn decide(&self, _node: &dyn Node) -> bool {
        false
    }

    /// The element, if the node is a list long enough to have it.
    pub fn explore(&self, node: &dyn Node) -> Vec<ExploredChild> {
        match list_length(node) {
            Some(len) if self.index < len => vec![ExploredChild::new(
                PathSegment::Index(self.index),
                Selector::clone(&self.next),
            )],
            _ => Vec::new(),
        }
    }
}

/// Explores list indices in `start..end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExploreRange {
    start: usize,
    end: usize,
    next: SelectorRef,
}

impl ExploreRange {
    /// Explore `start..end` (end exclusive) with `next`.
    pub fn new(start: usize, end: usize, next: Selector) -> Self {
        Self { start, end, next: Arc::new(next) }
    }

    /// First index, inclusive.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last index, exclusive.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Continuation for each element.
    pub fn next(&self) -> &Selector {
        &self.next
    }

    /// Never a match by itself.
    pub fn decide(&self, _node: &dyn Node) -> bool {
        false
    }

    /// Elements of the range that exist, ascending. The range is clipped to
    /// the list length.
    pub fn explore(&self, node: &dyn Node) -> Vec<ExploredChild> {
        let Some(len) = list_length(node) else {
            return Vec::new();
        };
        (self.start..self.end.min(len))
            .map(|i| ExploredChild::new(PathSegment::Index(i), Selector::clone(&self.next)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{basic, NodeRef};

    fn numbers(n: i64) -> NodeRef {
        basic::list((0..n).map(basic::int))
    }

    #[test]
    fn test_index_in_range() {
        let sel = ExploreIndex::new(1, Selector::matcher());
        let children = sel.explore(numbers(3).as_ref());
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].segment, PathSegment::Index(1));
    }

    #[test]
    fn test_index_out_of_range_explores_nothing() {
        let sel = ExploreIndex::new(5, Selector::matcher());
        assert!(sel.explore(numbers(3).as_ref()).is_empty());
    }

    #[test]
    fn test_index_on_map_explores_nothing() {
        let sel = ExploreIndex::new(0, Selector::matcher());
        let node = basic::map([("0", basic::int(1))]);
        assert!(sel.explore(node.as_ref()).is_empty());
    }

    #[test]
    fn test_range_is_clipped() {
        let sel = ExploreRange::new(1, 10, Selector::matcher());
        let children = sel.explore(numbers(4).as_ref());
        let idx: Vec<_> = children.iter().map(|c| c.segment.clone()).collect();
        assert_eq!(idx, vec![PathSegment::Index(1), PathSegment::Index(2), PathSegment::Index(3)]);
    }

    #[test]
    fn test_range_past_end_is_empty() {
        let sel = ExploreRange::new(5, 8, Selector::matcher());
        assert!(sel.explore(numbers(4).as_ref()).is_empty());
        assert!(sel.explore(basic::string("abc").as_ref()).is_empty());
    }
}
