//! ExploreUnion: several selectors at once.

use std::collections::HashMap;
use std::sync::Arc;

use crate::node::Node;
use super::{ExploredChild, Selector};

/// Combines member selectors.
///
/// - `decide` is the logical OR of the members.
/// - `explore` is the union of the members' children. When two members
///   target the same child, the later member's continuation wins; the child
///   keeps the position where it was first produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExploreUnion {
    members: Arc<[Selector]>,
}

impl ExploreUnion {
    /// Union of `members`, in order.
    pub fn new(members: impl IntoIterator<Item = Selector>) -> Self {
        Self { members: members.into_iter().collect() }
    }

    /// Members in order.
    pub fn members(&self) -> &[Selector] {
        &self.members
    }

    /// True if any member matches.
    pub fn decide(&self, node: &dyn Node) -> bool {
        self.members.iter().any(|m| m.decide(node))
    }

    /// Merged children of every member.
    pub fn explore(&self, node: &dyn Node) -> Vec<ExploredChild> {
        let mut merged: Vec<ExploredChild> = Vec::new();
        let mut positions = HashMap::new();
        for member in self.members.iter() {
            for child in member.explore(node) {
                match positions.get(&child.segment) {
                    Some(&pos) => {
                        let slot: &mut ExploredChild = &mut merged[pos];
                        slot.selector = child.selector;
                    }
                    None => {
                        positions.insert(child.segment.clone(), merged.len());
                        merged.push(child);
                    }
                }
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::basic;
    use crate::types::PathSegment;

    #[test]
    fn test_decide_is_or() {
        let node = basic::int(1);
        let none = ExploreUnion::new([Selector::explore_fields([("a", Selector::matcher())])]);
        assert!(!none.decide(node.as_ref()));
        let some = ExploreUnion::new([
            Selector::explore_fields([("a", Selector::matcher())]),
            Selector::matcher(),
        ]);
        assert!(some.decide(node.as_ref()));
    }

    #[test]
    fn test_explore_is_set_union() {
        let node = basic::map([("a", basic::int(1)), ("b", basic::int(2)), ("c", basic::int(3))]);
        let sel = ExploreUnion::new([
            Selector::explore_fields([("a", Selector::matcher())]),
            Selector::explore_fields([("c", Selector::matcher())]),
        ]);
        let segs: Vec<_> = sel.explore(node.as_ref()).into_iter().map(|c| c.segment).collect();
        assert_eq!(segs, vec![PathSegment::parse("a"), PathSegment::parse("c")]);
    }

    #[test]
    fn test_same_child_last_writer_wins() {
        let node = basic::map([("a", basic::list([basic::int(1)])), ("b", basic::int(2))]);
        let later = Selector::explore_all(Selector::matcher());
        let sel = ExploreUnion::new([
            Selector::explore_fields([("a", Selector::matcher()), ("b", Selector::matcher())]),
            Selector::explore_fields([("a", later.clone())]),
        ]);
        let children = sel.explore(node.as_ref());
        assert_eq!(children.len(), 2);
        // "a" keeps first position but takes the later continuation
        assert_eq!(children[0].segment, PathSegment::parse("a"));
        assert_eq!(children[0].selector, later);
        assert_eq!(children[1].segment, PathSegment::parse("b"));
        assert_eq!(children[1].selector, Selector::matcher());

        // reversing member order flips the winner
        let reversed = ExploreUnion::new([
            Selector::explore_fields([("a", later.clone())]),
            Selector::explore_fields([("a", Selector::matcher())]),
        ]);
        assert_eq!(reversed.explore(node.as_ref())[0].selector, Selector::matcher());
    }
}
