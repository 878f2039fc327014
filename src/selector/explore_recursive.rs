//! ExploreRecursive: repeat a sequence down the tree.
//!
//! The sequence contains one or more [`Selector::RecursiveEdge`] markers. The
//! edge is never unrolled ahead of time: when exploring a node yields a child
//! whose continuation is (or contains, through a union) the edge, the edge is
//! swapped for a fresh copy of the sequence at that moment and the remaining
//! depth drops by one. When no depth remains the edge is dropped instead,
//! which ends the recursion along that branch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::node::Node;
use super::{ExploreUnion, ExploredChild, Selector, SelectorRef};

/// How many times a recursive selector may re-enter its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecursionLimit {
    /// At most this many re-entries below the node the selector starts on.
    Depth(u64),
    /// No bound. Termination then relies on the data being finite.
    None,
}

impl RecursionLimit {
    /// Limit after one more re-entry, or `None` when exhausted.
    fn descend(self) -> Option<Self> {
        match self {
            Self::Depth(0) => None,
            Self::Depth(n) => Some(Self::Depth(n - 1)),
            Self::None => Some(Self::None),
        }
    }

    /// Whether the limit is a finite depth.
    pub fn is_bounded(&self) -> bool {
        matches!(self, Self::Depth(_))
    }
}

/// Recursive exploration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExploreRecursive {
    sequence: SelectorRef,
    current: SelectorRef,
    limit: RecursionLimit,
}

impl ExploreRecursive {
    /// Recurse through `sequence` within `limit`.
    pub fn new(limit: RecursionLimit, sequence: Selector) -> Self {
        let sequence = Arc::new(sequence);
        Self {
            current: Arc::clone(&sequence),
            sequence,
            limit,
        }
    }

    /// The repeated sequence.
    pub fn sequence(&self) -> &Selector {
        &self.sequence
    }

    /// Step of the sequence applied to the current node.
    pub fn current(&self) -> &Selector {
        &self.current
    }

    /// Remaining limit.
    pub fn limit(&self) -> RecursionLimit {
        self.limit
    }

    /// Decision of the current step.
    pub fn decide(&self, node: &dyn Node) -> bool {
        self.current.decide(node)
    }

    /// Children of the current step, each wrapped so recursion continues.
    pub fn explore(&self, node: &dyn Node) -> Vec<ExploredChild> {
        self.current
            .explore(node)
            .into_iter()
            .filter_map(|child| {
                let next = self.advance(child.selector)?;
                Some(ExploredChild::new(child.segment, Selector::ExploreRecursive(next)))
            })
            .collect()
    }

    fn advance(&self, next: Selector) -> Option<ExploreRecursive> {
        if !has_edge(&next) {
            return Some(Self {
                sequence: Arc::clone(&self.sequence),
                current: Arc::new(next),
                limit: self.limit,
            });
        }
        match self.limit.descend() {
            Some(limit) => {
                let replaced = replace_edge(next, Some(&self.sequence))?;
                Some(Self {
                    sequence: Arc::clone(&self.sequence),
                    current: Arc::new(replaced),
                    limit,
                })
            }
            None => {
                let replaced = replace_edge(next, None)?;
                Some(Self {
                    sequence: Arc::clone(&self.sequence),
                    current: Arc::new(replaced),
                    limit: self.limit,
                })
            }
        }
    }
}

/// Whether `selector` is the edge or a union holding it at its top level.
fn has_edge(selector: &Selector) -> bool {
    match selector {
        Selector::RecursiveEdge => true,
        Selector::ExploreUnion(u) => u.members().iter().any(has_edge),
        _ => false,
    }
}

/// Swap top-level edges for `replacement`, or drop them when there is none.
/// Returns `None` when nothing is left.
fn replace_edge(selector: Selector, replacement: Option<&Selector>) -> Option<Selector> {
    match selector {
        Selector::RecursiveEdge => replacement.cloned(),
        Selector::ExploreUnion(u) => {
            let mut members: Vec<Selector> = u
                .members()
                .iter()
                .filter_map(|m| replace_edge(m.clone(), replacement))
                .collect();
            match members.len() {
                0 => None,
                1 => members.pop(),
                _ => Some(Selector::ExploreUnion(ExploreUnion::new(members))),
            }
        }
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{basic, NodeRef};
    use crate::types::PathSegment;

    /// {"next": {"next": {"next": {}}}} : depth 0 through 3.
    fn chain(levels: usize) -> NodeRef {
        let mut node = basic::map(Vec::<(&str, NodeRef)>::new());
        for _ in 0..levels {
            node = basic::map([("next", node)]);
        }
        node
    }

    fn match_all_recursive(limit: RecursionLimit) -> ExploreRecursive {
        ExploreRecursive::new(
            limit,
            Selector::explore_union([
                Selector::matcher(),
                Selector::explore_all(Selector::RecursiveEdge),
            ]),
        )
    }

    /// Depths at which the selector matches, walking the single-child chain.
    fn matched_depths(root: NodeRef, selector: Selector) -> Vec<usize> {
        let mut out = Vec::new();
        let mut frontier = vec![(root, selector, 0usize)];
        while let Some((node, sel, depth)) = frontier.pop() {
            if sel.decide(node.as_ref()) {
                out.push(depth);
            }
            for child in sel.explore(node.as_ref()) {
                let next = node.lookup_segment(&child.segment).unwrap();
                frontier.push((next, child.selector, depth + 1));
            }
        }
        out.sort();
        out
    }

    #[test]
    fn test_depth_bound_of_two_stops_after_two_levels() {
        let sel = Selector::ExploreRecursive(match_all_recursive(RecursionLimit::Depth(2)));
        assert_eq!(matched_depths(chain(3), sel), vec![0, 1, 2]);
    }

    #[test]
    fn test_depth_zero_matches_only_start() {
        let sel = Selector::ExploreRecursive(match_all_recursive(RecursionLimit::Depth(0)));
        assert_eq!(matched_depths(chain(3), sel), vec![0]);
    }

    #[test]
    fn test_unbounded_runs_to_the_leaves() {
        let sel = Selector::ExploreRecursive(match_all_recursive(RecursionLimit::None));
        assert_eq!(matched_depths(chain(4), sel), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_edge_substitution_is_lazy() {
        let rec = match_all_recursive(RecursionLimit::Depth(5));
        let node = chain(1);
        let children = rec.explore(node.as_ref());
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].segment, PathSegment::parse("next"));
        match &children[0].selector {
            Selector::ExploreRecursive(next) => {
                assert_eq!(next.limit(), RecursionLimit::Depth(4));
                assert_eq!(next.current(), rec.sequence());
            }
            other => panic!("expected recursive continuation, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_step_keeps_depth_until_edge() {
        // Recurse through "next" two maps at a time: only the edge re-entry
        // spends depth.
        let seq = Selector::explore_union([
            Selector::matcher(),
            Selector::explore_fields([(
                "next",
                Selector::explore_fields([("next", Selector::RecursiveEdge)]),
            )]),
        ]);
        let sel = Selector::explore_recursive(RecursionLimit::Depth(1), seq);
        // depth 0 matches, depth 1 is an intermediate step, depth 2 re-enters and
        // matches, depth 4 would need a second re-entry.
        assert_eq!(matched_depths(chain(6), sel), vec![0, 2]);
    }

    #[test]
    fn test_replace_edge_in_union() {
        let union = Selector::explore_union([Selector::RecursiveEdge, Selector::matcher()]);
        assert!(has_edge(&union));
        assert_eq!(replace_edge(union.clone(), None), Some(Selector::matcher()));
        let replaced = replace_edge(union, Some(&Selector::matcher())).unwrap();
        assert!(!has_edge(&replaced));
        assert_eq!(replace_edge(Selector::RecursiveEdge, None), None);
    }
}
