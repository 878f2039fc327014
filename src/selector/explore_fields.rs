//! ExploreFields: visit named map fields.

use std::sync::Arc;

use crate::node::Node;
use crate::types::{PathSegment, ReprKind};
use super::{ExploredChild, Selector};

/// Explores an explicit set of map keys, each with its own continuation.
///
/// Fields are explored in declaration order. Fields absent from the node are
/// skipped, and a node that is not a map yields nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExploreFields {
    fields: Arc<Vec<(String, Selector)>>,
}

impl ExploreFields {
    /// Create from `(field, continuation)` pairs. A repeated field keeps its
    /// first position and its last continuation.
    pub fn new<K: Into<String>>(fields: impl IntoIterator<Item = (K, Selector)>) -> Self {
        let mut out: Vec<(String, Selector)> = Vec::new();
        for (name, selector) in fields {
            let name = name.into();
            match out.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = selector,
                None => out.push((name, selector)),
            }
        }
        Self { fields: Arc::new(out) }
    }

    /// Declared fields and continuations.
    pub fn fields(&self) -> &[(String, Selector)] {
        &self.fields
    }

    /// Continuation for one field.
    pub fn field(&self, name: &str) -> Option<&Selector> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Never a match by itself.
    pub fn decide(&self, _node: &dyn Node) -> bool {
        false
    }

    /// Declared fields present on the node.
    pub fn explore(&self, node: &dyn Node) -> Vec<ExploredChild> {
        if node.repr_kind() != ReprKind::Map {
            return Vec::new();
        }
        self.fields
            .iter()
            .filter(|(name, _)| node.lookup_string(name).is_ok())
            .map(|(name, selector)| ExploredChild::new(PathSegment::Key(name.clone()), selector.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::basic;

    #[test]
    fn test_explores_only_declared_fields() {
        let node = basic::map([("a", basic::int(1)), ("b", basic::int(2))]);
        let sel = ExploreFields::new([("a", Selector::matcher())]);
        let children = sel.explore(node.as_ref());
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].segment, PathSegment::parse("a"));
        assert!(!sel.decide(node.as_ref()));
    }

    #[test]
    fn test_each_field_keeps_its_own_continuation() {
        let node = basic::map([("a", basic::int(1)), ("b", basic::list([basic::int(2)]))]);
        let b_next = Selector::explore_all(Selector::matcher());
        let sel = ExploreFields::new([("b", b_next.clone()), ("a", Selector::matcher())]);
        let children = sel.explore(node.as_ref());
        assert_eq!(children[0].segment, PathSegment::parse("b"));
        assert_eq!(children[0].selector, b_next);
        assert_eq!(children[1].selector, Selector::matcher());
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let node = basic::map([("a", basic::int(1))]);
        let sel = ExploreFields::new([("z", Selector::matcher()), ("a", Selector::matcher())]);
        let children = sel.explore(node.as_ref());
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].segment, PathSegment::parse("a"));
    }

    #[test]
    fn test_non_map_explores_nothing() {
        let sel = ExploreFields::new([("0", Selector::matcher())]);
        assert!(sel.explore(basic::list([basic::int(1)]).as_ref()).is_empty());
        assert!(sel.explore(basic::int(1).as_ref()).is_empty());
    }

    #[test]
    fn test_repeated_field_last_continuation_wins() {
        let sel = ExploreFields::new([
            ("a", Selector::matcher()),
            ("b", Selector::matcher()),
            ("a", Selector::explore_all(Selector::matcher())),
        ]);
        assert_eq!(sel.fields().len(), 2);
        assert_eq!(sel.fields()[0].0, "a");
        assert_eq!(sel.field("a"), Some(&Selector::explore_all(Selector::matcher())));
    }
}
