//! Builders for selector description nodes.
//!
//! Descriptions are plain nodes, so they can be written by hand as JSON or
//! assembled here. [`describe`] goes the other way and turns a reified
//! [`Selector`] back into its description.
//!
//! ```
//! use ipld_kernel::selector::{builder, reify_selector, RecursionLimit};
//!
//! let desc = builder::explore_recursive(
//!     RecursionLimit::Depth(3),
//!     builder::explore_union([
//!         builder::matcher(),
//!         builder::explore_all(builder::recursive_edge()),
//!     ]),
//! );
//! let selector = reify_selector(desc.as_ref()).unwrap();
//! assert_eq!(selector.variant(), "R");
//! ```

use crate::node::{basic, NodeRef};
use super::{keys, RecursionLimit, Selector};

fn variant(key: &str, body: NodeRef) -> NodeRef {
    basic::map([(key, body)])
}

fn empty_map() -> NodeRef {
    basic::map(Vec::<(&str, NodeRef)>::new())
}

fn int_of(value: usize) -> NodeRef {
    basic::int(i64::try_from(value).unwrap_or(i64::MAX))
}

/// `{".": {}}`
pub fn matcher() -> NodeRef {
    variant(keys::MATCHER, empty_map())
}

/// `{".": {"label": label}}`
pub fn labeled_matcher(label: &str) -> NodeRef {
    variant(keys::MATCHER, basic::map([(keys::LABEL, basic::string(label))]))
}

/// `{"a": {">": next}}`
pub fn explore_all(next: NodeRef) -> NodeRef {
    variant(keys::EXPLORE_ALL, basic::map([(keys::NEXT, next)]))
}

/// `{"f": {"f>": {field: next, ...}}}`
pub fn explore_fields<K: Into<String>>(fields: impl IntoIterator<Item = (K, NodeRef)>) -> NodeRef {
    variant(keys::EXPLORE_FIELDS, basic::map([(keys::FIELDS, basic::map(fields))]))
}

/// `{"i": {"i": index, ">": next}}`
pub fn explore_index(index: usize, next: NodeRef) -> NodeRef {
    variant(
        keys::EXPLORE_INDEX,
        basic::map([(keys::INDEX, int_of(index)), (keys::NEXT, next)]),
    )
}

/// `{"r": {"^": start, "$": end, ">": next}}`
pub fn explore_range(start: usize, end: usize, next: NodeRef) -> NodeRef {
    variant(
        keys::EXPLORE_RANGE,
        basic::map([
            (keys::START, int_of(start)),
            (keys::END, int_of(end)),
            (keys::NEXT, next),
        ]),
    )
}

/// `{"R": {"l": limit, ":>": sequence}}`
pub fn explore_recursive(limit: RecursionLimit, sequence: NodeRef) -> NodeRef {
    let limit = match limit {
        RecursionLimit::Depth(n) => basic::map([(
            keys::LIMIT_DEPTH,
            basic::int(i64::try_from(n).unwrap_or(i64::MAX)),
        )]),
        RecursionLimit::None => basic::map([(keys::LIMIT_NONE, empty_map())]),
    };
    variant(
        keys::EXPLORE_RECURSIVE,
        basic::map([(keys::LIMIT, limit), (keys::SEQUENCE, sequence)]),
    )
}

/// `{"|": [member, ...]}`
pub fn explore_union(members: impl IntoIterator<Item = NodeRef>) -> NodeRef {
    variant(keys::EXPLORE_UNION, basic::list(members))
}

/// `{"@": {}}`
pub fn recursive_edge() -> NodeRef {
    variant(keys::RECURSIVE_EDGE, empty_map())
}

/// Description of a reified selector.
///
/// A recursive selector is described by its sequence and remaining limit,
/// so describing one taken mid-traversal yields a selector that starts over
/// from the top of the sequence.
pub(crate) fn describe(selector: &Selector) -> NodeRef {
    match selector {
        Selector::Matcher(m) => match &m.label {
            Some(label) => labeled_matcher(label),
            None => matcher(),
        },
        Selector::ExploreAll(s) => explore_all(describe(s.next())),
        Selector::ExploreFields(s) => explore_fields(
            s.fields()
                .iter()
                .map(|(name, next)| (name.as_str(), describe(next))),
        ),
        Selector::ExploreIndex(s) => explore_index(s.index(), describe(s.next())),
        Selector::ExploreRange(s) => explore_range(s.start(), s.end(), describe(s.next())),
        Selector::ExploreRecursive(s) => explore_recursive(s.limit(), describe(s.sequence())),
        Selector::ExploreUnion(s) => explore_union(s.members().iter().map(describe)),
        Selector::RecursiveEdge => recursive_edge(),
    }
}
