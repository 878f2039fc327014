//! Selectors: executable descriptions of which parts of a graph to visit.
//!
//! A [`Selector`] is asked two things about each node a traversal reaches:
//!
//! - [`Selector::decide`]: is this node itself a match?
//! - [`Selector::explore`]: which children should be visited next, and with
//!   which selector each?
//!
//! Selectors hold no mutable state, so one value can be shared across
//! traversals and across sibling children of one traversal. Cloning is cheap:
//! nested selectors sit behind `Arc`s.
//!
//! ## Wire Vocabulary
//!
//! Selectors are described by nodes (see [`parse`]) using single-key maps:
//!
//! | Variant | Key | Fields |
//! |---------|-----|--------|
//! | Matcher | `.` | optional `label` |
//! | ExploreAll | `a` | `>` |
//! | ExploreFields | `f` | `f>` (map of field → selector) |
//! | ExploreIndex | `i` | `i`, `>` |
//! | ExploreRange | `r` | `^`, `$`, `>` |
//! | ExploreRecursive | `R` | `l` (`{"depth": n}` or `{"none": {}}`), `:>` |
//! | ExploreUnion | `\|` | list of selectors |
//! | RecursiveEdge | `@` | none |

pub mod matcher;
pub mod explore_all;
pub mod explore_fields;
pub mod explore_index;
pub mod explore_recursive;
pub mod explore_union;
pub mod parse;
pub mod builder;
pub mod cache;

use std::sync::Arc;

use crate::node::{Node, NodeRef};
use crate::types::PathSegment;

pub use matcher::Matcher;
pub use explore_all::ExploreAll;
pub use explore_fields::ExploreFields;
pub use explore_index::{ExploreIndex, ExploreRange};
pub use explore_recursive::{ExploreRecursive, RecursionLimit};
pub use explore_union::ExploreUnion;
pub use parse::{reify_selector, reify_selector_with, ReifyError, ReifyOptions};
pub use cache::{CacheConfig, CacheStats, SelectorCache};

/// Variant keys of the selector description schema.
pub mod keys {
    /// Matcher.
    pub const MATCHER: &str = ".";
    /// ExploreAll.
    pub const EXPLORE_ALL: &str = "a";
    /// ExploreFields.
    pub const EXPLORE_FIELDS: &str = "f";
    /// ExploreIndex.
    pub const EXPLORE_INDEX: &str = "i";
    /// ExploreRange.
    pub const EXPLORE_RANGE: &str = "r";
    /// ExploreRecursive.
    pub const EXPLORE_RECURSIVE: &str = "R";
    /// ExploreUnion.
    pub const EXPLORE_UNION: &str = "|";
    /// RecursiveEdge.
    pub const RECURSIVE_EDGE: &str = "@";

    /// Continuation selector field.
    pub const NEXT: &str = ">";
    /// Field map of ExploreFields.
    pub const FIELDS: &str = "f>";
    /// Index of ExploreIndex.
    pub const INDEX: &str = "i";
    /// Range start (inclusive).
    pub const START: &str = "^";
    /// Range end (exclusive).
    pub const END: &str = "$";
    /// Recursion limit.
    pub const LIMIT: &str = "l";
    /// Recursion sequence.
    pub const SEQUENCE: &str = ":>";
    /// Depth-bounded limit.
    pub const LIMIT_DEPTH: &str = "depth";
    /// Unbounded limit.
    pub const LIMIT_NONE: &str = "none";
    /// Matcher label.
    pub const LABEL: &str = "label";
}

/// Traversal directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Match this node, explore nothing.
    Matcher(Matcher),
    /// Explore every child with one continuation.
    ExploreAll(ExploreAll),
    /// Explore named map fields, each with its own continuation.
    ExploreFields(ExploreFields),
    /// Explore one list index.
    ExploreIndex(ExploreIndex),
    /// Explore a range of list indices.
    ExploreRange(ExploreRange),
    /// Repeat a sequence, re-entering it at each recursion edge.
    ExploreRecursive(ExploreRecursive),
    /// Combine several selectors.
    ExploreUnion(ExploreUnion),
    /// Marks where an enclosing recursive selector re-enters its sequence.
    RecursiveEdge,
}

/// A child to visit and the selector to continue with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExploredChild {
    /// Where the child sits in its parent.
    pub segment: PathSegment,
    /// Selector to apply to the child.
    pub selector: Selector,
}

impl ExploredChild {
    /// Create an explored child.
    pub fn new(segment: PathSegment, selector: Selector) -> Self {
        Self { segment, selector }
    }
}

impl Selector {
    /// Whether `node` is itself a match.
    pub fn decide(&self, node: &dyn Node) -> bool {
        match self {
            Self::Matcher(s) => s.decide(node),
            Self::ExploreAll(s) => s.decide(node),
            Self::ExploreFields(s) => s.decide(node),
            Self::ExploreIndex(s) => s.decide(node),
            Self::ExploreRange(s) => s.decide(node),
            Self::ExploreRecursive(s) => s.decide(node),
            Self::ExploreUnion(s) => s.decide(node),
            Self::RecursiveEdge => false,
        }
    }

    /// Children of `node` to visit, in a deterministic order.
    ///
    /// An empty result means nothing is explored from here; it is not an error.
    pub fn explore(&self, node: &dyn Node) -> Vec<ExploredChild> {
        match self {
            Self::Matcher(s) => s.explore(node),
            Self::ExploreAll(s) => s.explore(node),
            Self::ExploreFields(s) => s.explore(node),
            Self::ExploreIndex(s) => s.explore(node),
            Self::ExploreRange(s) => s.explore(node),
            Self::ExploreRecursive(s) => s.explore(node),
            Self::ExploreUnion(s) => s.explore(node),
            // Only reachable through an enclosing recursive selector, which
            // substitutes the edge before exploring.
            Self::RecursiveEdge => Vec::new(),
        }
    }

    /// Schema key of this variant.
    pub fn variant(&self) -> &'static str {
        match self {
            Self::Matcher(_) => keys::MATCHER,
            Self::ExploreAll(_) => keys::EXPLORE_ALL,
            Self::ExploreFields(_) => keys::EXPLORE_FIELDS,
            Self::ExploreIndex(_) => keys::EXPLORE_INDEX,
            Self::ExploreRange(_) => keys::EXPLORE_RANGE,
            Self::ExploreRecursive(_) => keys::EXPLORE_RECURSIVE,
            Self::ExploreUnion(_) => keys::EXPLORE_UNION,
            Self::RecursiveEdge => keys::RECURSIVE_EDGE,
        }
    }

    /// Re-serialize into a description node of the wire schema.
    pub fn to_description(&self) -> NodeRef {
        builder::describe(self)
    }

    /// Selector that matches the node it is applied to.
    pub fn matcher() -> Self {
        Self::Matcher(Matcher::default())
    }

    /// Explore every child with `next`.
    pub fn explore_all(next: Selector) -> Self {
        Self::ExploreAll(ExploreAll::new(next))
    }

    /// Explore the named fields.
    pub fn explore_fields<K: Into<String>>(fields: impl IntoIterator<Item = (K, Selector)>) -> Self {
        Self::ExploreFields(ExploreFields::new(fields))
    }

    /// Explore one list index.
    pub fn explore_index(index: usize, next: Selector) -> Self {
        Self::ExploreIndex(ExploreIndex::new(index, next))
    }

    /// Explore list indices `start..end`.
    pub fn explore_range(start: usize, end: usize, next: Selector) -> Self {
        Self::ExploreRange(ExploreRange::new(start, end, next))
    }

    /// Recursive exploration of `sequence`.
    pub fn explore_recursive(limit: RecursionLimit, sequence: Selector) -> Self {
        Self::ExploreRecursive(ExploreRecursive::new(limit, sequence))
    }

    /// Union of `members`.
    pub fn explore_union(members: impl IntoIterator<Item = Selector>) -> Self {
        Self::ExploreUnion(ExploreUnion::new(members))
    }
}

/// Shared pointer used for nested selectors.
pub(crate) type SelectorRef = Arc<Selector>;

/// Children of `node` as segments, in the node's own order.
///
/// Map keys that are not strings cannot be addressed by a segment and are
/// skipped. Iteration errors end the listing early.
pub(crate) fn child_segments(node: &dyn Node) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    if let Some(mut it) = node.map_iterator() {
        while !it.done() {
            let Ok((key, _)) = it.next() else { break };
            match key.as_string() {
                Ok(k) => segments.push(PathSegment::Key(k.to_string())),
                Err(e) => tracing::warn!(error = %e, "skipping map entry with non-string key"),
            }
        }
    } else if let Some(mut it) = node.list_iterator() {
        while !it.done() {
            let Ok((index, _)) = it.next() else { break };
            segments.push(PathSegment::Index(index));
        }
    }
    segments
}
