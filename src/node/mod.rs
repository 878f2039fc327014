//! The node contract.
//!
//! A [`Node`] is a read-only, kind-tagged view over one value in a tree of
//! data. Every node answers every operation; the ones that do not apply to
//! its kind fail with [`ErrWrongKind`](crate::types::ErrWrongKind). Concrete
//! types get that behavior from one of the [`mixins`] and only write the
//! operations that mean something for their own kind.
//!
//! ## Sentinels
//!
//! - `map_iterator` / `list_iterator` return `None` on the wrong kind. This is
//!   absence, not an error: callers check the kind before iterating.
//! - `length` returns `-1` for kinds without a length.

pub mod mixins;
pub mod basic;
pub mod json;

use std::fmt;
use std::sync::Arc;

use crate::types::{Link, NodeError, PathSegment, ReprKind};

/// Shared handle to a node. Child views are handed out as `NodeRef`s.
pub type NodeRef = Arc<dyn Node>;

/// Read-only view over a value of exactly one [`ReprKind`].
///
/// `repr_kind` is stable for the lifetime of the value and determines which
/// other operations succeed.
pub trait Node: fmt::Debug + Send + Sync {
    /// Kind of this node.
    fn repr_kind(&self) -> ReprKind;

    /// Name of the concrete type, as reported in wrong-kind errors.
    fn type_name(&self) -> &'static str;

    /// Look up a map entry by string key.
    fn lookup_string(&self, key: &str) -> Result<NodeRef, NodeError>;

    /// Look up a map entry by key node.
    fn lookup(&self, key: &dyn Node) -> Result<NodeRef, NodeError>;

    /// Look up a list element by index.
    fn lookup_index(&self, index: usize) -> Result<NodeRef, NodeError>;

    /// Look up a child by path segment, for maps and lists alike.
    fn lookup_segment(&self, segment: &PathSegment) -> Result<NodeRef, NodeError>;

    /// Cursor over map entries, or `None` for non-maps.
    fn map_iterator(&self) -> Option<Box<dyn MapIterator + '_>>;

    /// Cursor over list elements, or `None` for non-lists.
    fn list_iterator(&self) -> Option<Box<dyn ListIterator + '_>>;

    /// Number of entries or elements, `-1` when not applicable.
    fn length(&self) -> i64;

    /// Whether this node stands for an absent value.
    fn is_undefined(&self) -> bool;

    /// Whether this node is null.
    fn is_null(&self) -> bool;

    /// Boolean value.
    fn as_bool(&self) -> Result<bool, NodeError>;

    /// Integer value.
    fn as_int(&self) -> Result<i64, NodeError>;

    /// Float value.
    fn as_float(&self) -> Result<f64, NodeError>;

    /// String value.
    fn as_string(&self) -> Result<&str, NodeError>;

    /// Bytes value.
    fn as_bytes(&self) -> Result<&[u8], NodeError>;

    /// Link value. Resolving it is up to a loader.
    fn as_link(&self) -> Result<Link, NodeError>;
}

/// Single-pass cursor over the entries of a map.
///
/// Not restartable and not meant to be shared between callers.
pub trait MapIterator {
    /// Next `(key, value)` pair. Fails with `IteratorExhausted` once `done`.
    fn next(&mut self) -> Result<(NodeRef, NodeRef), NodeError>;

    /// Whether every entry has been produced.
    fn done(&self) -> bool;
}

/// Single-pass cursor over the elements of a list.
pub trait ListIterator {
    /// Next `(index, value)` pair. Fails with `IteratorExhausted` once `done`.
    fn next(&mut self) -> Result<(usize, NodeRef), NodeError>;

    /// Whether every element has been produced.
    fn done(&self) -> bool;
}

/// Deep structural equality between two nodes, regardless of concrete type.
///
/// Maps compare as unordered collections of entries. Floats compare by bits
/// so that equality is reflexive.
pub fn node_eq(a: &dyn Node, b: &dyn Node) -> bool {
    if a.repr_kind() != b.repr_kind() {
        return false;
    }
    match a.repr_kind() {
        ReprKind::Map => {
            if a.length() != b.length() {
                return false;
            }
            let Some(mut it) = a.map_iterator() else {
                return false;
            };
            while !it.done() {
                let Ok((key, value)) = it.next() else {
                    return false;
                };
                match b.lookup(key.as_ref()) {
                    Ok(other) if node_eq(value.as_ref(), other.as_ref()) => {}
                    _ => return false,
                }
            }
            true
        }
        ReprKind::List => {
            if a.length() != b.length() {
                return false;
            }
            let (Some(mut left), Some(mut right)) = (a.list_iterator(), b.list_iterator()) else {
                return false;
            };
            while !left.done() && !right.done() {
                match (left.next(), right.next()) {
                    (Ok((_, x)), Ok((_, y))) if node_eq(x.as_ref(), y.as_ref()) => {}
                    _ => return false,
                }
            }
            left.done() && right.done()
        }
        ReprKind::Null => true,
        ReprKind::Bool => a.as_bool().ok() == b.as_bool().ok(),
        ReprKind::Int => a.as_int().ok() == b.as_int().ok(),
        ReprKind::Float => a.as_float().ok().map(f64::to_bits) == b.as_float().ok().map(f64::to_bits),
        ReprKind::String => a.as_string().ok() == b.as_string().ok(),
        ReprKind::Bytes => a.as_bytes().ok() == b.as_bytes().ok(),
        ReprKind::Link => a.as_link().ok() == b.as_link().ok(),
    }
}
