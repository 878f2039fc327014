//! Errors produced by the node contract.

use super::kind::{ReprKind, ReprKindSet};
use super::path::PathSegment;

/// An operation was called on a node of a kind it does not apply to.
///
/// Carries the concrete type name so that errors stay precise no matter which
/// node implementation produced them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("func called on wrong kind: {method_name} called on a {type_name} node ({actual_kind}), but only makes sense on {appropriate_kind}")]
pub struct ErrWrongKind {
    /// Name of the concrete node type.
    pub type_name: &'static str,
    /// Operation that was attempted.
    pub method_name: &'static str,
    /// Kinds on which the operation would have succeeded.
    pub appropriate_kind: ReprKindSet,
    /// Kind actually present.
    pub actual_kind: ReprKind,
}

/// Error type for node operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    /// Operation not valid for the node's kind.
    #[error(transparent)]
    WrongKind(#[from] ErrWrongKind),
    /// Map has no entry for the key.
    #[error("Key not found: {0}")]
    NotFound(PathSegment),
    /// List index past the end.
    #[error("Index {index} out of range for list of length {length}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Length of the list.
        length: usize,
    },
    /// Path segment cannot address a node of this kind.
    #[error("Segment {segment} cannot address a {kind} node")]
    InvalidSegment {
        /// Offending segment.
        segment: PathSegment,
        /// Kind of the node being addressed.
        kind: ReprKind,
    },
    /// Iterator advanced past its end.
    #[error("Iterator advanced past its end")]
    IteratorExhausted,
}

impl NodeError {
    /// Wrong-kind details, if this is a wrong-kind error.
    pub fn as_wrong_kind(&self) -> Option<&ErrWrongKind> {
        match self {
            Self::WrongKind(e) => Some(e),
            _ => None,
        }
    }
}
