//! # ipld-kernel
//!
//! Codec-agnostic node data model and selector engine for content-addressed
//! tree data.
//!
//! The kernel answers one question:
//!
//! > Given a tree of data and a declarative selector, which nodes does the
//! > selector reach, and which does it **match**?
//!
//! ## Core Contract
//!
//! 1. Every value is a [`Node`] of exactly one [`ReprKind`]; operations that
//!    do not apply to a node's kind fail with a uniform wrong-kind error
//! 2. A selector description (itself a node tree) is validated once by
//!    [`reify_selector`] into an executable [`Selector`]
//! 3. A [`Traversal`] walks a tree under a selector, crossing links through a
//!    [`LinkLoader`], and reports every match with its [`Path`]
//!
//! ## Architecture
//!
//! ```text
//! Description Node → reify_selector → Selector → Traversal → (Path, Node)*
//!                          ↓                          ↓
//!                    SelectorCache               LinkLoader (Memory or custom)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same tree + same selector → identical matches in identical order
//! - Selectors are immutable; sharing one across walks is safe
//! - Canonical node hashes ignore map insertion order

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod node;
pub mod selector;
pub mod traversal;
pub mod canonical;

// Re-exports
pub use types::{ErrWrongKind, Link, NodeError, Path, PathSegment, ReprKind, ReprKindSet};
pub use node::{node_eq, ListIterator, MapIterator, Node, NodeRef};
pub use selector::{
    reify_selector, reify_selector_with, CacheConfig, CacheStats, ExploredChild,
    RecursionLimit, ReifyError, ReifyOptions, Selector, SelectorCache,
};
pub use traversal::{
    Budget, CancelHandle, InMemoryLinkStore, LinkLoader, LoaderError, Progress, Traversal,
    TraversalConfig, TraversalError, TraversalStats,
};
pub use canonical::{canonical_hash, canonical_hash_hex, node_canonical_hash, to_canonical_bytes};

/// Version of the selector description schema understood by
/// [`reify_selector`]. Increment on breaking changes to the wire vocabulary.
pub const SELECTOR_SCHEMA_VERSION: &str = "1.0.0";
