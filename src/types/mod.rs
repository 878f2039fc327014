//! Core types for the node data model.

pub mod kind;
pub mod error;
pub mod path;
pub mod link;

pub use kind::{ReprKind, ReprKindSet};
pub use error::{ErrWrongKind, NodeError};
pub use path::{Path, PathSegment};
pub use link::Link;
