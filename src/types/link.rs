//! Links: opaque content addresses of other trees.
//!
//! Resolving a link into a node is done by a [`LinkLoader`](crate::traversal::LinkLoader);
//! this type only carries the address.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Prefix of addresses computed by [`Link::of_bytes`].
pub const SHA256_PREFIX: &str = "sha256:";

/// Content address of another tree.
///
/// Cheap to clone. Ordered and hashed by address text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Link(Arc<str>);

impl Link {
    /// Wrap an existing address.
    pub fn new(address: impl Into<Arc<str>>) -> Self {
        Self(address.into())
    }

    /// Address derived from the SHA-256 digest of `bytes`.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self::new(format!("{}{}", SHA256_PREFIX, hex::encode(digest)))
    }

    /// The address text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_bytes_is_deterministic() {
        let a = Link::of_bytes(b"hello");
        let b = Link::of_bytes(b"hello");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with(SHA256_PREFIX));
        assert_eq!(a.as_str().len(), SHA256_PREFIX.len() + 64);
    }

    #[test]
    fn test_different_content_different_address() {
        assert_ne!(Link::of_bytes(b"a"), Link::of_bytes(b"b"));
    }
}
