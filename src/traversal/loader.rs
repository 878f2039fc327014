//! Link loading backends.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::canonical::node_canonical_bytes;
use crate::node::NodeRef;
use crate::types::{Link, NodeError};

/// Resolves links to the nodes they address.
///
/// Implementations return `Ok(None)` for a link they do not hold; errors are
/// reserved for backend failures.
#[async_trait]
pub trait LinkLoader: Send + Sync {
    /// Error type for loader operations.
    type Error: std::error::Error + Send + Sync;

    /// Load the node addressed by `link`.
    async fn load(&self, link: &Link) -> Result<Option<NodeRef>, Self::Error>;
}

/// Error type for the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoaderError {
    /// Node could not be rendered to compute its address.
    #[error("Cannot address node: {0}")]
    Unaddressable(#[from] NodeError),
}

/// In-memory link store for testing.
///
/// Uses a BTreeMap so listing is deterministic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLinkStore {
    nodes: BTreeMap<Link, NodeRef>,
}

impl InMemoryLinkStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `node` under its content address and return the link.
    ///
    /// The address is the SHA-256 of the node's canonical bytes, so storing
    /// an equal tree twice yields the same link.
    pub fn put(&mut self, node: NodeRef) -> Result<Link, LoaderError> {
        let link = Link::of_bytes(&node_canonical_bytes(node.as_ref())?);
        self.nodes.insert(link.clone(), node);
        Ok(link)
    }

    /// Store `node` under an explicit address.
    pub fn put_at(&mut self, link: Link, node: NodeRef) {
        self.nodes.insert(link, node);
    }

    /// Forget a link. Returns the node that was stored.
    pub fn remove(&mut self, link: &Link) -> Option<NodeRef> {
        self.nodes.remove(link)
    }

    /// Whether `link` is stored.
    pub fn contains(&self, link: &Link) -> bool {
        self.nodes.contains_key(link)
    }

    /// Stored links, in address order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.nodes.keys()
    }

    /// Get number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[async_trait]
impl LinkLoader for InMemoryLinkStore {
    type Error = LoaderError;

    async fn load(&self, link: &Link) -> Result<Option<NodeRef>, Self::Error> {
        Ok(self.nodes.get(link).cloned())
    }
}
