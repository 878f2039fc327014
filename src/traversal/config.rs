//! Traversal configuration.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;

/// Budgets and link handling for a traversal.
///
/// ## Parameters
///
/// - `max_nodes`: Maximum nodes visited, matched or not (budget cap)
/// - `max_links`: Maximum links loaded
/// - `follow_links`: Whether to load link targets and continue into them
/// - `skip_missing_links`: Whether an unresolvable link is skipped rather
///   than failing the walk
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Maximum number of nodes visited.
    pub max_nodes: usize,
    /// Maximum number of links loaded.
    pub max_links: usize,
    /// Whether to follow links.
    pub follow_links: bool,
    /// Whether to skip links the loader cannot resolve.
    pub skip_missing_links: bool,
}

impl TraversalConfig {
    /// Create a configuration with custom parameters.
    pub fn new(max_nodes: usize, max_links: usize, follow_links: bool, skip_missing_links: bool) -> Self {
        Self {
            max_nodes,
            max_links,
            follow_links,
            skip_missing_links,
        }
    }

    /// Compute a hash of the configuration parameters.
    ///
    /// Stable across runs, so it can key cached traversal results.
    pub fn params_hash(&self) -> String {
        canonical_hash_hex(self)
    }

    /// Create a minimal configuration for testing.
    #[cfg(test)]
    pub fn minimal() -> Self {
        Self {
            max_nodes: 16,
            max_links: 4,
            follow_links: true,
            skip_missing_links: false,
        }
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_nodes: 100_000,
            max_links: 10_000,
            follow_links: true,
            skip_missing_links: false,
        }
    }
}
