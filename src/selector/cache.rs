//! LRU cache of reified selectors.
//!
//! Services tend to receive the same few selector descriptions over and
//! over. Reification walks and validates the whole description, so the
//! cache keys each description by an xxh64 digest of the description,
//! together with the [`ReifyOptions`] it was reified under.
//!
//! The digest follows map iteration order. Field order in an ExploreFields
//! description is the order children are explored in, so two descriptions
//! that differ only in that order are different selectors.
//!
//! Only successes are cached. A rejected description is re-validated on
//! every call so the caller always gets a fresh, path-precise error.

use std::hash::Hasher;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::Xxh64;

use crate::node::Node;
use crate::types::{NodeError, ReprKind};
use super::{reify_selector_with, ReifyError, ReifyOptions, Selector};

/// Configuration for the selector cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache. Zero disables caching.
    pub max_entries: usize,
    /// Whether to enable the cache.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            enabled: true,
        }
    }
}

/// Cache key: description hash and options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SelectorCacheKey(u64);

impl SelectorCacheKey {
    fn compute(description: &dyn Node, options: &ReifyOptions) -> Option<Self> {
        let mut hasher = Xxh64::new(0);
        write_node(&mut hasher, description).ok()?;
        hasher.write_u8(u8::from(options.allow_unbounded_recursion));
        Some(Self(hasher.finish()))
    }
}

/// Feed `node` into `hasher`, map entries in iteration order.
///
/// Every value is prefixed by its kind and every variable-length value by
/// its length, so distinct trees cannot produce the same byte stream.
fn write_node(hasher: &mut Xxh64, node: &dyn Node) -> Result<(), NodeError> {
    let kind = node.repr_kind();
    hasher.write_u8(kind as u8);
    match kind {
        ReprKind::Map => {
            hasher.write_i64(node.length());
            if let Some(mut it) = node.map_iterator() {
                while !it.done() {
                    let (key, value) = it.next()?;
                    write_node(hasher, key.as_ref())?;
                    write_node(hasher, value.as_ref())?;
                }
            }
        }
        ReprKind::List => {
            hasher.write_i64(node.length());
            if let Some(mut it) = node.list_iterator() {
                while !it.done() {
                    let (_, value) = it.next()?;
                    write_node(hasher, value.as_ref())?;
                }
            }
        }
        ReprKind::Null => {}
        ReprKind::Bool => hasher.write_u8(u8::from(node.as_bool()?)),
        ReprKind::Int => hasher.write_i64(node.as_int()?),
        ReprKind::Float => hasher.write_u64(node.as_float()?.to_bits()),
        ReprKind::String => write_bytes(hasher, node.as_string()?.as_bytes()),
        ReprKind::Bytes => write_bytes(hasher, node.as_bytes()?),
        ReprKind::Link => write_bytes(hasher, node.as_link()?.as_str().as_bytes()),
    }
    Ok(())
}

fn write_bytes(hasher: &mut Xxh64, bytes: &[u8]) {
    hasher.write_usize(bytes.len());
    hasher.write(bytes);
}

/// Reifies descriptions, remembering the results.
///
/// # Example
///
/// ```
/// use ipld_kernel::node::json::from_json;
/// use ipld_kernel::selector::{ReifyOptions, SelectorCache};
///
/// let cache = SelectorCache::default();
/// let desc = from_json(&serde_json::json!({"a": {">": {".": {}}}}));
/// let first = cache.reify(desc.as_ref(), &ReifyOptions::default()).unwrap();
/// let second = cache.reify(desc.as_ref(), &ReifyOptions::default()).unwrap();
/// assert_eq!(first, second);
/// assert_eq!(cache.cache_stats().unwrap().hits, 1);
/// ```
#[derive(Debug)]
pub struct SelectorCache {
    cache: Option<Arc<RwLock<LruCache<SelectorCacheKey, Selector>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SelectorCache {
    /// Create a cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        let cache = if config.enabled {
            NonZeroUsize::new(config.max_entries).map(|size| Arc::new(RwLock::new(LruCache::new(size))))
        } else {
            None
        };
        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Reify `description`, serving repeated descriptions from the cache.
    pub fn reify(&self, description: &dyn Node, options: &ReifyOptions) -> Result<Selector, ReifyError> {
        let Some(cache) = &self.cache else {
            return reify_selector_with(description, options);
        };
        let Some(key) = SelectorCacheKey::compute(description, options) else {
            // Not renderable, so reification will report the problem.
            return reify_selector_with(description, options);
        };

        // `get` updates recency, so it needs the write lock.
        if let Some(selector) = cache.write().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(selector.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let selector = reify_selector_with(description, options)?;
        cache.write().put(key, selector.clone());
        Ok(selector)
    }

    /// Get cache statistics.
    ///
    /// Returns `None` if caching is disabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| {
            let cache = cache.read();
            CacheStats {
                len: cache.len(),
                cap: cache.cap().get(),
                hits: self.hits.load(Ordering::Relaxed),
                misses: self.misses.load(Ordering::Relaxed),
            }
        })
    }

    /// Drop every cached selector. Counters are kept.
    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.write().clear();
        }
    }
}

impl Default for SelectorCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries in the cache.
    pub len: usize,
    /// Maximum capacity of the cache.
    pub cap: usize,
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that had to reify.
    pub misses: u64,
}
