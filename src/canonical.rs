//! Canonical serialization for deterministic hashing.
//!
//! This module provides functions to serialize data in a canonical, deterministic format
//! suitable for hashing and cache keys.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable map order: Node maps render through `serde_json::Map`, which sorts keys
//! - Stable float format: f64 serialize consistently

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

use crate::node::{json::to_json, Node};
use crate::types::NodeError;

/// Serialize a value to canonical JSON bytes for hashing.
///
/// Serializing plain data to a `Vec` only fails for maps with non-string
/// keys; such values hash as the empty byte string.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_default()
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

/// Canonical bytes of a node tree.
pub fn node_canonical_bytes(node: &dyn Node) -> Result<Vec<u8>, NodeError> {
    Ok(to_canonical_bytes(&to_json(node)?))
}

/// Canonical hash of a node tree. Equal trees hash equal whatever their map
/// insertion order.
pub fn node_canonical_hash(node: &dyn Node) -> Result<u64, NodeError> {
    Ok(xxh64(&node_canonical_bytes(node)?, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::basic;

    #[derive(Serialize)]
    struct TestStruct {
        name: String,
        value: i32,
    }

    #[test]
    fn test_determinism() {
        let s = TestStruct {
            name: "test".to_string(),
            value: 42,
        };

        let h1 = canonical_hash(&s);
        let h2 = canonical_hash(&s);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_node_hash_ignores_insertion_order() {
        let a = basic::map([("x", basic::int(1)), ("y", basic::list([basic::null()]))]);
        let b = basic::map([("y", basic::list([basic::null()])), ("x", basic::int(1))]);
        assert_eq!(node_canonical_hash(a.as_ref()).unwrap(), node_canonical_hash(b.as_ref()).unwrap());
    }

    #[test]
    fn test_node_hash_changes_with_content() {
        let a = basic::map([("x", basic::int(1))]);
        let b = basic::map([("x", basic::int(2))]);
        assert_ne!(node_canonical_hash(a.as_ref()).unwrap(), node_canonical_hash(b.as_ref()).unwrap());
    }
}
