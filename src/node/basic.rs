//! Basic node implementations.
//!
//! Plain in-memory nodes, one type per kind, each built on its kind's mixin.
//! They are what the selector builder emits and what tests construct; codecs
//! are expected to bring their own node types.

use std::collections::HashMap;
use std::sync::Arc;

use crate::forward_mixin;
use crate::types::{Link, NodeError, PathSegment, ReprKind};
use super::{ListIterator, MapIterator, Node, NodeRef};

/// Map with insertion-ordered string keys.
#[derive(Debug, Clone, Default)]
pub struct BasicMap {
    entries: Vec<(Arc<str>, NodeRef)>,
    index: HashMap<Arc<str>, usize>,
}

impl BasicMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. A repeated key replaces the value but keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: NodeRef) {
        let key: Arc<str> = Arc::from(key.into());
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(Arc::clone(&key), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_ref())
    }

    /// Wrap into a shared node.
    pub fn into_node(self) -> NodeRef {
        Arc::new(self)
    }
}

impl Node for BasicMap {
    forward_mixin!(Map, "BasicMap");

    fn lookup_string(&self, key: &str) -> Result<NodeRef, NodeError> {
        self.index
            .get(key)
            .map(|&pos| Arc::clone(&self.entries[pos].1))
            .ok_or_else(|| NodeError::NotFound(PathSegment::parse(key)))
    }

    fn lookup(&self, key: &dyn Node) -> Result<NodeRef, NodeError> {
        self.lookup_string(key.as_string()?)
    }

    fn lookup_segment(&self, segment: &PathSegment) -> Result<NodeRef, NodeError> {
        match segment {
            PathSegment::Key(k) => self.lookup_string(k),
            PathSegment::Index(_) => self.lookup_string(&segment.as_key()),
        }
    }

    fn map_iterator(&self) -> Option<Box<dyn MapIterator + '_>> {
        Some(Box::new(BasicMapIterator { map: self, pos: 0 }))
    }

    fn length(&self) -> i64 {
        self.entries.len() as i64
    }
}

struct BasicMapIterator<'a> {
    map: &'a BasicMap,
    pos: usize,
}

impl MapIterator for BasicMapIterator<'_> {
    fn next(&mut self) -> Result<(NodeRef, NodeRef), NodeError> {
        let (key, value) = self.map.entries.get(self.pos).ok_or(NodeError::IteratorExhausted)?;
        self.pos += 1;
        let key: NodeRef = Arc::new(BasicString(Arc::clone(key)));
        Ok((key, Arc::clone(value)))
    }

    fn done(&self) -> bool {
        self.pos >= self.map.entries.len()
    }
}

/// List of nodes.
#[derive(Debug, Clone, Default)]
pub struct BasicList(Vec<NodeRef>);

impl BasicList {
    /// Create a list from elements.
    pub fn new(items: Vec<NodeRef>) -> Self {
        Self(items)
    }
}

impl Node for BasicList {
    forward_mixin!(List, "BasicList");

    fn lookup_index(&self, index: usize) -> Result<NodeRef, NodeError> {
        self.0.get(index).cloned().ok_or(NodeError::IndexOutOfRange {
            index,
            length: self.0.len(),
        })
    }

    fn lookup_segment(&self, segment: &PathSegment) -> Result<NodeRef, NodeError> {
        let index = segment.as_index().ok_or_else(|| NodeError::InvalidSegment {
            segment: segment.clone(),
            kind: ReprKind::List,
        })?;
        self.lookup_index(index)
    }

    fn list_iterator(&self) -> Option<Box<dyn ListIterator + '_>> {
        Some(Box::new(BasicListIterator { list: self, pos: 0 }))
    }

    fn length(&self) -> i64 {
        self.0.len() as i64
    }
}

struct BasicListIterator<'a> {
    list: &'a BasicList,
    pos: usize,
}

impl ListIterator for BasicListIterator<'_> {
    fn next(&mut self) -> Result<(usize, NodeRef), NodeError> {
        let item = self.list.0.get(self.pos).ok_or(NodeError::IteratorExhausted)?;
        let index = self.pos;
        self.pos += 1;
        Ok((index, Arc::clone(item)))
    }

    fn done(&self) -> bool {
        self.pos >= self.list.0.len()
    }
}

/// The null node.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicNull;

impl Node for BasicNull {
    forward_mixin!(Null, "BasicNull");
}

/// Boolean node.
#[derive(Debug, Clone, Copy)]
pub struct BasicBool(pub bool);

impl Node for BasicBool {
    forward_mixin!(Bool, "BasicBool");

    fn as_bool(&self) -> Result<bool, NodeError> {
        Ok(self.0)
    }
}

/// Integer node.
#[derive(Debug, Clone, Copy)]
pub struct BasicInt(pub i64);

impl Node for BasicInt {
    forward_mixin!(Int, "BasicInt");

    fn as_int(&self) -> Result<i64, NodeError> {
        Ok(self.0)
    }
}

/// Float node.
#[derive(Debug, Clone, Copy)]
pub struct BasicFloat(pub f64);

impl Node for BasicFloat {
    forward_mixin!(Float, "BasicFloat");

    fn as_float(&self) -> Result<f64, NodeError> {
        Ok(self.0)
    }
}

/// String node.
#[derive(Debug, Clone)]
pub struct BasicString(Arc<str>);

impl BasicString {
    /// Create a string node.
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }
}

impl Node for BasicString {
    forward_mixin!(String, "BasicString");

    fn as_string(&self) -> Result<&str, NodeError> {
        Ok(&self.0)
    }
}

/// Bytes node.
#[derive(Debug, Clone)]
pub struct BasicBytes(Vec<u8>);

impl BasicBytes {
    /// Create a bytes node.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

impl Node for BasicBytes {
    forward_mixin!(Bytes, "BasicBytes");

    fn as_bytes(&self) -> Result<&[u8], NodeError> {
        Ok(&self.0)
    }
}

/// Link node.
#[derive(Debug, Clone)]
pub struct BasicLink(pub Link);

impl Node for BasicLink {
    forward_mixin!(Link, "BasicLink");

    fn as_link(&self) -> Result<Link, NodeError> {
        Ok(self.0.clone())
    }
}

/// Map node from `(key, value)` pairs.
pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, NodeRef)>) -> NodeRef {
    let mut map = BasicMap::new();
    for (key, value) in entries {
        map.insert(key, value);
    }
    map.into_node()
}

/// List node.
pub fn list(items: impl IntoIterator<Item = NodeRef>) -> NodeRef {
    Arc::new(BasicList::new(items.into_iter().collect()))
}

/// Null node.
pub fn null() -> NodeRef {
    Arc::new(BasicNull)
}

/// Bool node.
pub fn bool(value: bool) -> NodeRef {
    Arc::new(BasicBool(value))
}

/// Int node.
pub fn int(value: i64) -> NodeRef {
    Arc::new(BasicInt(value))
}

/// Float node.
pub fn float(value: f64) -> NodeRef {
    Arc::new(BasicFloat(value))
}

/// String node.
pub fn string(value: impl Into<String>) -> NodeRef {
    Arc::new(BasicString::new(value))
}

/// Bytes node.
pub fn bytes(value: impl Into<Vec<u8>>) -> NodeRef {
    Arc::new(BasicBytes::new(value))
}

/// Link node.
pub fn link(value: Link) -> NodeRef {
    Arc::new(BasicLink(value))
}
