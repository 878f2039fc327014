//! Path segments and paths.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a path: a map key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// Map key.
    Key(String),
    /// List index.
    Index(usize),
}

impl PathSegment {
    /// Parse a segment from text.
    ///
    /// Text stays a key even when it looks numeric; lists read it back through
    /// [`PathSegment::as_index`].
    pub fn parse(s: &str) -> Self {
        Self::Key(s.to_string())
    }

    /// Segment as a list index.
    ///
    /// Keys are accepted when they are plain decimal numbers.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(k) => {
                if k.is_empty() || !k.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                // "01" is a key, not an index
                if k.len() > 1 && k.starts_with('0') {
                    return None;
                }
                k.parse().ok()
            }
        }
    }

    /// Segment as a map key.
    pub fn as_key(&self) -> String {
        match self {
            Self::Key(k) => k.clone(),
            Self::Index(i) => i.to_string(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => write!(f, "{}", k),
            Self::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

/// Ordered sequence of segments from a traversal root.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// The empty path (the root itself).
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from segments.
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Parse a `/`-separated path. Empty parts are ignored.
    pub fn parse(s: &str) -> Self {
        Self(
            s.split('/')
                .filter(|part| !part.is_empty())
                .map(PathSegment::parse)
                .collect(),
        )
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    /// New path with `segment` appended.
    pub fn join(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend(self.0.iter().cloned());
        segments.push(segment);
        Self(segments)
    }

    /// Segments in order.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}
