//! Kind taxonomy for the node data model.
//!
//! Every node has exactly one [`ReprKind`]. The set is closed: adding a kind
//! is a model version change, and every `match` over `ReprKind` in this crate
//! is exhaustive so the compiler flags what needs revisiting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Representation kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReprKind {
    /// Keyed collection of child nodes.
    Map,
    /// Ordered collection of child nodes.
    List,
    /// The null value.
    Null,
    /// Boolean scalar.
    Bool,
    /// Integer scalar.
    Int,
    /// Floating point scalar.
    Float,
    /// UTF-8 string scalar.
    String,
    /// Opaque byte string.
    Bytes,
    /// Content address of another tree.
    Link,
}

impl ReprKind {
    /// All kinds, in declaration order.
    pub const ALL: [ReprKind; 9] = [
        Self::Map,
        Self::List,
        Self::Null,
        Self::Bool,
        Self::Int,
        Self::Float,
        Self::String,
        Self::Bytes,
        Self::Link,
    ];

    /// Parse kind from its lowercase name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "map" => Some(Self::Map),
            "list" => Some(Self::List),
            "null" => Some(Self::Null),
            "bool" => Some(Self::Bool),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "string" => Some(Self::String),
            "bytes" => Some(Self::Bytes),
            "link" => Some(Self::Link),
            _ => None,
        }
    }

    /// Whether nodes of this kind have children.
    pub fn is_recursive(&self) -> bool {
        matches!(self, Self::Map | Self::List)
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for ReprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map => write!(f, "map"),
            Self::List => write!(f, "list"),
            Self::Null => write!(f, "null"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::Link => write!(f, "link"),
        }
    }
}

/// A fixed group of kinds.
///
/// Only used to describe which kinds an operation would have accepted when
/// it fails with a wrong-kind error.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReprKindSet(u16);

impl ReprKindSet {
    /// Only maps.
    pub const JUST_MAP: Self = Self(1 << 0);
    /// Only lists.
    pub const JUST_LIST: Self = Self(1 << 1);
    /// Only null.
    pub const JUST_NULL: Self = Self(1 << 2);
    /// Only bools.
    pub const JUST_BOOL: Self = Self(1 << 3);
    /// Only ints.
    pub const JUST_INT: Self = Self(1 << 4);
    /// Only floats.
    pub const JUST_FLOAT: Self = Self(1 << 5);
    /// Only strings.
    pub const JUST_STRING: Self = Self(1 << 6);
    /// Only bytes.
    pub const JUST_BYTES: Self = Self(1 << 7);
    /// Only links.
    pub const JUST_LINK: Self = Self(1 << 8);
    /// Kinds with children: map and list.
    pub const RECURSIVE: Self = Self(Self::JUST_MAP.0 | Self::JUST_LIST.0);
    /// Every kind without children.
    pub const SCALAR: Self = Self(Self::ALL.0 & !Self::RECURSIVE.0);
    /// Every kind.
    pub const ALL: Self = Self(0x1ff);

    /// Set holding a single kind.
    pub fn just(kind: ReprKind) -> Self {
        Self(kind.bit())
    }

    /// Whether the set contains `kind`.
    pub fn contains(&self, kind: ReprKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Union of two sets.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Number of kinds in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Kinds in the set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = ReprKind> + '_ {
        ReprKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl fmt::Display for ReprKindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, kind) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", kind)?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for ReprKindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReprKindSet{}", self)
    }
}

impl From<ReprKind> for ReprKindSet {
    fn from(kind: ReprKind) -> Self {
        Self::just(kind)
    }
}
