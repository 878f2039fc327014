//! Kind mixins: the fixed-output half of the node contract.
//!
//! There is one mixin per kind. A mixin holds only the concrete type name and
//! implements every [`Node`](super::Node) operation whose answer is fixed for
//! that kind, which is mostly returning a wrong-kind error. It does not
//! implement the operations that carry the kind's actual data (the `Int`
//! mixin has no `as_int`, the `Map` mixin has no `lookup_string`); the
//! concrete type writes those itself.
//!
//! Mixins are plain `Copy` values with `const fn` constructors, so a concrete
//! type can keep one in a `const` and forward to it with no per-node storage:
//!
//! ```rust
//! use ipld_kernel::node::{MapIterator, ListIterator, Node, NodeRef};
//! use ipld_kernel::types::{Link, NodeError, PathSegment, ReprKind};
//!
//! #[derive(Debug)]
//! struct Celsius(i64);
//!
//! impl Node for Celsius {
//!     ipld_kernel::forward_mixin!(Int, "Celsius");
//!
//!     fn as_int(&self) -> Result<i64, NodeError> {
//!         Ok(self.0)
//!     }
//! }
//!
//! let err = Celsius(21).as_string().unwrap_err();
//! assert_eq!(err.as_wrong_kind().unwrap().type_name, "Celsius");
//! ```

use crate::types::{ErrWrongKind, NodeError, ReprKind, ReprKindSet};
use super::{ListIterator, MapIterator, NodeRef};

/// Build the wrong-kind error every mixin returns.
pub fn wrong_kind(
    type_name: &'static str,
    method_name: &'static str,
    appropriate_kind: ReprKindSet,
    actual_kind: ReprKind,
) -> NodeError {
    NodeError::WrongKind(ErrWrongKind {
        type_name,
        method_name,
        appropriate_kind,
        actual_kind,
    })
}

macro_rules! kind_mixin {
    (
        $(#[$meta:meta])*
        $name:ident => $kind:ident { $($method:ident),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            /// Concrete type name reported in wrong-kind errors.
            pub type_name: &'static str,
        }

        impl $name {
            /// Mixin for the concrete type called `type_name`.
            pub const fn new(type_name: &'static str) -> Self {
                Self { type_name }
            }

            /// Fixed kind of every node built on this mixin.
            pub fn repr_kind(&self) -> ReprKind {
                ReprKind::$kind
            }

            $( kind_mixin!(@method $method, $kind); )*
        }
    };

    (@method lookup_string, $kind:ident) => {
        /// Fails: only maps have string keys.
        pub fn lookup_string(&self, _key: &str) -> Result<NodeRef, NodeError> {
            Err(wrong_kind(self.type_name, "lookup_string", ReprKindSet::JUST_MAP, ReprKind::$kind))
        }
    };
    (@method lookup, $kind:ident) => {
        /// Fails: only maps have keys.
        pub fn lookup(&self, _key: &dyn super::Node) -> Result<NodeRef, NodeError> {
            Err(wrong_kind(self.type_name, "lookup", ReprKindSet::JUST_MAP, ReprKind::$kind))
        }
    };
    (@method lookup_index, $kind:ident) => {
        /// Fails: only lists have indices.
        pub fn lookup_index(&self, _index: usize) -> Result<NodeRef, NodeError> {
            Err(wrong_kind(self.type_name, "lookup_index", ReprKindSet::JUST_LIST, ReprKind::$kind))
        }
    };
    (@method lookup_segment, $kind:ident) => {
        /// Fails: only maps and lists have children.
        pub fn lookup_segment(&self, _segment: &crate::types::PathSegment) -> Result<NodeRef, NodeError> {
            Err(wrong_kind(self.type_name, "lookup_segment", ReprKindSet::RECURSIVE, ReprKind::$kind))
        }
    };
    (@method map_iterator, $kind:ident) => {
        /// No entries to iterate.
        pub fn map_iterator<'a>(&self) -> Option<Box<dyn MapIterator + 'a>> {
            None
        }
    };
    (@method list_iterator, $kind:ident) => {
        /// No elements to iterate.
        pub fn list_iterator<'a>(&self) -> Option<Box<dyn ListIterator + 'a>> {
            None
        }
    };
    (@method length, $kind:ident) => {
        /// Not applicable.
        pub fn length(&self) -> i64 {
            -1
        }
    };
    (@method is_undefined, $kind:ident) => {
        /// Always false: only absent values are undefined.
        pub fn is_undefined(&self) -> bool {
            false
        }
    };
    (@method is_null, $kind:ident) => {
        /// True only for the null mixin.
        pub fn is_null(&self) -> bool {
            matches!(ReprKind::$kind, ReprKind::Null)
        }
    };
    (@method as_bool, $kind:ident) => {
        /// Fails: not a bool.
        pub fn as_bool(&self) -> Result<bool, NodeError> {
            Err(wrong_kind(self.type_name, "as_bool", ReprKindSet::JUST_BOOL, ReprKind::$kind))
        }
    };
    (@method as_int, $kind:ident) => {
        /// Fails: not an int.
        pub fn as_int(&self) -> Result<i64, NodeError> {
            Err(wrong_kind(self.type_name, "as_int", ReprKindSet::JUST_INT, ReprKind::$kind))
        }
    };
    (@method as_float, $kind:ident) => {
        /// Fails: not a float.
        pub fn as_float(&self) -> Result<f64, NodeError> {
            Err(wrong_kind(self.type_name, "as_float", ReprKindSet::JUST_FLOAT, ReprKind::$kind))
        }
    };
    (@method as_string, $kind:ident) => {
        /// Fails: not a string.
        pub fn as_string<'a>(&self) -> Result<&'a str, NodeError> {
            Err(wrong_kind(self.type_name, "as_string", ReprKindSet::JUST_STRING, ReprKind::$kind))
        }
    };
    (@method as_bytes, $kind:ident) => {
        /// Fails: not bytes.
        pub fn as_bytes<'a>(&self) -> Result<&'a [u8], NodeError> {
            Err(wrong_kind(self.type_name, "as_bytes", ReprKindSet::JUST_BYTES, ReprKind::$kind))
        }
    };
    (@method as_link, $kind:ident) => {
        /// Fails: not a link.
        pub fn as_link(&self) -> Result<crate::types::Link, NodeError> {
            Err(wrong_kind(self.type_name, "as_link", ReprKindSet::JUST_LINK, ReprKind::$kind))
        }
    };
}

kind_mixin! {
    /// Fixed-output operations for map-kinded nodes.
    ///
    /// The concrete type still writes `lookup_string`, `lookup`,
    /// `lookup_segment`, `map_iterator` and `length`.
    Map => Map {
        lookup_index, list_iterator, is_undefined, is_null,
        as_bool, as_int, as_float, as_string, as_bytes, as_link,
    }
}

kind_mixin! {
    /// Fixed-output operations for list-kinded nodes.
    ///
    /// The concrete type still writes `lookup_index`, `lookup_segment`,
    /// `list_iterator` and `length`.
    List => List {
        lookup_string, lookup, map_iterator, is_undefined, is_null,
        as_bool, as_int, as_float, as_string, as_bytes, as_link,
    }
}

kind_mixin! {
    /// Fixed-output operations for the null node. Nothing is left to write.
    Null => Null {
        lookup_string, lookup, lookup_index, lookup_segment,
        map_iterator, list_iterator, length, is_undefined, is_null,
        as_bool, as_int, as_float, as_string, as_bytes, as_link,
    }
}

kind_mixin! {
    /// Fixed-output operations for bool-kinded nodes.
    Bool => Bool {
        lookup_string, lookup, lookup_index, lookup_segment,
        map_iterator, list_iterator, length, is_undefined, is_null,
        as_int, as_float, as_string, as_bytes, as_link,
    }
}

kind_mixin! {
    /// Fixed-output operations for int-kinded nodes.
    Int => Int {
        lookup_string, lookup, lookup_index, lookup_segment,
        map_iterator, list_iterator, length, is_undefined, is_null,
        as_bool, as_float, as_string, as_bytes, as_link,
    }
}

kind_mixin! {
    /// Fixed-output operations for float-kinded nodes.
    Float => Float {
        lookup_string, lookup, lookup_index, lookup_segment,
        map_iterator, list_iterator, length, is_undefined, is_null,
        as_bool, as_int, as_string, as_bytes, as_link,
    }
}

kind_mixin! {
    /// Fixed-output operations for string-kinded nodes.
    String => String {
        lookup_string, lookup, lookup_index, lookup_segment,
        map_iterator, list_iterator, length, is_undefined, is_null,
        as_bool, as_int, as_float, as_bytes, as_link,
    }
}

kind_mixin! {
    /// Fixed-output operations for bytes-kinded nodes.
    Bytes => Bytes {
        lookup_string, lookup, lookup_index, lookup_segment,
        map_iterator, list_iterator, length, is_undefined, is_null,
        as_bool, as_int, as_float, as_string, as_link,
    }
}

kind_mixin! {
    /// Fixed-output operations for link-kinded nodes.
    Link => Link {
        lookup_string, lookup, lookup_index, lookup_segment,
        map_iterator, list_iterator, length, is_undefined, is_null,
        as_bool, as_int, as_float, as_string, as_bytes,
    }
}

/// Forward every fixed-output [`Node`](crate::node::Node) method of a kind to
/// that kind's mixin.
///
/// Use inside `impl Node for T`; also emits `repr_kind` and `type_name`. The
/// methods the mixin leaves out are still yours to write. The expansion names
/// `NodeRef`, `NodeError`, `PathSegment`, `Link`, `MapIterator` and
/// `ListIterator`, so those must be in scope.
#[macro_export]
macro_rules! forward_mixin {
    (Map, $type_name:expr) => {
        $crate::forward_mixin!(@forward $crate::node::mixins::Map::new($type_name);
            lookup_index, list_iterator, is_undefined, is_null,
            as_bool, as_int, as_float, as_string, as_bytes, as_link);
    };
    (List, $type_name:expr) => {
        $crate::forward_mixin!(@forward $crate::node::mixins::List::new($type_name);
            lookup_string, lookup, map_iterator, is_undefined, is_null,
            as_bool, as_int, as_float, as_string, as_bytes, as_link);
    };
    (Null, $type_name:expr) => {
        $crate::forward_mixin!(@forward $crate::node::mixins::Null::new($type_name);
            lookup_string, lookup, lookup_index, lookup_segment,
            map_iterator, list_iterator, length, is_undefined, is_null,
            as_bool, as_int, as_float, as_string, as_bytes, as_link);
    };
    (Bool, $type_name:expr) => {
        $crate::forward_mixin!(@forward $crate::node::mixins::Bool::new($type_name);
            lookup_string, lookup, lookup_index, lookup_segment,
            map_iterator, list_iterator, length, is_undefined, is_null,
            as_int, as_float, as_string, as_bytes, as_link);
    };
    (Int, $type_name:expr) => {
        $crate::forward_mixin!(@forward $crate::node::mixins::Int::new($type_name);
            lookup_string, lookup, lookup_index, lookup_segment,
            map_iterator, list_iterator, length, is_undefined, is_null,
            as_bool, as_float, as_string, as_bytes, as_link);
    };
    (Float, $type_name:expr) => {
        $crate::forward_mixin!(@forward $crate::node::mixins::Float::new($type_name);
            lookup_string, lookup, lookup_index, lookup_segment,
            map_iterator, list_iterator, length, is_undefined, is_null,
            as_bool, as_int, as_string, as_bytes, as_link);
    };
    (String, $type_name:expr) => {
        $crate::forward_mixin!(@forward $crate::node::mixins::String::new($type_name);
            lookup_string, lookup, lookup_index, lookup_segment,
            map_iterator, list_iterator, length, is_undefined, is_null,
            as_bool, as_int, as_float, as_bytes, as_link);
    };
    (Bytes, $type_name:expr) => {
        $crate::forward_mixin!(@forward $crate::node::mixins::Bytes::new($type_name);
            lookup_string, lookup, lookup_index, lookup_segment,
            map_iterator, list_iterator, length, is_undefined, is_null,
            as_bool, as_int, as_float, as_string, as_link);
    };
    (Link, $type_name:expr) => {
        $crate::forward_mixin!(@forward $crate::node::mixins::Link::new($type_name);
            lookup_string, lookup, lookup_index, lookup_segment,
            map_iterator, list_iterator, length, is_undefined, is_null,
            as_bool, as_int, as_float, as_string, as_bytes);
    };

    (@forward $mixin:expr; $($method:ident),* $(,)?) => {
        fn repr_kind(&self) -> $crate::types::ReprKind {
            $mixin.repr_kind()
        }
        fn type_name(&self) -> &'static str {
            $mixin.type_name
        }
        $( $crate::forward_mixin!(@fn $mixin, $method); )*
    };

    (@fn $mixin:expr, lookup_string) => {
        fn lookup_string(&self, key: &str) -> Result<NodeRef, NodeError> {
            $mixin.lookup_string(key)
        }
    };
    (@fn $mixin:expr, lookup) => {
        fn lookup(&self, key: &dyn $crate::node::Node) -> Result<NodeRef, NodeError> {
            $mixin.lookup(key)
        }
    };
    (@fn $mixin:expr, lookup_index) => {
        fn lookup_index(&self, index: usize) -> Result<NodeRef, NodeError> {
            $mixin.lookup_index(index)
        }
    };
    (@fn $mixin:expr, lookup_segment) => {
        fn lookup_segment(&self, segment: &PathSegment) -> Result<NodeRef, NodeError> {
            $mixin.lookup_segment(segment)
        }
    };
    (@fn $mixin:expr, map_iterator) => {
        fn map_iterator(&self) -> Option<Box<dyn MapIterator + '_>> {
            $mixin.map_iterator()
        }
    };
    (@fn $mixin:expr, list_iterator) => {
        fn list_iterator(&self) -> Option<Box<dyn ListIterator + '_>> {
            $mixin.list_iterator()
        }
    };
    (@fn $mixin:expr, length) => {
        fn length(&self) -> i64 {
            $mixin.length()
        }
    };
    (@fn $mixin:expr, is_undefined) => {
        fn is_undefined(&self) -> bool {
            $mixin.is_undefined()
        }
    };
    (@fn $mixin:expr, is_null) => {
        fn is_null(&self) -> bool {
            $mixin.is_null()
        }
    };
    (@fn $mixin:expr, as_bool) => {
        fn as_bool(&self) -> Result<bool, NodeError> {
            $mixin.as_bool()
        }
    };
    (@fn $mixin:expr, as_int) => {
        fn as_int(&self) -> Result<i64, NodeError> {
            $mixin.as_int()
        }
    };
    (@fn $mixin:expr, as_float) => {
        fn as_float(&self) -> Result<f64, NodeError> {
            $mixin.as_float()
        }
    };
    (@fn $mixin:expr, as_string) => {
        fn as_string(&self) -> Result<&str, NodeError> {
            $mixin.as_string()
        }
    };
    (@fn $mixin:expr, as_bytes) => {
        fn as_bytes(&self) -> Result<&[u8], NodeError> {
            $mixin.as_bytes()
        }
    };
    (@fn $mixin:expr, as_link) => {
        fn as_link(&self) -> Result<Link, NodeError> {
            $mixin.as_link()
        }
    };
}
