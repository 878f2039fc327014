//! Reification: turn a selector description node into a [`Selector`].
//!
//! The description is itself a node tree (see the wire vocabulary in
//! [`crate::selector`]). Every structural problem is reported here, before
//! any traversal starts, with the path of the offending description node.
//! No partial selector is ever returned.
//!
//! ## Recursion Checks
//!
//! - A recursion edge must sit inside an ExploreRecursive sequence.
//! - Between the top of the sequence and the edge there must be at least one
//!   explore step, or the edge would re-apply the sequence to the same node
//!   forever.
//! - A `none` limit is refused unless [`ReifyOptions::allow_unbounded_recursion`]
//!   is set; a driver enabling it is expected to guard against cycles itself.

use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeRef};
use crate::types::{NodeError, ReprKind, ReprKindSet};
use super::{keys, ExploreFields, Matcher, RecursionLimit, Selector};

/// Options for reification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReifyOptions {
    /// Accept ExploreRecursive with a `none` limit.
    pub allow_unbounded_recursion: bool,
}

impl ReifyOptions {
    /// Options accepting unbounded recursion.
    pub fn permissive() -> Self {
        Self { allow_unbounded_recursion: true }
    }
}

/// Error type for reification. Every variant carries the description path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReifyError {
    /// Description node has the wrong kind.
    #[error("{path}: expected {expected}, found {actual}")]
    WrongKind {
        /// Description path.
        path: String,
        /// Acceptable kinds.
        expected: ReprKindSet,
        /// Kind found.
        actual: ReprKind,
    },
    /// Variant key not recognized.
    #[error("{path}: unknown selector variant {key:?}")]
    UnknownVariant {
        /// Description path.
        path: String,
        /// Key found.
        key: String,
    },
    /// Selector map does not have exactly one key.
    #[error("{path}: selector must have exactly one variant key, found {count}")]
    AmbiguousVariant {
        /// Description path.
        path: String,
        /// Number of keys found.
        count: i64,
    },
    /// Field not part of the variant's schema.
    #[error("{path}: unknown field {field:?}")]
    UnknownField {
        /// Description path.
        path: String,
        /// Field name found.
        field: String,
    },
    /// Required field absent.
    #[error("{path}: missing required field {field:?}")]
    MissingField {
        /// Description path.
        path: String,
        /// Field name.
        field: &'static str,
    },
    /// Index, range or depth out of bounds.
    #[error("{path}: invalid bound: {reason}")]
    InvalidBound {
        /// Description path.
        path: String,
        /// What is wrong.
        reason: String,
    },
    /// Union with no members.
    #[error("{path}: union must have at least one member")]
    EmptyUnion {
        /// Description path.
        path: String,
    },
    /// Recursion edge with no enclosing recursive selector.
    #[error("{path}: recursion edge outside of any recursive selector")]
    EdgeOutsideRecursion {
        /// Description path.
        path: String,
    },
    /// Recursion edge reachable without exploring a child.
    #[error("{path}: recursion edge reached without exploring a child, recursion would never advance")]
    EdgeWithoutProgress {
        /// Description path.
        path: String,
    },
    /// Unbounded recursion not allowed by the options.
    #[error("{path}: unbounded recursion requires an explicit depth limit")]
    UnboundedRecursion {
        /// Description path.
        path: String,
    },
    /// The description node itself failed while being read.
    #[error("{path}: {source}")]
    Node {
        /// Description path.
        path: String,
        /// Underlying node error.
        #[source]
        source: NodeError,
    },
}

impl ReifyError {
    /// Path of the description node that failed.
    pub fn path(&self) -> &str {
        match self {
            Self::WrongKind { path, .. }
            | Self::UnknownVariant { path, .. }
            | Self::AmbiguousVariant { path, .. }
            | Self::UnknownField { path, .. }
            | Self::MissingField { path, .. }
            | Self::InvalidBound { path, .. }
            | Self::EmptyUnion { path }
            | Self::EdgeOutsideRecursion { path }
            | Self::EdgeWithoutProgress { path }
            | Self::UnboundedRecursion { path }
            | Self::Node { path, .. } => path,
        }
    }
}

/// Reify with default options (explicit recursion depth required).
pub fn reify_selector(description: &dyn Node) -> Result<Selector, ReifyError> {
    reify_selector_with(description, &ReifyOptions::default())
}

/// Reify with explicit options.
pub fn reify_selector_with(
    description: &dyn Node,
    options: &ReifyOptions,
) -> Result<Selector, ReifyError> {
    let mut parser = Parser {
        options,
        path: Vec::new(),
        recursion: Vec::new(),
    };
    match parser.selector(description) {
        Ok(selector) => {
            tracing::debug!(variant = selector.variant(), "reified selector");
            Ok(selector)
        }
        Err(e) => {
            tracing::debug!(path = e.path(), error = %e, "rejected selector description");
            Err(e)
        }
    }
}

/// Per ExploreRecursive being parsed: whether an explore step separates the
/// current position from the top of its sequence.
struct RecursionFrame {
    progressed: bool,
}

struct Parser<'o> {
    options: &'o ReifyOptions,
    path: Vec<String>,
    recursion: Vec<RecursionFrame>,
}

impl Parser<'_> {
    fn selector(&mut self, node: &dyn Node) -> Result<Selector, ReifyError> {
        self.expect_kind(node, ReprKindSet::JUST_MAP)?;
        if node.length() != 1 {
            return Err(ReifyError::AmbiguousVariant {
                path: self.render_path(),
                count: node.length(),
            });
        }
        let (key, body) = self.single_entry(node)?;
        self.nested(&key, |p| p.variant(&key, body.as_ref()))
    }

    fn variant(&mut self, key: &str, body: &dyn Node) -> Result<Selector, ReifyError> {
        match key {
            keys::MATCHER => self.matcher(body),
            keys::EXPLORE_ALL => {
                self.expect_fields(body, &[keys::NEXT])?;
                let next = self.continuation(body, keys::NEXT)?;
                Ok(Selector::explore_all(next))
            }
            keys::EXPLORE_FIELDS => self.explore_fields(body),
            keys::EXPLORE_INDEX => {
                self.expect_fields(body, &[keys::INDEX, keys::NEXT])?;
                let index = self.non_negative(body, keys::INDEX)?;
                let next = self.continuation(body, keys::NEXT)?;
                Ok(Selector::explore_index(index, next))
            }
            keys::EXPLORE_RANGE => self.explore_range(body),
            keys::EXPLORE_RECURSIVE => self.explore_recursive(body),
            keys::EXPLORE_UNION => self.explore_union(body),
            keys::RECURSIVE_EDGE => self.recursive_edge(body),
            other => Err(ReifyError::UnknownVariant {
                path: self.render_parent_path(),
                key: other.to_string(),
            }),
        }
    }

    fn matcher(&mut self, body: &dyn Node) -> Result<Selector, ReifyError> {
        self.expect_fields(body, &[keys::LABEL])?;
        let label = match body.lookup_string(keys::LABEL) {
            Ok(label) => Some(self.nested(keys::LABEL, |p| p.string(label.as_ref()))?),
            Err(NodeError::NotFound(_)) => None,
            Err(e) => return Err(self.node_error(e)),
        };
        Ok(Selector::Matcher(Matcher { label }))
    }

    fn explore_fields(&mut self, body: &dyn Node) -> Result<Selector, ReifyError> {
        self.expect_fields(body, &[keys::FIELDS])?;
        let fields = self.field(body, keys::FIELDS)?;
        self.nested(keys::FIELDS, |p| {
            p.expect_kind(fields.as_ref(), ReprKindSet::JUST_MAP)?;
            let mut out = Vec::new();
            if let Some(mut it) = fields.map_iterator() {
                while !it.done() {
                    let (name, value) = it.next().map_err(|e| p.node_error(e))?;
                    let name = p.string(name.as_ref())?;
                    let selector = p.nested(&name, |p| p.progressing(|p| p.selector(value.as_ref())))?;
                    out.push((name, selector));
                }
            }
            Ok(Selector::ExploreFields(ExploreFields::new(out)))
        })
    }

    fn explore_range(&mut self, body: &dyn Node) -> Result<Selector, ReifyError> {
        self.expect_fields(body, &[keys::START, keys::END, keys::NEXT])?;
        let start = self.non_negative(body, keys::START)?;
        let end = self.non_negative(body, keys::END)?;
        if end <= start {
            return Err(ReifyError::InvalidBound {
                path: self.render_path(),
                reason: format!("range end {} must be greater than start {}", end, start),
            });
        }
        let next = self.continuation(body, keys::NEXT)?;
        Ok(Selector::explore_range(start, end, next))
    }

    fn explore_recursive(&mut self, body: &dyn Node) -> Result<Selector, ReifyError> {
        self.expect_fields(body, &[keys::LIMIT, keys::SEQUENCE])?;
        let limit_node = self.field(body, keys::LIMIT)?;
        let limit = self.nested(keys::LIMIT, |p| p.recursion_limit(limit_node.as_ref()))?;
        if !limit.is_bounded() && !self.options.allow_unbounded_recursion {
            return Err(ReifyError::UnboundedRecursion {
                path: self.render_path(),
            });
        }
        let sequence_node = self.field(body, keys::SEQUENCE)?;
        self.recursion.push(RecursionFrame { progressed: false });
        let sequence = self.nested(keys::SEQUENCE, |p| p.selector(sequence_node.as_ref()));
        self.recursion.pop();
        Ok(Selector::explore_recursive(limit, sequence?))
    }

    fn recursion_limit(&mut self, node: &dyn Node) -> Result<RecursionLimit, ReifyError> {
        self.expect_kind(node, ReprKindSet::JUST_MAP)?;
        if node.length() != 1 {
            return Err(ReifyError::AmbiguousVariant {
                path: self.render_path(),
                count: node.length(),
            });
        }
        let (key, value) = self.single_entry(node)?;
        match key.as_str() {
            keys::LIMIT_DEPTH => {
                let depth = self.nested(keys::LIMIT_DEPTH, |p| p.int_bound(value.as_ref()))?;
                Ok(RecursionLimit::Depth(depth as u64))
            }
            keys::LIMIT_NONE => {
                self.nested(keys::LIMIT_NONE, |p| p.expect_fields(value.as_ref(), &[]))?;
                Ok(RecursionLimit::None)
            }
            other => Err(ReifyError::UnknownVariant {
                path: self.render_path(),
                key: other.to_string(),
            }),
        }
    }

    fn explore_union(&mut self, body: &dyn Node) -> Result<Selector, ReifyError> {
        self.expect_kind(body, ReprKindSet::JUST_LIST)?;
        let mut members = Vec::new();
        if let Some(mut it) = body.list_iterator() {
            while !it.done() {
                let (index, member) = it.next().map_err(|e| self.node_error(e))?;
                members.push(self.nested(&index.to_string(), |p| p.selector(member.as_ref()))?);
            }
        }
        if members.is_empty() {
            return Err(ReifyError::EmptyUnion {
                path: self.render_path(),
            });
        }
        Ok(Selector::explore_union(members))
    }

    fn recursive_edge(&mut self, body: &dyn Node) -> Result<Selector, ReifyError> {
        self.expect_fields(body, &[])?;
        match self.recursion.last() {
            None => Err(ReifyError::EdgeOutsideRecursion {
                path: self.render_path(),
            }),
            Some(frame) if !frame.progressed => Err(ReifyError::EdgeWithoutProgress {
                path: self.render_path(),
            }),
            Some(_) => Ok(Selector::RecursiveEdge),
        }
    }

    /// Required continuation field of an explore step.
    fn continuation(&mut self, body: &dyn Node, name: &'static str) -> Result<Selector, ReifyError> {
        let node = self.field(body, name)?;
        self.nested(name, |p| p.progressing(|p| p.selector(node.as_ref())))
    }

    /// Run `f` with the innermost recursion marked as having explored a child.
    fn progressing<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ReifyError>) -> Result<T, ReifyError> {
        let saved = self.recursion.last().map(|frame| frame.progressed);
        if let Some(frame) = self.recursion.last_mut() {
            frame.progressed = true;
        }
        let result = f(self);
        if let (Some(frame), Some(saved)) = (self.recursion.last_mut(), saved) {
            frame.progressed = saved;
        }
        result
    }

    /// Run `f` with `segment` appended to the description path.
    fn nested<T>(
        &mut self,
        segment: &str,
        f: impl FnOnce(&mut Self) -> Result<T, ReifyError>,
    ) -> Result<T, ReifyError> {
        self.path.push(segment.to_string());
        let result = f(self);
        self.path.pop();
        result
    }

    fn field(&self, body: &dyn Node, name: &'static str) -> Result<NodeRef, ReifyError> {
        match body.lookup_string(name) {
            Ok(node) => Ok(node),
            Err(NodeError::NotFound(_)) => Err(ReifyError::MissingField {
                path: self.render_path(),
                field: name,
            }),
            Err(e) => Err(self.node_error(e)),
        }
    }

    fn non_negative(&mut self, body: &dyn Node, name: &'static str) -> Result<usize, ReifyError> {
        let node = self.field(body, name)?;
        self.nested(name, |p| p.int_bound(node.as_ref()))
    }

    /// Int that is non-negative and fits a `usize`.
    fn int_bound(&mut self, node: &dyn Node) -> Result<usize, ReifyError> {
        self.expect_kind(node, ReprKindSet::JUST_INT)?;
        let value = node.as_int().map_err(|e| self.node_error(e))?;
        usize::try_from(value).map_err(|_| ReifyError::InvalidBound {
            path: self.render_path(),
            reason: format!("{} is negative", value),
        })
    }

    fn string(&mut self, node: &dyn Node) -> Result<String, ReifyError> {
        self.expect_kind(node, ReprKindSet::JUST_STRING)?;
        node.as_string()
            .map(str::to_string)
            .map_err(|e| self.node_error(e))
    }

    fn single_entry(&self, node: &dyn Node) -> Result<(String, NodeRef), ReifyError> {
        let mut it = node.map_iterator().ok_or_else(|| ReifyError::WrongKind {
            path: self.render_path(),
            expected: ReprKindSet::JUST_MAP,
            actual: node.repr_kind(),
        })?;
        let (key, value) = it.next().map_err(|e| self.node_error(e))?;
        let key = key.as_string().map_err(|e| self.node_error(e))?.to_string();
        Ok((key, value))
    }

    /// `body` must be a map whose keys all appear in `allowed`.
    fn expect_fields(&self, body: &dyn Node, allowed: &[&str]) -> Result<(), ReifyError> {
        self.expect_kind(body, ReprKindSet::JUST_MAP)?;
        if let Some(mut it) = body.map_iterator() {
            while !it.done() {
                let (key, _) = it.next().map_err(|e| self.node_error(e))?;
                let key = key.as_string().map_err(|e| self.node_error(e))?;
                if !allowed.iter().any(|name| *name == key) {
                    return Err(ReifyError::UnknownField {
                        path: self.render_path(),
                        field: key.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn expect_kind(&self, node: &dyn Node, expected: ReprKindSet) -> Result<(), ReifyError> {
        let actual = node.repr_kind();
        if expected.contains(actual) {
            Ok(())
        } else {
            Err(ReifyError::WrongKind {
                path: self.render_path(),
                expected,
                actual,
            })
        }
    }

    fn node_error(&self, source: NodeError) -> ReifyError {
        ReifyError::Node {
            path: self.render_path(),
            source,
        }
    }

    fn render_path(&self) -> String {
        format!("/{}", self.path.join("/"))
    }

    fn render_parent_path(&self) -> String {
        let end = self.path.len().saturating_sub(1);
        format!("/{}", self.path[..end].join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::json::from_json;
    use serde_json::{json, Value};

    fn reify(value: Value) -> Result<Selector, ReifyError> {
        reify_selector(from_json(&value).as_ref())
    }

    #[test]
    fn test_every_variant_reifies() {
        let desc = json!({"|": [
            {".": {}},
            {"a": {">": {".": {}}}},
            {"f": {"f>": {"x": {".": {}}}}},
            {"i": {"i": 2, ">": {".": {}}}},
            {"r": {"^": 1, "$": 3, ">": {".": {}}}},
            {"R": {"l": {"depth": 3}, ":>": {"a": {">": {"@": {}}}}}},
        ]});
        let sel = reify(desc).unwrap();
        match sel {
            Selector::ExploreUnion(u) => {
                let variants: Vec<_> = u.members().iter().map(|m| m.variant()).collect();
                assert_eq!(variants, vec![".", "a", "f", "i", "r", "R"]);
            }
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_matcher_label() {
        let sel = reify(json!({".": {"label": "hit"}})).unwrap();
        assert_eq!(sel, Selector::Matcher(Matcher::labeled("hit")));
        let err = reify(json!({".": {"label": 3}})).unwrap_err();
        assert_eq!(err.path(), "/./label");
    }

    #[test]
    fn test_root_must_be_map() {
        let err = reify(json!(["a"])).unwrap_err();
        assert_eq!(
            err,
            ReifyError::WrongKind {
                path: "/".to_string(),
                expected: ReprKindSet::JUST_MAP,
                actual: ReprKind::List
            }
        );
    }

    #[test]
    fn test_unknown_variant() {
        let err = reify(json!({"a": {">": {"zz": {}}}})).unwrap_err();
        assert_eq!(
            err,
            ReifyError::UnknownVariant {
                path: "/a/>".to_string(),
                key: "zz".to_string()
            }
        );
    }

    #[test]
    fn test_ambiguous_variant() {
        let err = reify(json!({".": {}, "a": {">": {".": {}}}})).unwrap_err();
        assert!(matches!(err, ReifyError::AmbiguousVariant { count: 2, .. }));
        let err = reify(json!({})).unwrap_err();
        assert!(matches!(err, ReifyError::AmbiguousVariant { count: 0, .. }));
    }

    #[test]
    fn test_fields_must_be_map() {
        let err = reify(json!({"f": {"f>": ["x"]}})).unwrap_err();
        assert_eq!(err.path(), "/f/f>");
        assert!(matches!(err, ReifyError::WrongKind { actual: ReprKind::List, .. }));
    }

    #[test]
    fn test_missing_continuation() {
        let err = reify(json!({"a": {}})).unwrap_err();
        assert_eq!(
            err,
            ReifyError::MissingField {
                path: "/a".to_string(),
                field: ">"
            }
        );
    }

    #[test]
    fn test_nested_error_path() {
        let err = reify(json!({"f": {"f>": {"x": {"i": {"i": "one", ">": {".": {}}}}}}})).unwrap_err();
        assert_eq!(err.path(), "/f/f>/x/i/i");
    }

    #[test]
    fn test_negative_and_float_bounds_rejected() {
        let err = reify(json!({"i": {"i": -1, ">": {".": {}}}})).unwrap_err();
        assert!(matches!(err, ReifyError::InvalidBound { .. }));

        let err = reify(json!({"R": {"l": {"depth": 1.5}, ":>": {"a": {">": {"@": {}}}}}})).unwrap_err();
        assert!(matches!(err, ReifyError::WrongKind { expected: ReprKindSet::JUST_INT, .. }));
        assert_eq!(err.path(), "/R/l/depth");

        let err = reify(json!({"R": {"l": {"depth": -2}, ":>": {"a": {">": {"@": {}}}}}})).unwrap_err();
        assert!(matches!(err, ReifyError::InvalidBound { .. }));
    }

    #[test]
    fn test_range_end_after_start() {
        let err = reify(json!({"r": {"^": 3, "$": 3, ">": {".": {}}}})).unwrap_err();
        assert!(matches!(err, ReifyError::InvalidBound { .. }));
    }

    #[test]
    fn test_empty_union() {
        let err = reify(json!({"|": []})).unwrap_err();
        assert_eq!(err, ReifyError::EmptyUnion { path: "/|".to_string() });
    }

    #[test]
    fn test_edge_outside_recursion() {
        let err = reify(json!({"a": {">": {"@": {}}}})).unwrap_err();
        assert_eq!(err, ReifyError::EdgeOutsideRecursion { path: "/a/>/@".to_string() });
    }

    #[test]
    fn test_edge_without_progress() {
        let err = reify(json!({"R": {"l": {"depth": 2}, ":>": {"|": [{".": {}}, {"@": {}}]}}})).unwrap_err();
        assert_eq!(err, ReifyError::EdgeWithoutProgress { path: "/R/:>/|/1/@".to_string() });
    }

    #[test]
    fn test_edge_binds_to_innermost_recursion() {
        // The inner recursion restarts the progress check for its own sequence.
        let err = reify(json!({"R": {"l": {"depth": 2}, ":>": {"a": {">":
            {"R": {"l": {"depth": 1}, ":>": {"@": {}}}}
        }}}}))
        .unwrap_err();
        assert!(matches!(err, ReifyError::EdgeWithoutProgress { .. }));
    }

    #[test]
    fn test_unbounded_recursion_needs_opt_in() {
        let desc = from_json(&json!({"R": {"l": {"none": {}}, ":>": {"a": {">": {"@": {}}}}}}));
        let err = reify_selector(desc.as_ref()).unwrap_err();
        assert_eq!(err, ReifyError::UnboundedRecursion { path: "/R".to_string() });

        let sel = reify_selector_with(desc.as_ref(), &ReifyOptions::permissive()).unwrap();
        match sel {
            Selector::ExploreRecursive(r) => assert_eq!(r.limit(), RecursionLimit::None),
            other => panic!("expected recursive, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_limit_kind() {
        let err = reify(json!({"R": {"l": {"forever": {}}, ":>": {"a": {">": {"@": {}}}}}})).unwrap_err();
        assert_eq!(
            err,
            ReifyError::UnknownVariant {
                path: "/R/l".to_string(),
                key: "forever".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let cases = [
            (json!({"a": {">": {".": {}}, "bogus": 1}}), "/a", "bogus"),
            (json!({".": {"lable": "x"}}), "/.", "lable"),
            (json!({"f": {"f>": {"x": {".": {}}}, "f<": {}}}), "/f", "f<"),
            (json!({"r": {"^": 0, "$": 2, ">": {".": {}}, "step": 1}}), "/r", "step"),
            (json!({"R": {"l": {"depth": 1}, ":>": {"a": {">": {"@": {"x": 1}}}}}}), "/R/:>/a/>/@", "x"),
            (json!({"R": {"l": {"none": {"x": 1}}, ":>": {"a": {">": {"@": {}}}}}}), "/R/l/none", "x"),
        ];
        for (desc, path, field) in cases {
            let err = reify(desc.clone()).unwrap_err();
            assert_eq!(
                err,
                ReifyError::UnknownField {
                    path: path.to_string(),
                    field: field.to_string()
                },
                "description {}",
                desc
            );
        }
    }

    #[test]
    fn test_field_names_inside_f_map_are_free() {
        // Keys of the `f>` map name data fields, not schema fields.
        assert!(reify(json!({"f": {"f>": {"bogus": {".": {}}}}})).is_ok());
    }

    #[test]
    fn test_error_messages_name_the_path() {
        let err = reify(json!({"a": {}})).unwrap_err();
        assert_eq!(err.to_string(), "/a: missing required field \">\"");
    }
}
