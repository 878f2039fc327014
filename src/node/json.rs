//! Bridge between `serde_json::Value` and nodes.
//!
//! Lets fixtures and selector descriptions be written as JSON. Links and
//! bytes use the reserved `"/"` key:
//!
//! - link: `{"/": "<address>"}`
//! - bytes: `{"/": {"bytes": "<hex>"}}`
//!
//! Map keys come out sorted (`serde_json::Map` is a `BTreeMap`), which makes
//! [`to_json`] usable as a canonical form.

use serde_json::{Map as JsonMap, Number, Value};

use crate::types::{Link, NodeError, ReprKind};
use super::{basic, Node, NodeRef};

/// Reserved key marking links and bytes.
pub const RESERVED_KEY: &str = "/";

/// Build a node tree from a JSON value.
///
/// Integers that fit in `i64` become ints, every other number becomes a float.
/// A reserved-key object that does not match the link or bytes form is kept
/// as an ordinary map.
pub fn from_json(value: &Value) -> NodeRef {
    match value {
        Value::Null => basic::null(),
        Value::Bool(b) => basic::bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => basic::int(i),
            None => basic::float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => basic::string(s.as_str()),
        Value::Array(items) => basic::list(items.iter().map(from_json)),
        Value::Object(obj) => {
            if let Some(node) = reserved_form(obj) {
                return node;
            }
            basic::map(obj.iter().map(|(k, v)| (k.as_str(), from_json(v))))
        }
    }
}

fn reserved_form(obj: &JsonMap<String, Value>) -> Option<NodeRef> {
    if obj.len() != 1 {
        return None;
    }
    match obj.get(RESERVED_KEY)? {
        Value::String(address) => Some(basic::link(Link::new(address.as_str()))),
        Value::Object(inner) if inner.len() == 1 => {
            let encoded = inner.get("bytes")?.as_str()?;
            hex::decode(encoded).ok().map(basic::bytes)
        }
        _ => None,
    }
}

/// Render a node tree as JSON.
///
/// Non-finite floats have no JSON form and render as `null`.
pub fn to_json(node: &dyn Node) -> Result<Value, NodeError> {
    let value = match node.repr_kind() {
        ReprKind::Map => {
            let mut out = JsonMap::new();
            if let Some(mut it) = node.map_iterator() {
                while !it.done() {
                    let (key, value) = it.next()?;
                    out.insert(key.as_string()?.to_string(), to_json(value.as_ref())?);
                }
            }
            Value::Object(out)
        }
        ReprKind::List => {
            let mut out = Vec::new();
            if let Some(mut it) = node.list_iterator() {
                while !it.done() {
                    let (_, value) = it.next()?;
                    out.push(to_json(value.as_ref())?);
                }
            }
            Value::Array(out)
        }
        ReprKind::Null => Value::Null,
        ReprKind::Bool => Value::Bool(node.as_bool()?),
        ReprKind::Int => Value::Number(node.as_int()?.into()),
        ReprKind::Float => Number::from_f64(node.as_float()?)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ReprKind::String => Value::String(node.as_string()?.to_string()),
        ReprKind::Bytes => {
            let mut inner = JsonMap::new();
            inner.insert("bytes".to_string(), Value::String(hex::encode(node.as_bytes()?)));
            let mut out = JsonMap::new();
            out.insert(RESERVED_KEY.to_string(), Value::Object(inner));
            Value::Object(out)
        }
        ReprKind::Link => {
            let mut out = JsonMap::new();
            out.insert(RESERVED_KEY.to_string(), Value::String(node.as_link()?.to_string()));
            Value::Object(out)
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::node_eq;
    use serde_json::json;

    #[test]
    fn test_from_json_kinds() {
        let node = from_json(&json!({
            "n": null,
            "b": true,
            "i": -3,
            "f": 1.5,
            "s": "hi",
            "l": [1, 2],
            "link": {"/": "sha256:abc"},
            "bytes": {"/": {"bytes": "0102"}},
        }));
        assert_eq!(node.repr_kind(), ReprKind::Map);
        assert!(node.lookup_string("n").unwrap().is_null());
        assert!(node.lookup_string("b").unwrap().as_bool().unwrap());
        assert_eq!(node.lookup_string("i").unwrap().as_int().unwrap(), -3);
        assert_eq!(node.lookup_string("f").unwrap().as_float().unwrap(), 1.5);
        assert_eq!(node.lookup_string("s").unwrap().as_string().unwrap(), "hi");
        assert_eq!(node.lookup_string("l").unwrap().length(), 2);
        assert_eq!(
            node.lookup_string("link").unwrap().as_link().unwrap(),
            Link::new("sha256:abc")
        );
        assert_eq!(node.lookup_string("bytes").unwrap().as_bytes().unwrap(), &[1, 2]);
    }

    #[test]
    fn test_malformed_reserved_form_stays_a_map() {
        let node = from_json(&json!({"/": {"bytes": "zz"}}));
        assert_eq!(node.repr_kind(), ReprKind::Map);
        let node = from_json(&json!({"/": "x", "other": 1}));
        assert_eq!(node.repr_kind(), ReprKind::Map);
    }

    #[test]
    fn test_to_json_preserves_structure() {
        let value = json!({"a": [1, {"/": "addr"}], "b": {"/": {"bytes": "ff"}}, "c": "x"});
        let node = from_json(&value);
        assert_eq!(to_json(node.as_ref()).unwrap(), value);
        assert!(node_eq(from_json(&to_json(node.as_ref()).unwrap()).as_ref(), node.as_ref()));
    }
}
