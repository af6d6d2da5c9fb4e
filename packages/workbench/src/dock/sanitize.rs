//! Snapshot scrubbing.
//!
//! Persisted layouts may come back from older application versions, from
//! hand edits, or from a serializer that leaked host runtime state into
//! the document. One recursive visitor walks the raw JSON and applies a
//! fixed per-field rule table before the tree is ever typed. The visitor
//! is total (any JSON in, JSON out, no failure path) and idempotent.

use serde_json::{Map, Value};

/// Keys that only ever hold host runtime state. Dropped wherever they
/// appear, at any depth.
pub const FORBIDDEN_KEYS: &[&str] = &[
    "parent",
    "container",
    "element",
    "component",
    "instance",
    "callbacks",
    "listeners",
];

enum FieldRule {
    Drop,
    CoerceString,
    EnsureObject,
}

fn rule_for(key: &str) -> Option<FieldRule> {
    if FORBIDDEN_KEYS.contains(&key) {
        return Some(FieldRule::Drop);
    }
    match key {
        "title" | "type" => Some(FieldRule::CoerceString),
        "config" => Some(FieldRule::EnsureObject),
        _ => None,
    }
}

/// Applies the rule table to every object in the document.
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize_object(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        primitive => primitive,
    }
}

fn sanitize_object(map: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        match rule_for(&key) {
            Some(FieldRule::Drop) => {}
            Some(FieldRule::CoerceString) => {
                out.insert(key, Value::String(coerce_string(&value)));
            }
            Some(FieldRule::EnsureObject) => {
                out.insert(key, ensure_object(value));
            }
            None => {
                out.insert(key, sanitize(value));
            }
        }
    }
    // Tab nodes always carry a config object, even if the stored node lost it.
    if out.get("type").and_then(Value::as_str) == Some("tab") && !out.contains_key("config") {
        out.insert("config".to_string(), Value::Object(Map::new()));
    }
    out
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn ensure_object(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize_object(map)),
        _ => Value::Object(Map::new()),
    }
}

/// Migrates pre-root snapshots in place: a flat `content` list becomes a
/// `root` node, wrapped in a synthesized row when there is more than one
/// entry. Documents already carrying `root`, and documents with nothing
/// usable, pass through for validation to judge.
pub fn normalize_shape(value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };
    if map.contains_key("root") {
        return Value::Object(map);
    }
    let Some(Value::Array(children)) = map.remove("content") else {
        return Value::Object(map);
    };
    match children.len() {
        0 => {}
        1 => {
            if let Some(only) = children.into_iter().next() {
                map.insert("root".to_string(), only);
            }
        }
        _ => {
            map.insert(
                "root".to_string(),
                serde_json::json!({ "type": "row", "children": children }),
            );
        }
    }
    Value::Object(map)
}

/// Structural gate before typed deserialization: the document must be an
/// object with an object-valued `root`.
pub fn validate(value: &Value) -> bool {
    value.get("root").map(Value::is_object).unwrap_or(false)
}
