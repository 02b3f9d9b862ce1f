//! The document value tree stored by both the cache and the store.
//!
//! The data model leaves the choice between a typed tree and an opaque byte
//! buffer open; this workspace picks the typed tree (see `DESIGN.md`) so the
//! cache and store can each enforce their own size cap against a real
//! in-memory shape rather than trusting a caller-supplied byte count. A
//! `BTreeMap` backs object fields (rather than a `HashMap`) so two
//! structurally-equal documents always serialize identically, which matters
//! for the compaction and backup round-trip tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A JSON-serializable document value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Estimates the in-memory/serialized size of this value in bytes by
    /// round-tripping through compact JSON. This is the same yardstick the
    /// store uses for its on-disk `totalSize` statistic, so a cache size
    /// check and a store size check agree on what "1 MiB" means.
    pub fn approximate_size(&self) -> usize {
        serde_json::to_vec(self).map(|bytes| bytes.len()).unwrap_or(0)
    }

    /// Converts from an untyped `serde_json::Value`, the wire format used by
    /// the HTTP boundary and by the store's on-disk JSON files.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts to an untyped `serde_json::Value` for JSON serialization.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::from_json(value)
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        value.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_through_json() {
        let original = json!({"n": 1, "items": [1, "two", null, true], "nested": {"x": 1.5}});
        let value = Value::from_json(original.clone());
        let back = value.to_json();
        assert_eq!(original, back);
    }

    #[test]
    fn approximate_size_reflects_content() {
        let small = Value::from_json(json!({"a": 1}));
        let large = Value::from_json(json!({"a": "x".repeat(10_000)}));
        assert!(large.approximate_size() > small.approximate_size());
    }
}
