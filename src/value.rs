//! Runtime value model.
//!
//! Descriptors validate plain in-memory values, not host objects. `Value`
//! is the closed set of runtime shapes the checker understands: the JSON
//! scalars plus three container kinds (sequence, set, mapping). Every
//! variant is totally ordered, so any value can sit inside a set or key a
//! mapping; floats go through `OrderedFloat` to make that order total.

use std::collections::{BTreeMap, BTreeSet};
use ordered_float::OrderedFloat;

// ------------------------------- Values ---------------------------------- //

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    Array(Vec<Value>),
    Set(BTreeSet<Value>),
    Map(BTreeMap<Value, Value>),
}

impl Value {
    pub fn float(f: f64) -> Value {
        Value::Float(OrderedFloat(f))
    }

    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    /// Stable lowercase word for diagnostics ("expected X, got `integer`").
    /// Container variants take their word from `ContainerKind::name` so
    /// the two never drift apart.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => ContainerKind::Sequence.name(),
            Value::Set(_) => ContainerKind::Set.name(),
            Value::Map(_) => ContainerKind::Mapping.name(),
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<Value>> {
        match self {
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<Value, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Render back out as JSON. Sets become arrays; mapping keys that are
    /// not strings are rendered as their compact JSON text. Non-finite
    /// floats become null (JSON has no NaN/inf).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::from(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(f.0)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::from(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Set(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => {
                let mut out = serde_json::Map::new();
                for (k, v) in entries {
                    let key = match k {
                        Value::Str(s) => s.clone(),
                        other => other.to_json().to_string(),
                    };
                    out.insert(key, v.to_json());
                }
                serde_json::Value::Object(out)
            }
        }
    }
}

/// JSON documents come in through `serde_json`; numbers that are exact
/// `i64` stay integers, everything else numeric (including `u64` beyond
/// `i64::MAX`) widens through `f64`. JSON cannot produce a `Set`.
impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::float(u as f64)
                } else {
                    Value::float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(xs) => Value::Array(xs.iter().map(Value::from).collect()),
            serde_json::Value::Object(m) => {
                let mut entries = BTreeMap::new();
                for (k, v) in m {
                    entries.insert(Value::Str(k.clone()), Value::from(v));
                }
                Value::Map(entries)
            }
        }
    }
}

// --------------------------- Container kinds ------------------------------ //

/// The structural category of a container value, independent of element
/// types. "Is this value of kind K" is answered here and nowhere else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    /// Ordered, integer-indexed, iterable, no fixed length bound.
    Sequence,
    Set,
    Mapping,
}

impl ContainerKind {
    pub fn of(value: &Value) -> Option<ContainerKind> {
        match value {
            Value::Array(_) => Some(ContainerKind::Sequence),
            Value::Set(_) => Some(ContainerKind::Set),
            Value::Map(_) => Some(ContainerKind::Mapping),
            _ => None,
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        ContainerKind::of(value) == Some(self)
    }

    pub fn name(self) -> &'static str {
        match self {
            ContainerKind::Sequence => "sequence",
            ContainerKind::Set => "set",
            ContainerKind::Mapping => "mapping",
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
