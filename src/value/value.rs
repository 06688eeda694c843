//! Document tree values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value is one node of a decoded resource or overlay document.
///
/// Resources and overlays share this representation; overlays additionally
/// carry anchors inside their map keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`. Smaller integers decode as `Int`.
    Uint(u64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

/// Map is a string-keyed object. Key order carries no meaning; iteration is
/// sorted so that emitted patches are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Map {
    pub fields: BTreeMap<String, Value>,
}

/// Kind is the tag of a [`Value`], used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    List,
    Map,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::List => "list",
            Kind::Map => "map",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) | Value::Uint(_) | Value::Float(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
        }
    }

    /// Returns true for null, booleans, numbers and strings.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Renders a scalar the way it would be written in a document, without
    /// quoting strings. Returns None for null, lists and maps.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Uint(u) => Some(u.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            // Decoders disagree on whether 443 is an integer or a float.
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Int(a), Value::Uint(b)) | (Value::Uint(b), Value::Int(a)) => {
                i128::from(*a) == i128::from(*b)
            }
            (Value::Uint(a), Value::Float(b)) | (Value::Float(b), Value::Uint(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

impl Map {
    pub fn new() -> Self {
        Map {
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Map {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Parse a value from JSON.
pub fn from_json(json: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parse a value from JSON bytes.
pub fn from_json_slice(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Serialize a value to JSON.
pub fn to_json(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Parse a value from YAML. JSON input is accepted as well.
pub fn from_yaml(yaml: &str) -> Result<Value, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

/// Serialize a value to YAML.
pub fn to_yaml(value: &Value) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::Null.kind(), Kind::Null);
        assert_eq!(Value::Int(1).kind(), Kind::Number);
        assert_eq!(Value::Float(1.5).kind(), Kind::Number);
        assert_eq!(Value::List(vec![]).kind(), Kind::List);
        assert_eq!(Value::Map(Map::new()).kind(), Kind::Map);
        assert!(Value::String("x".into()).is_scalar());
        assert!(!Value::Map(Map::new()).is_scalar());
    }

    #[test]
    fn test_numeric_equality_across_representations() {
        assert_eq!(Value::Int(443), Value::Float(443.0));
        assert_eq!(Value::Float(443.0), Value::Int(443));
        assert_ne!(Value::Int(443), Value::Float(443.5));
        assert_ne!(Value::Int(1), Value::String("1".into()));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn test_decode_numbers() {
        let v = from_json(r#"{"port":443,"ratio":0.5}"#).unwrap();
        let m = v.as_map().unwrap();
        assert!(matches!(m.get("port"), Some(Value::Int(443))));
        assert!(matches!(m.get("ratio"), Some(Value::Float(_))));
    }

    #[test]
    fn test_decode_large_unsigned_is_exact() {
        let v = from_json(r#"{"a":18446744073709551615,"b":9223372036854775807}"#).unwrap();
        let m = v.as_map().unwrap();
        assert!(matches!(m.get("a"), Some(Value::Uint(u64::MAX))));
        assert!(matches!(m.get("b"), Some(Value::Int(i64::MAX))));
        assert_eq!(to_json(&v).unwrap(), r#"{"a":18446744073709551615,"b":9223372036854775807}"#);
        assert_eq!(Value::Uint(5), Value::Int(5));
        assert_ne!(Value::Uint(u64::MAX), Value::Int(-1));
    }

    #[test]
    fn test_yaml_and_json_agree() {
        let from_j = from_json(r#"{"metadata":{"labels":{"app":"nginx"}},"replicas":3}"#).unwrap();
        let from_y = from_yaml("metadata:\n  labels:\n    app: nginx\nreplicas: 3\n").unwrap();
        assert_eq!(from_j, from_y);
    }

    #[test]
    fn test_json_roundtrip() {
        let value = Value::Map({
            let mut m = Map::new();
            m.set("name", Value::String("test".into()));
            m.set("count", Value::Int(42));
            m.set("tags", Value::List(vec![Value::Bool(true), Value::Null]));
            m
        });

        let json = to_json(&value).unwrap();
        assert_eq!(json, r#"{"count":42,"name":"test","tags":[true,null]}"#);
        assert_eq!(from_json(&json).unwrap(), value);
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(Value::Int(8080).scalar_text().as_deref(), Some("8080"));
        assert_eq!(Value::Bool(true).scalar_text().as_deref(), Some("true"));
        assert_eq!(Value::from("nginx").scalar_text().as_deref(), Some("nginx"));
        assert_eq!(Value::Null.scalar_text(), None);
        assert_eq!(Value::List(vec![]).scalar_text(), None);
    }
}
