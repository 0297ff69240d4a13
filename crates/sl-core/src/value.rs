use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A flexible property value attached to items, characters, and players.
///
/// Documents are loosely typed, so a value keeps whatever shape the author
/// wrote: plain text, a number, a flag, or embedded structured data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A boolean value.
    Boolean(bool),
    /// A 64-bit signed integer value.
    Integer(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A text value.
    String(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A string-keyed map of values.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the boolean, accepting the text forms `true`/`false`/`yes`/`no`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::String(s) => match s.to_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns the value as an integer. Whole floats and numeric text convert.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements of a list value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries of a map value.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Flatten a value into a list of strings.
    ///
    /// A list yields its scalar elements, a comma-separated string yields its
    /// trimmed parts, and any other scalar yields itself.
    pub fn to_string_list(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.iter().map(|v| v.to_string()).collect(),
            Self::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Self::Map(_) => Vec::new(),
            other => vec![other.to_string()],
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::String(String::new()),
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(_) => write!(f, "{{...}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_json_shapes() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"lockpicking": 2, "tags": ["a", "b"], "ok": true}"#).unwrap();
        let value = Value::from(json);
        let map = value.as_map().unwrap();
        assert_eq!(map["lockpicking"], Value::Integer(2));
        assert_eq!(map["ok"].as_bool(), Some(true));
        assert_eq!(map["tags"].to_string_list(), vec!["a", "b"]);
    }

    #[test]
    fn loose_accessors() {
        assert_eq!(Value::from("yes").as_bool(), Some(true));
        assert_eq!(Value::from(" 7 ").as_int(), Some(7));
        assert_eq!(Value::Float(3.0).as_int(), Some(3));
        assert_eq!(Value::Float(3.5).as_int(), None);
    }

    #[test]
    fn comma_text_splits_into_list() {
        assert_eq!(
            Value::from("key, brass key").to_string_list(),
            vec!["key", "brass key"]
        );
    }

    #[test]
    fn display_list() {
        let v = Value::List(vec![Value::Integer(1), Value::from("two")]);
        assert_eq!(v.to_string(), "[1, two]");
    }
}
