//! Typed values produced by codecs.

use bndedit_header::{Clause, Requirement};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The typed form of an instruction value.
///
/// Which variant a key produces is decided by its [`Codec`](super::Codec).
/// `None` means the key is absent (or, when set, that it should be removed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    #[default]
    None,
    Text(String),
    Bool(bool),
    List(Vec<String>),
    Clauses(Vec<Clause>),
    Map(IndexMap<String, String>),
    Requirements(Vec<Requirement>),
    Enum(String),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Text(_) => "text",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::Clauses(_) => "clauses",
            Value::Map(_) => "map",
            Value::Requirements(_) => "requirements",
            Value::Enum(_) => "enum",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Text of a `Text` or `Enum` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_clauses(&self) -> Option<&[Clause]> {
        match self {
            Value::Clauses(clauses) => Some(clauses),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, String>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_requirements(&self) -> Option<&[Requirement]> {
        match self {
            Value::Requirements(reqs) => Some(reqs),
            _ => None,
        }
    }

    /// Number of items of a collection value, `None` for scalars.
    pub fn item_count(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(items.len()),
            Value::Clauses(clauses) => Some(clauses.len()),
            Value::Map(map) => Some(map.len()),
            Value::Requirements(reqs) => Some(reqs.len()),
            _ => None,
        }
    }

    /// Append the items of `other` to this collection value.
    ///
    /// Returns `false` (and leaves `self` untouched) when the two values are
    /// not collections of the same kind. `None` adopts `other`.
    pub fn extend_with(&mut self, other: Value) -> bool {
        if self.is_none() && other.item_count().is_some() {
            *self = other;
            return true;
        }
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                a.extend(b);
                true
            }
            (Value::Clauses(a), Value::Clauses(b)) => {
                a.extend(b);
                true
            }
            (Value::Map(a), Value::Map(b)) => {
                a.extend(b);
                true
            }
            (Value::Requirements(a), Value::Requirements(b)) => {
                a.extend(b);
                true
            }
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Option<String>> for Value {
    fn from(text: Option<String>) -> Self {
        text.map_or(Value::None, Value::Text)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<Clause>> for Value {
    fn from(clauses: Vec<Clause>) -> Self {
        Value::Clauses(clauses)
    }
}

impl From<Vec<Requirement>> for Value {
    fn from(reqs: Vec<Requirement>) -> Self {
        Value::Requirements(reqs)
    }
}

impl From<IndexMap<String, String>> for Value {
    fn from(map: IndexMap<String, String>) -> Self {
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_same_kind() {
        let mut v = Value::List(vec!["a".into()]);
        assert!(v.extend_with(Value::List(vec!["b".into()])));
        assert_eq!(v, Value::List(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_extend_none_adopts_collection() {
        let mut v = Value::None;
        assert!(v.extend_with(Value::Clauses(vec![Clause::new("x")])));
        assert_eq!(v.item_count(), Some(1));
    }

    #[test]
    fn test_extend_rejects_mismatch() {
        let mut v = Value::Text("a".into());
        assert!(!v.extend_with(Value::List(vec![])));
        assert_eq!(v, Value::Text("a".into()));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(Value::Bool(true)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "bool", "value": true}));
        let json = serde_json::to_value(Value::None).unwrap();
        assert_eq!(json, serde_json::json!({"type": "none"}));
    }
}
