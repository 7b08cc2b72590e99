//! Clause type.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered attribute map of a clause.
///
/// Directive keys carry a trailing `:` (`resolution:`), attribute keys do not.
/// Typed attributes keep their type in the key (`count:Long`).
pub type Attrs = IndexMap<String, String>;

/// One clause of a header: a name plus ordered attributes and directives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attrs: Attrs,
}

impl Clause {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attrs(name: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            name: name.into(),
            attrs,
        }
    }

    /// Builder: add an attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Builder: add a directive (`key:=value`).
    pub fn directive(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(format!("{}:", key), value.into());
        self
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn get_directive(&self, key: &str) -> Option<&str> {
        self.attrs.get(&format!("{}:", key)).map(String::as_str)
    }

    /// The `version` attribute, if any.
    pub fn version(&self) -> Option<&str> {
        self.get_attr("version")
    }

    pub fn set_version(&mut self, version: Option<&str>) {
        match version {
            Some(v) => {
                self.attrs.insert("version".to_string(), v.to_string());
            }
            None => {
                self.attrs.shift_remove("version");
            }
        }
    }

    /// Whether `key` names a directive.
    pub fn is_directive_key(key: &str) -> bool {
        key.ends_with(':')
    }
}
