//! Capability requirements.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::clause::Clause;
use crate::format::{format_clause, ClauseFormat};

/// Namespace of bundle identity requirements.
pub const IDENTITY_NAMESPACE: &str = "osgi.identity";

/// A requirement in some capability namespace, e.g.
/// `osgi.identity;filter:='(osgi.identity=org.foo)'`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub namespace: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub directives: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
}

impl Requirement {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// Requirement on the bundle with symbolic name `bsn`.
    pub fn identity(bsn: &str) -> Self {
        let mut req = Self::new(IDENTITY_NAMESPACE);
        req.directives
            .insert("filter".to_string(), format!("({}={})", IDENTITY_NAMESPACE, bsn));
        req
    }

    pub fn filter(&self) -> Option<&str> {
        self.directives.get("filter").map(String::as_str)
    }

    /// Split a clause into namespace, directives and attributes.
    pub fn from_clause(clause: &Clause) -> Self {
        let mut req = Self::new(clause.name.clone());
        for (key, value) in &clause.attrs {
            match key.strip_suffix(':') {
                Some(directive) => {
                    req.directives.insert(directive.to_string(), value.clone());
                }
                None => {
                    req.attributes.insert(key.clone(), value.clone());
                }
            }
        }
        req
    }

    /// Attributes first, then directives.
    pub fn to_clause(&self) -> Clause {
        let mut clause = Clause::new(self.namespace.clone());
        for (key, value) in &self.attributes {
            clause.attrs.insert(key.clone(), value.clone());
        }
        for (key, value) in &self.directives {
            clause.attrs.insert(format!("{}:", key), value.clone());
        }
        clause
    }

    /// Single-line text form, quoting with `'` so filters stay readable.
    pub fn to_header(&self) -> String {
        let fmt = ClauseFormat {
            quote: '\'',
            ..ClauseFormat::default()
        };
        format_clause(&self.to_clause(), &fmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_header;

    #[test]
    fn test_identity_requirement() {
        let req = Requirement::identity("org.foo");
        assert_eq!(req.filter(), Some("(osgi.identity=org.foo)"));
        assert_eq!(req.to_header(), "osgi.identity;filter:='(osgi.identity=org.foo)'");
    }

    #[test]
    fn test_from_clause_splits_directives() {
        let clauses =
            parse_header("osgi.ee;filter:='(osgi.ee=JavaSE)';version:Version=1.8").unwrap();
        let req = Requirement::from_clause(&clauses[0]);
        assert_eq!(req.namespace, "osgi.ee");
        assert_eq!(req.filter(), Some("(osgi.ee=JavaSE)"));
        assert_eq!(req.attributes.get("version:Version").map(String::as_str), Some("1.8"));
    }

    #[test]
    fn test_header_parses_back() {
        let req = Requirement::identity("org.bar");
        let clauses = parse_header(&req.to_header()).unwrap();
        assert_eq!(Requirement::from_clause(&clauses[0]), req);
    }
}
