//! Converters and formatters.
//!
//! A [`Codec`] turns the logical text of an instruction into a [`Value`]
//! (`convert`) and a value back into document-form text (`format`). The two
//! are inverses up to whitespace and quoting normalization.

use bndedit_header::{
    format_clause, parse_header, quote, split_outside_quotes, unquote, Clause, ClauseFormat,
    Requirement,
};
use bndedit_properties::escape_value;
use indexmap::IndexMap;
use tracing::{debug, warn};

use super::value::Value;

/// Separator between list items: a comma and a continuation onto an
/// indented line.
pub const LIST_SEPARATOR: &str = ",\\\n\t";

/// Separator between the lines of a multi-line text value.
pub const NEWLINE_LINE_SEPARATOR: &str = "\\n\\\n\t";

/// Marker for an explicitly empty list.
pub const EMPTY_HEADER: &str = "<<EMPTY>>";

/// Attribute separator of the expanded clause style.
const EXPANDED_ATTR_SEPARATOR: &str = ";\\\n\t\t";

/// What an empty collection formats to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyOutput {
    /// No text: the key is removed.
    Remove,
    /// This literal text.
    Text(&'static str),
}

/// Layout of formatted clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseStyle {
    /// `name;a=1;b=2`
    Compact,
    /// Every attribute on its own continuation line.
    Expanded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("a {codec} instruction cannot hold a {found} value")]
    TypeMismatch {
        codec: &'static str,
        found: &'static str,
    },
}

/// Converter/formatter family of a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Codec {
    /// Text passed through unchanged.
    Identity,
    /// Free text; with `escape_newlines` multi-line values are written one
    /// line per continuation line.
    Text { escape_newlines: bool },
    /// `true`/`false`; the default value is written as removal.
    Bool { default: bool },
    /// Comma separated plain strings.
    List {
        separator: &'static str,
        empty: EmptyOutput,
    },
    /// Comma separated header clauses.
    Clauses {
        separator: &'static str,
        style: ClauseStyle,
        empty: EmptyOutput,
    },
    /// Comma separated `key=value` pairs.
    Map { separator: &'static str },
    /// Comma separated capability requirements.
    Requirements { separator: &'static str },
    /// One of a fixed set of names.
    Enum {
        members: &'static [&'static str],
        default: Option<&'static str>,
    },
}

impl Codec {
    /// Name of the family, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Identity => "identity",
            Codec::Text { .. } => "text",
            Codec::Bool { .. } => "boolean",
            Codec::List { .. } => "list",
            Codec::Clauses { .. } => "clause list",
            Codec::Map { .. } => "map",
            Codec::Requirements { .. } => "requirement list",
            Codec::Enum { .. } => "enumeration",
        }
    }

    /// Whether values of this codec are collections that [`Value::extend_with`]
    /// can append to.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Codec::List { .. } | Codec::Clauses { .. } | Codec::Map { .. } | Codec::Requirements { .. }
        )
    }

    /// Convert logical text (`None` when the key is absent) into a value.
    ///
    /// Never fails: unparsable text yields the codec's error value.
    pub fn convert(&self, raw: Option<&str>) -> Value {
        match self {
            Codec::Identity | Codec::Text { .. } => Value::from(raw.map(str::to_string)),
            Codec::Bool { default } => match raw.map(str::trim) {
                None | Some("") => Value::Bool(*default),
                Some(s) if s.eq_ignore_ascii_case("true") => Value::Bool(true),
                Some(s) if s.eq_ignore_ascii_case("false") => Value::Bool(false),
                Some(s) => {
                    debug!(value = s, "not a boolean, using false");
                    Value::Bool(false)
                }
            },
            Codec::List { .. } => Value::List(raw.map(parse_list).unwrap_or_default()),
            Codec::Clauses { .. } => Value::Clauses(raw.map(parse_clauses).unwrap_or_default()),
            Codec::Map { .. } => Value::Map(raw.map(parse_map).unwrap_or_default()),
            Codec::Requirements { .. } => Value::Requirements(
                raw.map(parse_clauses)
                    .unwrap_or_default()
                    .iter()
                    .map(Requirement::from_clause)
                    .collect(),
            ),
            Codec::Enum { members, default } => {
                let fallback = || default.map_or(Value::None, |d| Value::Enum(d.to_string()));
                match raw.map(str::trim) {
                    None | Some("") => fallback(),
                    Some(s) => match members.iter().find(|m| m.eq_ignore_ascii_case(s)) {
                        Some(member) => Value::Enum(member.to_string()),
                        None => {
                            warn!(value = s, allowed = ?members, "invalid enumeration value");
                            fallback()
                        }
                    },
                }
            }
        }
    }

    /// Format a value into document-form text.
    ///
    /// `Ok(None)` means the key should be removed from the document.
    pub fn format(&self, value: &Value) -> Result<Option<String>, CodecError> {
        if value.is_none() {
            return Ok(None);
        }
        let mismatch = || CodecError::TypeMismatch {
            codec: self.name(),
            found: value.kind(),
        };

        let text = match (self, value) {
            (Codec::Identity, Value::Text(s)) => Some(escape_value(s)),
            (Codec::Text { escape_newlines }, Value::Text(s)) => Some(if *escape_newlines {
                s.split('\n')
                    .map(escape_value)
                    .collect::<Vec<_>>()
                    .join(NEWLINE_LINE_SEPARATOR)
            } else {
                escape_value(s)
            }),
            (Codec::Bool { default }, Value::Bool(b)) => {
                (b != default).then(|| b.to_string())
            }
            (Codec::List { separator, empty }, Value::List(items)) => {
                join_or_empty(items.iter().map(|s| escape_value(&quote_item(s))), separator, *empty)
            }
            (Codec::Clauses { separator, style, empty }, Value::Clauses(clauses)) => {
                let fmt = ClauseFormat {
                    attr_separator: match style {
                        ClauseStyle::Compact => ";",
                        ClauseStyle::Expanded => EXPANDED_ATTR_SEPARATOR,
                    },
                    quote: '"',
                    escape: escape_value,
                };
                join_or_empty(clauses.iter().map(|c| format_clause(c, &fmt)), separator, *empty)
            }
            (Codec::Map { separator }, Value::Map(map)) => join_or_empty(
                map.iter().map(|(k, v)| {
                    format!("{}={}", escape_value(k), escape_value(&quote(v, '"')))
                }),
                separator,
                EmptyOutput::Remove,
            ),
            (Codec::Requirements { separator }, Value::Requirements(reqs)) => {
                let fmt = ClauseFormat {
                    quote: '\'',
                    escape: escape_value,
                    ..ClauseFormat::default()
                };
                join_or_empty(
                    reqs.iter().map(|r| format_clause(&r.to_clause(), &fmt)),
                    separator,
                    EmptyOutput::Remove,
                )
            }
            (Codec::Enum { default, .. }, Value::Enum(s) | Value::Text(s)) => {
                (Some(s.as_str()) != *default).then(|| escape_value(s))
            }
            _ => return Err(mismatch()),
        };
        Ok(text)
    }
}

fn join_or_empty(
    items: impl Iterator<Item = String>,
    separator: &str,
    empty: EmptyOutput,
) -> Option<String> {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        return match empty {
            EmptyOutput::Remove => None,
            EmptyOutput::Text(text) => Some(text.to_string()),
        };
    }
    Some(items.join(separator))
}

fn split_items(raw: &str) -> Vec<String> {
    let pieces = split_outside_quotes(raw, ',').unwrap_or_else(|e| {
        debug!(error = %e, "unbalanced quotes in list, splitting on every comma");
        raw.split(',').map(str::to_string).collect()
    });
    pieces
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Quote a list item that would otherwise split or lose whitespace.
fn quote_item(item: &str) -> String {
    if item.contains(',') || item.starts_with(['"', '\'']) || item.trim() != item {
        quote(item, '"')
    } else {
        item.to_string()
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    let items = split_items(raw);
    if items.len() == 1 && items[0] == EMPTY_HEADER {
        return Vec::new();
    }
    items
        .into_iter()
        .map(|item| {
            if !item.starts_with(['"', '\'']) {
                return item;
            }
            unquote(&item).unwrap_or_else(|e| {
                debug!(item = %item, error = %e, "keeping unbalanced quotes");
                item
            })
        })
        .collect()
}

fn parse_clauses(raw: &str) -> Vec<Clause> {
    match parse_header(raw) {
        Ok(clauses) if clauses.len() == 1 && clauses[0].name == EMPTY_HEADER => Vec::new(),
        Ok(clauses) => clauses,
        Err(e) => {
            debug!(error = %e, "unparsable clause list");
            Vec::new()
        }
    }
}

fn parse_map(raw: &str) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for item in split_items(raw) {
        let (key, value) = match item.split_once('=') {
            Some((k, v)) => (k.trim().to_string(), v),
            None => (item.clone(), ""),
        };
        match unquote(value) {
            Ok(value) => {
                map.insert(key, value);
            }
            Err(e) => debug!(key = %key, error = %e, "dropping map entry"),
        }
    }
    map
}
