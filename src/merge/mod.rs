//! Merge groups.
//!
//! A merged instruction is spread over several keys: the stem itself and
//! any number of `stem.suffix` keys (`-plugin`, `-plugin.1.maven`,
//! `-plugin.2.local`), possibly in different layers of the inheritance
//! chain. Resolution picks the nearest definition of every key, orders the
//! keys by suffix and parses each value into clauses.

use std::cmp::Ordering;
use std::collections::HashMap;

use bndedit_header::Clause;
use indexmap::IndexMap;
use serde::Serialize;

use crate::chain::PropertySource;
use crate::registry::{Codec, ClauseStyle, EmptyOutput, Value, LIST_SEPARATOR};

/// Codec used to read and write merge-group members.
pub const MEMBER_CODEC: Codec = Codec::Clauses {
    separator: LIST_SEPARATOR,
    style: ClauseStyle::Expanded,
    empty: EmptyOutput::Remove,
};

/// Whether `key` belongs to the merge group of `stem`.
pub fn in_group(stem: &str, key: &str) -> bool {
    match key.strip_prefix(stem) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

/// Order of two keys of one group.
///
/// Suffixes compare segment by segment, numerically when both segments are
/// integers and lexically otherwise. The bare stem sorts last.
pub fn compare_keys(stem: &str, a: &str, b: &str) -> Ordering {
    let suffix = |key: &str| -> Option<Vec<String>> {
        let rest = key.strip_prefix(stem).unwrap_or(key);
        let rest = rest.strip_prefix('.')?;
        Some(rest.split('.').map(str::to_string).collect())
    };
    match (suffix(a), suffix(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(sa), Some(sb)) => {
            for (x, y) in sa.iter().zip(&sb) {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(nx), Ok(ny)) => nx.cmp(&ny),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            sa.len().cmp(&sb.len())
        }
    }
}

/// One visible member of a merge group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeEntry {
    pub key: String,
    pub clauses: Vec<Clause>,
    /// Defined in the subject document itself.
    pub local: bool,
    /// Index of the layer the definition came from; 0 is the subject.
    pub layer: usize,
}

impl MergeEntry {
    pub fn local(key: impl Into<String>, clauses: Vec<Clause>) -> Self {
        Self {
            key: key.into(),
            clauses,
            local: true,
            layer: 0,
        }
    }
}

/// The ordered members of one merged instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeGroup {
    pub stem: String,
    pub entries: IndexMap<String, MergeEntry>,
}

impl MergeGroup {
    pub fn new(stem: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            entries: IndexMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MergeEntry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, entry: MergeEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All clauses in group order.
    pub fn clauses(&self) -> Vec<Clause> {
        self.entries
            .values()
            .flat_map(|entry| entry.clauses.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A visible member before parsing: key, layer index, raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visible {
    pub key: String,
    pub layer: usize,
    pub value: String,
}

/// Nearest definition of every key of the group, in group order.
///
/// `layers[0]` is the subject document.
pub fn visible(stem: &str, layers: &[&dyn PropertySource]) -> Vec<Visible> {
    let mut winners: HashMap<String, Visible> = HashMap::new();
    for (index, layer) in layers.iter().enumerate() {
        for key in layer.keys() {
            if !in_group(stem, &key) || winners.contains_key(&key) {
                continue;
            }
            if let Some(value) = layer.get(&key) {
                winners.insert(
                    key.clone(),
                    Visible {
                        key,
                        layer: index,
                        value,
                    },
                );
            }
        }
    }
    let mut members: Vec<Visible> = winners.into_values().collect();
    members.sort_by(|a, b| compare_keys(stem, &a.key, &b.key));
    members
}

/// Resolve the merge group of `stem` over `layers` (subject first).
pub fn resolve(stem: &str, layers: &[&dyn PropertySource]) -> MergeGroup {
    let mut group = MergeGroup::new(stem);
    for member in visible(stem, layers) {
        let clauses = match MEMBER_CODEC.convert(Some(&member.value)) {
            Value::Clauses(clauses) => clauses,
            _ => Vec::new(),
        };
        group.insert(MergeEntry {
            key: member.key,
            clauses,
            local: member.layer == 0,
            layer: member.layer,
        });
    }
    group
}

/// The merged raw value of `stem`: visible member values joined with `,`.
pub fn merged_value(stem: &str, layers: &[&dyn PropertySource]) -> Option<String> {
    let values: Vec<String> = visible(stem, layers)
        .into_iter()
        .map(|member| member.value)
        .filter(|value| !value.trim().is_empty())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join(","))
    }
}
