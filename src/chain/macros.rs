//! `${name}` macro expansion.

use std::sync::OnceLock;

use regex_lite::{Captures, Regex};
use tracing::warn;

/// Nesting limit for macros whose values contain further macros.
pub const MAX_DEPTH: usize = 32;

fn macro_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^${}]+)\}").expect("macro pattern is valid"))
}

/// Replace every `${name}` in `text` with `lookup(name)`, recursively.
///
/// References that `lookup` cannot resolve, and references that would
/// recurse into themselves, are left as written.
pub fn expand<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut stack = Vec::new();
    expand_inner(text, &lookup, &mut stack)
}

fn expand_inner(
    text: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
    stack: &mut Vec<String>,
) -> String {
    macro_pattern()
        .replace_all(text, |caps: &Captures<'_>| {
            let name = caps[1].trim();
            if stack.iter().any(|n| n == name) || stack.len() >= MAX_DEPTH {
                warn!(macro_name = name, "recursive macro reference left unexpanded");
                return caps[0].to_string();
            }
            match lookup(name) {
                Some(value) => {
                    stack.push(name.to_string());
                    let expanded = expand_inner(&value, lookup, stack);
                    stack.pop();
                    expanded
                }
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Whether `text` contains a macro reference.
pub fn has_macros(text: &str) -> bool {
    macro_pattern().is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_expand_nested() {
        let vars = lookup(&[("a", "x${b}"), ("b", "y")]);
        assert_eq!(expand("${a}-${b}", vars), "xy-y");
    }

    #[test]
    fn test_unresolved_left_verbatim() {
        assert_eq!(expand("v=${missing};${replace;a;b}", lookup(&[])), "v=${missing};${replace;a;b}");
    }

    #[test]
    fn test_cycle_is_cut() {
        let vars = lookup(&[("a", "<${b}>"), ("b", "[${a}]")]);
        assert_eq!(expand("${a}", vars), "<[${a}]>");
    }

    #[test]
    fn test_has_macros() {
        assert!(has_macros("${Bundle-Version}"));
        assert!(!has_macros("1.0.0"));
    }
}
