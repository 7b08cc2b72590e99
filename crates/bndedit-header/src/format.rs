//! Clause formatting.

use crate::clause::Clause;

/// How [`format_clause`] lays out a clause.
#[derive(Debug, Clone, Copy)]
pub struct ClauseFormat<'a> {
    /// Inserted verbatim before every attribute, e.g. `";"` or a separator
    /// with a line continuation.
    pub attr_separator: &'a str,
    /// Preferred quote character for values that need quoting.
    pub quote: char,
    /// Applied to every name, key and value token (not to separators), so the
    /// caller can add the escaping of its storage format.
    pub escape: fn(&str) -> String,
}

fn verbatim(text: &str) -> String {
    text.to_string()
}

impl Default for ClauseFormat<'static> {
    fn default() -> Self {
        Self {
            attr_separator: ";",
            quote: '"',
            escape: verbatim,
        }
    }
}

/// Whether a value must be quoted to survive [`parse_header`](crate::parse_header).
pub fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| matches!(c, ',' | ';' | '=' | '"' | '\'' | '\\') || c.is_whitespace())
}

/// Quote `value` with `preferred` if needed.
///
/// Falls back to the other quote character when the value contains the
/// preferred one; if it contains both, the quote is backslash-escaped.
pub fn quote(value: &str, preferred: char) -> String {
    if !needs_quoting(value) {
        return value.to_string();
    }
    let q = match preferred {
        '\'' if value.contains('\'') && !value.contains('"') => '"',
        '"' if value.contains('"') && !value.contains('\'') => '\'',
        other => other,
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(q);
    for c in value.chars() {
        if c == q || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(q);
    out
}

fn name_needs_quoting(name: &str) -> bool {
    name.contains([',', ';', '='])
        || name.starts_with(['"', '\''])
        || name.trim() != name
}

/// Write one clause: `name;key=value;dir:=value`.
pub fn format_clause(clause: &Clause, fmt: &ClauseFormat<'_>) -> String {
    let name = if name_needs_quoting(&clause.name) {
        quote(&clause.name, fmt.quote)
    } else {
        clause.name.clone()
    };
    let mut out = (fmt.escape)(&name);

    for (key, value) in &clause.attrs {
        out.push_str(fmt.attr_separator);
        match key.strip_suffix(':') {
            Some(directive) => {
                out.push_str(&(fmt.escape)(directive));
                out.push_str(":=");
            }
            None => {
                out.push_str(&(fmt.escape)(key));
                out.push('=');
            }
        }
        out.push_str(&(fmt.escape)(&quote(value, fmt.quote)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_header;

    #[test]
    fn test_format_plain() {
        let clause = Clause::new("org.a").attr("version", "1.2");
        assert_eq!(format_clause(&clause, &ClauseFormat::default()), "org.a;version=1.2");
    }

    #[test]
    fn test_format_quotes_ranges_and_directives() {
        let clause = Clause::new("org.a")
            .attr("version", "[1.0,2)")
            .directive("resolution", "optional");
        assert_eq!(
            format_clause(&clause, &ClauseFormat::default()),
            "org.a;version=\"[1.0,2)\";resolution:=optional"
        );
    }

    #[test]
    fn test_format_custom_separator_and_quote() {
        let clause = Clause::new("osgi.identity").directive("filter", "(osgi.identity=a)");
        let fmt = ClauseFormat {
            attr_separator: ";\\\n\t\t",
            quote: '\'',
            ..ClauseFormat::default()
        };
        assert_eq!(
            format_clause(&clause, &fmt),
            "osgi.identity;\\\n\t\tfilter:='(osgi.identity=a)'"
        );
    }

    #[test]
    fn test_quote_picks_other_quote_char() {
        assert_eq!(quote("it's here", '\''), "\"it's here\"");
        assert_eq!(quote("a\"b'c", '"'), "\"a\\\"b'c\"");
        assert_eq!(quote("", '"'), "\"\"");
    }

    #[test]
    fn test_formatted_clause_parses_back() {
        let clause = Clause::new("name with, comma")
            .attr("path", "c:\\tmp dir")
            .attr("empty", "");
        let text = format_clause(&clause, &ClauseFormat::default());
        let parsed = parse_header(&text).unwrap();
        assert_eq!(parsed, vec![clause]);

        let clause = Clause::new("a=b").attr("version", "1");
        let text = format_clause(&clause, &ClauseFormat::default());
        assert_eq!(text, "\"a=b\";version=1");
        assert_eq!(parse_header(&text).unwrap(), vec![clause]);
    }
}
