//! Header parser.

use crate::clause::{Attrs, Clause};
use crate::error::HeaderError;

/// Split `text` at every `separator` that is not inside a quoted value.
///
/// A quote (`"` or `'`) only opens a quoted section at the start of a piece
/// or right after `=`, `;` or `,`, so apostrophes inside plain words are left
/// alone. Backslash escapes the next character inside quotes.
pub fn split_outside_quotes(text: &str, separator: char) -> Result<Vec<String>, HeaderError> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut quote: Option<(char, usize)> = None;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    for (i, c) in text.chars().enumerate() {
        if let Some((q, _)) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
                prev = Some(c);
            }
            continue;
        }

        if c == separator {
            pieces.push(std::mem::take(&mut current));
            prev = None;
            continue;
        }

        if (c == '"' || c == '\'') && matches!(prev, None | Some('=' | ';' | ',')) {
            quote = Some((c, i));
        }
        if !c.is_whitespace() {
            prev = Some(c);
        }
        current.push(c);
    }

    if let Some((_, position)) = quote {
        return Err(HeaderError::UnterminatedQuote { position });
    }
    pieces.push(current);
    Ok(pieces)
}

/// Trim `text` and strip one level of quotes, resolving backslash escapes.
///
/// Unquoted text is returned trimmed and otherwise unchanged.
pub fn unquote(text: &str) -> Result<String, HeaderError> {
    let trimmed = text.trim();
    let q = match trimmed.chars().next() {
        Some(q @ ('"' | '\'')) => q,
        _ => return Ok(trimmed.to_string()),
    };

    let inner: Vec<char> = trimmed.chars().skip(1).collect();
    let mut out = String::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        let c = inner[i];
        if c == '\\' && i + 1 < inner.len() {
            out.push(inner[i + 1]);
            i += 2;
            continue;
        }
        if c == q {
            // text after the closing quote is kept as-is
            out.extend(&inner[i + 1..]);
            return Ok(out);
        }
        out.push(c);
        i += 1;
    }
    Err(HeaderError::UnterminatedQuote { position: 0 })
}

/// Parse a header value into clauses.
///
/// Several names may share one set of attributes (`a;b;version=1`), which
/// yields one clause per name. Empty clauses (`a,,b`, trailing commas) are
/// skipped.
pub fn parse_header(text: &str) -> Result<Vec<Clause>, HeaderError> {
    let mut clauses = Vec::new();

    for piece in split_outside_quotes(text, ',')? {
        if piece.trim().is_empty() {
            continue;
        }

        let mut names: Vec<String> = Vec::new();
        let mut attrs = Attrs::new();

        for part in split_outside_quotes(&piece, ';')? {
            if part.trim().is_empty() {
                continue;
            }
            let quoted_name = part.trim_start().starts_with(['"', '\'']);
            match part.find('=').filter(|_| !quoted_name) {
                None => names.push(unquote(&part)?),
                Some(eq) => {
                    let key = part[..eq].trim();
                    if key.is_empty() || key == ":" {
                        return Err(HeaderError::EmptyKey {
                            part: part.trim().to_string(),
                        });
                    }
                    if names.is_empty() {
                        return Err(HeaderError::MissingName {
                            key: key.to_string(),
                        });
                    }
                    let value = unquote(&part[eq + 1..])?;
                    attrs.insert(key.to_string(), value);
                }
            }
        }

        for name in names {
            clauses.push(Clause::with_attrs(name, attrs.clone()));
        }
    }

    Ok(clauses)
}
