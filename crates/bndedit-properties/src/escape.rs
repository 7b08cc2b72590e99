//! Escaping rules of the properties format.
//!
//! Values are stored in the document in an escaped "document form" and read
//! back in their logical form. `unescape_value(escape_value(s)) == s` for any
//! `s`.

/// Decode document-form value text into its logical value.
///
/// Handles `\t`, `\n`, `\r`, `\f`, `\uXXXX` (including surrogate pairs),
/// escaped literal characters, and backslash-newline continuations (the
/// continuation and the leading whitespace of the next line are dropped).
/// A trailing lone backslash is dropped. Malformed `\u` escapes decode to a
/// literal `u` rather than failing.
pub fn unescape_value(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }

        i += 1;
        let Some(&next) = chars.get(i) else {
            break;
        };

        match next {
            '\r' | '\n' => {
                i += 1;
                if next == '\r' && chars.get(i) == Some(&'\n') {
                    i += 1;
                }
                while matches!(chars.get(i), Some(' ' | '\t' | '\x0c')) {
                    i += 1;
                }
            }
            't' => {
                out.push('\t');
                i += 1;
            }
            'n' => {
                out.push('\n');
                i += 1;
            }
            'r' => {
                out.push('\r');
                i += 1;
            }
            'f' => {
                out.push('\x0c');
                i += 1;
            }
            'u' => match parse_hex4(&chars, i + 1) {
                Some(unit) => {
                    i += 5;
                    if (0xD800..0xDC00).contains(&unit) {
                        let low = if chars.get(i) == Some(&'\\') && chars.get(i + 1) == Some(&'u') {
                            parse_hex4(&chars, i + 2).filter(|low| (0xDC00..0xE000).contains(low))
                        } else {
                            None
                        };
                        match low.and_then(|low| {
                            char::from_u32(0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00))
                        }) {
                            Some(ch) => {
                                out.push(ch);
                                i += 6;
                            }
                            None => out.push(char::REPLACEMENT_CHARACTER),
                        }
                    } else {
                        out.push(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                }
                None => {
                    out.push('u');
                    i += 1;
                }
            },
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    out
}

fn parse_hex4(chars: &[char], start: usize) -> Option<u32> {
    let digits = chars.get(start..start + 4)?;
    digits
        .iter()
        .try_fold(0u32, |acc, c| c.to_digit(16).map(|d| acc * 16 + d))
}

/// Encode a logical value into document form.
///
/// Escapes backslashes and control characters, plus a leading space that
/// the loader would otherwise strip.
pub fn escape_value(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            ' ' if i == 0 => out.push_str("\\ "),
            _ => push_escaped(&mut out, c),
        }
    }
    out
}

/// Encode a key into document form.
///
/// Keys additionally escape the separator characters and whitespace, and a
/// leading comment marker.
pub fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, c) in key.chars().enumerate() {
        match c {
            ' ' | ':' | '=' => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            _ => push_escaped(&mut out, c),
        }
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '\\' => out.push_str("\\\\"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\x0c' => out.push_str("\\f"),
        _ => out.push(c),
    }
}

/// Replace every character at or above `0x7F` with `\uXXXX` UTF-16 escapes.
///
/// Used when the document is written to an ASCII-only transport. The loader
/// decodes the escapes again.
pub fn escape_non_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut units = [0u16; 2];
    for c in text.chars() {
        if (c as u32) < 0x7F {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04X}", unit));
            }
        }
    }
    out
}
