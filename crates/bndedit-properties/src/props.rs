//! Lenient loader for the logical key/value view of a document.

use std::io::{self, Read};

use indexmap::IndexMap;

use crate::escape::unescape_value;

/// Logical properties of a document: keys and unescaped values in document
/// order.
///
/// Loading never fails on content. Unlike [`LineReader`](crate::LineReader),
/// whitespace is accepted as a key/value separator, matching how the build
/// tooling itself reads these files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: IndexMap<String, String>,
}

/// Decode raw bytes: UTF-8 when valid, otherwise ISO-8859-1.
pub fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse document text.
    pub fn parse(text: &str) -> Self {
        let mut props = Self::new();
        props.load_str(text);
        props
    }

    /// Read and parse a whole stream.
    pub fn load<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::parse(&decode_bytes(&bytes)))
    }

    /// Parse `text` and merge its entries into this set; later keys win.
    pub fn load_str(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();
        let mut i = 0;

        while i < n {
            while i < n && is_blank(chars[i]) {
                i += 1;
            }
            if i >= n {
                break;
            }
            match chars[i] {
                '\r' | '\n' => {
                    i += 1;
                    continue;
                }
                '#' | '!' => {
                    while i < n && chars[i] != '\n' && chars[i] != '\r' {
                        i += 1;
                    }
                    continue;
                }
                _ => {}
            }

            // gather one logical line
            let start = i;
            let end;
            loop {
                let line_start = i;
                while i < n && chars[i] != '\n' && chars[i] != '\r' {
                    i += 1;
                }
                let content_end = i;
                if i < n && chars[i] == '\r' {
                    i += 1;
                }
                if i < n && chars[i] == '\n' {
                    i += 1;
                }
                let trailing = chars[line_start..content_end]
                    .iter()
                    .rev()
                    .take_while(|&&c| c == '\\')
                    .count();
                if trailing % 2 == 0 || i >= n {
                    end = content_end;
                    break;
                }
            }

            let logical = &chars[start..end];
            let (key, value) = split_entry(logical);
            self.entries.insert(unescape_value(&key), unescape_value(&value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace a value. New keys go to the end.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove a key, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for Properties {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Split a logical line (still in document form) into raw key and raw value.
fn split_entry(logical: &[char]) -> (String, String) {
    let n = logical.len();
    let mut j = 0;
    while j < n {
        let c = logical[j];
        if c == '\\' {
            j += 2;
            continue;
        }
        if c == ':' || c == '=' || is_blank(c) {
            break;
        }
        j += 1;
    }
    let key_end = j.min(n);

    let mut k = key_end;
    while k < n && is_blank(logical[k]) {
        k += 1;
    }
    if k < n && (logical[k] == ':' || logical[k] == '=') {
        k += 1;
        while k < n && is_blank(logical[k]) {
            k += 1;
        }
    }

    (
        logical[..key_end].iter().collect(),
        logical[k.min(n)..].iter().collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separators() {
        let props = Properties::parse("a: 1\nb=2\nc 3\nd\t:\t4\n");
        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
        assert_eq!(props.get("d"), Some("4"));
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let props = Properties::parse("# a: 1\n\n   ! b: 2\nc: 3");
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("c"), Some("3"));
    }

    #[test]
    fn test_parse_continuation() {
        let props = Properties::parse("-buildpath: \\\n\tfoo,\\\n\tbar\nnext: x\n");
        assert_eq!(props.get("-buildpath"), Some("foo,bar"));
        assert_eq!(props.get("next"), Some("x"));
    }

    #[test]
    fn test_parse_unicode_escapes() {
        let props = Properties::parse("Bundle-Name: Caf\\u00E9\n");
        assert_eq!(props.get("Bundle-Name"), Some("Café"));
    }

    #[test]
    fn test_parse_key_only_and_empty_value() {
        let props = Properties::parse("alone\nempty:\n");
        assert_eq!(props.get("alone"), Some(""));
        assert_eq!(props.get("empty"), Some(""));
    }

    #[test]
    fn test_later_key_wins_and_keeps_position() {
        let props = Properties::parse("a: 1\nb: 2\na: 3\n");
        assert_eq!(props.get("a"), Some("3"));
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_load_latin1_fallback() {
        let bytes: &[u8] = b"Bundle-Vendor: Acm\xe9\n";
        let props = Properties::load(bytes).unwrap();
        assert_eq!(props.get("Bundle-Vendor"), Some("Acmé"));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut props = Properties::parse("a: 1\nb: 2\nc: 3\n");
        props.remove("b");
        props.insert("d", "4");
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["a", "c", "d"]);
    }
}
