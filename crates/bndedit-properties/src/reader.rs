//! Line scanner for properties documents.
//!
//! The scanner walks a [`TextBuffer`] line by line and classifies each line.
//! An entry covers its first line plus every continuation line that follows
//! a line ending in an unescaped backslash; its [`Region`] spans exactly those
//! characters, excluding the final line break. Regions are never cached:
//! every lookup rescans the current buffer.

use crate::document::TextBuffer;
use crate::error::ScanError;
use crate::escape::unescape_value;

/// Character span of one entry within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Offset of the first character of the entry's first line.
    pub offset: usize,
    /// Number of characters up to (not including) the final line break.
    pub length: usize,
}

impl Region {
    /// Offset one past the last character.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Classification of the next line returned by [`LineReader::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// Whitespace only.
    Blank,
    /// First non-blank character is `#` or `!`.
    Comment,
    /// A `key: value` entry, including its continuation lines.
    Entry,
    /// End of document.
    Eof,
}

/// An entry found by [`entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySpan {
    pub key: String,
    pub region: Region,
    /// 1-based physical line the entry starts on.
    pub line: usize,
}

/// Streaming scanner over a [`TextBuffer`].
pub struct LineReader<'a, B: TextBuffer + ?Sized> {
    doc: &'a B,
    pos: usize,
    line: usize,
    entry_line: usize,
    key: String,
    region: Region,
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

impl<'a, B: TextBuffer + ?Sized> LineReader<'a, B> {
    pub fn new(doc: &'a B) -> Self {
        Self {
            doc,
            pos: 0,
            line: 0,
            entry_line: 0,
            key: String::new(),
            region: Region {
                offset: 0,
                length: 0,
            },
        }
    }

    /// Key of the entry last returned by [`next`](Self::next).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Region of the entry last returned by [`next`](Self::next).
    pub fn region(&self) -> Region {
        self.region
    }

    /// Line the entry last returned by [`next`](Self::next) starts on.
    pub fn line(&self) -> usize {
        self.entry_line
    }

    fn at(&self, offset: usize) -> char {
        self.doc.char_at(offset).unwrap_or('\n')
    }

    /// Returns `(content_end, next_start)` for the physical line at `from`.
    ///
    /// `content_end` excludes the line break (`\n`, `\r\n` or a lone `\r`).
    fn physical_line(&self, from: usize) -> (usize, usize) {
        let len = self.doc.len();
        let mut i = from;
        while i < len && !matches!(self.at(i), '\n' | '\r') {
            i += 1;
        }
        let next_start = match self.doc.char_at(i) {
            Some('\r') if self.doc.char_at(i + 1) == Some('\n') => i + 2,
            Some(_) => i + 1,
            None => len,
        };
        (i, next_start)
    }

    fn continues(&self, line_start: usize, content_end: usize) -> bool {
        let mut backslashes = 0;
        let mut i = content_end;
        while i > line_start && self.at(i - 1) == '\\' {
            backslashes += 1;
            i -= 1;
        }
        backslashes % 2 == 1
    }

    /// Advance to the next line and classify it.
    pub fn next(&mut self) -> Result<LineType, ScanError> {
        let len = self.doc.len();
        if self.pos >= len {
            return Ok(LineType::Eof);
        }

        let start = self.pos;
        self.line += 1;
        let (content_end, next_start) = self.physical_line(start);

        let mut i = start;
        while i < content_end && is_blank(self.at(i)) {
            i += 1;
        }
        if i == content_end {
            self.pos = next_start;
            return Ok(LineType::Blank);
        }
        if matches!(self.at(i), '#' | '!') {
            self.pos = next_start;
            return Ok(LineType::Comment);
        }

        let mut raw_key = String::new();
        let mut j = i;
        while j < content_end {
            let c = self.at(j);
            if c == '\\' {
                if j + 1 < content_end {
                    raw_key.push(c);
                    raw_key.push(self.at(j + 1));
                    j += 2;
                    continue;
                }
                break;
            }
            if c == ':' || c == '=' || is_blank(c) {
                break;
            }
            raw_key.push(c);
            j += 1;
        }

        if raw_key.is_empty() {
            return Err(ScanError::EmptyKey { line: self.line });
        }
        let key = unescape_value(&raw_key);

        let mut k = j;
        while k < content_end && is_blank(self.at(k)) {
            k += 1;
        }
        let separated = k >= content_end
            || matches!(self.at(k), ':' | '=')
            || (self.at(k) == '\\' && k + 1 == content_end);
        if !separated {
            return Err(ScanError::MissingSeparator {
                line: self.line,
                key,
            });
        }

        self.entry_line = self.line;
        let mut line_start = start;
        let mut end = content_end;
        let mut next = next_start;
        while self.continues(line_start, end) && next < len {
            self.line += 1;
            line_start = next;
            let (ce, ns) = self.physical_line(next);
            end = ce;
            next = ns;
        }

        self.key = key;
        self.region = Region {
            offset: start,
            length: end - start,
        };
        self.pos = next;
        Ok(LineType::Entry)
    }
}

/// Scan the whole document and list every entry in document order.
pub fn entries<B: TextBuffer + ?Sized>(doc: &B) -> Result<Vec<EntrySpan>, ScanError> {
    let mut reader = LineReader::new(doc);
    let mut found = Vec::new();
    loop {
        match reader.next()? {
            LineType::Eof => return Ok(found),
            LineType::Entry => found.push(EntrySpan {
                key: reader.key().to_string(),
                region: reader.region(),
                line: reader.line(),
            }),
            LineType::Blank | LineType::Comment => {}
        }
    }
}

/// Region of the first entry whose key equals `key`.
///
/// Scanning stops at the first match, so malformed lines after it are not
/// reported.
pub fn find_entry<B: TextBuffer + ?Sized>(doc: &B, key: &str) -> Result<Option<Region>, ScanError> {
    let mut reader = LineReader::new(doc);
    loop {
        match reader.next()? {
            LineType::Eof => return Ok(None),
            LineType::Entry if reader.key() == key => return Ok(Some(reader.region())),
            _ => {}
        }
    }
}

/// Scan the whole document, failing on the first structural problem.
pub fn validate<B: TextBuffer + ?Sized>(doc: &B) -> Result<(), ScanError> {
    entries(doc).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn scan(text: &str) -> Vec<LineType> {
        let doc = Document::new(text);
        let mut reader = LineReader::new(&doc);
        let mut types = Vec::new();
        loop {
            let t = reader.next().unwrap();
            types.push(t);
            if t == LineType::Eof {
                return types;
            }
        }
    }

    #[test]
    fn test_classifies_lines() {
        let types = scan("# comment\n\n! bang\na: 1\n   \nb = 2\n");
        assert_eq!(
            types,
            vec![
                LineType::Comment,
                LineType::Blank,
                LineType::Comment,
                LineType::Entry,
                LineType::Blank,
                LineType::Entry,
                LineType::Eof
            ]
        );
    }

    #[test]
    fn test_region_excludes_line_break() {
        let doc = Document::new("a: 1\nb: 2\n");
        assert_eq!(
            find_entry(&doc, "a").unwrap(),
            Some(Region {
                offset: 0,
                length: 4
            })
        );
        assert_eq!(
            find_entry(&doc, "b").unwrap(),
            Some(Region {
                offset: 5,
                length: 4
            })
        );
        assert_eq!(find_entry(&doc, "c").unwrap(), None);
    }

    #[test]
    fn test_region_spans_continuations() {
        let text = "-buildpath: a,\\\n\tb,\\\n\tc\nnext: x\n";
        let doc = Document::new(text);
        let region = find_entry(&doc, "-buildpath").unwrap().unwrap();
        assert_eq!(region.offset, 0);
        assert_eq!(&text[region.offset..region.end()], "-buildpath: a,\\\n\tb,\\\n\tc");
        let spans = entries(&doc).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].key, "next");
        assert_eq!(spans[1].line, 4);
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let doc = Document::new("path: c:\\\\\nnext: 1\n");
        let spans = entries(&doc).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].region.length, 10);
    }

    #[test]
    fn test_crlf_region() {
        let doc = Document::new("a: 1\r\nb: 2\r\n");
        let region = find_entry(&doc, "b").unwrap().unwrap();
        assert_eq!(region, Region { offset: 6, length: 4 });
    }

    #[test]
    fn test_cr_only_lines() {
        let doc = Document::new("a: 1\rb: x,\\\r\ty\r# c\rc: 3\r");
        let spans = entries(&doc).unwrap();
        let keys: Vec<_> = spans.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(spans[0].region, Region { offset: 0, length: 4 });
        assert_eq!(spans[1].region, Region { offset: 5, length: 9 });
        assert_eq!(spans[2].line, 5);
    }

    #[test]
    fn test_comment_does_not_continue() {
        let doc = Document::new("# trailing \\\na: 1\n");
        assert_eq!(entries(&doc).unwrap()[0].key, "a");
    }

    #[test]
    fn test_escaped_key() {
        let doc = Document::new("my\\ key: v\n");
        assert!(find_entry(&doc, "my key").unwrap().is_some());
    }

    #[test]
    fn test_key_without_value() {
        let doc = Document::new("lonely\nother: 1\n");
        let spans = entries(&doc).unwrap();
        assert_eq!(spans[0].key, "lonely");
        assert_eq!(spans[0].region.length, 6);
    }

    #[test]
    fn test_missing_separator_is_structural_error() {
        let doc = Document::new("a: 1\nfoo bar\n");
        let err = validate(&doc).unwrap_err();
        assert_eq!(
            err,
            ScanError::MissingSeparator {
                line: 2,
                key: "foo".to_string()
            }
        );
        // the match precedes the malformed line
        assert!(find_entry(&doc, "a").unwrap().is_some());
    }

    #[test]
    fn test_empty_key_is_structural_error() {
        let doc = Document::new("\n: value\n");
        assert_eq!(validate(&doc).unwrap_err(), ScanError::EmptyKey { line: 2 });
    }
}
