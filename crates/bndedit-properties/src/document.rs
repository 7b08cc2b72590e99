//! Mutable character buffer.

use std::fmt;

use crate::error::DocumentError;

/// A text buffer addressed by character offsets.
///
/// This is the only capability the patcher needs from an editor: it reads
/// characters and replaces one span at a time. Editors that keep their own
/// buffer (a rope, a widget model) implement this trait directly.
pub trait TextBuffer {
    /// Number of characters in the buffer.
    fn len(&self) -> usize;

    /// Whether the buffer holds no characters.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Character at `offset`, or `None` past the end.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Replace `length` characters starting at `offset` with `text`.
    fn replace(&mut self, offset: usize, length: usize, text: &str) -> Result<(), DocumentError>;

    /// The full contents.
    fn text(&self) -> String;
}

/// In-memory [`TextBuffer`] backed by a vector of characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    chars: Vec<char>,
}

impl Document {
    /// Create a document holding `text`.
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }

    /// Replace the whole contents.
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
    }
}

impl TextBuffer for Document {
    fn len(&self) -> usize {
        self.chars.len()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    fn replace(&mut self, offset: usize, length: usize, text: &str) -> Result<(), DocumentError> {
        let len = self.chars.len();
        let end = offset.checked_add(length);
        match end {
            Some(end) if offset <= len && end <= len => {
                self.chars.splice(offset..end, text.chars());
                Ok(())
            }
            _ => Err(DocumentError::OutOfRange {
                offset,
                length,
                len,
            }),
        }
    }

    fn text(&self) -> String {
        self.chars.iter().collect()
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_middle() {
        let mut doc = Document::new("a: 1\nb: 2\n");
        doc.replace(3, 1, "42").unwrap();
        assert_eq!(doc.text(), "a: 42\nb: 2\n");
    }

    #[test]
    fn test_insert_at_end() {
        let mut doc = Document::new("a: 1");
        let len = doc.len();
        doc.replace(len, 0, "\nb: 2").unwrap();
        assert_eq!(doc.text(), "a: 1\nb: 2");
    }

    #[test]
    fn test_replace_out_of_range() {
        let mut doc = Document::new("abc");
        let err = doc.replace(2, 5, "x").unwrap_err();
        assert_eq!(
            err,
            DocumentError::OutOfRange {
                offset: 2,
                length: 5,
                len: 3
            }
        );
        assert_eq!(doc.text(), "abc");
    }

    #[test]
    fn test_char_offsets_not_bytes() {
        let doc = Document::new("ä: ü");
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.char_at(3), Some('ü'));
        assert_eq!(doc.char_at(4), None);
    }
}
