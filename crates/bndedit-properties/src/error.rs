//! Error types for document scanning and editing.

/// A structural problem found while scanning a document.
///
/// Line numbers are 1-based physical lines.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("line {line}: entry has an empty key")]
    EmptyKey { line: usize },

    #[error("line {line}: key '{key}' is not followed by ':' or '='")]
    MissingSeparator { line: usize, key: String },
}

impl ScanError {
    /// Physical line the problem was found on.
    pub fn line(&self) -> usize {
        match self {
            ScanError::EmptyKey { line } | ScanError::MissingSeparator { line, .. } => *line,
        }
    }
}

/// Errors raised by [`TextBuffer::replace`](crate::TextBuffer::replace).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("range {offset}+{length} is outside the document (length {len})")]
    OutOfRange {
        offset: usize,
        length: usize,
        len: usize,
    },
}
