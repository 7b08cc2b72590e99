//! Header parse errors.

/// Why a header value could not be parsed.
///
/// Positions are character offsets into the parsed text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("unterminated quote starting at {position}")]
    UnterminatedQuote { position: usize },

    #[error("attribute '{key}' appears before any clause name")]
    MissingName { key: String },

    #[error("attribute with empty key in '{part}'")]
    EmptyKey { part: String },
}
