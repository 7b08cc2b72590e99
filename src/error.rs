//! Edit model errors.

use bndedit_properties::{DocumentError, ScanError};

use crate::patch::PatchError;
use crate::registry::CodecError;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model is a read-only effective view")]
    ReadOnly,

    #[error("malformed document: {0}")]
    MalformedDocument(#[from] ScanError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("no document attached to the model")]
    NoDocument,

    #[error("no storage attached to the model")]
    NoStorage,

    #[error("'{key}' does not hold a collection")]
    NotACollection { key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PatchError> for ModelError {
    fn from(err: PatchError) -> Self {
        match err {
            PatchError::Scan(err) => ModelError::MalformedDocument(err),
            PatchError::Document(err) => ModelError::Document(err),
        }
    }
}
