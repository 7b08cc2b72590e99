//! Format-preserving document patches.
//!
//! A patch rewrites exactly one entry: the span the scanner reports for the
//! key is replaced (or deleted together with its line break), or a new entry
//! is appended at the end. Every other character stays as it was.

use bndedit_properties::{
    escape_key, find_entry, DocumentError, EntrySpan, LineReader, LineType, Region, ScanError,
    TextBuffer,
};
use serde::{Deserialize, Serialize};

/// Separator written between key and value of new or replaced entries.
pub const ENTRY_SEPARATOR: &str = ": ";

/// What a patch did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOutcome {
    Replaced,
    Deleted,
    Appended,
    /// Removal of a key the document does not contain, or a replacement
    /// with identical text.
    Unchanged,
    /// Not applied because the document could not be scanned.
    Skipped,
}

impl PatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOutcome::Replaced => "replaced",
            PatchOutcome::Deleted => "deleted",
            PatchOutcome::Appended => "appended",
            PatchOutcome::Unchanged => "unchanged",
            PatchOutcome::Skipped => "skipped",
        }
    }
}

/// What to do when the document cannot be scanned while saving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructurePolicy {
    /// Append the entry at the end of the document and report it.
    #[default]
    Append,
    /// Leave the key's edit pending and report it.
    Skip,
    /// Check the whole document first and refuse to save if it is malformed.
    Abort,
}

impl StructurePolicy {
    pub const NAMES: &'static [&'static str] = &["append", "skip", "abort"];
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("document structure: {0}")]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// `key: value` text of an entry.
pub fn entry_text(key: &str, raw_value: &str) -> String {
    format!("{}{}{}", escape_key(key), ENTRY_SEPARATOR, raw_value)
}

/// Write `new_raw` (document form) as the value of `key`, or delete the
/// entry when `new_raw` is `None`.
pub fn apply_patch<B: TextBuffer + ?Sized>(
    doc: &mut B,
    key: &str,
    new_raw: Option<&str>,
) -> Result<PatchOutcome, PatchError> {
    let region = find_entry(doc, key)?;
    Ok(splice(doc, region, key, new_raw)?)
}

/// Apply a patch at an already located `region` (`None`: the key is not in
/// the document).
pub fn splice<B: TextBuffer + ?Sized>(
    doc: &mut B,
    region: Option<Region>,
    key: &str,
    new_raw: Option<&str>,
) -> Result<PatchOutcome, DocumentError> {
    let replacement = new_raw.map(|raw| entry_text(key, raw));

    match (region, replacement) {
        (Some(region), Some(text)) => {
            if region_text(doc, region) == text {
                return Ok(PatchOutcome::Unchanged);
            }
            doc.replace(region.offset, region.length, &text)?;
            Ok(PatchOutcome::Replaced)
        }
        (Some(region), None) => {
            let length = region.length + line_break_len(doc, region.end());
            doc.replace(region.offset, length, "")?;
            Ok(PatchOutcome::Deleted)
        }
        (None, Some(text)) => {
            append(doc, &text)?;
            Ok(PatchOutcome::Appended)
        }
        (None, None) => Ok(PatchOutcome::Unchanged),
    }
}

/// Append `key: raw` as a new last entry.
pub fn append_entry<B: TextBuffer + ?Sized>(
    doc: &mut B,
    key: &str,
    raw: &str,
) -> Result<(), DocumentError> {
    append(doc, &entry_text(key, raw))
}

/// Delete every entry for `key` after the first one and return what was
/// removed. Scanning stops at the first malformed line.
pub fn remove_duplicates<B: TextBuffer + ?Sized>(
    doc: &mut B,
    key: &str,
) -> Result<Vec<EntrySpan>, DocumentError> {
    let mut found = Vec::new();
    let mut reader = LineReader::new(&*doc);
    loop {
        match reader.next() {
            Ok(LineType::Eof) | Err(_) => break,
            Ok(LineType::Entry) if reader.key() == key => found.push(EntrySpan {
                key: key.to_string(),
                region: reader.region(),
                line: reader.line(),
            }),
            Ok(_) => {}
        }
    }

    let duplicates = found.split_off(found.len().min(1));
    for span in duplicates.iter().rev() {
        splice(doc, Some(span.region), key, None)?;
    }
    Ok(duplicates)
}

fn append<B: TextBuffer + ?Sized>(doc: &mut B, text: &str) -> Result<(), DocumentError> {
    let len = doc.len();
    if len > 0 && doc.char_at(len - 1) != Some('\n') {
        doc.replace(len, 0, &format!("\n{}", text))
    } else {
        doc.replace(len, 0, text)
    }
}

fn region_text<B: TextBuffer + ?Sized>(doc: &B, region: Region) -> String {
    (region.offset..region.end()).filter_map(|i| doc.char_at(i)).collect()
}

fn line_break_len<B: TextBuffer + ?Sized>(doc: &B, offset: usize) -> usize {
    match doc.char_at(offset) {
        Some('\n') => 1,
        Some('\r') if doc.char_at(offset + 1) == Some('\n') => 2,
        Some('\r') => 1,
        _ => 0,
    }
}
