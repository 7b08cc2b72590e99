//! Format-preserving access to bnd-style properties documents.
//!
//! A properties document is line oriented: one `key: value` (or `key = value`)
//! entry per logical line, `#` and `!` comment lines, and backslash-newline
//! continuations. This crate provides:
//!
//! - [`Document`]: a mutable character buffer edited in place through the
//!   [`TextBuffer`] trait
//! - [`LineReader`]: a scanner that classifies lines and reports the exact
//!   [`Region`] each entry occupies
//! - [`Properties`]: a lenient loader producing the logical (unescaped) values
//! - escaping helpers for writing values back and for `\uXXXX` transport

mod document;
mod error;
mod escape;
mod props;
mod reader;

pub use document::{Document, TextBuffer};
pub use error::{DocumentError, ScanError};
pub use escape::{escape_key, escape_non_ascii, escape_value, unescape_value};
pub use props::{decode_bytes, Properties};
pub use reader::{entries, find_entry, validate, EntrySpan, LineReader, LineType, Region};
