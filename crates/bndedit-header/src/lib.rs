//! OSGi-style header clause lists.
//!
//! A header value is a comma separated list of clauses. Each clause has a
//! name followed by `;`-separated attributes (`key=value`) and directives
//! (`key:=value`):
//!
//! ```text
//! com.example.api;version='[1.0,2)', com.example.impl;resolution:=optional
//! ```
//!
//! [`parse_header`] turns such text into [`Clause`]s and [`format_clause`]
//! writes them back. [`Requirement`] is the capability-requirement view of a
//! clause used by run requirement lists.

mod clause;
mod error;
mod format;
mod parser;
mod requirement;

pub use clause::{Attrs, Clause};
pub use error::HeaderError;
pub use format::{format_clause, needs_quoting, quote, ClauseFormat};
pub use parser::{parse_header, split_outside_quotes, unquote};
pub use requirement::Requirement;
