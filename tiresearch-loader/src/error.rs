//! Per-record load errors
//!
//! These never abort a rebuild: the offending size entry is skipped and
//! reported, and loading continues with the next entry.

use serde::Serialize;
use thiserror::Error;

/// Reason a size entry was not loaded
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadError {
    /// A required field is absent or blank
    #[error("missing {field}")]
    MissingField { field: &'static str },

    /// A field is present but cannot be parsed
    #[error("invalid {field} '{value}'")]
    InvalidField { field: &'static str, value: String },

    /// The size file line could not be read
    #[error("malformed line {line}: {message}")]
    MalformedLine { line: u64, message: String },
}
