use std::path::PathBuf;
use thiserror::Error;

/// Malformed corpus or record schema.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Header matches neither `text, target` nor `text_a, text_b, target`.
    #[error("unrecognized header in {path}: [{header}]")]
    UnrecognizedHeader { path: PathBuf, header: String },

    /// Three-column targets must be 0 or 1.
    #[error("line {line}: target '{value}' is not binary (expected 0 or 1)")]
    NonBinaryTarget { line: u64, value: String },

    #[error("no usable rows in {path}")]
    Empty { path: PathBuf },

    #[error("failed to read {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// A materialized record line could not be decoded.
    #[error("{path}:{line}: undecodable record: {reason}")]
    Record {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}
