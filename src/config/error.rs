//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use super::types::MatchMode;
use crate::loss::LossError;

/// Inconsistent sizing or option values, detected at construction time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed into the expected type.
    #[error("failed to parse {name}='{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// An enum option was given a name it does not recognize.
    #[error("unknown {option} '{value}'")]
    UnknownVariant { option: &'static str, value: String },

    /// A size that must be positive was zero.
    #[error("{name} must be greater than zero")]
    ZeroSize { name: &'static str },

    /// Class-mode batches must leave at least one class out of every draw.
    #[error(
        "num_classes_per_batch ({num_classes_per_batch}) must be smaller than num_class ({num_class})"
    )]
    ClassesPerBatchTooLarge {
        num_classes_per_batch: usize,
        num_class: usize,
    },

    #[error("batch_size ({batch_size}) is not divisible by the {mode} grouping factor ({factor})")]
    BatchSizeNotDivisible {
        mode: MatchMode,
        batch_size: usize,
        factor: usize,
    },

    /// Evaluation splits must hold one record file per class.
    #[error("expected {expected} record files for split '{split}', found {found}")]
    RecordCountMismatch {
        split: String,
        expected: usize,
        found: usize,
    },

    #[error("{mode} mode cannot be fed from a {shape} corpus")]
    CorpusShapeMismatch { mode: MatchMode, shape: String },

    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    OutOfRange { name: &'static str, value: f32 },

    #[error("missing required setting: {name}")]
    Missing { name: &'static str },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The mode/loss/output combination has no entry in the dispatch table.
    #[error(transparent)]
    Loss(#[from] LossError),
}
