use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("failed to load tokenizer from {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    #[error("tokenization failed: {reason}")]
    EncodeFailed { reason: String },

    /// The encoder declared a feature this batch does not carry.
    #[error("feature '{name}' is declared by the encoder but not populated")]
    MissingFeature { name: String },
}
