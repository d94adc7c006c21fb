use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::corpus::FormatError;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record I/O failed at {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The prepare step ran but still left nothing to sample from.
    #[error("no {split} records under {root} after prepare")]
    NothingPrepared { split: String, root: PathBuf },
}

impl RecordError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        RecordError::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}
