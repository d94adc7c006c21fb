use thiserror::Error;

use crate::config::{MatchMode, SimMode};
use crate::tokenize::TokenizeError;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error(transparent)]
    Features(#[from] TokenizeError),

    #[error("{sim_mode} encoder cannot serve {mode} mode: {reason}")]
    Unsupported {
        mode: MatchMode,
        sim_mode: SimMode,
        reason: String,
    },

    #[error("encoder returned {actual} rows for {expected} inputs")]
    RowCount { expected: usize, actual: usize },

    #[error("encoder inference failed: {reason}")]
    InferenceFailed { reason: String },
}
