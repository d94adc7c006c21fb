use thiserror::Error;

use crate::config::{ConfigError, MatchMode};
use crate::records::RecordError;

#[derive(Debug, Error)]
pub enum SamplerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("sampler configured for {expected} mode was given {actual} data")]
    ModeMismatch {
        expected: MatchMode,
        actual: MatchMode,
    },

    #[error("no {mode} examples to sample from")]
    EmptySource { mode: MatchMode },

    #[error("class {class_id} has no examples")]
    EmptyClass { class_id: usize },
}
