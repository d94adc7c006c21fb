use thiserror::Error;

use crate::tokenize::TokenizeError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error("tokenization worker failed: {reason}")]
    Worker { reason: String },

    #[error("pipeline closed after {received} batches")]
    Closed { received: usize },
}
