use std::path::PathBuf;
use thiserror::Error;

use crate::config::{MatchMode, Split};
use crate::encoder::EncoderError;
use crate::records::RecordError;
use crate::tokenize::TokenizeError;

#[derive(Debug, Error)]
pub enum EvalError {
    /// Score list cannot be reshaped into `groups` equal rows.
    #[error("cannot reshape {len} scores into {groups} groups")]
    Shape { len: usize, groups: usize },

    #[error("no {what} records to evaluate")]
    Empty { what: &'static str },

    /// `list` is `"query"` or `"reference"`; `index` counts within that list.
    #[error("{list} record {index} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        list: &'static str,
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{mode} mode evaluates {expected} records, record {index} is not one")]
    ValueKind {
        mode: MatchMode,
        expected: &'static str,
        index: usize,
    },
}

/// Failures while predicting a stored split and evaluating it.
#[derive(Debug, Error)]
pub enum SplitEvalError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error(transparent)]
    Encoder(#[from] EncoderError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("no {split} records under {root}")]
    NoRecords { split: Split, root: PathBuf },

    #[error("model runs {model} mode but the evaluator is configured for {evaluator} mode")]
    ModeMismatch { model: MatchMode, evaluator: MatchMode },
}
