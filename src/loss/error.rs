use thiserror::Error;

use crate::config::{LossType, MatchMode, SimMode};

#[derive(Debug, Error)]
pub enum LossError {
    /// No dispatch-table entry for this mode and loss family.
    #[error("unsupported combination: {loss_type} in {mode} mode")]
    UnsupportedCombination {
        mode: MatchMode,
        loss_type: LossType,
    },

    #[error("unsupported num_output {num_output}: expected 1 (sigmoid) or 2 (softmax)")]
    UnsupportedNumOutput { num_output: usize },

    #[error("unsupported sim_mode {sim_mode} in {mode} mode")]
    UnsupportedSimMode { mode: MatchMode, sim_mode: SimMode },

    #[error("{mode} mode expects {expected} model output")]
    OutputMismatch {
        mode: MatchMode,
        expected: &'static str,
    },

    #[error("row {row} has {actual} output columns, expected {expected}")]
    OutputWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{rows} output rows but {labels} labels")]
    LabelCountMismatch { rows: usize, labels: usize },

    /// Pair-mode output must interleave positive and negative rows.
    #[error("pair mode needs an even number of rows, got {rows}")]
    OddRowCount { rows: usize },

    /// No anchor in the batch had both a same-label and a different-label partner.
    #[error("no anchor in a batch of {rows} has both a positive and a negative")]
    NoValidTriplets { rows: usize },
}
