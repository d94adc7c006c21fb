use crate::constants::TRAINING_KEEP_PROB;

/// Per-call run settings handed to the encoder; never stored on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    pub training: bool,
}

impl EncodeOptions {
    pub fn training() -> Self {
        Self { training: true }
    }

    pub fn inference() -> Self {
        Self { training: false }
    }

    /// Dropout keep probability implied by `training`.
    pub fn keep_prob(&self) -> f32 {
        if self.training {
            TRAINING_KEEP_PROB
        } else {
            1.0
        }
    }
}

/// Raw model output for one batch, one entry per input row.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// Fixed-size vectors (class mode).
    Vectors(Vec<Vec<f32>>),
    /// `num_output` logits per `(query, sample)` row (pair/point mode).
    Logits(Vec<Vec<f32>>),
}

impl ModelOutput {
    pub fn len(&self) -> usize {
        match self {
            ModelOutput::Vectors(rows) | ModelOutput::Logits(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
