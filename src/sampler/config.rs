use serde::Serialize;

use crate::config::{ConfigError, MatchMode};
use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_NUM_CLASSES_PER_BATCH, DEFAULT_SEED, PAIR_GROUP_SIZE,
    POINT_GROUP_SIZE,
};

/// Sizing for [`BatchSampler`](super::BatchSampler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    pub mode: MatchMode,
    /// Sequences per batch.
    pub batch_size: usize,
    /// Only consulted in class mode.
    pub num_classes_per_batch: usize,
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Class,
            batch_size: DEFAULT_BATCH_SIZE,
            num_classes_per_batch: DEFAULT_NUM_CLASSES_PER_BATCH,
            seed: DEFAULT_SEED,
        }
    }
}

impl SamplerConfig {
    pub fn new(mode: MatchMode, batch_size: usize) -> Self {
        Self {
            mode,
            batch_size,
            ..Default::default()
        }
    }

    pub fn with_num_classes_per_batch(mut self, num_classes_per_batch: usize) -> Self {
        self.num_classes_per_batch = num_classes_per_batch;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Factor `batch_size` must divide by: classes per batch, 4 (pair) or 2 (point).
    pub fn grouping(&self) -> Result<usize, ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroSize { name: "batch_size" });
        }

        let factor = match self.mode {
            MatchMode::Class => {
                if self.num_classes_per_batch == 0 {
                    return Err(ConfigError::ZeroSize {
                        name: "num_classes_per_batch",
                    });
                }
                self.num_classes_per_batch
            }
            MatchMode::Pair => PAIR_GROUP_SIZE,
            MatchMode::Point => POINT_GROUP_SIZE,
        };

        if !self.batch_size.is_multiple_of(factor) {
            return Err(ConfigError::BatchSizeNotDivisible {
                mode: self.mode,
                batch_size: self.batch_size,
                factor,
            });
        }
        Ok(factor)
    }

    /// Resolves the batch layout against the total class count.
    pub fn layout(&self, num_class: usize) -> Result<BatchLayout, ConfigError> {
        let factor = self.grouping()?;

        let layout = match self.mode {
            MatchMode::Class => {
                if self.num_classes_per_batch >= num_class {
                    return Err(ConfigError::ClassesPerBatchTooLarge {
                        num_classes_per_batch: self.num_classes_per_batch,
                        num_class,
                    });
                }
                BatchLayout {
                    num_classes_per_batch: factor,
                    num_sentences_per_class: self.batch_size / factor,
                }
            }
            MatchMode::Pair => BatchLayout {
                num_classes_per_batch: self.batch_size / factor,
                num_sentences_per_class: factor,
            },
            MatchMode::Point => BatchLayout {
                num_classes_per_batch: factor,
                num_sentences_per_class: self.batch_size / factor,
            },
        };
        Ok(layout)
    }
}

/// How a batch is carved into groups.
///
/// Class mode: `num_classes_per_batch` labels, `num_sentences_per_class` texts each.
/// Pair mode: `num_classes_per_batch` quadruples of 4 sequences.
/// Point mode: 2 sequences per row, `num_sentences_per_class` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchLayout {
    pub num_classes_per_batch: usize,
    pub num_sentences_per_class: usize,
}

impl BatchLayout {
    /// Sequences per batch.
    pub fn batch_size(&self) -> usize {
        self.num_classes_per_batch * self.num_sentences_per_class
    }
}
