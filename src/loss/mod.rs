//! Loss selection and computation.
//!
//! The applicable computation is looked up in [`DISPATCH`] by `(mode, loss family)`. A combination
//! with no entry is rejected when the dispatcher is built, before any batch is drawn.

pub mod error;
pub mod functions;
pub mod triplet;


pub use error::LossError;
pub use functions::{hinge_loss, improved_triplet_loss, sigmoid, sigmoid_loss, softmax_first};
pub use triplet::{MinedTriplet, ScorePair, batch_hard_triplets};

use serde::Serialize;
use tracing::debug;

use crate::config::{LossFamily, LossType, MatchMode, SimMode};
use crate::constants::{DEFAULT_INTRA_MARGIN, DEFAULT_INTRA_WEIGHT, DEFAULT_MARGIN};
use crate::encoder::ModelOutput;
use crate::similarity::Metric;

/// How a batch's model output turns into a scalar loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Computation {
    /// Class mode: mine batch-hard triplets, then a pairwise loss on the mined scores.
    MinedPairwise,
    /// Class mode: mine batch-hard triplets, then sigmoid loss (positives 1, negatives 0).
    MinedPointwise,
    /// Pair mode: rows alternate positive/negative; pairwise loss on their probabilities.
    InterleavedPairwise,
    /// Point mode: sigmoid loss of each row's logit against its label.
    Pointwise,
}

/// `(mode, loss family) -> computation`.
pub const DISPATCH: &[(MatchMode, LossFamily, Computation)] = &[
    (MatchMode::Class, LossFamily::Pairwise, Computation::MinedPairwise),
    (MatchMode::Class, LossFamily::Pointwise, Computation::MinedPointwise),
    (MatchMode::Pair, LossFamily::Pairwise, Computation::InterleavedPairwise),
    (MatchMode::Point, LossFamily::Pointwise, Computation::Pointwise),
];

/// Looks up the computation for a mode and loss family.
pub fn lookup(mode: MatchMode, family: LossFamily) -> Option<Computation> {
    DISPATCH
        .iter()
        .find(|(m, f, _)| *m == mode && *f == family)
        .map(|(_, _, c)| *c)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LossConfig {
    pub mode: MatchMode,
    pub loss_type: LossType,
    pub sim_mode: SimMode,
    /// Logits per row: 1 reads through a sigmoid, 2 through a softmax.
    pub num_output: usize,
    pub is_distance: bool,
    pub margin: f32,
    pub intra_margin: f32,
    pub intra_weight: f32,
}

impl Default for LossConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Class,
            loss_type: LossType::Hinge,
            sim_mode: SimMode::Represent,
            num_output: 1,
            is_distance: false,
            margin: DEFAULT_MARGIN,
            intra_margin: DEFAULT_INTRA_MARGIN,
            intra_weight: DEFAULT_INTRA_WEIGHT,
        }
    }
}

/// Result of one loss evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossOutcome {
    pub loss: f32,
    /// `(positive, negative)` scores the loss was computed on; empty in point mode.
    pub score_pairs: Vec<ScorePair>,
    pub computation: Computation,
}

/// Validated `(mode, loss)` combination, ready to score batches.
#[derive(Debug, Clone)]
pub struct LossDispatcher {
    config: LossConfig,
    computation: Computation,
}

impl LossDispatcher {
    pub fn new(config: LossConfig) -> Result<Self, LossError> {
        let computation = lookup(config.mode, config.loss_type.family()).ok_or(
            LossError::UnsupportedCombination {
                mode: config.mode,
                loss_type: config.loss_type,
            },
        )?;

        if !matches!(config.num_output, 1 | 2) {
            return Err(LossError::UnsupportedNumOutput {
                num_output: config.num_output,
            });
        }

        if config.mode == MatchMode::Class && config.sim_mode == SimMode::Cross {
            return Err(LossError::UnsupportedSimMode {
                mode: config.mode,
                sim_mode: config.sim_mode,
            });
        }

        debug!(
            mode = %config.mode,
            loss_type = %config.loss_type,
            computation = ?computation,
            "Loss dispatcher ready"
        );

        Ok(Self {
            config,
            computation,
        })
    }

    pub fn config(&self) -> &LossConfig {
        &self.config
    }

    pub fn computation(&self) -> Computation {
        self.computation
    }

    pub fn metric(&self) -> Metric {
        Metric::from_is_distance(self.config.is_distance)
    }

    /// Scores one batch. `labels` are the batch's row labels (class ids or 0/1 targets).
    pub fn compute(&self, output: &ModelOutput, labels: &[u32]) -> Result<LossOutcome, LossError> {
        if output.len() != labels.len() {
            return Err(LossError::LabelCountMismatch {
                rows: output.len(),
                labels: labels.len(),
            });
        }

        let outcome = match (self.computation, output) {
            (Computation::MinedPairwise | Computation::MinedPointwise, ModelOutput::Vectors(vectors)) => {
                self.mined(vectors, labels)?
            }
            (Computation::InterleavedPairwise, ModelOutput::Logits(logits)) => {
                self.interleaved(logits)?
            }
            (Computation::Pointwise, ModelOutput::Logits(logits)) => self.pointwise(logits, labels)?,
            (Computation::MinedPairwise | Computation::MinedPointwise, ModelOutput::Logits(_)) => {
                return Err(LossError::OutputMismatch {
                    mode: self.config.mode,
                    expected: "vector",
                });
            }
            (_, ModelOutput::Vectors(_)) => {
                return Err(LossError::OutputMismatch {
                    mode: self.config.mode,
                    expected: "logit",
                });
            }
        };

        debug!(
            loss = outcome.loss,
            pairs = outcome.score_pairs.len(),
            "Computed batch loss"
        );
        Ok(outcome)
    }

    fn mined(&self, vectors: &[Vec<f32>], labels: &[u32]) -> Result<LossOutcome, LossError> {
        let metric = self.metric();
        let triplets = batch_hard_triplets(vectors, labels, metric);
        if triplets.is_empty() {
            return Err(LossError::NoValidTriplets {
                rows: vectors.len(),
            });
        }

        let score_pairs: Vec<ScorePair> = triplets.iter().map(|t| t.score_pair(metric)).collect();
        let loss = match self.computation {
            Computation::MinedPointwise => pointwise_on_pairs(&score_pairs),
            _ => self.pairwise(&score_pairs),
        };

        Ok(LossOutcome {
            loss,
            score_pairs,
            computation: self.computation,
        })
    }

    fn interleaved(&self, logits: &[Vec<f32>]) -> Result<LossOutcome, LossError> {
        if logits.len() % 2 != 0 {
            return Err(LossError::OddRowCount { rows: logits.len() });
        }

        let probs = logits
            .iter()
            .enumerate()
            .map(|(row, z)| self.probability(row, z))
            .collect::<Result<Vec<_>, _>>()?;

        let score_pairs: Vec<ScorePair> = probs
            .chunks_exact(2)
            .map(|pair| ScorePair {
                positive: pair[0],
                negative: pair[1],
            })
            .collect();

        Ok(LossOutcome {
            loss: self.pairwise(&score_pairs),
            score_pairs,
            computation: self.computation,
        })
    }

    fn pointwise(&self, logits: &[Vec<f32>], labels: &[u32]) -> Result<LossOutcome, LossError> {
        let z = logits
            .iter()
            .enumerate()
            .map(|(row, z)| self.logit(row, z))
            .collect::<Result<Vec<_>, _>>()?;
        let targets: Vec<f32> = labels.iter().map(|&l| l as f32).collect();

        Ok(LossOutcome {
            loss: sigmoid_loss(&z, &targets),
            score_pairs: Vec::new(),
            computation: self.computation,
        })
    }

    fn pairwise(&self, pairs: &[ScorePair]) -> f32 {
        let (pos, neg): (Vec<f32>, Vec<f32>) = pairs.iter().map(|p| (p.positive, p.negative)).unzip();
        match self.config.loss_type {
            LossType::ImprovedTriplet => improved_triplet_loss(
                &pos,
                &neg,
                self.config.margin,
                self.config.intra_margin,
                self.config.intra_weight,
            ),
            _ => hinge_loss(&pos, &neg, self.config.margin),
        }
    }

    /// Positive-class probability of one output row.
    fn probability(&self, row: usize, z: &[f32]) -> Result<f32, LossError> {
        self.check_width(row, z)?;
        Ok(if self.config.num_output == 2 {
            softmax_first(z)
        } else {
            sigmoid(z[0])
        })
    }

    /// Single logit of one output row; two-column rows collapse to `z0 - z1`.
    fn logit(&self, row: usize, z: &[f32]) -> Result<f32, LossError> {
        self.check_width(row, z)?;
        Ok(if self.config.num_output == 2 {
            z[0] - z[1]
        } else {
            z[0]
        })
    }

    fn check_width(&self, row: usize, z: &[f32]) -> Result<(), LossError> {
        if z.len() != self.config.num_output {
            return Err(LossError::OutputWidth {
                row,
                expected: self.config.num_output,
                actual: z.len(),
            });
        }
        Ok(())
    }
}

/// Mined scores treated as logits: positives target 1, negatives 0.
fn pointwise_on_pairs(pairs: &[ScorePair]) -> f32 {
    let pos: Vec<f32> = pairs.iter().map(|p| p.positive).collect();
    let neg: Vec<f32> = pairs.iter().map(|p| p.negative).collect();
    sigmoid_loss(&pos, &vec![1.0; pos.len()]) + sigmoid_loss(&neg, &vec![0.0; neg.len()])
}
