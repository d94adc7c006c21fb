//! Encoder interface and the model head around it.
//!
//! The network itself is a black box. It comes in two capabilities, picked by
//! [`SimMode`]: a [`VectorEncoder`] turns each sequence into a vector, and a [`PairScorer`] scores
//! a `(query, sample)` pair jointly. [`MatchModel`] feeds it a [`FeatureBatch`] and shapes the
//! output per [`MatchMode`].

pub mod error;
pub mod stub;
pub mod types;


pub use error::EncoderError;
pub use stub::{HashingEncoder, OverlapScorer};
pub use types::{EncodeOptions, ModelOutput};

use tracing::debug;

use crate::config::{MatchMode, SimMode};
use crate::constants::PREDICTION_CUTOFF;
use crate::eval::{EvaluationRecord, ModelValue};
use crate::loss::{sigmoid, softmax_first};
use crate::similarity::{cosine_similarity, l2_normalize};
use crate::tokenize::{FEATURE_X_SAMPLE, FeatureBatch, TokenizeError};

/// Represent capability: one vector per token-id row.
pub trait VectorEncoder: Send + Sync {
    /// Placeholder names this encoder reads.
    fn declared_features(&self) -> &[&'static str];

    fn dim(&self) -> usize;

    fn encode(&self, rows: &[&[u32]], opts: EncodeOptions) -> Result<Vec<Vec<f32>>, EncoderError>;
}

/// Cross capability: `num_output` logits per `(query, sample)` pair.
pub trait PairScorer: Send + Sync {
    fn declared_features(&self) -> &[&'static str];

    fn num_output(&self) -> usize;

    fn score(
        &self,
        queries: &[&[u32]],
        samples: &[&[u32]],
        opts: EncodeOptions,
    ) -> Result<Vec<Vec<f32>>, EncoderError>;
}

pub enum Encoder {
    Represent(Box<dyn VectorEncoder>),
    Cross(Box<dyn PairScorer>),
}

impl std::fmt::Debug for Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoder::Represent(e) => f.debug_struct("Represent").field("dim", &e.dim()).finish(),
            Encoder::Cross(s) => f
                .debug_struct("Cross")
                .field("num_output", &s.num_output())
                .finish(),
        }
    }
}

impl Encoder {
    pub fn sim_mode(&self) -> SimMode {
        match self {
            Encoder::Represent(_) => SimMode::Represent,
            Encoder::Cross(_) => SimMode::Cross,
        }
    }

    pub fn declared_features(&self) -> &[&'static str] {
        match self {
            Encoder::Represent(e) => e.declared_features(),
            Encoder::Cross(s) => s.declared_features(),
        }
    }

    /// Deterministic stub for the configured capability.
    pub fn stub(sim_mode: SimMode, dim: usize, num_output: usize) -> Self {
        match sim_mode {
            SimMode::Represent => Encoder::Represent(Box::new(HashingEncoder::new(dim))),
            SimMode::Cross => Encoder::Cross(Box::new(OverlapScorer::new(num_output))),
        }
    }
}

/// Encoder plus the mode-specific head.
#[derive(Debug)]
pub struct MatchModel {
    encoder: Encoder,
    mode: MatchMode,
    num_output: usize,
}

impl MatchModel {
    /// Class mode needs a represent encoder. Represent encoders in pair/point mode emit a single
    /// cosine logit, so they require `num_output == 1`.
    pub fn new(encoder: Encoder, mode: MatchMode, num_output: usize) -> Result<Self, EncoderError> {
        let sim_mode = encoder.sim_mode();
        let unsupported = |reason: String| EncoderError::Unsupported {
            mode,
            sim_mode,
            reason,
        };

        match (&encoder, mode) {
            (Encoder::Cross(_), MatchMode::Class) => {
                return Err(unsupported("class mode compares vectors".to_string()));
            }
            (Encoder::Represent(_), MatchMode::Pair | MatchMode::Point) if num_output != 1 => {
                return Err(unsupported(format!(
                    "cosine head has one output, num_output is {num_output}"
                )));
            }
            (Encoder::Cross(s), _) if s.num_output() != num_output => {
                return Err(unsupported(format!(
                    "scorer emits {} outputs, num_output is {num_output}",
                    s.num_output()
                )));
            }
            _ => {}
        }

        Ok(Self {
            encoder,
            mode,
            num_output,
        })
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn num_output(&self) -> usize {
        self.num_output
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn forward(&self, features: &FeatureBatch, opts: EncodeOptions) -> Result<ModelOutput, EncoderError> {
        features.check_declared(self.encoder.declared_features())?;

        let queries: Vec<&[u32]> = (0..features.len()).map(|i| features.query_ids(i)).collect();
        debug!(
            rows = queries.len(),
            mode = %self.mode,
            training = opts.training,
            "Running encoder"
        );

        if self.mode == MatchMode::Class {
            let Encoder::Represent(encoder) = &self.encoder else {
                return Err(EncoderError::Unsupported {
                    mode: self.mode,
                    sim_mode: SimMode::Cross,
                    reason: "class mode compares vectors".to_string(),
                });
            };
            let mut vectors = encoder.encode(&queries, opts)?;
            check_rows(queries.len(), vectors.len())?;
            for v in &mut vectors {
                l2_normalize(v);
            }
            return Ok(ModelOutput::Vectors(vectors));
        }

        let samples = (0..features.len())
            .map(|i| features.sample_ids(i))
            .collect::<Option<Vec<&[u32]>>>()
            .ok_or_else(|| TokenizeError::MissingFeature {
                name: FEATURE_X_SAMPLE.to_string(),
            })?;

        let logits = match &self.encoder {
            Encoder::Represent(encoder) => {
                let q = encoder.encode(&queries, opts)?;
                let s = encoder.encode(&samples, opts)?;
                check_rows(queries.len(), q.len())?;
                check_rows(samples.len(), s.len())?;
                q.iter()
                    .zip(&s)
                    .map(|(a, b)| vec![cosine_similarity(a, b)])
                    .collect()
            }
            Encoder::Cross(scorer) => {
                let logits = scorer.score(&queries, &samples, opts)?;
                check_rows(queries.len(), logits.len())?;
                logits
            }
        };

        Ok(ModelOutput::Logits(logits))
    }

    /// Inference pass producing one record per row.
    ///
    /// Class mode keeps the vector; pair/point mode keeps the positive-class score and a
    /// prediction at the fixed 0.5 cut.
    pub fn predict(&self, features: &FeatureBatch) -> Result<Vec<EvaluationRecord>, EncoderError> {
        let output = self.forward(features, EncodeOptions::inference())?;

        let records = match output {
            ModelOutput::Vectors(vectors) => vectors
                .into_iter()
                .zip(&features.label)
                .map(|(v, &label)| EvaluationRecord {
                    value: ModelValue::Vector(v),
                    predicted: None,
                    label,
                })
                .collect(),
            ModelOutput::Logits(logits) => logits
                .iter()
                .zip(&features.label)
                .map(|(z, &label)| {
                    let score = self.score(z);
                    EvaluationRecord {
                        value: ModelValue::Score(score),
                        predicted: Some(u32::from(score > PREDICTION_CUTOFF)),
                        label,
                    }
                })
                .collect(),
        };

        Ok(records)
    }

    fn score(&self, z: &[f32]) -> f32 {
        if self.num_output == 2 {
            softmax_first(z)
        } else {
            z.first().copied().map(sigmoid).unwrap_or(0.0)
        }
    }
}

fn check_rows(expected: usize, actual: usize) -> Result<(), EncoderError> {
    if expected != actual {
        return Err(EncoderError::RowCount { expected, actual });
    }
    Ok(())
}
