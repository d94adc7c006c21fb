//! Deterministic stand-ins for real encoders (tests, dry runs, the CLI).

use std::collections::HashSet;

use tracing::debug;

use crate::hashing::hash_to_u64;
use crate::tokenize::{FEATURE_X_QUERY, FEATURE_X_QUERY_LENGTH, FEATURE_X_SAMPLE, FEATURE_X_SAMPLE_LENGTH};

use super::error::EncoderError;
use super::types::EncodeOptions;
use super::{PairScorer, VectorEncoder};

const QUERY_FEATURES: &[&str] = &[FEATURE_X_QUERY, FEATURE_X_QUERY_LENGTH];
const PAIR_FEATURES: &[&str] = &[
    FEATURE_X_QUERY,
    FEATURE_X_QUERY_LENGTH,
    FEATURE_X_SAMPLE,
    FEATURE_X_SAMPLE_LENGTH,
];

/// Signed feature hashing of token ids: texts sharing tokens land close together.
///
/// Ignores `EncodeOptions`; the output does not change between training and inference.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dim: usize,
}

impl HashingEncoder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl VectorEncoder for HashingEncoder {
    fn declared_features(&self) -> &[&'static str] {
        QUERY_FEATURES
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn encode(&self, rows: &[&[u32]], _opts: EncodeOptions) -> Result<Vec<Vec<f32>>, EncoderError> {
        debug!(rows = rows.len(), dim = self.dim, "Generating stub encodings");

        Ok(rows
            .iter()
            .map(|ids| {
                let mut v = vec![0.0f32; self.dim];
                for id in ids.iter() {
                    let h = hash_to_u64(&id.to_le_bytes());
                    let slot = (h % self.dim as u64) as usize;
                    let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
                    v[slot] += sign;
                }
                v
            })
            .collect())
    }
}

/// Scores a pair by token overlap (Jaccard), mapped onto a logit around 0.5 overlap.
#[derive(Debug, Clone)]
pub struct OverlapScorer {
    num_output: usize,
}

impl OverlapScorer {
    /// `num_output` 1 yields `[z]`, 2 yields `[z, -z]`.
    pub fn new(num_output: usize) -> Self {
        Self { num_output }
    }
}

impl PairScorer for OverlapScorer {
    fn declared_features(&self) -> &[&'static str] {
        PAIR_FEATURES
    }

    fn num_output(&self) -> usize {
        self.num_output
    }

    fn score(
        &self,
        queries: &[&[u32]],
        samples: &[&[u32]],
        _opts: EncodeOptions,
    ) -> Result<Vec<Vec<f32>>, EncoderError> {
        Ok(queries
            .iter()
            .zip(samples)
            .map(|(q, s)| {
                let q: HashSet<u32> = q.iter().copied().collect();
                let s: HashSet<u32> = s.iter().copied().collect();
                let union = q.union(&s).count();
                let jaccard = if union == 0 {
                    0.0
                } else {
                    q.intersection(&s).count() as f32 / union as f32
                };
                let z = 4.0 * (jaccard - 0.5);
                if self.num_output == 2 { vec![z, -z] } else { vec![z] }
            })
            .collect())
    }
}
