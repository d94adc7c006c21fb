use serde::Serialize;

use crate::constants::PAD_TOKEN_ID;
use crate::sampler::{Batch, BatchRow};

use super::Tokenize;
use super::error::TokenizeError;

pub const FEATURE_X_QUERY: &str = "x_query";
pub const FEATURE_X_QUERY_LENGTH: &str = "x_query_length";
pub const FEATURE_X_SAMPLE: &str = "x_sample";
pub const FEATURE_X_SAMPLE_LENGTH: &str = "x_sample_length";
pub const FEATURE_LABEL: &str = "label";

/// Padded token ids and lengths for one batch, keyed by the encoder's placeholder names.
///
/// `x_sample*` is only present for pair/point rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureBatch {
    pub x_query: Vec<Vec<u32>>,
    pub x_query_length: Vec<usize>,
    pub x_sample: Option<Vec<Vec<u32>>>,
    pub x_sample_length: Option<Vec<usize>>,
    pub label: Vec<u32>,
    pub maxlen: usize,
}

impl FeatureBatch {
    pub fn from_batch(
        batch: &Batch,
        tokenizer: &dyn Tokenize,
        maxlen: usize,
    ) -> Result<Self, TokenizeError> {
        Self::from_rows(&batch.rows(), tokenizer, maxlen)
    }

    /// All rows must agree on whether they carry a sample text.
    pub fn from_rows(
        rows: &[BatchRow<'_>],
        tokenizer: &dyn Tokenize,
        maxlen: usize,
    ) -> Result<Self, TokenizeError> {
        let paired = rows.first().is_some_and(|r| r.sample.is_some());

        let mut x_query = Vec::with_capacity(rows.len());
        let mut x_query_length = Vec::with_capacity(rows.len());
        let mut x_sample = Vec::with_capacity(if paired { rows.len() } else { 0 });
        let mut x_sample_length = Vec::with_capacity(if paired { rows.len() } else { 0 });
        let mut label = Vec::with_capacity(rows.len());

        for row in rows {
            let (ids, len) = pad(tokenizer.encode(row.query)?, maxlen);
            x_query.push(ids);
            x_query_length.push(len);

            if paired {
                let sample = row.sample.ok_or_else(|| TokenizeError::MissingFeature {
                    name: FEATURE_X_SAMPLE.to_string(),
                })?;
                let (ids, len) = pad(tokenizer.encode(sample)?, maxlen);
                x_sample.push(ids);
                x_sample_length.push(len);
            }

            label.push(row.label);
        }

        Ok(Self {
            x_query,
            x_query_length,
            x_sample: paired.then_some(x_sample),
            x_sample_length: paired.then_some(x_sample_length),
            label,
            maxlen,
        })
    }

    /// Rows (not sequences).
    pub fn len(&self) -> usize {
        self.x_query.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x_query.is_empty()
    }

    pub fn is_paired(&self) -> bool {
        self.x_sample.is_some()
    }

    /// Populated placeholder names.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = vec![FEATURE_X_QUERY, FEATURE_X_QUERY_LENGTH];
        if self.is_paired() {
            names.push(FEATURE_X_SAMPLE);
            names.push(FEATURE_X_SAMPLE_LENGTH);
        }
        names.push(FEATURE_LABEL);
        names
    }

    /// Fails on the first declared name this batch does not populate.
    pub fn check_declared(&self, declared: &[&str]) -> Result<(), TokenizeError> {
        let names = self.names();
        match declared.iter().find(|name| !names.iter().any(|n| n == *name)) {
            Some(name) => Err(TokenizeError::MissingFeature {
                name: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Token count of every sequence in batch order (query, then sample, per row).
    pub fn sequence_lengths(&self) -> Vec<usize> {
        match &self.x_sample_length {
            Some(samples) => self
                .x_query_length
                .iter()
                .zip(samples)
                .flat_map(|(&q, &s)| [q, s])
                .collect(),
            None => self.x_query_length.clone(),
        }
    }

    /// Unpadded ids of query row `idx`.
    pub fn query_ids(&self, idx: usize) -> &[u32] {
        &self.x_query[idx][..self.x_query_length[idx]]
    }

    /// Unpadded ids of sample row `idx`, if the batch is paired.
    pub fn sample_ids(&self, idx: usize) -> Option<&[u32]> {
        match (&self.x_sample, &self.x_sample_length) {
            (Some(ids), Some(lens)) => Some(&ids[idx][..lens[idx]]),
            _ => None,
        }
    }
}

fn pad(mut ids: Vec<u32>, maxlen: usize) -> (Vec<u32>, usize) {
    ids.truncate(maxlen);
    let len = ids.len();
    ids.resize(maxlen, PAD_TOKEN_ID);
    (ids, len)
}
