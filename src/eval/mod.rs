//! Offline evaluation of collected predictions.
//!
//! Evaluation is one sequential pass over a fully materialized record list: class mode needs the
//! whole query x reference score matrix, so nothing here streams.

pub mod error;
pub mod knn;
pub mod report;
pub mod split;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{EvalError, SplitEvalError};
pub use knn::knn_vote;
pub use report::{ClassMetrics, MetricsReport, PairMetrics, PointMetrics};
pub use split::SplitEvaluation;
pub use types::{EvalConfig, EvaluationRecord, ModelValue};

use tracing::{debug, info};

use crate::config::MatchMode;
use crate::similarity::{Metric, ScoreMatrix};

#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn metric(&self) -> Metric {
        Metric::from_is_distance(self.config.is_distance)
    }

    /// Dispatches on the configured mode. `references` is only read in class mode.
    pub fn evaluate(
        &self,
        predictions: &[EvaluationRecord],
        references: &[EvaluationRecord],
    ) -> Result<MetricsReport, EvalError> {
        let report = match self.config.mode {
            MatchMode::Class => MetricsReport::Class(self.evaluate_class(predictions, references)?),
            MatchMode::Pair => MetricsReport::Pair(self.evaluate_pair(predictions)?),
            MatchMode::Point => MetricsReport::Point(self.evaluate_point(predictions)?),
        };

        info!(mode = %self.config.mode, records = predictions.len(), "Evaluation complete");
        Ok(report)
    }

    /// Nearest reference per query; accuracy, threshold accuracy and optional KNN accuracy.
    pub fn evaluate_class(
        &self,
        queries: &[EvaluationRecord],
        references: &[EvaluationRecord],
    ) -> Result<ClassMetrics, EvalError> {
        let query_vecs = vectors(queries, "query")?;
        let ref_vecs = vectors(references, "reference")?;

        let dim = query_vecs[0].len();
        check_dims(&query_vecs, dim, "query")?;
        check_dims(&ref_vecs, dim, "reference")?;

        let metric = self.metric();
        let matrix = ScoreMatrix::pairwise(&query_vecs, &ref_vecs, metric);
        let ref_labels: Vec<u32> = references.iter().map(|r| r.label).collect();

        let mut right = 0usize;
        let mut thre_right = 0usize;
        for (idx, best) in matrix.best_matches().into_iter().enumerate() {
            let Some(best) = best else { continue };
            if ref_labels[best] == queries[idx].label {
                right += 1;
                if metric.confidence(matrix.get(idx, best)) > self.config.score_thre {
                    thre_right += 1;
                }
            }
        }

        let total = queries.len();
        let knn_acc = self.config.knn_k.map(|k| {
            let voted = knn_vote(&matrix, &ref_labels, k);
            let hits = voted
                .iter()
                .zip(queries)
                .filter(|(v, q)| **v == Some(q.label))
                .count();
            hits as f32 / total as f32
        });

        debug!(total, right, thre_right, "Scored class-mode queries");

        Ok(ClassMetrics {
            acc: right as f32 / total as f32,
            thre_acc: thre_right as f32 / total as f32,
            knn_acc,
            total,
        })
    }

    /// Splits scores into `num_class * dev_size` equal groups and checks whether each group's
    /// top-scoring row is a positive. Labels are grouped the same way as scores.
    pub fn evaluate_pair(&self, records: &[EvaluationRecord]) -> Result<PairMetrics, EvalError> {
        let scores = scores(records, MatchMode::Pair)?;
        let groups = self.config.num_class * self.config.dev_size;
        if groups == 0 || scores.is_empty() || !scores.len().is_multiple_of(groups) {
            return Err(EvalError::Shape {
                len: scores.len(),
                groups,
            });
        }

        let group_size = scores.len() / groups;
        let right = scores
            .chunks_exact(group_size)
            .zip(records.chunks_exact(group_size))
            .filter(|(group, rows)| {
                Metric::Cosine
                    .best_index(group)
                    .is_some_and(|best| rows[best].label == 1)
            })
            .count();

        debug!(groups, group_size, right, "Scored pair-mode groups");

        Ok(PairMetrics {
            acc: right as f32 / groups as f32,
            groups,
            group_size,
        })
    }

    /// Binarizes each score at `score_thre` (below is 0) and compares with the 0/1 labels.
    pub fn evaluate_point(&self, records: &[EvaluationRecord]) -> Result<PointMetrics, EvalError> {
        let scores = scores(records, MatchMode::Point)?;

        let (mut tp, mut fp, mut fn_, mut tn) = (0, 0, 0, 0);
        for (score, record) in scores.iter().zip(records) {
            let predicted = *score >= self.config.score_thre;
            match (predicted, record.label == 1) {
                (true, true) => tp += 1,
                (true, false) => fp += 1,
                (false, true) => fn_ += 1,
                (false, false) => tn += 1,
            }
        }

        Ok(PointMetrics::from_counts(tp, fp, fn_, tn))
    }
}

fn vectors<'a>(records: &'a [EvaluationRecord], what: &'static str) -> Result<Vec<&'a [f32]>, EvalError> {
    if records.is_empty() {
        return Err(EvalError::Empty { what });
    }
    records
        .iter()
        .enumerate()
        .map(|(index, r)| {
            r.as_vector().ok_or(EvalError::ValueKind {
                mode: MatchMode::Class,
                expected: "vector",
                index,
            })
        })
        .collect()
}

fn check_dims(vectors: &[&[f32]], expected: usize, list: &'static str) -> Result<(), EvalError> {
    match vectors.iter().position(|v| v.len() != expected) {
        Some(index) => Err(EvalError::DimensionMismatch {
            list,
            index,
            expected,
            actual: vectors[index].len(),
        }),
        None => Ok(()),
    }
}

fn scores(records: &[EvaluationRecord], mode: MatchMode) -> Result<Vec<f32>, EvalError> {
    if records.is_empty() {
        return Err(EvalError::Empty { what: "score" });
    }
    records
        .iter()
        .enumerate()
        .map(|(index, r)| {
            r.as_score().ok_or(EvalError::ValueKind {
                mode,
                expected: "score",
                index,
            })
        })
        .collect()
}
