//! Batch-hard triplet mining.
//!
//! For every anchor the hardest positive is the same-label vector that matches it worst and the
//! hardest negative is the different-label vector that matches it best. Scanning is in index order
//! and only a strictly harder candidate replaces the current pick, so ties go to the first index.

use serde::Serialize;
use tracing::debug;

use crate::similarity::{Metric, ScoreMatrix};

/// Raw scores of one mined triplet, in the metric's own units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinedTriplet {
    pub anchor: usize,
    pub positive: usize,
    pub negative: usize,
    pub pos_score: f32,
    pub neg_score: f32,
}

/// `(positive, negative)` on a "higher is better" scale, ready for a loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScorePair {
    pub positive: f32,
    pub negative: f32,
}

impl MinedTriplet {
    /// Converts raw scores with [`Metric::confidence`].
    pub fn score_pair(&self, metric: Metric) -> ScorePair {
        ScorePair {
            positive: metric.confidence(self.pos_score),
            negative: metric.confidence(self.neg_score),
        }
    }
}

/// Mines one triplet per anchor that has at least one positive and one negative.
///
/// `labels` must be as long as `vectors`; anchors without a partner on either side are skipped.
pub fn batch_hard_triplets(vectors: &[Vec<f32>], labels: &[u32], metric: Metric) -> Vec<MinedTriplet> {
    let scores = ScoreMatrix::pairwise(vectors, vectors, metric);
    let n = vectors.len().min(labels.len());

    let mut triplets = Vec::with_capacity(n);
    for anchor in 0..n {
        let row = scores.row(anchor);
        let mut positive: Option<(usize, f32)> = None;
        let mut negative: Option<(usize, f32)> = None;

        for (j, &score) in row.iter().enumerate().take(n) {
            if j == anchor {
                continue;
            }
            if labels[j] == labels[anchor] {
                match positive {
                    Some((_, current)) if !metric.is_better(current, score) => {}
                    _ => positive = Some((j, score)),
                }
            } else {
                match negative {
                    Some((_, current)) if !metric.is_better(score, current) => {}
                    _ => negative = Some((j, score)),
                }
            }
        }

        if let (Some((p, pos_score)), Some((q, neg_score))) = (positive, negative) {
            triplets.push(MinedTriplet {
                anchor,
                positive: p,
                negative: q,
                pos_score,
                neg_score,
            });
        }
    }

    if triplets.len() < n {
        debug!(
            anchors = n,
            mined = triplets.len(),
            "Skipped anchors lacking a positive or negative"
        );
    }

    triplets
}
