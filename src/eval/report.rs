use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub acc: f32,
    /// Label-correct matches whose confidence also clears `score_thre`.
    pub thre_acc: f32,
    pub knn_acc: Option<f32>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairMetrics {
    pub acc: f32,
    pub groups: usize,
    pub group_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointMetrics {
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

impl PointMetrics {
    /// Standard definitions; a zero denominator yields 0.
    pub fn from_counts(tp: usize, fp: usize, fn_: usize, tn: usize) -> Self {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f32 / den as f32 };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            precision,
            recall,
            f1,
            true_positives: tp,
            false_positives: fp,
            false_negatives: fn_,
            true_negatives: tn,
        }
    }
}

/// Evaluator output for one split.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MetricsReport {
    Class(ClassMetrics),
    Pair(PairMetrics),
    Point(PointMetrics),
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsReport::Class(m) => {
                writeln!(f, "Acc:{}", m.acc)?;
                write!(f, "ThreAcc:{}", m.thre_acc)?;
                if let Some(knn) = m.knn_acc {
                    write!(f, "\nKnnAcc:{knn}")?;
                }
                Ok(())
            }
            MetricsReport::Pair(m) => write!(f, "Acc:{}", m.acc),
            MetricsReport::Point(m) => write!(
                f,
                "precision:{} recall:{} f1:{}",
                m.precision, m.recall, m.f1
            ),
        }
    }
}
