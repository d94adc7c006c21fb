use serde::{Deserialize, Serialize};

use crate::config::MatchMode;
use crate::constants::{DEFAULT_DEV_SIZE, DEFAULT_SCORE_THRE};

#[derive(Debug, Clone, PartialEq)]
pub struct EvalConfig {
    pub mode: MatchMode,
    /// Compare vectors by euclidean distance instead of cosine similarity.
    pub is_distance: bool,
    pub score_thre: f32,
    pub num_class: usize,
    /// Held-out queries per class (pair mode).
    pub dev_size: usize,
    /// Neighbors for the auxiliary KNN accuracy; `None` skips it.
    pub knn_k: Option<usize>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Class,
            is_distance: false,
            score_thre: DEFAULT_SCORE_THRE,
            num_class: 0,
            dev_size: DEFAULT_DEV_SIZE,
            knn_k: None,
        }
    }
}

/// What the model emitted for one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelValue {
    /// Encoded vector (class mode).
    #[serde(rename = "encode")]
    Vector(Vec<f32>),
    /// Positive-class probability (pair/point mode).
    Score(f32),
}

/// One inference row, serialized as `{"encode": [..] | "score": s, "pred": p, "label": l}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    #[serde(flatten)]
    pub value: ModelValue,
    #[serde(rename = "pred", default, skip_serializing_if = "Option::is_none")]
    pub predicted: Option<u32>,
    pub label: u32,
}

impl EvaluationRecord {
    pub fn vector(vector: Vec<f32>, label: u32) -> Self {
        Self {
            value: ModelValue::Vector(vector),
            predicted: None,
            label,
        }
    }

    pub fn score(score: f32, label: u32) -> Self {
        Self {
            value: ModelValue::Score(score),
            predicted: None,
            label,
        }
    }

    pub fn as_vector(&self) -> Option<&[f32]> {
        match &self.value {
            ModelValue::Vector(v) => Some(v),
            ModelValue::Score(_) => None,
        }
    }

    pub fn as_score(&self) -> Option<f32> {
        match self.value {
            ModelValue::Score(s) => Some(s),
            ModelValue::Vector(_) => None,
        }
    }
}
