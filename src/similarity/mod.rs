//! Vector comparison shared by triplet mining and evaluation.
//!
//! A [`Metric`] is either a similarity (higher is better) or a distance (lower is better). Which one
//! is in force comes from configuration (`is_distance`); mixing the two inside one computation is
//! the caller's problem.


use serde::Serialize;

/// Comparison rule for two vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
}

impl Metric {
    pub fn from_is_distance(is_distance: bool) -> Self {
        if is_distance {
            Metric::Euclidean
        } else {
            Metric::Cosine
        }
    }

    pub fn is_distance(&self) -> bool {
        matches!(self, Metric::Euclidean)
    }

    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::Cosine => cosine_similarity(a, b),
            Metric::Euclidean => euclidean_distance(a, b),
        }
    }

    /// `true` when `a` is a strictly better match than `b`.
    #[inline]
    pub fn is_better(&self, a: f32, b: f32) -> bool {
        match self {
            Metric::Cosine => a > b,
            Metric::Euclidean => a < b,
        }
    }

    /// Index of the best score; ties go to the first index.
    pub fn best_index(&self, scores: &[f32]) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, &score) in scores.iter().enumerate() {
            match best {
                Some((_, current)) if !self.is_better(score, current) => {}
                _ => best = Some((idx, score)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Indices ordered best-first; equal scores keep their original order.
    pub fn rank(&self, scores: &[f32]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            let (sa, sb) = (scores[a], scores[b]);
            if self.is_better(sa, sb) {
                std::cmp::Ordering::Less
            } else if self.is_better(sb, sa) {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        });
        order
    }

    /// Maps a raw score onto "higher is more confident": similarity as-is, `1 - distance`.
    #[inline]
    pub fn confidence(&self, score: f32) -> f32 {
        match self {
            Metric::Cosine => score,
            Metric::Euclidean => 1.0 - score,
        }
    }
}

#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (&av, &bv)| {
            (dot + av * bv, na + av * av, nb + bv * bv)
        });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(&av, &bv)| (av - bv) * (av - bv))
        .sum::<f32>()
        .sqrt()
}

/// Scales `v` to unit length in place; zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dense row-major `queries x references` score matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
    metric: Metric,
}

impl ScoreMatrix {
    /// Scores every query against every reference.
    pub fn pairwise<Q, R>(queries: &[Q], references: &[R], metric: Metric) -> Self
    where
        Q: AsRef<[f32]>,
        R: AsRef<[f32]>,
    {
        let mut data = Vec::with_capacity(queries.len() * references.len());
        for q in queries {
            for r in references {
                data.push(metric.score(q.as_ref(), r.as_ref()));
            }
        }
        Self {
            rows: queries.len(),
            cols: references.len(),
            data,
            metric,
        }
    }

    /// Wraps precomputed scores; `None` if `data` is not `rows * cols` long.
    pub fn from_raw(rows: usize, cols: usize, data: Vec<f32>, metric: Metric) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self {
            rows,
            cols,
            data,
            metric,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn row(&self, idx: usize) -> &[f32] {
        &self.data[idx * self.cols..(idx + 1) * self.cols]
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    /// Best reference per query (first index on ties); `None` when there are no references.
    pub fn best_matches(&self) -> Vec<Option<usize>> {
        (0..self.rows)
            .map(|r| self.metric.best_index(self.row(r)))
            .collect()
    }
}
