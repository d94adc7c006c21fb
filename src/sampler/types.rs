use crate::config::MatchMode;
use crate::constants::{PAIR_GROUP_SIZE, POINT_GROUP_SIZE};
use crate::corpus::{ClassExample, PairTriple, PointRow};

use super::config::BatchLayout;

/// Batch contents; the ordering inside each variant carries the mode's structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchItems {
    /// Label groups concatenated, each group contiguous.
    Class(Vec<ClassExample>),
    /// Each triple is laid out as `(query, positive, query, negative)`.
    Pair(Vec<PairTriple>),
    /// Each row is laid out as `(query, sample)`.
    Point(Vec<PointRow>),
}

/// One model input row: a single text (class mode) or a `(query, sample)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRow<'a> {
    pub query: &'a str,
    pub sample: Option<&'a str>,
    pub label: u32,
}

/// One training step's worth of examples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    items: BatchItems,
}

impl Batch {
    pub fn new(items: BatchItems) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &BatchItems {
        &self.items
    }

    pub fn mode(&self) -> MatchMode {
        match self.items {
            BatchItems::Class(_) => MatchMode::Class,
            BatchItems::Pair(_) => MatchMode::Pair,
            BatchItems::Point(_) => MatchMode::Point,
        }
    }

    /// Sequence count (texts, not rows).
    pub fn len(&self) -> usize {
        match &self.items {
            BatchItems::Class(items) => items.len(),
            BatchItems::Pair(items) => items.len() * PAIR_GROUP_SIZE,
            BatchItems::Point(items) => items.len() * POINT_GROUP_SIZE,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every text in batch order.
    pub fn sequences(&self) -> Vec<&str> {
        match &self.items {
            BatchItems::Class(items) => items.iter().map(|e| e.text.as_str()).collect(),
            BatchItems::Pair(items) => items
                .iter()
                .flat_map(|t| [&t.query, &t.positive, &t.query, &t.negative])
                .map(String::as_str)
                .collect(),
            BatchItems::Point(items) => items
                .iter()
                .flat_map(|r| [&r.query, &r.sample])
                .map(String::as_str)
                .collect(),
        }
    }

    /// Model input rows. Pair triples expand to a positive row then a negative row, so even rows
    /// carry positive scores and odd rows negative scores.
    pub fn rows(&self) -> Vec<BatchRow<'_>> {
        match &self.items {
            BatchItems::Class(items) => items
                .iter()
                .map(|e| BatchRow {
                    query: &e.text,
                    sample: None,
                    label: e.label,
                })
                .collect(),
            BatchItems::Pair(items) => items
                .iter()
                .flat_map(|t| {
                    [
                        BatchRow {
                            query: &t.query,
                            sample: Some(t.positive.as_str()),
                            label: 1,
                        },
                        BatchRow {
                            query: &t.query,
                            sample: Some(t.negative.as_str()),
                            label: 0,
                        },
                    ]
                })
                .collect(),
            BatchItems::Point(items) => items
                .iter()
                .map(|r| BatchRow {
                    query: &r.query,
                    sample: Some(r.sample.as_str()),
                    label: r.label,
                })
                .collect(),
        }
    }

    /// Per-row labels, aligned with [`rows`](Self::rows).
    pub fn labels(&self) -> Vec<u32> {
        self.rows().iter().map(|r| r.label).collect()
    }

    /// Recovers the layout from the batch's own structure.
    pub fn layout(&self) -> BatchLayout {
        match &self.items {
            BatchItems::Class(items) => {
                let mut groups = 0usize;
                let mut previous = None;
                for example in items {
                    if previous != Some(example.label) {
                        groups += 1;
                        previous = Some(example.label);
                    }
                }
                BatchLayout {
                    num_classes_per_batch: groups,
                    num_sentences_per_class: items.len().checked_div(groups).unwrap_or(0),
                }
            }
            BatchItems::Pair(items) => BatchLayout {
                num_classes_per_batch: items.len(),
                num_sentences_per_class: PAIR_GROUP_SIZE,
            },
            BatchItems::Point(items) => BatchLayout {
                num_classes_per_batch: POINT_GROUP_SIZE,
                num_sentences_per_class: items.len(),
            },
        }
    }
}
