//! Stratified batch construction.
//!
//! A [`BatchSampler`] is an endless iterator of [`Batch`]es whose internal order encodes the
//! mode's structure:
//!
//! - **class**: `num_classes_per_batch` distinct labels per step, drawn uniformly without
//!   replacement; each label contributes `num_sentences_per_class` consecutive examples pulled
//!   from that class's own cycling stream, so small classes never starve the sampler.
//! - **pair**: triples laid out as `(query, positive, query, negative)`; 4 sequences per group.
//! - **point**: `(query, sample)` rows with an explicit 0/1 label; 2 sequences per group.
//!
//! All randomness comes from one generator seeded from [`SamplerConfig::seed`], so two samplers
//! built from the same data and seed yield identical batches.

pub mod config;
pub mod draws;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::{BatchLayout, SamplerConfig};
pub use draws::{ClassCycle, LabelDraws, ShuffledCycle};
pub use error::SamplerError;
pub use types::{Batch, BatchItems, BatchRow};

use tracing::{debug, info, warn};

use crate::config::{MatchMode, Split};
use crate::corpus::{ClassExample, Corpus, PairTriple, PointRow};
use crate::records::{Preparer, RecordError, RecordStore};

enum Source {
    Class {
        draws: LabelDraws,
        streams: Vec<ClassCycle>,
    },
    Pair(ShuffledCycle<PairTriple>),
    Point(ShuffledCycle<PointRow>),
}

/// Endless source of structurally valid batches.
pub struct BatchSampler {
    config: SamplerConfig,
    layout: BatchLayout,
    num_class: usize,
    source: Source,
}

impl std::fmt::Debug for BatchSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchSampler")
            .field("config", &self.config)
            .field("layout", &self.layout)
            .field("num_class", &self.num_class)
            .finish()
    }
}

impl BatchSampler {
    /// Class mode: one stream per class, stream index is the class id drawn.
    pub fn from_class_streams(
        config: SamplerConfig,
        streams: Vec<Vec<ClassExample>>,
    ) -> Result<Self, SamplerError> {
        Self::expect_mode(&config, MatchMode::Class)?;
        if let Some(class_id) = streams.iter().position(Vec::is_empty) {
            return Err(SamplerError::EmptyClass { class_id });
        }

        let num_class = streams.len();
        let layout = config.layout(num_class)?;
        let draws = LabelDraws::new(
            config.seed,
            num_class,
            layout.num_classes_per_batch,
            layout.num_sentences_per_class,
        );
        let streams = streams.into_iter().map(ClassCycle::new).collect();

        info!(
            num_class,
            num_classes_per_batch = layout.num_classes_per_batch,
            num_sentences_per_class = layout.num_sentences_per_class,
            seed = config.seed,
            "Class sampler ready"
        );

        Ok(Self {
            config,
            layout,
            num_class,
            source: Source::Class { draws, streams },
        })
    }

    pub fn from_pair_triples(
        config: SamplerConfig,
        triples: Vec<PairTriple>,
    ) -> Result<Self, SamplerError> {
        Self::expect_mode(&config, MatchMode::Pair)?;
        if triples.is_empty() {
            return Err(SamplerError::EmptySource {
                mode: MatchMode::Pair,
            });
        }

        let layout = config.layout(2)?;
        info!(
            triples = triples.len(),
            triples_per_batch = layout.num_classes_per_batch,
            "Pair sampler ready"
        );

        Ok(Self {
            source: Source::Pair(ShuffledCycle::new(triples, config.seed)),
            config,
            layout,
            num_class: 2,
        })
    }

    pub fn from_point_rows(
        config: SamplerConfig,
        rows: Vec<PointRow>,
    ) -> Result<Self, SamplerError> {
        Self::expect_mode(&config, MatchMode::Point)?;
        if rows.is_empty() {
            return Err(SamplerError::EmptySource {
                mode: MatchMode::Point,
            });
        }

        let layout = config.layout(2)?;
        info!(
            rows = rows.len(),
            rows_per_batch = layout.num_sentences_per_class,
            "Point sampler ready"
        );

        Ok(Self {
            source: Source::Point(ShuffledCycle::new(rows, config.seed)),
            config,
            layout,
            num_class: 2,
        })
    }

    /// Builds a sampler straight from an in-memory corpus.
    pub fn from_corpus(config: SamplerConfig, corpus: &Corpus) -> Result<Self, SamplerError> {
        match config.mode {
            MatchMode::Class => {
                let streams = corpus
                    .class_groups()?
                    .into_iter()
                    .map(|group| {
                        group
                            .texts
                            .into_iter()
                            .map(|text| ClassExample {
                                text,
                                label: group.class_id,
                            })
                            .collect()
                    })
                    .collect();
                Self::from_class_streams(config, streams)
            }
            MatchMode::Pair => Self::from_pair_triples(config, corpus.pair_triples()?),
            MatchMode::Point => Self::from_point_rows(config, corpus.point_rows()?),
        }
    }

    /// Opens the train split of `store`, running `preparer` once if nothing is materialized yet.
    pub fn open(
        config: SamplerConfig,
        store: &RecordStore,
        preparer: &dyn Preparer,
    ) -> Result<Self, SamplerError> {
        config.grouping()?;

        if !store.has_split(Split::Train)? {
            warn!(
                root = %store.root().display(),
                "No train records found, preparing now"
            );
            preparer.prepare(store, Split::Train)?;
            if !store.has_split(Split::Train)? {
                return Err(RecordError::NothingPrepared {
                    split: Split::Train.to_string(),
                    root: store.root().to_path_buf(),
                }
                .into());
            }
        }

        let files = store.files(Split::Train)?.len();
        debug!(files, mode = %config.mode, "Loading train records");

        match config.mode {
            MatchMode::Class => {
                let streams = store.load_class_streams(Split::Train)?;
                Self::from_class_streams(config, streams)
            }
            MatchMode::Pair => {
                let triples = store.load_pair_split(Split::Train)?;
                Self::from_pair_triples(config, triples)
            }
            MatchMode::Point => {
                let rows = store.load_point_split(Split::Train)?;
                Self::from_point_rows(config, rows)
            }
        }
    }

    fn expect_mode(config: &SamplerConfig, actual: MatchMode) -> Result<(), SamplerError> {
        if config.mode != actual {
            return Err(SamplerError::ModeMismatch {
                expected: config.mode,
                actual,
            });
        }
        Ok(())
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn layout(&self) -> BatchLayout {
        self.layout
    }

    /// Classes available to the sampler (2 for pair/point data).
    pub fn num_class(&self) -> usize {
        self.num_class
    }

    pub fn next_batch(&mut self) -> Batch {
        let layout = self.layout;
        match &mut self.source {
            Source::Class { draws, streams } => {
                let mut items = Vec::with_capacity(layout.batch_size());
                for label in draws.by_ref().take(layout.batch_size()) {
                    let example = streams[label as usize].next_example();
                    items.push(ClassExample {
                        text: example.text.clone(),
                        label,
                    });
                }
                Batch::new(BatchItems::Class(items))
            }
            Source::Pair(cycle) => {
                let items = (0..layout.num_classes_per_batch)
                    .map(|_| cycle.next_item().clone())
                    .collect();
                Batch::new(BatchItems::Pair(items))
            }
            Source::Point(cycle) => {
                let items = (0..layout.num_sentences_per_class)
                    .map(|_| cycle.next_item().clone())
                    .collect();
                Batch::new(BatchItems::Point(items))
            }
        }
    }
}

impl Iterator for BatchSampler {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        Some(self.next_batch())
    }
}
