//! Materialized records and the one-time prepare step.
//!
//! The sampler only assumes records are grouped by class in class mode (one file per class,
//! loaded in class-id order) and stored as pre-grouped triples or rows otherwise. The on-disk
//! line format is JSON and is private to this module.

pub mod error;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::RecordError;
pub use store::RecordStore;

use tracing::info;

use crate::config::{MatchMode, Split};
use crate::corpus::Corpus;

/// Materializes records for a split when none exist yet.
pub trait Preparer: Send + Sync {
    fn prepare(&self, store: &RecordStore, split: Split) -> Result<(), RecordError>;
}

/// Writes records for a split straight from a loaded corpus.
#[derive(Debug, Clone)]
pub struct CorpusPreparer {
    corpus: Corpus,
    mode: MatchMode,
}

impl CorpusPreparer {
    /// Fails if the corpus shape cannot feed `mode`.
    pub fn new(corpus: Corpus, mode: MatchMode) -> Result<Self, RecordError> {
        corpus.check_mode(mode)?;
        Ok(Self { corpus, mode })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }
}

impl Preparer for CorpusPreparer {
    fn prepare(&self, store: &RecordStore, split: Split) -> Result<(), RecordError> {
        info!(
            root = %store.root().display(),
            split = %split,
            mode = %self.mode,
            "Preparing records"
        );

        match self.mode {
            MatchMode::Class => {
                store.write_class_split(split, &self.corpus.class_groups()?)?;
            }
            MatchMode::Pair => {
                store.write_pair_split(split, &self.corpus.pair_triples()?)?;
            }
            MatchMode::Point => {
                store.write_point_split(split, &self.corpus.point_rows()?)?;
            }
        }
        Ok(())
    }
}

/// Counts prepare calls while delegating to an inner preparer.
#[cfg(any(test, feature = "mock"))]
pub struct CountingPreparer<P> {
    inner: P,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "mock"))]
impl<P: Preparer> CountingPreparer<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "mock"))]
impl<P: Preparer> Preparer for CountingPreparer<P> {
    fn prepare(&self, store: &RecordStore, split: Split) -> Result<(), RecordError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.inner.prepare(store, split)
    }
}
