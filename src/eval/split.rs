//! Scoring a materialized split with a model.
//!
//! Queries come from the requested split. In class mode each query is matched against the whole
//! train split, predicted with the same model, and the split must hold one file per class.

use tracing::{debug, info};

use crate::config::{MatchMode, Split};
use crate::constants::DEFAULT_BATCH_SIZE;
use crate::encoder::MatchModel;
use crate::records::RecordStore;
use crate::sampler::{Batch, BatchItems};
use crate::tokenize::{FeatureBatch, Tokenize};

use super::Evaluator;
use super::error::SplitEvalError;
use super::report::MetricsReport;
use super::types::EvaluationRecord;

/// Runs a model over stored record splits and evaluates the predictions.
pub struct SplitEvaluation<'a> {
    store: &'a RecordStore,
    model: &'a MatchModel,
    tokenizer: &'a dyn Tokenize,
    maxlen: usize,
    batch_size: usize,
}

impl std::fmt::Debug for SplitEvaluation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitEvaluation")
            .field("root", &self.store.root())
            .field("mode", &self.model.mode())
            .field("maxlen", &self.maxlen)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl<'a> SplitEvaluation<'a> {
    pub fn new(
        store: &'a RecordStore,
        model: &'a MatchModel,
        tokenizer: &'a dyn Tokenize,
        maxlen: usize,
    ) -> Self {
        Self {
            store,
            model,
            tokenizer,
            maxlen,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Records (examples, triples or rows) per inference pass.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Predicts every record of `split`.
    ///
    /// Class mode goes through [`RecordStore::load_class_eval`], so the split must hold exactly
    /// `num_class` files.
    pub fn predict_split(
        &self,
        split: Split,
        num_class: usize,
    ) -> Result<Vec<EvaluationRecord>, SplitEvalError> {
        let batches = match self.model.mode() {
            MatchMode::Class => chunked(
                self.store.load_class_eval(split, num_class)?,
                self.batch_size,
                BatchItems::Class,
            ),
            MatchMode::Pair => chunked(
                self.store.load_pair_split(split)?,
                self.batch_size,
                BatchItems::Pair,
            ),
            MatchMode::Point => chunked(
                self.store.load_point_split(split)?,
                self.batch_size,
                BatchItems::Point,
            ),
        };
        self.predict_batches(split, batches)
    }

    /// Predicts the whole train split, the reference set of class-mode evaluation.
    pub fn predict_references(&self) -> Result<Vec<EvaluationRecord>, SplitEvalError> {
        let examples = self
            .store
            .load_class_streams(Split::Train)?
            .into_iter()
            .flatten()
            .collect();
        self.predict_batches(Split::Train, chunked(examples, self.batch_size, BatchItems::Class))
    }

    /// Predicts `split` (plus train references in class mode) and evaluates it.
    pub fn run(&self, split: Split, evaluator: &Evaluator) -> Result<MetricsReport, SplitEvalError> {
        let mode = self.model.mode();
        if evaluator.config().mode != mode {
            return Err(SplitEvalError::ModeMismatch {
                model: mode,
                evaluator: evaluator.config().mode,
            });
        }

        let queries = self.predict_split(split, evaluator.config().num_class)?;
        let references = match mode {
            MatchMode::Class => self.predict_references()?,
            MatchMode::Pair | MatchMode::Point => Vec::new(),
        };

        let report = evaluator.evaluate(&queries, &references)?;
        info!(
            split = %split,
            mode = %mode,
            queries = queries.len(),
            references = references.len(),
            "Split evaluated"
        );
        Ok(report)
    }

    fn predict_batches(
        &self,
        split: Split,
        batches: Vec<BatchItems>,
    ) -> Result<Vec<EvaluationRecord>, SplitEvalError> {
        if batches.is_empty() {
            return Err(SplitEvalError::NoRecords {
                split,
                root: self.store.root().to_path_buf(),
            });
        }

        let mut records = Vec::new();
        for items in batches {
            let batch = Batch::new(items);
            let features = FeatureBatch::from_batch(&batch, self.tokenizer, self.maxlen)?;
            records.extend(self.model.predict(&features)?);
        }

        debug!(split = %split, records = records.len(), "Predicted split");
        Ok(records)
    }
}

fn chunked<T: Clone>(items: Vec<T>, size: usize, wrap: fn(Vec<T>) -> BatchItems) -> Vec<BatchItems> {
    items.chunks(size).map(|chunk| wrap(chunk.to_vec())).collect()
}
