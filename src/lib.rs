//! Sieve library crate (used by the `sieve` binary and integration tests).
//!
//! Trains and evaluates text matching under three supervision regimes: class (metric learning
//! over many labels), pair (query/positive/negative triples) and point (query/sample/binary
//! label). The encoder is a black box behind a trait; this crate decides what gets compared to
//! what.
//!
//! # Public API Surface
//!
//! ## Data
//! - [`corpus::load`], [`Corpus`] - Tab-separated corpus in one of two shapes
//! - [`RecordStore`], [`Preparer`], [`CorpusPreparer`] - Materialized records and the prepare step
//!
//! ## Training
//! - [`BatchSampler`], [`SamplerConfig`], [`Batch`] - Stratified batch construction
//! - [`Prefetcher`], [`PipelineConfig`] - Bounded, order-preserving tokenization pipeline
//! - [`MatchModel`], [`Encoder`], [`VectorEncoder`], [`PairScorer`] - Encoder interface and head
//! - [`LossDispatcher`], [`batch_hard_triplets`] - Loss selection and triplet mining
//!
//! ## Evaluation
//! - [`Evaluator`], [`EvaluationRecord`], [`MetricsReport`] - Mode-specific metrics
//! - [`SplitEvaluation`] - Predicts a stored split (and train references) and evaluates it
//! - [`knn_vote`] - Auxiliary KNN classifier
//!
//! ## Test/Mock Support
//! [`CountingPreparer`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod corpus;
pub mod encoder;
pub mod eval;
pub mod hashing;
pub mod loss;
pub mod pipeline;
pub mod records;
pub mod sampler;
pub mod similarity;
pub mod tokenize;

pub use config::{Config, ConfigError, LossFamily, LossType, MatchMode, SimMode, Split};
pub use corpus::{
    ClassExample, ClassGroup, Corpus, CorpusShape, FormatError, LabelVocab, PairTriple, PointRow,
};
pub use encoder::{
    EncodeOptions, Encoder, EncoderError, HashingEncoder, MatchModel, ModelOutput, OverlapScorer,
    PairScorer, VectorEncoder,
};
pub use eval::{
    ClassMetrics, EvalConfig, EvalError, EvaluationRecord, Evaluator, MetricsReport, ModelValue,
    PairMetrics, PointMetrics, SplitEvalError, SplitEvaluation, knn_vote,
};
pub use hashing::{hash_to_u64, hash_token};
pub use loss::{
    Computation, LossConfig, LossDispatcher, LossError, LossOutcome, MinedTriplet, ScorePair,
    batch_hard_triplets,
};
pub use pipeline::{PipelineConfig, PipelineError, Prefetcher, PreparedBatch};
#[cfg(any(test, feature = "mock"))]
pub use records::CountingPreparer;
pub use records::{CorpusPreparer, Preparer, RecordError, RecordStore};
pub use sampler::{Batch, BatchItems, BatchLayout, BatchSampler, SamplerConfig, SamplerError};
pub use similarity::{Metric, ScoreMatrix, cosine_similarity, euclidean_distance};
pub use tokenize::{FeatureBatch, HashingTokenizer, HfTokenizer, Tokenize, TokenizeError};
