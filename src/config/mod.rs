//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `SIEVE_*` environment variables.

pub mod error;
pub mod types;


pub use error::ConfigError;
pub use types::{LossFamily, LossType, MatchMode, SimMode, Split};

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_DEV_SIZE, DEFAULT_INTRA_MARGIN, DEFAULT_INTRA_WEIGHT,
    DEFAULT_MARGIN, DEFAULT_MAXLEN, DEFAULT_NUM_CLASSES_PER_BATCH, DEFAULT_PREFETCH,
    DEFAULT_SCORE_THRE, DEFAULT_SEED,
};
use crate::corpus::Corpus;
use crate::eval::EvalConfig;
use crate::loss::{LossConfig, LossDispatcher};
use crate::pipeline::PipelineConfig;
use crate::sampler::SamplerConfig;

/// Job configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `SIEVE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Supervision regime. Default: `class`.
    pub mode: MatchMode,

    /// Loss applied to model output. Default: `hinge_loss`.
    pub loss_type: LossType,

    /// Independent (`represent`) or joint (`cross`) pair encoding. Default: `represent`.
    pub sim_mode: SimMode,

    /// Compare vectors by euclidean distance instead of cosine similarity.
    pub is_distance: bool,

    /// Confidence threshold for threshold accuracy and point binarization.
    pub score_thre: f32,

    /// Sequences per training batch.
    pub batch_size: usize,

    /// Total class count. Derived from the corpus or record store when unset.
    pub num_class: Option<usize>,

    /// Distinct classes drawn per class-mode batch. Default: `32`.
    pub num_classes_per_batch: usize,

    /// Held-out queries per class in pair-mode evaluation.
    pub dev_size: usize,

    /// Neighbor count for KNN voting; `None` disables the KNN report.
    pub knn_k: Option<usize>,

    /// Logit columns produced by a cross scorer: `1` (sigmoid) or `2` (softmax).
    pub num_output: usize,

    /// Max tokens per sequence.
    pub maxlen: usize,

    /// Seed for the sampling generator.
    pub seed: u64,

    /// Tab-separated corpus file.
    pub corpus_path: Option<PathBuf>,

    /// Directory of materialized record files. Default: `./.records`.
    pub records_path: PathBuf,

    /// `tokenizer.json`; the hashing tokenizer is used when unset.
    pub tokenizer_path: Option<PathBuf>,

    /// Prefetched batches buffered ahead of the consumer.
    pub prefetch: usize,

    /// Tokenization workers; defaults to available cores.
    pub workers: Option<usize>,

    pub margin: f32,
    pub intra_margin: f32,
    pub intra_weight: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: MatchMode::Class,
            loss_type: LossType::Hinge,
            sim_mode: SimMode::Represent,
            is_distance: false,
            score_thre: DEFAULT_SCORE_THRE,
            batch_size: DEFAULT_BATCH_SIZE,
            num_class: None,
            num_classes_per_batch: DEFAULT_NUM_CLASSES_PER_BATCH,
            dev_size: DEFAULT_DEV_SIZE,
            knn_k: None,
            num_output: 1,
            maxlen: DEFAULT_MAXLEN,
            seed: DEFAULT_SEED,
            corpus_path: None,
            records_path: PathBuf::from("./.records"),
            tokenizer_path: None,
            prefetch: DEFAULT_PREFETCH,
            workers: None,
            margin: DEFAULT_MARGIN,
            intra_margin: DEFAULT_INTRA_MARGIN,
            intra_weight: DEFAULT_INTRA_WEIGHT,
        }
    }
}

impl Config {
    const ENV_MODE: &'static str = "SIEVE_MODE";
    const ENV_LOSS_TYPE: &'static str = "SIEVE_LOSS_TYPE";
    const ENV_SIM_MODE: &'static str = "SIEVE_SIM_MODE";
    const ENV_IS_DISTANCE: &'static str = "SIEVE_IS_DISTANCE";
    const ENV_SCORE_THRE: &'static str = "SIEVE_SCORE_THRE";
    const ENV_BATCH_SIZE: &'static str = "SIEVE_BATCH_SIZE";
    const ENV_NUM_CLASS: &'static str = "SIEVE_NUM_CLASS";
    const ENV_NUM_CLASSES_PER_BATCH: &'static str = "SIEVE_NUM_CLASSES_PER_BATCH";
    const ENV_DEV_SIZE: &'static str = "SIEVE_DEV_SIZE";
    const ENV_KNN_K: &'static str = "SIEVE_KNN_K";
    const ENV_NUM_OUTPUT: &'static str = "SIEVE_NUM_OUTPUT";
    const ENV_MAXLEN: &'static str = "SIEVE_MAXLEN";
    const ENV_SEED: &'static str = "SIEVE_SEED";
    const ENV_CORPUS_PATH: &'static str = "SIEVE_CORPUS_PATH";
    const ENV_RECORDS_PATH: &'static str = "SIEVE_RECORDS_PATH";
    const ENV_TOKENIZER_PATH: &'static str = "SIEVE_TOKENIZER_PATH";
    const ENV_PREFETCH: &'static str = "SIEVE_PREFETCH";
    const ENV_WORKERS: &'static str = "SIEVE_WORKERS";
    const ENV_MARGIN: &'static str = "SIEVE_MARGIN";
    const ENV_INTRA_MARGIN: &'static str = "SIEVE_INTRA_MARGIN";
    const ENV_INTRA_WEIGHT: &'static str = "SIEVE_INTRA_WEIGHT";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            mode: Self::parse_from_env(Self::ENV_MODE, defaults.mode)?,
            loss_type: Self::parse_from_env(Self::ENV_LOSS_TYPE, defaults.loss_type)?,
            sim_mode: Self::parse_from_env(Self::ENV_SIM_MODE, defaults.sim_mode)?,
            is_distance: Self::parse_bool_from_env(Self::ENV_IS_DISTANCE, defaults.is_distance)?,
            score_thre: Self::parse_from_env(Self::ENV_SCORE_THRE, defaults.score_thre)?,
            batch_size: Self::parse_from_env(Self::ENV_BATCH_SIZE, defaults.batch_size)?,
            num_class: Self::parse_optional_from_env(Self::ENV_NUM_CLASS)?,
            num_classes_per_batch: Self::parse_from_env(
                Self::ENV_NUM_CLASSES_PER_BATCH,
                defaults.num_classes_per_batch,
            )?,
            dev_size: Self::parse_from_env(Self::ENV_DEV_SIZE, defaults.dev_size)?,
            knn_k: Self::parse_optional_from_env(Self::ENV_KNN_K)?,
            num_output: Self::parse_from_env(Self::ENV_NUM_OUTPUT, defaults.num_output)?,
            maxlen: Self::parse_from_env(Self::ENV_MAXLEN, defaults.maxlen)?,
            seed: Self::parse_from_env(Self::ENV_SEED, defaults.seed)?,
            corpus_path: Self::parse_optional_path_from_env(Self::ENV_CORPUS_PATH),
            records_path: Self::parse_optional_path_from_env(Self::ENV_RECORDS_PATH)
                .unwrap_or(defaults.records_path),
            tokenizer_path: Self::parse_optional_path_from_env(Self::ENV_TOKENIZER_PATH),
            prefetch: Self::parse_from_env(Self::ENV_PREFETCH, defaults.prefetch)?,
            workers: Self::parse_optional_from_env(Self::ENV_WORKERS)?,
            margin: Self::parse_from_env(Self::ENV_MARGIN, defaults.margin)?,
            intra_margin: Self::parse_from_env(Self::ENV_INTRA_MARGIN, defaults.intra_margin)?,
            intra_weight: Self::parse_from_env(Self::ENV_INTRA_WEIGHT, defaults.intra_weight)?,
        })
    }

    /// Validates sizes, thresholds, paths and the mode/loss combination.
    ///
    /// Sizing that depends on the class count is left to [`Config::validate_sampling`], since
    /// only training builds a sampler.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroSize { name: "batch_size" });
        }
        if self.maxlen == 0 {
            return Err(ConfigError::ZeroSize { name: "maxlen" });
        }
        if self.prefetch == 0 {
            return Err(ConfigError::ZeroSize { name: "prefetch" });
        }
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroSize { name: "workers" });
        }
        if self.knn_k == Some(0) {
            return Err(ConfigError::ZeroSize { name: "knn_k" });
        }
        if self.mode == MatchMode::Pair && self.dev_size == 0 {
            return Err(ConfigError::ZeroSize { name: "dev_size" });
        }
        if !(0.0..=1.0).contains(&self.score_thre) {
            return Err(ConfigError::OutOfRange {
                name: "score_thre",
                value: self.score_thre,
            });
        }

        self.sampler_config().grouping()?;

        LossDispatcher::new(self.loss_config())?;

        if let Some(ref path) = self.corpus_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if let Some(ref path) = self.tokenizer_path
            && !path.is_file()
        {
            return Err(ConfigError::NotAFile { path: path.clone() });
        }

        if self.records_path.exists() && !self.records_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.records_path.clone(),
            });
        }

        Ok(())
    }

    /// Batch layout against a configured `num_class` (classes per batch must be smaller).
    ///
    /// The sampler repeats this check against the class count it actually loads.
    pub fn validate_sampling(&self) -> Result<(), ConfigError> {
        if let Some(num_class) = self.num_class {
            self.sampler_config().layout(num_class)?;
        }
        Ok(())
    }

    /// Class count for evaluation: `SIEVE_NUM_CLASS`, else the corpus label set, else 2 for
    /// pair/point data (binary targets).
    pub fn resolve_num_class(&self, corpus: Option<&Corpus>) -> Result<usize, ConfigError> {
        if let Some(num_class) = self.num_class {
            return Ok(num_class);
        }
        if let Some(corpus) = corpus {
            return Ok(corpus.num_class());
        }
        match self.mode {
            MatchMode::Pair | MatchMode::Point => Ok(2),
            MatchMode::Class => Err(ConfigError::Missing {
                name: Self::ENV_NUM_CLASS,
            }),
        }
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            mode: self.mode,
            batch_size: self.batch_size,
            num_classes_per_batch: self.num_classes_per_batch,
            seed: self.seed,
        }
    }

    pub fn loss_config(&self) -> LossConfig {
        LossConfig {
            mode: self.mode,
            loss_type: self.loss_type,
            sim_mode: self.sim_mode,
            num_output: self.num_output,
            is_distance: self.is_distance,
            margin: self.margin,
            intra_margin: self.intra_margin,
            intra_weight: self.intra_weight,
        }
    }

    /// Builds the dispatcher for the configured combination.
    pub fn loss_dispatcher(&self) -> Result<LossDispatcher, ConfigError> {
        Ok(LossDispatcher::new(self.loss_config())?)
    }

    /// Evaluation settings; `num_class` is the resolved class count.
    pub fn eval_config(&self, num_class: usize) -> EvalConfig {
        EvalConfig {
            mode: self.mode,
            is_distance: self.is_distance,
            score_thre: self.score_thre,
            num_class,
            dev_size: self.dev_size,
            knn_k: self.knn_k,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        PipelineConfig {
            maxlen: self.maxlen,
            workers: self.workers.unwrap_or(defaults.workers),
            prefetch: self.prefetch,
        }
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) if !value.trim().is_empty() => {
                value
                    .trim()
                    .parse()
                    .map_err(|e: T::Err| ConfigError::InvalidValue {
                        name: var_name,
                        value: value.clone(),
                        reason: e.to_string(),
                    })
            }
            _ => Ok(default),
        }
    }

    fn parse_optional_from_env<T>(var_name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) if !value.trim().is_empty() => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: var_name,
                    value: value.clone(),
                    reason: e.to_string(),
                }),
            _ => Ok(None),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "" => Ok(default),
                "1" | "true" | "yes" => Ok(true),
                "0" | "false" | "no" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    name: var_name,
                    value,
                    reason: "expected true/false".to_string(),
                }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}
