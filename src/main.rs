//! Sieve command-line entrypoint.
//!
//! ```text
//! sieve prepare [train|dev|test]
//! sieve sample [n]
//! sieve evaluate <predictions.json> [references.json]
//! sieve test [dev|test]
//! ```
//!
//! Settings come from `SIEVE_*` environment variables; see [`sieve::Config`].

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};

use sieve::config::{Config, ConfigError, Split};
use sieve::constants::STUB_ENCODER_DIM;
use sieve::corpus::{self, Corpus};
use sieve::encoder::{EncodeOptions, Encoder, MatchModel};
use sieve::eval::{EvaluationRecord, Evaluator, SplitEvaluation};
use sieve::pipeline::Prefetcher;
use sieve::records::{CorpusPreparer, Preparer, RecordError, RecordStore};
use sieve::sampler::BatchSampler;
use sieve::tokenize::{HashingTokenizer, HfTokenizer, Tokenize};

const USAGE: &str =
    "usage: sieve <prepare [split] | sample [n] | evaluate <predictions.json> [references.json] | test [split]>";

/// Stands in when no corpus is configured; records must already exist.
struct NoCorpus;

impl Preparer for NoCorpus {
    fn prepare(&self, _store: &RecordStore, _split: Split) -> Result<(), RecordError> {
        Err(ConfigError::Missing {
            name: "SIEVE_CORPUS_PATH",
        }
        .into())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!(USAGE);
    };

    tracing::info!(
        command = %command,
        mode = %config.mode,
        loss_type = %config.loss_type,
        sim_mode = %config.sim_mode,
        "Sieve starting"
    );

    match command.as_str() {
        "prepare" => {
            let split = match args.get(1) {
                Some(s) => s.parse()?,
                None => Split::Train,
            };
            prepare(&config, split)
        }
        "sample" => {
            let n = match args.get(1) {
                Some(n) => n.parse().context("batch count must be a number")?,
                None => 1,
            };
            sample(&config, n).await
        }
        "evaluate" => {
            let Some(predictions) = args.get(1) else {
                bail!(USAGE);
            };
            evaluate(&config, Path::new(predictions), args.get(2).map(Path::new))
        }
        "test" => {
            let split = match args.get(1) {
                Some(s) => s.parse()?,
                None => Split::Test,
            };
            test(&config, split)
        }
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }
}

fn load_corpus(config: &Config) -> anyhow::Result<Option<Corpus>> {
    config
        .corpus_path
        .as_ref()
        .map(|path| corpus::load(path).with_context(|| format!("loading {}", path.display())))
        .transpose()
}

fn prepare(config: &Config, split: Split) -> anyhow::Result<()> {
    config.validate_sampling()?;
    let Some(corpus) = load_corpus(config)? else {
        return Err(ConfigError::Missing {
            name: "SIEVE_CORPUS_PATH",
        }
        .into());
    };

    let store = RecordStore::new(&config.records_path);
    CorpusPreparer::new(corpus, config.mode)?.prepare(&store, split)?;

    println!(
        "prepared {} {} files under {}",
        store.files(split)?.len(),
        split,
        store.root().display()
    );
    Ok(())
}

fn tokenizer(config: &Config) -> anyhow::Result<Arc<dyn Tokenize>> {
    Ok(match &config.tokenizer_path {
        Some(path) => Arc::new(HfTokenizer::load(path)?),
        None => {
            tracing::warn!("No SIEVE_TOKENIZER_PATH configured, using the hashing tokenizer");
            Arc::new(HashingTokenizer::default())
        }
    })
}

/// Draws `n` batches through the full pipeline and scores them with the stub encoder.
async fn sample(config: &Config, n: usize) -> anyhow::Result<()> {
    config.validate_sampling()?;
    let store = RecordStore::new(&config.records_path);
    let sampler = match load_corpus(config)? {
        Some(corpus) => {
            let preparer = CorpusPreparer::new(corpus, config.mode)?;
            BatchSampler::open(config.sampler_config(), &store, &preparer)?
        }
        None => BatchSampler::open(config.sampler_config(), &store, &NoCorpus)?,
    };

    let dispatcher = config.loss_dispatcher()?;
    let model = MatchModel::new(
        Encoder::stub(config.sim_mode, STUB_ENCODER_DIM, config.num_output),
        config.mode,
        config.num_output,
    )?;

    println!(
        "layout: {} x {} over {} classes",
        sampler.layout().num_classes_per_batch,
        sampler.layout().num_sentences_per_class,
        sampler.num_class()
    );

    let mut prefetcher = Prefetcher::spawn(sampler, tokenizer(config)?, config.pipeline_config());
    for prepared in prefetcher.take(n).await? {
        let output = model.forward(&prepared.features, EncodeOptions::training())?;
        let outcome = dispatcher.compute(&output, &prepared.features.label)?;
        let lengths = prepared.features.sequence_lengths();
        println!(
            "step {}: {} sequences, max length {}, layout {:?}, loss {:.4}",
            prepared.step,
            prepared.batch.len(),
            lengths.iter().max().copied().unwrap_or(0),
            prepared.batch.layout(),
            outcome.loss
        );
    }
    Ok(())
}

fn read_records(path: &Path) -> anyhow::Result<Vec<EvaluationRecord>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn evaluate(config: &Config, predictions: &Path, references: Option<&Path>) -> anyhow::Result<()> {
    let predictions = read_records(predictions)?;
    let references = match references {
        Some(path) => read_records(path)?,
        None => Vec::new(),
    };

    let num_class = match config.resolve_num_class(load_corpus(config)?.as_ref()) {
        Ok(n) => n,
        Err(ConfigError::Missing { .. }) if !references.is_empty() => {
            let mut labels: Vec<u32> = references.iter().map(|r| r.label).collect();
            labels.sort_unstable();
            labels.dedup();
            labels.len()
        }
        Err(e) => return Err(e.into()),
    };

    let evaluator = Evaluator::new(config.eval_config(num_class));
    let report = evaluator.evaluate(&predictions, &references)?;

    println!("{report}");
    tracing::debug!(report = %serde_json::to_string(&report)?, "Metrics");
    Ok(())
}

/// Predicts a stored split with the stub encoder and evaluates it.
fn test(config: &Config, split: Split) -> anyhow::Result<()> {
    let store = RecordStore::new(&config.records_path);
    let num_class = match config.resolve_num_class(load_corpus(config)?.as_ref()) {
        Ok(n) => n,
        Err(ConfigError::Missing { .. }) => store.files(Split::Train)?.len(),
        Err(e) => return Err(e.into()),
    };

    let model = MatchModel::new(
        Encoder::stub(config.sim_mode, STUB_ENCODER_DIM, config.num_output),
        config.mode,
        config.num_output,
    )?;
    let tokenizer = tokenizer(config)?;
    let evaluator = Evaluator::new(config.eval_config(num_class));

    let report = SplitEvaluation::new(&store, &model, tokenizer.as_ref(), config.maxlen)
        .with_batch_size(config.batch_size)
        .run(split, &evaluator)?;

    println!("{report}");
    tracing::debug!(report = %serde_json::to_string(&report)?, "Metrics");
    Ok(())
}
