//! End-to-end training steps: corpus -> records -> sampler -> prefetch -> model -> loss.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::fixtures::{class_corpus_text, deterministic_vector, pair_corpus_text, write_file};
use sieve::{
    Computation, CorpusPreparer, CountingPreparer, EncodeOptions, Encoder, LossConfig,
    LossDispatcher, LossType, MatchMode, MatchModel, Metric, ModelOutput, PipelineConfig,
    Prefetcher, RecordStore, SamplerConfig, SimMode, Split, batch_hard_triplets, corpus,
};
use sieve::{BatchSampler, HashingTokenizer};

fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        maxlen: 12,
        workers: 3,
        prefetch: 2,
    }
}

#[tokio::test]
async fn test_class_mode_training_steps() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = write_file(dir.path(), "train.tsv", &class_corpus_text(4, 0));
    let corpus = corpus::load(&corpus_path).unwrap();
    assert_eq!(corpus.num_class(), 6);

    let store = RecordStore::new(dir.path().join("records"));
    let preparer = CountingPreparer::new(CorpusPreparer::new(corpus, MatchMode::Class).unwrap());
    let config = SamplerConfig::new(MatchMode::Class, 8).with_num_classes_per_batch(2);
    let sampler = BatchSampler::open(config, &store, &preparer).unwrap();
    assert_eq!(preparer.calls(), 1);
    assert_eq!(store.files(Split::Train).unwrap().len(), 6);

    let model = MatchModel::new(Encoder::stub(SimMode::Represent, 256, 1), MatchMode::Class, 1).unwrap();
    let dispatcher = LossDispatcher::new(LossConfig {
        loss_type: LossType::ImprovedTriplet,
        ..Default::default()
    })
    .unwrap();

    let mut prefetcher = Prefetcher::spawn(sampler, Arc::new(HashingTokenizer::default()), pipeline_config());
    for prepared in prefetcher.take(5).await.unwrap() {
        let labels: HashSet<u32> = prepared.features.label.iter().copied().collect();
        assert_eq!(labels.len(), 2);
        assert!(prepared.features.x_query_length.iter().all(|&l| l == 4));

        let output = model.forward(&prepared.features, EncodeOptions::training()).unwrap();
        let outcome = dispatcher.compute(&output, &prepared.features.label).unwrap();
        assert_eq!(outcome.computation, Computation::MinedPairwise);
        assert_eq!(outcome.score_pairs.len(), 8);
        assert!(outcome.loss.is_finite() && outcome.loss >= 0.0);
        // same-class texts share three of four tokens, so every anchor separates cleanly
        assert!(outcome.score_pairs.iter().all(|p| p.positive > p.negative));
    }
}

#[tokio::test]
async fn test_pair_mode_with_cross_scorer() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = corpus::load(write_file(dir.path(), "pairs.tsv", &pair_corpus_text(3))).unwrap();

    // every query has 2 positives x 2 negatives
    let sampler = BatchSampler::from_corpus(SamplerConfig::new(MatchMode::Pair, 8), &corpus).unwrap();
    let model = MatchModel::new(Encoder::stub(SimMode::Cross, 0, 2), MatchMode::Pair, 2).unwrap();
    let dispatcher = LossDispatcher::new(LossConfig {
        mode: MatchMode::Pair,
        sim_mode: SimMode::Cross,
        num_output: 2,
        ..Default::default()
    })
    .unwrap();

    let mut prefetcher = Prefetcher::spawn(sampler, Arc::new(HashingTokenizer::default()), pipeline_config());
    let prepared = prefetcher.take(3).await.unwrap();
    for p in &prepared {
        assert_eq!(p.batch.len(), 8);
        assert_eq!(p.features.label, vec![1, 0, 1, 0]);

        let output = model.forward(&p.features, EncodeOptions::training()).unwrap();
        let outcome = dispatcher.compute(&output, &p.features.label).unwrap();
        assert_eq!(outcome.computation, Computation::InterleavedPairwise);
        assert_eq!(outcome.score_pairs.len(), 2);
        assert!(outcome.loss >= 0.0);
    }
    assert_eq!(
        prepared.iter().map(|p| p.step).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[tokio::test]
async fn test_point_mode_with_represent_encoder() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = corpus::load(write_file(dir.path(), "points.tsv", &pair_corpus_text(2))).unwrap();
    let store = RecordStore::new(dir.path().join("records"));
    let preparer = CorpusPreparer::new(corpus, MatchMode::Point).unwrap();

    let sampler = BatchSampler::open(SamplerConfig::new(MatchMode::Point, 4), &store, &preparer).unwrap();
    let model = MatchModel::new(Encoder::stub(SimMode::Represent, 64, 1), MatchMode::Point, 1).unwrap();
    let dispatcher = LossDispatcher::new(LossConfig {
        mode: MatchMode::Point,
        loss_type: LossType::Sigmoid,
        ..Default::default()
    })
    .unwrap();

    let mut prefetcher = Prefetcher::spawn(sampler, Arc::new(HashingTokenizer::default()), pipeline_config());
    let prepared = prefetcher.next().await.unwrap().unwrap();
    assert!(prepared.features.is_paired());
    assert_eq!(prepared.features.len(), 2);

    let output = model.forward(&prepared.features, EncodeOptions::training()).unwrap();
    let ModelOutput::Logits(ref logits) = output else {
        panic!("point mode emits logits");
    };
    assert!(logits.iter().all(|row| row.len() == 1));

    let outcome = dispatcher.compute(&output, &prepared.features.label).unwrap();
    assert_eq!(outcome.computation, Computation::Pointwise);
    assert!(outcome.loss > 0.0);
}

#[test]
fn test_batch_hard_mining_property_on_deterministic_vectors() {
    for metric in [Metric::Cosine, Metric::Euclidean] {
        let vectors: Vec<Vec<f32>> = (0..24).map(|i| deterministic_vector(i, 16)).collect();
        let labels: Vec<u32> = (0..24).map(|i| (i / 4) as u32).collect();

        let triplets = batch_hard_triplets(&vectors, &labels, metric);
        assert_eq!(triplets.len(), 24);

        for t in &triplets {
            for (j, v) in vectors.iter().enumerate() {
                if j == t.anchor {
                    continue;
                }
                let s = metric.score(&vectors[t.anchor], v);
                if labels[j] == labels[t.anchor] {
                    assert!(!metric.is_better(t.pos_score, s), "positive is not the hardest");
                } else {
                    assert!(!metric.is_better(s, t.neg_score), "negative is not the hardest");
                }
            }
        }
    }
}

#[test]
fn test_unlisted_combinations_rejected_before_sampling() {
    for (mode, loss_type) in [
        (MatchMode::Pair, LossType::Sigmoid),
        (MatchMode::Point, LossType::Hinge),
        (MatchMode::Point, LossType::ImprovedTriplet),
    ] {
        let config = sieve::Config {
            mode,
            loss_type,
            ..Default::default()
        };
        assert!(config.validate().is_err(), "{mode} / {loss_type}");
    }
}
