use std::collections::HashMap;

use super::*;
use crate::config::ConfigError;
use crate::corpus::{LabeledText, TextPair};
use crate::records::{CorpusPreparer, CountingPreparer};

fn class_streams(num_class: u32, per_class: usize) -> Vec<Vec<ClassExample>> {
    (0..num_class)
        .map(|label| {
            (0..per_class)
                .map(|i| ClassExample {
                    text: format!("c{label}-{i}"),
                    label,
                })
                .collect()
        })
        .collect()
}

fn triples(n: usize) -> Vec<PairTriple> {
    (0..n)
        .map(|i| PairTriple {
            query: format!("q{i}"),
            positive: format!("p{i}"),
            negative: format!("n{i}"),
        })
        .collect()
}

fn point_rows(n: usize) -> Vec<PointRow> {
    (0..n)
        .map(|i| PointRow {
            query: format!("q{i}"),
            sample: format!("s{i}"),
            label: (i % 2) as u32,
        })
        .collect()
}

fn class_config(batch_size: usize, per_batch: usize) -> SamplerConfig {
    SamplerConfig::new(MatchMode::Class, batch_size).with_num_classes_per_batch(per_batch)
}

#[test]
fn test_class_batches_are_stratified() {
    let mut sampler = BatchSampler::from_class_streams(class_config(12, 4), class_streams(10, 3)).unwrap();
    let layout = sampler.layout();
    assert_eq!(layout.num_classes_per_batch, 4);
    assert_eq!(layout.num_sentences_per_class, 3);

    for _ in 0..50 {
        let batch = sampler.next_batch();
        let labels = batch.labels();
        assert_eq!(labels.len(), 12);

        let mut counts: HashMap<u32, usize> = HashMap::new();
        for label in &labels {
            *counts.entry(*label).or_default() += 1;
        }
        assert_eq!(counts.len(), 4);
        assert!(counts.values().all(|&c| c == 3));

        // each label's examples are contiguous
        for group in labels.chunks(3) {
            assert!(group.iter().all(|&l| l == group[0]));
        }
        let BatchItems::Class(items) = batch.items() else {
            panic!("expected class items");
        };
        assert!(items.iter().all(|e| e.text.starts_with(&format!("c{}-", e.label))));
    }
}

#[test]
fn test_small_classes_cycle() {
    // one example per class, four drawn per label
    let mut sampler = BatchSampler::from_class_streams(class_config(8, 2), class_streams(3, 1)).unwrap();
    let batch = sampler.next_batch();
    let BatchItems::Class(items) = batch.items() else {
        panic!("expected class items");
    };
    assert_eq!(items.len(), 8);
    assert_eq!(items[0], items[3]);
}

#[test]
fn test_same_seed_same_batches() {
    let a: Vec<Batch> = BatchSampler::from_class_streams(class_config(6, 3).with_seed(9), class_streams(8, 4))
        .unwrap()
        .take(10)
        .collect();
    let b: Vec<Batch> = BatchSampler::from_class_streams(class_config(6, 3).with_seed(9), class_streams(8, 4))
        .unwrap()
        .take(10)
        .collect();
    let c: Vec<Batch> = BatchSampler::from_class_streams(class_config(6, 3).with_seed(10), class_streams(8, 4))
        .unwrap()
        .take(10)
        .collect();

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_label_draws_replay_from_seed() {
    let first: Vec<u32> = LabelDraws::new(42, 20, 5, 2).take(100).collect();
    let second: Vec<u32> = LabelDraws::new(42, 20, 5, 2).take(100).collect();
    assert_eq!(first, second);

    let mut draws = LabelDraws::new(1, 6, 6, 1);
    let mut step = draws.next_step();
    step.sort_unstable();
    assert_eq!(step, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_class_construction_errors() {
    let err = BatchSampler::from_class_streams(class_config(12, 4), class_streams(4, 2)).unwrap_err();
    assert!(matches!(
        err,
        SamplerError::Config(ConfigError::ClassesPerBatchTooLarge {
            num_classes_per_batch: 4,
            num_class: 4
        })
    ));

    let err = BatchSampler::from_class_streams(class_config(10, 4), class_streams(8, 2)).unwrap_err();
    assert!(matches!(
        err,
        SamplerError::Config(ConfigError::BatchSizeNotDivisible { .. })
    ));

    let mut streams = class_streams(5, 2);
    streams[2].clear();
    let err = BatchSampler::from_class_streams(class_config(4, 2), streams).unwrap_err();
    assert!(matches!(err, SamplerError::EmptyClass { class_id: 2 }));

    let err = BatchSampler::from_pair_triples(class_config(4, 2), triples(2)).unwrap_err();
    assert!(matches!(err, SamplerError::ModeMismatch { .. }));
}

#[test]
fn test_pair_batches_alternate_positive_negative() {
    let config = SamplerConfig::new(MatchMode::Pair, 8);
    let mut sampler = BatchSampler::from_pair_triples(config, triples(3)).unwrap();

    for _ in 0..5 {
        let batch = sampler.next_batch();
        assert_eq!(batch.len(), 8);
        assert_eq!(batch.labels(), vec![1, 0, 1, 0]);

        let seqs = batch.sequences();
        for quad in seqs.chunks(4) {
            assert_eq!(quad[0], quad[2]);
            assert!(quad[1].starts_with('p'));
            assert!(quad[3].starts_with('n'));
        }
    }

    let err = BatchSampler::from_pair_triples(SamplerConfig::new(MatchMode::Pair, 6), triples(3)).unwrap_err();
    assert!(matches!(
        err,
        SamplerError::Config(ConfigError::BatchSizeNotDivisible { factor: 4, .. })
    ));
}

#[test]
fn test_pair_cycle_covers_every_triple_each_pass() {
    let config = SamplerConfig::new(MatchMode::Pair, 4);
    let mut sampler = BatchSampler::from_pair_triples(config, triples(5)).unwrap();

    for _ in 0..3 {
        let mut seen: Vec<String> = (0..5)
            .map(|_| match sampler.next_batch().items() {
                BatchItems::Pair(items) => items[0].query.clone(),
                _ => unreachable!(),
            })
            .collect();
        seen.sort();
        assert_eq!(seen, vec!["q0", "q1", "q2", "q3", "q4"]);
    }
}

#[test]
fn test_point_batches_even_and_labeled() {
    let mut sampler = BatchSampler::from_point_rows(SamplerConfig::new(MatchMode::Point, 6), point_rows(4)).unwrap();

    let batch = sampler.next_batch();
    assert_eq!(batch.len(), 6);
    assert_eq!(batch.len() % 2, 0);
    assert_eq!(batch.rows().len(), 3);
    assert!(batch.labels().iter().all(|&l| l <= 1));

    assert!(matches!(
        BatchSampler::from_point_rows(SamplerConfig::new(MatchMode::Point, 6), Vec::new()).unwrap_err(),
        SamplerError::EmptySource { .. }
    ));
}

#[test]
fn test_layout_round_trip() {
    let mut class = BatchSampler::from_class_streams(class_config(15, 5), class_streams(9, 2)).unwrap();
    assert_eq!(class.next_batch().layout(), class.layout());

    let mut pair = BatchSampler::from_pair_triples(SamplerConfig::new(MatchMode::Pair, 12), triples(4)).unwrap();
    assert_eq!(pair.next_batch().layout(), pair.layout());

    let mut point = BatchSampler::from_point_rows(SamplerConfig::new(MatchMode::Point, 10), point_rows(3)).unwrap();
    assert_eq!(point.next_batch().layout(), point.layout());
}

#[test]
fn test_from_corpus() {
    let labeled = Corpus::Labeled(
        ["A", "B", "C", "A", "B", "C"]
            .iter()
            .enumerate()
            .map(|(i, label)| LabeledText {
                text: format!("t{i}"),
                label: label.to_string(),
            })
            .collect(),
    );
    let sampler = BatchSampler::from_corpus(class_config(4, 2), &labeled).unwrap();
    assert_eq!(sampler.num_class(), 3);

    let paired = Corpus::Paired(vec![
        TextPair {
            text_a: "q".into(),
            text_b: "yes".into(),
            label: 1,
        },
        TextPair {
            text_a: "q".into(),
            text_b: "no".into(),
            label: 0,
        },
    ]);
    let mut sampler = BatchSampler::from_corpus(SamplerConfig::new(MatchMode::Pair, 4), &paired).unwrap();
    assert_eq!(sampler.next_batch().sequences(), vec!["q", "yes", "q", "no"]);

    assert!(matches!(
        BatchSampler::from_corpus(SamplerConfig::new(MatchMode::Point, 4), &labeled).unwrap_err(),
        SamplerError::Config(ConfigError::CorpusShapeMismatch { .. })
    ));
}

#[test]
fn test_open_prepares_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path().join("records"));
    let corpus = Corpus::Labeled(
        (0..12)
            .map(|i| LabeledText {
                text: format!("text {i}"),
                label: format!("L{}", i % 4),
            })
            .collect(),
    );
    let preparer = CountingPreparer::new(CorpusPreparer::new(corpus, MatchMode::Class).unwrap());

    let sampler = BatchSampler::open(class_config(6, 3), &store, &preparer).unwrap();
    assert_eq!(sampler.num_class(), 4);
    assert_eq!(preparer.calls(), 1);

    let _again = BatchSampler::open(class_config(6, 3), &store, &preparer).unwrap();
    assert_eq!(preparer.calls(), 1);
}

struct NoopPreparer;

impl Preparer for NoopPreparer {
    fn prepare(&self, _store: &RecordStore, _split: Split) -> Result<(), RecordError> {
        Ok(())
    }
}

#[test]
fn test_open_fails_when_prepare_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path());

    let err = BatchSampler::open(class_config(6, 3), &store, &NoopPreparer).unwrap_err();
    assert!(matches!(
        err,
        SamplerError::Record(RecordError::NothingPrepared { .. })
    ));
}
