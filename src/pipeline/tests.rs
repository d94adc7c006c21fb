use super::*;
use crate::config::MatchMode;
use crate::corpus::{ClassExample, PointRow};
use crate::sampler::SamplerConfig;
use crate::tokenize::{HashingTokenizer, TokenizeError};

fn class_sampler(seed: u64) -> BatchSampler {
    let streams = (0..5u32)
        .map(|label| {
            (0..3)
                .map(|i| ClassExample {
                    text: format!("class {label} text {i}"),
                    label,
                })
                .collect()
        })
        .collect();
    let config = SamplerConfig::new(MatchMode::Class, 6)
        .with_num_classes_per_batch(3)
        .with_seed(seed);
    BatchSampler::from_class_streams(config, streams).unwrap()
}

fn pipeline_config(workers: usize) -> PipelineConfig {
    PipelineConfig {
        maxlen: 8,
        workers,
        prefetch: 2,
    }
}

struct FailingTokenizer;

impl Tokenize for FailingTokenizer {
    fn encode(&self, _text: &str) -> Result<Vec<u32>, TokenizeError> {
        Err(TokenizeError::EncodeFailed {
            reason: "boom".to_string(),
        })
    }
}

#[tokio::test]
async fn test_prefetch_preserves_draw_order() {
    let expected: Vec<Batch> = class_sampler(11).take(6).collect();

    let mut prefetcher = Prefetcher::spawn(
        class_sampler(11),
        Arc::new(HashingTokenizer::default()),
        pipeline_config(4),
    );
    let prepared = prefetcher.take(6).await.unwrap();

    for (i, p) in prepared.iter().enumerate() {
        assert_eq!(p.step, i as u64);
        assert_eq!(p.batch, expected[i]);
        assert_eq!(p.features.len(), 6);
        assert_eq!(p.features.label, p.batch.labels());
    }
}

#[tokio::test]
async fn test_prefetch_point_features_are_paired() {
    let rows = (0..4)
        .map(|i| PointRow {
            query: format!("query {i}"),
            sample: format!("sample {i}"),
            label: i % 2,
        })
        .collect();
    let sampler = BatchSampler::from_point_rows(SamplerConfig::new(MatchMode::Point, 4), rows).unwrap();

    let mut prefetcher = Prefetcher::spawn(sampler, Arc::new(HashingTokenizer::default()), pipeline_config(2));
    let first = prefetcher.next().await.unwrap().unwrap();
    assert!(first.features.is_paired());
    assert_eq!(first.features.len(), 2);
    assert_eq!(first.batch.len(), 4);
}

#[tokio::test]
async fn test_prefetch_surfaces_tokenizer_errors() {
    let mut prefetcher = Prefetcher::spawn(class_sampler(1), Arc::new(FailingTokenizer), pipeline_config(1));
    let err = prefetcher.take(1).await.unwrap_err();
    assert!(matches!(err, PipelineError::Tokenize(_)));
}

#[test]
fn test_default_workers_nonzero() {
    let config = PipelineConfig::default();
    assert!(config.workers >= 1);
    assert_eq!(config.maxlen, crate::constants::DEFAULT_MAXLEN);
}
