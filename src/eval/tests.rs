use super::*;

fn config(mode: MatchMode) -> EvalConfig {
    EvalConfig {
        mode,
        ..Default::default()
    }
}

fn scored(scores: &[f32], labels: &[u32]) -> Vec<EvaluationRecord> {
    scores
        .iter()
        .zip(labels)
        .map(|(&s, &l)| EvaluationRecord::score(s, l))
        .collect()
}

#[test]
fn test_class_identical_query_matches_reference() {
    let references = vec![
        EvaluationRecord::vector(vec![1.0, 0.0], 0),
        EvaluationRecord::vector(vec![0.0, 1.0], 1),
    ];
    let queries = vec![EvaluationRecord::vector(vec![1.0, 0.0], 0)];

    let evaluator = Evaluator::new(EvalConfig {
        score_thre: 0.9,
        ..config(MatchMode::Class)
    });
    let metrics = evaluator.evaluate_class(&queries, &references).unwrap();

    assert_eq!(metrics.acc, 1.0);
    assert_eq!(metrics.thre_acc, 1.0);
    assert_eq!(metrics.total, 1);
}

#[test]
fn test_class_threshold_counts_only_confident_hits() {
    let references = vec![
        EvaluationRecord::vector(vec![1.0, 0.0], 0),
        EvaluationRecord::vector(vec![0.0, 1.0], 1),
    ];
    let queries = vec![
        // correct, cosine ~0.707
        EvaluationRecord::vector(vec![1.0, 0.9], 0),
        // wrong label, perfect similarity
        EvaluationRecord::vector(vec![0.0, 1.0], 0),
        EvaluationRecord::vector(vec![0.1, 1.0], 1),
    ];

    let evaluator = Evaluator::new(EvalConfig {
        score_thre: 0.9,
        ..config(MatchMode::Class)
    });
    let metrics = evaluator.evaluate_class(&queries, &references).unwrap();

    assert!((metrics.acc - 2.0 / 3.0).abs() < 1e-6);
    assert!((metrics.thre_acc - 1.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_class_distance_mode_uses_one_minus_distance() {
    let references = vec![
        EvaluationRecord::vector(vec![0.0, 0.0], 0),
        EvaluationRecord::vector(vec![5.0, 5.0], 1),
    ];
    let queries = vec![
        EvaluationRecord::vector(vec![0.05, 0.0], 0),
        EvaluationRecord::vector(vec![5.0, 4.0], 1),
    ];

    let evaluator = Evaluator::new(EvalConfig {
        is_distance: true,
        score_thre: 0.5,
        ..config(MatchMode::Class)
    });
    let metrics = evaluator.evaluate_class(&queries, &references).unwrap();

    assert_eq!(metrics.acc, 1.0);
    // second query is 1.0 away: confidence 0.0
    assert_eq!(metrics.thre_acc, 0.5);
}

#[test]
fn test_class_ties_pick_first_reference() {
    let references = vec![
        EvaluationRecord::vector(vec![1.0, 0.0], 7),
        EvaluationRecord::vector(vec![1.0, 0.0], 8),
    ];
    let queries = vec![EvaluationRecord::vector(vec![2.0, 0.0], 7)];

    let metrics = Evaluator::new(config(MatchMode::Class))
        .evaluate_class(&queries, &references)
        .unwrap();
    assert_eq!(metrics.acc, 1.0);
}

#[test]
fn test_class_knn_accuracy() {
    let references = vec![
        EvaluationRecord::vector(vec![1.0, 0.0], 0),
        EvaluationRecord::vector(vec![0.9, 0.1], 1),
        EvaluationRecord::vector(vec![0.8, 0.2], 1),
        EvaluationRecord::vector(vec![0.0, 1.0], 2),
    ];
    let queries = vec![EvaluationRecord::vector(vec![1.0, 0.0], 1)];

    let metrics = Evaluator::new(EvalConfig {
        knn_k: Some(3),
        ..config(MatchMode::Class)
    })
    .evaluate_class(&queries, &references)
    .unwrap();

    // nearest neighbor says 0, the 3-vote says 1
    assert_eq!(metrics.acc, 0.0);
    assert_eq!(metrics.knn_acc, Some(1.0));
}

#[test]
fn test_class_rejects_bad_input() {
    let evaluator = Evaluator::new(config(MatchMode::Class));
    let refs = vec![EvaluationRecord::vector(vec![1.0, 0.0], 0)];

    assert!(matches!(
        evaluator.evaluate_class(&[], &refs).unwrap_err(),
        EvalError::Empty { what: "query" }
    ));
    assert!(matches!(
        evaluator
            .evaluate_class(&[EvaluationRecord::vector(vec![1.0], 0)], &refs)
            .unwrap_err(),
        EvalError::DimensionMismatch {
            list: "query",
            index: 0,
            ..
        }
    ));
    assert!(matches!(
        evaluator
            .evaluate_class(&[EvaluationRecord::score(0.3, 0)], &refs)
            .unwrap_err(),
        EvalError::ValueKind { .. }
    ));
}

#[test]
fn test_pair_literal_scenario() {
    let evaluator = Evaluator::new(EvalConfig {
        num_class: 2,
        dev_size: 1,
        ..config(MatchMode::Pair)
    });
    let records = scored(&[0.8, 0.3, 0.2, 0.9], &[1, 0, 0, 1]);

    let metrics = evaluator.evaluate_pair(&records).unwrap();
    assert_eq!(metrics.acc, 1.0);
    assert_eq!(metrics.groups, 2);
    assert_eq!(metrics.group_size, 2);
}

#[test]
fn test_pair_counts_misses_and_ties() {
    let evaluator = Evaluator::new(EvalConfig {
        num_class: 2,
        dev_size: 1,
        ..config(MatchMode::Pair)
    });
    // second group ties: the first index (a negative) wins
    let records = scored(&[0.1, 0.9, 0.5, 0.5], &[1, 0, 0, 1]);

    let metrics = evaluator.evaluate_pair(&records).unwrap();
    assert_eq!(metrics.acc, 0.0);
}

#[test]
fn test_pair_shape_error() {
    let evaluator = Evaluator::new(EvalConfig {
        num_class: 2,
        dev_size: 1,
        ..config(MatchMode::Pair)
    });
    let records = scored(&[0.8, 0.3, 0.2], &[1, 0, 0]);
    assert!(matches!(
        evaluator.evaluate_pair(&records).unwrap_err(),
        EvalError::Shape { len: 3, groups: 2 }
    ));

    let zero = Evaluator::new(config(MatchMode::Pair));
    assert!(matches!(
        zero.evaluate_pair(&scored(&[0.5], &[1])).unwrap_err(),
        EvalError::Shape { groups: 0, .. }
    ));
}

#[test]
fn test_point_literal_scenario() {
    let evaluator = Evaluator::new(EvalConfig {
        score_thre: 0.5,
        ..config(MatchMode::Point)
    });
    let records = scored(&[0.95, 0.4, 0.6], &[1, 0, 0]);

    let metrics = evaluator.evaluate_point(&records).unwrap();
    assert_eq!(metrics.true_positives, 1);
    assert_eq!(metrics.false_positives, 1);
    assert_eq!(metrics.false_negatives, 0);
    assert_eq!(metrics.true_negatives, 1);
    assert_eq!(metrics.precision, 0.5);
    assert_eq!(metrics.recall, 1.0);
    assert!((metrics.f1 - 0.667).abs() < 1e-3);
}

#[test]
fn test_point_threshold_is_inclusive_and_zero_safe() {
    let evaluator = Evaluator::new(config(MatchMode::Point));

    let metrics = evaluator.evaluate_point(&scored(&[0.5], &[1])).unwrap();
    assert_eq!(metrics.true_positives, 1);

    let metrics = evaluator.evaluate_point(&scored(&[0.1, 0.2], &[0, 0])).unwrap();
    assert_eq!(metrics.precision, 0.0);
    assert_eq!(metrics.recall, 0.0);
    assert_eq!(metrics.f1, 0.0);
}

#[test]
fn test_knn_k1_matches_nearest_neighbor() {
    let queries: Vec<Vec<f32>> = vec![vec![1.0, 0.2], vec![-0.3, 1.0], vec![0.5, 0.5], vec![0.0, 0.0]];
    let refs: Vec<Vec<f32>> = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7], vec![0.7, 0.7]];
    let labels = [3, 1, 4, 1];

    for metric in [Metric::Cosine, Metric::Euclidean] {
        let matrix = ScoreMatrix::pairwise(&queries, &refs, metric);
        let nearest: Vec<Option<u32>> = matrix
            .best_matches()
            .into_iter()
            .map(|b| b.map(|i| labels[i]))
            .collect();
        assert_eq!(knn_vote(&matrix, &labels, 1), nearest);
    }
}

#[test]
fn test_knn_tie_goes_to_first_tallied_label() {
    let matrix = ScoreMatrix::from_raw(1, 4, vec![0.9, 0.8, 0.7, 0.6], Metric::Cosine).unwrap();
    assert_eq!(knn_vote(&matrix, &[5, 6, 6, 5], 4), vec![Some(5)]);
    assert_eq!(knn_vote(&matrix, &[6, 5, 5, 6], 4), vec![Some(6)]);
    // k larger than the reference count is clamped
    assert_eq!(knn_vote(&matrix, &[1, 2, 2, 3], 10), vec![Some(2)]);
}

#[test]
fn test_report_display() {
    let class = MetricsReport::Class(ClassMetrics {
        acc: 0.5,
        thre_acc: 0.25,
        knn_acc: None,
        total: 4,
    });
    assert_eq!(class.to_string(), "Acc:0.5\nThreAcc:0.25");

    let point = MetricsReport::Point(PointMetrics::from_counts(1, 1, 0, 1));
    assert_eq!(point.to_string(), format!("precision:0.5 recall:1 f1:{}", point_f1(&point)));
}

fn point_f1(report: &MetricsReport) -> f32 {
    match report {
        MetricsReport::Point(m) => m.f1,
        _ => 0.0,
    }
}

#[test]
fn test_record_json_shape() {
    let record = EvaluationRecord {
        value: ModelValue::Score(0.25),
        predicted: Some(0),
        label: 1,
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json, serde_json::json!({"score": 0.25, "pred": 0, "label": 1}));

    let parsed: EvaluationRecord = serde_json::from_str(r#"{"encode": [1.0, 2.0], "label": 4}"#).unwrap();
    assert_eq!(parsed, EvaluationRecord::vector(vec![1.0, 2.0], 4));
}

#[test]
fn test_dimension_mismatch_names_the_reference_list() {
    let evaluator = Evaluator::new(config(MatchMode::Class));
    let queries = vec![
        EvaluationRecord::vector(vec![1.0, 0.0], 0),
        EvaluationRecord::vector(vec![0.0, 1.0], 1),
    ];
    let refs = vec![
        EvaluationRecord::vector(vec![1.0, 0.0], 0),
        EvaluationRecord::vector(vec![0.0, 1.0, 0.0], 1),
    ];

    let err = evaluator.evaluate_class(&queries, &refs).unwrap_err();
    assert!(matches!(
        err,
        EvalError::DimensionMismatch {
            list: "reference",
            index: 1,
            expected: 2,
            actual: 3
        }
    ));
    assert!(err.to_string().starts_with("reference record 1"));
}
