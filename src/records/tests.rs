use super::*;
use crate::config::ConfigError;
use crate::corpus::{ClassGroup, FormatError, LabeledText, TextPair};

fn labeled_corpus() -> Corpus {
    let rows = [("a1", "A"), ("b1", "B"), ("a2", "A"), ("c1", "C"), ("b2", "B")];
    Corpus::Labeled(
        rows.iter()
            .map(|&(text, label)| LabeledText {
                text: text.into(),
                label: label.into(),
            })
            .collect(),
    )
}

fn paired_corpus() -> Corpus {
    let rows = [("q1", "p1", 1), ("q1", "n1", 0), ("q2", "p2", 1), ("q2", "n2", 0)];
    Corpus::Paired(
        rows.iter()
            .map(|&(a, b, label)| TextPair {
                text_a: a.into(),
                text_b: b.into(),
                label,
            })
            .collect(),
    )
}

#[test]
fn test_missing_root_has_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path().join("absent"));
    assert!(store.files(Split::Train).unwrap().is_empty());
    assert!(!store.has_split(Split::Train).unwrap());
}

#[test]
fn test_class_split_one_file_per_class() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path());
    let preparer = CorpusPreparer::new(labeled_corpus(), MatchMode::Class).unwrap();

    preparer.prepare(&store, Split::Train).unwrap();

    let files = store.files(Split::Train).unwrap();
    assert_eq!(files.len(), 3);
    assert_eq!(files[0], store.class_file(Split::Train, 0));

    let streams = store.load_class_streams(Split::Train).unwrap();
    assert_eq!(streams.len(), 3);
    assert_eq!(streams[0].len(), 2);
    assert_eq!(streams[1][1].text, "b2");
    assert!(streams[2].iter().all(|e| e.label == 2));

    assert!(!store.has_split(Split::Dev).unwrap());
}

#[test]
fn test_class_eval_checks_file_count() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path());
    CorpusPreparer::new(labeled_corpus(), MatchMode::Class)
        .unwrap()
        .prepare(&store, Split::Test)
        .unwrap();

    assert_eq!(store.load_class_eval(Split::Test, 3).unwrap().len(), 5);

    let err = store.load_class_eval(Split::Test, 4).unwrap_err();
    assert!(matches!(
        err,
        RecordError::Config(ConfigError::RecordCountMismatch {
            expected: 4,
            found: 3,
            ..
        })
    ));
}

#[test]
fn test_pair_and_point_splits() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path());

    CorpusPreparer::new(paired_corpus(), MatchMode::Pair)
        .unwrap()
        .prepare(&store, Split::Train)
        .unwrap();
    let triples = store.load_pair_split(Split::Train).unwrap();
    assert_eq!(triples.len(), 2);
    assert_eq!(triples[1].query, "q2");

    CorpusPreparer::new(paired_corpus(), MatchMode::Point)
        .unwrap()
        .prepare(&store, Split::Dev)
        .unwrap();
    let rows = store.load_point_split(Split::Dev).unwrap();
    assert_eq!(rows.len(), 4);
    assert!(store.load_pair_split(Split::Dev).unwrap().is_empty());
}

#[test]
fn test_preparer_rejects_wrong_shape() {
    let err = CorpusPreparer::new(labeled_corpus(), MatchMode::Point).unwrap_err();
    assert!(matches!(
        err,
        RecordError::Config(ConfigError::CorpusShapeMismatch { .. })
    ));
}

#[test]
fn test_corrupt_record_line() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path());
    std::fs::write(store.point_file(Split::Train), "{\"query\":\"q\"}\n").unwrap();

    let err = store.load_point_split(Split::Train).unwrap_err();
    assert!(matches!(
        err,
        RecordError::Format(FormatError::Record { line: 1, .. })
    ));
}

#[test]
fn test_counting_preparer() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path());
    let preparer = CountingPreparer::new(CorpusPreparer::new(paired_corpus(), MatchMode::Point).unwrap());

    preparer.prepare(&store, Split::Train).unwrap();
    assert_eq!(preparer.calls(), 1);
}

#[test]
fn test_class_streams_follow_numeric_class_id() {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path());
    let groups: Vec<ClassGroup> = [10000u32, 1001, 7]
        .iter()
        .map(|&class_id| ClassGroup {
            class_id,
            label: format!("L{class_id}"),
            texts: vec![format!("text {class_id}")],
        })
        .collect();
    store.write_class_split(Split::Train, &groups).unwrap();

    let labels: Vec<u32> = store
        .load_class_streams(Split::Train)
        .unwrap()
        .iter()
        .map(|stream| stream[0].label)
        .collect();
    assert_eq!(labels, vec![7, 1001, 10000]);
}
