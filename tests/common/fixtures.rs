//! Corpus files and record builders shared by integration tests.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use sieve::{EvaluationRecord, hash_to_u64};

/// One distinctive word per class; texts within a class share most of their tokens.
pub const CLASS_WORDS: [&str; 6] = ["billing", "shipping", "account", "refund", "warranty", "login"];

/// `text \t target` corpus: `per_class` rows for each of [`CLASS_WORDS`], offset by `start`.
pub fn class_corpus_text(per_class: usize, start: usize) -> String {
    let mut out = String::from("text\ttarget\n");
    for i in start..start + per_class {
        for word in CLASS_WORDS {
            let _ = writeln!(out, "{word} {word}-topic {word}-help {word}{i}\t{word}");
        }
    }
    out
}

/// `text_a \t text_b \t target` corpus with two positives and two negatives per query.
pub fn pair_corpus_text(queries: usize) -> String {
    let mut out = String::from("text_a\ttext_b\ttarget\n");
    for q in 0..queries {
        let _ = writeln!(out, "question {q} about topic{q}\tanswer about topic{q}\t1");
        let _ = writeln!(out, "question {q} about topic{q}\tmore on topic{q}\t1");
        let _ = writeln!(out, "question {q} about topic{q}\tunrelated text {q}\t0");
        let _ = writeln!(out, "question {q} about topic{q}\tsomething else\t0");
    }
    out
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

/// Deterministic pseudo-random vector in `[-1, 1)`.
pub fn deterministic_vector(seed: u64, dim: usize) -> Vec<f32> {
    (0..dim)
        .map(|i| {
            let h = hash_to_u64(&[seed.to_le_bytes(), (i as u64).to_le_bytes()].concat());
            (h % 2000) as f32 / 1000.0 - 1.0
        })
        .collect()
}

pub fn score_records(scores: &[f32], labels: &[u32]) -> Vec<EvaluationRecord> {
    scores
        .iter()
        .zip(labels)
        .map(|(&s, &l)| EvaluationRecord::score(s, l))
        .collect()
}
