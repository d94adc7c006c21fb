use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One row of a `text, target` corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledText {
    pub text: String,
    pub label: String,
}

/// One row of a `text_a, text_b, target` corpus; `label` is 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPair {
    pub text_a: String,
    pub text_b: String,
    pub label: u32,
}

/// Which of the two accepted column layouts a corpus was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorpusShape {
    /// `text, target`
    TwoColumn,
    /// `text_a, text_b, target`
    ThreeColumn,
}

impl fmt::Display for CorpusShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusShape::TwoColumn => f.write_str("text/target"),
            CorpusShape::ThreeColumn => f.write_str("text_a/text_b/target"),
        }
    }
}

/// Texts sharing one label. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassGroup {
    pub class_id: u32,
    pub label: String,
    pub texts: Vec<String>,
}

/// A single labeled text drawn from a class stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassExample {
    pub text: String,
    pub label: u32,
}

/// Pair-mode unit: laid out as `(query, positive, query, negative)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairTriple {
    pub query: String,
    pub positive: String,
    pub negative: String,
}

/// Point-mode unit: laid out as `(query, sample)` with an explicit binary label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRow {
    pub query: String,
    pub sample: String,
    pub label: u32,
}

/// Dense class ids assigned to string labels in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelVocab {
    labels: Vec<String>,
    index: HashMap<String, u32>,
}

impl LabelVocab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut vocab = Self::new();
        for label in labels {
            vocab.insert(label);
        }
        vocab
    }

    /// Returns the id for `label`, assigning the next free id if unseen.
    pub fn insert(&mut self, label: &str) -> u32 {
        if let Some(&id) = self.index.get(label) {
            return id;
        }
        let id = self.labels.len() as u32;
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), id);
        id
    }

    pub fn id(&self, label: &str) -> Option<u32> {
        self.index.get(label).copied()
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.labels.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
