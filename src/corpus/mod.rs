//! Labeled text corpus (tab-separated, header row).
//!
//! Exactly two layouts are accepted:
//!
//! - `text \t target`: class labels are arbitrary identifiers. Each label should have at least two
//!   rows for metric learning to be meaningful; that is left to the caller.
//! - `text_a \t text_b \t target`: `target` must be `0` or `1`.
//!
//! Short rows and rows with empty text are skipped and logged. A header matching neither layout or
//! a non-binary three-column target fails the whole load.

pub mod error;
pub mod types;


pub use error::FormatError;
pub use types::{
    ClassExample, ClassGroup, CorpusShape, LabelVocab, LabeledText, PairTriple, PointRow, TextPair,
};

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{ConfigError, MatchMode};

const COL_TEXT: &str = "text";
const COL_TEXT_A: &str = "text_a";
const COL_TEXT_B: &str = "text_b";
const COL_TARGET: &str = "target";

/// A loaded corpus in one of the two accepted shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Corpus {
    Labeled(Vec<LabeledText>),
    Paired(Vec<TextPair>),
}

enum Columns {
    Two { text: usize, target: usize },
    Three { text_a: usize, text_b: usize, target: usize },
}

/// Reads a corpus file and reports which shape it has.
pub fn load(path: impl AsRef<Path>) -> Result<Corpus, FormatError> {
    let path = path.as_ref();
    let io_err = |e: csv::Error| FormatError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(io_err)?;

    let headers = reader.headers().map_err(io_err)?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let columns = match (
        position(COL_TEXT),
        position(COL_TEXT_A),
        position(COL_TEXT_B),
        position(COL_TARGET),
    ) {
        (Some(text), _, _, Some(target)) => Columns::Two { text, target },
        (None, Some(text_a), Some(text_b), Some(target)) => Columns::Three {
            text_a,
            text_b,
            target,
        },
        _ => {
            return Err(FormatError::UnrecognizedHeader {
                path: path.to_path_buf(),
                header: headers.iter().collect::<Vec<_>>().join(", "),
            });
        }
    };

    let mut labeled = Vec::new();
    let mut paired = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(io_err(e)),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable corpus row");
                skipped += 1;
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |idx: usize| record.get(idx).map(str::trim);

        match columns {
            Columns::Two { text, target } => match (field(text), field(target)) {
                (Some(t), Some(l)) if !t.is_empty() && !l.is_empty() => {
                    labeled.push(LabeledText {
                        text: t.to_string(),
                        label: l.to_string(),
                    });
                }
                _ => {
                    warn!(line, "Skipping short or empty corpus row");
                    skipped += 1;
                }
            },
            Columns::Three {
                text_a,
                text_b,
                target,
            } => match (field(text_a), field(text_b), field(target)) {
                (Some(a), Some(b), Some(l)) if !a.is_empty() && !b.is_empty() => {
                    paired.push(TextPair {
                        text_a: a.to_string(),
                        text_b: b.to_string(),
                        label: parse_binary_target(l, line)?,
                    });
                }
                _ => {
                    warn!(line, "Skipping short or empty corpus row");
                    skipped += 1;
                }
            },
        }
    }

    let corpus = match columns {
        Columns::Two { .. } => Corpus::Labeled(labeled),
        Columns::Three { .. } => Corpus::Paired(paired),
    };

    if corpus.is_empty() {
        return Err(FormatError::Empty {
            path: path.to_path_buf(),
        });
    }

    info!(
        path = %path.display(),
        shape = %corpus.shape(),
        rows = corpus.len(),
        skipped,
        "Corpus loaded"
    );

    Ok(corpus)
}

fn parse_binary_target(value: &str, line: u64) -> Result<u32, FormatError> {
    match value.parse::<f64>() {
        Ok(v) if v == 0.0 => Ok(0),
        Ok(v) if v == 1.0 => Ok(1),
        _ => Err(FormatError::NonBinaryTarget {
            line,
            value: value.to_string(),
        }),
    }
}

impl Corpus {
    pub fn shape(&self) -> CorpusShape {
        match self {
            Corpus::Labeled(_) => CorpusShape::TwoColumn,
            Corpus::Paired(_) => CorpusShape::ThreeColumn,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Corpus::Labeled(rows) => rows.len(),
            Corpus::Paired(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Class mode reads two-column corpora; pair and point modes read three-column ones.
    pub fn check_mode(&self, mode: MatchMode) -> Result<(), ConfigError> {
        let compatible = matches!(
            (mode, self.shape()),
            (MatchMode::Class, CorpusShape::TwoColumn)
                | (MatchMode::Pair | MatchMode::Point, CorpusShape::ThreeColumn)
        );
        if compatible {
            Ok(())
        } else {
            Err(ConfigError::CorpusShapeMismatch {
                mode,
                shape: self.shape().to_string(),
            })
        }
    }

    /// Label vocabulary in first-seen order.
    pub fn vocab(&self) -> LabelVocab {
        match self {
            Corpus::Labeled(rows) => LabelVocab::from_labels(rows.iter().map(|r| r.label.as_str())),
            Corpus::Paired(_) => LabelVocab::from_labels(["0", "1"]),
        }
    }

    /// Number of distinct labels.
    pub fn num_class(&self) -> usize {
        self.vocab().len()
    }

    /// Groups texts by label, ordered by class id.
    pub fn class_groups(&self) -> Result<Vec<ClassGroup>, ConfigError> {
        self.check_mode(MatchMode::Class)?;
        let Corpus::Labeled(rows) = self else {
            return Ok(Vec::new());
        };

        let mut vocab = LabelVocab::new();
        let mut groups: Vec<ClassGroup> = Vec::new();
        for row in rows {
            let class_id = vocab.insert(&row.label);
            if class_id as usize == groups.len() {
                groups.push(ClassGroup {
                    class_id,
                    label: row.label.clone(),
                    texts: Vec::new(),
                });
            }
            groups[class_id as usize].texts.push(row.text.clone());
        }

        debug!(num_class = groups.len(), "Built class groups");
        Ok(groups)
    }

    /// Derives `(query, positive, negative)` triples.
    ///
    /// Rows are grouped by `text_a` in first-seen order; within a query every positive sample is
    /// crossed with every negative sample. Queries lacking either side produce nothing.
    pub fn pair_triples(&self) -> Result<Vec<PairTriple>, ConfigError> {
        self.check_mode(MatchMode::Pair)?;
        let Corpus::Paired(rows) = self else {
            return Ok(Vec::new());
        };

        let mut order: Vec<&str> = Vec::new();
        let mut sides: std::collections::HashMap<&str, (Vec<&str>, Vec<&str>)> =
            std::collections::HashMap::new();
        for row in rows {
            let entry = sides.entry(row.text_a.as_str()).or_insert_with(|| {
                order.push(row.text_a.as_str());
                (Vec::new(), Vec::new())
            });
            if row.label == 1 {
                entry.0.push(row.text_b.as_str());
            } else {
                entry.1.push(row.text_b.as_str());
            }
        }

        let mut triples = Vec::new();
        for query in order {
            let (positives, negatives) = &sides[&query];
            for positive in positives {
                for negative in negatives {
                    triples.push(PairTriple {
                        query: query.to_string(),
                        positive: positive.to_string(),
                        negative: negative.to_string(),
                    });
                }
            }
        }

        debug!(triples = triples.len(), "Built pair triples");
        Ok(triples)
    }

    /// Three-column rows as `(query, sample, label)`.
    pub fn point_rows(&self) -> Result<Vec<PointRow>, ConfigError> {
        self.check_mode(MatchMode::Point)?;
        let Corpus::Paired(rows) = self else {
            return Ok(Vec::new());
        };

        Ok(rows
            .iter()
            .map(|row| PointRow {
                query: row.text_a.clone(),
                sample: row.text_b.clone(),
                label: row.label,
            })
            .collect())
    }
}
