use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::{ConfigError, Split};
use crate::corpus::{ClassExample, ClassGroup, FormatError, PairTriple, PointRow};

use super::error::RecordError;

/// Directory of JSON-lines record files, grouped by split and (in class mode) by class.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record files belonging to `split`, sorted by name. A missing directory has no files.
    pub fn files(&self, split: Split) -> Result<Vec<PathBuf>, RecordError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let prefix = format!("{}_", split.as_str());
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|e| RecordError::io(&self.root, e))? {
            let entry = entry.map_err(|e| RecordError::io(&self.root, e))?;
            let path = entry.path();
            let is_match = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix));
            if is_match && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn has_split(&self, split: Split) -> Result<bool, RecordError> {
        Ok(!self.files(split)?.is_empty())
    }

    pub fn class_file(&self, split: Split, class_id: u32) -> PathBuf {
        self.root
            .join(format!("{}_class_{:04}.jsonl", split.as_str(), class_id))
    }

    pub fn pair_file(&self, split: Split) -> PathBuf {
        self.root.join(format!("{}_pair.jsonl", split.as_str()))
    }

    pub fn point_file(&self, split: Split) -> PathBuf {
        self.root.join(format!("{}_point.jsonl", split.as_str()))
    }

    /// Writes one file per class group.
    pub fn write_class_split(
        &self,
        split: Split,
        groups: &[ClassGroup],
    ) -> Result<Vec<PathBuf>, RecordError> {
        let mut written = Vec::with_capacity(groups.len());
        for group in groups {
            let path = self.class_file(split, group.class_id);
            let rows = group.texts.iter().map(|text| ClassExample {
                text: text.clone(),
                label: group.class_id,
            });
            write_lines(&path, rows)?;
            written.push(path);
        }
        info!(split = %split, files = written.len(), "Wrote class records");
        Ok(written)
    }

    pub fn write_pair_split(
        &self,
        split: Split,
        triples: &[PairTriple],
    ) -> Result<PathBuf, RecordError> {
        let path = self.pair_file(split);
        write_lines(&path, triples.iter())?;
        info!(split = %split, triples = triples.len(), "Wrote pair records");
        Ok(path)
    }

    pub fn write_point_split(&self, split: Split, rows: &[PointRow]) -> Result<PathBuf, RecordError> {
        let path = self.point_file(split);
        write_lines(&path, rows.iter())?;
        info!(split = %split, rows = rows.len(), "Wrote point records");
        Ok(path)
    }

    /// One stream per class file, ordered by the class id in the file name.
    pub fn load_class_streams(&self, split: Split) -> Result<Vec<Vec<ClassExample>>, RecordError> {
        let mut files: Vec<(u32, PathBuf)> = self
            .files(split)?
            .into_iter()
            .filter(|p| is_kind(p, "class"))
            .map(|p| (class_id_of(&p).unwrap_or(u32::MAX), p))
            .collect();
        files.sort();

        files.iter().map(|(_, p)| read_lines(p)).collect()
    }

    /// Class-mode evaluation split; must hold exactly one file per class.
    pub fn load_class_eval(
        &self,
        split: Split,
        num_class: usize,
    ) -> Result<Vec<ClassExample>, RecordError> {
        let streams = self.load_class_streams(split)?;
        if streams.len() != num_class {
            return Err(ConfigError::RecordCountMismatch {
                split: split.to_string(),
                expected: num_class,
                found: streams.len(),
            }
            .into());
        }
        debug!(split = %split, num_class, "Loaded class evaluation split");
        Ok(streams.into_iter().flatten().collect())
    }

    pub fn load_pair_split(&self, split: Split) -> Result<Vec<PairTriple>, RecordError> {
        let mut triples = Vec::new();
        for path in self.files(split)?.iter().filter(|p| is_kind(p, "pair")) {
            triples.extend(read_lines::<PairTriple>(path)?);
        }
        Ok(triples)
    }

    pub fn load_point_split(&self, split: Split) -> Result<Vec<PointRow>, RecordError> {
        let mut rows = Vec::new();
        for path in self.files(split)?.iter().filter(|p| is_kind(p, "point")) {
            rows.extend(read_lines::<PointRow>(path)?);
        }
        Ok(rows)
    }
}

fn is_kind(path: &Path, kind: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.split('_').nth(1).is_some_and(|k| k.starts_with(kind)))
}

/// `{split}_class_{id}.jsonl` -> `id`.
fn class_id_of(path: &Path) -> Option<u32> {
    path.file_stem()?
        .to_str()?
        .rsplit('_')
        .next()?
        .parse()
        .ok()
}

fn write_lines<T, I>(path: &Path, rows: I) -> Result<(), RecordError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RecordError::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| RecordError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        serde_json::to_writer(&mut writer, &row).map_err(|e| RecordError::io(path, e))?;
        writer
            .write_all(b"\n")
            .map_err(|e| RecordError::io(path, e))?;
    }
    writer.flush().map_err(|e| RecordError::io(path, e))?;
    Ok(())
}

fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, RecordError> {
    let file = File::open(path).map_err(|e| RecordError::io(path, e))?;
    let mut rows = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| RecordError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let row = serde_json::from_str(&line).map_err(|e| FormatError::Record {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}
