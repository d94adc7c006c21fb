use std::path::{Path, PathBuf};

use tracing::info;

use super::Tokenize;
use super::error::TokenizeError;

/// `tokenizer.json` backed tokenizer.
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
    path: PathBuf,
}

impl std::fmt::Debug for HfTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenizer")
            .field("path", &self.path)
            .finish()
    }
}

impl HfTokenizer {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TokenizeError> {
        let path = path.as_ref();
        let inner =
            tokenizers::Tokenizer::from_file(path).map_err(|e| TokenizeError::LoadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!(path = %path.display(), "Tokenizer loaded");

        Ok(Self {
            inner,
            path: path.to_path_buf(),
        })
    }
}

impl Tokenize for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizeError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| TokenizeError::EncodeFailed {
                reason: e.to_string(),
            })?;
        Ok(encoding.get_ids().to_vec())
    }
}
