//! Tokenization and feature batches.
//!
//! Text preprocessing proper belongs to the model side; this module only turns batch texts into
//! the padded id rows and lengths the encoder's placeholders expect.

pub mod error;
pub mod features;
pub mod hf;

pub use error::TokenizeError;
pub use features::{
    FEATURE_LABEL, FEATURE_X_QUERY, FEATURE_X_QUERY_LENGTH, FEATURE_X_SAMPLE,
    FEATURE_X_SAMPLE_LENGTH, FeatureBatch,
};
pub use hf::HfTokenizer;

use crate::hashing::hash_token;

pub const DEFAULT_HASH_VOCAB: u32 = 1 << 20;

/// Text to token ids.
pub trait Tokenize: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizeError>;
}

/// Splitting rule for [`HashingTokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// Whitespace-separated words.
    #[default]
    Word,
    /// Individual characters (whitespace dropped); suits unsegmented scripts.
    Char,
}

/// Vocabulary-free tokenizer: lower-cases, splits, and hashes each piece into a fixed id range.
#[derive(Debug, Clone)]
pub struct HashingTokenizer {
    granularity: Granularity,
    vocab_size: u32,
}

impl Default for HashingTokenizer {
    fn default() -> Self {
        Self {
            granularity: Granularity::Word,
            vocab_size: DEFAULT_HASH_VOCAB,
        }
    }
}

impl HashingTokenizer {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            ..Default::default()
        }
    }

    pub fn with_vocab_size(mut self, vocab_size: u32) -> Self {
        self.vocab_size = vocab_size.max(2);
        self
    }
}

impl Tokenize for HashingTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizeError> {
        let lowered = text.to_lowercase();
        let ids = match self.granularity {
            Granularity::Word => lowered
                .split_whitespace()
                .map(|w| hash_token(w, self.vocab_size))
                .collect(),
            Granularity::Char => {
                let mut buf = [0u8; 4];
                lowered
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| hash_token(c.encode_utf8(&mut buf), self.vocab_size))
                    .collect()
            }
        };
        Ok(ids)
    }
}
