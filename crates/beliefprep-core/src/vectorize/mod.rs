//! # Text Vectorizer
//!
//! Turns utterances into sequences of word vectors.

pub mod tokenizer;

pub use tokenizer::UtteranceTokenizer;

use crate::embedding::{EmbeddingStore, sum_rows};
use crate::error::Result;

/// One row per token, each `D` wide.
pub type VectorSequence = Vec<Vec<f32>>;

/// Tokenizes text and maps every token to a vector from the store.
#[derive(Debug, Clone)]
pub struct TextVectorizer {
    tokenizer: UtteranceTokenizer,
}

impl TextVectorizer {
    /// Creates a vectorizer with a fresh tokenizer.
    pub fn new() -> Result<Self> {
        Ok(Self {
            tokenizer: UtteranceTokenizer::new()?,
        })
    }

    /// The tokenizer used for every utterance.
    pub fn tokenizer(&self) -> &UtteranceTokenizer {
        &self.tokenizer
    }

    /// Vectorizes `text`; unknown words are synthesized into `store`.
    ///
    /// Text without any word tokens yields an empty sequence.
    pub fn vectorize(&self, text: &str, store: &mut EmbeddingStore) -> VectorSequence {
        self.tokenizer
            .tokenize(text)
            .iter()
            .map(|token| store.lookup_or_synthesize(token))
            .collect()
    }

    /// Sum of the word vectors of `text`, used for domain, slot and value names.
    pub fn aggregate(&self, text: &str, store: &mut EmbeddingStore) -> Vec<f32> {
        let rows = self.vectorize(text, store);
        sum_rows(&rows, store.dimension())
    }
}
