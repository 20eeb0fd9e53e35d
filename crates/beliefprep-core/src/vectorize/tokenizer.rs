//! # Utterance Tokenizer
//!
//! Splits user and system utterances into the word tokens that are looked up
//! in the embedding store.

use regex::Regex;

use crate::error::Result;

/// Characters stripped from inside a token after splitting.
const TOKEN_STRIP: &[char] = &['\'', '!'];

/// Tokenizer for dialogue utterances.
#[derive(Debug, Clone)]
pub struct UtteranceTokenizer {
    re_dropped: Regex,
    re_separator: Regex,
}

impl UtteranceTokenizer {
    /// Constructs a tokenizer with pre-compiled patterns.
    ///
    /// # Errors
    ///
    /// Returns `PrepError::Regex` if a pattern fails to compile
    /// (should never happen with the static patterns defined here).
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_dropped: Regex::new(r#"[()"\t\n\r]"#)?,
            re_separator: Regex::new(r"[,.?:\-]")?,
        })
    }

    /// Tokenize an utterance into lowercase words.
    ///
    /// # Examples
    /// ```
    /// use beliefprep_core::vectorize::UtteranceTokenizer;
    ///
    /// let tokenizer = UtteranceTokenizer::new().unwrap();
    /// let tokens = tokenizer.tokenize("I'd like a cheap hotel, please!");
    /// assert_eq!(tokens, vec!["id", "like", "a", "cheap", "hotel", "please"]);
    /// ```
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = self.re_dropped.replace_all(text, "");
        let text = text.replace(['\u{2019}', '\u{2018}'], "'").to_lowercase();
        let text = self.re_separator.replace_all(&text, " ");
        let text = text.replace('/', " / ");

        text.split_whitespace()
            .map(|word| word.replace(TOKEN_STRIP, ""))
            .filter(|word| !word.is_empty())
            .collect()
    }
}
