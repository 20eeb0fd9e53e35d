//! # Pipeline Configuration
//!
//! Shape parameters shared by the ontology builder, the turn processor and
//! the dialogue loader.

use crate::error::{PrepError, Result};

/// Domains tracked by default, in the order the label space lists them.
pub const DEFAULT_DOMAINS: &[&str] = &["restaurant", "hotel", "attraction", "train", "taxi"];

/// Dimension of the pretrained paragram vectors.
pub const DEFAULT_VECTOR_DIMENSION: usize = 300;

/// Configuration for the vectorization pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Width of every word vector.
    pub vector_dimension: usize,
    /// Longest utterance, in tokens, a dialogue may contain.
    pub max_utterance_length: usize,
    /// Number of turn rows in every padded dialogue.
    pub max_turns: usize,
    /// Domain allowlist.
    pub domains: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vector_dimension: DEFAULT_VECTOR_DIMENSION,
            max_utterance_length: 50,
            max_turns: 22,
            domains: DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the word vector width.
    pub fn with_vector_dimension(mut self, dimension: usize) -> Self {
        self.vector_dimension = dimension;
        self
    }

    /// Set the maximum utterance length in tokens.
    pub fn with_max_utterance_length(mut self, length: usize) -> Self {
        self.max_utterance_length = length;
        self
    }

    /// Set the number of padded turn rows.
    pub fn with_max_turns(mut self, turns: usize) -> Self {
        self.max_turns = turns;
        self
    }

    /// Replace the domain allowlist.
    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `domain` is on the allowlist.
    pub fn tracks(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d == domain)
    }

    /// Checks that every shape parameter is non-zero.
    ///
    /// # Errors
    ///
    /// Returns `PrepError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.vector_dimension == 0 {
            return Err(PrepError::InvalidConfig("vector_dimension must be > 0".into()));
        }
        if self.max_utterance_length == 0 {
            return Err(PrepError::InvalidConfig(
                "max_utterance_length must be > 0".into(),
            ));
        }
        if self.max_turns == 0 {
            return Err(PrepError::InvalidConfig("max_turns must be > 0".into()));
        }
        if self.domains.is_empty() {
            return Err(PrepError::InvalidConfig("domain allowlist is empty".into()));
        }
        Ok(())
    }
}
