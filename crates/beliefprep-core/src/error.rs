use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while preparing belief-tracking data.
#[derive(Debug, Error)]
pub enum PrepError {
    /// A file could not be opened or read.
    #[error("failed to read {path:?}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Reading from an already open stream failed.
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),

    /// A JSON document did not have the expected shape.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A line of the word-vector file is malformed.
    #[error("word vectors, line {line}: {message}")]
    Format {
        /// 1-based line number in the vector file.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// An ontology key is not of the form `domain-slot`.
    #[error("malformed ontology key: {0:?}")]
    MalformedOntologyKey(String),

    /// A belief-state value has no entry in the ontology.
    #[error("no ontology entry for {domain}-{slot}-{value}")]
    UnknownLabel {
        /// Domain of the annotation.
        domain: String,
        /// Slot of the annotation (after booking split).
        slot: String,
        /// Value of the annotation (after turn-time corrections).
        value: String,
    },

    /// The pipeline configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    Regex(#[from] regex::Error),

    /// Candle tensor construction failed.
    #[error("tensor error: {0}")]
    Tensor(String),
}

impl PrepError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<candle_core::Error> for PrepError {
    fn from(err: candle_core::Error) -> Self {
        Self::Tensor(err.to_string())
    }
}

/// Result type alias for data preparation.
pub type Result<T> = std::result::Result<T, PrepError>;
