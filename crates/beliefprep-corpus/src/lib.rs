//! # Beliefprep Corpus
//!
//! Tooling around the core pipeline: converting the raw MultiWOZ release into
//! processed splits plus an ontology source, and tensorizing a processed split.

pub mod corpus;
pub mod preprocess;
pub mod tensorize;

pub use corpus::{CorpusSplit, RawCorpus, RawDialogue, RawLogEntry, read_file_list};
pub use preprocess::{PreprocessOptions, PreprocessSummary, canonicalize};
pub use tensorize::{TensorizeOptions, TensorizeSummary};
