//! # Beliefprep
//!
//! MultiWOZ data preparation for belief tracking. Re-exports the core
//! pipeline and the corpus tooling under one crate.
//!
//! ```rust
//! use beliefprep::pipeline::normalize::clean;
//!
//! let (slot, value) = clean("hotel", "pricerange", "inexpensive");
//! assert_eq!((slot.as_str(), value.as_str()), ("price range", "cheap"));
//! ```

pub use beliefprep_core as pipeline;
pub use beliefprep_corpus as corpus;

pub use beliefprep_core::{
    DialogueBatch, DialogueLoader, EmbeddingStore, Ontology, OntologyBuilder, PaddedDialogue,
    PipelineConfig, PrepError, ProcessedDialogue, ProcessedTurn, Result, SlotValueSet,
    TextVectorizer, TurnProcessor, ValueNormalizer,
};
