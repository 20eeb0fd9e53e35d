//! # Beliefprep Core
//!
//! Data preparation for multi-domain dialogue state tracking. Provides the
//! word-embedding store, belief-state value normalization, the ontology
//! label space, utterance vectorization and padded dialogue tensors.
//!
//! ## Quick Start
//!
//! ```rust
//! use beliefprep_core::normalize::clean;
//! use beliefprep_core::vectorize::TextVectorizer;
//! use beliefprep_core::EmbeddingStore;
//!
//! assert_eq!(
//!     clean("taxi", "arriveBy", "1530"),
//!     ("arrive by".to_string(), "15:30".to_string())
//! );
//!
//! let vectorizer = TextVectorizer::new().unwrap();
//! let mut store = EmbeddingStore::new(8);
//! let vectors = vectorizer.vectorize("I'd like a cheap hotel.", &mut store);
//! assert_eq!(vectors.len(), 5);
//! assert!(vectors.iter().all(|v| v.len() == 8));
//! ```
pub mod config;
pub mod dialogue;
pub mod embedding;
pub mod error;
pub mod normalize;
pub mod ontology;
pub mod turn;
pub mod types;
pub mod vectorize;

// Re-export primary API
pub use config::PipelineConfig;
pub use dialogue::{DialogueBatch, DialogueLoader, PaddedDialogue, ProcessedDialogue, Rejection};
pub use embedding::EmbeddingStore;
pub use error::{PrepError, Result};
pub use normalize::ValueNormalizer;
pub use ontology::{Ontology, OntologyBuilder, OntologyEntry};
pub use turn::{ProcessedTurn, TurnProcessor};
pub use types::{BeliefState, DialogueRecord, DomainState, SlotValueSet, Turn, UserTurn};
pub use vectorize::{TextVectorizer, UtteranceTokenizer, VectorSequence};
