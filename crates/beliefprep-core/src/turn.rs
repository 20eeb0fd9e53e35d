//! # Turn Processor
//!
//! Converts one dialogue turn into utterance vectors and multi-hot label
//! vectors over the ontology.

use crate::embedding::EmbeddingStore;
use crate::error::Result;
use crate::ontology::{Ontology, PLACE, is_location_slot, split_booking};
use crate::types::Turn;
use crate::vectorize::{TextVectorizer, VectorSequence};

/// Annotated values that are never turned into labels.
const IGNORED_VALUES: &[&str] = &["", "corsican"];

/// Vectors and labels for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTurn {
    /// Word vectors of the user utterance.
    pub user: VectorSequence,
    /// Word vectors of the system reply that follows the user utterance.
    pub system: VectorSequence,
    /// `1.0` at every label the belief state sets.
    pub labels: Vec<f32>,
    /// `1.0` at every label of each domain the belief state mentions.
    pub domain_labels: Vec<f32>,
}

impl ProcessedTurn {
    /// Whether any label is set.
    pub fn has_label(&self) -> bool {
        self.labels.iter().any(|&x| x > 0.0)
    }
}

/// Residual annotation typos that survive normalization.
fn correct_value(slot: &str, value: &str) -> String {
    if is_location_slot(slot) {
        return PLACE.to_string();
    }
    match value {
        "09;45" => "09:45".to_string(),
        "east side" => "east".to_string(),
        " expensive" => "expensive".to_string(),
        v if v.contains("alpha-milton") => v.replace("alpha-milton", "alpha milton"),
        v => v.to_string(),
    }
}

/// Vectorizes turns against a fixed ontology.
pub struct TurnProcessor<'a> {
    ontology: &'a Ontology,
    domains: &'a [String],
    vectorizer: &'a TextVectorizer,
}

impl<'a> TurnProcessor<'a> {
    pub fn new(ontology: &'a Ontology, domains: &'a [String], vectorizer: &'a TextVectorizer) -> Self {
        Self {
            ontology,
            domains,
            vectorizer,
        }
    }

    /// The ontology labels are indexed against.
    pub fn ontology(&self) -> &Ontology {
        self.ontology
    }

    /// Processes one turn; unknown words are synthesized into `store`.
    ///
    /// # Errors
    ///
    /// Returns `PrepError::UnknownLabel` when the belief state holds a value
    /// the ontology does not know.
    pub fn process(&self, turn: &Turn, store: &mut EmbeddingStore) -> Result<ProcessedTurn> {
        let user = self.vectorizer.vectorize(&turn.user.text, store);
        let system = self.vectorizer.vectorize(&turn.system, store);

        let mut labels = vec![0.0f32; self.ontology.len()];
        let mut domain_labels = vec![0.0f32; self.ontology.len()];

        for (domain, state) in &turn.user.belief_state {
            if !self.domains.iter().any(|d| d == domain) {
                continue;
            }

            let mut mentioned = false;
            for (slot, value) in &state.semi {
                if slot == "name" {
                    continue;
                }

                let (slot, value) = match split_booking(slot) {
                    Some((book, qualifier)) => (book, qualifier),
                    None => (slot.as_str(), value.as_str()),
                };
                if IGNORED_VALUES.iter().any(|v| *v == value) {
                    continue;
                }

                let value = correct_value(slot, value);
                let idx = self.ontology.label_index(domain, slot, &value)?;
                labels[idx] = 1.0;
                mentioned = true;
            }

            if mentioned {
                for idx in self.ontology.domain_indices(domain) {
                    domain_labels[idx] = 1.0;
                }
            }
        }

        Ok(ProcessedTurn {
            user,
            system,
            labels,
            domain_labels,
        })
    }
}
