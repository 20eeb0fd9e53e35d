use std::collections::HashMap;

use tracing::{debug, info};

use super::{Ontology, OntologyEntry, PLACE, is_location_slot, split_booking};
use crate::embedding::EmbeddingStore;
use crate::error::{PrepError, Result};
use crate::types::SlotValueSet;
use crate::vectorize::TextVectorizer;

/// Builds the label space from an ontology source.
///
/// Only allowlisted domains are kept and `name` slots are skipped. Booking
/// slots contribute a single `book`/qualifier label each, and every
/// departure or destination collapses into `place`.
pub struct OntologyBuilder<'a> {
    domains: &'a [String],
    vectorizer: &'a TextVectorizer,
}

impl<'a> OntologyBuilder<'a> {
    /// Creates a builder for the given domain allowlist.
    pub fn new(domains: &'a [String], vectorizer: &'a TextVectorizer) -> Self {
        Self {
            domains,
            vectorizer,
        }
    }

    /// Builds the ontology, inserting name vectors into `store`.
    ///
    /// # Errors
    ///
    /// Returns `PrepError::MalformedOntologyKey` for a key without a
    /// `domain-slot` separator.
    pub fn build(&self, source: &SlotValueSet, store: &mut EmbeddingStore) -> Result<Ontology> {
        let dimension = store.dimension();
        let mut ontology = Ontology {
            entries: Vec::new(),
            index: HashMap::new(),
            features: Vec::new(),
            feature_width: 3 * dimension,
            value_counts: Vec::new(),
            slots: Vec::new(),
            booking_values: Vec::new(),
        };

        for (key, source_values) in source.iter() {
            let (domain, slot) = key
                .split_once('-')
                .ok_or_else(|| PrepError::MalformedOntologyKey(key.to_string()))?;

            if !self.domains.iter().any(|d| d == domain) || slot == "name" {
                continue;
            }

            let (slot, values): (&str, Vec<String>) = if let Some((book, qualifier)) =
                split_booking(slot)
            {
                ontology
                    .booking_values
                    .push((format!("{domain}-{qualifier}"), source_values.to_vec()));
                (book, vec![qualifier.to_string()])
            } else if is_location_slot(slot) {
                (slot, vec![PLACE.to_string()])
            } else {
                (slot, source_values.to_vec())
            };

            let domain_vec = self.name_vector(domain, store);
            let slot_vec = self.name_vector(slot, store);

            let slot_name = format!("{domain}-{slot}");
            if !ontology.slots.contains(&slot_name) {
                ontology.slots.push(slot_name);
            }
            ontology.value_counts.push(values.len());

            for value in values {
                let value_vec = self.name_vector(&value, store);

                ontology.features.extend_from_slice(&domain_vec);
                ontology.features.extend_from_slice(&slot_vec);
                ontology.features.extend_from_slice(&value_vec);

                let position = ontology.entries.len();
                ontology
                    .index
                    .entry((domain.to_string(), slot.to_string(), value.clone()))
                    .or_insert(position);
                ontology.entries.push(OntologyEntry::new(domain, slot, value));
            }
        }

        info!(values = ontology.len(), "ontology loaded");
        debug!(slots = %ontology.slots.join(", "), "ontology slots");
        Ok(ontology)
    }

    /// Sum of the word vectors of `name`; stored under the space-stripped
    /// name when the name itself has no vector.
    fn name_vector(&self, name: &str, store: &mut EmbeddingStore) -> Vec<f32> {
        let vector = self.vectorizer.aggregate(name, store);
        if !store.contains(name) {
            store.insert_if_absent(name.replace(' ', ""), vector.clone());
        }
        vector
    }
}
