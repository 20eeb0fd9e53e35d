//! # Ontology
//!
//! The label space: every tracked `(domain, slot, value)` triple, in a
//! stable order, with a feature row per triple.

pub mod builder;

pub use builder::OntologyBuilder;

use std::collections::HashMap;
use std::fmt;

use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Slot name that booking slots collapse into.
pub const BOOKING_SLOT: &str = "book";

/// Value every departure and destination collapses into.
pub const PLACE: &str = "place";

/// Splits `book day` into `("book", "day")`; other slots yield `None`.
pub fn split_booking(slot: &str) -> Option<(&'static str, &str)> {
    slot.strip_prefix("book ")
        .map(str::trim)
        .filter(|qualifier| !qualifier.is_empty())
        .map(|qualifier| (BOOKING_SLOT, qualifier))
}

/// Whether all values of `slot` share the `place` label.
pub fn is_location_slot(slot: &str) -> bool {
    slot == "departure" || slot == "destination"
}

/// One `(domain, slot, value)` label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OntologyEntry {
    pub domain: String,
    pub slot: String,
    pub value: String,
}

impl OntologyEntry {
    pub fn new(domain: impl Into<String>, slot: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            slot: slot.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for OntologyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.domain, self.slot, self.value)
    }
}

/// The ordered label space plus the auxiliary model inputs derived from it.
#[derive(Debug, Clone)]
pub struct Ontology {
    pub(crate) entries: Vec<OntologyEntry>,
    pub(crate) index: HashMap<(String, String, String), usize>,
    pub(crate) features: Vec<f32>,
    pub(crate) feature_width: usize,
    pub(crate) value_counts: Vec<usize>,
    pub(crate) slots: Vec<String>,
    pub(crate) booking_values: Vec<(String, Vec<String>)>,
}

impl Ontology {
    /// Number of labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the label space is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels in index order.
    pub fn entries(&self) -> &[OntologyEntry] {
        &self.entries
    }

    /// Index of a triple; the first occurrence wins for duplicates.
    pub fn index_of(&self, domain: &str, slot: &str, value: &str) -> Option<usize> {
        self.index
            .get(&(domain.to_string(), slot.to_string(), value.to_string()))
            .copied()
    }

    /// Like [`Ontology::index_of`], but a miss is an error.
    ///
    /// # Errors
    ///
    /// Returns `PrepError::UnknownLabel` when the triple is not in the
    /// ontology, which means the corpus and the ontology disagree.
    pub fn label_index(&self, domain: &str, slot: &str, value: &str) -> Result<usize> {
        self.index_of(domain, slot, value)
            .ok_or_else(|| PrepError::UnknownLabel {
                domain: domain.to_string(),
                slot: slot.to_string(),
                value: value.to_string(),
            })
    }

    /// Indices of every label belonging to `domain`.
    pub fn domain_indices<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, entry)| entry.domain == domain)
            .map(|(idx, _)| idx)
    }

    /// Width of a feature row: domain, slot and value vectors side by side.
    pub fn feature_width(&self) -> usize {
        self.feature_width
    }

    /// `[domain_vec ‖ slot_vec ‖ value_vec]` for label `idx`.
    pub fn feature_row(&self, idx: usize) -> Option<&[f32]> {
        if idx >= self.entries.len() {
            return None;
        }
        let start = idx * self.feature_width;
        Some(&self.features[start..start + self.feature_width])
    }

    /// All feature rows as a `[labels, 3·D]` tensor.
    pub fn feature_tensor(&self, device: &Device) -> Result<Tensor> {
        Ok(Tensor::from_vec(
            self.features.clone(),
            (self.entries.len(), self.feature_width),
            device,
        )?)
    }

    /// Number of values per ontology source key, in source order.
    pub fn value_counts(&self) -> &[usize] {
        &self.value_counts
    }

    /// Distinct `domain-slot` names, in source order.
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// The booked values observed for `domain` and a booking qualifier
    /// such as `day` or `people`.
    pub fn booking_values(&self, domain: &str, qualifier: &str) -> Option<&[String]> {
        let key = format!("{domain}-{qualifier}");
        self.booking_values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Label names in index order, as `domain-slot-value` strings.
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}
