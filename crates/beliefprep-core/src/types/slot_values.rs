use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PrepError, Result};

/// Ordered `"domain-slot"` → observed values mapping.
///
/// This is the ontology source: keys and values keep the order in which they
/// were first seen, because label indices are derived from that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotValueSet {
    entries: Vec<(String, Vec<String>)>,
    positions: HashMap<String, usize>,
}

impl SlotValueSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an ontology source file.
    ///
    /// # Errors
    ///
    /// Returns `PrepError::Io` if the file cannot be opened and
    /// `PrepError::Json` if it is not an object of string arrays.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PrepError::io(path, e))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses an ontology source from `reader`, preserving order.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Registers `key` with no values if it is new.
    pub fn ensure_key(&mut self, key: &str) -> usize {
        if let Some(&pos) = self.positions.get(key) {
            return pos;
        }
        self.entries.push((key.to_string(), Vec::new()));
        self.positions.insert(key.to_string(), self.entries.len() - 1);
        self.entries.len() - 1
    }

    /// Records `value` under `key`. Returns `false` if it was already there.
    pub fn insert(&mut self, key: &str, value: &str) -> bool {
        let pos = self.ensure_key(key);
        let values = &mut self.entries[pos].1;
        if values.iter().any(|v| v == value) {
            return false;
        }
        values.push(value.to_string());
        true
    }

    /// Values recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.positions
            .get(key)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    /// Keys with their values, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of values across all keys.
    pub fn num_values(&self) -> usize {
        self.entries.iter().map(|(_, values)| values.len()).sum()
    }
}

impl Serialize for SlotValueSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, values) in &self.entries {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SlotValueSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(SlotValueSetVisitor)
    }
}

struct SlotValueSetVisitor;

impl<'de> Visitor<'de> for SlotValueSetVisitor {
    type Value = SlotValueSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping \"domain-slot\" keys to arrays of values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut set = SlotValueSet::new();
        while let Some((key, values)) = access.next_entry::<String, Vec<String>>()? {
            set.ensure_key(&key);
            for value in &values {
                set.insert(&key, value);
            }
        }
        Ok(set)
    }
}
