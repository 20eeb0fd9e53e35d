//! # Raw Corpus
//!
//! Reads the MultiWOZ release (`data.json` plus the validation and test file
//! lists) and converts every dialogue into a [`DialogueRecord`].

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use beliefprep_core::types::{BeliefState, DialogueRecord, Turn, UserTurn};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Filename markers of single-domain synthetic dialogues that are left out.
const SKIPPED_MARKERS: &[&str] = &["SSNG", "SMUL"];

/// One utterance of a raw dialogue log.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLogEntry {
    pub text: String,
    /// Belief state after the utterance; empty on user entries.
    #[serde(default)]
    pub metadata: BeliefState,
}

/// One dialogue as released: the user goal and the alternating log.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDialogue {
    #[serde(default)]
    pub goal: Map<String, Value>,
    #[serde(default)]
    pub log: Vec<RawLogEntry>,
}

impl RawDialogue {
    /// Whether the user goal mentions `domain`.
    pub fn has_goal(&self, domain: &str) -> bool {
        self.goal.get(domain).is_some_and(is_truthy)
    }

    /// Pairs the log into turns.
    ///
    /// Even entries are user utterances; the following odd entry supplies
    /// the system reply and the belief state after the user spoke. A log of
    /// odd length closes its last turn with the previous belief state and
    /// an empty reply. Returns `None` for an empty log.
    pub fn to_record(&self, domains: &[String]) -> Option<DialogueRecord> {
        if self.log.is_empty() {
            return None;
        }

        let mut turns = Vec::with_capacity(self.log.len().div_ceil(2));
        let mut belief_state = BeliefState::new();
        for pair in self.log.chunks(2) {
            let (system, state) = match pair.get(1) {
                Some(reply) => (reply.text.clone(), reply.metadata.clone()),
                None => (String::new(), belief_state.clone()),
            };
            belief_state = state.clone();
            turns.push(Turn {
                user: UserTurn {
                    text: pair[0].text.clone(),
                    belief_state: state,
                },
                system,
            });
        }

        let mut metadata = Map::new();
        for domain in domains {
            metadata.insert(domain.clone(), Value::Bool(self.has_goal(domain)));
        }
        metadata.insert("len".to_string(), Value::from(turns.len()));

        Some(DialogueRecord { turns, metadata })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// All dialogues of `data.json`, in file order.
#[derive(Debug, Clone, Default)]
pub struct RawCorpus {
    dialogues: Vec<(String, RawDialogue)>,
}

impl RawCorpus {
    /// Loads `data.json`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        info!(path = %path.display(), "reading raw corpus");
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn len(&self) -> usize {
        self.dialogues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogues.is_empty()
    }

    /// `(filename, dialogue)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawDialogue)> {
        self.dialogues.iter().map(|(name, d)| (name.as_str(), d))
    }

    /// Converts and splits the corpus into train, validation and test sets.
    ///
    /// Synthetic single-domain dialogues and empty logs are skipped.
    pub fn split(
        &self,
        validation: &HashSet<String>,
        test: &HashSet<String>,
        domains: &[String],
    ) -> CorpusSplit {
        let mut split = CorpusSplit::default();

        for (filename, raw) in self.iter() {
            if SKIPPED_MARKERS.iter().any(|m| filename.contains(*m)) {
                continue;
            }
            let Some(record) = raw.to_record(domains) else {
                debug!(filename, "skipping dialogue with an empty log");
                continue;
            };

            if validation.contains(filename) {
                split.validate.push(record);
            } else if test.contains(filename) {
                split.test.push(record);
            } else {
                split.train.push(record);
            }
        }

        info!(
            train = split.train.len(),
            validate = split.validate.len(),
            test = split.test.len(),
            "corpus split"
        );
        split
    }
}

impl<'de> Deserialize<'de> for RawCorpus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(RawCorpusVisitor)
    }
}

struct RawCorpusVisitor;

impl<'de> Visitor<'de> for RawCorpusVisitor {
    type Value = RawCorpus;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping dialogue filenames to dialogues")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
        let mut dialogues = Vec::new();
        while let Some(entry) = access.next_entry::<String, RawDialogue>()? {
            dialogues.push(entry);
        }
        Ok(RawCorpus { dialogues })
    }
}

/// Converted dialogues per split.
#[derive(Debug, Clone, Default)]
pub struct CorpusSplit {
    pub train: Vec<DialogueRecord>,
    pub validate: Vec<DialogueRecord>,
    pub test: Vec<DialogueRecord>,
}

/// Reads a file list: one dialogue filename per line.
pub fn read_file_list<P: AsRef<Path>>(path: P) -> Result<HashSet<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read file list {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
