use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PrepError, Result};

/// Belief state of one turn: domain → annotations.
pub type BeliefState = BTreeMap<String, DomainState>;

/// Slot annotations of one domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainState {
    /// Informable slots (`slot → value`); `book X` entries are merged in by
    /// preprocessing.
    #[serde(default)]
    pub semi: BTreeMap<String, String>,

    /// Booking annotations as found in the raw corpus, including the
    /// `booked` list.
    #[serde(default)]
    pub book: BTreeMap<String, Value>,
}

/// The user side of a turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserTurn {
    pub text: String,
    #[serde(default)]
    pub belief_state: BeliefState,
}

/// One exchange: a user utterance, the belief state after it, and the
/// system reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub user: UserTurn,
    #[serde(default)]
    pub system: String,
}

/// A dialogue as stored in the processed corpus files.
///
/// On disk the turns live under the numeric keys `"0"`, `"1"`, …, next to
/// metadata keys such as the per-domain goal flags and `"len"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct DialogueRecord {
    /// Turns in ascending key order.
    pub turns: Vec<Turn>,
    /// Every non-numeric key.
    pub metadata: Map<String, Value>,
}

impl DialogueRecord {
    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the dialogue has no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for DialogueRecord {
    type Error = PrepError;

    fn try_from(map: Map<String, Value>) -> Result<Self> {
        let mut numbered = Vec::new();
        let mut metadata = Map::new();

        for (key, value) in map {
            match turn_number(&key) {
                Some(n) => numbered.push((n, serde_json::from_value::<Turn>(value)?)),
                None => {
                    metadata.insert(key, value);
                }
            }
        }

        numbered.sort_by_key(|(n, _)| *n);
        Ok(Self {
            turns: numbered.into_iter().map(|(_, turn)| turn).collect(),
            metadata,
        })
    }
}

impl From<DialogueRecord> for Map<String, Value> {
    fn from(record: DialogueRecord) -> Self {
        let mut map = record.metadata;
        for (n, turn) in record.turns.into_iter().enumerate() {
            // Turn only holds strings and JSON values, so this cannot fail.
            if let Ok(value) = serde_json::to_value(turn) {
                map.insert(n.to_string(), value);
            }
        }
        map
    }
}

fn turn_number(key: &str) -> Option<u64> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Reads a processed corpus file (a JSON array of dialogues).
///
/// # Errors
///
/// Returns `PrepError::Io` if the file cannot be opened and
/// `PrepError::Json` if it is not an array of dialogue objects.
pub fn load_dialogues<P: AsRef<Path>>(path: P) -> Result<Vec<DialogueRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PrepError::io(path, e))?;
    read_dialogues(BufReader::new(file))
}

/// Parses a JSON array of dialogues from `reader`.
pub fn read_dialogues<R: Read>(reader: R) -> Result<Vec<DialogueRecord>> {
    Ok(serde_json::from_reader(reader)?)
}
