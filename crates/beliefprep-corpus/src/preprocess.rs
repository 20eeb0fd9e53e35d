//! # Preprocessing
//!
//! Canonicalizes the belief states of the converted corpus, collects the
//! ontology source and writes the processed files.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use beliefprep_core::config::DEFAULT_DOMAINS;
use beliefprep_core::normalize::clean;
use beliefprep_core::types::{DialogueRecord, DomainState, SlotValueSet};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::corpus::{RawCorpus, read_file_list};

/// Booking entry that lists confirmed reservations rather than a value.
const BOOKED: &str = "booked";

/// Where to read the release from and where to write the processed files.
#[derive(Debug, Clone)]
pub struct PreprocessOptions {
    /// Directory holding `data.json`, `valListFile.json` and `testListFile.json`.
    pub data_path: PathBuf,
    pub out_dir: PathBuf,
    /// Overwrite an existing `train.json`.
    pub force: bool,
    /// Domains that get a goal flag on every dialogue.
    pub domains: Vec<String>,
}

impl PreprocessOptions {
    pub fn new(data_path: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            out_dir: out_dir.into(),
            force: false,
            domains: DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Counts reported after a preprocessing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessSummary {
    pub train: usize,
    pub validate: usize,
    pub test: usize,
    /// Longest dialogue across all splits, in turns.
    pub max_turns: usize,
    /// Distinct `domain-slot` keys in the ontology source.
    pub slots: usize,
    /// Distinct values across all keys.
    pub values: usize,
}

/// Folds `book` entries into `semi` as `book X` slots.
fn merge_bookings(state: &mut DomainState) {
    for (name, value) in &state.book {
        if name == BOOKED {
            continue;
        }
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Null => continue,
            other => other.to_string(),
        };
        if !value.is_empty() {
            state.semi.insert(format!("book {name}"), value);
        }
    }
}

/// Canonicalizes every belief state in `dialogues` and records the
/// non-empty values in `ontology`.
///
/// Returns the length of the longest dialogue.
pub fn canonicalize(dialogues: &mut [DialogueRecord], ontology: &mut SlotValueSet) -> Result<usize> {
    let mut max_turns = 0;

    for dialogue in dialogues.iter_mut() {
        max_turns = max_turns.max(dialogue.len());

        for turn in &mut dialogue.turns {
            for (domain, state) in &mut turn.user.belief_state {
                merge_bookings(state);

                let semi = std::mem::take(&mut state.semi);
                for (slot, value) in semi {
                    let (slot, value) = clean(domain, &slot, &value);
                    if value == "not mentioned" {
                        bail!("{domain}-{slot} still reads \"not mentioned\" after cleaning");
                    }
                    if !value.is_empty() {
                        ontology.insert(&format!("{domain}-{slot}"), &value);
                    }
                    state.semi.insert(slot, value);
                }
            }
        }
    }

    Ok(max_turns)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer.flush()?;
    info!(path = %path.display(), "written");
    Ok(())
}

/// Converts the release under `options.data_path` into processed corpus
/// files and the ontology source.
///
/// # Errors
///
/// Fails when the input files are missing or malformed, when `train.json`
/// already exists and `force` is not set, or when a value cannot be
/// canonicalized.
pub fn run(options: &PreprocessOptions) -> Result<PreprocessSummary> {
    let data_file = options.data_path.join("data.json");
    let val_list_file = options.data_path.join("valListFile.json");
    let test_list_file = options.data_path.join("testListFile.json");

    let train_out = options.out_dir.join("train.json");
    if train_out.exists() && !options.force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            train_out.display()
        );
    }
    for required in [&data_file, &val_list_file, &test_list_file] {
        if !required.is_file() {
            bail!("invalid data path: {} not found", required.display());
        }
    }

    let validation = read_file_list(&val_list_file)?;
    let test = read_file_list(&test_list_file)?;
    let corpus = RawCorpus::load(&data_file)?;

    info!("preprocessing the data and creating the ontology");
    let mut split = corpus.split(&validation, &test, &options.domains);

    let mut ontology = SlotValueSet::new();
    let mut max_turns = canonicalize(&mut split.train, &mut ontology)?;
    max_turns = max_turns.max(canonicalize(&mut split.validate, &mut ontology)?);
    max_turns = max_turns.max(canonicalize(&mut split.test, &mut ontology)?);
    info!(max_turns, "maximum number of turns per dialogue");

    fs::create_dir_all(&options.out_dir)
        .with_context(|| format!("failed to create {}", options.out_dir.display()))?;
    write_json(&train_out, &split.train)?;
    write_json(&options.out_dir.join("validate.json"), &split.validate)?;
    write_json(&options.out_dir.join("test.json"), &split.test)?;
    write_json(&options.out_dir.join("ontology.json"), &ontology)?;

    Ok(PreprocessSummary {
        train: split.train.len(),
        validate: split.validate.len(),
        test: split.test.len(),
        max_turns,
        slots: ontology.len(),
        values: ontology.num_values(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(turns: Value) -> DialogueRecord {
        serde_json::from_value(turns).unwrap()
    }

    fn sample() -> DialogueRecord {
        record(json!({
            "len": 2,
            "0": {
                "user": {"text": "a taxi please", "belief_state": {
                    "taxi": {"semi": {"arriveBy": "1530", "leaveAt": "not mentioned"}, "book": {"booked": []}}
                }},
                "system": "where to?"
            },
            "1": {
                "user": {"text": "a hotel too", "belief_state": {
                    "hotel": {
                        "semi": {"area": "center", "stars": ""},
                        "book": {"booked": [], "day": "Monday", "people": "", "stay": "2"}
                    }
                }},
                "system": "done"
            }
        }))
    }

    #[test]
    fn bookings_are_merged_into_semi() {
        let mut dialogues = vec![sample()];
        let mut ontology = SlotValueSet::new();
        canonicalize(&mut dialogues, &mut ontology).unwrap();

        let hotel = &dialogues[0].turns[1].user.belief_state["hotel"];
        assert_eq!(hotel.semi["book day"], "monday");
        assert_eq!(hotel.semi["book stay"], "2");
        assert!(!hotel.semi.contains_key("book people"));
        assert!(!hotel.semi.contains_key("book booked"));
    }

    #[test]
    fn values_are_cleaned_and_recorded() {
        let mut dialogues = vec![sample()];
        let mut ontology = SlotValueSet::new();
        let max_turns = canonicalize(&mut dialogues, &mut ontology).unwrap();

        assert_eq!(max_turns, 2);
        let taxi = &dialogues[0].turns[0].user.belief_state["taxi"];
        assert_eq!(taxi.semi["arrive by"], "15:30");
        assert_eq!(taxi.semi["leave at"], "");

        assert_eq!(ontology.get("taxi-arrive by").unwrap(), ["15:30"]);
        assert_eq!(ontology.get("hotel-area").unwrap(), ["centre"]);
        assert!(ontology.get("taxi-leave at").is_none());
        assert!(ontology.get("hotel-stars").is_none());
    }

    #[test]
    fn canonicalize_is_stable_on_processed_data() {
        let mut dialogues = vec![sample()];
        let mut ontology = SlotValueSet::new();
        canonicalize(&mut dialogues, &mut ontology).unwrap();
        let once = dialogues.clone();

        let mut again = SlotValueSet::new();
        canonicalize(&mut dialogues, &mut again).unwrap();
        assert_eq!(dialogues, once);
        assert_eq!(again.len(), ontology.len());
    }

    #[test]
    fn ontology_keys_follow_domain_then_slot_order() {
        let mut dialogues = vec![record(json!({
            "0": {
                "user": {"text": "", "belief_state": {
                    "taxi": {"semi": {"leaveAt": "0700"}},
                    "hotel": {"semi": {"type": "hotel", "area": "north"}}
                }},
                "system": ""
            },
            "1": {
                "user": {"text": "", "belief_state": {
                    "attraction": {"semi": {"area": "west"}}
                }},
                "system": ""
            }
        }))];
        let mut ontology = SlotValueSet::new();
        canonicalize(&mut dialogues, &mut ontology).unwrap();

        let keys: Vec<&str> = ontology.iter().map(|(key, _)| key).collect();
        assert_eq!(
            keys,
            vec!["hotel-area", "hotel-type", "taxi-leave at", "attraction-area"]
        );
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("beliefprep-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_release(dir: &Path) {
        let dialogue = json!({
            "goal": {"hotel": {"info": {"area": "centre"}}},
            "log": [
                {"text": "a hotel in the center", "metadata": {}},
                {"text": "sure", "metadata": {"hotel": {"semi": {"area": "center"}, "book": {"booked": []}}}}
            ]
        });
        let data = json!({"MUL1.json": dialogue, "MUL2.json": dialogue, "SNG3.json": dialogue});
        fs::write(dir.join("data.json"), data.to_string()).unwrap();
        fs::write(dir.join("valListFile.json"), "MUL2.json\n").unwrap();
        fs::write(dir.join("testListFile.json"), "SNG3.json\n").unwrap();
    }

    #[test]
    fn run_writes_every_output() {
        let dir = scratch_dir("run");
        write_release(&dir);
        let out = dir.join("out");

        let summary = run(&PreprocessOptions::new(&dir, &out)).unwrap();

        assert_eq!((summary.train, summary.validate, summary.test), (1, 1, 1));
        assert_eq!(summary.max_turns, 1);
        assert_eq!(summary.slots, 1);
        for name in ["train.json", "validate.json", "test.json", "ontology.json"] {
            assert!(out.join(name).is_file(), "{name}");
        }
        let ontology = SlotValueSet::load(out.join("ontology.json")).unwrap();
        assert_eq!(ontology.get("hotel-area").unwrap(), ["centre"]);

        let err = run(&PreprocessOptions::new(&dir, &out)).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert!(run(&PreprocessOptions::new(&dir, &out).with_force(true)).is_ok());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_release_is_an_error() {
        let dir = scratch_dir("missing");
        let err = run(&PreprocessOptions::new(&dir, dir.join("out"))).unwrap_err();
        assert!(err.to_string().contains("invalid data path"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
