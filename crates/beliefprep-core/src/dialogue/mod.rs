//! # Dialogue Loader
//!
//! Runs the turn processor over whole dialogues, applies the length and
//! label filters, and packs the survivors into fixed-shape tensors.

pub mod padded;

pub use padded::{DialogueBatch, PaddedDialogue};

use std::path::Path;

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::embedding::EmbeddingStore;
use crate::error::Result;
use crate::ontology::Ontology;
use crate::turn::TurnProcessor;
use crate::types::{DialogueRecord, load_dialogues};
use crate::vectorize::{TextVectorizer, VectorSequence};

/// Per-turn vectors and labels of a retained dialogue.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDialogue {
    /// User utterance of every turn.
    pub user: Vec<VectorSequence>,
    /// System utterance preceding every turn.
    pub system: Vec<VectorSequence>,
    /// Label vector of every turn.
    pub labels: Vec<Vec<f32>>,
    /// Domain-mention vector of every turn.
    pub domain_labels: Vec<Vec<f32>>,
}

impl ProcessedDialogue {
    /// Number of turns.
    pub fn num_turns(&self) -> usize {
        self.user.len()
    }
}

/// Why a dialogue was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// More turns than the padded shape holds.
    TooManyTurns,
    /// An utterance longer than `max_utterance_length`.
    UtteranceTooLong,
    /// No turn sets any label.
    NoLabels,
}

/// Turns dialogue records into processed dialogues.
pub struct DialogueLoader<'a> {
    processor: TurnProcessor<'a>,
    config: &'a PipelineConfig,
}

impl<'a> DialogueLoader<'a> {
    pub fn new(
        ontology: &'a Ontology,
        config: &'a PipelineConfig,
        vectorizer: &'a TextVectorizer,
    ) -> Self {
        Self {
            processor: TurnProcessor::new(ontology, &config.domains, vectorizer),
            config,
        }
    }

    /// Processes one dialogue, or reports why it is filtered out.
    ///
    /// Turn `i` is paired with the system reply of turn `i - 1`; the first
    /// turn sees an all-zero reply of `max_utterance_length` rows.
    ///
    /// # Errors
    ///
    /// Propagates `PrepError::UnknownLabel` from the turn processor.
    pub fn process(
        &self,
        dialogue: &DialogueRecord,
        store: &mut EmbeddingStore,
    ) -> Result<std::result::Result<ProcessedDialogue, Rejection>> {
        let max_len = self.config.max_utterance_length;
        if dialogue.len() > self.config.max_turns {
            return Ok(Err(Rejection::TooManyTurns));
        }

        let mut processed = ProcessedDialogue {
            user: Vec::with_capacity(dialogue.len()),
            system: Vec::with_capacity(dialogue.len()),
            labels: Vec::with_capacity(dialogue.len()),
            domain_labels: Vec::with_capacity(dialogue.len()),
        };
        let mut previous_system: VectorSequence =
            vec![vec![0.0; store.dimension()]; max_len];
        let mut labelled = false;

        for turn in &dialogue.turns {
            let out = self.processor.process(turn, store)?;
            if out.user.len() > max_len || previous_system.len() > max_len {
                return Ok(Err(Rejection::UtteranceTooLong));
            }

            labelled |= out.has_label();
            processed.user.push(out.user);
            processed
                .system
                .push(std::mem::replace(&mut previous_system, out.system));
            processed.labels.push(out.labels);
            processed.domain_labels.push(out.domain_labels);
        }

        if !labelled {
            return Ok(Err(Rejection::NoLabels));
        }
        Ok(Ok(processed))
    }

    /// Processes every dialogue and keeps those that pass the filters.
    pub fn load(
        &self,
        dialogues: &[DialogueRecord],
        store: &mut EmbeddingStore,
    ) -> Result<Vec<ProcessedDialogue>> {
        let mut kept = Vec::new();
        for (idx, dialogue) in dialogues.iter().enumerate() {
            match self.process(dialogue, store)? {
                Ok(processed) => kept.push(processed),
                Err(reason) => debug!(dialogue = idx, ?reason, "dialogue dropped"),
            }
        }
        info!(kept = kept.len(), total = dialogues.len(), "dialogues loaded");
        Ok(kept)
    }

    /// Reads a processed corpus file and loads its dialogues.
    pub fn load_file<P: AsRef<Path>>(
        &self,
        path: P,
        store: &mut EmbeddingStore,
    ) -> Result<Vec<ProcessedDialogue>> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading dialogues");
        let dialogues = load_dialogues(path)?;
        self.load(&dialogues, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::OntologyBuilder;
    use crate::types::SlotValueSet;
    use serde_json::json;

    fn setup(config: &PipelineConfig) -> (Ontology, EmbeddingStore, TextVectorizer) {
        let source = SlotValueSet::from_reader(
            r#"{"hotel-area": ["centre", "north"], "train-day": ["monday"]}"#.as_bytes(),
        )
        .unwrap();
        let mut store = EmbeddingStore::new(config.vector_dimension);
        let vectorizer = TextVectorizer::new().unwrap();
        let ontology = OntologyBuilder::new(&config.domains, &vectorizer)
            .build(&source, &mut store)
            .unwrap();
        (ontology, store, vectorizer)
    }

    fn dialogue(turns: &[(&str, &str, Option<&str>)]) -> DialogueRecord {
        let mut map = serde_json::Map::new();
        for (i, (user, system, area)) in turns.iter().enumerate() {
            let semi = match area {
                Some(area) => json!({"area": area}),
                None => json!({}),
            };
            map.insert(
                i.to_string(),
                json!({
                    "user": {"text": user, "belief_state": {"hotel": {"semi": semi}}},
                    "system": system
                }),
            );
        }
        DialogueRecord::try_from(map).unwrap()
    }

    fn config() -> PipelineConfig {
        PipelineConfig::new()
            .with_vector_dimension(4)
            .with_max_utterance_length(4)
            .with_max_turns(3)
    }

    #[test]
    fn previous_system_utterance_is_shifted() {
        let config = config();
        let (ontology, mut store, vectorizer) = setup(&config);
        let loader = DialogueLoader::new(&ontology, &config, &vectorizer);

        let d = dialogue(&[
            ("a hotel please", "which area", None),
            ("the centre", "done", Some("centre")),
        ]);
        let out = loader.process(&d, &mut store).unwrap().unwrap();

        assert_eq!(out.num_turns(), 2);
        assert_eq!(out.system[0].len(), 4);
        assert!(out.system[0].iter().flatten().all(|&x| x == 0.0));
        assert_eq!(out.system[1].len(), 2);
        assert_eq!(out.system[1][0], store.lookup_or_synthesize("which"));
        assert_eq!(out.labels[0].iter().sum::<f32>(), 0.0);
        assert_eq!(out.labels[1].iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn long_user_utterance_drops_dialogue() {
        let config = config();
        let (ontology, mut store, vectorizer) = setup(&config);
        let loader = DialogueLoader::new(&ontology, &config, &vectorizer);

        let d = dialogue(&[("one two three four five", "ok", Some("centre"))]);
        assert_eq!(
            loader.process(&d, &mut store).unwrap(),
            Err(Rejection::UtteranceTooLong)
        );
    }

    #[test]
    fn long_system_utterance_drops_dialogue_on_next_turn() {
        let config = config();
        let (ontology, mut store, vectorizer) = setup(&config);
        let loader = DialogueLoader::new(&ontology, &config, &vectorizer);

        let last_reply_too_long = dialogue(&[("hi", "one two three four five", Some("centre"))]);
        assert!(loader.process(&last_reply_too_long, &mut store).unwrap().is_ok());

        let d = dialogue(&[
            ("hi", "one two three four five", Some("centre")),
            ("ok", "bye", Some("centre")),
        ]);
        assert_eq!(
            loader.process(&d, &mut store).unwrap(),
            Err(Rejection::UtteranceTooLong)
        );
    }

    #[test]
    fn unlabelled_dialogue_is_dropped() {
        let config = config();
        let (ontology, mut store, vectorizer) = setup(&config);
        let loader = DialogueLoader::new(&ontology, &config, &vectorizer);

        let d = dialogue(&[("hello", "hi", None)]);
        assert_eq!(
            loader.process(&d, &mut store).unwrap(),
            Err(Rejection::NoLabels)
        );
        let empty = DialogueRecord::default();
        assert_eq!(
            loader.process(&empty, &mut store).unwrap(),
            Err(Rejection::NoLabels)
        );
    }

    #[test]
    fn too_many_turns_is_dropped() {
        let config = config();
        let (ontology, mut store, vectorizer) = setup(&config);
        let loader = DialogueLoader::new(&ontology, &config, &vectorizer);

        let d = dialogue(&[("a", "b", Some("centre")); 4]);
        assert_eq!(
            loader.process(&d, &mut store).unwrap(),
            Err(Rejection::TooManyTurns)
        );
    }

    #[test]
    fn unknown_label_is_fatal() {
        let config = config();
        let (ontology, mut store, vectorizer) = setup(&config);
        let loader = DialogueLoader::new(&ontology, &config, &vectorizer);

        let d = dialogue(&[("hi", "ok", Some("south"))]);
        assert!(loader.process(&d, &mut store).is_err());
    }

    #[test]
    fn load_keeps_only_valid_dialogues() {
        let config = config();
        let (ontology, mut store, vectorizer) = setup(&config);
        let loader = DialogueLoader::new(&ontology, &config, &vectorizer);

        let dialogues = vec![
            dialogue(&[("north please", "ok", Some("north"))]),
            dialogue(&[("hello", "hi", None)]),
            dialogue(&[("one two three four five", "ok", Some("centre"))]),
        ];
        let kept = loader.load(&dialogues, &mut store).unwrap();

        assert_eq!(kept.len(), 1);
        for d in &kept {
            assert!(d.labels.iter().any(|l| l.iter().sum::<f32>() > 0.0));
            assert!(d.labels.iter().all(|l| l.len() == ontology.len()));
            assert!(d.user.iter().all(|u| u.len() <= config.max_utterance_length));
            assert!(d.system.iter().all(|s| s.len() <= config.max_utterance_length));
        }
    }

    #[test]
    fn load_file_reads_processed_split() {
        let config = config();
        let (ontology, mut store, vectorizer) = setup(&config);
        let loader = DialogueLoader::new(&ontology, &config, &vectorizer);

        let dialogues = vec![
            dialogue(&[("north please", "ok", Some("north"))]),
            dialogue(&[("hello", "hi", None)]),
        ];
        let path = std::env::temp_dir().join(format!("beliefprep-split-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&dialogues).unwrap()).unwrap();

        let kept = loader.load_file(&path, &mut store).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(kept.len(), 1);
        assert!(loader.load_file("/nonexistent/split.json", &mut store).is_err());
        assert_eq!(kept[0].labels[0], vec![0.0, 1.0, 0.0]);
    }
}
