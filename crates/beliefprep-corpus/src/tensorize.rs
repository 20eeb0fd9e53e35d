//! # Tensorize
//!
//! Runs the vectorization pipeline over one processed split and optionally
//! writes the collated tensors to a safetensors file.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use beliefprep_core::{
    DialogueBatch, DialogueLoader, EmbeddingStore, OntologyBuilder, PipelineConfig, SlotValueSet,
    TextVectorizer,
};
use candle_core::{Device, Tensor};
use tracing::info;

#[derive(Debug, Clone)]
pub struct TensorizeOptions {
    /// Pretrained word vectors (`token v1 ... vD` per line).
    pub word_vectors: PathBuf,
    /// Ontology source written by preprocessing.
    pub ontology: PathBuf,
    /// Processed split to vectorize.
    pub data: PathBuf,
    pub config: PipelineConfig,
    /// Where to write the tensors, if anywhere.
    pub output: Option<PathBuf>,
}

/// Counts reported after tensorizing a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorizeSummary {
    pub labels: usize,
    pub slots: usize,
    pub dialogues: usize,
    pub kept: usize,
    /// Words in the store after synthesis.
    pub vocabulary: usize,
}

pub fn run(options: &TensorizeOptions) -> Result<TensorizeSummary> {
    let config = &options.config;
    config.validate()?;

    let mut store = EmbeddingStore::load(&options.word_vectors, config.vector_dimension)?;
    let vectorizer = TextVectorizer::new()?;

    let source = SlotValueSet::load(&options.ontology)?;
    let ontology = OntologyBuilder::new(&config.domains, &vectorizer).build(&source, &mut store)?;

    let dialogues = beliefprep_core::types::load_dialogues(&options.data)?;
    let loader = DialogueLoader::new(&ontology, config, &vectorizer);
    let processed = loader.load(&dialogues, &mut store)?;

    let summary = TensorizeSummary {
        labels: ontology.len(),
        slots: ontology.slots().len(),
        dialogues: dialogues.len(),
        kept: processed.len(),
        vocabulary: store.len(),
    };
    info!(
        labels = summary.labels,
        slots = summary.slots,
        kept = summary.kept,
        dialogues = summary.dialogues,
        "split tensorized"
    );

    if let Some(output) = &options.output {
        let device = Device::Cpu;
        let padded = processed
            .iter()
            .map(|d| d.pad(config, &device))
            .collect::<beliefprep_core::Result<Vec<_>>>()?;

        let mut tensors: HashMap<String, Tensor> = if padded.is_empty() {
            HashMap::new()
        } else {
            DialogueBatch::collate(&padded)?.named_tensors()
        };
        tensors.insert("ontology".to_string(), ontology.feature_tensor(&device)?);
        tensors.insert(
            "value_counts".to_string(),
            Tensor::from_vec(
                ontology.value_counts().iter().map(|&n| n as u32).collect::<Vec<_>>(),
                ontology.value_counts().len(),
                &device,
            )?,
        );

        candle_core::safetensors::save(&tensors, output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        info!(path = %output.display(), tensors = tensors.len(), "tensors saved");
    }

    Ok(summary)
}
