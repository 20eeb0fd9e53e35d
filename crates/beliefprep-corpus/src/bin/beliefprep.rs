//! Beliefprep CLI
//!
//! Preprocesses the MultiWOZ release and tensorizes processed splits.

use std::path::PathBuf;

use anyhow::Result;
use beliefprep_core::PipelineConfig;
use beliefprep_core::config::DEFAULT_VECTOR_DIMENSION;
use beliefprep_corpus::{PreprocessOptions, TensorizeOptions, preprocess, tensorize};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Parser)]
#[command(name = "beliefprep")]
#[command(about = "Prepare MultiWOZ data for belief tracking")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the raw release into train/validate/test splits and an ontology
    Preprocess {
        /// Directory holding data.json, valListFile.json and testListFile.json
        #[arg(long, env = "BELIEFPREP_DATA_PATH")]
        data_path: PathBuf,

        /// Output directory
        #[arg(long, env = "BELIEFPREP_OUT_DIR", default_value = "data")]
        out_dir: PathBuf,

        /// Overwrite existing output
        #[arg(short, long)]
        force: bool,
    },
    /// Vectorize a processed split against the ontology
    Tensorize {
        /// Pretrained word vectors
        #[arg(long, env = "BELIEFPREP_WORD_VECTORS")]
        word_vectors: PathBuf,

        /// Ontology source
        #[arg(long, default_value = "data/ontology.json")]
        ontology: PathBuf,

        /// Processed split
        #[arg(long, default_value = "data/train.json")]
        data: PathBuf,

        #[arg(long, default_value_t = 50)]
        max_utterance_length: usize,

        #[arg(long, default_value_t = 22)]
        max_turns: usize,

        #[arg(long, default_value_t = DEFAULT_VECTOR_DIMENSION)]
        vector_dimension: usize,

        /// Write the collated tensors and ontology features as safetensors
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Preprocess {
            data_path,
            out_dir,
            force,
        } => {
            let options = PreprocessOptions::new(data_path, out_dir).with_force(force);
            let summary = preprocess::run(&options)?;
            info!(
                train = summary.train,
                validate = summary.validate,
                test = summary.test,
                max_turns = summary.max_turns,
                slots = summary.slots,
                values = summary.values,
                "preprocessing complete"
            );
        }
        Commands::Tensorize {
            word_vectors,
            ontology,
            data,
            max_utterance_length,
            max_turns,
            vector_dimension,
            output,
        } => {
            let config = PipelineConfig::new()
                .with_vector_dimension(vector_dimension)
                .with_max_utterance_length(max_utterance_length)
                .with_max_turns(max_turns);
            let options = TensorizeOptions {
                word_vectors,
                ontology,
                data,
                config,
                output,
            };
            let summary = tensorize::run(&options)?;
            info!(
                labels = summary.labels,
                kept = summary.kept,
                dialogues = summary.dialogues,
                vocabulary = summary.vocabulary,
                "tensorize complete"
            );
        }
    }

    Ok(())
}
