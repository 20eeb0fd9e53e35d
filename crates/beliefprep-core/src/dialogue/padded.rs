use std::collections::HashMap;

use candle_core::{Device, Tensor};

use super::ProcessedDialogue;
use crate::config::PipelineConfig;
use crate::error::{PrepError, Result};
use crate::vectorize::VectorSequence;

/// A dialogue zero-padded to `max_turns` turns of `max_utterance_length`
/// tokens each.
#[derive(Debug, Clone)]
pub struct PaddedDialogue {
    /// Turns before padding.
    pub num_turns: usize,
    /// `[max_turns, max_utterance_length, D]` user utterances.
    pub user: Tensor,
    /// `[max_turns, max_utterance_length, D]` preceding system utterances.
    pub system: Tensor,
    /// `[max_turns]` user utterance lengths (`u32`).
    pub user_lengths: Tensor,
    /// `[max_turns]` system utterance lengths (`u32`).
    pub system_lengths: Tensor,
    /// `[max_turns, labels]` multi-hot labels.
    pub labels: Tensor,
    /// `[max_turns, labels]` domain-mention vectors.
    pub domain_labels: Tensor,
}

impl ProcessedDialogue {
    /// Packs the dialogue into fixed-shape tensors on `device`.
    ///
    /// # Errors
    ///
    /// Returns `PrepError::InvalidConfig` when the dialogue does not fit the
    /// configured shape, and `PrepError::Tensor` if candle rejects a buffer.
    pub fn pad(&self, config: &PipelineConfig, device: &Device) -> Result<PaddedDialogue> {
        let turns = config.max_turns;
        let max_len = config.max_utterance_length;
        let dim = config.vector_dimension;
        let width = self.labels.first().map_or(0, Vec::len);

        if self.num_turns() > turns {
            return Err(PrepError::InvalidConfig(format!(
                "dialogue has {} turns, padded shape holds {turns}",
                self.num_turns()
            )));
        }
        for (name, len) in [
            ("system", self.system.len()),
            ("labels", self.labels.len()),
            ("domain_labels", self.domain_labels.len()),
        ] {
            if len != self.num_turns() {
                return Err(PrepError::InvalidConfig(format!(
                    "{name} has {len} turns, user has {}",
                    self.num_turns()
                )));
            }
        }

        let (user, user_lengths) = pack_utterances(&self.user, turns, max_len, dim)?;
        let (system, system_lengths) = pack_utterances(&self.system, turns, max_len, dim)?;

        Ok(PaddedDialogue {
            num_turns: self.num_turns(),
            user: Tensor::from_vec(user, (turns, max_len, dim), device)?,
            system: Tensor::from_vec(system, (turns, max_len, dim), device)?,
            user_lengths: Tensor::from_vec(user_lengths, turns, device)?,
            system_lengths: Tensor::from_vec(system_lengths, turns, device)?,
            labels: Tensor::from_vec(pack_rows(&self.labels, turns, width)?, (turns, width), device)?,
            domain_labels: Tensor::from_vec(
                pack_rows(&self.domain_labels, turns, width)?,
                (turns, width),
                device,
            )?,
        })
    }
}

fn pack_utterances(
    utterances: &[VectorSequence],
    turns: usize,
    max_len: usize,
    dim: usize,
) -> Result<(Vec<f32>, Vec<u32>)> {
    let mut data = vec![0.0f32; turns * max_len * dim];
    let mut lengths = vec![0u32; turns];

    for (t, utterance) in utterances.iter().enumerate() {
        if utterance.len() > max_len {
            return Err(PrepError::InvalidConfig(format!(
                "utterance of {} tokens exceeds max_utterance_length {max_len}",
                utterance.len()
            )));
        }
        lengths[t] = utterance.len() as u32;
        for (w, row) in utterance.iter().enumerate() {
            if row.len() != dim {
                return Err(PrepError::InvalidConfig(format!(
                    "word vector of width {} does not match vector_dimension {dim}",
                    row.len()
                )));
            }
            let start = (t * max_len + w) * dim;
            data[start..start + dim].copy_from_slice(row);
        }
    }

    Ok((data, lengths))
}

fn pack_rows(rows: &[Vec<f32>], turns: usize, width: usize) -> Result<Vec<f32>> {
    let mut data = vec![0.0f32; turns * width];
    for (t, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(PrepError::InvalidConfig(format!(
                "label row {t} has width {}, expected {width}",
                row.len()
            )));
        }
        data[t * width..(t + 1) * width].copy_from_slice(row);
    }
    Ok(data)
}

/// Padded dialogues stacked along a leading batch axis.
#[derive(Debug, Clone)]
pub struct DialogueBatch {
    /// `[batch]` turn counts (`u32`).
    pub num_turns: Tensor,
    pub user: Tensor,
    pub system: Tensor,
    pub user_lengths: Tensor,
    pub system_lengths: Tensor,
    pub labels: Tensor,
    pub domain_labels: Tensor,
}

impl DialogueBatch {
    /// Stacks dialogues padded with the same configuration.
    ///
    /// # Errors
    ///
    /// Returns `PrepError::Tensor` for an empty batch or mismatched shapes.
    pub fn collate(dialogues: &[PaddedDialogue]) -> Result<Self> {
        let first = dialogues
            .first()
            .ok_or_else(|| PrepError::Tensor("cannot collate an empty batch".into()))?;

        let stack = |field: fn(&PaddedDialogue) -> &Tensor| -> Result<Tensor> {
            let tensors: Vec<&Tensor> = dialogues.iter().map(field).collect();
            Ok(Tensor::stack(&tensors, 0)?)
        };

        let counts: Vec<u32> = dialogues.iter().map(|d| d.num_turns as u32).collect();

        Ok(Self {
            num_turns: Tensor::from_vec(counts, dialogues.len(), first.user.device())?,
            user: stack(|d| &d.user)?,
            system: stack(|d| &d.system)?,
            user_lengths: stack(|d| &d.user_lengths)?,
            system_lengths: stack(|d| &d.system_lengths)?,
            labels: stack(|d| &d.labels)?,
            domain_labels: stack(|d| &d.domain_labels)?,
        })
    }

    /// Number of dialogues in the batch.
    pub fn len(&self) -> usize {
        self.num_turns.dims().first().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tensors keyed by name, ready for `candle_core::safetensors::save`.
    pub fn named_tensors(&self) -> HashMap<String, Tensor> {
        [
            ("num_turns", &self.num_turns),
            ("user", &self.user),
            ("system", &self.system),
            ("user_lengths", &self.user_lengths),
            ("system_lengths", &self.system_lengths),
            ("labels", &self.labels),
            ("domain_labels", &self.domain_labels),
        ]
        .into_iter()
        .map(|(name, tensor)| (name.to_string(), tensor.clone()))
        .collect()
    }

    /// Positive labels per dialogue, summed over all turns.
    pub fn label_counts(&self) -> Result<Vec<f32>> {
        Ok(self.labels.sum((1, 2))?.to_vec1::<f32>()?)
    }
}
