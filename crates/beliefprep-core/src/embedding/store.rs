use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use super::xavier::xavier_vector;
use crate::error::{PrepError, Result};

/// Guards the L2 normalization against near-zero vectors.
const NORM_EPSILON: f32 = 1e-6;

/// Word → vector table shared by every vectorization step of a run.
///
/// The store grows monotonically: vectors synthesized for unseen words are
/// inserted so that later lookups of the same word agree.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingStore {
    /// Creates an empty store of `dimension`-wide vectors.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
        }
    }

    /// Loads a pretrained vector file (`token v1 ... vD` per line).
    ///
    /// # Errors
    ///
    /// Returns `PrepError::Io` if the file cannot be opened and
    /// `PrepError::Format` on the first malformed line.
    pub fn load<P: AsRef<Path>>(path: P, dimension: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PrepError::io(path, e))?;
        info!(path = %path.display(), "loading pretrained word vectors");
        Self::from_reader(BufReader::new(file), dimension)
    }

    /// Parses vectors from any buffered reader and L2-normalizes them.
    pub fn from_reader<R: BufRead>(reader: R, dimension: usize) -> Result<Self> {
        let mut store = Self::new(dimension);

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let (token, rest) = line.split_once(' ').ok_or_else(|| PrepError::Format {
                line: idx + 1,
                message: "missing vector components".into(),
            })?;

            let vector = rest
                .split_whitespace()
                .map(str::parse::<f32>)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| PrepError::Format {
                    line: idx + 1,
                    message: format!("bad component for {token:?}: {e}"),
                })?;

            if vector.len() != dimension {
                return Err(PrepError::Format {
                    line: idx + 1,
                    message: format!(
                        "expected {dimension} components for {token:?}, found {}",
                        vector.len()
                    ),
                });
            }

            store.vectors.insert(token.to_string(), normalize(vector));
        }

        info!(words = store.len(), "vocabulary loaded");
        Ok(store)
    }

    /// Width of every vector in the store.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of words in the store.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the store holds no words.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Whether `token` has a vector.
    pub fn contains(&self, token: &str) -> bool {
        self.vectors.contains_key(token)
    }

    /// The stored vector for `token`, if any.
    pub fn get(&self, token: &str) -> Option<&[f32]> {
        self.vectors.get(token).map(Vec::as_slice)
    }

    /// Inserts `vector` as-is, replacing any previous entry.
    pub fn insert(&mut self, token: impl Into<String>, vector: Vec<f32>) {
        self.vectors.insert(token.into(), vector);
    }

    /// Inserts `vector` only if `token` is not present yet.
    pub fn insert_if_absent(&mut self, token: impl Into<String>, vector: Vec<f32>) {
        self.vectors.entry(token.into()).or_insert(vector);
    }

    /// Returns the vector for `token`, synthesizing one if necessary.
    ///
    /// Unknown tokens are first tried as a concatenation of two known words,
    /// longest left part first, and get the sum of both vectors. Only when no
    /// split works is a hash-seeded Xavier vector generated and stored.
    pub fn lookup_or_synthesize(&mut self, token: &str) -> Vec<f32> {
        if let Some(vector) = self.vectors.get(token) {
            return vector.clone();
        }

        if let Some(vector) = self.compound(token) {
            return vector;
        }

        debug!(word = token, "adding new word");
        let vector = xavier_vector(token, self.dimension);
        self.vectors.insert(token.to_string(), vector.clone());
        vector
    }

    fn compound(&self, token: &str) -> Option<Vec<f32>> {
        let splits: Vec<usize> = token.char_indices().skip(1).map(|(i, _)| i).collect();

        splits.into_iter().rev().find_map(|i| {
            let left = self.vectors.get(&token[..i])?;
            let right = self.vectors.get(&token[i..])?;
            Some(left.iter().zip(right).map(|(a, b)| a + b).collect())
        })
    }
}

fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = (vector.iter().map(|x| x * x).sum::<f32>() + NORM_EPSILON).sqrt();
    for x in &mut vector {
        *x /= norm;
    }
    vector
}
