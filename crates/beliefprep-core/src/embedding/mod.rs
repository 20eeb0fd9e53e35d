//! # Embedding Store
//!
//! Pretrained word vectors plus the fallbacks used for words the vector file
//! does not cover.

pub mod store;
pub mod xavier;

pub use store::EmbeddingStore;
pub use xavier::{stable_hash, xavier_vector};

/// Elementwise sum of `rows`; a zero vector when there are none.
pub fn sum_rows(rows: &[Vec<f32>], dimension: usize) -> Vec<f32> {
    rows.iter().fold(vec![0.0; dimension], |mut acc, row| {
        for (a, x) in acc.iter_mut().zip(row) {
            *a += x;
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_rows() {
        let rows = vec![vec![1.0, 2.0], vec![0.5, -1.0]];
        assert_eq!(sum_rows(&rows, 2), vec![1.5, 1.0]);
    }

    #[test]
    fn empty_sum_is_zero() {
        assert_eq!(sum_rows(&[], 3), vec![0.0; 3]);
    }
}
