//! Deterministic vectors for words missing from the pretrained table.

use oorandom::Rand64;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Seeds are folded into eight decimal digits.
const SEED_MODULUS: u64 = 100_000_000;

/// 64-bit FNV-1a over the UTF-8 bytes of `word`.
///
/// Unlike `std`'s `DefaultHasher`, the result is identical across runs,
/// platforms and compiler versions.
pub fn stable_hash(word: &str) -> u64 {
    word.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Returns a unit-length `dimension`-wide vector for `word`.
///
/// Components are drawn uniformly from the Xavier range `±sqrt(6 / D)` with
/// a generator seeded by [`stable_hash`], so the same word always maps to
/// the same vector.
///
/// # Examples
/// ```
/// use beliefprep_core::embedding::xavier_vector;
///
/// let a = xavier_vector("gonville", 300);
/// let b = xavier_vector("gonville", 300);
/// assert_eq!(a, b);
/// ```
pub fn xavier_vector(word: &str, dimension: usize) -> Vec<f32> {
    if dimension == 0 {
        return Vec::new();
    }

    let seed = stable_hash(word) % SEED_MODULUS;
    let mut rng = Rand64::new(u128::from(seed));

    let bound = 6f64.sqrt() / (dimension as f64).sqrt();
    let sample: Vec<f64> = (0..dimension)
        .map(|_| rng.rand_float() * 2.0 * bound - bound)
        .collect();

    let norm = sample.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm == 0.0 {
        return vec![0.0; dimension];
    }
    sample.into_iter().map(|x| (x / norm) as f32).collect()
}
