//! Deterministic input generators.
//!
//! Every generator is a pure function of `(seed, size)`: the RNG for a size is
//! derived from the master seed, so re-running a size yields the same input
//! regardless of which sizes ran before it.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::harness::BenchConfig;

/// Lowercase ASCII, the alphabet used by the string workloads.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Upper bound (exclusive) for generated values.
pub const VALUE_RANGE: i64 = 1_000;

#[derive(Clone, Debug)]
pub struct Generators {
    config: BenchConfig,
}

impl Generators {
    pub fn new(config: BenchConfig) -> Self {
        Self { config }
    }

    fn rng(&self, size: usize) -> ChaCha8Rng {
        self.config.rng_for_size(size)
    }

    /// `size` random lowercase letters.
    pub fn ascii(&self, size: usize) -> String {
        random_ascii(&mut self.rng(size), size, ALPHABET)
    }

    /// `0..size` in shuffled order: no window ever repeats, which is the
    /// worst case for the naive longest-unique scan.
    pub fn distinct_values(&self, size: usize) -> Vec<u64> {
        let mut values: Vec<u64> = (0..size as u64).collect();
        values.shuffle(&mut self.rng(size));
        values
    }

    /// `size` signed values in `(-VALUE_RANGE, VALUE_RANGE)`.
    pub fn values(&self, size: usize) -> Vec<i64> {
        random_values(&mut self.rng(size), size)
    }

    /// Values with a window size of half the input, the shape the windowed
    /// workloads take.
    pub fn windowed_values(&self, size: usize) -> (Vec<i64>, usize) {
        (self.values(size), (size / 2).max(1))
    }
}

pub fn random_ascii(rng: &mut impl Rng, size: usize, alphabet: &[u8]) -> String {
    (0..size)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

pub fn random_values(rng: &mut impl Rng, size: usize) -> Vec<i64> {
    (0..size)
        .map(|_| rng.gen_range(-VALUE_RANGE + 1..VALUE_RANGE))
        .collect()
}
