//! Seedable random numbers for the procedural generators.

use std::time::{SystemTime, UNIX_EPOCH};

/// Not cryptographic. The same seed gives the same stream, which keeps
/// generated quizzes and melodies reproducible in tests.
#[derive(Debug, Clone)]
pub struct Rng(oorandom::Rand64);

impl Default for Rng {
    fn default() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0x5eed);
        Self::new_with_seed(seed)
    }
}

impl Rng {
    pub fn new_with_seed(seed: u128) -> Self {
        Self(oorandom::Rand64::new(seed))
    }

    pub fn rand_u64(&mut self) -> u64 {
        self.0.rand_u64()
    }

    /// Uniform in [0, 1).
    pub fn rand_float(&mut self) -> f64 {
        self.0.rand_float()
    }

    /// Uniform in `range`; an empty range yields its start.
    pub fn rand_range(&mut self, range: std::ops::Range<u64>) -> u64 {
        if range.is_empty() {
            return range.start;
        }
        self.0.rand_range(range)
    }

    /// Uniform in `[low, high)`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.rand_float()
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.rand_float() < probability
    }

    pub fn index(&mut self, len: usize) -> usize {
        self.rand_range(0..len as u64) as usize
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.index(items.len()))
    }
}
