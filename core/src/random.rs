//! Deterministic pseudo-random generator shared by every stochastic system.

use crate::Seed;

const MULBERRY_INCREMENT: u32 = 0x6d2b_79f5;
const UNIT_SCALE: f64 = 1.0 / 4_294_967_296.0;

/// Errors produced when the generator is used outside its contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RandError {
    /// An element was requested from an empty slice.
    #[error("cannot pick an element from an empty array")]
    EmptyArray,
}

/// Seeded 32-bit generator (mulberry32).
///
/// Two generators built from the same seed yield identical infinite
/// sequences. Callers own the generator for the duration of one phase of a
/// turn and pass it down by mutable reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rand {
    state: u32,
}

impl Rand {
    /// Creates a generator from a raw 32-bit state.
    #[must_use]
    pub const fn from_state(state: u32) -> Self {
        Self { state }
    }

    /// Creates a generator from a game seed.
    #[must_use]
    pub fn with_seed(seed: &Seed) -> Self {
        Self::from_state(seed.state())
    }

    /// Next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61)) ^ t;
        t ^ (t >> 14)
    }

    /// Next float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) * UNIT_SCALE
    }

    /// Uniformly selected index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        let index = (self.next_f64() * len as f64) as usize;
        index.min(len - 1)
    }

    /// Uniformly selected element of `items`.
    ///
    /// # Errors
    ///
    /// Returns [`RandError::EmptyArray`] when `items` is empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, RandError> {
        if items.is_empty() {
            return Err(RandError::EmptyArray);
        }
        let index = self.next_index(items.len());
        Ok(&items[index])
    }

    /// Shuffles a slice in place using Fisher-Yates.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}
