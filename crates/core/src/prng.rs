//! Deterministic string hashing and a counter-based PRNG.
//!
//! [`hash_seed`] turns an arbitrary seed string into a well-mixed `u32`, and
//! [`Mulberry32`] expands that into a stream of uniform floats. Both use pure
//! 32-bit integer arithmetic, so every platform produces the same sequence.

use serde::{Deserialize, Serialize};

/// Hashes a string into a well-mixed 32-bit value.
///
/// Each UTF-8 byte is folded in with a multiply/rotate round, so the hash is
/// order sensitive ("ab" and "ba" differ). The murmur3 `fmix32` finalizer
/// gives full avalanche: flipping one input bit flips about half the output
/// bits, which keeps near-identical seeds ("seed-1", "seed-2") uncorrelated.
pub fn hash_seed(input: &str) -> u32 {
    let mut h: u32 = 0x6A09_E667 ^ (input.len() as u32);
    for &byte in input.as_bytes() {
        h = (h ^ u32::from(byte)).wrapping_mul(0xCC9E_2D51);
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xE654_6B64);
    }
    fmix32(h)
}

/// Murmur3 32-bit finalizer.
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h
}

/// Mulberry32 counter-based PRNG. Same seed always produces the same sequence.
///
/// The whole generator is one `u32` counter advanced by a fixed odd
/// increment; each output is a mixed copy of the counter. There is no
/// degenerate seed: 0 is as good as any other value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    const INCREMENT: u32 = 0x6D2B_79F5;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Creates a PRNG seeded from the hash of `input`.
    pub fn from_str_seed(input: &str) -> Self {
        Self::new(hash_seed(input))
    }

    /// Advances the counter and returns the next 32-bit value.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(Self::INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Returns a uniformly distributed f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Returns a uniformly distributed f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Returns a uniformly distributed usize in [0, max).
    ///
    /// # Panics
    ///
    /// Panics if `max` is 0.
    pub fn next_usize(&mut self, max: usize) -> usize {
        assert!(max > 0, "next_usize requires max > 0");
        ((self.next_f64() * max as f64) as usize).min(max - 1)
    }

    /// Returns `1.0` or `-1.0` with equal probability.
    pub fn next_sign(&mut self) -> f64 {
        if self.next_f64() < 0.5 {
            -1.0
        } else {
            1.0
        }
    }

    /// Shuffles `items` in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_usize(i + 1);
            items.swap(i, j);
        }
    }
}
