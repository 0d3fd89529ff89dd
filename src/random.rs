//! Explicit source of randomness for the simulation.
//!
//! Every random decision in a session (bit and basis choices, wrong-basis
//! measurement outcomes, channel flips and the eavesdropper's basis) is drawn
//! from a [`RandomSource`] handed down by the caller. Nothing reads global
//! random state, so a seeded source reproduces a session exactly.

use crate::core::Basis;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seedable generator of uniformly random bits and bases.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: ChaCha8Rng,
    seed: Option<u64>,
}

impl RandomSource {
    /// Creates a deterministic source. Two sources with the same seed yield
    /// the same stream.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Creates a source seeded from the thread-local OS-backed generator.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
            seed: None,
        }
    }

    /// Seeded if `seed` is given, from entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    /// The seed this source was created with, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Derives an independent child source from this one's stream.
    ///
    /// The child is reproducible whenever the parent is.
    pub fn fork(&mut self) -> Self {
        let seed: u64 = self.rng.random();
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed: self.seed.map(|_| seed),
        }
    }

    pub fn random_bit(&mut self) -> bool {
        self.rng.random()
    }

    pub fn random_basis(&mut self) -> Basis {
        if self.rng.random() {
            Basis::Hadamard
        } else {
            Basis::Computational
        }
    }

    /// `n` independent uniform bits.
    pub fn generate_bits(&mut self, n: usize) -> Vec<bool> {
        (0..n).map(|_| self.random_bit()).collect()
    }

    /// `n` independent uniform bases.
    pub fn generate_bases(&mut self, n: usize) -> Vec<Basis> {
        (0..n).map(|_| self.random_basis()).collect()
    }

    /// Bernoulli trial with success probability `p`.
    ///
    /// `p <= 0.0` never succeeds and `p >= 1.0` always does; callers validate
    /// the range beforehand.
    pub fn bernoulli(&mut self, p: f64) -> bool {
        // random() is in [0, 1)
        self.rng.random::<f64>() < p
    }
}
