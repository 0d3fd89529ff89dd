//! Intercept-resend eavesdropper.
//!
//! Eve sits on the line between Alice and the noisy part of the channel. For
//! every qubit she picks a basis at random, measures, and sends Bob a fresh
//! state prepared from her result in her own basis. Half of the time her basis
//! is wrong, her result is random, and Bob (measuring in Alice's basis) then
//! sees a random bit: a 25% error rate on the sifted key.

use crate::random::RandomSource;
use crate::{Measurement, QubitState};
use tracing::trace;

/// Error rate Eve induces on the sifted key of a noiseless channel.
pub const INTERCEPT_RESEND_ERROR_RATE: f64 = 0.25;

#[derive(Debug, Clone, Default)]
pub struct Eavesdropper {
    intercepted: usize,
    basis_matches: usize,
}

impl Eavesdropper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measures `state` in a random basis and forwards a re-prepared state.
    pub fn intercept(&mut self, state: QubitState, source: &mut RandomSource) -> QubitState {
        let basis = source.random_basis();
        let result = state.measure(&Measurement::new(basis), source);

        self.intercepted += 1;
        if result.basis_matched {
            self.basis_matches += 1;
        }
        trace!(
            eve_basis = %basis,
            bit = result.bit,
            basis_matched = result.basis_matched,
            "qubit intercepted"
        );

        QubitState::prepare(result.bit, basis)
    }

    /// Number of qubits intercepted so far.
    pub fn intercepted_count(&self) -> usize {
        self.intercepted
    }

    /// Number of interceptions where Eve guessed the sender's basis.
    pub fn basis_match_count(&self) -> usize {
        self.basis_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Basis;

    #[test]
    fn forwards_state_in_her_own_basis() {
        let mut eve = Eavesdropper::new();
        let mut source = RandomSource::from_seed(4);

        for _ in 0..500 {
            let sent = QubitState::prepare(true, Basis::Computational);
            let forwarded = eve.intercept(sent, &mut source);

            // a matching guess reproduces the state exactly
            if forwarded.basis() == Basis::Computational {
                assert!(forwarded.bit());
            }
        }

        assert_eq!(eve.intercepted_count(), 500);
        assert!(eve.basis_match_count() <= 500);
    }

    #[test]
    fn guesses_basis_about_half_the_time() {
        let mut eve = Eavesdropper::new();
        let mut source = RandomSource::from_seed(8);
        let n = 10_000;

        for _ in 0..n {
            eve.intercept(QubitState::prepare(false, Basis::Hadamard), &mut source);
        }

        let matches = eve.basis_match_count() as i64;
        assert!((matches - 5_000).abs() < 500, "matches = {matches}");
    }

    #[test]
    fn disturbs_a_quarter_of_same_basis_measurements() {
        let mut eve = Eavesdropper::new();
        let mut source = RandomSource::from_seed(15);
        let n = 20_000;

        let errors = (0..n)
            .filter(|_| {
                let forwarded =
                    eve.intercept(QubitState::prepare(false, Basis::Hadamard), &mut source);
                forwarded
                    .measure(&Measurement::new(Basis::Hadamard), &mut source)
                    .bit
            })
            .count();

        let rate = errors as f64 / n as f64;
        assert!(
            (rate - INTERCEPT_RESEND_ERROR_RATE).abs() < 0.02,
            "rate = {rate}"
        );
    }
}
