use crate::core::errors::ChannelError;
use crate::core::state::QubitState;
use crate::random::RandomSource;

/// Memoryless bit-flip channel.
///
/// Every qubit passing through has its encoded bit flipped independently with
/// probability `flip_probability`. The preparation basis is never altered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantumChannel {
    flip_probability: f64,
}

impl QuantumChannel {
    /// Ideal channel, forwards every state unchanged.
    pub fn noiseless() -> Self {
        Self {
            flip_probability: 0.0,
        }
    }

    /// Bit Flip Channel -> X with probability p
    pub fn bit_flip(p: f64) -> Result<QuantumChannel, ChannelError> {
        validate_prob(p)?;
        Ok(Self { flip_probability: p })
    }

    pub fn flip_probability(&self) -> f64 {
        self.flip_probability
    }

    pub fn is_noiseless(&self) -> bool {
        self.flip_probability == 0.0
    }

    /// Sends one state through the channel.
    pub fn transmit(&self, state: QubitState, source: &mut RandomSource) -> QubitState {
        if source.bernoulli(self.flip_probability) {
            state.flipped()
        } else {
            state
        }
    }

    /// Composes the current QuantumChannel with another one
    ///
    /// Two flips cancel, so the composed flip probability is
    /// `p (1 - q) + q (1 - p)`.
    pub fn compose(&self, other: &QuantumChannel) -> QuantumChannel {
        let p = self.flip_probability;
        let q = other.flip_probability;

        // Returns a different QuantumChannel
        QuantumChannel {
            flip_probability: p * (1.0 - q) + q * (1.0 - p),
        }
    }
}

impl Default for QuantumChannel {
    fn default() -> Self {
        Self::noiseless()
    }
}

/// Validate probability parameter
pub(crate) fn validate_prob(p: f64) -> Result<(), ChannelError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ChannelError::InvalidProbability(p));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Basis;

    #[test]
    fn rejects_out_of_range_probabilities() {
        assert_eq!(
            QuantumChannel::bit_flip(-0.1),
            Err(ChannelError::InvalidProbability(-0.1))
        );
        assert!(QuantumChannel::bit_flip(1.5).is_err());
        assert!(QuantumChannel::bit_flip(f64::NAN).is_err());
        assert!(QuantumChannel::bit_flip(0.0).is_ok());
        assert!(QuantumChannel::bit_flip(1.0).is_ok());
    }

    #[test]
    fn noiseless_channel_is_identity() {
        let channel = QuantumChannel::noiseless();
        let mut source = RandomSource::from_seed(9);

        for _ in 0..200 {
            let out = channel.transmit(QubitState::prepare(true, Basis::Hadamard), &mut source);
            assert_eq!(out, QubitState::prepare(true, Basis::Hadamard));
        }
    }

    #[test]
    fn certain_flip_inverts_bit_only() {
        let channel = QuantumChannel::bit_flip(1.0).unwrap();
        let mut source = RandomSource::from_seed(9);

        let out = channel.transmit(QubitState::prepare(false, Basis::Hadamard), &mut source);
        assert_eq!(out, QubitState::prepare(true, Basis::Hadamard));
    }

    #[test]
    fn flip_frequency_matches_probability() {
        let channel = QuantumChannel::bit_flip(0.2).unwrap();
        let mut source = RandomSource::from_seed(21);
        let n = 20_000;

        let flips = (0..n)
            .filter(|_| {
                channel
                    .transmit(QubitState::prepare(false, Basis::Computational), &mut source)
                    .bit()
            })
            .count();

        let rate = flips as f64 / n as f64;
        assert!((rate - 0.2).abs() < 0.02, "rate = {rate}");
    }

    #[test]
    fn compose_combines_flip_probabilities() {
        let a = QuantumChannel::bit_flip(0.25).unwrap();
        let b = QuantumChannel::bit_flip(0.1).unwrap();

        let composed = a.compose(&b);
        assert!((composed.flip_probability() - 0.3).abs() < 1e-12);
        assert_eq!(a.compose(&QuantumChannel::noiseless()), a);

        let certain = QuantumChannel::bit_flip(1.0).unwrap();
        assert!(certain.compose(&certain).is_noiseless());
    }
}
