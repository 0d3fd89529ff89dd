use crate::QuantumChannel;
use crate::errors::ProtocolError;
use crate::protocols::qkd::bb84;
use crate::random::RandomSource;
use serde::Serialize;
use tracing::{debug, info};

/// Runs many independent BB84 sessions with fixed parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantumSimulator {
    pub n_bits: usize,
    pub channel: QuantumChannel,
    pub eve_present: bool,
}

/// Aggregate over a batch of sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrialSummary {
    pub trials: usize,
    pub total_sifted: usize,
    pub total_errors: usize,
    /// Sessions whose sifted key came out empty
    pub empty_sessions: usize,
    /// Errors over all sifted bits of all sessions, `None` if nothing was sifted
    pub pooled_error_rate: Option<f64>,
    pub mean_sifted_length: f64,
}

impl QuantumSimulator {
    /// Noiseless, eavesdropper-free simulator.
    pub fn new(n_bits: usize) -> Self {
        Self {
            n_bits,
            channel: QuantumChannel::noiseless(),
            eve_present: false,
        }
    }

    /// Add QuantumChannel to QuantumSimulator
    pub fn with_channel(mut self, channel: QuantumChannel) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_eavesdropper(mut self, eve_present: bool) -> Self {
        self.eve_present = eve_present;
        self
    }

    /// Runs `num_trials` sessions, each from its own fork of `source`.
    pub fn sample(
        &self,
        source: &mut RandomSource,
        num_trials: usize,
    ) -> Result<TrialSummary, ProtocolError> {
        if num_trials == 0 {
            return Err(ProtocolError::InvalidTrialCount(num_trials));
        }

        let mut total_sifted = 0;
        let mut total_errors = 0;
        let mut empty_sessions = 0;

        for trial in 0..num_trials {
            let mut trial_source = source.fork();
            let res = bb84::run(&mut trial_source, self.n_bits, &self.channel, self.eve_present)?;

            total_sifted += res.sifted_length();
            total_errors += res.error_count();
            if res.is_key_empty() {
                empty_sessions += 1;
            }
            debug!(trial, error_rate = ?res.error_rate(), "trial finished");
        }

        let pooled_error_rate =
            (total_sifted > 0).then(|| total_errors as f64 / total_sifted as f64);

        info!(
            trials = num_trials,
            n_bits = self.n_bits,
            eve_present = self.eve_present,
            pooled_error_rate = ?pooled_error_rate,
            "trials complete"
        );

        Ok(TrialSummary {
            trials: num_trials,
            total_sifted,
            total_errors,
            empty_sessions,
            pooled_error_rate,
            mean_sifted_length: total_sifted as f64 / num_trials as f64,
        })
    }
}
