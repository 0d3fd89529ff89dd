//! Simulation parameters, loadable from JSON or `BB84_*` environment variables.

use crate::errors::{ConfigError, ProtocolError};
use crate::protocols::qkd::bb84::{self, SessionResult};
use crate::random::RandomSource;
use crate::{QuantumChannel, validate_prob};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `BB84_N_BITS`.
pub const ENV_PREFIX: &str = "BB84_";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SimulationConfig {
    /// Number of qubits sent per session
    #[serde(default = "default_n_bits")]
    pub n_bits: usize,

    /// Bit-flip probability of the channel
    #[serde(default = "default_channel_error_rate")]
    pub channel_error_rate: f64,

    /// Place an intercept-resend eavesdropper on the line
    #[serde(default)]
    pub eve_present: bool,

    /// Seed for reproducible runs; OS entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Sessions per batch for repeated trials
    #[serde(default = "default_trials")]
    pub trials: usize,
}

fn default_n_bits() -> usize {
    100
}

fn default_channel_error_rate() -> f64 {
    0.05
}

fn default_trials() -> usize {
    100
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_bits: default_n_bits(),
            channel_error_rate: default_channel_error_rate(),
            eve_present: false,
            seed: None,
            trials: default_trials(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_vars(std::env::vars())
    }

    /// Same as [`SimulationConfig::from_env`] over an explicit variable list.
    pub fn from_env_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = Self::layered(vars, None)?;
        config.validate()?;
        Ok(config)
    }

    /// `BB84_*` variables over the defaults, then the JSON file (if any) over
    /// those. Not validated: callers validate after their own overrides.
    pub fn layered<I>(vars: I, file: Option<&Path>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        match file {
            Some(path) => config.overlay_json(&std::fs::read_to_string(path)?),
            None => Ok(config),
        }
    }

    /// Replaces the fields present in the JSON object `text`, keeping the rest.
    pub fn overlay_json(self, text: &str) -> Result<Self, ConfigError> {
        let fields: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)?;
        let mut merged = serde_json::to_value(self)?;
        if let Some(base) = merged.as_object_mut() {
            base.extend(fields);
        }
        Ok(serde_json::from_value(merged)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ProtocolError> {
        bb84::validate_qubit_count(self.n_bits)?;
        validate_prob(self.channel_error_rate)?;

        if self.trials == 0 {
            return Err(ProtocolError::InvalidTrialCount(self.trials));
        }

        Ok(())
    }

    pub fn channel(&self) -> Result<QuantumChannel, ProtocolError> {
        Ok(QuantumChannel::bit_flip(self.channel_error_rate)?)
    }

    pub fn random_source(&self) -> RandomSource {
        RandomSource::new(self.seed)
    }

    /// Runs a single session with these parameters.
    ///
    /// The session runner rejects an invalid qubit count or channel rate;
    /// `trials` plays no part here.
    pub fn run(&self) -> Result<SessionResult, ProtocolError> {
        let mut source = self.random_source();
        bb84::run_session_with(
            &mut source,
            self.n_bits,
            self.channel_error_rate,
            self.eve_present,
        )
    }
}
