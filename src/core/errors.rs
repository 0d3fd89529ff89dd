use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("Invalid probability: {0}. Must be between 0.0 and 1.0")]
    InvalidProbability(f64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SiftingError {
    #[error("Sequence `{sequence}` has length {got}, expected {expected}")]
    LengthMismatch {
        sequence: &'static str,
        expected: usize,
        got: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimationError {
    #[error("Sifted key is empty: no positions with matching bases")]
    EmptySiftedKey,

    #[error("Sifted keys differ in length (sender: {sender}, receiver: {receiver})")]
    LengthMismatch { sender: usize, receiver: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Number of qubits must be greater than zero, got {0}")]
    InvalidQubitCount(usize),

    #[error("Number of trials must be greater than zero, got {0}")]
    InvalidTrialCount(usize),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Sifting error: {0}")]
    Sifting(#[from] SiftingError),

    #[error("Estimation error: {0}")]
    Estimation(#[from] EstimationError),
}

impl ProtocolError {
    /// True for errors caused by caller-supplied parameters rather than by the engine.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidQubitCount(_)
                | Self::InvalidTrialCount(_)
                | Self::Channel(ChannelError::InvalidProbability(_))
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to parse environment variables: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ProtocolError),
}
