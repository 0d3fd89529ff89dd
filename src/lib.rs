//! BB84 quantum key distribution simulator.
//!
//! Qubits are modelled abstractly as a (bit, basis) pair. Measuring in the
//! wrong basis yields a uniformly random bit, channel noise flips bits, and an
//! optional intercept-resend eavesdropper measures and re-prepares every
//! qubit. All randomness flows through an explicit [`RandomSource`].
//!
//! ```
//! use bb84_sim::protocols::bb84;
//!
//! let result = bb84::run_session_seeded(42, 500, 0.0, false).unwrap();
//! assert_eq!(result.sifted_sender_key(), result.sifted_receiver_key());
//! ```

pub mod config;
mod core;
pub mod protocols;
mod random;
mod simulator;

pub use crate::config::SimulationConfig;
pub(crate) use crate::core::validate_prob;
pub use crate::core::{Basis, Measurement, MeasurementResult, QuantumChannel, QubitState, errors};
pub use crate::random::RandomSource;
pub use crate::simulator::{QuantumSimulator, TrialSummary};
