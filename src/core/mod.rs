mod channels;
pub mod errors;
mod measurements;
mod state;

pub use channels::QuantumChannel;
pub(crate) use channels::validate_prob;
pub use measurements::{Measurement, MeasurementResult};
pub use state::{Basis, QubitState};
