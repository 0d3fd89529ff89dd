use crate::core::state::Basis;

/// Projective measurement of a single qubit in one of the two BB84 bases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Measurement {
    /// Basis the measuring device is aligned with
    pub basis: Basis,
}

impl Measurement {
    pub fn new(basis: Basis) -> Self {
        Self { basis }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementResult {
    /// Measured bit value
    pub bit: bool,
    /// Whether the measurement basis equals the preparation basis
    pub basis_matched: bool,
}
