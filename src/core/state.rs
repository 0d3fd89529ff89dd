use crate::core::measurements::{Measurement, MeasurementResult};
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Preparation / measurement basis of a single qubit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Z basis (Computational) -> {|0>, |1>}.
    Computational,
    /// X basis (Hadamard) -> {|+>, |->}.
    Hadamard,
}

impl Basis {
    /// Short symbol used when printing basis sequences.
    pub fn symbol(self) -> char {
        match self {
            Basis::Computational => '+',
            Basis::Hadamard => 'x',
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Computational => f.write_str("Computational"),
            Basis::Hadamard => f.write_str("Hadamard"),
        }
    }
}

/// A qubit in flight: the classical bit it carries and the basis it was
/// prepared in.
///
/// States are not copied. A state is created by [`QubitState::prepare`],
/// moved through the channel (and possibly an eavesdropper), and consumed by
/// [`QubitState::measure`].
#[derive(Debug, PartialEq, Eq)]
pub struct QubitState {
    bit: bool,
    basis: Basis,
}

impl QubitState {
    /// Encodes `bit` in `basis`.
    ///
    /// Computational: 0 -> |0>, 1 -> |1>. Hadamard: 0 -> |+>, 1 -> |->.
    pub fn prepare(bit: bool, basis: Basis) -> Self {
        Self { bit, basis }
    }

    pub fn bit(&self) -> bool {
        self.bit
    }

    pub fn basis(&self) -> Basis {
        self.basis
    }

    /// Ket label of the encoded state.
    pub fn label(&self) -> &'static str {
        match (self.basis, self.bit) {
            (Basis::Computational, false) => "|0>",
            (Basis::Computational, true) => "|1>",
            (Basis::Hadamard, false) => "|+>",
            (Basis::Hadamard, true) => "|->",
        }
    }

    /// Flips the encoded bit, keeping the basis.
    pub(crate) fn flipped(self) -> Self {
        Self {
            bit: !self.bit,
            basis: self.basis,
        }
    }

    /// Measures the state, consuming it.
    ///
    /// Measuring in the preparation basis returns the encoded bit. Measuring
    /// in the conjugate basis returns a uniformly random bit.
    pub fn measure(
        self,
        measurement: &Measurement,
        source: &mut RandomSource,
    ) -> MeasurementResult {
        let basis_matched = measurement.basis == self.basis;
        let bit = if basis_matched {
            self.bit
        } else {
            source.random_bit()
        };

        MeasurementResult { bit, basis_matched }
    }
}

impl fmt::Display for QubitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
