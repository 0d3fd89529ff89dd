//! BB84 Quantum Key Distribution Protocol.
//!
//! Alice encodes random bits in random bases and sends them to Bob, who
//! measures each one in a basis of his own choosing. Positions where the bases
//! agree form the sifted key. An intercept-resend eavesdropper may sit on the
//! line; she acts before the channel noise, which models cable and detector
//! noise downstream of any tap.

use crate::errors::{EstimationError, ProtocolError};
use crate::protocols::qkd::eve::Eavesdropper;
use crate::protocols::qkd::sifting;
use crate::random::RandomSource;
use crate::{Basis, Measurement, QuantumChannel, QubitState};
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

/// BB84 results
///
/// Holds every sequence the session actually used so nothing has to be
/// regenerated to explain the outcome. Read-only; run a new session for a new
/// trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResult {
    n_bits: usize,
    channel_error_rate: f64,
    eve_present: bool,
    #[serde(serialize_with = "serialize_bits")]
    sender_bits: Vec<bool>,
    #[serde(serialize_with = "serialize_bases")]
    sender_bases: Vec<Basis>,
    #[serde(serialize_with = "serialize_bases")]
    receiver_bases: Vec<Basis>,
    #[serde(serialize_with = "serialize_bits")]
    receiver_bits: Vec<bool>,
    sifted_indices: Vec<usize>,
    #[serde(serialize_with = "serialize_bits")]
    sifted_sender_key: Vec<bool>,
    #[serde(serialize_with = "serialize_bits")]
    sifted_receiver_key: Vec<bool>,
    sifted_length: usize,
    error_count: usize,
    error_rate: Option<f64>,
    intercepted_count: usize,
}

impl SessionResult {
    /// Number of qubits transmitted.
    pub fn n_bits(&self) -> usize {
        self.n_bits
    }

    pub fn channel_error_rate(&self) -> f64 {
        self.channel_error_rate
    }

    pub fn eve_present(&self) -> bool {
        self.eve_present
    }

    pub fn sender_bits(&self) -> &[bool] {
        &self.sender_bits
    }

    pub fn sender_bases(&self) -> &[Basis] {
        &self.sender_bases
    }

    pub fn receiver_bases(&self) -> &[Basis] {
        &self.receiver_bases
    }

    pub fn receiver_bits(&self) -> &[bool] {
        &self.receiver_bits
    }

    /// Positions retained by sifting, ascending.
    pub fn sifted_indices(&self) -> &[usize] {
        &self.sifted_indices
    }

    pub fn sifted_sender_key(&self) -> &[bool] {
        &self.sifted_sender_key
    }

    pub fn sifted_receiver_key(&self) -> &[bool] {
        &self.sifted_receiver_key
    }

    pub fn sifted_length(&self) -> usize {
        self.sifted_length
    }

    /// Number of differing positions in the sifted keys.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Observed error rate over the full sifted key.
    ///
    /// `None` when the sifted key is empty.
    pub fn error_rate(&self) -> Option<f64> {
        self.error_rate
    }

    /// Error rate with the empty-key case read as 0.
    pub fn error_rate_or_zero(&self) -> f64 {
        self.error_rate.unwrap_or(0.0)
    }

    pub fn is_key_empty(&self) -> bool {
        self.sifted_length == 0
    }

    /// Whether both parties ended up with the same key.
    pub fn keys_agree(&self) -> bool {
        self.error_count == 0
    }

    /// Qubits measured by the eavesdropper (0 without one).
    pub fn intercepted_count(&self) -> usize {
        self.intercepted_count
    }
}

/// Runs one BB84 session using fresh OS entropy.
pub fn run_session(
    n_bits: usize,
    channel_error_rate: f64,
    eve_present: bool,
) -> Result<SessionResult, ProtocolError> {
    let mut source = RandomSource::from_entropy();
    run_session_with(&mut source, n_bits, channel_error_rate, eve_present)
}

/// Runs one BB84 session drawing from a source seeded with `seed`.
pub fn run_session_seeded(
    seed: u64,
    n_bits: usize,
    channel_error_rate: f64,
    eve_present: bool,
) -> Result<SessionResult, ProtocolError> {
    let mut source = RandomSource::from_seed(seed);
    run_session_with(&mut source, n_bits, channel_error_rate, eve_present)
}

/// Runs one BB84 session drawing from `source`.
pub fn run_session_with(
    source: &mut RandomSource,
    n_bits: usize,
    channel_error_rate: f64,
    eve_present: bool,
) -> Result<SessionResult, ProtocolError> {
    let channel = QuantumChannel::bit_flip(channel_error_rate)?;

    run(source, n_bits, &channel, eve_present)
}

/// Runs BB84 protocol
pub fn run(
    source: &mut RandomSource,
    num_qubits: usize,
    channel: &QuantumChannel,
    eve_present: bool,
) -> Result<SessionResult, ProtocolError> {
    validate_qubit_count(num_qubits)?;

    // Alice chooses her bits and bases up front
    let sender_bits = source.generate_bits(num_qubits);
    let sender_bases = source.generate_bases(num_qubits);

    let mut eve = eve_present.then(Eavesdropper::new);
    let mut receiver_bases = Vec::with_capacity(num_qubits);
    let mut receiver_bits = Vec::with_capacity(num_qubits);

    for (&a_bit, &a_basis) in sender_bits.iter().zip(&sender_bases) {
        let mut state = QubitState::prepare(a_bit, a_basis);

        if let Some(eve) = eve.as_mut() {
            state = eve.intercept(state, source);
        }

        state = channel.transmit(state, source);

        // Bob measures
        let b_basis = source.random_basis();
        let res = state.measure(&Measurement::new(b_basis), source);

        receiver_bases.push(b_basis);
        receiver_bits.push(res.bit);
    }

    // Sifting stage
    let sifted_indices = sifting::matching_indices(&sender_bases, &receiver_bases)?;
    let (sifted_sender_key, sifted_receiver_key) =
        sifting::sift(&sender_bases, &receiver_bases, &sender_bits, &receiver_bits)?;
    let error_count = sifting::count_errors(&sifted_sender_key, &sifted_receiver_key)?;

    let error_rate = match sifting::estimate_error(&sifted_sender_key, &sifted_receiver_key) {
        Ok(rate) => Some(rate),
        Err(EstimationError::EmptySiftedKey) => {
            warn!(num_qubits, "no matching bases, sifted key is empty");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let sifted_length = sifted_sender_key.len();
    let intercepted_count = eve.map_or(0, |eve| eve.intercepted_count());

    debug!(
        n_bits = num_qubits,
        eve_present,
        sifted_length,
        error_count,
        "BB84 session complete"
    );

    Ok(SessionResult {
        n_bits: num_qubits,
        channel_error_rate: channel.flip_probability(),
        eve_present,
        sender_bits,
        sender_bases,
        receiver_bases,
        receiver_bits,
        sifted_indices,
        sifted_sender_key,
        sifted_receiver_key,
        sifted_length,
        error_count,
        error_rate,
        intercepted_count,
    })
}

/// Renders a bit sequence as a string of `0` and `1`.
pub fn format_bits(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Renders a basis sequence with one symbol per basis (`+` or `x`).
pub fn format_bases(bases: &[Basis]) -> String {
    bases.iter().map(|b| b.symbol()).collect()
}

pub(crate) fn validate_qubit_count(n_bits: usize) -> Result<(), ProtocolError> {
    if n_bits == 0 {
        return Err(ProtocolError::InvalidQubitCount(n_bits));
    }
    Ok(())
}

fn serialize_bits<S: Serializer>(bits: &[bool], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_bits(bits))
}

fn serialize_bases<S: Serializer>(bases: &[Basis], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_bases(bases))
}
