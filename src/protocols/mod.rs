//! Quantum Cryptography Protocols.
//!
//! Currently the BB84 prepare-and-measure key distribution protocol together
//! with its eavesdropper model, sifting and analysis helpers.

pub mod qkd;
pub use qkd::{analysis, bb84, eve, sifting};
