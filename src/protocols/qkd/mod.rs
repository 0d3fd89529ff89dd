//! Quantum Key Distribution (QKD) Protocols.
//!
//! - **BB84**: The first quantum key distribution protocol.
//! - **eve**: Intercept-resend attack on the quantum channel.
//! - **sifting**: Basis reconciliation and error estimation.
//! - **analysis**: Key statistics and security assessment.

pub mod analysis;
pub mod bb84;
pub mod eve;
pub mod sifting;
