//! Basis reconciliation and error estimation.
//!
//! After transmission Alice and Bob announce their bases over the public
//! channel and keep only the positions where they agree. The error rate is
//! then measured by comparing the whole sifted key. A real deployment would
//! disclose and discard only a random subsample; this simulator compares the
//! full key so the reported rate matches the theoretical figures exactly.

use crate::Basis;
use crate::errors::{EstimationError, SiftingError};

/// Indices where both parties used the same basis, in ascending order.
pub fn matching_indices(
    sender_bases: &[Basis],
    receiver_bases: &[Basis],
) -> Result<Vec<usize>, SiftingError> {
    check_len("receiver_bases", sender_bases.len(), receiver_bases.len())?;

    Ok(sender_bases
        .iter()
        .zip(receiver_bases)
        .enumerate()
        .filter_map(|(i, (a, b))| if a == b { Some(i) } else { None })
        .collect())
}

/// Keeps the bits at positions where the bases agree.
///
/// Returns `(sifted_sender_key, sifted_receiver_key)`. All four sequences must
/// have the same length.
pub fn sift(
    sender_bases: &[Basis],
    receiver_bases: &[Basis],
    sender_bits: &[bool],
    receiver_bits: &[bool],
) -> Result<(Vec<bool>, Vec<bool>), SiftingError> {
    let n = sender_bases.len();
    check_len("sender_bits", n, sender_bits.len())?;
    check_len("receiver_bits", n, receiver_bits.len())?;

    let kept = matching_indices(sender_bases, receiver_bases)?;

    let sender_key = kept.iter().map(|&i| sender_bits[i]).collect();
    let receiver_key = kept.iter().map(|&i| receiver_bits[i]).collect();

    Ok((sender_key, receiver_key))
}

/// Number of positions where the two keys differ.
pub fn count_errors(
    sifted_sender_key: &[bool],
    sifted_receiver_key: &[bool],
) -> Result<usize, EstimationError> {
    if sifted_sender_key.len() != sifted_receiver_key.len() {
        return Err(EstimationError::LengthMismatch {
            sender: sifted_sender_key.len(),
            receiver: sifted_receiver_key.len(),
        });
    }

    Ok(sifted_sender_key
        .iter()
        .zip(sifted_receiver_key)
        .filter(|(a, b)| a != b)
        .count())
}

/// Fraction of differing positions over the full sifted key.
///
/// An empty key has no defined error rate and yields
/// [`EstimationError::EmptySiftedKey`].
pub fn estimate_error(
    sifted_sender_key: &[bool],
    sifted_receiver_key: &[bool],
) -> Result<f64, EstimationError> {
    let errors = count_errors(sifted_sender_key, sifted_receiver_key)?;

    if sifted_sender_key.is_empty() {
        return Err(EstimationError::EmptySiftedKey);
    }

    Ok(errors as f64 / sifted_sender_key.len() as f64)
}

fn check_len(sequence: &'static str, expected: usize, got: usize) -> Result<(), SiftingError> {
    if expected != got {
        return Err(SiftingError::LengthMismatch {
            sequence,
            expected,
            got,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Basis::{Computational as C, Hadamard as H};

    #[test]
    fn keeps_only_matching_positions() {
        let (alice, bob) = sift(
            &[C, H, C, H],
            &[C, C, H, H],
            &[false, true, false, true],
            &[false, false, true, true],
        )
        .unwrap();

        assert_eq!(alice, vec![false, true]);
        assert_eq!(bob, vec![false, true]);
        assert_eq!(matching_indices(&[C, H, C, H], &[C, C, H, H]).unwrap(), vec![0, 3]);
    }

    #[test]
    fn preserves_order() {
        let bases = [H, C, H, C, H];
        let bits = [true, false, false, true, true];

        let (alice, bob) = sift(&bases, &bases, &bits, &bits).unwrap();
        assert_eq!(alice, bits.to_vec());
        assert_eq!(bob, bits.to_vec());
    }

    #[test]
    fn no_match_gives_empty_keys() {
        let (alice, bob) = sift(&[C], &[H], &[true], &[false]).unwrap();

        assert!(alice.is_empty());
        assert!(bob.is_empty());
        assert_eq!(estimate_error(&alice, &bob), Err(EstimationError::EmptySiftedKey));
    }

    #[test]
    fn rejects_mismatched_lengths() {
        assert_eq!(
            sift(&[C, H], &[C], &[true, true], &[true, true]),
            Err(SiftingError::LengthMismatch {
                sequence: "receiver_bases",
                expected: 2,
                got: 1
            })
        );
        assert!(sift(&[C, H], &[C, H], &[true], &[true, true]).is_err());
        assert!(sift(&[C, H], &[C, H], &[true, true], &[]).is_err());
    }

    #[test]
    fn error_rate_is_fraction_of_differences() {
        let alice = [true, true, false, false];
        let bob = [true, false, false, true];

        assert_eq!(count_errors(&alice, &bob), Ok(2));
        assert_eq!(estimate_error(&alice, &bob), Ok(0.5));
        assert_eq!(estimate_error(&alice, &alice), Ok(0.0));
        assert_eq!(
            estimate_error(&alice, &bob[..3]),
            Err(EstimationError::LengthMismatch {
                sender: 4,
                receiver: 3
            })
        );
    }
}
