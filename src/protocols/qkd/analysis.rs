//! Post-processing of BB84 sessions: key statistics, security assessment and
//! comparison against the eavesdropper-free baseline.

use crate::QuantumChannel;
use crate::errors::{ChannelError, ProtocolError};
use crate::protocols::qkd::bb84::{self, SessionResult};
use crate::protocols::qkd::eve::INTERCEPT_RESEND_ERROR_RATE;
use crate::random::RandomSource;
use serde::Serialize;
use std::fmt;

/// Error rates below this are considered secure.
pub const HIGH_SECURITY_THRESHOLD: f64 = 0.10;
/// Error rates below this (and above [`HIGH_SECURITY_THRESHOLD`]) are
/// attributed to noise or minor interference.
pub const MEDIUM_SECURITY_THRESHOLD: f64 = 0.20;
/// Error rates above this are read as an eavesdropper on the line.
pub const EVE_DETECTION_THRESHOLD: f64 = 0.15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SecurityLevel {
    High,
    Medium,
    Low,
}

impl SecurityLevel {
    pub fn from_error_rate(error_rate: f64) -> Self {
        if error_rate < HIGH_SECURITY_THRESHOLD {
            SecurityLevel::High
        } else if error_rate < MEDIUM_SECURITY_THRESHOLD {
            SecurityLevel::Medium
        } else {
            SecurityLevel::Low
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SecurityLevel::High => "Low error rate indicates secure transmission.",
            SecurityLevel::Medium => "Moderate error rate - possible noise or minor interference.",
            SecurityLevel::Low => "High error rate indicates possible eavesdropping.",
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SecurityLevel::High => "High Security",
            SecurityLevel::Medium => "Medium Security",
            SecurityLevel::Low => "Low Security",
        };
        f.write_str(s)
    }
}

/// Whether an observed error rate flags an eavesdropper.
pub fn eve_detected(error_rate: f64) -> bool {
    error_rate > EVE_DETECTION_THRESHOLD
}

/// Detection verdict of a session, checked against whether Eve was really
/// there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DetectionOutcome {
    /// Eve present and the error rate gave her away
    Detected,
    /// Eve present but the error rate stayed under the threshold
    Missed,
    /// No Eve, but the error rate is high enough to raise an alarm
    FalseAlarm,
    /// No Eve and a low error rate
    Secure,
}

impl DetectionOutcome {
    pub fn new(error_rate: f64, eve_present: bool) -> Self {
        match (eve_present, eve_detected(error_rate)) {
            (true, true) => DetectionOutcome::Detected,
            (true, false) => DetectionOutcome::Missed,
            (false, true) => DetectionOutcome::FalseAlarm,
            (false, false) => DetectionOutcome::Secure,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DetectionOutcome::Detected => "High error rate detected. Eve's presence is confirmed.",
            DetectionOutcome::Missed => {
                "Eve is present, but was not detected due to insufficient error rate."
            }
            DetectionOutcome::FalseAlarm => {
                "High error rate detected. This may indicate channel noise or an undetected eavesdropper."
            }
            DetectionOutcome::Secure => "Low error rate: no eavesdropper detected.",
        }
    }
}

/// Summary figures of one session.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KeyStatistics {
    pub total_bits: usize,
    pub sifted_length: usize,
    pub error_count: usize,
    /// `None` for an empty sifted key
    pub error_rate: Option<f64>,
    /// Fraction of transmitted qubits that survived sifting
    pub key_utilization: f64,
    /// Fraction of sifted positions where both keys agree
    pub bit_agreement: Option<f64>,
    pub security_level: Option<SecurityLevel>,
    /// Error rate above [`EVE_DETECTION_THRESHOLD`]; `None` for an empty key
    pub eve_detected: Option<bool>,
    pub detection: Option<DetectionOutcome>,
}

impl KeyStatistics {
    pub fn from_session(result: &SessionResult) -> Self {
        let error_rate = result.error_rate();

        Self {
            total_bits: result.n_bits(),
            sifted_length: result.sifted_length(),
            error_count: result.error_count(),
            error_rate,
            key_utilization: result.sifted_length() as f64 / result.n_bits() as f64,
            bit_agreement: error_rate.map(|q| 1.0 - q),
            security_level: error_rate.map(SecurityLevel::from_error_rate),
            eve_detected: error_rate.map(eve_detected),
            detection: error_rate.map(|q| DetectionOutcome::new(q, result.eve_present())),
        }
    }
}

impl From<&SessionResult> for KeyStatistics {
    fn from(result: &SessionResult) -> Self {
        Self::from_session(result)
    }
}

/// Theoretical sifted-key error rate.
///
/// Without Eve this is the channel flip probability `p`. With Eve her 25%
/// disturbance composes with the channel; a flip on top of one of her errors
/// restores the bit, giving `0.25 (1 - p) + 0.75 p`.
pub fn expected_error_rate(
    channel_error_rate: f64,
    eve_present: bool,
) -> Result<f64, ChannelError> {
    let channel = QuantumChannel::bit_flip(channel_error_rate)?;

    if !eve_present {
        return Ok(channel.flip_probability());
    }

    let eve = QuantumChannel::bit_flip(INTERCEPT_RESEND_ERROR_RATE)?;
    Ok(eve.compose(&channel).flip_probability())
}

/// The same parameters run with and without an eavesdropper.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EveComparison {
    pub without_eve: SessionResult,
    pub with_eve: SessionResult,
}

impl EveComparison {
    /// Increase in observed error rate caused by Eve.
    ///
    /// `None` if either sifted key is empty.
    pub fn error_rate_increase(&self) -> Option<f64> {
        Some(self.with_eve.error_rate()? - self.without_eve.error_rate()?)
    }

    pub fn statistics(&self) -> (KeyStatistics, KeyStatistics) {
        (
            KeyStatistics::from_session(&self.without_eve),
            KeyStatistics::from_session(&self.with_eve),
        )
    }
}

/// Runs two independent sessions, without then with Eve.
pub fn compare_eavesdropping(
    source: &mut RandomSource,
    n_bits: usize,
    channel_error_rate: f64,
) -> Result<EveComparison, ProtocolError> {
    let without_eve = bb84::run_session_with(source, n_bits, channel_error_rate, false)?;
    let with_eve = bb84::run_session_with(source, n_bits, channel_error_rate, true)?;

    Ok(EveComparison {
        without_eve,
        with_eve,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_thresholds() {
        assert_eq!(SecurityLevel::from_error_rate(0.0), SecurityLevel::High);
        assert_eq!(SecurityLevel::from_error_rate(0.099), SecurityLevel::High);
        assert_eq!(SecurityLevel::from_error_rate(0.10), SecurityLevel::Medium);
        assert_eq!(SecurityLevel::from_error_rate(0.199), SecurityLevel::Medium);
        assert_eq!(SecurityLevel::from_error_rate(0.20), SecurityLevel::Low);
        assert_eq!(SecurityLevel::from_error_rate(0.5), SecurityLevel::Low);
        assert_eq!(SecurityLevel::Low.to_string(), "Low Security");
    }

    #[test]
    fn detection_threshold() {
        assert!(!eve_detected(0.149));
        assert!(!eve_detected(EVE_DETECTION_THRESHOLD));
        assert!(eve_detected(0.151));

        assert_eq!(DetectionOutcome::new(0.151, true), DetectionOutcome::Detected);
        assert_eq!(DetectionOutcome::new(0.15, true), DetectionOutcome::Missed);
        assert_eq!(DetectionOutcome::new(0.151, false), DetectionOutcome::FalseAlarm);
        assert_eq!(DetectionOutcome::new(0.149, false), DetectionOutcome::Secure);
    }

    #[test]
    fn expected_rates() {
        assert_eq!(expected_error_rate(0.05, false), Ok(0.05));
        assert_eq!(expected_error_rate(0.0, true), Ok(0.25));

        let with_noise = expected_error_rate(0.1, true).unwrap();
        assert!((with_noise - 0.3).abs() < 1e-12);

        assert!(expected_error_rate(1.5, true).is_err());
    }

    #[test]
    fn statistics_of_a_session() {
        let res = bb84::run_session_seeded(10, 400, 0.0, false).unwrap();
        let stats = KeyStatistics::from(&res);

        assert_eq!(stats.total_bits, 400);
        assert_eq!(stats.sifted_length, res.sifted_length());
        assert_eq!(stats.error_rate, Some(0.0));
        assert_eq!(stats.bit_agreement, Some(1.0));
        assert_eq!(stats.security_level, Some(SecurityLevel::High));
        assert_eq!(stats.eve_detected, Some(false));
        assert_eq!(stats.detection, Some(DetectionOutcome::Secure));
        assert!((stats.key_utilization - 0.5).abs() < 0.1);
    }

    #[test]
    fn statistics_of_an_empty_key() {
        let res = (0..64)
            .map(|seed| bb84::run_session_seeded(seed, 1, 0.0, true).unwrap())
            .find(SessionResult::is_key_empty)
            .unwrap();
        let stats = KeyStatistics::from_session(&res);

        assert_eq!(stats.key_utilization, 0.0);
        assert_eq!(stats.error_rate, None);
        assert_eq!(stats.bit_agreement, None);
        assert_eq!(stats.security_level, None);
        assert_eq!(stats.eve_detected, None);
        assert_eq!(stats.detection, None);
    }

    #[test]
    fn comparison_shows_eve() {
        let mut source = RandomSource::from_seed(12);
        let cmp = compare_eavesdropping(&mut source, 4_000, 0.0).unwrap();

        assert!(!cmp.without_eve.eve_present());
        assert!(cmp.with_eve.eve_present());
        assert_eq!(cmp.without_eve.error_rate(), Some(0.0));

        let increase = cmp.error_rate_increase().unwrap();
        assert!(increase > 0.15, "increase = {increase}");

        let (clean, tapped) = cmp.statistics();
        assert_eq!(clean.security_level, Some(SecurityLevel::High));
        assert_eq!(tapped.security_level, Some(SecurityLevel::Low));
        assert_eq!(clean.detection, Some(DetectionOutcome::Secure));
        assert_eq!(tapped.detection, Some(DetectionOutcome::Detected));
    }
}
