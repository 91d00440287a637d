use serde::{Deserialize, Serialize};
use std::fmt;

/// Four-level verdict derived from a trust percentage.
///
/// Variants are ordered by severity, so `Safe < Dangerous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Suspicious,
    Risky,
    Dangerous,
}

impl RiskLevel {
    /// Bucket a trust percentage. Each bucket includes its lower bound.
    pub fn from_trust_percent(trust_percent: u8) -> Self {
        match trust_percent {
            t if t >= 80 => RiskLevel::Safe,
            t if t >= 50 => RiskLevel::Suspicious,
            t if t >= 20 => RiskLevel::Risky,
            _ => RiskLevel::Dangerous,
        }
    }

    pub fn from_probability(probability: f64) -> Self {
        Self::from_trust_percent(trust_percent(probability))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Suspicious => "suspicious",
            RiskLevel::Risky => "risky",
            RiskLevel::Dangerous => "dangerous",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `round(100 * (1 - probability))`, clamped to 0..=100. Halves round to even.
pub fn trust_percent(probability: f64) -> u8 {
    let trust = (100.0 * (1.0 - probability)).round_ties_even();
    if trust.is_nan() {
        return 0;
    }
    trust.clamp(0.0, 100.0) as u8
}

/// Round to three decimal places for presentation.
pub fn round_probability(probability: f64) -> f64 {
    (probability * 1000.0).round() / 1000.0
}
