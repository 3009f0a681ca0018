//! Safety Score & Risk Tiers
//!
//! Maps a phishing probability onto the 0-100 safety score shown to users
//! and the three-tier verdict derived from it.

use serde::{Deserialize, Serialize};

/// Scores at or above this are `Safe`
pub const SAFE_MIN_SCORE: u8 = 75;

/// Scores at or above this (and below `SAFE_MIN_SCORE`) are `Suspicious`
pub const SUSPICIOUS_MIN_SCORE: u8 = 50;

/// Safety score: `round((1 - p) * 100)`, clamped to 0..=100.
///
/// Non-finite probabilities are treated as certain phishing.
pub fn safety_score(phishing_probability: f64) -> u8 {
    if !phishing_probability.is_finite() {
        return 0;
    }
    let p = phishing_probability.clamp(0.0, 1.0);
    ((1.0 - p) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Three-tier verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Suspicious,
    Phishing,
}

impl RiskLevel {
    /// Tier for a safety score
    pub fn from_score(score: u8) -> Self {
        if score >= SAFE_MIN_SCORE {
            RiskLevel::Safe
        } else if score >= SUSPICIOUS_MIN_SCORE {
            RiskLevel::Suspicious
        } else {
            RiskLevel::Phishing
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Suspicious => "suspicious",
            RiskLevel::Phishing => "phishing",
        }
    }

    /// One-line verdict for display
    pub fn headline(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Looks safe",
            RiskLevel::Suspicious => "Be careful: this link looks suspicious",
            RiskLevel::Phishing => "Likely phishing: do not enter any information",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
