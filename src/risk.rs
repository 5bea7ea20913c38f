//! Risk scoring — the single source of risk thresholds.
//!
//! DESIGN
//! ======
//! The conversation view turns a backend fraud confidence into a label and
//! score; the dashboard colours rows by score band. Both go through the
//! functions here so the boundaries cannot drift apart. Every boundary is a
//! strict `>`: a confidence of exactly 0.85 is SUSPICIOUS, a score of exactly
//! 80 is Medium.

use crate::types::{RiskAnalysis, RiskLabel};

/// Confidence above which a turn is labelled SCAM.
pub const SCAM_CONFIDENCE: f64 = 0.85;
/// Confidence above which a turn is labelled SUSPICIOUS.
pub const SUSPICIOUS_CONFIDENCE: f64 = 0.5;

/// Score above which a record is high risk.
pub const HIGH_RISK_SCORE: u8 = 80;
/// Score above which a record is medium risk.
pub const MEDIUM_RISK_SCORE: u8 = 50;

/// Reasoning attached to risk derived from the chat backend's fraud model.
pub const SERVER_MODEL_REASONING: &str = "Server-side fraud model";

/// Coarse colour band shared by the phone header and dashboard badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[must_use]
pub fn label_for_confidence(confidence: f64) -> RiskLabel {
    if confidence > SCAM_CONFIDENCE {
        RiskLabel::Scam
    } else if confidence > SUSPICIOUS_CONFIDENCE {
        RiskLabel::Suspicious
    } else {
        RiskLabel::Safe
    }
}

/// `round(confidence × 100)`, with the confidence clamped to `[0, 1]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score_for_confidence(confidence: f64) -> u8 {
    if confidence.is_nan() {
        return 0;
    }
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Risk verdict for one backend-reported fraud confidence.
#[must_use]
pub fn risk_from_confidence(confidence: f64) -> RiskAnalysis {
    RiskAnalysis::new(
        score_for_confidence(confidence),
        label_for_confidence(confidence),
        SERVER_MODEL_REASONING,
    )
}

#[must_use]
pub fn risk_band(score: u8) -> RiskBand {
    if score > HIGH_RISK_SCORE {
        RiskBand::High
    } else if score > MEDIUM_RISK_SCORE {
        RiskBand::Medium
    } else {
        RiskBand::Low
    }
}

/// Band for a label, used where only the label is known (the phone header).
#[must_use]
pub fn label_band(label: RiskLabel) -> RiskBand {
    match label {
        RiskLabel::Scam => RiskBand::High,
        RiskLabel::Suspicious => RiskBand::Medium,
        RiskLabel::Safe | RiskLabel::Unknown => RiskBand::Low,
    }
}

#[cfg(test)]
#[path = "risk_test.rs"]
mod tests;
