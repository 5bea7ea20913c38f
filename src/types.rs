//! Shared data model: chat turns, risk results and dashboard call records.
//!
//! Wire names follow the JSON the chat backend, log sink and dashboard feed
//! already speak (camelCase keys, upper-case risk labels).

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// First bot line of every screening session.
pub const INITIAL_GREETING: &str = "Hello, you've reached CallSentry. The subscriber is currently unavailable. \
                                    Please state your name and the reason for your call.";

/// Reasoning shown before the first scored turn.
pub const MONITORING_REASONING: &str = "Monitoring...";

const CONVERSATION_ID_PREFIX: &str = "call-";
const CONVERSATION_ID_LEN: usize = 9;

// =============================================================================
// CHAT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One line of a screening conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ChatMessage {
    #[must_use]
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4().to_string(), sender, text: text.into(), timestamp: OffsetDateTime::now_utc() }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    #[must_use]
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    /// The synthetic greeting that seeds every session transcript.
    #[must_use]
    pub fn greeting() -> Self {
        Self { id: "init".into(), ..Self::bot(INITIAL_GREETING) }
    }
}

/// Opaque per-session token correlating every chat request of one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Generate a fresh `call-xxxxxxxxx` token (nine base-36 characters).
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..CONVERSATION_ID_LEN)
            .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
            .collect();
        Self(format!("{CONVERSATION_ID_PREFIX}{suffix}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConversationId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// RISK
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLabel {
    Safe,
    Suspicious,
    Scam,
    Unknown,
}

impl RiskLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Suspicious => "SUSPICIOUS",
            Self::Scam => "SCAM",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest risk verdict for a conversation. Each new result replaces the last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    /// 0–100, higher is riskier.
    pub score: u8,
    pub label: RiskLabel,
    pub reasoning: String,
}

impl RiskAnalysis {
    #[must_use]
    pub fn new(score: u8, label: RiskLabel, reasoning: impl Into<String>) -> Self {
        Self { score: score.min(100), label, reasoning: reasoning.into() }
    }

    /// Risk shown before any turn has been scored.
    #[must_use]
    pub fn monitoring() -> Self {
        Self::new(0, RiskLabel::Safe, MONITORING_REASONING)
    }

    /// Risk shown when the generative service could not produce a verdict.
    #[must_use]
    pub fn unknown(reasoning: impl Into<String>) -> Self {
        Self::new(0, RiskLabel::Unknown, reasoning)
    }
}

impl Default for RiskAnalysis {
    fn default() -> Self {
        Self::monitoring()
    }
}

/// Body posted to the optional log sink when a session is archived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerLogPayload {
    pub conversation_id: ConversationId,
    pub messages: Vec<ChatMessage>,
    pub final_risk_analysis: RiskAnalysis,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

// =============================================================================
// CALL RECORDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallStatus {
    Active,
    Completed,
    Flagged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub severity: AnomalySeverity,
    /// 0–1.
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub speaker: String,
    pub text: String,
    pub timestamp: String,
}

/// A recorded call as shown on the dashboard. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallData {
    pub id: String,
    pub agent_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    /// Seconds.
    pub duration: u32,
    pub status: CallStatus,
    /// 0–100. Feeds may send fractional scores; they are rounded and clamped.
    #[serde(deserialize_with = "score_from_number")]
    pub risk_score: u8,
    /// -1 (negative) to 1 (positive).
    pub sentiment_score: f64,
    pub anomalies: Vec<Anomaly>,
    pub transcript: Vec<TranscriptLine>,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn score_from_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom(format!("risk score is not a number: {raw}")));
    }
    Ok(raw.clamp(0.0, 100.0).round() as u8)
}

/// Structured verdict returned by the detailed call analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAnalysis {
    pub summary: String,
    pub root_cause: String,
    pub recommendation: String,
    pub compliance_check: bool,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
