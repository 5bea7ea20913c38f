//! Seeded mock call records for demos and tests.
//!
//! Records are generated most-recent first, one per `spacing` going back
//! from `newest`. The same seed always yields the same records.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::{Duration, OffsetDateTime};

use super::CallDataProvider;
use crate::risk::{HIGH_RISK_SCORE, MEDIUM_RISK_SCORE};
use crate::types::{Anomaly, AnomalySeverity, CallData, CallStatus, TranscriptLine};

const ACTIVE_CALLS: usize = 2;

const AGENTS: [&str; 5] = ["agent-01", "agent-02", "agent-03", "agent-04", "agent-05"];

const ANOMALY_KINDS: [(&str, &str); 5] = [
    ("Urgency Pressure", "Caller insisted on immediate action or payment"),
    ("Credential Request", "Caller asked for a password, PIN or one-time code"),
    ("Impersonation", "Caller claimed to represent a bank or government agency"),
    ("Payment Redirect", "Caller requested payment by gift card or wire transfer"),
    ("Voice Stress", "Elevated stress markers in caller speech"),
];

const BENIGN_SCRIPT: [(&str, &str); 4] = [
    ("Agent", "Thank you for calling, how can I help you today?"),
    ("Customer", "Hi, I'd like to check the status of my order."),
    ("Agent", "Of course. Can you confirm the name on the account?"),
    ("Customer", "Sure, it's under Jordan. Thanks for the help."),
];

const SCAM_SCRIPT: [(&str, &str); 4] = [
    ("Agent", "Thank you for calling, how can I help you today?"),
    ("Customer", "This is the tax office. Your account has an outstanding balance."),
    ("Agent", "I can help look into that. Which department are you with?"),
    ("Customer", "There's no time. Buy gift cards now or a warrant will be issued."),
];

/// Provider over generated records.
pub struct MockCallProvider {
    calls: Vec<CallData>,
}

impl MockCallProvider {
    #[must_use]
    pub fn seeded(seed: u64, count: usize, newest: OffsetDateTime, spacing: Duration) -> Self {
        Self { calls: generate_calls(seed, count, newest, spacing) }
    }
}

impl CallDataProvider for MockCallProvider {
    fn calls(&self) -> Vec<CallData> {
        self.calls.clone()
    }

    fn call(&self, id: &str) -> Option<CallData> {
        self.calls.iter().find(|c| c.id == id).cloned()
    }
}

#[must_use]
pub fn generate_calls(seed: u64, count: usize, newest: OffsetDateTime, spacing: Duration) -> Vec<CallData> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|index| {
            let start_time = newest - spacing * u32::try_from(index).unwrap_or(u32::MAX);
            generate_call(&mut rng, index, start_time)
        })
        .collect()
}

fn generate_call(rng: &mut StdRng, index: usize, start_time: OffsetDateTime) -> CallData {
    let risk_score: u8 = rng.random_range(0..=100);
    let status = if index < ACTIVE_CALLS {
        CallStatus::Active
    } else if risk_score > HIGH_RISK_SCORE {
        CallStatus::Flagged
    } else {
        CallStatus::Completed
    };

    // Riskier calls skew negative.
    let sentiment_score = (rng.random_range(-1.0..=1.0) - f64::from(risk_score) / 100.0).clamp(-1.0, 1.0);

    let anomaly_count = match risk_score {
        s if s > HIGH_RISK_SCORE => rng.random_range(2..=3),
        s if s > MEDIUM_RISK_SCORE => 1,
        _ => 0,
    };
    let anomalies = (0..anomaly_count)
        .map(|n| {
            let (kind, description) = ANOMALY_KINDS[rng.random_range(0..ANOMALY_KINDS.len())];
            Anomaly {
                id: format!("ANM-{index:04}-{n}"),
                kind: kind.into(),
                description: description.into(),
                severity: severity_for(risk_score, n),
                confidence: rng.random_range(0.55..=0.99),
            }
        })
        .collect();

    let script = if risk_score > HIGH_RISK_SCORE { &SCAM_SCRIPT } else { &BENIGN_SCRIPT };
    let transcript = script
        .iter()
        .enumerate()
        .map(|(i, (speaker, text))| TranscriptLine {
            speaker: (*speaker).into(),
            text: (*text).into(),
            timestamp: format!("00:{:02}", i * 7),
        })
        .collect();

    CallData {
        id: format!("CALL-{:04}", 1000 + index),
        agent_id: AGENTS[rng.random_range(0..AGENTS.len())].into(),
        start_time,
        duration: rng.random_range(30..=900),
        status,
        risk_score,
        sentiment_score,
        anomalies,
        transcript,
    }
}

fn severity_for(risk_score: u8, nth: usize) -> AnomalySeverity {
    match (risk_score, nth) {
        (s, 0) if s > 90 => AnomalySeverity::Critical,
        (s, _) if s > HIGH_RISK_SCORE => AnomalySeverity::High,
        (s, _) if s > MEDIUM_RISK_SCORE => AnomalySeverity::Medium,
        _ => AnomalySeverity::Low,
    }
}

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;
