//! Dashboard — read-only call records and everything derived from them.
//!
//! DESIGN
//! ======
//! Records arrive through a [`CallDataProvider`]; nothing here writes back.
//! Derivations are pure functions over a slice of records:
//! - `risk_series`: chart points for the most recent calls, oldest first.
//! - `stat_cards`: headline counters with a tone per card.
//! - `call_rows`: table rows with the shared risk band per record.

pub mod mock;

use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::risk::{RiskBand, risk_band};
use crate::types::{AnomalySeverity, CallData, CallStatus};

/// Number of records plotted on the risk/sentiment chart.
pub const CHART_WINDOW: usize = 20;

// =============================================================================
// PROVIDER
// =============================================================================

/// Source of call records for the dashboard.
pub trait CallDataProvider: Send + Sync {
    /// All records, most recent first.
    fn calls(&self) -> Vec<CallData>;

    fn call(&self, id: &str) -> Option<CallData> {
        self.calls().into_iter().find(|c| c.id == id)
    }
}

/// Provider over a fixed, already-loaded list of records.
pub struct StaticCallProvider {
    calls: Vec<CallData>,
}

impl StaticCallProvider {
    #[must_use]
    pub fn new(calls: Vec<CallData>) -> Self {
        Self { calls }
    }
}

impl CallDataProvider for StaticCallProvider {
    fn calls(&self) -> Vec<CallData> {
        self.calls.clone()
    }

    fn call(&self, id: &str) -> Option<CallData> {
        self.calls.iter().find(|c| c.id == id).cloned()
    }
}

// =============================================================================
// CHART
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// `HH:MM` of the call start.
    pub time: String,
    pub risk: u8,
    /// Sentiment rescaled from `[-1, 1]` to `[0, 100]`.
    pub sentiment: f64,
}

#[must_use]
pub fn sentiment_percent(sentiment: f64) -> f64 {
    (sentiment + 1.0) * 50.0
}

/// Chart series over the first [`CHART_WINDOW`] records, reversed so the
/// oldest of them comes first.
#[must_use]
pub fn risk_series(calls: &[CallData]) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = calls
        .iter()
        .take(CHART_WINDOW)
        .map(|call| ChartPoint {
            time: clock_label(call.start_time),
            risk: call.risk_score,
            sentiment: sentiment_percent(call.sentiment_score),
        })
        .collect();
    points.reverse();
    points
}

fn clock_label(at: OffsetDateTime) -> String {
    at.format(format_description!("[hour]:[minute]"))
        .unwrap_or_default()
}

// =============================================================================
// STAT CARDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Default,
    Danger,
    Warning,
    Success,
}

impl From<RiskBand> for Tone {
    fn from(band: RiskBand) -> Self {
        match band {
            RiskBand::High => Self::Danger,
            RiskBand::Medium => Self::Warning,
            RiskBand::Low => Self::Success,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallStats {
    pub total: usize,
    pub active: usize,
    pub flagged: usize,
    pub anomalies: usize,
    /// Rounded mean risk score; 0 when there are no calls.
    pub average_risk: u8,
}

#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn call_stats(calls: &[CallData]) -> CallStats {
    let total = calls.len();
    let risk_sum: u64 = calls.iter().map(|c| u64::from(c.risk_score)).sum();
    let average_risk = if total == 0 {
        0
    } else {
        let total = total as u64;
        ((risk_sum + total / 2) / total).min(100) as u8
    };
    CallStats {
        total,
        active: calls.iter().filter(|c| c.status == CallStatus::Active).count(),
        flagged: calls.iter().filter(|c| c.status == CallStatus::Flagged).count(),
        anomalies: calls.iter().map(|c| c.anomalies.len()).sum(),
        average_risk,
    }
}

#[must_use]
pub fn stat_cards(calls: &[CallData]) -> Vec<StatCard> {
    let stats = call_stats(calls);
    vec![
        StatCard { title: "Total Calls", value: stats.total.to_string(), tone: Tone::Default },
        StatCard {
            title: "Flagged Calls",
            value: stats.flagged.to_string(),
            tone: if stats.flagged > 0 { Tone::Danger } else { Tone::Success },
        },
        StatCard {
            title: "Avg Risk Score",
            value: stats.average_risk.to_string(),
            tone: risk_band(stats.average_risk).into(),
        },
        StatCard {
            title: "Anomalies Detected",
            value: stats.anomalies.to_string(),
            tone: if stats.anomalies > 0 { Tone::Warning } else { Tone::Default },
        },
    ]
}

// =============================================================================
// TABLE ROWS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRow {
    pub id: String,
    pub agent_id: String,
    pub duration: String,
    pub status: CallStatus,
    pub risk_score: u8,
    pub band: RiskBand,
    pub anomaly_count: usize,
    /// Most severe anomaly on the call, for the badge colour.
    pub worst_severity: Option<AnomalySeverity>,
}

#[must_use]
pub fn call_rows(calls: &[CallData]) -> Vec<CallRow> {
    calls
        .iter()
        .map(|call| CallRow {
            id: call.id.clone(),
            agent_id: call.agent_id.clone(),
            duration: format_duration(call.duration),
            status: call.status,
            risk_score: call.risk_score,
            band: risk_band(call.risk_score),
            anomaly_count: call.anomalies.len(),
            worst_severity: call.anomalies.iter().map(|a| a.severity).max(),
        })
        .collect()
}

/// `m:ss`.
#[must_use]
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[must_use]
pub fn severity_tone(severity: AnomalySeverity) -> Tone {
    match severity {
        AnomalySeverity::Critical => Tone::Danger,
        AnomalySeverity::High | AnomalySeverity::Medium => Tone::Warning,
        AnomalySeverity::Low => Tone::Success,
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
