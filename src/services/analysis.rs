//! Analysis service — on-demand AI verdicts for calls and conversations.
//!
//! DESIGN
//! ======
//! Two structured requests against the generative client:
//! - `analyze_call`: detailed analysis of a recorded call transcript
//!   (`summary`, `rootCause`, `recommendation`, `complianceCheck`).
//! - `analyze_risk`: scam likelihood of a screening conversation
//!   (`score`, `label`, `reasoning`).
//!
//! ERROR HANDLING
//! ==============
//! Neither call returns an error. Transport failures, error statuses, empty
//! or malformed JSON all collapse into a fixed degraded result, and a
//! missing client short-circuits before any request is made. One attempt
//! per call; nothing is retried.

use std::fmt::Write;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::llm::{GenerateContent, GenerateRequest, LlmError};
use crate::types::{CallAnalysis, CallData, ChatMessage, RiskAnalysis, RiskLabel, Sender};

const ANALYST_INSTRUCTION: &str = "You are a call-center quality and fraud analyst. \
                                   Answer only with JSON matching the requested schema.";

pub const MISSING_KEY_REASONING: &str = "API Key missing";
pub const FAILED_REASONING: &str = "Analysis failed";

// =============================================================================
// FALLBACKS
// =============================================================================

/// Result returned when no generative client is configured.
#[must_use]
pub fn call_analysis_unconfigured() -> CallAnalysis {
    CallAnalysis {
        summary: "API Key missing".into(),
        root_cause: "N/A".into(),
        recommendation: "Check API configuration".into(),
        compliance_check: false,
    }
}

/// Result returned when the generative request fails in any way.
#[must_use]
pub fn call_analysis_failed() -> CallAnalysis {
    CallAnalysis {
        summary: "Analysis failed".into(),
        root_cause: "Unknown error".into(),
        recommendation: "Retry analysis".into(),
        compliance_check: false,
    }
}

// =============================================================================
// SERVICE
// =============================================================================

#[derive(Clone)]
pub struct AnalysisService {
    llm: Option<Arc<dyn GenerateContent>>,
}

impl AnalysisService {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn GenerateContent>>) -> Self {
        Self { llm }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    /// Detailed analysis of one recorded call.
    pub async fn analyze_call(&self, call: &CallData) -> CallAnalysis {
        let Some(llm) = &self.llm else {
            return call_analysis_unconfigured();
        };
        info!(call_id = %call.id, lines = call.transcript.len(), "analysis: call requested");
        match request_call_analysis(llm.as_ref(), call).await {
            Ok(analysis) => analysis,
            Err(e) => {
                error!(call_id = %call.id, error = %e, "analysis: detailed analysis failed");
                call_analysis_failed()
            }
        }
    }

    /// Scam-likelihood verdict for a screening transcript.
    pub async fn analyze_risk(&self, transcript: &str) -> RiskAnalysis {
        let Some(llm) = &self.llm else {
            return RiskAnalysis::unknown(MISSING_KEY_REASONING);
        };
        match request_risk_analysis(llm.as_ref(), transcript).await {
            Ok(risk) => risk,
            Err(e) => {
                error!(error = %e, "analysis: risk analysis failed");
                RiskAnalysis::unknown(FAILED_REASONING)
            }
        }
    }

    /// Convenience: risk verdict for a session transcript.
    pub async fn analyze_conversation(&self, messages: &[ChatMessage]) -> RiskAnalysis {
        self.analyze_risk(&format_conversation(messages)).await
    }
}

async fn request_call_analysis(llm: &dyn GenerateContent, call: &CallData) -> Result<CallAnalysis, LlmError> {
    let request = GenerateRequest::prompt(build_call_prompt(call))
        .with_system(ANALYST_INSTRUCTION)
        .with_json_schema(call_analysis_schema());
    let text = llm.generate(&request).await?;
    parse_call_analysis(&text)
}

async fn request_risk_analysis(llm: &dyn GenerateContent, transcript: &str) -> Result<RiskAnalysis, LlmError> {
    let request = GenerateRequest::prompt(build_risk_prompt(transcript))
        .with_system(ANALYST_INSTRUCTION)
        .with_json_schema(risk_schema());
    let text = llm.generate(&request).await?;
    parse_risk(&text)
}

// =============================================================================
// PROMPTS
// =============================================================================

#[must_use]
pub fn build_call_prompt(call: &CallData) -> String {
    let mut prompt = String::from("Analyze this detailed call transcript.\n");
    let _ = writeln!(prompt, "Agent: {}", call.agent_id);
    let _ = writeln!(prompt, "Call ID: {}", call.id);
    prompt.push_str("\nTranscript:\n");
    for line in &call.transcript {
        let _ = writeln!(prompt, "[{}] {}: {}", line.timestamp, line.speaker, line.text);
    }
    prompt.push_str(
        "\nProvide a structured analysis in JSON:\n\
         - summary: A brief summary of the call.\n\
         - rootCause: The main reason for the call or the root cause of any issue discussed.\n\
         - recommendation: Advice for the agent or next steps.\n\
         - complianceCheck: Boolean, true if the agent followed standard protocols \
         (greeting, verification, politeness), false otherwise.\n",
    );
    prompt
}

#[must_use]
pub fn build_risk_prompt(transcript: &str) -> String {
    format!(
        "Analyze the following call transcript between \"CallSentry\" (AI) and a \"Caller\".\n\
         Determine the likelihood that the Caller is a scammer, spammer, or malicious.\n\
         \n\
         Transcript:\n\
         {transcript}\n\
         \n\
         Return JSON with:\n\
         - score (0 to 100, where 100 is confirmed scam/danger)\n\
         - label (SAFE, SUSPICIOUS, SCAM)\n\
         - reasoning (brief explanation)\n"
    )
}

/// One `Speaker: text` line per message, bot lines attributed to CallSentry.
#[must_use]
pub fn format_conversation(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            let speaker = match m.sender {
                Sender::Bot => "CallSentry",
                Sender::User => "Caller",
            };
            format!("{speaker}: {}", m.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// SCHEMAS
// =============================================================================

fn call_analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "rootCause": { "type": "STRING" },
            "recommendation": { "type": "STRING" },
            "complianceCheck": { "type": "BOOLEAN" }
        },
        "required": ["summary", "rootCause", "recommendation", "complianceCheck"]
    })
}

fn risk_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": { "type": "NUMBER" },
            "label": { "type": "STRING", "enum": ["SAFE", "SUSPICIOUS", "SCAM", "UNKNOWN"] },
            "reasoning": { "type": "STRING" }
        },
        "required": ["score", "label", "reasoning"]
    })
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Deserialize)]
struct WireRisk {
    score: f64,
    label: RiskLabel,
    reasoning: String,
}

fn parse_call_analysis(text: &str) -> Result<CallAnalysis, LlmError> {
    serde_json::from_str(strip_code_fence(text)).map_err(|e| LlmError::ApiParse(e.to_string()))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_risk(text: &str) -> Result<RiskAnalysis, LlmError> {
    let wire: WireRisk = serde_json::from_str(strip_code_fence(text)).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    if !wire.score.is_finite() {
        return Err(LlmError::ApiParse(format!("score is not a number: {}", wire.score)));
    }
    let score = wire.score.clamp(0.0, 100.0).round() as u8;
    Ok(RiskAnalysis::new(score, wire.label, wire.reasoning))
}

/// Models occasionally wrap JSON in a markdown fence despite the mime type.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
