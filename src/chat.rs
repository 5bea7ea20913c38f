//! Chat transport — one request, one reply, to the screening chat backend.
//!
//! DESIGN
//! ======
//! `POST {endpoint}` with `{message, conversation_id}`; the backend answers
//! `{response, fraud_confidence?, terminated?}`. Any transport failure,
//! non-2xx status or undecodable body is a single [`ChatTransportError`].
//! Nothing is retried here: the session substitutes a fallback line.
//!
//! `ChatTransport` is the seam the session depends on, so tests and the
//! direct-to-model screening transport can stand in for the HTTP backend.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::ConversationId;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChatTransportError {
    /// The request never produced a response (connect, DNS, reset, ...).
    #[error("chat request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("chat backend returned status {status}")]
    Status { status: u16, body: String },

    /// The backend answered 2xx but the body was not a chat reply.
    #[error("chat response parse failed: {0}")]
    Parse(String),
}

/// Backend reply to one chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    /// Fraud likelihood in `[0, 1]`, when the backend scored the turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud_confidence: Option<f64>,
    /// Backend ended the conversation (high fraud risk). Informational.
    #[serde(default)]
    pub terminated: bool,
}

impl ChatReply {
    #[must_use]
    pub fn text(response: impl Into<String>) -> Self {
        Self { response: response.into(), fraud_confidence: None, terminated: false }
    }

    #[must_use]
    pub fn scored(response: impl Into<String>, fraud_confidence: f64) -> Self {
        Self { fraud_confidence: Some(fraud_confidence), ..Self::text(response) }
    }
}

/// Sends one caller message and returns the screening bot's reply.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`ChatTransportError`] on any network, status or decode
    /// failure.
    async fn send(&self, message: &str, conversation_id: &ConversationId) -> Result<ChatReply, ChatTransportError>;
}

// =============================================================================
// HTTP TRANSPORT
// =============================================================================

pub struct HttpChatTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpChatTransport {
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self { http, endpoint: endpoint.into() }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `GET /health` on the chat backend's origin. `true` on 2xx.
    pub async fn health(&self) -> bool {
        let Some(url) = health_url(&self.endpoint) else {
            warn!(endpoint = %self.endpoint, "chat: endpoint is not a valid URL");
            return false;
        };
        match self.http.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "chat: health probe failed");
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, message: &str, conversation_id: &ConversationId) -> Result<ChatReply, ChatTransportError> {
        let body = ChatRequest { message, conversation_id: conversation_id.as_str() };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatTransportError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChatTransportError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(ChatTransportError::Status { status: status.as_u16(), body: text });
        }

        parse_reply(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    conversation_id: &'a str,
}

#[derive(Deserialize)]
struct WireReply {
    response: String,
    #[serde(default)]
    fraud_confidence: Option<Value>,
    #[serde(default)]
    terminated: Option<bool>,
}

// =============================================================================
// PARSING
// =============================================================================

/// Decode a backend reply. A `fraud_confidence` that is not a number is
/// treated as absent rather than failing the whole turn.
fn parse_reply(json: &str) -> Result<ChatReply, ChatTransportError> {
    let wire: WireReply = serde_json::from_str(json).map_err(|e| ChatTransportError::Parse(e.to_string()))?;
    Ok(ChatReply {
        response: wire.response,
        fraud_confidence: wire.fraud_confidence.as_ref().and_then(Value::as_f64),
        terminated: wire.terminated.unwrap_or(false),
    })
}

fn health_url(endpoint: &str) -> Option<Url> {
    let mut url = Url::parse(endpoint).ok()?;
    url.set_path("/health");
    url.set_query(None);
    Some(url)
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
