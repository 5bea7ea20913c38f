//! LLM types — provider-neutral request types, the client trait and errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by generative client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key is available in the environment.
    #[error("missing API key: none of {vars} set")]
    MissingApiKey { vars: String },

    /// The HTTP request to the provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The provider answered but produced no text.
    #[error("API response contained no text")]
    EmptyResponse,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl LlmError {
    /// Whether a caller could reasonably try the same request again.
    /// Nothing in this crate retries; the flag is surfaced in logs.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// REQUEST
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One prior or current turn of a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into() }
    }
}

/// A single generation request: optional system instruction, the turns so
/// far, and an optional JSON schema the reply must follow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    pub system: Option<String>,
    pub contents: Vec<Turn>,
    /// When set, the reply is requested as `application/json` matching this
    /// schema.
    pub response_schema: Option<Value>,
    pub temperature: Option<f32>,
}

impl GenerateRequest {
    /// Single-turn request from one user prompt.
    #[must_use]
    pub fn prompt(text: impl Into<String>) -> Self {
        Self { contents: vec![Turn::user(text)], ..Self::default() }
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    #[must_use]
    pub fn with_json_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

// =============================================================================
// CLIENT TRAIT
// =============================================================================

/// Provider-neutral async trait for text generation. Enables fakes in tests.
#[async_trait::async_trait]
pub trait GenerateContent: Send + Sync {
    /// Run one generation and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails, the provider answers
    /// with an error status, or the reply carries no text.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
