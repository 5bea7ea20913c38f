//! Client configuration parsed from environment variables.
//!
//! Generative-service settings live in [`crate::llm::config`]; this module
//! covers the chat backend, the log sink and the shared HTTP client.

use std::time::Duration;

pub const DEFAULT_CHAT_ENDPOINT: &str = "http://localhost:5000/chat";
pub const DEFAULT_LOG_ENDPOINT: &str = "http://127.0.0.1:5000/chat";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid boolean for {var}: {value}")]
    InvalidBool { var: &'static str, value: String },

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub chat_endpoint: String,
    pub log_endpoint: String,
    /// The page/origin the client runs under is https. Used to avoid
    /// mixed-content uploads to a plain-http log sink.
    pub secure_origin: bool,
    pub connect_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chat_endpoint: DEFAULT_CHAT_ENDPOINT.into(),
            log_endpoint: DEFAULT_LOG_ENDPOINT.into(),
            secure_origin: false,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `CALLSENTRY_CHAT_ENDPOINT`: default `http://localhost:5000/chat`
    /// - `CALLSENTRY_LOG_ENDPOINT`: default `http://127.0.0.1:5000/chat`
    /// - `CALLSENTRY_SECURE_ORIGIN`: `true`/`false`, default false
    /// - `CALLSENTRY_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if `CALLSENTRY_SECURE_ORIGIN` is not a boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `CALLSENTRY_SECURE_ORIGIN` is not a boolean.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let chat_endpoint = lookup("CALLSENTRY_CHAT_ENDPOINT").unwrap_or(defaults.chat_endpoint);
        let log_endpoint = lookup("CALLSENTRY_LOG_ENDPOINT").unwrap_or(defaults.log_endpoint);
        let secure_origin = match lookup("CALLSENTRY_SECURE_ORIGIN") {
            Some(raw) => parse_bool("CALLSENTRY_SECURE_ORIGIN", &raw)?,
            None => defaults.secure_origin,
        };
        let connect_timeout_secs = lookup("CALLSENTRY_CONNECT_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.connect_timeout_secs);

        Ok(Self { chat_endpoint, log_endpoint, secure_origin, connect_timeout_secs })
    }

    /// HTTP client shared by the chat transport and the log sink.
    ///
    /// Only the connect phase is bounded; a slow chat backend is waited on.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value: raw.to_owned() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
