//! Log sink — best-effort upload of finished screening sessions.
//!
//! Failures are logged and reported as `false`; callers never see an error.
//! Uploads from a secure origin to a plain-http target are skipped outright
//! (a browser would block them as mixed content).

use tracing::{debug, info, warn};

use crate::types::ServerLogPayload;

pub struct LogSink {
    http: reqwest::Client,
    endpoint: String,
    secure_origin: bool,
}

impl LogSink {
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, secure_origin: bool) -> Self {
        Self { http, endpoint: endpoint.into(), secure_origin }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether an upload would be skipped for mixed-content reasons.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.secure_origin && self.endpoint.starts_with("http:")
    }

    /// Post the payload. Returns `true` only on a 2xx response.
    pub async fn upload(&self, payload: &ServerLogPayload) -> bool {
        if self.is_blocked() {
            debug!(endpoint = %self.endpoint, "log sink: skipped, insecure target from secure origin");
            return false;
        }

        match self.http.post(&self.endpoint).json(payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!(
                    conversation_id = %payload.conversation_id,
                    messages = payload.messages.len(),
                    "log sink: session uploaded"
                );
                true
            }
            Ok(response) => {
                warn!(endpoint = %self.endpoint, status = response.status().as_u16(), "log sink: upload rejected");
                false
            }
            Err(e) => {
                debug!(endpoint = %self.endpoint, error = %e, "log sink: unreachable");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "log_sink_test.rs"]
mod tests;
