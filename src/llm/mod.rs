//! LLM — generative-AI client used for call analysis and direct screening.
//!
//! DESIGN
//! ======
//! The client is constructed explicitly from [`config::LlmConfig`] and handed
//! to consumers as `Arc<dyn GenerateContent>`. Consumers hold it as an
//! `Option`: `None` means no credential was configured and every AI feature
//! short-circuits to its degraded result without a network call.

pub mod config;
pub mod gemini;
pub mod screening;
pub mod types;

use std::sync::Arc;

use tracing::{info, warn};

pub use gemini::GeminiClient;
pub use types::{GenerateContent, GenerateRequest, LlmError, Turn};

/// Build the generative client from the environment, or `None` when it is
/// not configured. Missing configuration is logged, never fatal.
#[must_use]
pub fn client_from_env() -> Option<Arc<dyn GenerateContent>> {
    let built = config::LlmConfig::from_env().and_then(GeminiClient::from_config);
    match built {
        Ok(client) => {
            info!(model = client.model(), "LLM client initialized");
            let client: Arc<dyn GenerateContent> = Arc::new(client);
            Some(client)
        }
        Err(e) => {
            warn!(error = %e, "LLM client not configured; AI features disabled");
            None
        }
    }
}
