//! CallSentry — call-screening client.
//!
//! DESIGN
//! ======
//! Fraud scoring and language generation live in external services. This
//! crate owns the contracts with those services plus the client-side logic
//! around them:
//!
//! - `chat`: request/response transport to the screening chat backend.
//! - `session`: single-flight conversation state machine over a transport.
//! - `risk`: the one place risk labels and colour bands are decided.
//! - `dashboard`: read-only call records, chart series and stat cards.
//! - `llm`: injected generative-AI client (Gemini `generateContent`).
//! - `services`: call/risk analysis with degraded fallbacks, log upload.

pub mod chat;
pub mod config;
pub mod dashboard;
pub mod llm;
pub mod risk;
pub mod services;
pub mod session;
pub mod types;
