//! Screening session — the conversation state machine behind the phone view.
//!
//! DESIGN
//! ======
//! A session owns the transcript, the latest risk verdict and a phase flag
//! (`Idle` / `Sending`). Submitting trims the input, drops it if empty,
//! refuses while a turn is in flight, and otherwise appends the caller's
//! message immediately before awaiting the transport. The reply (or a fixed
//! fallback line on failure) is appended when the transport resolves.
//!
//! The transcript is append-only and turns never interleave: the phase flag
//! admits one request at a time, so bot replies land in submission order.
//!
//! LIFETIME
//! ========
//! Each session carries a cancellation token. Dropping or closing the
//! session cancels it; a turn that resolves afterwards is discarded without
//! touching the transcript or risk. The in-flight request itself is not
//! aborted.
//!
//! An accepted turn owns the `Sending` phase until it settles. Dropping it
//! unsettled, as when a `submit` future is timed out or abandoned, puts the
//! session back to `Idle`.
//!
//! The state lock is synchronous and never held across an await.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chat::ChatTransport;
use crate::risk::risk_from_confidence;
use crate::types::{ChatMessage, ConversationId, RiskAnalysis, ServerLogPayload};

/// Bot line appended when the chat backend cannot be reached.
pub const BACKEND_UNAVAILABLE: &str = "(Backend unavailable. Please try again.)";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
}

/// Why a submission was not accepted. None of these change session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("input is empty")]
    EmptyInput,
    #[error("a message is already in flight")]
    Busy,
    #[error("session is closed")]
    Closed,
}

/// How an accepted turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Bot reply appended. `risk` is the new verdict when the backend scored
    /// the turn.
    Replied { risk: Option<RiskAnalysis> },
    /// Transport failed; the fallback line was appended and risk kept.
    Fallback,
    /// The session was closed before the transport resolved.
    Discarded,
}

/// Point-in-time copy of a session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub conversation_id: ConversationId,
    pub messages: Vec<ChatMessage>,
    pub risk: RiskAnalysis,
    pub phase: Phase,
}

struct SessionState {
    messages: Vec<ChatMessage>,
    risk: RiskAnalysis,
    phase: Phase,
}

struct SessionInner {
    conversation_id: ConversationId,
    transport: Arc<dyn ChatTransport>,
    state: Mutex<SessionState>,
    liveness: CancellationToken,
}

// =============================================================================
// SESSION
// =============================================================================

/// One screening conversation. Not `Clone`: the owner's lifetime is the
/// session's lifetime.
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Start a session with a fresh conversation id, seeded with the greeting.
    #[must_use]
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self::with_conversation_id(transport, ConversationId::generate())
    }

    #[must_use]
    pub fn with_conversation_id(transport: Arc<dyn ChatTransport>, conversation_id: ConversationId) -> Self {
        info!(%conversation_id, "session: started");
        let state = SessionState {
            messages: vec![ChatMessage::greeting()],
            risk: RiskAnalysis::monitoring(),
            phase: Phase::Idle,
        };
        Self {
            inner: Arc::new(SessionInner {
                conversation_id,
                transport,
                state: Mutex::new(state),
                liveness: CancellationToken::new(),
            }),
        }
    }

    #[must_use]
    pub fn conversation_id(&self) -> &ConversationId {
        &self.inner.conversation_id
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.lock();
        SessionSnapshot {
            conversation_id: self.inner.conversation_id.clone(),
            messages: state.messages.clone(),
            risk: state.risk.clone(),
            phase: state.phase,
        }
    }

    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.inner.lock().messages.clone()
    }

    #[must_use]
    pub fn risk(&self) -> RiskAnalysis {
        self.inner.lock().risk.clone()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.lock().phase
    }

    /// Input should be disabled while this is `true`.
    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.phase() == Phase::Sending
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.liveness.is_cancelled()
    }

    /// Submit one caller message and wait for the turn to finish.
    ///
    /// The caller's message is appended before the first suspension point.
    /// Dropping the returned future mid-flight abandons the turn: no reply
    /// is appended and the session returns to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitRejected`] when the input is blank, a turn is already
    /// in flight, or the session is closed. State is untouched in each case.
    pub async fn submit(&self, input: &str) -> Result<TurnOutcome, SubmitRejected> {
        let turn = SessionInner::begin(&self.inner, input)?;
        Ok(turn.run().await)
    }

    /// Submit one caller message and finish the turn on a background task.
    ///
    /// The caller's message is appended before this returns. If the session
    /// is closed or dropped before the transport resolves, the task ends with
    /// [`TurnOutcome::Discarded`] and leaves state alone.
    ///
    /// # Errors
    ///
    /// Same as [`Session::submit`].
    pub fn spawn_submit(&self, input: &str) -> Result<JoinHandle<TurnOutcome>, SubmitRejected> {
        let turn = SessionInner::begin(&self.inner, input)?;
        Ok(tokio::spawn(turn.run()))
    }

    /// Stop accepting input and drop any turn still in flight.
    pub fn close(&self) {
        if !self.inner.liveness.is_cancelled() {
            info!(conversation_id = %self.inner.conversation_id, "session: closed");
            self.inner.liveness.cancel();
        }
    }

    /// Transcript and final verdict, shaped for the log sink.
    #[must_use]
    pub fn log_payload(&self) -> ServerLogPayload {
        let state = self.inner.lock();
        ServerLogPayload {
            conversation_id: self.inner.conversation_id.clone(),
            messages: state.messages.clone(),
            final_risk_analysis: state.risk.clone(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.inner.liveness.cancel();
    }
}

// =============================================================================
// TURN HANDLING
// =============================================================================

impl SessionInner {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate, append the caller's message and enter `Sending`.
    fn begin(this: &Arc<Self>, input: &str) -> Result<PendingTurn, SubmitRejected> {
        if input.trim().is_empty() {
            return Err(SubmitRejected::EmptyInput);
        }
        if this.liveness.is_cancelled() {
            return Err(SubmitRejected::Closed);
        }

        let mut state = this.lock();
        if state.phase == Phase::Sending {
            debug!(conversation_id = %this.conversation_id, "session: submit ignored while sending");
            return Err(SubmitRejected::Busy);
        }
        let message = ChatMessage::user(input);
        let text = message.text.clone();
        state.messages.push(message);
        state.phase = Phase::Sending;
        Ok(PendingTurn { inner: Arc::clone(this), text, settled: false })
    }
}

/// An accepted turn awaiting its reply.
struct PendingTurn {
    inner: Arc<SessionInner>,
    text: String,
    settled: bool,
}

impl PendingTurn {
    async fn run(mut self) -> TurnOutcome {
        let inner = Arc::clone(&self.inner);
        let result = inner.transport.send(&self.text, &inner.conversation_id).await;

        if inner.liveness.is_cancelled() {
            debug!(conversation_id = %inner.conversation_id, "session: late reply discarded");
            return TurnOutcome::Discarded;
        }

        let mut state = inner.lock();
        let outcome = match result {
            Ok(reply) => {
                if reply.terminated {
                    info!(conversation_id = %inner.conversation_id, "session: backend terminated conversation");
                }
                state.messages.push(ChatMessage::bot(reply.response));
                let risk = reply.fraud_confidence.map(risk_from_confidence);
                if let Some(risk) = &risk {
                    info!(
                        conversation_id = %inner.conversation_id,
                        score = risk.score,
                        label = %risk.label,
                        "session: risk updated"
                    );
                    state.risk = risk.clone();
                }
                TurnOutcome::Replied { risk }
            }
            Err(e) => {
                warn!(conversation_id = %inner.conversation_id, error = %e, "session: chat transport failed");
                state.messages.push(ChatMessage::bot(BACKEND_UNAVAILABLE));
                TurnOutcome::Fallback
            }
        };
        state.phase = Phase::Idle;
        self.settled = true;
        outcome
    }
}

impl Drop for PendingTurn {
    fn drop(&mut self) {
        if !self.settled {
            debug!(conversation_id = %self.inner.conversation_id, "session: turn abandoned before reply");
            self.inner.lock().phase = Phase::Idle;
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
