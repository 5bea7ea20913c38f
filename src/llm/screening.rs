//! Direct screening transport — the CallSentry persona run straight against
//! the generative service, for demos without a chat backend.
//!
//! DESIGN
//! ======
//! Implements [`ChatTransport`] so a [`crate::session::Session`] can use it
//! in place of the HTTP backend. History is kept per conversation id and
//! only grows when the model produced a reply. Owners call
//! [`ScreeningTransport::forget`] when a conversation ends. No fraud model sits behind
//! this path, so replies never carry a fraud confidence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use super::types::{GenerateContent, GenerateRequest, Turn};
use crate::chat::{ChatReply, ChatTransport, ChatTransportError};
use crate::types::ConversationId;

const SCREENING_TEMPERATURE: f32 = 0.7;

pub const SCREENING_INSTRUCTION: &str = r#"You are "CallSentry", an automated AI call screening assistant.
Your goal is to screen incoming calls for a user named "Alex".

Guidelines:
1. Be polite but professional and slightly guarded.
2. Ask the caller (the user) for their name and reason for calling if they haven't provided it.
3. If the caller sounds suspicious (e.g., asking for money, passwords, urgent IRS payments, "grandchild in jail"), ask probing questions to verify identity.
4. If the caller is a telemarketer, firmly decline.
5. If the caller is legitimate (e.g., family, doctor, delivery), say you will pass the message along.
6. Keep responses relatively short, like a real phone conversation.

The user you are chatting with is the "Caller"."#;

pub struct ScreeningTransport {
    llm: Arc<dyn GenerateContent>,
    histories: Mutex<HashMap<ConversationId, Vec<Turn>>>,
}

impl ScreeningTransport {
    #[must_use]
    pub fn new(llm: Arc<dyn GenerateContent>) -> Self {
        Self { llm, histories: Mutex::new(HashMap::new()) }
    }

    /// Turns recorded so far for one conversation.
    #[must_use]
    pub fn history(&self, conversation_id: &ConversationId) -> Vec<Turn> {
        self.histories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop the history of a finished conversation.
    pub fn forget(&self, conversation_id: &ConversationId) {
        let removed = self
            .histories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(conversation_id);
        if let Some(turns) = removed {
            debug!(%conversation_id, turns = turns.len(), "screening: history dropped");
        }
    }
}

#[async_trait::async_trait]
impl ChatTransport for ScreeningTransport {
    async fn send(&self, message: &str, conversation_id: &ConversationId) -> Result<ChatReply, ChatTransportError> {
        let mut contents = self.history(conversation_id);
        contents.push(Turn::user(message));
        let request = GenerateRequest { contents, ..GenerateRequest::default() }
            .with_system(SCREENING_INSTRUCTION)
            .with_temperature(SCREENING_TEMPERATURE);

        let reply = self.llm.generate(&request).await.map_err(|e| {
            warn!(%conversation_id, error = %e, retryable = e.retryable(), "screening: generation failed");
            ChatTransportError::Request(e.to_string())
        })?;

        self.histories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(conversation_id.clone())
            .or_default()
            .extend([Turn::user(message), Turn::model(reply.clone())]);

        Ok(ChatReply::text(reply))
    }
}

#[cfg(test)]
#[path = "screening_test.rs"]
mod tests;
