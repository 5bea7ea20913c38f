use super::*;
use crate::llm::types::{LlmError, Role};
use std::collections::VecDeque;

// =========================================================================
// MockLlm
// =========================================================================

struct MockLlm {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockLlm {
    fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self { replies: Mutex::new(replies.into()), requests: Mutex::new(Vec::new()) })
    }

    fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl GenerateContent for MockLlm {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("ok".into()))
    }
}

#[tokio::test]
async fn first_turn_carries_persona_and_message() {
    let llm = MockLlm::new(vec![Ok("May I ask who is calling?".into())]);
    let transport = ScreeningTransport::new(llm.clone());
    let id = ConversationId::from("call-screen001");

    let reply = transport.send("Hi there", &id).await.unwrap();

    assert_eq!(reply, ChatReply::text("May I ask who is calling?"));
    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].system.as_deref(), Some(SCREENING_INSTRUCTION));
    assert_eq!(requests[0].temperature, Some(0.7));
    assert!(requests[0].response_schema.is_none());
    assert_eq!(requests[0].contents, vec![Turn::user("Hi there")]);
}

#[tokio::test]
async fn later_turns_replay_history() {
    let llm = MockLlm::new(vec![Ok("Who is calling?".into()), Ok("Thanks, Bob.".into())]);
    let transport = ScreeningTransport::new(llm.clone());
    let id = ConversationId::from("call-screen002");

    transport.send("Hello", &id).await.unwrap();
    transport.send("This is Bob", &id).await.unwrap();

    let second = &llm.requests()[1];
    let roles: Vec<Role> = second.contents.iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Model, Role::User]);
    assert_eq!(second.contents[1].text, "Who is calling?");
    assert_eq!(transport.history(&id).len(), 4);
}

#[tokio::test]
async fn conversations_do_not_share_history() {
    let llm = MockLlm::new(vec![]);
    let transport = ScreeningTransport::new(llm.clone());

    transport.send("a", &ConversationId::from("call-aaaaaaaaa")).await.unwrap();
    transport.send("b", &ConversationId::from("call-bbbbbbbbb")).await.unwrap();

    assert_eq!(llm.requests()[1].contents, vec![Turn::user("b")]);
}

#[tokio::test]
async fn forget_drops_only_that_conversation() {
    let llm = MockLlm::new(vec![]);
    let transport = ScreeningTransport::new(llm.clone());
    let ended = ConversationId::from("call-ended0001");
    let live = ConversationId::from("call-live00001");

    transport.send("a", &ended).await.unwrap();
    transport.send("b", &live).await.unwrap();
    transport.forget(&ended);
    transport.forget(&ConversationId::from("call-unknown01"));

    assert!(transport.history(&ended).is_empty());
    assert_eq!(transport.history(&live).len(), 2);

    transport.send("again", &ended).await.unwrap();
    assert_eq!(llm.requests()[2].contents, vec![Turn::user("again")]);
}

#[tokio::test]
async fn failure_maps_to_transport_error_and_keeps_history() {
    let llm = MockLlm::new(vec![Err(LlmError::ApiResponse { status: 503, body: String::new() })]);
    let transport = ScreeningTransport::new(llm);
    let id = ConversationId::from("call-screen003");

    let err = transport.send("Hello", &id).await.unwrap_err();

    assert!(matches!(err, ChatTransportError::Request(_)));
    assert!(transport.history(&id).is_empty());
}

#[tokio::test]
async fn drives_a_session() {
    use crate::session::{Session, TurnOutcome};
    use crate::types::RiskAnalysis;

    let llm = MockLlm::new(vec![Ok("Please state your reason for calling.".into())]);
    let session = Session::new(Arc::new(ScreeningTransport::new(llm)));

    let outcome = session.submit("Hi").await.unwrap();

    assert_eq!(outcome, TurnOutcome::Replied { risk: None });
    assert_eq!(session.risk(), RiskAnalysis::monitoring());
    assert_eq!(session.messages().last().unwrap().text, "Please state your reason for calling.");
}
