use super::*;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use serde_json::json;
use std::sync::{Arc, Mutex};

async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/chat")
}

// =============================================================================
// parse_reply
// =============================================================================

#[test]
fn parse_reply_with_confidence() {
    let reply = parse_reply(r#"{"response":"Hi","fraud_confidence":0.9,"terminated":false}"#).unwrap();
    assert_eq!(reply, ChatReply::scored("Hi", 0.9));
}

#[test]
fn parse_reply_without_confidence() {
    let reply = parse_reply(r#"{"response":"Who is calling?"}"#).unwrap();
    assert_eq!(reply.fraud_confidence, None);
    assert!(!reply.terminated);
}

#[test]
fn parse_reply_ignores_non_numeric_confidence() {
    let reply = parse_reply(r#"{"response":"ok","fraud_confidence":"high"}"#).unwrap();
    assert_eq!(reply.fraud_confidence, None);
}

#[test]
fn parse_reply_null_confidence_is_absent() {
    let reply = parse_reply(r#"{"response":"ok","fraud_confidence":null}"#).unwrap();
    assert_eq!(reply.fraud_confidence, None);
}

#[test]
fn parse_reply_reads_terminated_flag() {
    let reply = parse_reply(
        r#"{"response":"Conversation terminated due to high fraud risk.","fraud_confidence":0.97,"terminated":true}"#,
    )
    .unwrap();
    assert!(reply.terminated);
}

#[test]
fn parse_reply_missing_response_is_parse_error() {
    let err = parse_reply(r#"{"fraud_confidence":0.2}"#).unwrap_err();
    assert!(matches!(err, ChatTransportError::Parse(_)));
}

#[test]
fn parse_reply_invalid_json() {
    assert!(matches!(parse_reply("<html>"), Err(ChatTransportError::Parse(_))));
}

#[test]
fn health_url_replaces_path() {
    let url = health_url("http://localhost:5000/chat?x=1").unwrap();
    assert_eq!(url.as_str(), "http://localhost:5000/health");
    assert!(health_url("not a url").is_none());
}

// =============================================================================
// HttpChatTransport
// =============================================================================

#[tokio::test]
async fn send_posts_message_and_conversation_id() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let captured = seen.clone();
    let router = Router::new().route(
        "/chat",
        post(move |Json(body): Json<Value>| {
            let captured = captured.clone();
            async move {
                *captured.lock().unwrap() = Some(body);
                Json(json!({ "response": "Hi", "fraud_confidence": 0.12 }))
            }
        }),
    );
    let base = spawn_backend(router).await;
    let transport = HttpChatTransport::new(reqwest::Client::new(), format!("{base}/chat"));

    let reply = transport
        .send("Hello", &ConversationId::from("call-abc"))
        .await
        .unwrap();

    assert_eq!(reply.response, "Hi");
    assert_eq!(reply.fraud_confidence, Some(0.12));
    let body = seen.lock().unwrap().clone().unwrap();
    assert_eq!(body, json!({ "message": "Hello", "conversation_id": "call-abc" }));
}

#[tokio::test]
async fn send_non_2xx_is_status_error() {
    let router = Router::new().route(
        "/chat",
        post(|| async { (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid request" }))) }),
    );
    let base = spawn_backend(router).await;
    let transport = HttpChatTransport::new(reqwest::Client::new(), format!("{base}/chat"));

    let err = transport
        .send("Hello", &ConversationId::from("call-abc"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatTransportError::Status { status: 400, .. }));
}

#[tokio::test]
async fn send_connection_refused_is_request_error() {
    let transport = HttpChatTransport::new(reqwest::Client::new(), dead_endpoint().await);
    let err = transport
        .send("Hello", &ConversationId::from("call-abc"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatTransportError::Request(_)));
}

#[tokio::test]
async fn health_probe_hits_origin() {
    let router = Router::new().route("/health", get(|| async { Json(json!({ "status": "ok" })) }));
    let base = spawn_backend(router).await;
    let transport = HttpChatTransport::new(reqwest::Client::new(), format!("{base}/chat"));
    assert!(transport.health().await);
}

#[tokio::test]
async fn health_probe_down_is_false() {
    let transport = HttpChatTransport::new(reqwest::Client::new(), dead_endpoint().await);
    assert!(!transport.health().await);
}
