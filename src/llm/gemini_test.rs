use super::*;
use crate::llm::config::LlmTimeouts;
use crate::llm::types::Turn;
use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode, Uri};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn make_response(parts: Value) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": parts },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 5 }
    })
    .to_string()
}

// =============================================================================
// build_request
// =============================================================================

#[test]
fn plain_prompt_has_no_generation_config() {
    let req = GenerateRequest::prompt("hello");
    let body = serde_json::to_value(build_request(&req)).unwrap();
    assert_eq!(body, json!({ "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }] }));
}

#[test]
fn schema_request_asks_for_json() {
    let schema = json!({ "type": "OBJECT", "properties": { "summary": { "type": "STRING" } } });
    let req = GenerateRequest::prompt("analyze").with_json_schema(schema.clone());
    let body = serde_json::to_value(build_request(&req)).unwrap();
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(body["generationConfig"]["responseSchema"], schema);
    assert!(body["generationConfig"].get("temperature").is_none());
}

#[test]
fn system_and_history_are_mapped() {
    let req = GenerateRequest {
        system: Some("screen calls".into()),
        contents: vec![Turn::user("hi"), Turn::model("who is this?"), Turn::user("Bob")],
        response_schema: None,
        temperature: Some(0.7),
    };
    let body = serde_json::to_value(build_request(&req)).unwrap();
    assert_eq!(body["systemInstruction"], json!({ "parts": [{ "text": "screen calls" }] }));
    assert_eq!(body["contents"][1]["role"], "model");
    assert_eq!(body["contents"][2]["parts"][0]["text"], "Bob");
    assert!(body["generationConfig"].get("responseMimeType").is_none());
    let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
    assert!((temperature - 0.7).abs() < 1e-6);
}

// =============================================================================
// parse_response
// =============================================================================

#[test]
fn parse_single_text_part() {
    let text = parse_response(&make_response(json!([{ "text": "{\"score\": 10}" }]))).unwrap();
    assert_eq!(text, "{\"score\": 10}");
}

#[test]
fn parse_concatenates_parts() {
    let text = parse_response(&make_response(json!([{ "text": "Hello, " }, { "text": "caller." }]))).unwrap();
    assert_eq!(text, "Hello, caller.");
}

#[test]
fn parse_no_candidates_is_empty() {
    let err = parse_response(r#"{"candidates": []}"#).unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
}

#[test]
fn parse_blocked_prompt_is_empty() {
    let err = parse_response(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
}

#[test]
fn parse_invalid_json() {
    assert!(matches!(parse_response("not json"), Err(LlmError::ApiParse(_))));
}

// =============================================================================
// GeminiClient over HTTP
// =============================================================================

async fn spawn_provider(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/v1beta")
}

fn client_for(base_url: String) -> GeminiClient {
    GeminiClient::from_config(LlmConfig {
        api_key: "test-key".into(),
        model: "gemini-test".into(),
        base_url,
        timeouts: LlmTimeouts::default(),
    })
    .unwrap()
}

#[tokio::test]
async fn generate_posts_to_model_endpoint_with_key_header() {
    let seen: Arc<Mutex<Option<(String, Option<String>, Value)>>> = Arc::new(Mutex::new(None));
    let captured = seen.clone();
    let router = Router::new().fallback(move |uri: Uri, headers: HeaderMap, Json(body): Json<Value>| {
        let captured = captured.clone();
        async move {
            let key = headers
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            *captured.lock().unwrap() = Some((uri.path().to_owned(), key, body));
            make_response(json!([{ "text": "ok" }]))
        }
    });
    let client = client_for(spawn_provider(router).await);

    let text = client.generate(&GenerateRequest::prompt("ping")).await.unwrap();

    assert_eq!(text, "ok");
    let (path, key, body) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(path, "/v1beta/models/gemini-test:generateContent");
    assert_eq!(key.as_deref(), Some("test-key"));
    assert_eq!(body["contents"][0]["parts"][0]["text"], "ping");
}

#[tokio::test]
async fn generate_error_status_is_api_response() {
    let router = Router::new().fallback(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") });
    let client = client_for(spawn_provider(router).await);

    let err = client.generate(&GenerateRequest::prompt("ping")).await.unwrap_err();

    assert!(matches!(&err, LlmError::ApiResponse { status: 429, body } if body == "slow down"));
    assert!(err.retryable());
}
