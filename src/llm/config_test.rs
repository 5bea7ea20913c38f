use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_with_api_key() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[("API_KEY", "secret")])).unwrap();
    assert_eq!(cfg.api_key, "secret");
    assert_eq!(cfg.model, "gemini-3-flash-preview");
    assert_eq!(cfg.base_url, DEFAULT_GEMINI_BASE_URL);
    assert_eq!(cfg.timeouts, LlmTimeouts::default());
}

#[test]
fn falls_back_to_gemini_api_key() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[("API_KEY", "  "), ("GEMINI_API_KEY", "g-key")])).unwrap();
    assert_eq!(cfg.api_key, "g-key");
}

#[test]
fn api_key_takes_precedence() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[("API_KEY", "a-key"), ("GEMINI_API_KEY", "g-key")])).unwrap();
    assert_eq!(cfg.api_key, "a-key");
}

#[test]
fn missing_key_errors() {
    let err = LlmConfig::from_lookup(lookup_from(&[("GEMINI_MODEL", "x")])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { .. }));
    assert!(err.to_string().contains("API_KEY, GEMINI_API_KEY"));
}

#[test]
fn overrides_are_applied() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[
        ("GEMINI_API_KEY", "k"),
        ("GEMINI_MODEL", "gemini-2.5-flash"),
        ("GEMINI_BASE_URL", "http://127.0.0.1:9999/v1beta/"),
        ("GEMINI_REQUEST_TIMEOUT_SECS", "42"),
        ("GEMINI_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();
    assert_eq!(cfg.model, "gemini-2.5-flash");
    assert_eq!(cfg.base_url, "http://127.0.0.1:9999/v1beta");
    assert_eq!(cfg.timeouts, LlmTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn unparseable_timeouts_fall_back_to_defaults() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[
        ("API_KEY", "k"),
        ("GEMINI_REQUEST_TIMEOUT_SECS", "soon"),
        ("GEMINI_CONNECT_TIMEOUT_SECS", "-1"),
    ]))
    .unwrap();
    assert_eq!(cfg.timeouts, LlmTimeouts::default());
}

#[test]
fn debug_output_redacts_key() {
    let cfg = LlmConfig::from_lookup(lookup_from(&[("API_KEY", "super-secret")])).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("<redacted>"));
}
