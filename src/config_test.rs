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
fn empty_environment_uses_defaults() {
    let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.chat_endpoint, "http://localhost:5000/chat");
    assert!(!cfg.secure_origin);
    assert_eq!(cfg.connect_timeout_secs, 10);
}

#[test]
fn overrides_are_applied() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("CALLSENTRY_CHAT_ENDPOINT", "http://backend.test/chat"),
        ("CALLSENTRY_LOG_ENDPOINT", "https://logs.test/ingest"),
        ("CALLSENTRY_SECURE_ORIGIN", "TRUE"),
        ("CALLSENTRY_CONNECT_TIMEOUT_SECS", "3"),
    ]))
    .unwrap();
    assert_eq!(cfg.chat_endpoint, "http://backend.test/chat");
    assert_eq!(cfg.log_endpoint, "https://logs.test/ingest");
    assert!(cfg.secure_origin);
    assert_eq!(cfg.connect_timeout_secs, 3);
}

#[test]
fn unparseable_timeout_falls_back_to_default() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("CALLSENTRY_CONNECT_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
}

#[test]
fn invalid_secure_origin_errors() {
    let err = AppConfig::from_lookup(lookup_from(&[("CALLSENTRY_SECURE_ORIGIN", "maybe")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBool { var: "CALLSENTRY_SECURE_ORIGIN", .. }));
    assert!(err.to_string().contains("maybe"));
}

#[test]
fn http_client_builds() {
    assert!(AppConfig::default().http_client().is_ok());
}
