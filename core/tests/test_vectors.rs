//! Verify the payload factory and builder against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each case names an origin wire value and a map of overrides, and gives
//! either the expected flattened payload or the kind of error. Payloads are
//! compared as parsed JSON, so key order does not matter.

use crm_sdk::{get_builder, ConfigError, JsonMap, PayloadBuilder};
use serde_json::Value;

fn error_kind(err: &ConfigError) -> &'static str {
    match err {
        ConfigError::UnsupportedOrigin(_) => "unsupported_origin",
        ConfigError::UnknownPayloadField { .. } => "unknown_field",
        ConfigError::ReadOnlyPayloadField(_) => "read_only",
        ConfigError::InvalidFieldValue { .. } => "invalid_value",
        other => panic!("unexpected error kind: {other}"),
    }
}

fn build(origin: &str, overrides: &JsonMap) -> Result<JsonMap, ConfigError> {
    let variant = get_builder(origin)?;
    PayloadBuilder::new(variant.client_origin()).build(overrides)
}

#[test]
fn payload_test_vectors() {
    let raw = include_str!("../../test-vectors/payloads.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let cases = vectors["cases"].as_array().unwrap();
    assert!(!cases.is_empty());

    for case in cases {
        let name = case["name"].as_str().unwrap();
        let origin = case["origin"].as_str().unwrap();
        let overrides = case["overrides"].as_object().unwrap();

        let result = build(origin, overrides);
        match (&case["expected"], case["expected_error"].as_str()) {
            (Value::Object(expected), None) => {
                let payload = result.unwrap_or_else(|e| panic!("{name}: unexpected error: {e}"));
                assert_eq!(&payload, expected, "{name}: payload");
            }
            (Value::Null, Some(kind)) => {
                let err = result.expect_err(name);
                assert_eq!(error_kind(&err), kind, "{name}: error kind");
            }
            _ => panic!("{name}: case needs exactly one of expected / expected_error"),
        }
    }
}

#[test]
fn every_origin_builds_its_own_tag() {
    for origin in ["web", "ewap", "mobile-api", "admin-dashboard"] {
        let payload = build(origin, &JsonMap::new()).unwrap();
        assert_eq!(payload.len(), 1, "{origin}");
        assert_eq!(payload["client_origin"], origin);
    }
}
