//! Unit tests for error construction and rendering.

use rstest::rstest;

use super::LookupError;

#[rstest]
#[case::http_status(Some(500), "HTTP response code 500 retrieving '/v1/kv/common/a/b'")]
#[case::no_response(None, "transport failure retrieving '/v1/kv/common/a/b'")]
fn inconsistent_hash_names_status(#[case] status: Option<u16>, #[case] expected: &str) {
    let err = LookupError::inconsistent_hash_arc("/v1/kv/common/a/b", status);
    assert_eq!(err.to_string(), expected);
    assert!(err.is_inconsistent_hash());
}

#[test]
fn figment_errors_become_configuration_errors() {
    let err = LookupError::from(figment::Error::from("missing field"));
    assert!(matches!(err, LookupError::Configuration(_)));
    assert!(!err.is_inconsistent_hash());
}

#[test]
fn decode_error_keeps_source() {
    let Err(source) = serde_json::from_str::<serde_json::Value>("[") else {
        panic!("truncated JSON must fail to parse");
    };
    let err = LookupError::decode("/v1/kv/common/a", source);
    assert!(std::error::Error::source(&err).is_some());
    assert!(err.to_string().starts_with("malformed JSON returned for '/v1/kv/common/a'"));
}
