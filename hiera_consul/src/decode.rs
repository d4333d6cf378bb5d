//! Decoding of Consul response bodies into JSON values.
//!
//! Single-key fetches return a JSON array. KV entries carry their payload
//! base64-encoded in a `Value` field; catalog responses are returned whole.
//! Raw (`?raw=1`) fetches used while assembling hashes return the stored
//! bytes directly and are decoded best-effort by [`decode_raw`].

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::Value;

use crate::result_ext::DecodeResultExt;
use crate::{LookupError, LookupResult};

/// Field holding the encoded payload of a KV entry.
pub const VALUE_FIELD: &str = "Value";

/// Decode the body of a single-key fetch issued against `path`.
///
/// Returns `Ok(None)` when the store answered with an empty array, or when
/// the first entry is a KV entry without a payload (a folder marker).
///
/// # Errors
///
/// Returns [`LookupError::Decode`] when the body is not a JSON array,
/// [`LookupError::InvalidEncoding`] when a KV payload is not valid base64 and
/// [`LookupError::InvalidUtf8`] when the decoded payload is not UTF-8 text.
///
/// # Examples
///
/// ```
/// use hiera_consul::decode::decode_entries;
/// use serde_json::json;
///
/// let body = br#"[{"Key":"common/app/port","Value":"NTQzMg=="}]"#;
/// let value = decode_entries("/v1/kv/common/app/port", body)?;
/// assert_eq!(value, Some(json!("5432")));
///
/// assert_eq!(decode_entries("/v1/kv/common/app/port", b"[]")?, None);
/// # Ok::<_, std::sync::Arc<hiera_consul::LookupError>>(())
/// ```
pub fn decode_entries(path: &str, body: &[u8]) -> LookupResult<Option<Value>> {
    let entries: Vec<Value> = serde_json::from_slice(body).into_decode(path)?;
    let Some(first) = entries.first() else {
        return Ok(None);
    };
    match first.get(VALUE_FIELD) {
        Some(Value::String(encoded)) => decode_payload(path, encoded).map(Some),
        Some(Value::Null) => Ok(None),
        _ => Ok(Some(Value::Array(entries))),
    }
}

fn decode_payload(path: &str, encoded: &str) -> LookupResult<Value> {
    let bytes = STANDARD.decode(encoded).map_err(|source| {
        Arc::new(LookupError::InvalidEncoding {
            path: path.to_owned(),
            source,
        })
    })?;
    into_text(path, bytes)
}

fn into_text(path: &str, bytes: Vec<u8>) -> LookupResult<Value> {
    String::from_utf8(bytes).map(Value::String).map_err(|source| {
        Arc::new(LookupError::InvalidUtf8 {
            path: path.to_owned(),
            source,
        })
    })
}

/// Best-effort interpretation of a raw stored value.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    /// The bytes parsed as JSON.
    Structured(Value),
    /// The bytes are not JSON and are kept verbatim.
    Opaque(Vec<u8>),
}

impl RawValue {
    /// Convert into a JSON value fetched from `path`; opaque bytes become a
    /// string.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidUtf8`] when opaque bytes are not UTF-8
    /// text. The bytes are never rewritten.
    pub fn into_value(self, path: &str) -> LookupResult<Value> {
        match self {
            Self::Structured(value) => Ok(value),
            Self::Opaque(bytes) => into_text(path, bytes),
        }
    }
}

/// Interpret a raw stored value, falling back to the verbatim bytes when it
/// is not JSON.
///
/// # Examples
///
/// ```
/// use hiera_consul::decode::{RawValue, decode_raw};
/// use serde_json::json;
///
/// assert_eq!(decode_raw(b"[1, 2]"), RawValue::Structured(json!([1, 2])));
/// assert_eq!(decode_raw(b"db01.example"), RawValue::Opaque(b"db01.example".to_vec()));
/// ```
#[must_use]
pub fn decode_raw(body: &[u8]) -> RawValue {
    serde_json::from_slice(body).map_or_else(|_| RawValue::Opaque(body.to_vec()), RawValue::Structured)
}
