//! Primary error enum for lookup and configuration flows.

use figment::Error as FigmentError;
use thiserror::Error;

/// Errors that abort a lookup call or backend construction.
///
/// Missing data is never reported through this type: a source answering
/// `404` is skipped and a lookup that finds nothing returns `Ok(None)`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LookupError {
    /// The lookup key cannot be mapped onto a store path.
    #[error("invalid lookup key '{key}': {reason}")]
    InvalidKey {
        /// Key as supplied by the caller.
        key: String,
        /// Why the key was rejected.
        reason: String,
    },

    /// A response body was not the JSON the endpoint promises.
    #[error("malformed JSON returned for '{path}': {source}")]
    Decode {
        /// Store path whose response failed to parse.
        path: String,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// A KV `Value` field held something other than base64.
    #[error("invalid base64 value returned for '{path}': {source}")]
    InvalidEncoding {
        /// Store path whose value failed to decode.
        path: String,
        /// Underlying decoder error.
        #[source]
        source: base64::DecodeError,
    },

    /// A stored value is neither JSON nor UTF-8 text.
    #[error("non UTF-8 value returned for '{path}': {source}")]
    InvalidUtf8 {
        /// Store path whose value could not be represented.
        path: String,
        /// Underlying conversion error, which still owns the bytes.
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// A sub-key fetch failed part way through assembling a hash.
    #[error("{} retrieving '{path}'", describe_status(.status.as_ref()))]
    InconsistentHash {
        /// Store path of the sub-key that failed.
        path: String,
        /// HTTP status, or `None` when no response arrived.
        status: Option<u16>,
    },

    /// Configuration could not be extracted from the supplied providers.
    #[error("failed to extract Consul configuration: {0}")]
    Configuration(#[from] Box<FigmentError>),

    /// Configuration values are individually valid but inconsistent.
    #[error("validation failed for '{key}': {message}")]
    Validation {
        /// Configuration key that failed validation.
        key: String,
        /// Human-readable explanation of the failure.
        message: String,
    },
}

fn describe_status(status: Option<&u16>) -> String {
    status.map_or_else(
        || "transport failure".to_owned(),
        |code| format!("HTTP response code {code}"),
    )
}
