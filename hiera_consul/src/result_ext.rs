//! Extensions for mapping errors to `LookupResult` concisely.
//!
//! These helpers reduce repetitive `.map_err(|e| Arc::new(LookupError::…(e)))`
//! patterns when converting external error types into the crate's
//! `LookupResult<T>` alias (`Result<T, Arc<LookupError>>`).
//!
//! # Examples
//!
//! ```
//! use hiera_consul::{LookupResult, LookupResultExt};
//!
//! fn extract() -> LookupResult<u16> {
//!     // figment::Error implements Into<LookupError>
//!     figment::Figment::new()
//!         .merge(figment::providers::Serialized::default("port", 8500_u16))
//!         .extract_inner("port")
//!         .into_lookup()
//! }
//! # assert_eq!(extract().ok(), Some(8500));
//! ```

use std::sync::Arc;

use crate::{LookupError, LookupResult};

/// Generic extension for mapping any `Result<T, E>` with `E: Into<LookupError>`
/// into a `LookupResult<T>`.
pub trait LookupResultExt<T, E> {
    /// Convert `Result<T, E>` into `LookupResult<T>` using `Into<LookupError>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion into `Arc<LookupError>`.
    fn into_lookup(self) -> LookupResult<T>;
}

impl<T, E> LookupResultExt<T, E> for Result<T, E>
where
    E: Into<LookupError>,
{
    fn into_lookup(self) -> LookupResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}

/// Extension attributing JSON failures to the store path that produced them.
pub(crate) trait DecodeResultExt<T> {
    /// Convert a `serde_json` failure into [`LookupError::Decode`] for `path`.
    fn into_decode(self, path: &str) -> LookupResult<T>;
}

impl<T> DecodeResultExt<T> for Result<T, serde_json::Error> {
    fn into_decode(self, path: &str) -> LookupResult<T> {
        self.map_err(|e| Arc::new(LookupError::decode(path, e)))
    }
}
