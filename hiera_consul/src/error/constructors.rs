//! Constructors and conversions for `LookupError`.

use std::sync::Arc;

use figment::Error as FigmentError;

use super::LookupError;

impl LookupError {
    /// Construct a [`LookupError::InvalidKey`] for `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hiera_consul::LookupError;
    /// let e = LookupError::invalid_key("a::::b", "empty segment");
    /// assert!(matches!(e, LookupError::InvalidKey { .. }));
    /// ```
    #[must_use]
    pub fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.to_owned(),
            reason: reason.into(),
        }
    }

    /// Construct a [`LookupError::Decode`] for the store `path`.
    #[must_use]
    pub fn decode(path: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            path: path.to_owned(),
            source,
        }
    }

    /// Construct a [`LookupError::InconsistentHash`] wrapped in an [`Arc`].
    ///
    /// Sub-key failures are reported from deep inside the hash assembly loop,
    /// which already works in terms of `LookupResult`.
    #[must_use]
    pub fn inconsistent_hash_arc(path: &str, status: Option<u16>) -> Arc<Self> {
        Arc::new(Self::InconsistentHash {
            path: path.to_owned(),
            status,
        })
    }

    /// Construct a configuration error from a [`figment::Error`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hiera_consul::LookupError;
    /// let fe = figment::Error::from("boom");
    /// let e = LookupError::configuration(fe);
    /// assert!(matches!(e, LookupError::Configuration(_)));
    /// ```
    #[must_use]
    pub fn configuration(source: FigmentError) -> Self {
        Self::Configuration(Box::new(source))
    }

    /// Returns `true` when the error was raised to protect a partially
    /// merged hash.
    #[must_use]
    pub const fn is_inconsistent_hash(&self) -> bool {
        matches!(self, Self::InconsistentHash { .. })
    }
}

impl From<FigmentError> for LookupError {
    fn from(e: FigmentError) -> Self {
        Self::configuration(e)
    }
}
