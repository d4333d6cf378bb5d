//! Candidate data sources and their endpoint classification.

use std::fmt;

/// Prefix identifying the Consul key/value endpoint.
pub const KV_PREFIX: &str = "kv/";

/// Prefix identifying the Consul catalog endpoint.
pub const CATALOG_PREFIX: &str = "catalog/";

/// Endpoint family a data source belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SourceKind {
    /// `kv/...`: the key/value store.
    Kv,
    /// `catalog/...`: the service catalog.
    Catalog,
    /// Anything else; never queried.
    Other,
}

/// One remote location checked during a lookup, e.g. `kv/common`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DataSource {
    path: String,
    kind: SourceKind,
}

impl DataSource {
    /// Wrap `path`, classifying it by its endpoint prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use hiera_consul::{DataSource, SourceKind};
    ///
    /// assert_eq!(DataSource::new("kv/common").kind(), SourceKind::Kv);
    /// assert_eq!(DataSource::new("catalog/services").kind(), SourceKind::Catalog);
    /// assert_eq!(DataSource::new("agent/self").kind(), SourceKind::Other);
    /// ```
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let owned = path.into();
        let kind = if owned.starts_with(KV_PREFIX) {
            SourceKind::Kv
        } else if owned.starts_with(CATALOG_PREFIX) {
            SourceKind::Catalog
        } else {
            SourceKind::Other
        };
        Self { path: owned, kind }
    }

    /// The source path as supplied.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Endpoint family of this source.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Whether single-value lookups (first-match and array) may query this
    /// source.
    #[must_use]
    pub const fn serves_values(&self) -> bool {
        matches!(self.kind, SourceKind::Kv | SourceKind::Catalog)
    }

    /// Whether hash lookups may query this source.
    #[must_use]
    pub const fn serves_hashes(&self) -> bool {
        matches!(self.kind, SourceKind::Kv)
    }

    /// Prefix the KV store puts in front of keys it lists under this source.
    ///
    /// Key listings omit the `kv/` endpoint, so `kv/common` lists its keys as
    /// `common/...`.
    #[must_use]
    pub fn listing_prefix(&self) -> &str {
        self.path.strip_prefix(KV_PREFIX).unwrap_or(&self.path)
    }

    /// Convert a listed key into a path relative to this source.
    ///
    /// Keys that do not carry the listing prefix are returned unchanged.
    #[must_use]
    pub fn relative_key<'a>(&self, listed: &'a str) -> &'a str {
        listed
            .strip_prefix(self.listing_prefix())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(listed)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for DataSource {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for DataSource {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}
