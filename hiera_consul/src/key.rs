//! Lookup keys and their store-path form.
//!
//! Hierarchical keys use `::` between segments (`app::db::host`) while the
//! Consul KV store separates path components with `/` (`app/db/host`). A
//! [`Key`] keeps the segments so either form can be rendered without loss.

use std::fmt;
use std::sync::Arc;

use crate::{LookupError, LookupResult};

/// Separator between segments of a hierarchical key.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Separator between components of a store path.
pub const STORE_SEPARATOR: char = '/';

/// A validated lookup key.
///
/// # Examples
///
/// ```
/// use hiera_consul::Key;
///
/// let key = Key::parse("app::db::host")?;
/// assert_eq!(key.store_path(), "app/db/host");
/// assert_eq!(Key::from_store_path(&key.store_path())?, key);
/// # Ok::<_, std::sync::Arc<hiera_consul::LookupError>>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    /// Parse a `::`-separated key.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidKey`] when the key is empty, contains an
    /// empty segment, or a segment contains `/` (which would not survive the
    /// trip through a store path).
    pub fn parse(key: &str) -> LookupResult<Self> {
        Self::from_parts(key, key.split(NAMESPACE_SEPARATOR))
    }

    /// Parse a `/`-separated store path back into a key.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidKey`] when the path is empty or contains
    /// an empty component.
    pub fn from_store_path(path: &str) -> LookupResult<Self> {
        Self::from_parts(path, path.split(STORE_SEPARATOR))
    }

    fn from_parts<'a>(raw: &str, parts: impl Iterator<Item = &'a str>) -> LookupResult<Self> {
        let mut segments = Vec::new();
        for part in parts {
            if part.is_empty() {
                return Err(Arc::new(LookupError::invalid_key(raw, "empty segment")));
            }
            if part.contains(STORE_SEPARATOR) {
                return Err(Arc::new(LookupError::invalid_key(
                    raw,
                    format!("segment '{part}' contains '{STORE_SEPARATOR}'"),
                )));
            }
            segments.push(part.to_owned());
        }
        Ok(Self { segments })
    }

    /// The key's segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Render the key in store-path form (`a/b/c`).
    #[must_use]
    pub fn store_path(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(NAMESPACE_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, anyhow, ensure};
    use rstest::rstest;

    use super::Key;

    #[rstest]
    #[case::single("app", &["app"])]
    #[case::nested("app::db::host", &["app", "db", "host"])]
    #[case::dotted_segment("app::db.example::port", &["app", "db.example", "port"])]
    fn store_path_round_trips(#[case] raw: &str, #[case] expected: &[&str]) -> Result<()> {
        let key = Key::parse(raw).map_err(|err| anyhow!(err.to_string()))?;
        ensure!(key.segments() == expected, "unexpected segments {:?}", key.segments());

        let back = Key::from_store_path(&key.store_path()).map_err(|err| anyhow!(err.to_string()))?;
        ensure!(back == key, "round trip changed {key} into {back}");
        ensure!(back.to_string() == raw, "display form {back} differs from {raw}");
        Ok(())
    }

    #[rstest]
    #[case::empty("")]
    #[case::leading("::app")]
    #[case::trailing("app::")]
    #[case::doubled("app::::db")]
    #[case::slash("app::db/host")]
    fn rejects_unmappable_keys(#[case] raw: &str) {
        assert!(Key::parse(raw).is_err(), "{raw:?} should be rejected");
    }
}
