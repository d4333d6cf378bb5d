//! Ordering of candidate data sources for a lookup call.
//!
//! The embedding framework owns the notion of scope and decides which
//! sources apply to a call. The engine only needs the resulting ordered
//! list, so the seam is the [`Hierarchy`] trait.

use tracing::debug;

use crate::source::DataSource;

/// Produces the ordered candidate sources for one lookup call.
pub trait Hierarchy<S: ?Sized> {
    /// Return the sources to visit, highest priority first.
    ///
    /// `paths` are the sources configured on the backend and
    /// `order_override` is an optional source the caller wants tried first.
    fn datasources(
        &self,
        scope: &S,
        order_override: Option<&str>,
        paths: &[String],
    ) -> Vec<DataSource>;
}

/// Visits the override (if any), then the configured paths in order.
///
/// Blank entries and entries with a leading, trailing or doubled `/` are
/// dropped since they cannot name a store location.
///
/// # Examples
///
/// ```
/// use hiera_consul::hierarchy::{ConfiguredPaths, Hierarchy};
///
/// let paths = vec!["kv/hosts/".to_owned(), "kv/common".to_owned()];
/// let sources = ConfiguredPaths.datasources(&(), Some("kv/override"), &paths);
/// let names: Vec<&str> = sources.iter().map(|s| s.path()).collect();
/// assert_eq!(names, ["kv/override", "kv/common"]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfiguredPaths;

impl<S: ?Sized> Hierarchy<S> for ConfiguredPaths {
    fn datasources(
        &self,
        _scope: &S,
        order_override: Option<&str>,
        paths: &[String],
    ) -> Vec<DataSource> {
        order_override
            .into_iter()
            .chain(paths.iter().map(String::as_str))
            .filter(|path| {
                let usable = is_usable(path);
                if !usable {
                    debug!(path = %path, "ignoring unusable data source path");
                }
                usable
            })
            .map(DataSource::new)
            .collect()
    }
}

fn is_usable(path: &str) -> bool {
    !path.trim().is_empty() && !path.starts_with('/') && !path.ends_with('/') && !path.contains("//")
}
