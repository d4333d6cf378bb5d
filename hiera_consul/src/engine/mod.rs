//! The resolution engine: one lookup call across an ordered list of sources.
//!
//! Each [`ResolutionType`] has its own loop over the sources:
//!
//! - [`ResolutionType::Priority`] stops at the first source that yields a
//!   value.
//! - [`ResolutionType::Array`] visits every source and collects one value per
//!   source, in priority order.
//! - [`ResolutionType::Hash`] visits every KV source, rebuilds the tree below
//!   the key from its individual entries and deep-merges the trees, earlier
//!   sources winning on conflict.
//!
//! Missing data is never an error: a call that finds nothing returns
//! `Ok(None)` so the framework can move on to its next backend.

mod hash;

use serde_json::{Map, Value};
use tracing::debug;

use crate::LookupResult;
use crate::config::ConsulConfig;
use crate::decode::decode_entries;
use crate::fetch::{FetchOutcome, SourceFetcher};
use crate::hierarchy::Hierarchy;
use crate::key::Key;
use crate::source::DataSource;
use crate::transport::Transport;

/// How results from several sources combine into one answer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ResolutionType {
    /// The first source holding the key wins.
    #[default]
    Priority,
    /// Every source holding the key contributes one element.
    Array,
    /// Every KV source contributes a subtree; subtrees are deep-merged.
    Hash,
}

/// The result of a successful lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum Answer {
    /// A single value from a priority lookup.
    Value(Value),
    /// One value per contributing source, highest priority first.
    Array(Vec<Value>),
    /// The merged mapping of a hash lookup.
    Hash(Map<String, Value>),
}

impl Answer {
    /// Convert into a single JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Array(values) => Value::Array(values),
            Self::Hash(map) => Value::Object(map),
        }
    }
}

/// Resolves keys against a Consul agent.
#[derive(Debug)]
pub struct ConsulBackend<T> {
    config: ConsulConfig,
    transport: T,
}

impl<T: Transport> ConsulBackend<T> {
    /// Build a backend from resolved configuration and a transport.
    #[must_use]
    pub fn new(config: ConsulConfig, transport: T) -> Self {
        debug!(url = %config.base_url(), "Consul backend starting");
        Self { config, transport }
    }

    /// Build a backend from a figment, applying configuration defaults.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`ConsulConfig::from_figment`].
    pub fn from_figment(figment: &figment::Figment, transport: T) -> LookupResult<Self> {
        ConsulConfig::from_figment(figment).map(|config| Self::new(config, transport))
    }

    /// Configuration the backend was built with.
    #[must_use]
    pub const fn config(&self) -> &ConsulConfig {
        &self.config
    }

    /// Resolve `key` against the configured paths.
    ///
    /// # Errors
    ///
    /// See [`Self::lookup`].
    pub fn lookup_configured(
        &self,
        key: &str,
        resolution: ResolutionType,
    ) -> LookupResult<Option<Answer>> {
        self.lookup(key, &self.config.sources(), resolution)
    }

    /// Resolve `key` against the sources `hierarchy` selects for `scope`.
    ///
    /// # Errors
    ///
    /// See [`Self::lookup`].
    pub fn lookup_in<S, H>(
        &self,
        key: &str,
        hierarchy: &H,
        scope: &S,
        order_override: Option<&str>,
        resolution: ResolutionType,
    ) -> LookupResult<Option<Answer>>
    where
        S: ?Sized,
        H: Hierarchy<S> + ?Sized,
    {
        let sources = hierarchy.datasources(scope, order_override, &self.config.paths);
        self.lookup(key, &sources, resolution)
    }

    /// Resolve `key` against `sources`, highest priority first.
    ///
    /// Returns `Ok(None)` when no source holds data for the key.
    ///
    /// # Errors
    ///
    /// - [`crate::LookupError::InvalidKey`] when `key` cannot be mapped onto
    ///   a store path.
    /// - [`crate::LookupError::Decode`] or
    ///   [`crate::LookupError::InvalidEncoding`] when a priority or array
    ///   lookup receives a malformed body.
    /// - [`crate::LookupError::InvalidUtf8`] when a stored value is neither
    ///   JSON nor UTF-8 text.
    /// - [`crate::LookupError::InconsistentHash`] when a hash lookup fails
    ///   to fetch one of the entries below the key; no partial hash is
    ///   returned.
    pub fn lookup(
        &self,
        key: &str,
        sources: &[DataSource],
        resolution: ResolutionType,
    ) -> LookupResult<Option<Answer>> {
        debug!(key, ?resolution, "looking up key in Consul backend");
        let parsed = Key::parse(key)?;
        let prefix = self.config.path_prefix();
        let fetcher = SourceFetcher::new(&self.transport, &prefix);
        match resolution {
            ResolutionType::Priority => {
                resolve_priority(&fetcher, sources, &parsed).map(|found| found.map(Answer::Value))
            }
            ResolutionType::Array => {
                resolve_array(&fetcher, sources, &parsed).map(|found| found.map(Answer::Array))
            }
            ResolutionType::Hash => {
                hash::resolve_hash(&fetcher, sources, &parsed, self.config.merge_behavior)
                    .map(|found| found.map(Answer::Hash))
            }
        }
    }
}

fn fetch_decoded<T: Transport + ?Sized>(
    fetcher: &SourceFetcher<'_, T>,
    source: &DataSource,
    key: &Key,
) -> LookupResult<Option<Value>> {
    let mapped = key.store_path();
    debug!(source = %source, "looking under path");
    match fetcher.fetch_value(source, &mapped) {
        FetchOutcome::Found(body) => decode_entries(&fetcher.path(source, &mapped), &body),
        FetchOutcome::NotFound | FetchOutcome::Failed { .. } => {
            debug!(source = %source, "nothing usable in source, skipping");
            Ok(None)
        }
    }
}

fn resolve_priority<T: Transport + ?Sized>(
    fetcher: &SourceFetcher<'_, T>,
    sources: &[DataSource],
    key: &Key,
) -> LookupResult<Option<Value>> {
    for source in sources {
        if !source.serves_values() {
            debug!(source = %source, "priority lookups only support Consul kv and catalog endpoints, skipping");
            continue;
        }
        if let Some(value) = fetch_decoded(fetcher, source, key)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn resolve_array<T: Transport + ?Sized>(
    fetcher: &SourceFetcher<'_, T>,
    sources: &[DataSource],
    key: &Key,
) -> LookupResult<Option<Vec<Value>>> {
    let mut answer = Vec::new();
    for source in sources {
        if !source.serves_values() {
            debug!(source = %source, "array lookups only support Consul kv and catalog endpoints, skipping");
            continue;
        }
        if let Some(value) = fetch_decoded(fetcher, source, key)? {
            answer.push(value);
        }
    }
    Ok((!answer.is_empty()).then_some(answer))
}
