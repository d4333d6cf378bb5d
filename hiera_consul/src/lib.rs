//! Consul lookups for hierarchical configuration.
//!
//! This crate resolves a `::`-separated key against an ordered list of Consul
//! data sources (`kv/...` key/value prefixes and `catalog/...` endpoints).
//! The [`ConsulBackend`] supports three resolution types:
//!
//! - [`ResolutionType::Priority`]: the first source holding the key wins.
//! - [`ResolutionType::Array`]: every source holding the key contributes one
//!   element, in priority order.
//! - [`ResolutionType::Hash`]: the entries stored below the key in every KV
//!   source are rebuilt into trees and deep-merged.
//!
//! HTTP is abstracted behind the [`Transport`] trait; the embedding
//! framework builds the client from [`ConsulConfig`].
//!
//! ```rust
//! use hiera_consul::transport::{Request, Response, Transport, TransportFailure};
//! use hiera_consul::{Answer, ConsulBackend, ConsulConfig, ResolutionType};
//! use serde_json::json;
//!
//! struct Agent;
//!
//! impl Transport for Agent {
//!     fn get(&self, request: &Request) -> Result<Response, TransportFailure> {
//!         Ok(match request.uri().as_str() {
//!             "/v1/kv/common/app/port" => Response::new(200, r#"[{"Value":"NTQzMg=="}]"#),
//!             _ => Response::new(404, ""),
//!         })
//!     }
//! }
//!
//! let backend = ConsulBackend::new(ConsulConfig::default(), Agent);
//! let answer = backend.lookup_configured("app::port", ResolutionType::Priority)?;
//! assert_eq!(answer, Some(Answer::Value(json!("5432"))));
//! # Ok::<_, std::sync::Arc<hiera_consul::LookupError>>(())
//! ```

pub mod builder;
mod config;
pub mod decode;
mod engine;
mod error;
mod fetch;
pub mod hierarchy;
mod key;
pub mod merge;
mod result_ext;
mod source;
pub mod transport;

pub use config::{ClientIdentity, ConsulConfig, PeerVerification, TlsSettings};
pub use engine::{Answer, ConsulBackend, ResolutionType};
pub use error::LookupError;
pub use hierarchy::{ConfiguredPaths, Hierarchy};
pub use key::{Key, NAMESPACE_SEPARATOR, STORE_SEPARATOR};
pub use merge::{MergeBehavior, deep_merge};
pub use result_ext::LookupResultExt;
pub use source::{CATALOG_PREFIX, DataSource, KV_PREFIX, SourceKind};
pub use transport::{Query, Request, Response, Transport, TransportFailure};

/// Result alias for lookup operations.
///
/// Errors are shared behind an [`Arc`](std::sync::Arc) so a single failure
/// can be logged by the backend and still surfaced to the caller.
pub type LookupResult<T> = std::result::Result<T, std::sync::Arc<LookupError>>;
