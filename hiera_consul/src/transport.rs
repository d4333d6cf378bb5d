//! The HTTP seam between the lookup engine and a Consul agent.
//!
//! The engine only ever issues `GET` requests and only needs the status code
//! and body of each response, so the seam is a single method. The embedding
//! framework supplies the client (connection pooling, TLS and timeouts
//! configured from [`crate::ConsulConfig`]).

use std::fmt;

use thiserror::Error;

/// Query string variants the engine issues.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Query {
    /// No query string: fetch the JSON-wrapped entry.
    Plain,
    /// `?recurse=1&keys=1`: list every key below the path.
    KeysRecursive,
    /// `?raw=1`: fetch the stored bytes without the JSON wrapper.
    Raw,
}

impl Query {
    /// The query string including its leading `?`, or `""`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "",
            Self::KeysRecursive => "?recurse=1&keys=1",
            Self::Raw => "?raw=1",
        }
    }
}

/// A `GET` request against the agent's HTTP API.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Request {
    path: String,
    query: Query,
}

impl Request {
    /// Build a request for `path` (already carrying the `/v{N}` prefix).
    #[must_use]
    pub fn new(path: impl Into<String>, query: Query) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    /// Path component of the request.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query variant of the request.
    #[must_use]
    pub const fn query(&self) -> Query {
        self.query
    }

    /// Path and query string, as sent on the request line.
    ///
    /// # Examples
    ///
    /// ```
    /// use hiera_consul::transport::{Query, Request};
    ///
    /// let request = Request::new("/v1/kv/common/app", Query::KeysRecursive);
    /// assert_eq!(request.uri(), "/v1/kv/common/app?recurse=1&keys=1");
    /// ```
    #[must_use]
    pub fn uri(&self) -> String {
        format!("{}{}", self.path, self.query.as_str())
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.path, self.query.as_str())
    }
}

/// Status code and body of a completed request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Build a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `true` for any `2xx` status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// `true` for `404 Not Found`.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// A request that produced no response at all.
#[derive(Debug, Error)]
pub enum TransportFailure {
    /// Connecting to or reading from the agent exceeded its timeout.
    #[error("timed out after {elapsed_secs}s")]
    Timeout {
        /// Seconds waited before giving up.
        elapsed_secs: u64,
    },
    /// The connection could not be established or broke mid-request.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Issues requests against a Consul agent.
///
/// Implementations are expected to apply the connect and read timeouts from
/// [`crate::ConsulConfig`] and never retry.
pub trait Transport {
    /// Perform a `GET` for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportFailure`] when no HTTP response was received.
    /// Non-success statuses are returned as ordinary [`Response`]s.
    fn get(&self, request: &Request) -> Result<Response, TransportFailure>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, request: &Request) -> Result<Response, TransportFailure> {
        (**self).get(request)
    }
}
