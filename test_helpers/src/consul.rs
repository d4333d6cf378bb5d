//! An in-memory Consul agent for exercising lookups without a network.
//!
//! [`FakeConsul`] serves the three request shapes the backend issues against
//! the KV endpoint (entry, recursive key listing and raw value) plus canned
//! catalog responses. Individual request lines can be rigged to return an
//! arbitrary status or to time out, and every request is recorded so tests
//! can assert which sources were (and were not) contacted.
//!
//! # Examples
//!
//! ```
//! use hiera_consul::transport::{Query, Request, Transport};
//! use hiera_consul_test_helpers::consul::FakeConsul;
//!
//! let agent = FakeConsul::new().with_kv("common/app/port", "5432");
//! let response = agent.get(&Request::new("/v1/kv/common/app/port", Query::Raw))?;
//! assert_eq!(response.body, b"5432");
//! assert_eq!(agent.requests(), ["/v1/kv/common/app/port?raw=1"]);
//! # Ok::<_, hiera_consul::TransportFailure>(())
//! ```

use std::collections::{BTreeMap, HashMap};

use base64::{Engine, engine::general_purpose::STANDARD};
use hiera_consul::transport::{Query, Request, Response, Transport, TransportFailure};
use parking_lot::Mutex;
use serde_json::{Value, json};

#[derive(Clone, Debug)]
enum Rigged {
    Status(u16),
    Timeout,
}

/// In-memory Consul agent implementing [`Transport`].
#[derive(Debug, Default)]
pub struct FakeConsul {
    kv: BTreeMap<String, Vec<u8>>,
    catalog: HashMap<String, Value>,
    rigged: HashMap<String, Rigged>,
    requests: Mutex<Vec<String>>,
}

impl FakeConsul {
    /// Create an agent with an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under the KV key `key` (without the `kv/` endpoint,
    /// e.g. `common/app/port`).
    #[must_use]
    pub fn with_kv(mut self, key: &str, value: impl Into<Vec<u8>>) -> Self {
        self.kv.insert(key.to_owned(), value.into());
        self
    }

    /// Serve `body` for plain requests to the catalog path `path` (without
    /// the version prefix, e.g. `catalog/service/web`).
    #[must_use]
    pub fn with_catalog(mut self, path: &str, body: Value) -> Self {
        self.catalog.insert(path.to_owned(), body);
        self
    }

    /// Answer the request line `uri` with `status` and an empty body.
    #[must_use]
    pub fn with_status(mut self, uri: &str, status: u16) -> Self {
        self.rigged.insert(uri.to_owned(), Rigged::Status(status));
        self
    }

    /// Fail the request line `uri` without a response.
    #[must_use]
    pub fn with_timeout(mut self, uri: &str) -> Self {
        self.rigged.insert(uri.to_owned(), Rigged::Timeout);
        self
    }

    /// Every request line received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Whether any request line starting with `prefix` was received.
    #[must_use]
    pub fn was_requested(&self, prefix: &str) -> bool {
        self.requests.lock().iter().any(|uri| uri.starts_with(prefix))
    }

    fn serve(&self, request: &Request) -> Response {
        let Some(path) = strip_version(request.path()) else {
            return not_found();
        };
        if let Some(key) = path.strip_prefix("kv/") {
            return match request.query() {
                Query::Plain => self
                    .kv
                    .get(key)
                    .map_or_else(not_found, |value| ok(kv_body(key, value))),
                Query::Raw => self.kv.get(key).map_or_else(not_found, |value| ok(value.clone())),
                Query::KeysRecursive => self.list(key),
            };
        }
        match (request.query(), self.catalog.get(path)) {
            (Query::Plain, Some(body)) => ok(body.to_string()),
            _ => not_found(),
        }
    }

    fn list(&self, prefix: &str) -> Response {
        let keys: Vec<&str> = self
            .kv
            .keys()
            .filter(|key| key.starts_with(prefix))
            .map(String::as_str)
            .collect();
        if keys.is_empty() {
            not_found()
        } else {
            ok(json!(keys).to_string())
        }
    }
}

impl Transport for FakeConsul {
    fn get(&self, request: &Request) -> Result<Response, TransportFailure> {
        let uri = request.uri();
        self.requests.lock().push(uri.clone());
        match self.rigged.get(&uri) {
            Some(Rigged::Status(status)) => Ok(Response::new(*status, Vec::new())),
            Some(Rigged::Timeout) => Err(TransportFailure::Timeout { elapsed_secs: 10 }),
            None => Ok(self.serve(request)),
        }
    }
}

/// Render the JSON array the KV endpoint returns for a single entry.
///
/// # Examples
///
/// ```
/// use hiera_consul_test_helpers::consul::kv_body;
///
/// assert_eq!(
///     kv_body("common/app", b"x"),
///     r#"[{"CreateIndex":1,"Flags":0,"Key":"common/app","LockIndex":0,"ModifyIndex":1,"Value":"eA=="}]"#,
/// );
/// ```
#[must_use]
pub fn kv_body(key: &str, value: &[u8]) -> String {
    json!([{
        "CreateIndex": 1,
        "Flags": 0,
        "Key": key,
        "LockIndex": 0,
        "ModifyIndex": 1,
        "Value": STANDARD.encode(value),
    }])
    .to_string()
}

fn strip_version(path: &str) -> Option<&str> {
    let (version, rest) = path.strip_prefix("/v")?.split_once('/')?;
    version.chars().all(|c| c.is_ascii_digit()).then_some(rest)
}

fn ok(body: impl Into<Vec<u8>>) -> Response {
    Response::new(200, body)
}

fn not_found() -> Response {
    Response::new(404, Vec::new())
}

#[cfg(test)]
mod tests {
    use hiera_consul::transport::{Query, Request, Transport};
    use rstest::rstest;

    use super::FakeConsul;

    fn agent() -> FakeConsul {
        FakeConsul::new()
            .with_kv("common/app/db/host", "x")
            .with_kv("common/app/db/port", "5432")
            .with_kv("hosts/web01/app/db/port", "6543")
    }

    #[rstest]
    #[case::entry("/v1/kv/common/app/db/host", Query::Plain, 200)]
    #[case::raw("/v1/kv/common/app/db/host", Query::Raw, 200)]
    #[case::listing("/v1/kv/common/app", Query::KeysRecursive, 200)]
    #[case::missing_entry("/v1/kv/common/app", Query::Plain, 404)]
    #[case::missing_listing("/v1/kv/other", Query::KeysRecursive, 404)]
    #[case::unversioned("/kv/common/app/db/host", Query::Plain, 404)]
    fn serves_kv_requests(#[case] path: &str, #[case] query: Query, #[case] status: u16) {
        let response = agent().get(&Request::new(path, query)).expect("fake never fails unless rigged");
        assert_eq!(response.status, status);
    }

    #[test]
    fn listing_is_limited_to_prefix() {
        let response = agent()
            .get(&Request::new("/v1/kv/common/app", Query::KeysRecursive))
            .expect("fake never fails unless rigged");
        assert_eq!(
            String::from_utf8_lossy(&response.body),
            r#"["common/app/db/host","common/app/db/port"]"#
        );
    }

    #[test]
    fn rigged_requests_override_the_store() {
        let agent = agent()
            .with_status("/v1/kv/common/app/db/host?raw=1", 500)
            .with_timeout("/v1/kv/common/app/db/port?raw=1");
        let host = agent
            .get(&Request::new("/v1/kv/common/app/db/host", Query::Raw))
            .expect("rigged status is a response");
        assert_eq!(host.status, 500);
        assert!(agent.get(&Request::new("/v1/kv/common/app/db/port", Query::Raw)).is_err());
        assert!(agent.was_requested("/v1/kv/common/app/db/port"));
        assert!(!agent.was_requested("/v1/kv/hosts"));
    }
}
