//! Per-source fetches against the agent and classification of their results.

use tracing::debug;

use crate::LookupResult;
use crate::result_ext::DecodeResultExt;
use crate::source::DataSource;
use crate::transport::{Query, Request, Transport};

/// Classified result of one request.
#[derive(Debug, Eq, PartialEq)]
pub(crate) enum FetchOutcome {
    /// `2xx` with its body.
    Found(Vec<u8>),
    /// `404`.
    NotFound,
    /// Any other status, or no response at all (`status` is `None`).
    Failed { status: Option<u16> },
}

/// Issues the requests for one lookup call.
pub(crate) struct SourceFetcher<'a, T: ?Sized> {
    transport: &'a T,
    prefix: &'a str,
}

impl<'a, T: Transport + ?Sized> SourceFetcher<'a, T> {
    pub(crate) const fn new(transport: &'a T, prefix: &'a str) -> Self {
        Self { transport, prefix }
    }

    /// Full store path for `key` below `source`.
    pub(crate) fn path(&self, source: &DataSource, key: &str) -> String {
        format!("{}/{}/{}", self.prefix, source.path(), key)
    }

    /// Fetch the JSON-wrapped entry stored at `key` under `source`.
    pub(crate) fn fetch_value(&self, source: &DataSource, key: &str) -> FetchOutcome {
        self.fetch(&Request::new(self.path(source, key), Query::Plain))
    }

    /// Fetch the raw bytes stored at `key` under `source`.
    pub(crate) fn fetch_raw(&self, source: &DataSource, key: &str) -> FetchOutcome {
        self.fetch(&Request::new(self.path(source, key), Query::Raw))
    }

    /// List every key stored below `key` under `source`.
    ///
    /// Returns `Ok(None)` when the listing is unavailable; the caller skips
    /// the source since nothing has been gathered from it yet.
    pub(crate) fn list_keys(
        &self,
        source: &DataSource,
        key: &str,
    ) -> LookupResult<Option<Vec<String>>> {
        let request = Request::new(self.path(source, key), Query::KeysRecursive);
        match self.fetch(&request) {
            FetchOutcome::Found(body) => serde_json::from_slice(&body)
                .into_decode(request.path())
                .map(Some),
            FetchOutcome::NotFound | FetchOutcome::Failed { .. } => Ok(None),
        }
    }

    /// Issue `request` and classify the result, logging each non-success
    /// once. Callers decide whether to skip the source or abort.
    fn fetch(&self, request: &Request) -> FetchOutcome {
        match self.transport.get(request) {
            Ok(response) if response.is_success() => FetchOutcome::Found(response.body),
            Ok(response) if response.is_not_found() => {
                debug!(path = %request, "no data at path");
                FetchOutcome::NotFound
            }
            Ok(response) => {
                debug!(
                    path = %request,
                    status = response.status,
                    "request to Consul returned an error status"
                );
                FetchOutcome::Failed {
                    status: Some(response.status),
                }
            }
            Err(err) => {
                debug!(path = %request, error = %err, "request to Consul failed");
                FetchOutcome::Failed { status: None }
            }
        }
    }
}
