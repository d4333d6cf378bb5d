//! Hash resolution: rebuild and merge the trees stored below a key.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::builder::{build_fragment, navigate};
use crate::decode::decode_raw;
use crate::fetch::{FetchOutcome, SourceFetcher};
use crate::key::{Key, STORE_SEPARATOR};
use crate::merge::{MergeBehavior, merge_value};
use crate::source::DataSource;
use crate::transport::Transport;
use crate::{LookupError, LookupResult};

pub(super) fn resolve_hash<T: Transport + ?Sized>(
    fetcher: &SourceFetcher<'_, T>,
    sources: &[DataSource],
    key: &Key,
    behavior: MergeBehavior,
) -> LookupResult<Option<Map<String, Value>>> {
    let mapped = key.store_path();
    let mut answer: Option<Map<String, Value>> = None;
    for source in sources {
        if !source.serves_hashes() {
            debug!(source = %source, "hash lookups only support the Consul KV store, skipping");
            continue;
        }
        debug!(source = %source, "looking under path");
        let Some(listed) = fetcher.list_keys(source, &mapped)? else {
            debug!(source = %source, "listing unavailable, skipping");
            continue;
        };
        let tree = assemble(fetcher, source, &listed)?;
        match navigate(&tree, key.segments()) {
            Some(Value::Object(found)) => {
                behavior.merge_into(answer.get_or_insert_with(Map::new), found.clone());
            }
            Some(other) => {
                warn!(
                    source = %source,
                    key = %key,
                    found = value_kind(other),
                    "hash requested but stored value is not a mapping, skipping"
                );
            }
            None => {
                debug!(source = %source, key = %key, "no entries below key, skipping");
            }
        }
    }
    Ok(answer)
}

/// Rebuild the tree of one source from its listed keys.
///
/// Any failure other than `404` aborts the whole lookup so a partially
/// assembled tree is never merged into the answer.
fn assemble<T: Transport + ?Sized>(
    fetcher: &SourceFetcher<'_, T>,
    source: &DataSource,
    listed: &[String],
) -> LookupResult<Value> {
    let mut tree = Value::Object(Map::new());
    for listed_key in listed {
        let subkey = source.relative_key(listed_key);
        let segments: Vec<&str> = subkey.split(STORE_SEPARATOR).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            debug!(source = %source, subkey, "skipping folder entry");
            continue;
        }
        let body = match fetcher.fetch_raw(source, subkey) {
            FetchOutcome::Found(body) => body,
            FetchOutcome::NotFound => {
                debug!(source = %source, subkey, "entry removed since listing, skipping");
                continue;
            }
            FetchOutcome::Failed { status } => {
                let path = fetcher.path(source, subkey);
                warn!(path = %path, status = ?status, "entry fetch failed, abandoning hash lookup");
                return Err(LookupError::inconsistent_hash_arc(&path, status));
            }
        };
        let value = decode_raw(&body).into_value(&fetcher.path(source, subkey))?;
        if let Some(fragment) = build_fragment(&segments, value) {
            merge_value(&mut tree, fragment);
        }
    }
    Ok(tree)
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
