//! Construction of nested fragments from flat store paths.

use serde_json::{Map, Value};

/// Build a nested mapping whose nesting mirrors `segments`, with `value`
/// stored under the last segment.
///
/// Returns `None` when `segments` is empty: there is no key to hold the
/// value.
///
/// # Examples
///
/// ```
/// use hiera_consul::builder::build_fragment;
/// use serde_json::json;
///
/// let fragment = build_fragment(&["app", "db", "host"], json!("x"));
/// assert_eq!(fragment, Some(json!({"app": {"db": {"host": "x"}}})));
///
/// assert_eq!(build_fragment(&["port"], json!(5432)), Some(json!({"port": 5432})));
/// ```
#[must_use]
pub fn build_fragment<S: AsRef<str>>(segments: &[S], value: Value) -> Option<Value> {
    let (last, parents) = segments.split_last()?;
    let leaf = singleton(last.as_ref(), value);
    Some(
        parents
            .iter()
            .rev()
            .fold(leaf, |inner, segment| singleton(segment.as_ref(), inner)),
    )
}

fn singleton(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_owned(), value);
    Value::Object(map)
}

/// Walk `value` along `segments`, returning the nested value if every
/// segment resolves to a mapping key.
///
/// # Examples
///
/// ```
/// use hiera_consul::builder::navigate;
/// use serde_json::json;
///
/// let tree = json!({"app": {"db": {"host": "x"}}});
/// assert_eq!(navigate(&tree, &["app", "db"]), Some(&json!({"host": "x"})));
/// assert_eq!(navigate(&tree, &["app", "cache"]), None);
/// ```
#[must_use]
pub fn navigate<'a, S: AsRef<str>>(value: &'a Value, segments: &[S]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| current.get(segment.as_ref()))
}
