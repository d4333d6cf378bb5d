//! Deep merging of hierarchical answers.
//!
//! Sources are visited in priority order, so whatever is already in the
//! accumulator came from a higher-priority source. Merging therefore only
//! ever adds keys: overlapping mappings are merged recursively, and on any
//! other collision the accumulated value is kept.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Merge `incoming` beneath `accumulated`, returning the union.
///
/// Behaviour:
/// - Two mappings merge key by key; keys present on one side only are taken
///   unmodified.
/// - Keys present on both sides merge recursively.
/// - Any other collision (scalar against scalar, mapping against scalar,
///   sequences) keeps the `accumulated` side.
///
/// # Examples
///
/// ```rust
/// use hiera_consul::merge::deep_merge;
/// use serde_json::json;
///
/// let merged = deep_merge(json!({"db": {"host": "x"}}), json!({"db": {"port": 5432}}));
/// assert_eq!(merged, json!({"db": {"host": "x", "port": 5432}}));
///
/// // Earlier data wins on conflict.
/// assert_eq!(deep_merge(json!({"a": 1}), json!({"a": 2})), json!({"a": 1}));
/// ```
#[must_use]
pub fn deep_merge(accumulated: Value, incoming: Value) -> Value {
    let mut target = accumulated;
    merge_value(&mut target, incoming);
    target
}

/// Merge `incoming` into `target` in place, keeping `target`'s values on
/// conflict.
pub(crate) fn merge_value(target: &mut Value, incoming: Value) {
    if let (Value::Object(existing), Value::Object(map)) = (target, incoming) {
        merge_object(existing, map);
    }
}

fn merge_object(existing: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match existing.get_mut(&key) {
            Some(slot) => merge_value(slot, value),
            None => {
                existing.insert(key, value);
            }
        }
    }
}

/// How hash answers from successive sources are combined.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeBehavior {
    /// Recursive union; nested mappings from lower-priority sources fill in
    /// keys the answer lacks.
    #[default]
    Deep,
    /// Top-level union only; a key already in the answer hides the whole
    /// subtree a lower-priority source holds for it.
    Native,
}

impl MergeBehavior {
    /// Fold `incoming` into `answer` according to this behaviour.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hiera_consul::merge::MergeBehavior;
    /// use serde_json::{Value, json};
    ///
    /// let Value::Object(answer) = json!({"db": {"host": "x"}}) else { return };
    /// let Value::Object(incoming) = json!({"db": {"port": 5432}, "cache": "on"}) else { return };
    ///
    /// let mut native = answer.clone();
    /// MergeBehavior::Native.merge_into(&mut native, incoming.clone());
    /// assert_eq!(json!(native), json!({"db": {"host": "x"}, "cache": "on"}));
    ///
    /// let mut deep = answer.clone();
    /// MergeBehavior::Deep.merge_into(&mut deep, incoming.clone());
    /// assert_eq!(json!(deep), json!({"db": {"host": "x", "port": 5432}, "cache": "on"}));
    /// ```
    pub fn merge_into(self, answer: &mut Map<String, Value>, incoming: Map<String, Value>) {
        match self {
            Self::Deep => merge_object(answer, incoming),
            Self::Native => {
                for (key, value) in incoming {
                    answer.entry(key).or_insert(value);
                }
            }
        }
    }
}
