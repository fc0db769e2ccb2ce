//! Path lookups inside loosely shaped JSON payloads.
//!
//! Provider payloads are arbitrary-depth trees of string-keyed objects whose
//! shape is only known through the paths the dashboard chooses to read. A
//! [`PathSpec`] names one such leaf and [`resolve`] walks to it, returning
//! `None` (absent) instead of failing whenever the tree does not match.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::ParseParamError;

/// A raw provider payload.
pub type NestedRecord = Value;

/// Ordered, non-empty sequence of object keys locating one value in a
/// [`NestedRecord`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PathSpec(Vec<String>);

impl PathSpec {
    /// Creates a path from its keys.
    ///
    /// # Errors
    ///
    /// Returns [`ParseParamError::EmptyPath`] when `keys` is empty.
    pub fn new<I, S>(keys: I) -> Result<Self, ParseParamError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(ParseParamError::EmptyPath);
        }
        Ok(Self(keys))
    }

    /// Returns the keys of this path.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.0
    }

    /// Number of keys in the path. Always at least one.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl TryFrom<Vec<String>> for PathSpec {
    type Error = ParseParamError;

    fn try_from(keys: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<PathSpec> for Vec<String> {
    fn from(path: PathSpec) -> Self {
        path.0
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" > "))
    }
}

/// Looks up the value at `path` inside `record`.
///
/// Returns `None` as soon as a step hits a non-object node, a missing key, or
/// a JSON `null`, including a `null` leaf. Values are returned untouched.
#[must_use]
pub fn resolve<'a>(record: &'a NestedRecord, path: &PathSpec) -> Option<&'a Value> {
    let mut node = record;
    for key in path.keys() {
        node = node.as_object()?.get(key)?;
        if node.is_null() {
            return None;
        }
    }
    Some(node)
}

/// Resolves `path` and returns it only if it is a JSON number.
#[must_use]
pub fn resolve_f64(record: &NestedRecord, path: &PathSpec) -> Option<f64> {
    resolve(record, path)?.as_f64()
}

/// Resolves `path` and returns it only if it is a JSON string.
#[must_use]
pub fn resolve_str<'a>(record: &'a NestedRecord, path: &PathSpec) -> Option<&'a str> {
    resolve(record, path)?.as_str()
}

/// Resolves `path` and returns it only if it is a JSON boolean.
#[must_use]
pub fn resolve_bool(record: &NestedRecord, path: &PathSpec) -> Option<bool> {
    resolve(record, path)?.as_bool()
}

/// Merges `update` into `previous`.
///
/// Objects merge key by key, recursively; keys present only in `previous`
/// survive. Any other `update` value replaces what was there.
#[must_use]
pub fn merge_records(previous: Option<&NestedRecord>, update: NestedRecord) -> NestedRecord {
    match (previous, update) {
        (Some(Value::Object(prev)), Value::Object(next)) => {
            Value::Object(merge_maps(prev.clone(), next))
        }
        (_, update) => update,
    }
}

fn merge_maps(mut into: Map<String, Value>, from: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in from {
        let merged = match (into.remove(&key), value) {
            (Some(Value::Object(a)), Value::Object(b)) => Value::Object(merge_maps(a, b)),
            (_, v) => v,
        };
        into.insert(key, merged);
    }
    into
}
