//! Resolution of catalog `real_id`s against a flat text store.

use crate::catalog::identity::TextId;
use serde_json::{Map, Value};

/// Read-only view of a text document (`id -> value`).
///
/// A store built from anything other than a JSON object resolves nothing.
#[derive(Clone, Copy, Debug)]
pub struct TextStore<'a> {
    entries: Option<&'a Map<String, Value>>,
}

impl<'a> TextStore<'a> {
    pub fn new(value: Option<&'a Value>) -> Self {
        Self {
            entries: value.and_then(Value::as_object),
        }
    }

    /// Whether the backing value was a mapping at all.
    pub fn is_mapping(&self) -> bool {
        self.entries.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.map(Map::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the text for `id`.
    ///
    /// Strings come back verbatim, `null` and unknown ids are absent, and any
    /// other value is returned as its compact JSON form.
    pub fn resolve(&self, id: &TextId) -> Option<String> {
        match self.entries?.get(id.as_str())? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(canonical_string(other)),
        }
    }
}

/// Resolve `id` against a raw store value.
pub fn resolve(store: Option<&Value>, id: &TextId) -> Option<String> {
    TextStore::new(store).resolve(id)
}

/// Deterministic, locale-independent string form of a JSON value.
pub fn canonical_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
