//! Error taxonomy for the flattening stage.
//!
//! Fatal conditions (missing inputs) abort the run before anything is
//! written; `MalformedCatalog` is scoped to a single catalog so the driver can
//! keep going with the remaining content sets.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("input directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("required JSON file is missing: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("unable to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog '{key}' is missing or not a list (found {found})")]
    MalformedCatalog { key: String, found: &'static str },
}

impl FlattenError {
    /// Whether the error must abort the whole run rather than one catalog.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FlattenError::MalformedCatalog { .. })
    }
}

/// Short JSON type label used in diagnostics.
pub(crate) fn json_kind(value: Option<&serde_json::Value>) -> &'static str {
    use serde_json::Value;
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "a boolean",
        Some(Value::Number(_)) => "a number",
        Some(Value::String(_)) => "a string",
        Some(Value::Array(_)) => "a list",
        Some(Value::Object(_)) => "an object",
    }
}
