//! Character statistics over rendered documents.
//!
//! Counts are taken from the file as written, so heading markers and the
//! title line are part of the total.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Number of chars in `text`, optionally skipping Unicode whitespace.
pub fn count_length(text: &str, exclude_whitespace: bool) -> usize {
    if exclude_whitespace {
        text.chars().filter(|c| !c.is_whitespace()).count()
    } else {
        text.chars().count()
    }
}

/// Outcome of counting a document on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LengthReport {
    pub path: PathBuf,
    pub count: usize,
    /// Set when the file could not be read; the count is then zero.
    pub warning: Option<String>,
}

/// Read `path` and count its characters.
///
/// A missing or unreadable file is not an error: the report carries a zero
/// count and a warning, which is also logged.
pub fn count_file_length(path: &Path, exclude_whitespace: bool) -> LengthReport {
    match fs::read_to_string(path) {
        Ok(text) => LengthReport {
            path: path.to_path_buf(),
            count: count_length(&text, exclude_whitespace),
            warning: None,
        },
        Err(err) => {
            let warning = if err.kind() == io::ErrorKind::NotFound {
                format!("output file does not exist: {}", path.display())
            } else {
                format!("unable to read {}: {err}", path.display())
            };
            tracing::warn!("{warning}");
            LengthReport {
                path: path.to_path_buf(),
                count: 0,
                warning: Some(warning),
            }
        }
    }
}
