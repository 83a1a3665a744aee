//! On-disk JSON store shared by the fetch and render stages.
//!
//! Both stages agree on one naming convention: a logical name `foo` lives at
//! `<save_path>/foo.json`, and the rendered catalog at `<save_path>/foo.md`.
//! Writes go through a temp file in the destination directory and are then
//! persisted over the target, so a reader never sees a half-written file.

use crate::error::FlattenError;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Path of the persisted JSON document for `name`.
pub fn json_path(base: &Path, name: &str) -> PathBuf {
    base.join(format!("{name}.json"))
}

/// Path of the rendered markdown document for catalog `name`.
pub fn markdown_path(base: &Path, name: &str) -> PathBuf {
    base.join(format!("{name}.md"))
}

/// Parsed JSON documents keyed by logical name.
#[derive(Debug, Clone, Default)]
pub struct JsonStore {
    base: PathBuf,
    documents: BTreeMap<String, Value>,
}

impl JsonStore {
    /// Load every `<name>.json` under `base`.
    ///
    /// The directory and every requested file must exist; nothing is parsed
    /// until all of them have been found.
    pub fn load<I, S>(base: &Path, names: I) -> Result<Self, FlattenError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !base.is_dir() {
            return Err(FlattenError::MissingDirectory(base.to_path_buf()));
        }

        let mut wanted = Vec::new();
        for name in names {
            let name = name.as_ref().to_string();
            let path = json_path(base, &name);
            if !path.is_file() {
                return Err(FlattenError::MissingFile(path));
            }
            wanted.push((name, path));
        }

        let mut documents = BTreeMap::new();
        for (name, path) in wanted {
            let value = read_json(&path)?;
            tracing::debug!(name = %name, path = %path.display(), "loaded JSON document");
            documents.insert(name, value);
        }

        Ok(Self {
            base: base.to_path_buf(),
            documents,
        })
    }

    /// Build a store from in-memory documents (fixtures, piping).
    pub fn from_documents(base: &Path, documents: BTreeMap<String, Value>) -> Self {
        Self {
            base: base.to_path_buf(),
            documents,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.documents.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }
}

fn read_json(path: &Path) -> Result<Value, FlattenError> {
    let file = File::open(path).map_err(|source| FlattenError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| FlattenError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Persist `value` as pretty-printed JSON at `<dir>/<name>.json`.
///
/// Non-ASCII text is written as-is and object keys keep their source order.
pub fn save_json(dir: &Path, name: &str, value: &Value) -> Result<PathBuf> {
    let path = json_path(dir, name);
    write_atomically(&path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, value)
            .with_context(|| format!("serializing {name}"))?;
        writer.write_all(b"\n")?;
        Ok(())
    })?;
    Ok(path)
}

/// Write `path` through a sibling temp file, creating parent directories.
pub(crate) fn write_atomically<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<()>,
{
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .with_context(|| format!("creating output directory {}", parent.display()))?;

    let mut temp = temp_file_in(&parent)
        .with_context(|| format!("creating temp file in {}", parent.display()))?;
    {
        let mut writer = BufWriter::new(&mut temp);
        fill(&mut writer)?;
        writer
            .flush()
            .with_context(|| format!("writing {}", path.display()))?;
    }
    // Replacing a file keeps its mode.
    if let Ok(existing) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(existing.permissions())
            .with_context(|| format!("copying permissions of {}", path.display()))?;
    }
    temp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Temp file readable the way a plainly created file would be (0666 minus
/// the umask) rather than tempfile's owner-only default.
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
