//! The render stage: load the store, flatten each content set, write the
//! markdown, then count characters from what landed on disk.
//!
//! Missing inputs abort before anything is written. A malformed catalog or a
//! failed write only fails its own content set; the rest still render and the
//! summary's exit code reports the failure.

use crate::catalog::{DEFAULT_BASE_LEVEL, TextStore, flatten, write_markdown};
use crate::config::{Config, ContentSet};
use crate::error::FlattenError;
use crate::stats::{LengthReport, count_file_length};
use crate::store::{JsonStore, markdown_path};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Log every `real_id` that has no usable text.
    pub warn_on_missing_text: bool,
    pub base_level: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            warn_on_missing_text: false,
            base_level: DEFAULT_BASE_LEVEL,
        }
    }
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            warn_on_missing_text: config.warn_on_missing_text,
            ..Self::default()
        }
    }
}

/// What happened to one content set.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogOutcome {
    pub catalog: String,
    pub text: String,
    pub output: PathBuf,
    pub blocks: usize,
    pub unresolved: usize,
    pub error: Option<String>,
    pub length: LengthReport,
}

impl CatalogOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderSummary {
    pub outcomes: Vec<CatalogOutcome>,
}

impl RenderSummary {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(CatalogOutcome::succeeded)
    }

    /// 0 when every catalog rendered, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.all_succeeded() { 0 } else { 1 }
    }
}

/// Run the render stage for `config`.
///
/// Returns `Err` only for fatal input problems; per-catalog failures are on
/// the summary.
pub fn run(config: &Config) -> Result<RenderSummary, FlattenError> {
    let sets = config.content_sets();
    let store = JsonStore::load(&config.save_path, config.required_names())?;
    Ok(render_store(
        &store,
        &sets,
        &config.save_path,
        RenderOptions::from_config(config),
    ))
}

/// Render every content set from an already loaded store into `out_dir`.
pub fn render_store(
    store: &JsonStore,
    sets: &[ContentSet],
    out_dir: &Path,
    options: RenderOptions,
) -> RenderSummary {
    let outcomes = sets
        .iter()
        .map(|set| render_content_set(store, set, out_dir, options))
        .collect();
    RenderSummary { outcomes }
}

fn render_content_set(
    store: &JsonStore,
    set: &ContentSet,
    out_dir: &Path,
    options: RenderOptions,
) -> CatalogOutcome {
    let output = markdown_path(out_dir, &set.catalog);
    info!(catalog = %set.catalog, path = %output.display(), "rendering");

    let texts = TextStore::new(store.get(&set.text));
    if !texts.is_mapping() {
        warn!(
            catalog = %set.catalog,
            text = %set.text,
            "text store is missing or not an object; no content will resolve"
        );
    }

    let mut blocks = 0;
    let mut unresolved = 0;
    let result = flatten(&set.catalog, store.get(&set.catalog), texts, options.base_level)
        .map_err(anyhow::Error::from)
        .and_then(|doc| {
            blocks = doc.blocks.len();
            for id in doc.unresolved_ids() {
                unresolved += 1;
                if options.warn_on_missing_text {
                    warn!(real_id = %id, text = %set.text, "no text for real_id or text is empty");
                } else {
                    debug!(real_id = %id, text = %set.text, "no text for real_id or text is empty");
                }
            }
            write_markdown(&doc, &output)
        });

    let error = match result {
        Ok(()) => {
            info!(
                catalog = %set.catalog,
                blocks,
                unresolved,
                "wrote {}",
                output.display()
            );
            None
        }
        Err(err) => {
            error!(catalog = %set.catalog, "{err:#}");
            Some(format!("{err:#}"))
        }
    };

    let length = count_file_length(&output, true);
    info!(catalog = %set.catalog, chars = length.count, "character count (whitespace excluded)");

    CatalogOutcome {
        catalog: set.catalog.clone(),
        text: set.text.clone(),
        output,
        blocks,
        unresolved,
        error,
        length,
    }
}
