//! Shared library for the catalogmd tools.
//!
//! `catalog-fetch` pulls the configured JSON documents into a local store and
//! `catalog-render` flattens each catalog/text pair from that store into a
//! markdown document. The two stages only share the on-disk layout defined
//! in [`store`] and the [`Config`] value.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod stats;
pub mod store;

pub use catalog::{
    Block, CatalogDocument, CatalogNode, DEFAULT_BASE_LEVEL, TextId, TextStore, flatten,
    render_markdown, resolve, write_markdown,
};
pub use config::{Config, ContentSet, DEFAULT_CONFIG_FILE, FetchConfig};
pub use error::FlattenError;
pub use fetch::{FetchError, FetchOutcome, FetchSummary, Fetcher, download_all};
pub use logging::{LogLevel, LoggingConfig};
pub use pipeline::{CatalogOutcome, RenderOptions, RenderSummary, render_store};
pub use stats::{LengthReport, count_file_length, count_length};
pub use store::{JsonStore, json_path, markdown_path, save_json};
