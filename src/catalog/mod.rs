//! Catalog flattening.
//!
//! A catalog is a JSON list of `{title, real_id, children}` nodes; its paired
//! text store maps `real_id`s to body text. This module turns the pair into a
//! linear `CatalogDocument` and renders that as markdown.

pub mod flatten;
pub mod identity;
pub mod model;
pub mod render;
pub mod text;

pub use flatten::{DEFAULT_BASE_LEVEL, flatten};
pub use identity::TextId;
pub use model::{Block, CatalogDocument, CatalogNode};
pub use render::{render_markdown, write_markdown};
pub use text::{TextStore, canonical_string, resolve};
