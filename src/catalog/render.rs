//! Markdown rendering of flattened catalogs.

use crate::catalog::model::CatalogDocument;
use crate::store::write_atomically;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Render `doc` as markdown text.
///
/// The catalog name becomes a level-one title; each block is a heading with
/// `level` hash marks, immediately followed by its content paragraph and a
/// blank line when content is present.
pub fn render_markdown(doc: &CatalogDocument) -> String {
    let mut out = String::new();
    write_document(&mut out, doc);
    out
}

fn write_document(out: &mut String, doc: &CatalogDocument) {
    out.push_str("# ");
    out.push_str(&doc.name);
    out.push_str("\n\n");
    for block in &doc.blocks {
        out.extend(std::iter::repeat_n('#', block.level));
        out.push(' ');
        out.push_str(&block.title);
        out.push('\n');
        if let Some(content) = &block.content {
            out.push_str(content);
            out.push_str("\n\n");
        }
    }
}

/// Render `doc` and create or replace `path` with the result.
pub fn write_markdown(doc: &CatalogDocument, path: &Path) -> Result<()> {
    let rendered = render_markdown(doc);
    write_atomically(path, |writer| {
        writer
            .write_all(rendered.as_bytes())
            .with_context(|| format!("writing {}", path.display()))
    })
    .with_context(|| format!("rendering catalog '{}'", doc.name))
}
