//! Pre-order flattening of a catalog tree into a linear document.
//!
//! The walk uses an explicit work stack of `(entry, level)` pairs, pushing
//! children in reverse so they pop in source order. Depth is bounded only by
//! memory, not by the call stack.

use crate::catalog::model::{Block, CatalogDocument, CatalogNode};
use crate::catalog::text::TextStore;
use crate::error::{FlattenError, json_kind};
use serde_json::Value;

/// Heading level given to the top-level catalog entries; the document title
/// itself sits one level above.
pub const DEFAULT_BASE_LEVEL: usize = 2;

/// Flatten `catalog` (expected to be a JSON list of nodes) named `name`.
///
/// Every node yields one block at `base_level + depth`. A node's content is
/// kept only when its `real_id` resolves to a non-empty string.
pub fn flatten(
    name: &str,
    catalog: Option<&Value>,
    texts: TextStore<'_>,
    base_level: usize,
) -> Result<CatalogDocument, FlattenError> {
    let roots = match catalog {
        Some(Value::Array(items)) => items,
        other => {
            return Err(FlattenError::MalformedCatalog {
                key: name.to_string(),
                found: json_kind(other),
            });
        }
    };

    let mut blocks = Vec::new();
    let mut stack: Vec<(&Value, usize)> = roots.iter().rev().map(|v| (v, base_level)).collect();

    while let Some((entry, level)) = stack.pop() {
        let Some(node) = CatalogNode::from_value(entry) else {
            tracing::warn!(
                catalog = name,
                level,
                "skipping catalog entry that is {} instead of an object",
                json_kind(Some(entry))
            );
            continue;
        };

        let content = node
            .real_id
            .as_ref()
            .and_then(|id| texts.resolve(id))
            .filter(|text| !text.is_empty());

        stack.extend(node.children.iter().rev().map(|child| (child, level + 1)));

        blocks.push(Block {
            level,
            title: node.title.into_owned(),
            real_id: node.real_id,
            content,
        });
    }

    Ok(CatalogDocument {
        name: name.to_string(),
        blocks,
    })
}
