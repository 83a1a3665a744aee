//! Catalog trees and the linear documents flattened out of them.
//!
//! Catalog nodes are borrowed views over the loaded JSON rather than an owned
//! tree, so decoding never recurses; the flattener walks children lazily.
//! Decoding is lenient: a missing title is empty, a non-list `children` means
//! no children, and a `null` `real_id` means the node has no text.

use crate::catalog::identity::TextId;
use crate::catalog::text::canonical_string;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;

/// One titled entry of a catalog tree.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogNode<'a> {
    pub title: Cow<'a, str>,
    pub real_id: Option<TextId>,
    pub children: &'a [Value],
}

impl<'a> CatalogNode<'a> {
    /// Decode a node from a catalog entry. Entries that are not objects yield `None`.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        let item = value.as_object()?;
        let title = match item.get("title") {
            None | Some(Value::Null) => Cow::Borrowed(""),
            Some(Value::String(title)) => Cow::Borrowed(title.as_str()),
            Some(other) => Cow::Owned(canonical_string(other)),
        };
        let real_id = item.get("real_id").and_then(TextId::from_value);
        let children = match item.get("children") {
            Some(Value::Array(children)) => children.as_slice(),
            _ => &[],
        };
        Some(Self {
            title,
            real_id,
            children,
        })
    }
}

/// A rendered unit of a flattened catalog: one per visited node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Block {
    pub level: usize,
    pub title: String,
    pub real_id: Option<TextId>,
    pub content: Option<String>,
}

impl Block {
    /// True when the node referenced text that did not resolve to content.
    pub fn is_unresolved(&self) -> bool {
        self.real_id.is_some() && self.content.is_none()
    }
}

/// Linear, pre-order rendition of one catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogDocument {
    pub name: String,
    pub blocks: Vec<Block>,
}

impl CatalogDocument {
    /// Ids referenced by the catalog that had no usable text, in document order.
    pub fn unresolved_ids(&self) -> impl Iterator<Item = &TextId> {
        self.blocks
            .iter()
            .filter(|block| block.is_unresolved())
            .filter_map(|block| block.real_id.as_ref())
    }

    pub fn content_blocks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| block.content.is_some())
            .count()
    }
}
