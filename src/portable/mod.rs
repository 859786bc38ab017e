//! Portable rich-text documents
//!
//! A body is an ordered list of blocks. Text blocks carry a `style`
//! (`normal`, `h1`..`h6`, `blockquote`), an optional `listItem`, mark
//! definitions (annotations such as links) and spans of marked text.
//! Other block types are kept with their type name so that a renderer can
//! fall back to a default for kinds it does not know.

mod render;
mod serializers;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::content::ImageRef;

pub use render::{
    default_rule, ListKind, Node, NodeKind, PortableRenderer, Rendered, Serialized, Serializers,
};
pub use serializers::{BlogSerializers, DefaultSerializers};

/// A top-level body node
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(TextBlock),
    Image(ImageRef),
    /// Any block type this crate has no model for
    Other(OtherBlock),
}

/// A `_type: "block"` node
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default)]
    pub list_item: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub mark_defs: Vec<MarkDef>,
    #[serde(default)]
    pub children: Vec<Span>,
}

/// A run of text with decorators and annotation keys applied
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub marks: Vec<String>,
}

/// An annotation referenced from span marks by key
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// A block of unrecognized type
#[derive(Debug, Clone, PartialEq)]
pub struct OtherBlock {
    pub kind: String,
    pub raw: Value,
}

impl OtherBlock {
    /// Best-effort plain text: a `text` field, or the concatenated child spans
    pub fn text(&self) -> String {
        if let Some(text) = self.raw.get("text").and_then(Value::as_str) {
            return text.to_string();
        }
        self.raw
            .get("children")
            .and_then(Value::as_array)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|c| c.get("text").and_then(Value::as_str))
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

fn default_style() -> String {
    "normal".to_string()
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let kind = raw
            .get("_type")
            .or_else(|| raw.get("type"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if !raw.is_object() {
            return Err(de::Error::custom("portable block must be an object"));
        }

        // A malformed block of a known type degrades to an unknown block
        // instead of failing the whole body.
        let block = match kind.as_str() {
            "block" => serde_json::from_value(raw.clone()).map(Block::Text).ok(),
            "image" => serde_json::from_value(raw.clone()).map(Block::Image).ok(),
            _ => None,
        };

        Ok(block.unwrap_or(Block::Other(OtherBlock { kind, raw })))
    }
}
