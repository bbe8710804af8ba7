//! Authored document structure: documents own sections, sections own flows,
//! flows own blocks. The layout core only ever reads these.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::page_master::PageMaster;

pub type Metadata = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-form tag describing what the section is for (e.g. "cover", "body").
    #[serde(default)]
    pub layout_intent: String,
    #[serde(default)]
    pub page_master: PageMaster,
    #[serde(default)]
    pub flows: Vec<Flow>,
    #[serde(default, rename = "excludeFromTOC")]
    pub exclude_from_toc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    #[default]
    Linear,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: String,
    #[serde(default)]
    pub flow_type: FlowType,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Heading,
    Paragraph,
    Image,
    List,
    Quote,
    Code,
    Table,
    Figure,
    Callout,
    Divider,
    /// Any tag this build does not know about. Laid out with a default height.
    #[serde(other)]
    Unknown,
}

/// An authored block. `content` is type-dependent: a string or `{ "text": .. }`
/// for text blocks, `{ "text", "level" }` for headings, `{ "items": [..] }` for
/// lists, `{ "caption" | "title" }` for figures and tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Block {
    pub fn new(id: impl Into<String>, block_type: BlockType, content: Value) -> Self {
        Self {
            id: id.into(),
            block_type,
            content,
            order: 0,
            metadata: Metadata::new(),
        }
    }

    /// The block's plain text, or an empty string for non-text payloads.
    pub fn text(&self) -> &str {
        match &self.content {
            Value::String(s) => s,
            Value::Object(obj) => obj.get("text").and_then(Value::as_str).unwrap_or(""),
            _ => "",
        }
    }

    /// Heading level from `content.level` or `metadata.level`, defaulting to 1.
    pub fn heading_level(&self) -> u8 {
        self.content
            .get("level")
            .or_else(|| self.metadata.get("level"))
            .and_then(Value::as_u64)
            .map(|l| l.min(u8::MAX as u64) as u8)
            .unwrap_or(1)
    }

    /// Number of list items, if the payload is a countable collection.
    pub fn list_item_count(&self) -> Option<usize> {
        match &self.content {
            Value::Array(items) => Some(items.len()),
            Value::Object(obj) => obj.get("items").and_then(Value::as_array).map(Vec::len),
            _ => None,
        }
    }

    /// Per-block table-of-contents override (`metadata.includeInTOC`).
    pub fn include_in_toc(&self) -> Option<bool> {
        self.metadata.get("includeInTOC").and_then(Value::as_bool)
    }

    /// Anchor id for cross-references; `metadata.anchorId` or the block id.
    pub fn anchor_id(&self) -> &str {
        self.metadata
            .get("anchorId")
            .and_then(Value::as_str)
            .unwrap_or(self.id.as_str())
    }

    /// Human title used for anchors: caption, then title, then text.
    pub fn title(&self) -> Option<String> {
        let from_content = ["caption", "title"]
            .iter()
            .find_map(|key| self.content.get(*key).and_then(Value::as_str));
        let title = from_content.unwrap_or_else(|| self.text()).trim();
        (!title.is_empty()).then(|| title.to_string())
    }
}

impl Section {
    /// All blocks in placement order: flows by `order`, then blocks by `order`.
    /// Ties keep their input position.
    pub fn ordered_blocks(&self) -> Vec<&Block> {
        let mut flows: Vec<&Flow> = self.flows.iter().collect();
        flows.sort_by_key(|f| f.order);
        flows
            .into_iter()
            .flat_map(|flow| {
                let mut blocks: Vec<&Block> = flow.blocks.iter().collect();
                blocks.sort_by_key(|b| b.order);
                blocks
            })
            .collect()
    }
}
