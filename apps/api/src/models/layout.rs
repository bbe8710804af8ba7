//! Layout output types. Everything here is derived data: a fresh
//! `LayoutResult` is produced on every layout run and never persisted as
//! authored content.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::document::{Block, BlockType, Metadata};
use crate::models::page_master::PageMaster;

// ────────────────────────────────────────────────────────────────────────────
// Placed content
// ────────────────────────────────────────────────────────────────────────────

/// A slice of a paragraph produced by splitting it across a column boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkBlock {
    /// `{originalBlockId}-chunk-{chunkIndex}`.
    pub id: String,
    pub original_block_id: String,
    pub chunk_index: usize,
    pub text: String,
}

impl ChunkBlock {
    pub fn new(original_block_id: &str, chunk_index: usize, text: String) -> Self {
        Self {
            id: chunk_id(original_block_id, chunk_index),
            original_block_id: original_block_id.to_string(),
            chunk_index,
            text,
        }
    }

    /// Metadata view consumed by renderers and exporters.
    pub fn metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        meta.insert("isChunk".into(), Value::Bool(true));
        meta.insert("chunkIndex".into(), json!(self.chunk_index));
        meta.insert(
            "originalBlockId".into(),
            Value::String(self.original_block_id.clone()),
        );
        meta
    }
}

pub fn chunk_id(original_block_id: &str, chunk_index: usize) -> String {
    format!("{original_block_id}-chunk-{chunk_index}")
}

/// One entry of a column: either an authored block placed whole, or a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutBlock {
    Authored(Block),
    Chunk(ChunkBlock),
}

impl LayoutBlock {
    pub fn id(&self) -> &str {
        match self {
            LayoutBlock::Authored(block) => &block.id,
            LayoutBlock::Chunk(chunk) => &chunk.id,
        }
    }

    /// Id of the authored block this entry came from.
    pub fn source_block_id(&self) -> &str {
        match self {
            LayoutBlock::Authored(block) => &block.id,
            LayoutBlock::Chunk(chunk) => &chunk.original_block_id,
        }
    }

    /// Chunks are always paragraph text.
    pub fn block_type(&self) -> BlockType {
        match self {
            LayoutBlock::Authored(block) => block.block_type,
            LayoutBlock::Chunk(_) => BlockType::Paragraph,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            LayoutBlock::Authored(block) => block.text(),
            LayoutBlock::Chunk(chunk) => &chunk.text,
        }
    }

    pub fn is_chunk(&self) -> bool {
        matches!(self, LayoutBlock::Chunk(_))
    }
}

impl From<Block> for LayoutBlock {
    fn from(block: Block) -> Self {
        LayoutBlock::Authored(block)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Boxes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnBox {
    pub column_index: u32,
    pub width: f64,
    pub height: f64,
    /// Sum of the estimated heights of `content`.
    pub used_height: f64,
    pub content: Vec<LayoutBlock>,
    pub is_full: bool,
}

impl ColumnBox {
    pub fn new(column_index: u32, width: f64, height: f64) -> Self {
        Self {
            column_index,
            width,
            height,
            used_height: 0.0,
            content: Vec::new(),
            is_full: false,
        }
    }

    pub fn remaining_height(&self) -> f64 {
        (self.height - self.used_height).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBox {
    pub page_number: u32,
    pub page_master: PageMaster,
    pub column_boxes: Vec<ColumnBox>,
    /// Blocks were still pending once every column of this page was filled.
    pub has_overflow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub pages: Vec<PageBox>,
    pub total_pages: u32,
    pub has_overflow: bool,
}

impl LayoutResult {
    /// Page number of the first placed entry whose id or source id matches.
    pub fn page_of_block(&self, block_id: &str) -> Option<u32> {
        self.placements()
            .find(|p| p.block.id() == block_id || p.block.source_block_id() == block_id)
            .map(|p| p.page_number)
    }

    /// Every placed entry in reading order with its position.
    pub fn placements(&self) -> impl Iterator<Item = Placement<'_>> + '_ {
        self.pages.iter().flat_map(|page| {
            page.column_boxes.iter().flat_map(move |column| {
                column
                    .content
                    .iter()
                    .enumerate()
                    .map(move |(position, block)| Placement {
                        page_number: page.page_number,
                        column_index: column.column_index,
                        position_in_column: position as u32,
                        block,
                    })
            })
        })
    }
}

/// A placed entry together with where it landed.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    pub page_number: u32,
    pub column_index: u32,
    pub position_in_column: u32,
    pub block: &'a LayoutBlock,
}
