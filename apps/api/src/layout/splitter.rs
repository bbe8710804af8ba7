//! Block Splitter — breaks an oversized paragraph into column-sized chunks.

use crate::layout::estimator::{estimate_layout_block_height, words_per_line, LINE_HEIGHT};
use crate::models::document::BlockType;
use crate::models::layout::{ChunkBlock, LayoutBlock};

/// Slack for floating-point comparisons of heights.
pub const FIT_TOLERANCE: f64 = 1e-9;

/// Splits `block` so that every piece is at most `max_height` tall.
///
/// Only paragraphs (and chunks of paragraphs) split; every other block, and a
/// paragraph that already fits, comes back unchanged as a single element. Chunks
/// keep source word order and rejoin with single spaces to the source text.
///
/// A `max_height` below one line still yields one line of words per chunk so the
/// caller always makes progress.
pub fn split_block(block: &LayoutBlock, max_height: f64, column_width: f64) -> Vec<LayoutBlock> {
    if block.block_type() != BlockType::Paragraph
        || estimate_layout_block_height(block, column_width) <= max_height + FIT_TOLERANCE
    {
        return vec![block.clone()];
    }

    let (original_id, first_index) = match block {
        LayoutBlock::Authored(b) => (b.id.as_str(), 0),
        LayoutBlock::Chunk(c) => (c.original_block_id.as_str(), c.chunk_index),
    };

    let max_lines = ((max_height + FIT_TOLERANCE) / LINE_HEIGHT).floor().max(0.0) as usize;
    let word_budget = max_lines.max(1) * words_per_line(column_width);

    let words: Vec<&str> = block.text().split_whitespace().collect();
    if words.is_empty() {
        return vec![block.clone()];
    }
    words
        .chunks(word_budget)
        .enumerate()
        .map(|(n, piece)| {
            LayoutBlock::Chunk(ChunkBlock::new(original_id, first_index + n, piece.join(" ")))
        })
        .collect()
}
