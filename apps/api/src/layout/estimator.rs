//! Block Height Estimator — approximate block heights without a text engine.
//!
//! Heights are in inches. Text blocks are measured by word count against a
//! words-per-line figure derived from the column width; everything else uses a
//! fixed height per block type. This is an intentional approximation: it only
//! needs to be stable and monotonic in content length so that page assignment
//! and paragraph splitting behave predictably.

use crate::models::document::{Block, BlockType};
use crate::models::layout::LayoutBlock;

/// Height of one line of body text (≈ 6 lines per inch).
pub const LINE_HEIGHT: f64 = 0.167;
/// Words that fit per inch of column width.
pub const WORDS_PER_INCH: f64 = 1.8;

const HEADING_HEIGHT: f64 = 0.5;
const IMAGE_HEIGHT: f64 = 2.0;
const LIST_ITEM_HEIGHT: f64 = 0.25;
/// Item count assumed when a list payload is not a countable collection.
const FALLBACK_LIST_ITEMS: usize = 3;
const QUOTE_HEIGHT: f64 = 0.8;
const CODE_HEIGHT: f64 = 1.5;
const DEFAULT_HEIGHT: f64 = 0.3;

/// Words per line for a column, never less than one.
pub fn words_per_line(column_width: f64) -> usize {
    // `as usize` saturates: NaN and negatives land on 0 and are clamped up.
    ((column_width * WORDS_PER_INCH).floor() as usize).max(1)
}

/// Lines a run of `word_count` words occupies. Empty text still takes a line.
pub fn lines_for_words(word_count: usize, column_width: f64) -> usize {
    word_count.div_ceil(words_per_line(column_width)).max(1)
}

/// Estimated height of a paragraph's text.
pub fn paragraph_height(text: &str, column_width: f64) -> f64 {
    lines_for_words(text.split_whitespace().count(), column_width) as f64 * LINE_HEIGHT
}

/// Estimated height of an authored block. Total: always finite and positive.
pub fn estimate_height(block: &Block, column_width: f64) -> f64 {
    match block.block_type {
        BlockType::Heading => HEADING_HEIGHT,
        BlockType::Paragraph => paragraph_height(block.text(), column_width),
        BlockType::Image => IMAGE_HEIGHT,
        BlockType::List => {
            let items = block.list_item_count().unwrap_or(FALLBACK_LIST_ITEMS);
            items as f64 * LIST_ITEM_HEIGHT
        }
        BlockType::Quote => QUOTE_HEIGHT,
        BlockType::Code => CODE_HEIGHT,
        _ => DEFAULT_HEIGHT,
    }
}

/// Estimated height of a placed entry; chunks are measured as paragraphs.
pub fn estimate_layout_block_height(block: &LayoutBlock, column_width: f64) -> f64 {
    match block {
        LayoutBlock::Authored(block) => estimate_height(block, column_width),
        LayoutBlock::Chunk(chunk) => paragraph_height(&chunk.text, column_width),
    }
}
