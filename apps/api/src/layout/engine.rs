//! Layout Engine — packs a section's flows into pages and columns.
//!
//! # Algorithm
//! - Flows are concatenated (flow order, then block order) into one pending queue.
//! - Pages are opened one at a time; columns fill left to right from the queue.
//! - A block that fits is placed whole. A paragraph that does not fit is split
//!   when more than `MIN_SPLIT_HEIGHT` remains; the first chunk is placed and the
//!   rest go back to the front of the queue. Anything else marks the column full.
//! - An unsplittable block that does not fit an *empty* column is handled by the
//!   `OversizePolicy`, so every column either consumes content or is skipped
//!   past, and the page loop always terminates.
//!
//! The engine is pure: a `Section` goes in, a new `LayoutResult` comes out, no
//! state survives between calls. CPU-bound, so async callers go through
//! `generate_layout_blocking`.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{AppError, LayoutError};
use crate::layout::estimator::estimate_layout_block_height;
use crate::layout::geometry::{resolve_geometry, PageGeometry};
use crate::layout::splitter::{split_block, FIT_TOLERANCE};
use crate::models::document::{BlockType, Section};
use crate::models::layout::{chunk_id, ColumnBox, LayoutBlock, LayoutResult, PageBox};

/// A paragraph is only split when more than this much height remains.
pub const MIN_SPLIT_HEIGHT: f64 = 0.5;
/// Safety bound on pages produced for a single section.
pub const DEFAULT_MAX_PAGES: u32 = 10_000;

// ────────────────────────────────────────────────────────────────────────────
// Options
// ────────────────────────────────────────────────────────────────────────────

/// What to do with a block taller than an empty column that cannot be split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OversizePolicy {
    /// Place it unsplit, mark the column full and let it overflow visually.
    #[default]
    ForcePlace,
    /// Fail the layout with `LayoutError::BlockTooTall`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    /// Number given to the first page. Exporters pass a running offset.
    pub first_page_number: u32,
    pub oversize_policy: OversizePolicy,
    pub max_pages: u32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            first_page_number: 1,
            oversize_policy: OversizePolicy::ForcePlace,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry points
// ────────────────────────────────────────────────────────────────────────────

/// Lays out one section.
///
/// Always returns at least one page, even for a section without blocks.
/// `has_overflow` reports whether the last page still had content pending.
pub fn generate_layout(
    section: &Section,
    options: &LayoutOptions,
) -> Result<LayoutResult, LayoutError> {
    let geometry = resolve_geometry(&section.page_master)?;

    let mut pending: VecDeque<LayoutBlock> = section
        .ordered_blocks()
        .into_iter()
        .cloned()
        .map(LayoutBlock::Authored)
        .collect();
    let block_count = pending.len();

    // The first page is always produced, whatever the bound.
    let max_pages = options.max_pages.max(1);
    let mut pages: Vec<PageBox> = Vec::new();
    while !pending.is_empty() || pages.is_empty() {
        if pages.len() as u32 >= max_pages {
            return Err(LayoutError::PageLimitExceeded { max_pages });
        }

        let page_number = options
            .first_page_number
            .checked_add(pages.len() as u32)
            .ok_or(LayoutError::PageNumberOverflow {
                first_page_number: options.first_page_number,
                pages: pages.len() as u32,
            })?;
        let mut column_boxes = Vec::new();
        for column_index in 0..geometry.columns {
            column_boxes.push(fill_column(
                column_index,
                &geometry,
                &mut pending,
                options.oversize_policy,
            )?);
            if pending.is_empty() {
                break;
            }
        }

        let has_overflow = !pending.is_empty();
        if has_overflow {
            debug!(
                page_number,
                pending = pending.len(),
                "Page filled; carrying content forward"
            );
        }

        pages.push(PageBox {
            page_number,
            page_master: section.page_master.clone(),
            column_boxes,
            has_overflow,
        });
    }

    renumber_chunks(&mut pages);

    let has_overflow = pages.last().is_some_and(|p| p.has_overflow);
    debug!(
        section = %section.id,
        blocks = block_count,
        pages = pages.len(),
        "Section laid out"
    );

    Ok(LayoutResult {
        total_pages: pages.len() as u32,
        pages,
        has_overflow,
    })
}

/// Runs `generate_layout` on the blocking pool so the async executor stays free.
pub async fn generate_layout_blocking(
    section: Section,
    options: LayoutOptions,
) -> Result<LayoutResult, AppError> {
    let result = tokio::task::spawn_blocking(move || generate_layout(&section, &options))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in layout: {e}")))?;
    Ok(result?)
}

// ────────────────────────────────────────────────────────────────────────────
// Column filling
// ────────────────────────────────────────────────────────────────────────────

/// Fills one column from the front of `pending`.
fn fill_column(
    column_index: u32,
    geometry: &PageGeometry,
    pending: &mut VecDeque<LayoutBlock>,
    policy: OversizePolicy,
) -> Result<ColumnBox, LayoutError> {
    let width = geometry.column_width;
    let mut column = ColumnBox::new(column_index, width, geometry.content_height);

    while let Some(head) = pending.front() {
        let height = snapped_height(head, geometry);
        let remaining = column.remaining_height();

        if height <= remaining + FIT_TOLERANCE {
            if let Some(block) = pending.pop_front() {
                place(&mut column, block, height);
            }
            continue;
        }

        let split_room = grid_floor(remaining, geometry);
        if head.block_type() == BlockType::Paragraph && split_room > MIN_SPLIT_HEIGHT {
            let pieces = split_block(head, split_room, width);
            if pieces.len() > 1 {
                pending.pop_front();
                let mut pieces = pieces.into_iter();
                if let Some(first) = pieces.next() {
                    let first_height = snapped_height(&first, geometry);
                    place(&mut column, first, first_height);
                }
                for piece in pieces.rev() {
                    pending.push_front(piece);
                }
                continue;
            }
        }

        if column.content.is_empty() {
            match policy {
                OversizePolicy::ForcePlace => {
                    warn!(
                        block_id = head.id(),
                        height,
                        column_height = column.height,
                        "Block taller than an empty column; placing it unsplit"
                    );
                    if let Some(block) = pending.pop_front() {
                        place(&mut column, block, height);
                    }
                }
                OversizePolicy::Reject => {
                    return Err(LayoutError::BlockTooTall {
                        block_id: head.id().to_string(),
                        height,
                        column_height: column.height,
                    });
                }
            }
        }

        column.is_full = true;
        break;
    }

    Ok(column)
}

fn place(column: &mut ColumnBox, block: LayoutBlock, height: f64) {
    column.used_height += height;
    column.content.push(block);
}

/// Estimated height, rounded up to the baseline grid when one is configured.
pub(crate) fn snapped_height(block: &LayoutBlock, geometry: &PageGeometry) -> f64 {
    let height = estimate_layout_block_height(block, geometry.column_width);
    match geometry.baseline_spacing {
        Some(spacing) => ((height / spacing) - FIT_TOLERANCE).ceil().max(1.0) * spacing,
        None => height,
    }
}

/// Largest grid multiple not above `remaining`; `remaining` itself off-grid.
fn grid_floor(remaining: f64, geometry: &PageGeometry) -> f64 {
    match geometry.baseline_spacing {
        Some(spacing) => ((remaining / spacing) + FIT_TOLERANCE).floor() * spacing,
        None => remaining,
    }
}

/// Gives each original paragraph's chunks contiguous indices in reading order.
/// Re-splitting a chunk can otherwise reuse an index.
fn renumber_chunks(pages: &mut [PageBox]) {
    let mut next_index: HashMap<String, usize> = HashMap::new();
    for column in pages.iter_mut().flat_map(|p| p.column_boxes.iter_mut()) {
        for block in column.content.iter_mut() {
            if let LayoutBlock::Chunk(chunk) = block {
                let index = next_index.entry(chunk.original_block_id.clone()).or_insert(0);
                chunk.chunk_index = *index;
                chunk.id = chunk_id(&chunk.original_block_id, *index);
                *index += 1;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{Block, Flow, FlowType};
    use crate::models::page_master::{Margins, PageMaster};
    use serde_json::json;

    fn heading(id: &str, text: &str) -> Block {
        Block::new(id, BlockType::Heading, json!({ "text": text, "level": 1 }))
    }

    fn paragraph(id: &str, text: &str) -> Block {
        Block::new(id, BlockType::Paragraph, json!({ "text": text }))
    }

    fn numbered_words(prefix: &str, n: usize) -> String {
        (0..n)
            .map(|i| format!("{prefix}{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn section_with(master: PageMaster, flows: Vec<Vec<Block>>) -> Section {
        Section {
            id: "sec-1".into(),
            name: "Body".into(),
            description: String::new(),
            layout_intent: "body".into(),
            page_master: master,
            flows: flows
                .into_iter()
                .enumerate()
                .map(|(i, blocks)| Flow {
                    id: format!("flow-{i}"),
                    flow_type: FlowType::Linear,
                    order: i as u32,
                    blocks: blocks
                        .into_iter()
                        .enumerate()
                        .map(|(j, b)| Block { order: j as u32, ..b })
                        .collect(),
                })
                .collect(),
            exclude_from_toc: false,
        }
    }

    /// Letter page whose content box is `height` inches tall.
    fn short_master(height: f64, columns: u32) -> PageMaster {
        let vertical = (11.0 - height) / 2.0;
        PageMaster {
            margins: Margins {
                top: vertical,
                right: 1.0,
                bottom: vertical,
                left: 1.0,
            },
            columns,
            column_gap: 0.5,
            ..PageMaster::default()
        }
    }

    fn layout(section: &Section) -> LayoutResult {
        generate_layout(section, &LayoutOptions::default()).unwrap()
    }

    fn placed_ids(result: &LayoutResult) -> Vec<String> {
        result.placements().map(|p| p.block.id().to_string()).collect()
    }

    /// Reassembles each source block's text from its placed entries.
    fn reconstructed(result: &LayoutResult) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = Vec::new();
        for p in result.placements() {
            let source = p.block.source_block_id().to_string();
            match out.last_mut() {
                Some((id, text)) if *id == source && p.block.is_chunk() => {
                    text.push(' ');
                    text.push_str(p.block.text());
                }
                _ => out.push((source, p.block.text().to_string())),
            }
        }
        out
    }

    // ── scenarios ───────────────────────────────────────────────────────────

    #[test]
    fn test_short_document_fits_one_page() {
        let section = section_with(
            PageMaster::default(),
            vec![vec![
                heading("h1", "Intro"),
                paragraph("p1", "A short opening line."),
                heading("h2", "Method"),
                paragraph("p2", "Another brief paragraph."),
                heading("h3", "Results"),
            ]],
        );
        let result = layout(&section);
        assert_eq!(result.total_pages, 1);
        assert!(!result.has_overflow);
        let column = &result.pages[0].column_boxes[0];
        let ids: Vec<&str> = column.content.iter().map(LayoutBlock::id).collect();
        assert_eq!(ids, vec!["h1", "p1", "h2", "p2", "h3"]);
        assert!((column.used_height - (1.5 + 2.0 * 0.167)).abs() < 1e-9);
    }

    #[test]
    fn test_tall_paragraph_splits_across_columns() {
        // 1.0in-tall, 3.0in-wide columns (5 words per line): 40 words need 1.336in.
        let master = short_master(1.0, 2);
        let text = numbered_words("w", 40);
        let section = section_with(master, vec![vec![paragraph("p", &text)]]);
        let result = layout(&section);

        let chunks: Vec<&LayoutBlock> = result.placements().map(|p| p.block).collect();
        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| c.is_chunk() && c.source_block_id() == "p"));
        assert_eq!(reconstructed(&result), vec![("p".to_string(), text)]);

        let first = result.placements().next().unwrap();
        let second = result.placements().nth(1).unwrap();
        assert_eq!((first.page_number, first.column_index), (1, 0));
        assert_eq!((second.page_number, second.column_index), (1, 1));
        assert_eq!(first.block.id(), "p-chunk-0");
        assert_eq!(second.block.id(), "p-chunk-1");
    }

    #[test]
    fn test_empty_section_yields_one_page() {
        let section = section_with(PageMaster::default(), vec![]);
        let result = layout(&section);
        assert_eq!(result.total_pages, 1);
        assert!(!result.has_overflow);
        assert_eq!(result.pages[0].page_number, 1);
        assert!(result.pages[0].column_boxes[0].content.is_empty());
    }

    // ── properties ──────────────────────────────────────────────────────────

    fn mixed_section(master: PageMaster) -> Section {
        let mut first = Vec::new();
        let mut second = Vec::new();
        for i in 0..12 {
            first.push(heading(&format!("h{i}"), "Heading"));
            first.push(paragraph(&format!("p{i}"), &numbered_words("a", 20 + i * 13)));
            second.push(Block::new(format!("img{i}"), BlockType::Image, json!({})));
            second.push(Block::new(
                format!("l{i}"),
                BlockType::List,
                json!({ "items": vec!["x"; i % 5 + 1] }),
            ));
            second.push(Block::new(format!("q{i}"), BlockType::Quote, json!("q")));
        }
        section_with(master, vec![first, second])
    }

    #[test]
    fn test_conservation_and_order() {
        let section = mixed_section(short_master(4.0, 3));
        let result = layout(&section);

        let expected: Vec<(String, String)> = section
            .ordered_blocks()
            .iter()
            .map(|b| (b.id.clone(), b.text().to_string()))
            .collect();
        assert_eq!(reconstructed(&result), expected);
    }

    #[test]
    fn test_page_numbers_are_sequential() {
        let result = layout(&mixed_section(short_master(3.0, 2)));
        assert!(result.total_pages > 1);
        assert_eq!(result.total_pages as usize, result.pages.len());
        for (i, page) in result.pages.iter().enumerate() {
            assert_eq!(page.page_number, i as u32 + 1);
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let section = mixed_section(short_master(3.5, 2));
        assert_eq!(layout(&section), layout(&section));
    }

    #[test]
    fn test_fit_invariant_for_columns_not_full() {
        let result = layout(&mixed_section(short_master(2.5, 3)));
        for column in result.pages.iter().flat_map(|p| &p.column_boxes) {
            let sum: f64 = column
                .content
                .iter()
                .map(|b| estimate_layout_block_height(b, column.width))
                .sum();
            assert!((sum - column.used_height).abs() < 1e-9);
            if !column.is_full {
                assert!(sum <= column.height + FIT_TOLERANCE);
            }
        }
    }

    #[test]
    fn test_overflow_flags_on_intermediate_pages_only() {
        let result = layout(&mixed_section(short_master(3.0, 1)));
        let (last, rest) = result.pages.split_last().unwrap();
        assert!(rest.iter().all(|p| p.has_overflow));
        assert!(!last.has_overflow);
        assert!(!result.has_overflow);
    }

    #[test]
    fn test_first_page_number_offset() {
        let options = LayoutOptions {
            first_page_number: 7,
            ..LayoutOptions::default()
        };
        let result = generate_layout(&mixed_section(short_master(3.0, 1)), &options).unwrap();
        assert_eq!(result.pages[0].page_number, 7);
        assert_eq!(
            result.pages.last().unwrap().page_number,
            7 + result.total_pages - 1
        );
    }

    // ── edge policy ─────────────────────────────────────────────────────────

    #[test]
    fn test_block_that_does_not_fit_moves_to_next_column() {
        // 2.5in columns: heading (0.5) + image (2.0) fill column 0 exactly,
        // the second image goes to column 1.
        let section = section_with(
            short_master(2.5, 2),
            vec![vec![
                heading("h", "Title"),
                Block::new("img1", BlockType::Image, json!({})),
                Block::new("img2", BlockType::Image, json!({})),
            ]],
        );
        let result = layout(&section);
        let page = &result.pages[0];
        assert_eq!(page.column_boxes.len(), 2);
        assert_eq!(page.column_boxes[0].content.len(), 2);
        assert!(page.column_boxes[0].is_full);
        assert_eq!(page.column_boxes[1].content[0].id(), "img2");
    }

    #[test]
    fn test_stops_opening_columns_once_queue_empties() {
        let section = section_with(short_master(4.0, 3), vec![vec![heading("h", "Only")]]);
        let result = layout(&section);
        assert_eq!(result.pages[0].column_boxes.len(), 1);
    }

    #[test]
    fn test_oversized_block_is_force_placed() {
        // 1.5in columns cannot hold a 2.0in image.
        let section = section_with(
            short_master(1.5, 1),
            vec![vec![
                heading("h", "Before"),
                Block::new("img", BlockType::Image, json!({})),
                heading("h2", "After"),
            ]],
        );
        let result = layout(&section);
        assert_eq!(placed_ids(&result), vec!["h", "img", "h2"]);
        assert_eq!(result.total_pages, 3);
        let image_column = &result.pages[1].column_boxes[0];
        assert!(image_column.is_full);
        assert_eq!(image_column.content.len(), 1);
        assert!(!result.has_overflow);
    }

    #[test]
    fn test_oversized_block_rejected_under_reject_policy() {
        let section = section_with(
            short_master(1.5, 1),
            vec![vec![Block::new("img", BlockType::Image, json!({}))]],
        );
        let options = LayoutOptions {
            oversize_policy: OversizePolicy::Reject,
            ..LayoutOptions::default()
        };
        match generate_layout(&section, &options) {
            Err(LayoutError::BlockTooTall { block_id, .. }) => assert_eq!(block_id, "img"),
            other => panic!("expected BlockTooTall, got {other:?}"),
        }
    }

    #[test]
    fn test_page_limit_is_enforced() {
        let options = LayoutOptions {
            max_pages: 2,
            ..LayoutOptions::default()
        };
        let err = generate_layout(&mixed_section(short_master(2.0, 1)), &options).unwrap_err();
        assert_eq!(err, LayoutError::PageLimitExceeded { max_pages: 2 });
    }

    #[test]
    fn test_zero_page_limit_still_yields_first_page() {
        let options = LayoutOptions {
            max_pages: 0,
            ..LayoutOptions::default()
        };
        let empty = section_with(PageMaster::default(), vec![]);
        assert_eq!(generate_layout(&empty, &options).unwrap().total_pages, 1);
    }

    #[test]
    fn test_page_number_overflow_is_an_error() {
        // 2.0in content height: one image per page.
        let images = (0..8)
            .map(|i| Block::new(format!("img{i}"), BlockType::Image, json!({})))
            .collect();
        let section = section_with(short_master(2.0, 1), vec![images]);
        let options = LayoutOptions {
            first_page_number: u32::MAX,
            ..LayoutOptions::default()
        };
        assert_eq!(
            generate_layout(&section, &options).unwrap_err(),
            LayoutError::PageNumberOverflow {
                first_page_number: u32::MAX,
                pages: 1,
            }
        );
    }

    #[test]
    fn test_column_boxes_only_opened_while_content_remains() {
        let master = PageMaster {
            columns: crate::layout::geometry::MAX_COLUMNS,
            column_gap: 0.0,
            ..PageMaster::default()
        };
        let section = section_with(master, vec![vec![heading("h", "x")]]);
        let result = layout(&section);
        assert_eq!(result.pages[0].column_boxes.len(), 1);
    }

    #[test]
    fn test_unbounded_column_count_is_rejected() {
        let master = PageMaster {
            columns: u32::MAX,
            column_gap: 0.0,
            ..PageMaster::default()
        };
        let section = section_with(master, vec![vec![heading("h", "x")]]);
        assert!(matches!(
            generate_layout(&section, &LayoutOptions::default()),
            Err(LayoutError::InvalidPageMaster(_))
        ));
    }

    #[test]
    fn test_invalid_page_master_fails_fast() {
        let master = PageMaster {
            columns: 0,
            ..PageMaster::default()
        };
        let section = section_with(master, vec![vec![heading("h", "x")]]);
        assert!(matches!(
            generate_layout(&section, &LayoutOptions::default()),
            Err(LayoutError::InvalidPageMaster(_))
        ));
    }

    #[test]
    fn test_paragraph_not_split_when_little_room_remains() {
        // 1.0in column: heading takes 0.5in, leaving exactly 0.5in (not > 0.5).
        let section = section_with(
            short_master(1.0, 1),
            vec![vec![heading("h", "x"), paragraph("p", &numbered_words("w", 80))]],
        );
        let result = layout(&section);
        let first_column = &result.pages[0].column_boxes[0];
        assert_eq!(first_column.content.len(), 1);
        assert!(first_column.is_full);
        assert_eq!(result.pages[1].column_boxes[0].content[0].id(), "p-chunk-0");
    }

    #[test]
    fn test_baseline_grid_snaps_heights() {
        let master = PageMaster {
            baseline_grid: true,
            baseline_spacing: 0.2,
            ..short_master(2.0, 1)
        };
        let section = section_with(
            master,
            vec![vec![
                Block::new("q", BlockType::Unknown, json!(null)),
                paragraph("p", &numbered_words("w", 200)),
            ]],
        );
        let result = layout(&section);
        for column in result.pages.iter().flat_map(|p| &p.column_boxes) {
            assert!(column.used_height <= column.height + FIT_TOLERANCE);
            let steps = column.used_height / 0.2;
            assert!((steps - steps.round()).abs() < 1e-6, "used height stays on grid");
        }
        assert_eq!(
            reconstructed(&result).last().unwrap().1,
            numbered_words("w", 200)
        );
    }

    #[tokio::test]
    async fn test_blocking_wrapper_matches_sync() {
        let section = mixed_section(short_master(3.0, 2));
        let expected = layout(&section);
        let result = generate_layout_blocking(section, LayoutOptions::default())
            .await
            .unwrap();
        assert_eq!(result, expected);
    }
}
