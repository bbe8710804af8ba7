//! Derives anchor registrations and positions from a document layout.
//!
//! After every re-layout the anchor state is rebuilt as a whole from the new
//! `DocumentLayout`: anchors are registered in reading order (so figure and
//! table numbers follow the document) and existing cross-references are carried
//! over. Stale and fresh positions are never mixed.

use crate::anchors::tracker::{AnchorPosition, AnchorTracker, AnchorType, NewAnchor};
use crate::layout::document::DocumentLayout;
use crate::models::document::BlockType;
use crate::models::layout::LayoutBlock;

/// Anchor type for an authored block type, if that type is a reference target.
pub fn anchor_type_for(block_type: BlockType) -> Option<AnchorType> {
    match block_type {
        BlockType::Heading => Some(AnchorType::Heading),
        BlockType::Figure => Some(AnchorType::Figure),
        BlockType::Table => Some(AnchorType::Table),
        BlockType::Callout => Some(AnchorType::Callout),
        _ => None,
    }
}

/// Every anchor the layout places, in reading order across all sections.
pub fn anchors_in_layout(layout: &DocumentLayout) -> Vec<NewAnchor> {
    layout
        .sections
        .iter()
        .flat_map(|section| section.layout.placements())
        .filter_map(|placement| {
            // Chunks are paragraph text and never anchors.
            let LayoutBlock::Authored(block) = placement.block else {
                return None;
            };
            let anchor_type = anchor_type_for(block.block_type)?;
            Some(NewAnchor {
                id: block.anchor_id().to_string(),
                anchor_type,
                block_id: block.id.clone(),
                page_number: placement.page_number,
                column_index: placement.column_index,
                position_in_column: placement.position_in_column,
                title: block.title(),
            })
        })
        .collect()
}

/// Complete position set for a layout, for `AnchorTracker::update_anchor_positions`.
pub fn anchor_positions(layout: &DocumentLayout) -> Vec<AnchorPosition> {
    anchors_in_layout(layout)
        .into_iter()
        .map(|a| AnchorPosition {
            anchor_id: a.id,
            page_number: a.page_number,
            column_index: a.column_index,
            position_in_column: a.position_in_column,
        })
        .collect()
}

/// Builds a fresh tracker for `layout`, keeping `previous`'s cross-references.
pub fn rebuild_tracker(previous: Option<&AnchorTracker>, layout: &DocumentLayout) -> AnchorTracker {
    let mut tracker = AnchorTracker::new();
    for anchor in anchors_in_layout(layout) {
        tracker.register_anchor(anchor);
    }
    if let Some(previous) = previous {
        tracker.carry_cross_references(previous);
    }
    tracker
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::tracker::ReferenceKind;
    use crate::layout::document::generate_document_layout;
    use crate::layout::engine::LayoutOptions;
    use crate::models::document::{Block, Document, Flow, FlowType, Section};
    use crate::models::page_master::{Margins, PageMaster};
    use serde_json::json;

    /// One image-sized block per page (2.0in content height).
    fn section(id: &str, blocks: Vec<Block>) -> Section {
        Section {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            layout_intent: String::new(),
            page_master: PageMaster {
                margins: Margins {
                    top: 4.5,
                    right: 1.0,
                    bottom: 4.5,
                    left: 1.0,
                },
                ..PageMaster::default()
            },
            flows: vec![Flow {
                id: format!("{id}-flow"),
                flow_type: FlowType::Linear,
                order: 0,
                blocks,
            }],
            exclude_from_toc: false,
        }
    }

    fn sample_layout() -> DocumentLayout {
        let doc = Document {
            id: "doc".into(),
            title: String::new(),
            sections: vec![
                section(
                    "a",
                    vec![
                        Block::new("h1", BlockType::Heading, json!({ "text": "Overview" })),
                        Block::new("img", BlockType::Image, json!({})),
                        Block::new("fig1", BlockType::Figure, json!({ "caption": "Flow" })),
                    ],
                ),
                section(
                    "b",
                    vec![
                        Block::new("t1", BlockType::Table, json!({ "title": "Costs" })),
                        Block::new("fig2", BlockType::Figure, json!({})),
                        Block::new("p", BlockType::Paragraph, json!("body text")),
                    ],
                ),
            ],
        };
        generate_document_layout(&doc, &LayoutOptions::default()).unwrap()
    }

    #[test]
    fn test_anchors_follow_reading_order() {
        let anchors = anchors_in_layout(&sample_layout());
        let ids: Vec<&str> = anchors.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["h1", "fig1", "t1", "fig2"]);
        assert_eq!(anchors[0].title.as_deref(), Some("Overview"));
        // The image fills page 2 on its own, so fig1 lands on page 3.
        assert_eq!(anchors[1].page_number, 3);
        assert_eq!(anchors[2].page_number, 4);
        assert_eq!(anchors[3].position_in_column, 1);
    }

    #[test]
    fn test_rebuild_numbers_in_document_order() {
        let tracker = rebuild_tracker(None, &sample_layout());
        let figures: Vec<(&str, Option<u32>)> = tracker
            .list_of_figures()
            .iter()
            .map(|a| (a.id.as_str(), a.number))
            .collect();
        assert_eq!(figures, vec![("fig1", Some(1)), ("fig2", Some(2))]);
        assert_eq!(tracker.get_anchor("t1").unwrap().number, Some(1));
    }

    #[test]
    fn test_rebuild_carries_cross_references() {
        let layout = sample_layout();
        let mut previous = rebuild_tracker(None, &layout);
        let id = previous
            .add_cross_reference("p", "fig2", ReferenceKind::Figure, "")
            .id;
        let rebuilt = rebuild_tracker(Some(&previous), &layout);
        assert_eq!(
            rebuilt.resolve_cross_reference(id).unwrap().resolved_text,
            "Figure 2"
        );
    }

    #[test]
    fn test_positions_match_registrations() {
        let layout = sample_layout();
        let mut tracker = rebuild_tracker(None, &layout);
        let positions = anchor_positions(&layout);
        assert_eq!(tracker.update_anchor_positions(&positions), 4);
    }
}
