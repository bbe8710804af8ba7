//! Whole-document layout with a running page offset across sections.
//!
//! Sections are laid out in order; section *k* starts numbering at one past the
//! last page of section *k − 1*, so page numbers are document-global. This is
//! the shape the export pipeline and the TOC generator consume.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{AppError, LayoutError};
use crate::layout::engine::{generate_layout, LayoutOptions};
use crate::models::document::Document;
use crate::models::layout::LayoutResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionLayout {
    pub section_id: String,
    pub section_name: String,
    pub layout: LayoutResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLayout {
    pub document_id: String,
    pub sections: Vec<SectionLayout>,
    pub total_pages: u32,
    /// True if any section ended with content still pending.
    pub has_overflow: bool,
}

impl DocumentLayout {
    /// Borrowed view keyed by section id, as taken by `toc::generate_toc`.
    pub fn layouts_by_section_id(&self) -> HashMap<&str, &LayoutResult> {
        self.sections
            .iter()
            .map(|s| (s.section_id.as_str(), &s.layout))
            .collect()
    }
}

/// Lays out every section of `document`, threading the page offset through.
///
/// `options.first_page_number` numbers the first page of the first section.
pub fn generate_document_layout(
    document: &Document,
    options: &LayoutOptions,
) -> Result<DocumentLayout, LayoutError> {
    let mut total_pages: u32 = 0;
    let mut sections = Vec::with_capacity(document.sections.len());

    for section in &document.sections {
        let overflow = LayoutError::PageNumberOverflow {
            first_page_number: options.first_page_number,
            pages: total_pages,
        };
        let section_options = LayoutOptions {
            first_page_number: options
                .first_page_number
                .checked_add(total_pages)
                .ok_or_else(|| overflow.clone())?,
            ..options.clone()
        };
        let layout = generate_layout(section, &section_options)?;
        total_pages = total_pages
            .checked_add(layout.total_pages)
            .ok_or(overflow)?;
        sections.push(SectionLayout {
            section_id: section.id.clone(),
            section_name: section.name.clone(),
            layout,
        });
    }

    let has_overflow = sections.iter().any(|s| s.layout.has_overflow);

    info!(
        document = %document.id,
        sections = sections.len(),
        total_pages,
        "Document laid out"
    );

    Ok(DocumentLayout {
        document_id: document.id.clone(),
        sections,
        total_pages,
        has_overflow,
    })
}

/// Runs `generate_document_layout` on the blocking pool.
pub async fn generate_document_layout_blocking(
    document: Document,
    options: LayoutOptions,
) -> Result<DocumentLayout, AppError> {
    let result =
        tokio::task::spawn_blocking(move || generate_document_layout(&document, &options))
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!(
                    "spawn_blocking failed in document layout: {e}"
                ))
            })?;
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{Block, BlockType, Flow, FlowType, Section};
    use crate::models::page_master::{Margins, PageMaster};
    use serde_json::json;

    fn images_section(id: &str, count: usize) -> Section {
        Section {
            id: id.into(),
            name: format!("Section {id}"),
            description: String::new(),
            layout_intent: String::new(),
            // 2.0in content height: one image per page.
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
                blocks: (0..count)
                    .map(|i| Block::new(format!("{id}-img{i}"), BlockType::Image, json!({})))
                    .collect(),
            }],
            exclude_from_toc: false,
        }
    }

    fn document(sections: Vec<Section>) -> Document {
        Document {
            id: "doc".into(),
            title: "Doc".into(),
            sections,
        }
    }

    #[test]
    fn test_page_numbers_run_across_sections() {
        let doc = document(vec![images_section("a", 3), images_section("b", 2)]);
        let layout = generate_document_layout(&doc, &LayoutOptions::default()).unwrap();
        assert_eq!(layout.total_pages, 5);
        let numbers: Vec<u32> = layout
            .sections
            .iter()
            .flat_map(|s| s.layout.pages.iter().map(|p| p.page_number))
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_sections_still_take_a_page() {
        let doc = document(vec![images_section("a", 0), images_section("b", 1)]);
        let layout = generate_document_layout(&doc, &LayoutOptions::default()).unwrap();
        assert_eq!(layout.total_pages, 2);
        assert_eq!(layout.sections[1].layout.pages[0].page_number, 2);
    }

    #[test]
    fn test_layouts_by_section_id() {
        let doc = document(vec![images_section("a", 1), images_section("b", 1)]);
        let layout = generate_document_layout(&doc, &LayoutOptions::default()).unwrap();
        let by_id = layout.layouts_by_section_id();
        assert_eq!(by_id["b"].pages[0].page_number, 2);
    }

    #[test]
    fn test_page_numbers_may_end_at_the_largest_number() {
        let doc = document(vec![images_section("a", 1), images_section("b", 1)]);
        let options = LayoutOptions {
            first_page_number: u32::MAX - 1,
            ..LayoutOptions::default()
        };
        let layout = generate_document_layout(&doc, &options).unwrap();
        assert_eq!(layout.sections[1].layout.pages[0].page_number, u32::MAX);
    }

    #[test]
    fn test_page_number_overflow_across_sections_is_an_error() {
        let doc = document(vec![images_section("a", 2), images_section("b", 1)]);
        let options = LayoutOptions {
            first_page_number: u32::MAX - 1,
            ..LayoutOptions::default()
        };
        assert!(matches!(
            generate_document_layout(&doc, &options),
            Err(LayoutError::PageNumberOverflow { .. })
        ));
    }

    #[test]
    fn test_invalid_section_fails_whole_document() {
        let mut bad = images_section("b", 1);
        bad.page_master.columns = 0;
        let doc = document(vec![images_section("a", 1), bad]);
        assert!(generate_document_layout(&doc, &LayoutOptions::default()).is_err());
    }
}
