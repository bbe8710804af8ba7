//! Table-of-Contents Generator — heading entries with resolved page numbers.
//!
//! Entries come out in document order (section, flow, block), not sorted by
//! page; the two agree because layout never reorders blocks.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::document::{BlockType, Document};
use crate::models::layout::LayoutResult;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderStyle {
    #[default]
    Dots,
    Dashes,
    Underscore,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageNumberAlignment {
    #[default]
    Right,
    Inline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TocConfiguration {
    pub title: String,
    /// `include_levels[n]` enables headings of level `n + 1`.
    pub include_levels: [bool; 6],
    pub exclude_sections: Vec<String>,
    pub columns: u32,
    pub leader_style: LeaderStyle,
    pub page_number_alignment: PageNumberAlignment,
    /// Indent per heading level below 1, in inches.
    pub indentation: f64,
}

impl Default for TocConfiguration {
    /// Levels 1–3, dotted leaders, right-aligned numbers, 0.25in per level.
    fn default() -> Self {
        Self {
            title: "Table of Contents".to_string(),
            include_levels: [true, true, true, false, false, false],
            exclude_sections: Vec::new(),
            columns: 1,
            leader_style: LeaderStyle::Dots,
            page_number_alignment: PageNumberAlignment::Right,
            indentation: 0.25,
        }
    }
}

impl TocConfiguration {
    fn includes_level(&self, level: u8) -> bool {
        (1..=6).contains(&level) && self.include_levels[level as usize - 1]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entries
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocEntry {
    pub text: String,
    pub level: u8,
    pub page_number: u32,
    pub section_id: String,
    pub section_name: String,
    pub block_id: String,
}

/// Builds TOC entries for `document`.
///
/// Skipped: sections listed in `config.exclude_sections`, sections flagged
/// `exclude_from_toc`, the section hosting the TOC itself
/// (`exclude_current_section_id`), headings filtered out by level or by their
/// `includeInTOC` override, and headings with no page in `layouts` yet.
///
/// `includeInTOC: true` forces a heading in regardless of its level;
/// `false` forces it out.
pub fn generate_toc<K, V>(
    document: &Document,
    layouts: &HashMap<K, V>,
    config: &TocConfiguration,
    exclude_current_section_id: Option<&str>,
) -> Vec<TocEntry>
where
    K: Borrow<str> + Eq + Hash,
    V: Borrow<LayoutResult>,
{
    let mut entries = Vec::new();

    for section in &document.sections {
        if section.exclude_from_toc
            || config.exclude_sections.iter().any(|id| *id == section.id)
            || exclude_current_section_id == Some(section.id.as_str())
        {
            continue;
        }
        let layout = layouts
            .get(section.id.as_str())
            .map(<V as Borrow<LayoutResult>>::borrow);

        for block in section.ordered_blocks() {
            if block.block_type != BlockType::Heading {
                continue;
            }
            let level = block.heading_level();
            let included = block
                .include_in_toc()
                .unwrap_or_else(|| config.includes_level(level));
            if !included {
                continue;
            }

            let Some(page_number) = layout.and_then(|l| l.page_of_block(&block.id)) else {
                debug!(block = %block.id, section = %section.id, "Heading not laid out; omitted from TOC");
                continue;
            };

            entries.push(TocEntry {
                text: block.text().trim().to_string(),
                level,
                page_number,
                section_id: section.id.clone(),
                section_name: section.name.clone(),
                block_id: block.id.clone(),
            });
        }
    }

    entries
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
