//! Anchor Tracker — positions and auto-numbers for cross-reference targets.
//!
//! The tracker is the one piece of layout state that lives across calls. It is
//! an explicitly constructed value: callers own it, mutate it through `&mut self`
//! and call `clear()` when a document is unloaded so figure and table numbers
//! never bleed from one document into the next.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorType {
    Heading,
    Figure,
    Table,
    Callout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorReference {
    pub id: String,
    #[serde(rename = "type")]
    pub anchor_type: AnchorType,
    pub block_id: String,
    pub page_number: u32,
    pub column_index: u32,
    pub position_in_column: u32,
    pub title: Option<String>,
    /// Sequence number; figures and tables only.
    pub number: Option<u32>,
}

/// Registration input for `AnchorTracker::register_anchor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnchor {
    pub id: String,
    #[serde(rename = "type")]
    pub anchor_type: AnchorType,
    pub block_id: String,
    pub page_number: u32,
    pub column_index: u32,
    pub position_in_column: u32,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    See,
    Figure,
    Table,
    Section,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossReference {
    pub id: Uuid,
    pub source_block_id: String,
    pub target_anchor_id: String,
    pub kind: ReferenceKind,
    /// Literal text shown when the target anchor no longer exists.
    pub fallback_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedReference {
    pub cross_reference: CrossReference,
    pub anchor: Option<AnchorReference>,
    pub resolved_text: String,
}

/// New position for an existing anchor after a re-layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorPosition {
    pub anchor_id: String,
    pub page_number: u32,
    pub column_index: u32,
    pub position_in_column: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Tracker
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AnchorTracker {
    anchors: HashMap<String, AnchorReference>,
    cross_references: Vec<CrossReference>,
    figure_count: u32,
    table_count: u32,
}

impl AnchorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every anchor and cross-reference and restarts numbering at 1.
    pub fn clear(&mut self) {
        self.anchors.clear();
        self.cross_references.clear();
        self.figure_count = 0;
        self.table_count = 0;
    }

    /// Inserts or overwrites an anchor. Figures and tables take the next number
    /// of their sequence on every registration.
    pub fn register_anchor(&mut self, anchor: NewAnchor) -> &AnchorReference {
        let number = match anchor.anchor_type {
            AnchorType::Figure => {
                self.figure_count += 1;
                Some(self.figure_count)
            }
            AnchorType::Table => {
                self.table_count += 1;
                Some(self.table_count)
            }
            AnchorType::Heading | AnchorType::Callout => None,
        };

        let reference = AnchorReference {
            id: anchor.id.clone(),
            anchor_type: anchor.anchor_type,
            block_id: anchor.block_id,
            page_number: anchor.page_number,
            column_index: anchor.column_index,
            position_in_column: anchor.position_in_column,
            title: anchor.title,
            number,
        };
        self.anchors.insert(anchor.id.clone(), reference);
        &self.anchors[&anchor.id]
    }

    pub fn get_anchor(&self, id: &str) -> Option<&AnchorReference> {
        self.anchors.get(id)
    }

    /// Removes an anchor. References to it fall back to their literal text.
    pub fn remove_anchor(&mut self, id: &str) -> Option<AnchorReference> {
        self.anchors.remove(id)
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn add_cross_reference(
        &mut self,
        source_block_id: &str,
        target_anchor_id: &str,
        kind: ReferenceKind,
        fallback_text: &str,
    ) -> &CrossReference {
        self.cross_references.push(CrossReference {
            id: Uuid::new_v4(),
            source_block_id: source_block_id.to_string(),
            target_anchor_id: target_anchor_id.to_string(),
            kind,
            fallback_text: fallback_text.to_string(),
        });
        &self.cross_references[self.cross_references.len() - 1]
    }

    /// Copies `other`'s cross-references into this tracker, keeping their ids.
    pub fn carry_cross_references(&mut self, other: &AnchorTracker) {
        self.cross_references
            .extend(other.cross_references.iter().cloned());
    }

    pub fn cross_references(&self) -> &[CrossReference] {
        &self.cross_references
    }

    /// References whose source is `block_id`, in insertion order.
    pub fn cross_references_from<'a>(
        &'a self,
        block_id: &'a str,
    ) -> impl Iterator<Item = &'a CrossReference> + 'a {
        self.cross_references
            .iter()
            .filter(move |r| r.source_block_id == block_id)
    }

    pub fn remove_cross_reference(&mut self, id: Uuid) -> Option<CrossReference> {
        let index = self.cross_references.iter().position(|r| r.id == id)?;
        Some(self.cross_references.remove(index))
    }

    /// Resolves a reference to display text. `None` only if the reference id
    /// itself is unknown; a missing target anchor degrades to the fallback text.
    pub fn resolve_cross_reference(&self, id: Uuid) -> Option<ResolvedReference> {
        let cross_reference = self.cross_references.iter().find(|r| r.id == id)?;
        let anchor = self.anchors.get(&cross_reference.target_anchor_id);

        let resolved_text = match anchor {
            Some(anchor) => format_reference(cross_reference.kind, anchor),
            None => {
                debug!(
                    reference = %cross_reference.id,
                    target = %cross_reference.target_anchor_id,
                    "Cross-reference target missing; using fallback text"
                );
                let fallback = cross_reference.fallback_text.trim();
                if fallback.is_empty() {
                    placeholder(cross_reference.kind).to_string()
                } else {
                    fallback.to_string()
                }
            }
        };

        Some(ResolvedReference {
            cross_reference: cross_reference.clone(),
            anchor: anchor.cloned(),
            resolved_text,
        })
    }

    /// Headings in reading order: page, then column, then position.
    pub fn table_of_contents(&self) -> Vec<&AnchorReference> {
        let mut headings = self.of_type(AnchorType::Heading);
        headings.sort_by(|a, b| {
            (a.page_number, a.column_index, a.position_in_column, &a.id).cmp(&(
                b.page_number,
                b.column_index,
                b.position_in_column,
                &b.id,
            ))
        });
        headings
    }

    pub fn list_of_figures(&self) -> Vec<&AnchorReference> {
        self.numbered(AnchorType::Figure)
    }

    pub fn list_of_tables(&self) -> Vec<&AnchorReference> {
        self.numbered(AnchorType::Table)
    }

    /// Rewrites positions in bulk after a re-layout. Numbers and titles are kept.
    /// Returns how many anchors were found and updated.
    pub fn update_anchor_positions(&mut self, batch: &[AnchorPosition]) -> usize {
        let mut updated = 0;
        for position in batch {
            match self.anchors.get_mut(&position.anchor_id) {
                Some(anchor) => {
                    anchor.page_number = position.page_number;
                    anchor.column_index = position.column_index;
                    anchor.position_in_column = position.position_in_column;
                    updated += 1;
                }
                None => debug!(anchor = %position.anchor_id, "Position update for unknown anchor"),
            }
        }
        updated
    }

    /// Drops every anchor whose id `keep` rejects. Returns how many went.
    pub fn retain_anchors(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.anchors.len();
        self.anchors.retain(|id, _| keep(id));
        before - self.anchors.len()
    }

    fn of_type(&self, anchor_type: AnchorType) -> Vec<&AnchorReference> {
        self.anchors
            .values()
            .filter(|a| a.anchor_type == anchor_type)
            .collect()
    }

    fn numbered(&self, anchor_type: AnchorType) -> Vec<&AnchorReference> {
        let mut anchors = self.of_type(anchor_type);
        anchors.sort_by(|a, b| (a.number, &a.id).cmp(&(b.number, &b.id)));
        anchors
    }
}

fn format_reference(kind: ReferenceKind, anchor: &AnchorReference) -> String {
    let number = anchor
        .number
        .map_or_else(|| "?".to_string(), |n| n.to_string());
    let titled = |label: &str| match &anchor.title {
        Some(title) => format!("{label} {number}: {title}"),
        None => format!("{label} {number}"),
    };
    match kind {
        ReferenceKind::Figure => titled("Figure"),
        ReferenceKind::Table => titled("Table"),
        ReferenceKind::Section => anchor
            .title
            .clone()
            .unwrap_or_else(|| format!("Section on page {}", anchor.page_number)),
        ReferenceKind::See => format!("see page {}", anchor.page_number),
    }
}

fn placeholder(kind: ReferenceKind) -> &'static str {
    match kind {
        ReferenceKind::Figure => "Figure ?",
        ReferenceKind::Table => "Table ?",
        ReferenceKind::Section => "Section ?",
        ReferenceKind::See => "see page ?",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
