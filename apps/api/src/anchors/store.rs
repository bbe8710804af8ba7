//! Per-document anchor state owned by the service.
//!
//! Each document's tracker sits behind an `Arc` and is never mutated in place:
//! writers build a complete replacement under the write lock and swap it in, so
//! a reader holding a snapshot never sees a half-updated numbering sequence.
//! The write lock also serializes all writers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::anchors::sync::{anchor_positions, rebuild_tracker};
use crate::anchors::tracker::{AnchorTracker, CrossReference, ReferenceKind};
use crate::layout::document::DocumentLayout;

#[derive(Clone, Default)]
pub struct AnchorStore {
    trackers: Arc<RwLock<HashMap<Uuid, Arc<AnchorTracker>>>>,
}

impl AnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tracker for a document, if one is loaded.
    pub async fn snapshot(&self, document_id: Uuid) -> Option<Arc<AnchorTracker>> {
        self.trackers.read().await.get(&document_id).cloned()
    }

    /// Replaces the document's anchors with ones derived from a fresh layout.
    /// Cross-references survive; numbering restarts from the new reading order.
    pub async fn rebuild_from_layout(
        &self,
        document_id: Uuid,
        layout: &DocumentLayout,
    ) -> Arc<AnchorTracker> {
        let mut trackers = self.trackers.write().await;
        let previous = trackers.get(&document_id).map(Arc::as_ref);
        let tracker = Arc::new(rebuild_tracker(previous, layout));
        trackers.insert(document_id, Arc::clone(&tracker));
        info!(
            document = %document_id,
            anchors = tracker.anchor_count(),
            "Anchor map rebuilt"
        );
        tracker
    }

    /// Rewrites every known anchor's position from `layout`, keeping numbers.
    /// Anchors no longer placed by `layout` are dropped, so references to them
    /// fall back to their literal text. Returns `None` if the document has no
    /// anchors loaded.
    pub async fn refresh_positions(
        &self,
        document_id: Uuid,
        layout: &DocumentLayout,
    ) -> Option<usize> {
        let positions = anchor_positions(layout);
        let placed: HashSet<&str> = positions.iter().map(|p| p.anchor_id.as_str()).collect();

        let mut trackers = self.trackers.write().await;
        let current = trackers.get(&document_id)?;
        let mut next = AnchorTracker::clone(current);
        let removed = next.retain_anchors(|id| placed.contains(id));
        let updated = next.update_anchor_positions(&positions);
        trackers.insert(document_id, Arc::new(next));
        if removed > 0 {
            debug!(document = %document_id, removed, "Dropped anchors no longer in layout");
        }
        Some(updated)
    }

    /// Adds a cross-reference, creating an empty tracker for unknown documents.
    pub async fn add_cross_reference(
        &self,
        document_id: Uuid,
        source_block_id: &str,
        target_anchor_id: &str,
        kind: ReferenceKind,
        fallback_text: &str,
    ) -> CrossReference {
        let mut trackers = self.trackers.write().await;
        let mut next = trackers
            .get(&document_id)
            .map(|t| AnchorTracker::clone(t))
            .unwrap_or_default();
        let reference = next
            .add_cross_reference(source_block_id, target_anchor_id, kind, fallback_text)
            .clone();
        trackers.insert(document_id, Arc::new(next));
        reference
    }

    /// Drops a document's anchor state on unload. Returns whether any existed.
    pub async fn unload(&self, document_id: Uuid) -> bool {
        let removed = self.trackers.write().await.remove(&document_id).is_some();
        if removed {
            info!(document = %document_id, "Anchor state cleared");
        }
        removed
    }
}
