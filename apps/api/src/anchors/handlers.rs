//! Axum route handlers for the Anchor API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::anchors::tracker::{AnchorReference, CrossReference, ReferenceKind, ResolvedReference};
use crate::errors::AppError;
use crate::layout::document::generate_document_layout_blocking;
use crate::layout::engine::LayoutOptions;
use crate::layout::handlers::request_options;
use crate::models::document::Document;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAnchorsRequest {
    pub document: Document,
    #[serde(default)]
    pub options: Option<LayoutOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAnchorsResponse {
    pub anchors: usize,
    pub figures: usize,
    pub tables: usize,
    pub total_pages: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshPositionsResponse {
    pub updated: usize,
    pub total_pages: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCrossReferenceRequest {
    pub source_block_id: String,
    pub target_anchor_id: String,
    pub kind: ReferenceKind,
    #[serde(default)]
    pub fallback_text: String,
}

#[derive(Debug, Clone, Copy)]
enum AnchorListKind {
    Headings,
    Figures,
    Tables,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents/:id/anchors/sync
///
/// Lays the document out and swaps in a freshly built anchor map.
pub async fn handle_sync_anchors(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(request): Json<SyncAnchorsRequest>,
) -> Result<Json<SyncAnchorsResponse>, AppError> {
    let options = request_options(&state, request.options)?;
    let layout = generate_document_layout_blocking(request.document, options).await?;
    let tracker = state.anchors.rebuild_from_layout(document_id, &layout).await;

    Ok(Json(SyncAnchorsResponse {
        anchors: tracker.anchor_count(),
        figures: tracker.list_of_figures().len(),
        tables: tracker.list_of_tables().len(),
        total_pages: layout.total_pages,
    }))
}

/// POST /api/v1/documents/:id/anchors/positions
///
/// Re-lays the document and rewrites anchor positions without renumbering.
pub async fn handle_refresh_positions(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(request): Json<SyncAnchorsRequest>,
) -> Result<Json<RefreshPositionsResponse>, AppError> {
    let options = request_options(&state, request.options)?;
    let layout = generate_document_layout_blocking(request.document, options).await?;
    let updated = state
        .anchors
        .refresh_positions(document_id, &layout)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No anchors loaded for document {document_id}")))?;

    Ok(Json(RefreshPositionsResponse {
        updated,
        total_pages: layout.total_pages,
    }))
}

/// DELETE /api/v1/documents/:id/anchors
///
/// Document unload: drops anchors, cross-references and numbering.
pub async fn handle_unload_anchors(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> StatusCode {
    state.anchors.unload(document_id).await;
    StatusCode::NO_CONTENT
}

/// GET /api/v1/documents/:id/anchors/headings
pub async fn handle_list_headings(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Json<Vec<AnchorReference>> {
    Json(list_anchors(&state, document_id, AnchorListKind::Headings).await)
}

/// GET /api/v1/documents/:id/anchors/figures
pub async fn handle_list_figures(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Json<Vec<AnchorReference>> {
    Json(list_anchors(&state, document_id, AnchorListKind::Figures).await)
}

/// GET /api/v1/documents/:id/anchors/tables
pub async fn handle_list_tables(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Json<Vec<AnchorReference>> {
    Json(list_anchors(&state, document_id, AnchorListKind::Tables).await)
}

/// Derived anchor view; empty for documents with no anchors loaded.
async fn list_anchors(
    state: &AppState,
    document_id: Uuid,
    kind: AnchorListKind,
) -> Vec<AnchorReference> {
    let Some(tracker) = state.anchors.snapshot(document_id).await else {
        return Vec::new();
    };
    let anchors = match kind {
        AnchorListKind::Headings => tracker.table_of_contents(),
        AnchorListKind::Figures => tracker.list_of_figures(),
        AnchorListKind::Tables => tracker.list_of_tables(),
    };
    anchors.into_iter().cloned().collect()
}

/// POST /api/v1/documents/:id/cross-references
pub async fn handle_add_cross_reference(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(request): Json<AddCrossReferenceRequest>,
) -> Result<(StatusCode, Json<CrossReference>), AppError> {
    if request.source_block_id.trim().is_empty() || request.target_anchor_id.trim().is_empty() {
        return Err(AppError::Validation(
            "sourceBlockId and targetAnchorId cannot be empty".to_string(),
        ));
    }

    let reference = state
        .anchors
        .add_cross_reference(
            document_id,
            &request.source_block_id,
            &request.target_anchor_id,
            request.kind,
            &request.fallback_text,
        )
        .await;
    Ok((StatusCode::CREATED, Json(reference)))
}

/// GET /api/v1/documents/:id/cross-references/:ref_id
pub async fn handle_resolve_cross_reference(
    State(state): State<AppState>,
    Path((document_id, reference_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ResolvedReference>, AppError> {
    state
        .anchors
        .snapshot(document_id)
        .await
        .and_then(|tracker| tracker.resolve_cross_reference(reference_id))
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Cross-reference {reference_id} not found")))
}
