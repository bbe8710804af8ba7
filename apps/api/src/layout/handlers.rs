//! Axum route handlers for the Layout API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::layout::document::{generate_document_layout_blocking, DocumentLayout};
use crate::layout::engine::{generate_layout_blocking, LayoutOptions};
use crate::models::document::{Document, Section};
use crate::models::layout::LayoutResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionLayoutRequest {
    pub section: Section,
    pub options: Option<LayoutOptions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLayoutRequest {
    pub document: Document,
    pub options: Option<LayoutOptions>,
}

/// POST /api/v1/layout/section
///
/// Called by the editor on every content-affecting edit.
pub async fn handle_layout_section(
    State(state): State<AppState>,
    Json(request): Json<SectionLayoutRequest>,
) -> Result<Json<LayoutResult>, AppError> {
    let options = request_options(&state, request.options)?;
    let result = generate_layout_blocking(request.section, options).await?;
    Ok(Json(result))
}

/// POST /api/v1/layout/document
///
/// Whole-document layout with page numbers running across sections (export).
pub async fn handle_layout_document(
    State(state): State<AppState>,
    Json(request): Json<DocumentLayoutRequest>,
) -> Result<Json<DocumentLayout>, AppError> {
    let options = request_options(&state, request.options)?;
    let layout = generate_document_layout_blocking(request.document, options).await?;
    Ok(Json(layout))
}

/// Options for one request: the service defaults, or the caller's own with
/// `maxPages` held to the configured bound.
pub(crate) fn request_options(
    state: &AppState,
    requested: Option<LayoutOptions>,
) -> Result<LayoutOptions, AppError> {
    let Some(options) = requested else {
        return Ok(state.layout_options.clone());
    };
    if options.max_pages == 0 {
        return Err(AppError::Validation("maxPages must be at least 1".to_string()));
    }
    Ok(LayoutOptions {
        max_pages: options.max_pages.min(state.layout_options.max_pages),
        ..options
    })
}
