//! Axum route handlers for the TOC API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::layout::document::generate_document_layout_blocking;
use crate::layout::engine::LayoutOptions;
use crate::layout::handlers::request_options;
use crate::models::document::Document;
use crate::state::AppState;
use crate::toc::generator::{generate_toc, TocConfiguration, TocEntry};
use crate::toc::render::{render_toc_lines, MAX_LINE_WIDTH};

/// Deepest per-level indent accepted, in inches.
const MAX_INDENTATION: f64 = 2.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocRequest {
    pub document: Document,
    #[serde(default)]
    pub config: TocConfiguration,
    pub exclude_current_section_id: Option<String>,
    /// Characters per rendered line; the service default when absent.
    pub line_width: Option<usize>,
    pub options: Option<LayoutOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TocResponse {
    pub title: String,
    pub entries: Vec<TocEntry>,
    pub lines: Vec<String>,
    pub total_pages: u32,
}

/// POST /api/v1/toc
///
/// Lays the whole document out (page numbers run across sections) and returns
/// the TOC entries plus a plain-text rendering for exporters.
pub async fn handle_generate_toc(
    State(state): State<AppState>,
    Json(request): Json<TocRequest>,
) -> Result<Json<TocResponse>, AppError> {
    if let Some(width) = request.line_width {
        if width == 0 || width > MAX_LINE_WIDTH {
            return Err(AppError::Validation(format!(
                "lineWidth must be between 1 and {MAX_LINE_WIDTH}, got {width}"
            )));
        }
    }
    let indentation = request.config.indentation;
    if !indentation.is_finite() || !(0.0..=MAX_INDENTATION).contains(&indentation) {
        return Err(AppError::Validation(format!(
            "indentation must be between 0 and {MAX_INDENTATION} inches, got {indentation}"
        )));
    }

    let options = request_options(&state, request.options)?;
    let document = request.document;
    // The layout task takes ownership, so lay out a copy and keep the document.
    let layout = generate_document_layout_blocking(document.clone(), options).await?;

    let entries = generate_toc(
        &document,
        &layout.layouts_by_section_id(),
        &request.config,
        request.exclude_current_section_id.as_deref(),
    );
    let line_width = request.line_width.unwrap_or(state.config.toc_line_width);
    let lines = render_toc_lines(&entries, &request.config, line_width);

    Ok(Json(TocResponse {
        title: request.config.title,
        entries,
        lines,
        total_pages: layout.total_pages,
    }))
}
