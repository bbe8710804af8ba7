use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of the layout core itself.
///
/// Expected variance (unknown block types, missing anchors, unresolved TOC pages)
/// never surfaces here; only caller misconfiguration and content that cannot be
/// laid out do.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Invalid page master: {0}")]
    InvalidPageMaster(String),

    #[error(
        "Content cannot be laid out: block '{block_id}' needs {height:.3}in but a column holds {column_height:.3}in"
    )]
    BlockTooTall {
        block_id: String,
        height: f64,
        column_height: f64,
    },

    #[error("Content cannot be laid out: exceeded the limit of {max_pages} pages")]
    PageLimitExceeded { max_pages: u32 },

    #[error("Page numbers starting at {first_page_number} overflow after {pages} pages")]
    PageNumberOverflow { first_page_number: u32, pages: u32 },
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Layout(e @ LayoutError::InvalidPageMaster(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_PAGE_MASTER", e.to_string())
            }
            AppError::Layout(e @ LayoutError::PageNumberOverflow { .. }) => {
                (StatusCode::BAD_REQUEST, "INVALID_LAYOUT_OPTIONS", e.to_string())
            }
            AppError::Layout(e) => {
                tracing::warn!("Layout rejected: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "CONTENT_CANNOT_BE_LAID_OUT",
                    e.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
