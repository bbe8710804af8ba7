use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Liveness plus the layout defaults requests fall back to.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "folio-layout",
        "layoutDefaults": {
            "maxPages": state.layout_options.max_pages,
            "oversizePolicy": state.layout_options.oversize_policy,
        }
    }))
}
