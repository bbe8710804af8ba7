pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::anchors::handlers as anchors;
use crate::layout::handlers as layout;
use crate::state::AppState;
use crate::toc::handlers as toc;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Layout API
        .route("/api/v1/layout/section", post(layout::handle_layout_section))
        .route("/api/v1/layout/document", post(layout::handle_layout_document))
        // TOC API
        .route("/api/v1/toc", post(toc::handle_generate_toc))
        // Anchor API
        .route(
            "/api/v1/documents/:id/anchors",
            axum::routing::delete(anchors::handle_unload_anchors),
        )
        .route(
            "/api/v1/documents/:id/anchors/sync",
            post(anchors::handle_sync_anchors),
        )
        .route(
            "/api/v1/documents/:id/anchors/positions",
            post(anchors::handle_refresh_positions),
        )
        .route(
            "/api/v1/documents/:id/anchors/headings",
            get(anchors::handle_list_headings),
        )
        .route(
            "/api/v1/documents/:id/anchors/figures",
            get(anchors::handle_list_figures),
        )
        .route(
            "/api/v1/documents/:id/anchors/tables",
            get(anchors::handle_list_tables),
        )
        .route(
            "/api/v1/documents/:id/cross-references",
            post(anchors::handle_add_cross_reference),
        )
        .route(
            "/api/v1/documents/:id/cross-references/:ref_id",
            get(anchors::handle_resolve_cross_reference),
        )
        .with_state(state)
}
