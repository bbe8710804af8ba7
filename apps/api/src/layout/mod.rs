// Pagination: height estimation, paragraph splitting and the page/column
// packing engine. Pure and synchronous; handlers reach it through
// tokio::task::spawn_blocking.

pub mod document;
pub mod engine;
pub mod estimator;
pub mod geometry;
pub mod handlers;
pub mod splitter;

// Re-export the public API consumed by other modules (anchors, toc, handlers).
pub use document::{generate_document_layout, DocumentLayout, SectionLayout};
pub use engine::{generate_layout, LayoutOptions, OversizePolicy};
pub use estimator::estimate_height;
pub use geometry::{resolve_geometry, PageGeometry};
pub use splitter::split_block;
