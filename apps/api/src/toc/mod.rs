// Table of contents: heading entries resolved against layout results,
// plus a plain-text rendering for export.

pub mod generator;
pub mod handlers;
pub mod render;

pub use generator::{generate_toc, LeaderStyle, PageNumberAlignment, TocConfiguration, TocEntry};
pub use render::render_toc_lines;
