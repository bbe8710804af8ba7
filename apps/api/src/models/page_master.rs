//! Page masters — the reusable page-geometry configuration applied to a section.
//!
//! All lengths are in inches. A page master is an immutable value: the layout
//! engine reads it and never mutates it.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Paper
// ────────────────────────────────────────────────────────────────────────────

/// Supported physical paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    /// US letter, 8.5" × 11".
    Letter,
    /// ISO A4, 210mm × 297mm.
    A4,
    /// US legal, 8.5" × 14".
    Legal,
    /// Tabloid, 11" × 17".
    Tabloid,
}

impl PageSize {
    /// Portrait `(width, height)` in inches.
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            PageSize::Letter => (8.5, 11.0),
            PageSize::A4 => (8.27, 11.69),
            PageSize::Legal => (8.5, 14.0),
            PageSize::Tabloid => (11.0, 17.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn uniform(inches: f64) -> Self {
        Self {
            top: inches,
            right: inches,
            bottom: inches,
            left: inches,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page master
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMaster {
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub margins: Margins,
    pub columns: u32,
    /// Horizontal gap between adjacent columns.
    pub column_gap: f64,
    pub has_header: bool,
    pub has_footer: bool,
    /// When set, block heights snap up to multiples of `baseline_spacing`.
    pub baseline_grid: bool,
    pub baseline_spacing: f64,
    /// Exporters may rotate wide tables onto landscape pages.
    pub allow_table_rotation: bool,
}

impl Default for PageMaster {
    /// US letter, portrait, 1" margins, a single column, no header or footer.
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            orientation: Orientation::Portrait,
            margins: Margins::default(),
            columns: 1,
            column_gap: 0.25,
            has_header: false,
            has_footer: false,
            baseline_grid: false,
            baseline_spacing: 0.167,
            allow_table_rotation: false,
        }
    }
}

impl PageMaster {
    /// Physical `(width, height)` of the page after applying orientation.
    pub fn page_dimensions(&self) -> (f64, f64) {
        let (w, h) = self.page_size.dimensions();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}
