//! Page-master geometry: page size, content box and per-column dimensions.

use crate::errors::LayoutError;
use crate::models::page_master::PageMaster;

/// Height reserved for a running header when the page master enables one.
pub const HEADER_HEIGHT: f64 = 0.5;
/// Height reserved for a running footer when the page master enables one.
pub const FOOTER_HEIGHT: f64 = 0.5;
/// Most columns a page master may ask for.
pub const MAX_COLUMNS: u32 = 12;

/// Resolved dimensions of one page, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub content_width: f64,
    /// Content height after margins, header and footer.
    pub content_height: f64,
    pub columns: u32,
    pub column_width: f64,
    /// `Some(spacing)` when heights snap to a baseline grid.
    pub baseline_spacing: Option<f64>,
}

/// Resolves and validates the geometry of a page master.
///
/// Misconfiguration fails fast: zero or too many columns, negative or non-finite lengths, and
/// margins, gaps, header or footer that leave no room for content.
pub fn resolve_geometry(master: &PageMaster) -> Result<PageGeometry, LayoutError> {
    if master.columns == 0 {
        return Err(invalid("columns must be at least 1".into()));
    }
    if master.columns > MAX_COLUMNS {
        return Err(invalid(format!(
            "columns must be at most {MAX_COLUMNS}, got {}",
            master.columns
        )));
    }

    let m = &master.margins;
    for (name, value) in [
        ("margins.top", m.top),
        ("margins.right", m.right),
        ("margins.bottom", m.bottom),
        ("margins.left", m.left),
        ("columnGap", master.column_gap),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(format!("{name} must be a non-negative number, got {value}")));
        }
    }

    let baseline_spacing = if master.baseline_grid {
        if !master.baseline_spacing.is_finite() || master.baseline_spacing <= 0.0 {
            return Err(invalid(format!(
                "baselineSpacing must be positive when the baseline grid is on, got {}",
                master.baseline_spacing
            )));
        }
        Some(master.baseline_spacing)
    } else {
        None
    };

    let (page_width, page_height) = master.page_dimensions();

    let content_width = page_width - m.left - m.right;
    if content_width <= 0.0 {
        return Err(invalid(format!(
            "horizontal margins ({:.2}in) exceed the page width ({page_width:.2}in)",
            m.left + m.right
        )));
    }

    let mut content_height = page_height - m.top - m.bottom;
    if master.has_header {
        content_height -= HEADER_HEIGHT;
    }
    if master.has_footer {
        content_height -= FOOTER_HEIGHT;
    }
    if content_height <= 0.0 {
        return Err(invalid(format!(
            "vertical margins, header and footer leave no content height on a {page_height:.2}in page"
        )));
    }

    let gaps = master.column_gap * (master.columns - 1) as f64;
    let column_width = (content_width - gaps) / master.columns as f64;
    if column_width <= 0.0 {
        return Err(invalid(format!(
            "{} columns with a {:.2}in gap do not fit in {content_width:.2}in",
            master.columns, master.column_gap
        )));
    }

    Ok(PageGeometry {
        page_width,
        page_height,
        content_width,
        content_height,
        columns: master.columns,
        column_width,
        baseline_spacing,
    })
}

fn invalid(message: String) -> LayoutError {
    LayoutError::InvalidPageMaster(message)
}
