//! Plain-text TOC rendering for exporters: indentation by level, leader
//! characters and page-number alignment from `TocConfiguration`.

use crate::toc::generator::{LeaderStyle, PageNumberAlignment, TocConfiguration, TocEntry};

/// Monospace characters per inch used to convert indentation.
const CHARS_PER_INCH: f64 = 10.0;
/// Widest TOC line, in characters, that will be rendered.
pub const MAX_LINE_WIDTH: usize = 512;

/// Renders one line per entry, preceded by the title when it is non-empty.
///
/// `line_width` is the width of the whole TOC in characters, capped at
/// `MAX_LINE_WIDTH`; with more than one TOC column each line is laid out for
/// its share of that width.
pub fn render_toc_lines(
    entries: &[TocEntry],
    config: &TocConfiguration,
    line_width: usize,
) -> Vec<String> {
    let column_width = line_width.min(MAX_LINE_WIDTH) / config.columns.max(1) as usize;
    let mut lines = Vec::with_capacity(entries.len() + 1);
    if !config.title.trim().is_empty() {
        lines.push(config.title.trim().to_string());
    }
    lines.extend(
        entries
            .iter()
            .map(|entry| render_entry(entry, config, column_width)),
    );
    lines
}

fn render_entry(entry: &TocEntry, config: &TocConfiguration, width: usize) -> String {
    let depth = entry.level.saturating_sub(1) as f64;
    // An indent never runs past the line.
    let indent_chars = (depth * config.indentation * CHARS_PER_INCH).round();
    let indent_len = if indent_chars.is_finite() && indent_chars > 0.0 {
        indent_chars.min(width as f64) as usize
    } else {
        0
    };
    let indent = " ".repeat(indent_len);
    let page = entry.page_number.to_string();

    match config.page_number_alignment {
        PageNumberAlignment::Inline => format!("{indent}{} {page}", entry.text),
        PageNumberAlignment::Right => {
            let used = indent.chars().count() + entry.text.chars().count() + page.chars().count();
            // One space on either side of the leader run.
            let fill = width.saturating_sub(used + 2);
            let leader = match leader_char(config.leader_style) {
                Some(c) if fill > 0 => format!(" {} ", c.to_string().repeat(fill)),
                _ => " ".repeat(fill + 2),
            };
            format!("{indent}{}{leader}{page}", entry.text)
        }
    }
}

fn leader_char(style: LeaderStyle) -> Option<char> {
    match style {
        LeaderStyle::Dots => Some('.'),
        LeaderStyle::Dashes => Some('-'),
        LeaderStyle::Underscore => Some('_'),
        LeaderStyle::None => None,
    }
}
