//! Text and JSON output of tables
//!
//! Global invariants enforced:
//! - Output follows current document order, so it shows the table as sorted
//! - Byte-for-byte identical output for identical documents

use crate::dom::{Document, NodeId};
use crate::header::DIRECTION_ATTR;
use crate::source::ReportSource;
use anyhow::{Context, Result};

const COLUMN_WIDTH: usize = 20;

/// Render a table as fixed-width text, one line per row in document order.
///
/// The active header is marked with `^` (ascending) or `v` (descending);
/// continuation rows are indented under their primary row.
pub fn render_text(doc: &Document, table: NodeId) -> String {
    let mut output = String::new();

    for row in doc.elements_by_tag(table, "tr") {
        let in_head = doc
            .parent(row)
            .is_some_and(|parent| doc.is_tag(parent, "thead"));
        let cells: Vec<String> = doc
            .element_children(row)
            .into_iter()
            .map(|cell| {
                let mut text = doc.inner_text(cell);
                match doc.attr(cell, DIRECTION_ATTR) {
                    Some("asc") => text.push_str(" ^"),
                    Some("desc") => text.push_str(" v"),
                    _ => {}
                }
                truncate_or_pad(&text, COLUMN_WIDTH)
            })
            .collect();
        if cells.is_empty() {
            continue;
        }

        let indent = if in_head || cells.len() > 2 { "" } else { "  " };
        output.push_str(indent);
        output.push_str(cells.join(" ").trim_end());
        output.push('\n');
        if in_head && doc.elements_by_tag(row, "th").len() == cells.len() {
            let width = cells.len() * (COLUMN_WIDTH + 1) - 1;
            output.push_str(&"-".repeat(width));
            output.push('\n');
        }
    }

    output
}

/// Render a report description as pretty JSON
pub fn render_json(report: &ReportSource) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize report")
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    let count = s.chars().count();
    if count > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
