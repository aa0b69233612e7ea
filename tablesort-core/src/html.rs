//! HTML report generation
//!
//! Serializes a [`Document`] to markup and wraps it in a self-contained page
//! with embedded CSS. The page carries the attributes the sorter reads and
//! writes (`data-type`, `data-dir`, `data-value`, ...), so sorted state is
//! visible in the output and styled by the stylesheet.

use crate::dom::{Document, NodeData, NodeId};
use crate::theme::Theme;

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "col"];

/// Render a complete report page around the document body
pub fn render_html_report(doc: &Document, title: &str, theme: Theme) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en" data-theme="{theme}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
{body}
</html>"#,
        theme = theme.as_str(),
        title = html_escape(title),
        css = inline_css(),
        body = render_node(doc, doc.body()),
    )
}

/// Serialize one node and its subtree
pub fn render_node(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.data(id) {
        Some(NodeData::Text(text)) => out.push_str(&html_escape(text)),
        Some(NodeData::Element(el)) => {
            out.push('<');
            out.push_str(&el.tag);
            if !el.classes.is_empty() {
                out.push_str(&format!(r#" class="{}""#, html_escape(&el.classes.join(" "))));
            }
            for (name, value) in &el.attributes {
                out.push_str(&format!(r#" {}="{}""#, name, html_escape(value)));
            }
            if !el.style.is_empty() {
                let style = el
                    .style
                    .iter()
                    .map(|(property, value)| format!("{}: {};", property, value))
                    .collect::<Vec<_>>()
                    .join(" ");
                out.push_str(&format!(r#" style="{}""#, html_escape(&style)));
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                return;
            }
            for child in doc.children(id) {
                write_node(doc, *child, out);
            }
            out.push_str(&format!("</{}>", el.tag));
        }
        None => {}
    }
}

/// Inline CSS for tables, sort indicators and dark mode
fn inline_css() -> &'static str {
    r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    line-height: 1.5;
    color: #111827;
    background: #ffffff;
    padding: 2rem;
}

table {
    width: 100%;
    border-collapse: collapse;
    margin-bottom: 2rem;
    font-size: 0.875rem;
}

thead {
    background: #f9fafb;
}

th {
    text-align: left;
    padding: 0.75rem;
    font-weight: 600;
    border-bottom: 2px solid #e5e7eb;
}

td {
    padding: 0.5rem 0.75rem;
    border-bottom: 1px solid #e5e7eb;
}

tbody tr:hover {
    background: #f9fafb;
}

/* Sortable headers */
.sortable-table th {
    cursor: pointer;
    user-select: none;
}

.sortable-table th:hover {
    background: #e5e7eb;
}

.sortable-table th::after {
    content: ' ↕';
    opacity: 0.3;
}

.sortable-table th[data-dir="asc"]::after {
    content: ' ↑';
    opacity: 1;
}

.sortable-table th[data-dir="desc"]::after {
    content: ' ↓';
    opacity: 1;
}

/* Continuation rows */
tr.sort-group td,
tr[data-row-role="continuation"] td {
    color: #6b7280;
    padding-left: 1.5rem;
}

/* Theme toggle */
.theme-toggle {
    position: fixed;
    top: 1rem;
    right: 1rem;
    padding: 0.25rem 0.75rem;
    border: 1px solid #e5e7eb;
    border-radius: 0.375rem;
    background: #ffffff;
    cursor: pointer;
}

/* Dark Mode */
body.dark-mode {
    background: #111827;
    color: #f9fafb;
}

body.dark-mode thead {
    background: #1f2937;
}

body.dark-mode th {
    color: #f9fafb;
    border-bottom-color: #374151;
}

body.dark-mode .sortable-table th:hover {
    background: #374151;
}

body.dark-mode td {
    border-bottom-color: #374151;
}

body.dark-mode tbody tr:hover {
    background: #1f2937;
}

body.dark-mode .theme-toggle {
    background: #1f2937;
    color: #f9fafb;
    border-color: #374151;
}

body.dark-mode tr.sort-group td,
body.dark-mode tr[data-row-role="continuation"] td {
    color: #9ca3af;
}
"#
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
