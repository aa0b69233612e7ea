//! Table sorter
//!
//! Runs one header activation end to end: resolve the header's kind and
//! direction, snapshot the table layout, build and order records, then move the
//! rows back into the document in the new order.
//!
//! Re-attachment has two modes. Without grouped sections, rows are re-appended
//! to the body section they came from, so a sort only reorders rows within
//! existing bodies. With any grouped section, records are re-appended to the
//! table itself: group header, then group body, then the record's rows into that
//! body; plain records append their rows straight to the table.

use crate::collate::Collation;
use crate::dom::{Document, NodeId};
use crate::header::{
    clear_sibling_directions, highlight_active, HeaderState, SortDirection, SortKind,
};
use crate::key::CellSnapshot;
use crate::order::order_records;
use crate::records::{
    build_records, Record, RowRoles, RowSnapshot, SectionSnapshot, TableLayout,
};

/// Class marking a table for sorting
pub const DEFAULT_SORTABLE_CLASS: &str = "sortable-table";
/// Class marking a row as part of the previous record
pub const DEFAULT_GROUP_CLASS: &str = "sort-group";
/// Table attribute disabling row-span preservation when set to `"false"`
pub const ROW_SPAN_ATTR: &str = "data-rowspan";
/// Table attribute selecting [`RowRoles`]
pub const ROW_ROLES_ATTR: &str = "data-row-roles";
/// Row attribute declaring a row's role
pub const ROW_ROLE_ATTR: &str = "data-row-role";
/// Cell attribute overriding the compared value
pub const VALUE_ATTR: &str = "data-value";

/// Options shared by every sort in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOptions {
    pub collation: Collation,
    /// Used when a table carries no `data-row-roles`
    pub row_roles: RowRoles,
    /// Used when a table carries no `data-rowspan`
    pub preserve_row_spans: bool,
    pub sortable_class: String,
    pub group_class: String,
}

impl Default for SortOptions {
    fn default() -> Self {
        SortOptions {
            collation: Collation::Locale,
            row_roles: RowRoles::Inferred,
            preserve_row_spans: true,
            sortable_class: DEFAULT_SORTABLE_CLASS.to_string(),
            group_class: DEFAULT_GROUP_CLASS.to_string(),
        }
    }
}

/// What a sort did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOutcome {
    pub table: NodeId,
    pub column: usize,
    pub kind: SortKind,
    pub direction: SortDirection,
    pub records: usize,
    pub grouped: bool,
}

/// Snapshot the parts of a table record building reads
pub fn read_layout(doc: &Document, table: NodeId, options: &SortOptions) -> TableLayout {
    let preserve_row_spans = match doc.attr(table, ROW_SPAN_ATTR) {
        Some(value) => value != "false",
        None => options.preserve_row_spans,
    };
    let row_roles = doc
        .attr(table, ROW_ROLES_ATTR)
        .and_then(RowRoles::parse)
        .unwrap_or(options.row_roles);

    let sections = doc
        .elements_by_tag(table, "tbody")
        .into_iter()
        .map(|body| {
            let header = doc
                .previous_element_sibling(body)
                .filter(|prev| doc.is_tag(*prev, "thead"))
                .filter(|prev| !doc.element_children(*prev).is_empty());
            let rows = doc
                .element_children(body)
                .into_iter()
                .map(|row| read_row(doc, row, options))
                .collect();
            SectionSnapshot { body, header, rows }
        })
        .collect();

    TableLayout {
        table,
        header_sections: doc.elements_by_tag(table, "thead").len(),
        preserve_row_spans,
        row_roles,
        sections,
    }
}

fn read_row(doc: &Document, row: NodeId, options: &SortOptions) -> RowSnapshot {
    let cells = doc
        .element_children(row)
        .into_iter()
        .map(|cell| CellSnapshot {
            text: doc.inner_text(cell),
            value: doc.attr(cell, VALUE_ATTR).map(str::to_string),
        })
        .collect();
    let continuation = doc.has_class(row, &options.group_class)
        || doc.attr(row, ROW_ROLE_ATTR) == Some("continuation");
    RowSnapshot {
        node: row,
        cells,
        continuation,
    }
}

/// Move ordered records back into the document
pub fn reattach(doc: &mut Document, table: NodeId, records: &[Record]) {
    if records.iter().all(|r| r.section.is_none()) {
        for record in records {
            for row in &record.rows {
                doc.append_child(row.body, row.node);
            }
        }
        return;
    }

    for record in records {
        match record.section {
            Some(section) => {
                doc.append_child(table, section.header);
                doc.append_child(table, section.body);
                for row in &record.rows {
                    doc.append_child(section.body, row.node);
                }
            }
            None => {
                for row in &record.rows {
                    doc.append_child(table, row.node);
                }
            }
        }
    }
}

/// Sort the table owning `th` by that header's column.
///
/// Returns `None` when `th` is not inside a table row; nothing is changed then.
pub fn sort_table(
    doc: &mut Document,
    th: NodeId,
    default_kind: SortKind,
    options: &SortOptions,
) -> Option<SortOutcome> {
    let row = doc.parent(th).filter(|r| doc.is_tag(*r, "tr"))?;
    let table = doc.closest(row, "table")?;

    let state = HeaderState::read(doc, th).activate(default_kind);
    clear_sibling_directions(doc, th);
    state.write(doc, th);
    let kind = state.kind.unwrap_or(default_kind);
    let direction = state.direction.unwrap_or(SortDirection::Ascending);
    highlight_active(doc, th, direction);

    let column = doc.cell_index(th).unwrap_or(0);
    let layout = read_layout(doc, table, options);
    let records = build_records(&layout, column, kind, options.collation);
    let ordered = order_records(records, kind, direction, options.collation);
    let grouped = ordered.iter().any(|r| r.section.is_some());
    reattach(doc, table, &ordered);

    tracing::debug!(
        column,
        kind = kind.as_str(),
        direction = direction.as_str(),
        records = ordered.len(),
        grouped,
        "sorted table"
    );

    Some(SortOutcome {
        table,
        column,
        kind,
        direction,
        records: ordered.len(),
        grouped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{DIRECTION_ATTR, KIND_ATTR};

    fn cell(doc: &mut Document, tag: &str, text: &str) -> NodeId {
        let el = doc.create_element(tag);
        let t = doc.create_text(text);
        doc.append_child(el, t);
        el
    }

    fn row(doc: &mut Document, tag: &str, texts: &[&str]) -> NodeId {
        let tr = doc.create_element("tr");
        for text in texts {
            let c = cell(doc, tag, text);
            doc.append_child(tr, c);
        }
        tr
    }

    /// Table with one header row and one body; returns (table, headers, body)
    fn simple_table(doc: &mut Document, rows: &[&[&str]]) -> (NodeId, Vec<NodeId>, NodeId) {
        let table = doc.create_element("table");
        let thead = doc.create_element("thead");
        let tbody = doc.create_element("tbody");
        let body = doc.body();
        doc.append_child(body, table);
        doc.append_child(table, thead);
        doc.append_child(table, tbody);
        let header = row(doc, "th", &["Name", "Hits", "Lines"]);
        doc.append_child(thead, header);
        for cells in rows {
            let tr = row(doc, "td", cells);
            doc.append_child(tbody, tr);
        }
        let headers = doc.element_children(header);
        (table, headers, tbody)
    }

    fn first_cells(doc: &Document, body: NodeId) -> Vec<String> {
        doc.element_children(body)
            .into_iter()
            .map(|tr| doc.inner_text(doc.element_children(tr)[0]))
            .collect()
    }

    #[test]
    fn test_numeric_sort_both_directions() {
        let mut doc = Document::new();
        let (_, headers, body) =
            simple_table(&mut doc, &[&["b", "3", "x"], &["a", "10", "y"], &["c", "2", "z"]]);
        let options = SortOptions::default();

        sort_table(&mut doc, headers[1], SortKind::Numeric, &options);
        assert_eq!(first_cells(&doc, body), vec!["c", "b", "a"]);

        sort_table(&mut doc, headers[1], SortKind::Numeric, &options);
        assert_eq!(first_cells(&doc, body), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_activation_writes_state_and_clears_siblings() {
        let mut doc = Document::new();
        let (_, headers, _) = simple_table(&mut doc, &[&["b", "3", "x"]]);
        let options = SortOptions::default();

        sort_table(&mut doc, headers[0], SortKind::Text, &options);
        assert_eq!(doc.attr(headers[0], DIRECTION_ATTR), Some("asc"));
        assert_eq!(doc.attr(headers[0], KIND_ATTR), Some("text"));

        sort_table(&mut doc, headers[1], SortKind::Numeric, &options);
        assert_eq!(doc.attr(headers[0], DIRECTION_ATTR), None);
        assert_eq!(doc.attr(headers[0], KIND_ATTR), Some("text"));
        assert_eq!(doc.attr(headers[1], DIRECTION_ATTR), Some("asc"));
        assert_eq!(doc.style(headers[1], "font-weight"), Some("700"));
        assert_eq!(doc.style(headers[0], "font-weight"), Some("300"));
    }

    #[test]
    fn test_detached_header_is_ignored() {
        let mut doc = Document::new();
        let th = doc.create_element("th");
        assert_eq!(sort_table(&mut doc, th, SortKind::Text, &SortOptions::default()), None);
        assert_eq!(doc.attr(th, DIRECTION_ATTR), None);
    }

    #[test]
    fn test_rowspan_flag_read_from_table() {
        let mut doc = Document::new();
        let (table, _, _) = simple_table(&mut doc, &[]);
        let options = SortOptions::default();
        assert!(read_layout(&doc, table, &options).preserve_row_spans);
        doc.set_attr(table, ROW_SPAN_ATTR, "false");
        assert!(!read_layout(&doc, table, &options).preserve_row_spans);
        doc.set_attr(table, ROW_ROLES_ATTR, "explicit");
        assert_eq!(read_layout(&doc, table, &options).row_roles, RowRoles::Explicit);
    }
}
