//! Sortable table initialization and click dispatch

use crate::dom::{Document, Listener, NodeId};
use crate::header::{SortKind, DECLARED_KIND_ATTR, KIND_ATTR};
use crate::sorter::{sort_table, SortOptions, SortOutcome};

/// A header made clickable by [`init_table_sorting`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortableHeader {
    pub table: NodeId,
    pub header: NodeId,
    pub column: usize,
    pub kind: SortKind,
    pub label: String,
}

/// Make every header of every sortable table clickable.
///
/// Each `th` under a `thead` gets its kind from `data-sort-type` (default
/// `text`), a pointer affordance, a title, and a sort listener. Running this
/// twice registers a second listener per header.
pub fn init_table_sorting(doc: &mut Document, options: &SortOptions) -> Vec<SortableHeader> {
    let mut initialized = Vec::new();

    for table in doc.elements_by_class(doc.body(), &options.sortable_class) {
        let headers: Vec<NodeId> = doc
            .elements_by_tag(table, "thead")
            .into_iter()
            .flat_map(|thead| doc.elements_by_tag(thead, "th"))
            .collect();

        for th in headers {
            let kind = declared_kind(doc, th);
            let label = doc.inner_text(th);

            doc.set_style(th, "cursor", "pointer");
            doc.set_style(th, "user-select", "none");
            doc.set_attr(th, KIND_ATTR, kind.as_str());
            doc.set_attr(th, "title", &format!("Click to sort by {}", label));
            doc.add_listener(th, Listener::SortTable { default_kind: kind });

            initialized.push(SortableHeader {
                table,
                header: th,
                column: doc.cell_index(th).unwrap_or(0),
                kind,
                label,
            });
        }
    }

    tracing::debug!(headers = initialized.len(), "initialized sortable headers");
    initialized
}

fn declared_kind(doc: &Document, th: NodeId) -> SortKind {
    match doc.attr(th, DECLARED_KIND_ATTR) {
        None => SortKind::Text,
        Some(value) => SortKind::parse(value).unwrap_or_else(|| {
            tracing::warn!(value, "unknown data-sort-type, sorting as text");
            SortKind::Text
        }),
    }
}

/// Activate `node`, running its listeners in registration order
pub fn click(doc: &mut Document, node: NodeId, options: &SortOptions) -> Vec<SortOutcome> {
    let listeners = doc.listeners(node).to_vec();
    listeners
        .into_iter()
        .filter_map(|listener| match listener {
            Listener::SortTable { default_kind } => sort_table(doc, node, default_kind, options),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::DIRECTION_ATTR;

    fn sortable_table(doc: &mut Document, class: &str) -> (NodeId, Vec<NodeId>) {
        let table = doc.create_element("table");
        doc.add_class(table, class);
        let thead = doc.create_element("thead");
        let tr = doc.create_element("tr");
        let body = doc.body();
        doc.append_child(body, table);
        doc.append_child(table, thead);
        doc.append_child(thead, tr);
        let mut headers = Vec::new();
        for (label, kind) in [("File", None), ("Hits", Some("numeric")), ("When", Some("date"))] {
            let th = doc.create_element("th");
            let text = doc.create_text(label);
            doc.append_child(th, text);
            if let Some(kind) = kind {
                doc.set_attr(th, DECLARED_KIND_ATTR, kind);
            }
            doc.append_child(tr, th);
            headers.push(th);
        }
        (table, headers)
    }

    #[test]
    fn test_headers_get_kind_and_affordance() {
        let mut doc = Document::new();
        let (table, headers) = sortable_table(&mut doc, "sortable-table");
        let initialized = init_table_sorting(&mut doc, &SortOptions::default());

        assert_eq!(initialized.len(), 3);
        assert!(initialized.iter().all(|h| h.table == table));
        assert_eq!(doc.attr(headers[0], KIND_ATTR), Some("text"));
        assert_eq!(doc.attr(headers[1], KIND_ATTR), Some("numeric"));
        assert_eq!(doc.attr(headers[2], KIND_ATTR), Some("text"));
        assert_eq!(doc.style(headers[0], "cursor"), Some("pointer"));
        assert_eq!(doc.attr(headers[1], "title"), Some("Click to sort by Hits"));
        assert_eq!(initialized[1].column, 1);
    }

    #[test]
    fn test_unmarked_tables_are_left_alone() {
        let mut doc = Document::new();
        let (_, headers) = sortable_table(&mut doc, "plain");
        assert!(init_table_sorting(&mut doc, &SortOptions::default()).is_empty());
        assert!(doc.listeners(headers[0]).is_empty());
    }

    #[test]
    fn test_click_dispatches_sort() {
        let mut doc = Document::new();
        let (_, headers) = sortable_table(&mut doc, "sortable-table");
        let options = SortOptions::default();
        init_table_sorting(&mut doc, &options);

        let outcomes = click(&mut doc, headers[1], &options);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].kind, SortKind::Numeric);
        assert_eq!(doc.attr(headers[1], DIRECTION_ATTR), Some("asc"));
    }

    #[test]
    fn test_reinitializing_registers_again() {
        let mut doc = Document::new();
        let (_, headers) = sortable_table(&mut doc, "sortable-table");
        let options = SortOptions::default();
        init_table_sorting(&mut doc, &options);
        init_table_sorting(&mut doc, &options);
        assert_eq!(doc.listeners(headers[0]).len(), 2);
    }
}
