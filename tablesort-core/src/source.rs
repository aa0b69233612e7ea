//! Report input format
//!
//! Reports are described in JSON and built into a [`Document`] following the
//! markup contract the sorter reads: the `sortable-table` class, `data-sort-type`
//! on headers, `sort-group` / `data-row-role` on rows, `data-value` on cells and
//! `data-rowspan` / `data-row-roles` on tables.
//!
//! ```json
//! {
//!   "title": "Coverage",
//!   "tables": [{
//!     "sections": [
//!       {"kind": "head", "rows": [{"cells": ["File", {"text": "Hits", "sort_type": "numeric"}]}]},
//!       {"kind": "body", "rows": [{"cells": ["a.cfc", "10"]}]}
//!     ]
//!   }]
//! }
//! ```

use crate::dom::{Document, NodeId};
use crate::header::{SortDirection, DECLARED_KIND_ATTR, DIRECTION_ATTR};
use crate::key::format_number;
use crate::records::RowRoles;
use crate::sorter::{SortOptions, ROW_ROLES_ATTR, ROW_ROLE_ATTR, ROW_SPAN_ATTR, VALUE_ATTR};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub tables: Vec<TableSource>,
}

fn default_sortable() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Carry the sortable marker class
    #[serde(default = "default_sortable", skip_serializing_if = "is_true")]
    pub sortable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_row_spans: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_roles: Option<RowRoles>,
    pub sections: Vec<SectionSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionSource {
    /// `thead`; a group head uses `td` cells so it is not made clickable
    Head {
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        group: bool,
        rows: Vec<RowSource>,
    },
    /// `tbody`
    Body { rows: Vec<RowSource> },
    /// Rows placed directly under the table, as grouped sorts leave them
    Rows { rows: Vec<RowSource> },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowSource {
    /// Row continues the previous record (`sort-group` class)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub group: bool,
    /// Row declared as a continuation through `data-row-role`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub continuation: bool,
    pub cells: Vec<CellSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Text(String),
    Number(f64),
    Detailed(CellDetail),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellDetail {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colspan: Option<u32>,
    /// Direction left on a header by the last sort
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

impl CellSource {
    fn detail(&self) -> CellDetail {
        match self {
            CellSource::Text(text) => CellDetail {
                text: text.clone(),
                ..CellDetail::default()
            },
            CellSource::Number(n) => CellDetail {
                text: format_number(*n),
                ..CellDetail::default()
            },
            CellSource::Detailed(detail) => detail.clone(),
        }
    }

    pub fn text(&self) -> String {
        self.detail().text
    }
}

/// Load a report description from a JSON file
pub fn load_report(path: &Path) -> Result<ReportSource> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read report: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse report: {}", path.display()))
}

impl ReportSource {
    /// Build every table into `doc` under its body, returning the table nodes
    pub fn build(&self, doc: &mut Document, options: &SortOptions) -> Vec<NodeId> {
        let body = doc.body();
        self.tables
            .iter()
            .map(|table| {
                let node = table.build(doc, options);
                doc.append_child(body, node);
                node
            })
            .collect()
    }
}

impl TableSource {
    pub fn build(&self, doc: &mut Document, options: &SortOptions) -> NodeId {
        let table = doc.create_element("table");
        if let Some(id) = &self.id {
            doc.set_attr(table, "id", id);
        }
        if self.sortable {
            doc.add_class(table, &options.sortable_class);
        }
        if let Some(preserve) = self.preserve_row_spans {
            doc.set_attr(table, ROW_SPAN_ATTR, if preserve { "true" } else { "false" });
        }
        if let Some(roles) = self.row_roles {
            doc.set_attr(table, ROW_ROLES_ATTR, roles.as_str());
        }

        for section in &self.sections {
            match section {
                SectionSource::Head { group, rows } => {
                    let thead = doc.create_element("thead");
                    let cell_tag = if *group { "td" } else { "th" };
                    build_rows(doc, thead, rows, cell_tag, options);
                    doc.append_child(table, thead);
                }
                SectionSource::Body { rows } => {
                    let tbody = doc.create_element("tbody");
                    build_rows(doc, tbody, rows, "td", options);
                    doc.append_child(table, tbody);
                }
                SectionSource::Rows { rows } => build_rows(doc, table, rows, "td", options),
            }
        }
        table
    }

    /// Read a table back out of a document, in its current order
    pub fn from_document(doc: &Document, table: NodeId, options: &SortOptions) -> TableSource {
        let sections = doc
            .element_children(table)
            .into_iter()
            .filter_map(|child| match doc.tag(child)? {
                "thead" => {
                    let rows = read_rows(doc, child, options);
                    let group = !doc.elements_by_tag(child, "td").is_empty()
                        && doc.elements_by_tag(child, "th").is_empty();
                    Some(SectionSource::Head { group, rows })
                }
                "tbody" => Some(SectionSource::Body {
                    rows: read_rows(doc, child, options),
                }),
                "tr" => Some(SectionSource::Rows {
                    rows: vec![read_row(doc, child, options)],
                }),
                _ => None,
            })
            .fold(Vec::new(), merge_adjacent_rows);

        TableSource {
            id: doc.attr(table, "id").map(str::to_string),
            sortable: doc.has_class(table, &options.sortable_class),
            preserve_row_spans: doc.attr(table, ROW_SPAN_ATTR).map(|v| v != "false"),
            row_roles: doc.attr(table, ROW_ROLES_ATTR).and_then(RowRoles::parse),
            sections,
        }
    }
}

impl ReportSource {
    pub fn from_document(
        doc: &Document,
        tables: &[NodeId],
        title: Option<String>,
        options: &SortOptions,
    ) -> ReportSource {
        ReportSource {
            title,
            tables: tables
                .iter()
                .map(|t| TableSource::from_document(doc, *t, options))
                .collect(),
        }
    }
}

/// Consecutive table-level rows read back as one `Rows` section
fn merge_adjacent_rows(mut sections: Vec<SectionSource>, next: SectionSource) -> Vec<SectionSource> {
    let merged = match (sections.last_mut(), &next) {
        (Some(SectionSource::Rows { rows }), SectionSource::Rows { rows: more }) => {
            rows.extend(more.iter().cloned());
            true
        }
        _ => false,
    };
    if !merged {
        sections.push(next);
    }
    sections
}

fn build_rows(
    doc: &mut Document,
    parent: NodeId,
    rows: &[RowSource],
    cell_tag: &str,
    options: &SortOptions,
) {
    for row in rows {
        let tr = doc.create_element("tr");
        if row.group {
            doc.add_class(tr, &options.group_class);
        }
        if row.continuation {
            doc.set_attr(tr, ROW_ROLE_ATTR, "continuation");
        }
        for cell in &row.cells {
            let detail = cell.detail();
            let el = doc.create_element(cell_tag);
            if let Some(value) = &detail.value {
                doc.set_attr(el, VALUE_ATTR, value);
            }
            if let Some(sort_type) = &detail.sort_type {
                doc.set_attr(el, DECLARED_KIND_ATTR, sort_type);
            }
            if let Some(colspan) = detail.colspan {
                doc.set_attr(el, "colspan", &colspan.to_string());
            }
            if let Some(direction) = detail.direction {
                doc.set_attr(el, DIRECTION_ATTR, direction.as_str());
            }
            let text = doc.create_text(&detail.text);
            doc.append_child(el, text);
            doc.append_child(tr, el);
        }
        doc.append_child(parent, tr);
    }
}

fn read_rows(doc: &Document, parent: NodeId, options: &SortOptions) -> Vec<RowSource> {
    doc.element_children(parent)
        .into_iter()
        .map(|tr| read_row(doc, tr, options))
        .collect()
}

fn read_row(doc: &Document, tr: NodeId, options: &SortOptions) -> RowSource {
    let cells = doc
        .element_children(tr)
        .into_iter()
        .map(|cell| {
            let detail = CellDetail {
                text: doc.inner_text(cell),
                value: doc.attr(cell, VALUE_ATTR).map(str::to_string),
                sort_type: doc.attr(cell, DECLARED_KIND_ATTR).map(str::to_string),
                colspan: doc.attr(cell, "colspan").and_then(|v| v.parse().ok()),
                direction: doc.attr(cell, DIRECTION_ATTR).and_then(SortDirection::parse),
            };
            let plain = detail.value.is_none()
                && detail.sort_type.is_none()
                && detail.colspan.is_none()
                && detail.direction.is_none();
            if plain {
                CellSource::Text(detail.text)
            } else {
                CellSource::Detailed(detail)
            }
        })
        .collect();
    RowSource {
        group: doc.has_class(tr, &options.group_class),
        continuation: doc.attr(tr, ROW_ROLE_ATTR) == Some("continuation"),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "title": "Coverage",
        "tables": [{
            "id": "files",
            "preserve_row_spans": false,
            "sections": [
                {"kind": "head", "rows": [{"cells": ["File", {"text": "Hits", "sort_type": "numeric"}]}]},
                {"kind": "body", "rows": [
                    {"cells": ["a.cfc", 10]},
                    {"group": true, "cells": ["detail", {"text": "1 s", "value": "1000"}]}
                ]}
            ]
        }]
    }"#;

    #[test]
    fn test_build_follows_markup_contract() {
        let report: ReportSource = serde_json::from_str(SAMPLE).unwrap();
        let mut doc = Document::new();
        let tables = report.build(&mut doc, &SortOptions::default());
        assert_eq!(tables.len(), 1);

        let table = tables[0];
        assert!(doc.has_class(table, "sortable-table"));
        assert_eq!(doc.attr(table, "id"), Some("files"));
        assert_eq!(doc.attr(table, ROW_SPAN_ATTR), Some("false"));

        let headers = doc.elements_by_tag(table, "th");
        assert_eq!(doc.attr(headers[1], DECLARED_KIND_ATTR), Some("numeric"));

        let rows = doc.elements_by_tag(table, "tbody")[0];
        let rows = doc.element_children(rows);
        assert!(doc.has_class(rows[1], "sort-group"));
        let cells = doc.element_children(rows[0]);
        assert_eq!(doc.inner_text(cells[1]), "10");
        let detail_cells = doc.element_children(rows[1]);
        assert_eq!(doc.attr(detail_cells[1], VALUE_ATTR), Some("1000"));
    }

    #[test]
    fn test_read_back_matches_input() {
        let report: ReportSource = serde_json::from_str(SAMPLE).unwrap();
        let options = SortOptions::default();
        let mut doc = Document::new();
        let tables = report.build(&mut doc, &options);
        let read = ReportSource::from_document(&doc, &tables, report.title.clone(), &options);

        let table = &read.tables[0];
        assert_eq!(table.sections.len(), 2);
        match &table.sections[1] {
            SectionSource::Body { rows } => {
                assert_eq!(rows[0].cells[1], CellSource::Text("10".to_string()));
                assert!(rows[1].group);
            }
            other => panic!("expected body section, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{"tables": [], "extra": 1}"#;
        assert!(serde_json::from_str::<ReportSource>(json).is_err());
    }

    #[test]
    fn test_adjacent_table_rows_merge() {
        let sections = vec![
            SectionSource::Rows { rows: vec![RowSource::default()] },
            SectionSource::Rows { rows: vec![RowSource::default()] },
        ];
        let merged = sections.into_iter().fold(Vec::new(), merge_adjacent_rows);
        assert_eq!(merged.len(), 1);
    }
}
