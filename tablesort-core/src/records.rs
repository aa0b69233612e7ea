//! Record building
//!
//! A record is the unit that moves during a sort: a primary row, the
//! continuation rows that follow it, and for tables that repeat a header per
//! group, the group's `thead` and `tbody`. Building works on a [`TableLayout`]
//! snapshot so it never touches the document.
//!
//! Global invariants enforced:
//! - Every row appears in at most one record
//! - Continuation rows keep their original relative order after their primary row
//! - Rows that join no record are left where they are by re-attachment

use crate::collate::Collation;
use crate::dom::NodeId;
use crate::header::SortKind;
use crate::key::{extract_key, CellSnapshot, SortKey};
use serde::{Deserialize, Serialize};

/// How continuation rows are recognized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowRoles {
    /// Explicitly marked rows, plus any two-cell row when row spans are preserved
    #[default]
    Inferred,
    /// Only explicitly marked rows
    Explicit,
}

impl RowRoles {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowRoles::Inferred => "inferred",
            RowRoles::Explicit => "explicit",
        }
    }

    pub fn parse(value: &str) -> Option<RowRoles> {
        match value.trim() {
            "inferred" => Some(RowRoles::Inferred),
            "explicit" => Some(RowRoles::Explicit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowSnapshot {
    pub node: NodeId,
    pub cells: Vec<CellSnapshot>,
    /// Row is explicitly marked as belonging to the previous record
    pub continuation: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionSnapshot {
    pub body: NodeId,
    /// Immediately preceding `thead` sibling, when it has content
    pub header: Option<NodeId>,
    pub rows: Vec<RowSnapshot>,
}

/// Everything record building needs to know about a table
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub table: NodeId,
    /// Number of `thead` sections in the table
    pub header_sections: usize,
    pub preserve_row_spans: bool,
    pub row_roles: RowRoles,
    pub sections: Vec<SectionSnapshot>,
}

/// A group header and body that move together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupedSection {
    pub header: NodeId,
    pub body: NodeId,
}

/// A row together with the body section it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRow {
    pub node: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: SortKey,
    /// Primary row first, then continuation rows in document order
    pub rows: Vec<RecordRow>,
    pub section: Option<GroupedSection>,
}

impl Record {
    pub fn primary(&self) -> Option<NodeId> {
        self.rows.first().map(|r| r.node)
    }
}

/// Split a table's body rows into records keyed on `column`
pub fn build_records(
    layout: &TableLayout,
    column: usize,
    kind: SortKind,
    collation: Collation,
) -> Vec<Record> {
    let mut records: Vec<Record> = Vec::new();
    let two_cell_continues =
        layout.row_roles == RowRoles::Inferred && layout.preserve_row_spans;

    for section in &layout.sections {
        for (index, row) in section.rows.iter().enumerate() {
            let placed = RecordRow {
                node: row.node,
                body: section.body,
            };

            if row.continuation {
                // A marked row before any record has nothing to follow
                if let Some(last) = records.last_mut() {
                    last.rows.push(placed);
                }
                continue;
            }

            match row.cells.len() {
                0 | 1 => continue,
                // Requiring two records keeps a plain two-column table from
                // collapsing into one record
                2 if two_cell_continues => {
                    if records.len() > 1 {
                        if let Some(last) = records.last_mut() {
                            last.rows.push(placed);
                        }
                    }
                    continue;
                }
                _ => {}
            }

            let key = match row.cells.get(column) {
                Some(cell) => extract_key(cell, kind, collation),
                None => extract_key(&CellSnapshot::default(), kind, collation),
            };

            let grouped = if index == 0 && layout.header_sections > 1 {
                section.header.map(|header| GroupedSection {
                    header,
                    body: section.body,
                })
            } else {
                None
            };

            records.push(Record {
                key,
                rows: vec![placed],
                section: grouped,
            });
        }
    }

    records
}
