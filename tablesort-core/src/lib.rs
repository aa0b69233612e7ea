//! tablesort core library - client-side table sorting for coverage reports

#![deny(warnings)]

// Global invariants enforced in this crate:
// - A sort moves rows, it never creates, drops or edits them
// - Continuation rows stay directly after their primary row
// - Equal keys keep their document order (stable ordering)
// - No global mutable state, no clocks, threads, or async
// - Identical input yields byte-for-byte identical output

pub mod collate;
pub mod config;
pub mod dom;
pub mod header;
pub mod html;
pub mod init;
pub mod key;
pub mod order;
pub mod records;
pub mod report;
pub mod sorter;
pub mod source;
pub mod theme;

pub use config::ResolvedConfig;
pub use dom::{Document, NodeId};
pub use header::{SortDirection, SortKind};
pub use init::{click, init_table_sorting, SortableHeader};
pub use report::{render_json, render_text};
pub use sorter::{sort_table, SortOptions, SortOutcome};
pub use source::ReportSource;
pub use theme::{FileStore, KeyValueStore, MemoryStore, Theme, ThemeToggle};

use anyhow::Result;
use std::path::Path;

/// A report built into a document with sorting initialized
#[derive(Debug, Clone)]
pub struct LoadedReport {
    pub doc: Document,
    pub title: Option<String>,
    pub tables: Vec<NodeId>,
    pub headers: Vec<SortableHeader>,
}

impl LoadedReport {
    /// Build `source` into a fresh document and make its tables sortable
    pub fn build(source: &ReportSource, options: &SortOptions) -> Self {
        let mut doc = Document::new();
        let tables = source.build(&mut doc, options);
        let headers = init_table_sorting(&mut doc, options);
        LoadedReport {
            doc,
            title: source.title.clone(),
            tables,
            headers,
        }
    }

    /// Find a clickable header of table `table` by column index or label.
    ///
    /// A label matches case-insensitively against the header text.
    pub fn find_header(&self, table: usize, column: &str) -> Result<SortableHeader> {
        let Some(&table_node) = self.tables.get(table) else {
            anyhow::bail!(
                "table {} out of range (report has {} tables)",
                table,
                self.tables.len()
            );
        };
        let candidates: Vec<&SortableHeader> =
            self.headers.iter().filter(|h| h.table == table_node).collect();
        if candidates.is_empty() {
            anyhow::bail!("table {} has no sortable headers", table);
        }

        let found = match column.trim().parse::<usize>() {
            Ok(index) => candidates.iter().find(|h| h.column == index),
            Err(_) => candidates
                .iter()
                .find(|h| h.label.eq_ignore_ascii_case(column.trim())),
        };

        match found {
            Some(header) => Ok((*header).clone()),
            None => {
                let labels: Vec<&str> = candidates.iter().map(|h| h.label.as_str()).collect();
                anyhow::bail!(
                    "no column {:?} in table {} (columns: {})",
                    column,
                    table,
                    labels.join(", ")
                )
            }
        }
    }

    /// Click `header` `clicks` times, returning the last outcome
    pub fn sort_by(
        &mut self,
        header: &SortableHeader,
        clicks: usize,
        options: &SortOptions,
    ) -> Option<SortOutcome> {
        let mut last = None;
        for _ in 0..clicks {
            if let Some(outcome) = click(&mut self.doc, header.header, options).pop() {
                last = Some(outcome);
            }
        }
        last
    }

    /// Read the tables back out in their current order
    pub fn to_source(&self, options: &SortOptions) -> ReportSource {
        ReportSource::from_document(&self.doc, &self.tables, self.title.clone(), options)
    }
}

/// Load a report description and build it with sorting initialized
pub fn load_report(path: &Path, options: &SortOptions) -> Result<LoadedReport> {
    let source = source::load_report(path)?;
    Ok(LoadedReport::build(&source, options))
}
