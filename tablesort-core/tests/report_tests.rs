//! Report output and theme integration tests

use std::path::PathBuf;
use tablesort_core::config;
use tablesort_core::html::render_html_report;
use tablesort_core::source::{CellSource, SectionSource};
use tablesort_core::theme::ThemeOptions;
use tablesort_core::{
    load_report, render_json, render_text, FileStore, KeyValueStore, LoadedReport, ReportSource,
    SortOptions, Theme, ThemeToggle,
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn sorted_flat_report(clicks: usize) -> (LoadedReport, SortOptions) {
    let options = SortOptions::default();
    let mut report = load_report(&fixture_path("flat-report.json"), &options).unwrap();
    let header = report.find_header(0, "Hits").unwrap();
    report.sort_by(&header, clicks, &options).unwrap();
    (report, options)
}

#[test]
fn test_text_output_follows_sorted_order() {
    let (report, _) = sorted_flat_report(2);
    let text = render_text(&report.doc, report.tables[0]);
    let lines: Vec<&str> = text.lines().collect();

    assert!(lines[0].contains("Hits v"), "header line: {}", lines[0]);
    assert!(lines[2].starts_with("beta.cfc"));
    assert!(lines[3].starts_with("delta.cfc"));
    assert!(lines[4].starts_with("Alpha.cfc"));
    assert!(lines[5].starts_with("  line 4"));
}

#[test]
fn test_json_output_reloads_in_sorted_order() {
    let (report, options) = sorted_flat_report(1);
    let json = render_json(&report.to_source(&options)).unwrap();
    let reloaded: ReportSource = serde_json::from_str(&json).unwrap();
    let rebuilt = LoadedReport::build(&reloaded, &options);

    assert_eq!(
        render_text(&rebuilt.doc, rebuilt.tables[0]),
        render_text(&report.doc, report.tables[0])
    );
    assert_eq!(reloaded.title.as_deref(), Some("Coverage by file"));
}

#[test]
fn test_json_output_keeps_cell_overrides() {
    let (report, options) = sorted_flat_report(1);
    let source = report.to_source(&options);
    let value_cells: Vec<&CellSource> = source.tables[0]
        .sections
        .iter()
        .flat_map(|section| match section {
            SectionSource::Body { rows } => rows.iter().collect::<Vec<_>>(),
            _ => Vec::new(),
        })
        .flat_map(|row| row.cells.iter())
        .filter(|cell| matches!(cell, CellSource::Detailed(detail) if detail.value.is_some()))
        .collect();
    assert_eq!(value_cells.len(), 1);
    assert_eq!(value_cells[0].text(), "n/a");
}

#[test]
fn test_html_page_reflects_theme_and_sort_state() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("theme.json");

    // System is light, so the first click from auto goes dark
    let mut toggle = ThemeToggle::load(FileStore::open(&store_path), ThemeOptions::default(), false);
    toggle.toggle().unwrap();
    assert_eq!(toggle.theme(), Theme::Dark);

    let (mut report, _) = sorted_flat_report(1);
    let reloaded = ThemeToggle::load(FileStore::open(&store_path), ThemeOptions::default(), false);
    let button = report.doc.create_element("button");
    let body = report.doc.body();
    report.doc.append_child(body, button);
    reloaded.apply(&mut report.doc, Some(button));

    let page = render_html_report(&report.doc, "Coverage", reloaded.theme());
    assert!(page.contains(r#"<body class="dark-mode">"#));
    assert!(page.contains(">Light</button>"));
    assert!(page.contains(r#"data-dir="asc""#));
    assert!(page.contains(r#"data-type="numeric""#));
}

#[test]
fn test_custom_storage_key_and_dark_class() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".tablesortrc.json"),
        r#"{"theme": {"storage_key": "report-theme", "dark_class": "night"}}"#,
    )
    .unwrap();
    let resolved = config::load_and_resolve(dir.path(), None).unwrap();

    let store_path = dir.path().join("store.json");
    let mut toggle = ThemeToggle::load(FileStore::open(&store_path), resolved.theme.clone(), true);
    toggle.set(Theme::Auto).unwrap();

    let mut doc = tablesort_core::Document::new();
    toggle.apply(&mut doc, None);
    assert!(doc.has_class(doc.body(), "night"));

    let store = toggle.into_store();
    assert_eq!(store.get("report-theme").as_deref(), Some("auto"));
    assert_eq!(store.get("darkMode"), None);
}

#[test]
fn test_table_attribute_overrides_configured_row_roles() {
    let options = SortOptions::default();
    let source: ReportSource = serde_json::from_str(
        r#"{"tables": [{"row_roles": "explicit", "sections": [
            {"kind": "head", "rows": [{"cells": ["Name", {"text": "Count", "sort_type": "numeric"}]}]},
            {"kind": "body", "rows": [
                {"cells": ["b", 3]},
                {"cells": ["a", 10]},
                {"continuation": true, "cells": ["a detail", "-"]},
                {"cells": ["c", 2]}
            ]}
        ]}]}"#,
    )
    .unwrap();
    let mut report = LoadedReport::build(&source, &options);
    let header = report.find_header(0, "Count").unwrap();
    let outcome = report.sort_by(&header, 2, &options).unwrap();
    assert_eq!(outcome.records, 3);

    let text = render_text(&report.doc, report.tables[0]);
    let firsts: Vec<&str> = text
        .lines()
        .skip(2)
        .map(|line| line.split_whitespace().next().unwrap_or(""))
        .collect();
    assert_eq!(firsts, vec!["a", "a", "b", "c"]);
}
