//! Configuration file support for tablesort
//!
//! An explicit `--config` path wins. Otherwise the report's directory and
//! each of its parents are searched for `.tablesortrc.json`, then
//! `tablesort.config.json`; the nearest directory with either file wins.
//!
//! All fields are optional. Markup attributes on a table take precedence over
//! config values.

use crate::collate::Collation;
use crate::records::RowRoles;
use crate::sorter::{SortOptions, DEFAULT_GROUP_CLASS, DEFAULT_SORTABLE_CLASS};
use crate::theme::{ThemeOptions, DEFAULT_DARK_CLASS, DEFAULT_STORAGE_KEY};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// tablesort configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TablesortConfig {
    /// Text comparison: "locale" (ICU, numeric-aware) or "fallback" (lowercase code points)
    #[serde(default)]
    pub collation: Option<Collation>,

    /// How continuation rows are recognized when a table doesn't say
    #[serde(default)]
    pub row_roles: Option<RowRoles>,

    /// Keep continuation rows attached when a table has no `data-rowspan` (default: true)
    #[serde(default)]
    pub preserve_row_spans: Option<bool>,

    /// Class marking tables for sorting (default: "sortable-table")
    #[serde(default)]
    pub sortable_class: Option<String>,

    /// Class marking continuation rows (default: "sort-group")
    #[serde(default)]
    pub group_class: Option<String>,

    /// Theme toggle settings
    #[serde(default)]
    pub theme: Option<ThemeConfig>,
}

/// Theme toggle settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    /// Store key holding the theme (default: "darkMode")
    pub storage_key: Option<String>,
    /// Body class applied in dark appearance (default: "dark-mode")
    pub dark_class: Option<String>,
}

/// Resolved configuration with defaults filled in
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub sort: SortOptions,
    pub theme: ThemeOptions,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

fn check_class_name(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        anyhow::bail!("{} must not be empty", field);
    }
    if value.chars().any(char::is_whitespace) {
        anyhow::bail!("{} must be a single class name (got {:?})", field, value);
    }
    Ok(())
}

impl TablesortConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref class) = self.sortable_class {
            check_class_name("sortable_class", class)?;
        }
        if let Some(ref class) = self.group_class {
            check_class_name("group_class", class)?;
        }

        if let Some(ref theme) = self.theme {
            if let Some(ref key) = theme.storage_key {
                if key.trim().is_empty() {
                    anyhow::bail!("theme.storage_key must not be empty");
                }
            }
            if let Some(ref class) = theme.dark_class {
                check_class_name("theme.dark_class", class)?;
            }
        }

        Ok(())
    }

    /// Resolve config into the options the sorter and theme toggle take
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let sort = SortOptions {
            collation: self.collation.unwrap_or_default(),
            row_roles: self.row_roles.unwrap_or_default(),
            preserve_row_spans: self.preserve_row_spans.unwrap_or(true),
            sortable_class: self
                .sortable_class
                .clone()
                .unwrap_or_else(|| DEFAULT_SORTABLE_CLASS.to_string()),
            group_class: self
                .group_class
                .clone()
                .unwrap_or_else(|| DEFAULT_GROUP_CLASS.to_string()),
        };

        let theme = match &self.theme {
            Some(t) => ThemeOptions {
                storage_key: t
                    .storage_key
                    .clone()
                    .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
                dark_class: t
                    .dark_class
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DARK_CLASS.to_string()),
            },
            None => ThemeOptions::default(),
        };

        Ok(ResolvedConfig {
            sort,
            theme,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        TablesortConfig::default().resolve()
    }
}

/// Config file names checked in each directory, highest priority first
pub const CONFIG_FILE_NAMES: [&str; 2] = [".tablesortrc.json", "tablesort.config.json"];

/// Nearest config file in `start` or any directory above it
///
/// Reports are usually written a few levels below the project that owns
/// them, so the search walks up instead of looking in one place.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

/// Read, parse and validate one config file
pub fn read_config(path: &Path) -> Result<TablesortConfig> {
    let parsed = std::fs::read_to_string(path)
        .context("unreadable")
        .and_then(|content| {
            serde_json::from_str::<TablesortConfig>(&content).context("not a tablesort config")
        })
        .and_then(|config| config.validate().map(|()| config));
    parsed.with_context(|| format!("config file {}", path.display()))
}

/// Resolve the config for a report located under `start`
///
/// An explicit path wins; otherwise the nearest file named in
/// [`CONFIG_FILE_NAMES`] is used, and defaults apply when there is none.
pub fn load_and_resolve(start: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let source = explicit
        .map(Path::to_path_buf)
        .or_else(|| find_config_file(start));
    let config = match &source {
        Some(path) => read_config(path)?,
        None => TablesortConfig::default(),
    };
    tracing::debug!(source = ?source, "resolved tablesort config");

    let mut resolved = config.resolve()?;
    resolved.config_path = source;
    Ok(resolved)
}
