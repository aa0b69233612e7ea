//! Report theme toggle
//!
//! The theme is one stored entry holding `auto`, `light` or `dark`. A toggle
//! from `auto` goes to the opposite of the system appearance, so the first
//! click always changes what is shown; after that it alternates `dark` and
//! `light`. The effective appearance is dark for `dark`, and for `auto` when
//! the system prefers dark; system changes only matter while in `auto`.
//!
//! The toggle control names the mode a click switches to.
//!
//! Storage is injected through [`KeyValueStore`]: [`MemoryStore`] for tests and
//! embedding, [`FileStore`] for the CLI.

use crate::dom::{Document, NodeId};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_STORAGE_KEY: &str = "darkMode";
pub const DEFAULT_DARK_CLASS: &str = "dark-mode";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Auto => "auto",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Theme> {
        match value.trim() {
            "auto" => Some(Theme::Auto),
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    /// Theme a toggle switches to, given the system appearance
    pub fn next(&self, system_dark: bool) -> Theme {
        match self {
            Theme::Auto if system_dark => Theme::Light,
            Theme::Auto => Theme::Dark,
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Auto => "Auto",
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }
}

/// String key-value storage, the shape of a browser's local storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Key-value store persisted as a JSON object on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open a store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is also
    /// treated as empty (with a warning) and is replaced on the next write.
    pub fn open(path: &Path) -> Self {
        let entries = if path.exists() {
            match load_entries(path) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "ignoring unreadable theme store: {e:#}");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        FileStore {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read store: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse store: {}", path.display()))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.entries).context("failed to serialize store")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write store: {}", self.path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeOptions {
    pub storage_key: String,
    pub dark_class: String,
}

impl Default for ThemeOptions {
    fn default() -> Self {
        ThemeOptions {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            dark_class: DEFAULT_DARK_CLASS.to_string(),
        }
    }
}

/// Theme setting bound to its store
#[derive(Debug)]
pub struct ThemeToggle<S: KeyValueStore> {
    store: S,
    options: ThemeOptions,
    theme: Theme,
    system_dark: bool,
}

impl<S: KeyValueStore> ThemeToggle<S> {
    /// Read the stored theme; a missing or unknown value means `auto`
    pub fn load(store: S, options: ThemeOptions, system_dark: bool) -> Self {
        let theme = match store.get(&options.storage_key) {
            None => Theme::Auto,
            Some(value) => Theme::parse(&value).unwrap_or_else(|| {
                tracing::warn!(value = %value, "unknown stored theme, using auto");
                Theme::Auto
            }),
        };
        ThemeToggle {
            store,
            options,
            theme,
            system_dark,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_dark(&self) -> bool {
        match self.theme {
            Theme::Dark => true,
            Theme::Light => false,
            Theme::Auto => self.system_dark,
        }
    }

    pub fn set(&mut self, theme: Theme) -> Result<()> {
        self.store.set(&self.options.storage_key, theme.as_str())?;
        self.theme = theme;
        Ok(())
    }

    /// Switch away from the current appearance and persist the result
    pub fn toggle(&mut self) -> Result<Theme> {
        let next = self.theme.next(self.system_dark);
        self.set(next)?;
        Ok(next)
    }

    /// Text for the toggle control: the theme a click would switch to
    pub fn label(&self) -> &'static str {
        self.theme.next(self.system_dark).label()
    }

    /// Record a system color-scheme change. Returns true when the change
    /// affects the appearance, which only happens in `auto`.
    pub fn on_system_change(&mut self, prefers_dark: bool) -> bool {
        self.system_dark = prefers_dark;
        self.theme == Theme::Auto
    }

    /// Reflect the theme onto the document body and the toggle's label
    pub fn apply(&self, doc: &mut Document, toggle_label: Option<NodeId>) {
        let body = doc.body();
        if self.is_dark() {
            doc.add_class(body, &self.options.dark_class);
        } else {
            doc.remove_class(body, &self.options.dark_class);
        }
        if let Some(label) = toggle_label {
            doc.set_text_content(label, self.label());
        }
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
