//! tablesort CLI - sort coverage-report tables and render themed HTML reports

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tablesort_core::config::{self, ResolvedConfig};
use tablesort_core::html::render_html_report;
use tablesort_core::theme::ThemeOptions;
use tablesort_core::{load_report, render_json, render_text, FileStore, Theme, ThemeToggle};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Theme store used when --store / --theme-store is not given
const DEFAULT_THEME_STORE: &str = ".tablesort/theme.json";

/// HTML output used when `render` gets no --output
const DEFAULT_REPORT_PATH: &str = ".tablesort/report.html";

#[derive(Parser)]
#[command(name = "tablesort")]
#[command(about = "Sort coverage-report tables and render themed HTML reports")]
#[command(version = env!("TABLESORT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort one table of a report by a column, as header clicks would
    Sort {
        /// Path to report JSON
        input: PathBuf,

        /// Column to sort by: zero-based index or header label
        #[arg(long)]
        column: String,

        /// Zero-based index of the table in the report
        #[arg(long, default_value = "0")]
        table: usize,

        /// Number of header clicks (1 = ascending, 2 = descending, ...)
        #[arg(long, default_value = "1")]
        clicks: usize,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Output file path (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Render a report as a self-contained HTML page
    Render {
        /// Path to report JSON
        input: PathBuf,

        /// Output file path (default: .tablesort/report.html)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Theme store to read the current theme from
        #[arg(long)]
        theme_store: Option<PathBuf>,

        /// Treat the system color scheme as dark (used in auto mode)
        #[arg(long)]
        prefers_dark: bool,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show or change the report theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,

        /// Theme store path (default: .tablesort/theme.json)
        #[arg(long, global = true)]
        store: Option<PathBuf>,

        /// Treat the system color scheme as dark (used in auto mode)
        #[arg(long, global = true)]
        prefers_dark: bool,

        /// Path to config file (default: auto-discover)
        #[arg(long, global = true)]
        config: Option<PathBuf>,
    },
    /// Validate or show configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Print the stored theme and the resulting appearance
    Show,
    /// Switch to the opposite appearance (from auto: opposite of the system)
    Toggle,
    /// Store a specific theme
    Set {
        /// auto, light or dark
        mode: ThemeArg,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Html,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ThemeArg {
    Auto,
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Theme {
        match arg {
            ThemeArg::Auto => Theme::Auto,
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sort {
            input,
            column,
            table,
            clicks,
            format,
            output,
            config: config_path,
        } => {
            let resolved = load_config(&input, config_path.as_deref())?;
            let options = &resolved.sort;

            let mut report = load_report(&input, options)?;
            tracing::debug!(
                input = %input.display(),
                tables = report.tables.len(),
                headers = report.headers.len(),
                "loaded report"
            );
            let header = report.find_header(table, &column)?;
            let outcome = report
                .sort_by(&header, clicks.max(1), options)
                .with_context(|| format!("column {:?} is not inside a table row", column))?;

            eprintln!(
                "Sorted table {} by {} ({}, {}, {} records{})",
                table,
                header.label,
                outcome.kind.as_str(),
                outcome.direction.as_str(),
                outcome.records,
                if outcome.grouped { ", grouped" } else { "" }
            );

            let rendered = match format {
                OutputFormat::Text => render_text(&report.doc, outcome.table),
                OutputFormat::Json => render_json(&report.to_source(options))?,
                OutputFormat::Html => {
                    let title = report.title.clone().unwrap_or_else(|| "Report".to_string());
                    render_html_report(&report.doc, &title, Theme::Auto)
                }
            };
            emit(output.as_deref(), &rendered)?;
        }
        Commands::Render {
            input,
            output,
            theme_store,
            prefers_dark,
            config: config_path,
        } => {
            let resolved = load_config(&input, config_path.as_deref())?;
            let mut report = load_report(&input, &resolved.sort)?;

            let store_path = theme_store.unwrap_or_else(|| PathBuf::from(DEFAULT_THEME_STORE));
            let toggle = ThemeToggle::load(
                FileStore::open(&store_path),
                resolved.theme.clone(),
                prefers_dark,
            );
            let button = report.doc.create_element("button");
            report.doc.add_class(button, "theme-toggle");
            let body = report.doc.body();
            report.doc.append_child(body, button);
            toggle.apply(&mut report.doc, Some(button));

            let title = report.title.clone().unwrap_or_else(|| "Report".to_string());
            let html = render_html_report(&report.doc, &title, toggle.theme());
            let output_path = output.unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH));
            write_html_report(&output_path, &html)?;
            eprintln!("HTML report written to: {}", output_path.display());
        }
        Commands::Theme {
            action,
            store,
            prefers_dark,
            config: config_path,
        } => {
            let project_root = std::env::current_dir()?;
            let resolved = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;
            let store_path = store.unwrap_or_else(|| PathBuf::from(DEFAULT_THEME_STORE));
            run_theme(action, &store_path, resolved.theme, prefers_dark)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;

                println!("Configuration:");
                if let Some(ref p) = resolved.config_path {
                    println!("  Source: {}", p.display());
                } else {
                    println!("  Source: defaults (no config file found)");
                }
                println!();
                println!("Sorting:");
                println!("  collation: {}", resolved.sort.collation.as_str());
                println!("  row_roles: {}", resolved.sort.row_roles.as_str());
                println!("  preserve_row_spans: {}", resolved.sort.preserve_row_spans);
                println!("  sortable_class: {}", resolved.sort.sortable_class);
                println!("  group_class: {}", resolved.sort.group_class);
                println!();
                println!("Theme:");
                println!("  storage_key: {}", resolved.theme.storage_key);
                println!("  dark_class: {}", resolved.theme.dark_class);
            }
        },
    }

    Ok(())
}

/// Resolve config for a report, discovering from the report's directory
fn load_config(input: &Path, config_path: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    if !input.exists() {
        anyhow::bail!("Path does not exist: {}", input.display());
    }
    let project_root = match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    let resolved = config::load_and_resolve(&project_root, config_path)
        .context("failed to load configuration")?;

    if let Some(config_path) = &resolved.config_path {
        eprintln!("Using config: {}", config_path.display());
    }
    Ok(resolved)
}

fn run_theme(
    action: ThemeAction,
    store_path: &Path,
    options: ThemeOptions,
    prefers_dark: bool,
) -> anyhow::Result<()> {
    let mut toggle = ThemeToggle::load(FileStore::open(store_path), options, prefers_dark);

    match action {
        ThemeAction::Show => {}
        ThemeAction::Toggle => {
            toggle.toggle().context("failed to save theme")?;
        }
        ThemeAction::Set { mode } => {
            toggle.set(mode.into()).context("failed to save theme")?;
        }
    }

    println!(
        "{} ({})",
        toggle.theme().label(),
        if toggle.is_dark() { "dark" } else { "light" }
    );
    eprintln!("Theme store: {}", toggle.into_store().path().display());
    Ok(())
}

/// Print to stdout, or write to `path` when given
fn emit(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output: {}", path.display()))
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

/// Write HTML report to file with atomic write pattern
fn write_html_report(path: &Path, html: &str) -> anyhow::Result<()> {
    use std::fs;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Atomic write (temp + rename pattern)
    let temp_path = path.with_extension("html.tmp");
    fs::write(&temp_path, html)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}
