//! Sort key extraction
//!
//! Two modes, selected by [`Collation`]:
//! - Locale (raw): the cell's `data-value` override wins over its text; number
//!   decoration (thousands separators, trailing `%`, units) is stripped and the
//!   key becomes a number when what is left parses as one. In a numeric column
//!   a cell with nothing numeric left (`"n/a"`) keys as `0`. Otherwise the key
//!   is the text itself.
//! - Fallback: text columns are lower-cased; numeric columns map `""` and `"-"`
//!   to `-1` and coerce everything else the way `Number()` does, NaN included.

use crate::collate::Collation;
use crate::header::SortKind;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Sortable content of one cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellSnapshot {
    /// Rendered text of the cell
    pub text: String,
    /// `data-value` override, if present
    pub value: Option<String>,
}

impl CellSnapshot {
    pub fn new(text: &str) -> Self {
        CellSnapshot {
            text: text.to_string(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Number(f64),
}

impl SortKey {
    /// Numeric view of the key; text coerces like `Number()`
    pub fn as_number(&self) -> f64 {
        match self {
            SortKey::Number(n) => *n,
            SortKey::Text(text) => js_number(text),
        }
    }

    /// Text view of the key; numbers print like `String()`
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            SortKey::Text(text) => Cow::Borrowed(text),
            SortKey::Number(n) => Cow::Owned(format_number(*n)),
        }
    }
}

fn decoration() -> &'static Regex {
    static DECORATION: OnceLock<Regex> = OnceLock::new();
    // ASCII digits only; `\d` would admit other scripts' digits
    DECORATION.get_or_init(|| Regex::new(r"[^0-9.,%-]").expect("static regex is valid"))
}

/// Drop everything but digits, `.`, `-`, then separators and a trailing `%`
fn strip_decoration(text: &str) -> String {
    let cleaned = decoration().replace_all(text, "").replace(',', "");
    match cleaned.strip_suffix('%') {
        Some(rest) => rest.to_string(),
        None => cleaned,
    }
}

/// Strip number decoration and parse what remains.
///
/// `"1,234 μs"` gives `1234`, `"56.7%"` gives `56.7`. Returns `None` when
/// nothing numeric is left.
pub fn parse_decorated_number(text: &str) -> Option<f64> {
    let cleaned = strip_decoration(text);
    if cleaned.is_empty() {
        return None;
    }
    let n = js_number(&cleaned);
    (!n.is_nan()).then_some(n)
}

/// Coerce a string the way JavaScript's `Number()` does
pub fn js_number(text: &str) -> f64 {
    let t = text.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let lower = t.to_ascii_lowercase();
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return f64::NAN;
            }
            return u64::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }
    // Rust accepts "inf" and "nan" spellings that Number() rejects
    if t.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// Format a number the way JavaScript's `String()` does for common values
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// Extract the sort key of one cell
pub fn extract_key(cell: &CellSnapshot, kind: SortKind, collation: Collation) -> SortKey {
    match collation {
        Collation::Fallback => match kind {
            SortKind::Text => SortKey::Text(cell.text.to_lowercase()),
            SortKind::Numeric => match cell.text.as_str() {
                "" | "-" => SortKey::Number(-1.0),
                other => SortKey::Number(js_number(other)),
            },
        },
        Collation::Locale => {
            let raw = cell
                .value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or(&cell.text);
            match parse_decorated_number(raw) {
                Some(n) => SortKey::Number(n),
                // Placeholders like "n/a" in a numeric column count as zero
                None if kind == SortKind::Numeric && strip_decoration(raw).is_empty() => {
                    SortKey::Number(0.0)
                }
                None => SortKey::Text(raw.to_string()),
            }
        }
    }
}
