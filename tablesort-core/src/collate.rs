//! Text collation for sort keys
//!
//! `Locale` mode uses an English ICU collator with numeric ordering on and
//! punctuation shifted out of the comparison, so `file2` sorts before
//! `file10`, `éclair` before `fig`, and case only breaks ties. `Fallback` mode
//! is what a client without a collator does: keys are lower-cased at
//! extraction and compared by code point.

use icu::collator::options::{AlternateHandling, CollatorOptions};
use icu::collator::preferences::CollationNumericOrdering;
use icu::collator::{Collator, CollatorBorrowed, CollatorPreferences};
use icu::locale::locale;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collation {
    #[default]
    Locale,
    Fallback,
}

impl Collation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collation::Locale => "locale",
            Collation::Fallback => "fallback",
        }
    }
}

/// Shared `en` collator, built once from compiled data
fn english_collator() -> Option<&'static CollatorBorrowed<'static>> {
    static COLLATOR: OnceLock<Option<CollatorBorrowed<'static>>> = OnceLock::new();
    COLLATOR
        .get_or_init(|| {
            let mut prefs: CollatorPreferences = locale!("en").into();
            prefs.numeric_ordering = Some(CollationNumericOrdering::True);
            let mut options = CollatorOptions::default();
            options.alternate_handling = Some(AlternateHandling::Shifted);

            match Collator::try_new(prefs, options) {
                Ok(collator) => Some(collator),
                Err(e) => {
                    tracing::warn!("no en collator, comparing lower-cased code points: {e}");
                    None
                }
            }
        })
        .as_ref()
}

/// Compare two text keys under the given collation
pub fn compare_text(a: &str, b: &str, collation: Collation) -> Ordering {
    match collation {
        Collation::Locale => match english_collator() {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        },
        Collation::Fallback => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale_cmp(a: &str, b: &str) -> Ordering {
        compare_text(a, b, Collation::Locale)
    }

    #[test]
    fn test_digit_runs_compare_by_value() {
        assert_eq!(locale_cmp("file2.cfc", "file10.cfc"), Ordering::Less);
        assert_eq!(locale_cmp("10", "9"), Ordering::Greater);
    }

    #[test]
    fn test_case_only_breaks_ties() {
        assert_eq!(locale_cmp("Apple", "banana"), Ordering::Less);
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
    }

    #[test]
    fn test_accented_letters_sort_with_their_base_letter() {
        assert_eq!(locale_cmp("éclair", "fig"), Ordering::Less);
        assert_eq!(locale_cmp("Ärger", "Bär"), Ordering::Less);
        assert_eq!(locale_cmp("zebra", "Ödland"), Ordering::Greater);
    }

    #[test]
    fn test_punctuation_is_ignored() {
        assert_eq!(locale_cmp("co-op", "coop"), Ordering::Equal);
        assert_eq!(locale_cmp("lib/util", "libutil"), Ordering::Equal);
    }

    #[test]
    fn test_fallback_is_code_point_order() {
        assert_eq!(compare_text("B", "a", Collation::Fallback), Ordering::Less);
        assert_eq!(compare_text("apple", "banana", Collation::Fallback), Ordering::Less);
        assert_eq!(compare_text("éclair", "fig", Collation::Fallback), Ordering::Greater);
    }
}
