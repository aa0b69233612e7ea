//! Record ordering
//!
//! Text keys compare under the configured collation. Numeric keys compare by
//! subtraction, and a NaN difference counts as equal, so columns holding
//! non-numbers are not well ordered. That is accepted; the sort itself must
//! still finish and keep every record.

use crate::collate::{compare_text, Collation};
use crate::header::{SortDirection, SortKind};
use crate::key::SortKey;
use crate::records::Record;
use std::cmp::Ordering;

pub fn compare_keys(a: &SortKey, b: &SortKey, kind: SortKind, collation: Collation) -> Ordering {
    match kind {
        SortKind::Text => compare_text(&a.as_text(), &b.as_text(), collation),
        SortKind::Numeric => {
            let difference = a.as_number() - b.as_number();
            difference
                .partial_cmp(&0.0)
                .unwrap_or(Ordering::Equal)
        }
    }
}

/// Stable merge sort.
///
/// `slice::sort_by` may panic when the comparator is not a total order, which
/// NaN keys make it; this one only promises stability.
pub fn merge_sort_by<T, F>(items: Vec<T>, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    merge_sort_inner(items, &mut compare)
}

fn merge_sort_inner<T, F>(mut items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort_inner(items, compare);
    let right = merge_sort_inner(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            // Ties take from the left to stay stable
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged
}

/// Order records by key, then reverse for a descending sort
pub fn order_records(
    records: Vec<Record>,
    kind: SortKind,
    direction: SortDirection,
    collation: Collation,
) -> Vec<Record> {
    let mut ordered = merge_sort_by(records, |a, b| compare_keys(&a.key, &b.key, kind, collation));
    if direction == SortDirection::Descending {
        ordered.reverse();
    }
    ordered
}
