//! Header sort state
//!
//! Sort kind and direction are carried as typed values through a sort and only
//! serialized to `data-type` / `data-dir` attributes on the header cell.

use crate::dom::{Document, NodeId};
use serde::{Deserialize, Serialize};

/// Attribute holding the resolved sort kind of a header
pub const KIND_ATTR: &str = "data-type";
/// Attribute holding the current direction of the active header
pub const DIRECTION_ATTR: &str = "data-dir";
/// Attribute a report author uses to declare a column's kind
pub const DECLARED_KIND_ATTR: &str = "data-sort-type";

/// How a column's values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKind {
    Text,
    Numeric,
}

impl SortKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKind::Text => "text",
            SortKind::Numeric => "numeric",
        }
    }

    /// Parse an attribute value; `number` is accepted as an alias of `numeric`
    pub fn parse(value: &str) -> Option<SortKind> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(SortKind::Text),
            "numeric" | "number" => Some(SortKind::Numeric),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<SortDirection> {
        match value.trim() {
            "asc" => Some(SortDirection::Ascending),
            "desc" => Some(SortDirection::Descending),
            _ => None,
        }
    }

    /// Next direction after a click: none and descending go ascending
    pub fn toggle(current: Option<SortDirection>) -> SortDirection {
        match current {
            Some(SortDirection::Ascending) => SortDirection::Descending,
            Some(SortDirection::Descending) | None => SortDirection::Ascending,
        }
    }
}

/// Sort state stored on one header cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderState {
    pub kind: Option<SortKind>,
    pub direction: Option<SortDirection>,
}

impl HeaderState {
    /// State after the header is activated: the kind is fixed on first use,
    /// the direction toggles
    pub fn activate(self, default_kind: SortKind) -> HeaderState {
        HeaderState {
            kind: Some(self.kind.unwrap_or(default_kind)),
            direction: Some(SortDirection::toggle(self.direction)),
        }
    }

    /// Read state from a header's attributes. Unrecognized values read as absent.
    pub fn read(doc: &Document, th: NodeId) -> HeaderState {
        let kind = doc.attr(th, KIND_ATTR).and_then(|value| {
            let kind = SortKind::parse(value);
            if kind.is_none() {
                tracing::warn!(value, "ignoring unknown sort kind on header");
            }
            kind
        });
        HeaderState {
            kind,
            direction: doc.attr(th, DIRECTION_ATTR).and_then(SortDirection::parse),
        }
    }

    pub fn write(&self, doc: &mut Document, th: NodeId) {
        match self.kind {
            Some(kind) => doc.set_attr(th, KIND_ATTR, kind.as_str()),
            None => doc.remove_attr(th, KIND_ATTR),
        }
        match self.direction {
            Some(direction) => doc.set_attr(th, DIRECTION_ATTR, direction.as_str()),
            None => doc.remove_attr(th, DIRECTION_ATTR),
        }
    }
}

/// Header cells sharing a row with `th`, including `th` itself
pub fn row_headers(doc: &Document, th: NodeId) -> Vec<NodeId> {
    match doc.parent(th) {
        Some(row) => doc.elements_by_tag(row, "th"),
        None => vec![th],
    }
}

/// Drop direction state from every other header in the row of `th`
pub fn clear_sibling_directions(doc: &mut Document, th: NodeId) {
    for other in row_headers(doc, th) {
        if other != th {
            doc.remove_attr(other, DIRECTION_ATTR);
        }
    }
}

/// Bold the active header and italicize it while ascending; dim the others
pub fn highlight_active(doc: &mut Document, th: NodeId, direction: SortDirection) {
    let Some(row) = doc.parent(th) else {
        return;
    };
    for cell in doc.element_children(row) {
        if cell == th {
            doc.set_style(cell, "font-weight", "700");
            let style = match direction {
                SortDirection::Ascending => "italic",
                SortDirection::Descending => "normal",
            };
            doc.set_style(cell, "font-style", style);
        } else {
            doc.set_style(cell, "font-weight", "300");
            doc.set_style(cell, "font-style", "normal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_aliases() {
        assert_eq!(SortKind::parse("text"), Some(SortKind::Text));
        assert_eq!(SortKind::parse("numeric"), Some(SortKind::Numeric));
        assert_eq!(SortKind::parse("number"), Some(SortKind::Numeric));
        assert_eq!(SortKind::parse("date"), None);
    }

    #[test]
    fn test_direction_cycle() {
        let mut state = HeaderState::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            state = state.activate(SortKind::Text);
            seen.push(state.direction);
        }
        assert_eq!(
            seen,
            vec![
                Some(SortDirection::Ascending),
                Some(SortDirection::Descending),
                Some(SortDirection::Ascending),
                Some(SortDirection::Descending),
            ]
        );
    }

    #[test]
    fn test_kind_fixed_on_first_activation() {
        let state = HeaderState::default().activate(SortKind::Text);
        let state = state.activate(SortKind::Numeric);
        assert_eq!(state.kind, Some(SortKind::Text));
    }

    #[test]
    fn test_state_round_trips_through_attributes() {
        let mut doc = Document::new();
        let th = doc.create_element("th");
        let state = HeaderState {
            kind: Some(SortKind::Numeric),
            direction: Some(SortDirection::Descending),
        };
        state.write(&mut doc, th);
        assert_eq!(doc.attr(th, KIND_ATTR), Some("numeric"));
        assert_eq!(doc.attr(th, DIRECTION_ATTR), Some("desc"));
        assert_eq!(HeaderState::read(&doc, th), state);
    }

    #[test]
    fn test_unknown_kind_reads_as_absent() {
        let mut doc = Document::new();
        let th = doc.create_element("th");
        doc.set_attr(th, KIND_ATTR, "date");
        assert_eq!(HeaderState::read(&doc, th).kind, None);
    }
}
