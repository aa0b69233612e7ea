//! In-memory document tree
//!
//! An arena of element and text nodes carrying just enough of the DOM surface
//! for report tables: ordered children, classes, attributes, inline style and
//! click listeners. This is the boundary the sorter reads from and writes to;
//! nothing here knows about sorting rules.
//!
//! Global invariants enforced:
//! - A node has at most one parent; `append_child` detaches before attaching
//! - Traversal helpers return nodes in document order
//! - Nodes are never freed, so a `NodeId` stays valid for the document's lifetime

use crate::header::SortKind;
use std::collections::BTreeMap;

/// Handle to a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Click listener attached to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    /// Sort the enclosing table by this header, using `default_kind` when the
    /// header has no stored kind yet
    SortTable { default_kind: SortKind },
}

/// Owned document tree rooted at a `body` element
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    listeners: BTreeMap<NodeId, Vec<Listener>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            body: NodeId(0),
            listeners: BTreeMap::new(),
        };
        doc.body = doc.create_element("body");
        doc
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(Element {
            tag: tag.to_ascii_lowercase(),
            ..Element::default()
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached somewhere. Appending a node into its own subtree is
    /// ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        if self.is_inclusive_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Remove `id` from its parent's child list
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != id);
        self.nodes[id.0].parent = None;
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
            .collect()
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.node(id).map(|n| &n.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        if let Some(el) = self.element_mut(id) {
            el.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.element_mut(id) {
            el.classes.retain(|c| c != class);
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attributes.remove(name);
        }
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id)
            .and_then(|el| el.style.get(property))
            .map(String::as_str)
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.style.insert(property.to_string(), value.to_string());
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element(_)) => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    /// Rendered text: text content with whitespace runs collapsed and trimmed
    pub fn inner_text(&self, id: NodeId) -> String {
        self.text_content(id)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Replace all children of `id` with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        let node = self.create_text(text);
        self.append_child(id, node);
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|c| *c == id)?;
        siblings[..position]
            .iter()
            .rev()
            .copied()
            .find(|c| self.element(*c).is_some())
    }

    /// Nearest inclusive ancestor with the given tag
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.is_tag(node, tag) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Descendant elements of `root` in document order, excluding `root`
    pub fn descendant_elements(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.element(id).is_none() {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendant_elements(root)
            .into_iter()
            .filter(|id| self.is_tag(*id, tag))
            .collect()
    }

    pub fn elements_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendant_elements(root)
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    /// Position of a `td`/`th` among the cells of its row
    pub fn cell_index(&self, id: NodeId) -> Option<usize> {
        let row = self.parent(id)?;
        self.element_children(row)
            .into_iter()
            .filter(|c| self.is_tag(*c, "td") || self.is_tag(*c, "th"))
            .position(|c| c == id)
    }

    pub fn add_listener(&mut self, id: NodeId, listener: Listener) {
        self.listeners.entry(id).or_default().push(listener);
    }

    pub fn listeners(&self, id: NodeId) -> &[Listener] {
        self.listeners.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with_cells(doc: &mut Document, texts: &[&str]) -> NodeId {
        let tr = doc.create_element("tr");
        for text in texts {
            let td = doc.create_element("td");
            let t = doc.create_text(text);
            doc.append_child(td, t);
            doc.append_child(tr, td);
        }
        tr
    }

    #[test]
    fn test_append_child_moves_node() {
        let mut doc = Document::new();
        let a = doc.create_element("tbody");
        let b = doc.create_element("tbody");
        let row = doc.create_element("tr");
        doc.append_child(a, row);
        doc.append_child(b, row);
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[row]);
        assert_eq!(doc.parent(row), Some(b));
    }

    #[test]
    fn test_append_existing_child_moves_to_end() {
        let mut doc = Document::new();
        let body = doc.create_element("tbody");
        let first = doc.create_element("tr");
        let second = doc.create_element("tr");
        doc.append_child(body, first);
        doc.append_child(body, second);
        doc.append_child(body, first);
        assert_eq!(doc.children(body), &[second, first]);
    }

    #[test]
    fn test_append_into_own_subtree_is_ignored() {
        let mut doc = Document::new();
        let table = doc.create_element("table");
        let tbody = doc.create_element("tbody");
        doc.append_child(table, tbody);
        doc.append_child(tbody, table);
        assert_eq!(doc.parent(tbody), Some(table));
        assert_eq!(doc.parent(table), None);
    }

    #[test]
    fn test_inner_text_collapses_whitespace() {
        let mut doc = Document::new();
        let td = doc.create_element("td");
        let t1 = doc.create_text("  1,234 ");
        let span = doc.create_element("span");
        let t2 = doc.create_text("\n μs  ");
        doc.append_child(span, t2);
        doc.append_child(td, t1);
        doc.append_child(td, span);
        assert_eq!(doc.inner_text(td), "1,234 μs");
    }

    #[test]
    fn test_cell_index_and_siblings() {
        let mut doc = Document::new();
        let tr = row_with_cells(&mut doc, &["a", "b", "c"]);
        let cells = doc.element_children(tr);
        assert_eq!(doc.cell_index(cells[2]), Some(2));
        assert_eq!(doc.previous_element_sibling(cells[1]), Some(cells[0]));
        assert_eq!(doc.previous_element_sibling(cells[0]), None);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let mut doc = Document::new();
        let table = doc.create_element("table");
        let thead = doc.create_element("thead");
        let tbody = doc.create_element("tbody");
        doc.append_child(doc.body(), table);
        doc.append_child(table, thead);
        doc.append_child(table, tbody);
        let r1 = row_with_cells(&mut doc, &["x"]);
        let r2 = row_with_cells(&mut doc, &["y"]);
        doc.append_child(thead, r1);
        doc.append_child(tbody, r2);
        assert_eq!(doc.elements_by_tag(table, "tr"), vec![r1, r2]);
        assert_eq!(doc.closest(r2, "table"), Some(table));
    }

    #[test]
    fn test_classes_are_not_duplicated() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.add_class(body, "dark-mode");
        doc.add_class(body, "dark-mode");
        assert_eq!(doc.element(body).map(|e| e.classes.len()), Some(1));
        doc.remove_class(body, "dark-mode");
        assert!(!doc.has_class(body, "dark-mode"));
    }
}
