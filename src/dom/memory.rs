//! In-memory document.
//!
//! An arena of nodes with focus, live form values and an injected stylesheet.
//! Every mutating [`Dom`] call is appended to a [`Mutation`] log so tests can
//! assert exactly what a reconcile pass did to the document.

use std::collections::BTreeMap;

use super::query::{ElementView, QuerySelector};
use super::{Dom, DomId};

/// One recorded mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateElement { node: DomId, tag: String },
    CreateText { node: DomId, text: String },
    ParseFragment { html: String, nodes: Vec<DomId> },
    SetAttribute { node: DomId, name: String, value: String },
    RemoveAttribute { node: DomId, name: String },
    SetValue { node: DomId, value: String },
    Insert { parent: DomId, node: DomId, before: Option<DomId> },
    Remove { node: DomId },
    InsertRule(String),
}

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attrs: BTreeMap<String, String>,
        /// Dirty value property; `None` falls back to the `value` attribute.
        value: Option<String>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct DomNode {
    data: NodeData,
    parent: Option<DomId>,
    children: Vec<DomId>,
}

/// Arena-backed document rooted at a `<body>` element.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<DomNode>,
    body: DomId,
    focused: Option<DomId>,
    stylesheet: Vec<String>,
    log: Vec<Mutation>,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

impl MemoryDom {
    pub fn new() -> Self {
        let body = DomNode {
            data: NodeData::Element {
                tag: "body".to_string(),
                attrs: BTreeMap::new(),
                value: None,
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![body],
            body: DomId(0),
            focused: None,
            stylesheet: Vec::new(),
            log: Vec::new(),
        }
    }

    /// The document body, always attached.
    pub fn body(&self) -> DomId {
        self.body
    }

    // =========================================================================
    // Mutation log
    // =========================================================================

    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    pub fn clear_mutations(&mut self) {
        self.log.clear();
    }

    // =========================================================================
    // User simulation (not logged)
    // =========================================================================

    pub fn focused(&self) -> Option<DomId> {
        self.focused
    }

    /// Change a control's live value the way typing would.
    pub fn type_value(&mut self, node: DomId, value: &str) {
        if let Some(NodeData::Element { value: live, .. }) = self.data_mut(node) {
            *live = Some(value.to_string());
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Whether `node` is connected to the body.
    pub fn is_attached(&self, node: DomId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == self.body {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    pub fn children(&self, node: DomId) -> &[DomId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Text content of a text node.
    pub fn text(&self, node: DomId) -> Option<&str> {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn stylesheet(&self) -> &[String] {
        &self.stylesheet
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Serialize the children of `node`.
    pub fn inner_html(&self, node: DomId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Serialize `node` itself.
    pub fn outer_html(&self, node: DomId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: DomId, out: &mut String) {
        let Some(entry) = self.nodes.get(node.0) else {
            return;
        };
        match &entry.data {
            NodeData::Text(text) => out.push_str(&escape_text(text)),
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element { tag, attrs, .. } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for &child in &entry.children {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    // =========================================================================
    // Arena helpers
    // =========================================================================

    fn alloc(&mut self, data: NodeData) -> DomId {
        let id = DomId(self.nodes.len());
        self.nodes.push(DomNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn data_mut(&mut self, node: DomId) -> Option<&mut NodeData> {
        self.nodes.get_mut(node.0).map(|n| &mut n.data)
    }

    fn attrs_mut(&mut self, node: DomId) -> Option<&mut BTreeMap<String, String>> {
        match self.data_mut(node) {
            Some(NodeData::Element { attrs, .. }) => Some(attrs),
            _ => None,
        }
    }

    fn detach(&mut self, node: DomId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|&child| child != node);
        self.nodes[node.0].parent = None;
    }

    fn is_inclusive_ancestor(&self, ancestor: DomId, node: DomId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    fn view(&self, node: DomId) -> Option<ElementView<'_>> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element { tag, attrs, .. } => Some(ElementView {
                tag: tag.as_str(),
                id: attrs.get("id").map(String::as_str),
                class: attrs.get("class").map(String::as_str),
            }),
            _ => None,
        }
    }

    fn import(&mut self, node: &html_parser::Node) -> DomId {
        match node {
            html_parser::Node::Text(text) => self.alloc(NodeData::Text(text.clone())),
            html_parser::Node::Comment(text) => self.alloc(NodeData::Comment(text.clone())),
            html_parser::Node::Element(el) => {
                let mut attrs: BTreeMap<String, String> = el
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone().unwrap_or_default()))
                    .collect();
                if let Some(id) = &el.id {
                    attrs.insert("id".to_string(), id.clone());
                }
                if !el.classes.is_empty() {
                    attrs.insert("class".to_string(), el.classes.join(" "));
                }
                let id = self.alloc(NodeData::Element {
                    tag: el.name.to_ascii_lowercase(),
                    attrs,
                    value: None,
                });
                for child in &el.children {
                    let child = self.import(child);
                    self.nodes[child.0].parent = Some(id);
                    self.nodes[id.0].children.push(child);
                }
                id
            }
        }
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom for MemoryDom {
    fn create_element(&mut self, tag: &str) -> DomId {
        let tag = tag.to_ascii_lowercase();
        let node = self.alloc(NodeData::Element {
            tag: tag.clone(),
            attrs: BTreeMap::new(),
            value: None,
        });
        self.log.push(Mutation::CreateElement { node, tag });
        node
    }

    fn create_text(&mut self, text: &str) -> DomId {
        let node = self.alloc(NodeData::Text(text.to_string()));
        self.log.push(Mutation::CreateText {
            node,
            text: text.to_string(),
        });
        node
    }

    fn parse_fragment(&mut self, html: &str) -> Vec<DomId> {
        let mut nodes = match html_parser::Dom::parse(html) {
            Ok(parsed) => parsed.children.iter().map(|n| self.import(n)).collect(),
            Err(err) => {
                tracing::warn!(%err, "fragment did not parse, inserting as text");
                vec![self.alloc(NodeData::Text(html.to_string()))]
            }
        };
        if nodes.is_empty() {
            nodes.push(self.alloc(NodeData::Text(String::new())));
        }
        self.log.push(Mutation::ParseFragment {
            html: html.to_string(),
            nodes: nodes.clone(),
        });
        nodes
    }

    fn set_attribute(&mut self, node: DomId, name: &str, value: &str) {
        if let Some(attrs) = self.attrs_mut(node) {
            attrs.insert(name.to_string(), value.to_string());
            self.log.push(Mutation::SetAttribute {
                node,
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    }

    fn remove_attribute(&mut self, node: DomId, name: &str) {
        if let Some(attrs) = self.attrs_mut(node) {
            attrs.remove(name);
            self.log.push(Mutation::RemoveAttribute {
                node,
                name: name.to_string(),
            });
        }
    }

    fn attribute(&self, node: DomId, name: &str) -> Option<String> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element { attrs, .. } => attrs.get(name).cloned(),
            _ => None,
        }
    }

    fn set_value(&mut self, node: DomId, value: &str) {
        if let Some(NodeData::Element { value: live, .. }) = self.data_mut(node) {
            *live = Some(value.to_string());
            self.log.push(Mutation::SetValue {
                node,
                value: value.to_string(),
            });
        }
    }

    fn value(&self, node: DomId) -> Option<String> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element { attrs, value, .. } => {
                value.clone().or_else(|| attrs.get("value").cloned())
            }
            _ => None,
        }
    }

    fn is_focused(&self, node: DomId) -> bool {
        self.focused == Some(node)
    }

    fn focus(&mut self, node: DomId) {
        if self.is_attached(node) {
            self.focused = Some(node);
        }
    }

    fn blur(&mut self) {
        self.focused = None;
    }

    fn tag_name(&self, node: DomId) -> Option<String> {
        self.view(node).map(|v| v.tag.to_string())
    }

    fn insert_before(&mut self, parent: DomId, node: DomId, reference: Option<DomId>) {
        if parent.0 >= self.nodes.len() || node.0 >= self.nodes.len() || parent == node {
            return;
        }
        self.detach(node);
        let children = &mut self.nodes[parent.0].children;
        let at = reference
            .and_then(|r| children.iter().position(|&c| c == r))
            .unwrap_or(children.len());
        children.insert(at, node);
        self.nodes[node.0].parent = Some(parent);
        self.log.push(Mutation::Insert {
            parent,
            node,
            before: reference,
        });
    }

    fn remove(&mut self, node: DomId) {
        if node.0 >= self.nodes.len() || node == self.body {
            return;
        }
        if let Some(focused) = self.focused {
            if self.is_inclusive_ancestor(node, focused) {
                self.focused = None;
            }
        }
        self.detach(node);
        self.log.push(Mutation::Remove { node });
    }

    fn parent(&self, node: DomId) -> Option<DomId> {
        self.nodes.get(node.0)?.parent
    }

    fn next_sibling(&self, node: DomId) -> Option<DomId> {
        let parent = self.parent(node)?;
        let siblings = &self.nodes[parent.0].children;
        let at = siblings.iter().position(|&c| c == node)?;
        siblings.get(at + 1).copied()
    }

    fn query(&self, selector: &str) -> Option<DomId> {
        let query = QuerySelector::parse(selector)?;
        let mut stack = vec![self.body];
        while let Some(node) = stack.pop() {
            if let Some(view) = self.view(node) {
                let ancestors = std::iter::successors(self.parent(node), |&p| self.parent(p))
                    .filter_map(|p| self.view(p));
                if query.matches(view, ancestors) {
                    return Some(node);
                }
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        None
    }

    fn insert_style_rule(&mut self, rule: &str) {
        self.stylesheet.push(rule.to_string());
        self.log.push(Mutation::InsertRule(rule.to_string()));
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
