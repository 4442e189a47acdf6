//! Core types for onecup.
//!
//! The node tree built fresh on every render pass. Nodes are pure data until
//! the reconciler attaches live [`DomId`] handles to them; a node is "built"
//! exactly when those handles are present.

use std::collections::BTreeMap;
use std::fmt;

use crate::dom::DomId;
use crate::events::Handler;

// =============================================================================
// Attribute values
// =============================================================================

/// Value of a single element attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Number(f64),
    /// `true` renders as a present, empty attribute; `false` as absent.
    Bool(bool),
    /// Joined with single spaces. An empty list is absent.
    Classes(Vec<String>),
}

impl AttrValue {
    /// DOM string form, `None` when the attribute should not exist.
    pub fn serialize(&self) -> Option<String> {
        match self {
            AttrValue::Str(s) => Some(s.clone()),
            AttrValue::Number(n) => Some(n.to_string()),
            AttrValue::Bool(true) => Some(String::new()),
            AttrValue::Bool(false) => None,
            AttrValue::Classes(classes) if classes.is_empty() => None,
            AttrValue::Classes(classes) => Some(classes.join(" ")),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Str(value.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        AttrValue::Classes(value)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(value: Vec<&str>) -> Self {
        AttrValue::Classes(value.into_iter().map(str::to_string).collect())
    }
}

macro_rules! number_attr {
    ($($t:ty),*) => {
        $(
            impl From<$t> for AttrValue {
                fn from(value: $t) -> Self {
                    AttrValue::Number(value as f64)
                }
            }
        )*
    };
}

number_attr!(i32, i64, u16, u32, u64, usize, f32, f64);

// =============================================================================
// Attribute map
// =============================================================================

/// Attributes of one element plus its inline style mapping.
///
/// The style mapping serializes into the `style` attribute and overrides a
/// plain `style` value. It disappears from the serialized set once empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    values: BTreeMap<String, AttrValue>,
    style: BTreeMap<String, String>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.values.remove(name)
    }

    /// Append a class, keeping any classes already present.
    pub fn add_class(&mut self, class: &str) {
        let entry = self
            .values
            .entry("class".to_string())
            .or_insert_with(|| AttrValue::Classes(Vec::new()));
        match entry {
            AttrValue::Classes(list) => {
                if !list.iter().any(|c| c == class) {
                    list.push(class.to_string());
                }
            }
            other => {
                let mut list: Vec<String> = other
                    .serialize()
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();
                if !list.iter().any(|c| c == class) {
                    list.push(class.to_string());
                }
                *other = AttrValue::Classes(list);
            }
        }
    }

    /// Serialized `id`, the element's identity key next to its tag.
    pub fn id(&self) -> Option<String> {
        self.values.get("id").and_then(AttrValue::serialize)
    }

    pub fn style(&self) -> &BTreeMap<String, String> {
        &self.style
    }

    pub fn set_style(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.style.insert(property.into(), value.into());
    }

    pub fn remove_style(&mut self, property: &str) {
        self.style.remove(property);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.style.is_empty()
    }

    /// Effective DOM attributes: every present value in string form.
    pub fn serialized(&self) -> BTreeMap<String, String> {
        let mut out: BTreeMap<String, String> = self
            .values
            .iter()
            .filter_map(|(name, value)| value.serialize().map(|v| (name.clone(), v)))
            .collect();
        if !self.style.is_empty() {
            out.insert("style".to_string(), serialize_style(&self.style));
        }
        out
    }
}

/// `prop: value; prop2: value2`
pub fn serialize_style(style: &BTreeMap<String, String>) -> String {
    style
        .iter()
        .map(|(prop, value)| format!("{prop}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Nodes
// =============================================================================

/// One node of a render tree.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(Text),
    Raw(Raw),
}

/// An element with attributes, handlers and ordered children.
#[derive(Clone, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: Attrs,
    pub children: Vec<Node>,
    /// Event name to handler. Bound to `dom` by the reconciler.
    pub handlers: BTreeMap<String, Handler>,
    /// Optional alignment key for keyed child diffing. Never rendered.
    pub key: Option<String>,
    pub dom: Option<DomId>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("attrs", &self.attrs)
            .field("children", &self.children)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("key", &self.key)
            .field("dom", &self.dom)
            .finish()
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }
}

/// Plain text content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Text {
    pub text: String,
    pub dom: Option<DomId>,
}

/// Pre-escaped HTML inserted verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Raw {
    pub html: String,
    /// Top-level nodes of the parsed fragment. Never empty once built.
    pub doms: Vec<DomId>,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text {
            text: text.into(),
            dom: None,
        })
    }

    pub fn raw(html: impl Into<String>) -> Self {
        Node::Raw(Raw {
            html: html.into(),
            doms: Vec::new(),
        })
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(&t.text),
            _ => None,
        }
    }

    /// Whether live handles are attached.
    pub fn is_built(&self) -> bool {
        match self {
            Node::Element(el) => el.dom.is_some(),
            Node::Text(t) => t.dom.is_some(),
            Node::Raw(r) => !r.doms.is_empty(),
        }
    }

    /// Live handles in document order.
    pub fn dom_ids(&self) -> Vec<DomId> {
        match self {
            Node::Element(el) => el.dom.into_iter().collect(),
            Node::Text(t) => t.dom.into_iter().collect(),
            Node::Raw(r) => r.doms.clone(),
        }
    }

    pub fn first_dom(&self) -> Option<DomId> {
        match self {
            Node::Element(el) => el.dom,
            Node::Text(t) => t.dom,
            Node::Raw(r) => r.doms.first().copied(),
        }
    }

    /// Short label for diagnostics: the tag, `#text` or `#raw`.
    pub fn label(&self) -> &str {
        match self {
            Node::Element(el) => &el.tag,
            Node::Text(_) => "#text",
            Node::Raw(_) => "#raw",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(AttrValue::from("a"), Some("a") ; "string")]
    #[test_case(AttrValue::from(3_i32), Some("3") ; "integer")]
    #[test_case(AttrValue::from(1.5_f64), Some("1.5") ; "float")]
    #[test_case(AttrValue::from(2.0_f64), Some("2") ; "whole float")]
    #[test_case(AttrValue::from(true), Some("") ; "true flag")]
    #[test_case(AttrValue::from(false), None ; "false flag")]
    #[test_case(AttrValue::from(vec!["a", "b"]), Some("a b") ; "classes")]
    #[test_case(AttrValue::Classes(Vec::new()), None ; "no classes")]
    fn test_serialize(value: AttrValue, expected: Option<&str>) {
        assert_eq!(value.serialize().as_deref(), expected);
    }

    #[test]
    fn test_style_serialization_and_removal() {
        let mut attrs = Attrs::new();
        attrs.set("style", "color: blue");
        attrs.set_style("width", "10px");
        attrs.set_style("color", "red");
        assert_eq!(
            attrs.serialized().get("style").map(String::as_str),
            Some("color: red; width: 10px")
        );

        attrs.remove_style("width");
        attrs.remove_style("color");
        assert!(attrs.style().is_empty());
        // Plain value shows through once the mapping is empty
        assert_eq!(
            attrs.serialized().get("style").map(String::as_str),
            Some("color: blue")
        );
    }

    #[test]
    fn test_add_class() {
        let mut attrs = Attrs::new();
        attrs.set("class", "a");
        attrs.add_class("b");
        attrs.add_class("a");
        assert_eq!(attrs.get("class"), Some(&AttrValue::from(vec!["a", "b"])));
    }

    #[test]
    fn test_built_state() {
        let mut node = Node::text("hi");
        assert!(!node.is_built());
        if let Node::Text(t) = &mut node {
            t.dom = Some(DomId(4));
        }
        assert!(node.is_built());
        assert_eq!(node.dom_ids(), vec![DomId(4)]);
        assert_eq!(Node::raw("<b>").label(), "#raw");
    }
}
