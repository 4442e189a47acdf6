//! Element constructors and leaf primitives.
//!
//! Every constructor follows the same four steps:
//! 1. Parse the shorthand selector into `id`/`class` attributes
//! 2. Merge any up-front [`Props`]
//! 3. Push the element as current, run the children closure
//! 4. Pop it and append the finished node to the enclosing level

use super::context::{fail, with_context};
use super::props::Props;
use crate::error::BuildError;
use crate::events::Handler;
use crate::selector::Shorthand;
use crate::types::{AttrValue, Element, Node};

/// Build a `tag` element. `selector` is a shorthand like `"#main.card"` (or
/// empty) and `children` populates it through nested builder calls.
///
/// # Panics
///
/// On an empty tag, a malformed selector, or when called outside a build.
pub fn element(tag: &str, selector: &str, children: impl FnOnce()) {
    element_with(tag, selector, Props::default(), children);
}

/// [`element`] with attributes and handlers supplied up front.
pub fn element_with(tag: &str, selector: &str, props: Props, children: impl FnOnce()) {
    let (element, selector_css) = prepare(tag, selector, props);
    with_context("element", |ctx| ctx.open(element, selector_css));
    children();
    with_context("element", |ctx| ctx.close());
}

/// An element with no children (`input`, `br`, `img`, ...).
pub fn leaf(tag: &str, selector: &str) {
    element(tag, selector, || {});
}

/// [`leaf`] with up-front props.
pub fn leaf_with(tag: &str, selector: &str, props: Props) {
    element_with(tag, selector, props, || {});
}

fn prepare(tag: &str, selector: &str, props: Props) -> (Element, String) {
    if tag.trim().is_empty() {
        fail(BuildError::EmptyTag);
    }
    let shorthand = Shorthand::parse(selector).unwrap_or_else(|err| fail(err));

    let mut element = Element::new(tag);
    element.attrs = props.attrs;
    element.handlers = props.handlers;
    if let Some(id) = &shorthand.id {
        element.attrs.set("id", id.as_str());
    }
    for class in &shorthand.classes {
        element.attrs.add_class(class);
    }
    let selector_css = format!("{tag}{}", shorthand.to_css());
    (element, selector_css)
}

/// Append text. Adjacent text calls coalesce into one node.
pub fn text(content: impl AsRef<str>) {
    with_context("text", |ctx| ctx.push_text(content.as_ref()));
}

/// Append a pre-escaped HTML fragment.
pub fn raw(html: impl Into<String>) {
    let node = Node::raw(html);
    with_context("raw", |ctx| ctx.push_node(node));
}

/// Set an attribute on the current element.
pub fn attr(name: &str, value: impl Into<AttrValue>) {
    let value = value.into();
    with_context("attr", |ctx| ctx.current("attr").attrs.set(name, value));
}

/// Add a class to the current element.
pub fn class(name: &str) {
    with_context("class", |ctx| ctx.current("class").attrs.add_class(name));
}

/// Give the current element a key for keyed child alignment.
pub fn key(key: impl Into<String>) {
    let key = key.into();
    with_context("key", |ctx| ctx.current("key").key = Some(key));
}

pub(crate) fn set_handler(op: &'static str, event: &str, handler: Handler) {
    with_context(op, |ctx| {
        ctx.current(op).handlers.insert(event.to_string(), handler);
    });
}

/// Selectors of the currently open elements, outermost first.
pub fn current_selector_chain() -> Vec<String> {
    with_context("current_selector_chain", |ctx| ctx.selector_chain())
}
