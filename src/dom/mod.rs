//! Host DOM abstraction.
//!
//! The reconciler never touches a concrete document. It talks to a [`Dom`]
//! implementation through copyable [`DomId`] handles, which keeps the diff
//! engine host agnostic:
//!
//! ```text
//! Node tree (types) → Reconciler → dyn Dom → live document
//! ```
//!
//! [`MemoryDom`] is the in-process document shipped with the crate. It backs
//! the test suite and any headless embedding. A browser binding implements the
//! same trait over its own element handles.

mod memory;
mod query;

pub use memory::{MemoryDom, Mutation};
pub use query::QuerySelector;

/// Handle to a live node owned by a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomId(pub usize);

/// Operations the reconciler and event dispatch need from a live document.
///
/// Mutating calls take `&mut self`. Calls on ids the document does not know
/// are ignored by mutators and return `None`/`false` from readers.
pub trait Dom {
    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> DomId;

    /// Create a detached text node.
    fn create_text(&mut self, text: &str) -> DomId;

    /// Parse an HTML fragment into detached top-level nodes.
    ///
    /// Never returns an empty list: an empty fragment yields one empty text
    /// node so the caller always has an anchor for later insertions.
    fn parse_fragment(&mut self, html: &str) -> Vec<DomId>;

    fn set_attribute(&mut self, node: DomId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: DomId, name: &str);
    fn attribute(&self, node: DomId, name: &str) -> Option<String>;

    /// Set the live `value` property of a form control.
    fn set_value(&mut self, node: DomId, value: &str);

    /// Current live `value` property of a form control.
    fn value(&self, node: DomId) -> Option<String>;

    fn is_focused(&self, node: DomId) -> bool;

    /// Give `node` focus. Detached nodes cannot be focused.
    fn focus(&mut self, node: DomId);

    /// Clear focus.
    fn blur(&mut self);

    /// Lowercase tag name, `None` for text and comment nodes.
    fn tag_name(&self, node: DomId) -> Option<String>;

    /// Insert `node` under `parent` before `reference`, or last when
    /// `reference` is `None`. A node that is already attached is moved.
    fn insert_before(&mut self, parent: DomId, node: DomId, reference: Option<DomId>);

    fn append_child(&mut self, parent: DomId, node: DomId) {
        self.insert_before(parent, node, None);
    }

    /// Detach `node` from its parent.
    fn remove(&mut self, node: DomId);

    fn parent(&self, node: DomId) -> Option<DomId>;
    fn next_sibling(&self, node: DomId) -> Option<DomId>;

    /// First attached element in document order matching `selector`.
    fn query(&self, selector: &str) -> Option<DomId>;

    /// Append a rule to the document's injected stylesheet.
    fn insert_style_rule(&mut self, rule: &str);
}
