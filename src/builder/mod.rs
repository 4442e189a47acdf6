//! Tree Builder - declarative construction through nested calls.
//!
//! Application code builds a node tree by calling constructors inside each
//! other; no tree value is threaded through:
//!
//! ```ignore
//! use onecup::{build_nodes, element, text, attr};
//!
//! let nodes = build_nodes(|| {
//!     element("ul", ".menu", || {
//!         for item in ["Inbox", "Sent"] {
//!             element("li", "", || {
//!                 attr("data-name", item);
//!                 text(item);
//!             });
//!         }
//!     });
//! })?;
//! ```
//!
//! # Architecture
//!
//! The stack lives in a [`BuilderContext`] installed in a thread-local slot
//! for exactly one [`build`] call. Primitives called outside a build, or
//! attribute setters called with no open element, are construction errors and
//! panic: they are caller bugs, not runtime conditions.

mod context;
mod element;
mod props;

pub use context::{build, build_nodes, is_building, BuilderContext, Built};
pub use element::{
    attr, class, current_selector_chain, element, element_with, key, leaf, leaf_with, raw, text,
};
pub use props::Props;

pub(crate) use context::with_context;
pub(crate) use element::set_handler;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::events::on_click;
    use crate::types::{AttrValue, Node};

    fn only_element(nodes: &[Node]) -> &crate::types::Element {
        assert_eq!(nodes.len(), 1);
        nodes[0].as_element().unwrap()
    }

    #[test]
    fn test_nested_elements() {
        let nodes = build_nodes(|| {
            element("div", "#app.shell", || {
                element("h1", "", || text("Title"));
                element("p", ".lead", || text("Body"));
            });
        })
        .unwrap();

        let app = only_element(&nodes);
        assert_eq!(app.tag, "div");
        assert_eq!(app.attrs.id().as_deref(), Some("app"));
        assert_eq!(app.attrs.get("class"), Some(&AttrValue::from(vec!["shell"])));
        assert_eq!(app.children.len(), 2);
        assert_eq!(app.children[0].as_element().unwrap().children[0].as_text(), Some("Title"));
    }

    #[test]
    fn test_text_coalesces() {
        let nodes = build_nodes(|| {
            text("a");
            text("b");
        })
        .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].as_text(), Some("ab"));
    }

    #[test]
    fn test_raw_breaks_text_run() {
        let nodes = build_nodes(|| {
            text("a");
            raw("<b>x</b>");
            text("b");
        })
        .unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(matches!(nodes[1], Node::Raw(_)));
    }

    #[test]
    fn test_setters_target_current_element() {
        let nodes = build_nodes(|| {
            element_with("a", ".nav", Props::new().attr("href", "/inbox"), || {
                attr("title", "Inbox");
                class("active");
                key("inbox");
                on_click(|_| Ok(()));
                element("span", "", || text("Inbox"));
            });
        })
        .unwrap();

        let a = only_element(&nodes);
        assert_eq!(a.attrs.get("href"), Some(&AttrValue::from("/inbox")));
        assert_eq!(a.attrs.get("title"), Some(&AttrValue::from("Inbox")));
        assert_eq!(a.attrs.get("class"), Some(&AttrValue::from(vec!["nav", "active"])));
        assert_eq!(a.key.as_deref(), Some("inbox"));
        assert!(a.handlers.contains_key("click"));
        // Child did not receive the parent's handler
        assert!(a.children[0].as_element().unwrap().handlers.is_empty());
    }

    #[test]
    fn test_fresh_tree_is_unbuilt() {
        let nodes = build_nodes(|| element("div", "", || text("x"))).unwrap();
        assert!(!nodes[0].is_built());
    }

    #[test]
    fn test_reentrant_build_rejected() {
        let (_, inner) = build(|| build_nodes(|| text("nested"))).unwrap();
        assert_eq!(inner.unwrap_err(), Error::Reentrant);
        assert!(!is_building());
    }

    #[test]
    fn test_selector_chain() {
        let (_, chain) = build(|| {
            let mut chain = Vec::new();
            element("ul", ".menu", || {
                element("li", "#first", || chain = current_selector_chain());
            });
            chain
        })
        .unwrap();
        assert_eq!(chain, vec!["ul.menu", "li#first"]);
    }

    #[test]
    #[should_panic(expected = "invalid shorthand selector")]
    fn test_malformed_selector_panics() {
        let _ = build_nodes(|| element("div", "card", || {}));
    }

    #[test]
    #[should_panic(expected = "outside of a build")]
    fn test_primitive_outside_build_panics() {
        text("orphan");
    }

    #[test]
    #[should_panic(expected = "no open element")]
    fn test_attr_at_root_panics() {
        let _ = build_nodes(|| attr("id", "x"));
    }

    #[test]
    fn test_slot_cleared_after_panic() {
        let result = std::panic::catch_unwind(|| {
            let _ = build_nodes(|| element("", "", || {}));
        });
        assert!(result.is_err());
        assert!(!is_building());
        assert!(build_nodes(|| text("ok")).is_ok());
    }
}
