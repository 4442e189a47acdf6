//! Reconciler - patch the live document to match a freshly built tree.
//!
//! Nodes are matched pairwise by position. Tag and `id` are the identity key
//! of an element: a matching pair adopts the old live element and only its
//! attributes, handlers and children are patched. Anything else is replaced by
//! building the new node in front of the old one and removing the old one.
//!
//! A children list where every old and new child is an element with a unique
//! key switches to keyed alignment (see [`keyed`]).
//!
//! Inconsistent input (an old node that was never built, or one that lost its
//! parent) is an invariant violation and fails the whole pass.

mod attrs;
mod keyed;

pub use attrs::{is_form_control, FORM_CONTROLS};

use crate::dom::{Dom, DomId};
use crate::error::{Error, Result};
use crate::events::HandlerRegistry;
use crate::types::{Element, Node};

/// Counters for one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Nodes materialized from scratch, subtrees included.
    pub built: usize,
    /// Old nodes whose live handles were adopted.
    pub reused: usize,
    /// Non-matching pairs rebuilt in place.
    pub replaced: usize,
    /// Surplus old nodes removed.
    pub removed: usize,
    /// Keyed children moved to a new position.
    pub moved: usize,
    pub attrs_set: usize,
    pub attrs_removed: usize,
    /// Form control values forced back to the rendered value.
    pub values_forced: usize,
    /// Form control values left alone because the control had focus.
    pub values_skipped: usize,
}

impl PatchStats {
    /// Whether the pass changed nothing in the document.
    pub fn is_clean(&self) -> bool {
        self.built == 0
            && self.replaced == 0
            && self.removed == 0
            && self.moved == 0
            && self.attrs_set == 0
            && self.attrs_removed == 0
            && self.values_forced == 0
    }
}

/// One reconcile pass over a document and its handler bindings.
pub struct Reconciler<'a, D: Dom + ?Sized> {
    dom: &'a mut D,
    handlers: &'a mut HandlerRegistry,
    stats: PatchStats,
}

impl<'a, D: Dom + ?Sized> Reconciler<'a, D> {
    pub fn new(dom: &'a mut D, handlers: &'a mut HandlerRegistry) -> Self {
        Self {
            dom,
            handlers,
            stats: PatchStats::default(),
        }
    }

    pub fn stats(&self) -> PatchStats {
        self.stats
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Align the children of live `parent` from `old` to `new`.
    ///
    /// Every node of `old` must be built. On success every node of `new` is.
    pub fn reconcile_children(
        &mut self,
        parent: DomId,
        old: Vec<Node>,
        new: &mut [Node],
    ) -> Result<()> {
        if keyed::applies(&old, new) {
            return self.reconcile_keyed(parent, old, new);
        }

        let mut old = old.into_iter();
        for slot in new.iter_mut() {
            match old.next() {
                Some(prev) => self.reconcile_node(prev, slot)?,
                None => {
                    for id in self.build(slot) {
                        self.dom.append_child(parent, id);
                    }
                }
            }
        }
        for prev in old {
            self.remove(prev)?;
        }
        Ok(())
    }

    // =========================================================================
    // Pairs
    // =========================================================================

    /// Match one old/new pair at the same position.
    pub fn reconcile_node(&mut self, old: Node, new: &mut Node) -> Result<()> {
        if !old.is_built() {
            return Err(unbuilt(&old));
        }

        match (old, &mut *new) {
            (Node::Text(old), Node::Text(new)) if old.text == new.text => {
                new.dom = old.dom;
                self.stats.reused += 1;
                Ok(())
            }
            (Node::Raw(old), Node::Raw(new)) if old.html == new.html => {
                new.doms = old.doms;
                self.stats.reused += 1;
                Ok(())
            }
            (Node::Element(old), Node::Element(new))
                if old.tag == new.tag && old.attrs.id() == new.attrs.id() =>
            {
                self.patch_element(old, new)
            }
            (old, new) => self.replace(old, new),
        }
    }

    fn patch_element(&mut self, old: Element, new: &mut Element) -> Result<()> {
        let Some(node) = old.dom else {
            return Err(Error::Unbuilt { what: old.tag });
        };
        new.dom = Some(node);
        self.stats.reused += 1;

        attrs::patch(
            &mut *self.dom,
            node,
            &new.tag,
            &old.attrs,
            &new.attrs,
            &mut self.stats,
        );
        self.handlers.bind(node, new.handlers.clone());
        self.reconcile_children(node, old.children, &mut new.children)
    }

    /// Build `new` in front of `old`, then drop `old`.
    fn replace(&mut self, old: Node, new: &mut Node) -> Result<()> {
        let anchor = old.first_dom().ok_or_else(|| unbuilt(&old))?;
        let parent = self.dom.parent(anchor).ok_or(Error::Detached(anchor))?;

        for id in self.build(new) {
            self.dom.insert_before(parent, id, Some(anchor));
        }
        self.discard(old);
        self.stats.replaced += 1;
        Ok(())
    }

    // =========================================================================
    // Build / remove
    // =========================================================================

    /// Materialize `node` and its subtree, detached. Returns its top-level
    /// handles in document order.
    pub fn build(&mut self, node: &mut Node) -> Vec<DomId> {
        self.stats.built += 1;
        match node {
            Node::Text(text) => {
                let id = self.dom.create_text(&text.text);
                text.dom = Some(id);
                vec![id]
            }
            Node::Raw(raw) => {
                raw.doms = self.dom.parse_fragment(&raw.html);
                raw.doms.clone()
            }
            Node::Element(el) => {
                let id = self.dom.create_element(&el.tag);
                for (name, value) in el.attrs.serialized() {
                    self.dom.set_attribute(id, &name, &value);
                }
                self.handlers.bind(id, el.handlers.clone());
                for child in &mut el.children {
                    for child_id in self.build(child) {
                        self.dom.append_child(id, child_id);
                    }
                }
                el.dom = Some(id);
                vec![id]
            }
        }
    }

    /// Detach a surplus old node and dispose its handlers.
    pub fn remove(&mut self, old: Node) -> Result<()> {
        if !old.is_built() {
            return Err(unbuilt(&old));
        }
        self.discard(old);
        self.stats.removed += 1;
        Ok(())
    }

    fn discard(&mut self, old: Node) {
        for id in old.dom_ids() {
            self.dom.remove(id);
        }
        self.dispose(&old);
    }

    fn dispose(&mut self, node: &Node) {
        if let Node::Element(el) = node {
            if let Some(id) = el.dom {
                self.handlers.dispose(id);
            }
            for child in &el.children {
                self.dispose(child);
            }
        }
    }
}

fn unbuilt(node: &Node) -> Error {
    Error::Unbuilt {
        what: node.label().to_string(),
    }
}

/// Reconcile a whole tree under `container` in one pass.
pub fn reconcile<D: Dom + ?Sized>(
    dom: &mut D,
    handlers: &mut HandlerRegistry,
    container: DomId,
    old: Vec<Node>,
    new: &mut [Node],
) -> Result<PatchStats> {
    let mut reconciler = Reconciler::new(dom, handlers);
    reconciler.reconcile_children(container, old, new)?;
    Ok(reconciler.stats())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{attr, build_nodes, element, leaf, raw, text};
    use crate::dom::{MemoryDom, Mutation};
    use crate::events::on_click;

    struct Fixture {
        dom: MemoryDom,
        handlers: HandlerRegistry,
        tree: Vec<Node>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dom: MemoryDom::new(),
                handlers: HandlerRegistry::new(),
                tree: Vec::new(),
            }
        }

        fn render(&mut self, f: impl FnOnce()) -> PatchStats {
            let mut next = build_nodes(f).unwrap();
            let old = std::mem::take(&mut self.tree);
            let body = self.dom.body();
            self.dom.clear_mutations();
            let stats = reconcile(&mut self.dom, &mut self.handlers, body, old, &mut next).unwrap();
            self.tree = next;
            stats
        }

        fn html(&self) -> String {
            self.dom.inner_html(self.dom.body())
        }
    }

    #[test]
    fn test_initial_build() {
        let mut fx = Fixture::new();
        let stats = fx.render(|| {
            element("p", ".lead", || text("hello"));
        });
        assert_eq!(fx.html(), r#"<p class="lead">hello</p>"#);
        assert_eq!(stats.built, 2);
        assert!(fx.tree.iter().all(Node::is_built));
    }

    #[test]
    fn test_identical_tree_is_silent() {
        let mut fx = Fixture::new();
        let view = || {
            element("div", "#x", || {
                attr("title", "t");
                text("a");
                raw("<b>bold</b>");
            });
        };
        fx.render(view);
        let stats = fx.render(view);
        assert!(fx.dom.mutations().is_empty());
        assert!(stats.is_clean());
        assert_eq!(stats.reused, 3);
    }

    #[test]
    fn test_identity_kept_across_attribute_change() {
        let mut fx = Fixture::new();
        fx.render(|| element("div", "#x", || attr("title", "a")));
        let before = fx.tree[0].first_dom();
        fx.render(|| element("div", "#x", || attr("title", "b")));
        assert_eq!(fx.tree[0].first_dom(), before);
        assert_eq!(
            fx.dom.mutations(),
            &[Mutation::SetAttribute {
                node: before.unwrap(),
                name: "title".to_string(),
                value: "b".to_string()
            }]
        );
    }

    #[test]
    fn test_tag_change_replaces_in_place() {
        let mut fx = Fixture::new();
        fx.render(|| {
            leaf("hr", "");
            element("span", "", || text("old"));
            leaf("br", "");
        });
        let old = fx.tree[1].first_dom().unwrap();
        let stats = fx.render(|| {
            leaf("hr", "");
            element("em", "", || text("new"));
            leaf("br", "");
        });
        assert_eq!(stats.replaced, 1);
        assert!(!fx.dom.is_attached(old));
        assert_eq!(fx.html(), "<hr><em>new</em><br>");
    }

    #[test]
    fn test_id_change_replaces() {
        let mut fx = Fixture::new();
        fx.render(|| element("div", "#a", || {}));
        let old = fx.tree[0].first_dom();
        let stats = fx.render(|| element("div", "#b", || {}));
        assert_eq!(stats.replaced, 1);
        assert_ne!(fx.tree[0].first_dom(), old);
    }

    #[test]
    fn test_text_change_replaces_text_node() {
        let mut fx = Fixture::new();
        fx.render(|| element("p", "", || text("one")));
        let stats = fx.render(|| element("p", "", || text("two")));
        assert_eq!(stats.replaced, 1);
        assert_eq!(fx.html(), "<p>two</p>");
    }

    #[test]
    fn test_variant_change_replaces() {
        let mut fx = Fixture::new();
        fx.render(|| text("<i>x</i>"));
        fx.render(|| raw("<i>x</i>"));
        assert_eq!(fx.html(), "<i>x</i>");
        fx.render(|| text("plain"));
        assert_eq!(fx.html(), "plain");
    }

    #[test]
    fn test_multi_node_raw_replaced_as_a_whole() {
        let mut fx = Fixture::new();
        fx.render(|| {
            element("p", "", || {
                raw("<b>one</b><i>two</i>tail");
                text("!");
            })
        });
        let old: Vec<DomId> = fx.tree[0].as_element().unwrap().children[0].dom_ids();
        assert_eq!(old.len(), 3);

        let stats = fx.render(|| {
            element("p", "", || {
                element("em", "", || text("new"));
                text("!");
            })
        });
        assert_eq!(stats.replaced, 1);
        assert!(old.iter().all(|&id| !fx.dom.is_attached(id)));
        assert_eq!(fx.html(), "<p><em>new</em>!</p>");
    }

    #[test]
    fn test_empty_raw_replaced_through_placeholder() {
        let mut fx = Fixture::new();
        fx.render(|| {
            element("p", "", || {
                text("a");
                raw("");
                leaf("br", "");
            })
        });
        let placeholder = fx.tree[0].as_element().unwrap().children[1].dom_ids();
        assert_eq!(placeholder.len(), 1);

        let stats = fx.render(|| {
            element("p", "", || {
                text("a");
                raw("<b>x</b>");
                leaf("br", "");
            })
        });
        assert_eq!(stats.replaced, 1);
        assert!(!fx.dom.is_attached(placeholder[0]));
        assert_eq!(fx.html(), "<p>a<b>x</b><br></p>");
    }

    #[test]
    fn test_grow_and_shrink() {
        let mut fx = Fixture::new();
        let list = |n: usize| {
            move || {
                element("ul", "", || {
                    for i in 0..n {
                        element("li", "", || text(i.to_string()));
                    }
                })
            }
        };
        fx.render(list(1));
        let first = fx.tree[0].as_element().unwrap().children[0].first_dom();

        let stats = fx.render(list(3));
        assert_eq!(stats.built, 4);
        assert_eq!(fx.html(), "<ul><li>0</li><li>1</li><li>2</li></ul>");
        let shrunk: Vec<DomId> = fx.tree[0].as_element().unwrap().children[1..]
            .iter()
            .filter_map(Node::first_dom)
            .collect();

        let stats = fx.render(list(1));
        assert_eq!(stats.removed, 2);
        assert_eq!(fx.tree[0].as_element().unwrap().children[0].first_dom(), first);
        assert!(shrunk.iter().all(|&id| !fx.dom.is_attached(id)));
    }

    #[test]
    fn test_handlers_rebound_and_disposed() {
        let mut fx = Fixture::new();
        fx.render(|| {
            element("button", "", || {
                on_click(|_| Ok(()));
                text("go");
            })
        });
        let button = fx.tree[0].first_dom().unwrap();
        assert!(fx.handlers.has(button, "click"));

        fx.render(|| element("button", "", || text("go")));
        assert!(!fx.handlers.has(button, "click"));

        fx.render(|| {
            element("button", "", || on_click(|_| Ok(())));
        });
        fx.render(|| {});
        assert!(fx.handlers.is_empty());
    }

    #[test]
    fn test_unbuilt_old_node_fails() {
        let mut dom = MemoryDom::new();
        let mut handlers = HandlerRegistry::new();
        let body = dom.body();
        let old = vec![Node::text("never built")];
        let mut new = vec![Node::text("x")];
        let err = reconcile(&mut dom, &mut handlers, body, old, &mut new).unwrap_err();
        assert_eq!(
            err,
            Error::Unbuilt {
                what: "#text".to_string()
            }
        );
    }

    #[test]
    fn test_detached_old_node_fails() {
        let mut fx = Fixture::new();
        fx.render(|| element("div", "", || {}));
        let id = fx.tree[0].first_dom().unwrap();
        fx.dom.remove(id);

        let old = std::mem::take(&mut fx.tree);
        let mut new = build_nodes(|| element("span", "", || {})).unwrap();
        let body = fx.dom.body();
        let err = reconcile(&mut fx.dom, &mut fx.handlers, body, old, &mut new).unwrap_err();
        assert_eq!(err, Error::Detached(id));
    }
}
