//! Builder context - the stack behind the declarative API.
//!
//! A [`BuilderContext`] lives in a thread-local slot for the duration of one
//! [`build`](super::build) call. It tracks:
//! - the open elements, outermost first
//! - one sibling accumulator per nesting level (root level included)
//! - property bags of active scoped style rules
//! - the rules queued during this build
//!
//! Invariant: `levels.len() == open.len() + 1` at all times, and both stacks
//! are back to their initial depth when the build finishes.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::{BuildError, Error};
use crate::style::StyleRule;
use crate::types::{Element, Node};

/// An element being populated plus its selector for rule composition.
struct OpenFrame {
    element: Element,
    selector: String,
}

/// Explicit builder state for one render pass.
pub struct BuilderContext {
    open: Vec<OpenFrame>,
    levels: Vec<Vec<Node>>,
    /// Active rule bags, each with the element depth its rule was opened at.
    rule_bags: Vec<(usize, BTreeMap<String, String>)>,
    rules: Vec<StyleRule>,
}

/// Output of a finished build.
#[derive(Debug, Default)]
pub struct Built {
    /// Top-level nodes in document order.
    pub nodes: Vec<Node>,
    /// Scoped style rules queued during the build, deduplicated.
    pub rules: Vec<StyleRule>,
}

impl BuilderContext {
    pub(crate) fn new() -> Self {
        Self {
            open: Vec::new(),
            levels: vec![Vec::new()],
            rule_bags: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Number of open elements.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub(crate) fn open(&mut self, element: Element, selector: String) {
        self.open.push(OpenFrame { element, selector });
        self.levels.push(Vec::new());
    }

    /// Close the innermost element and append it to the enclosing level.
    pub(crate) fn close(&mut self) {
        let (Some(frame), Some(children)) = (self.open.pop(), self.levels.pop()) else {
            return;
        };
        let mut element = frame.element;
        element.children = children;
        self.push_node(Node::Element(element));
    }

    pub(crate) fn push_node(&mut self, node: Node) {
        if let Some(level) = self.levels.last_mut() {
            level.push(node);
        }
    }

    /// Append text, merging into a directly preceding text sibling.
    pub(crate) fn push_text(&mut self, text: &str) {
        let Some(level) = self.levels.last_mut() else {
            return;
        };
        if let Some(Node::Text(last)) = level.last_mut() {
            last.text.push_str(text);
        } else {
            level.push(Node::text(text));
        }
    }

    pub(crate) fn current(&mut self, op: &'static str) -> &mut Element {
        match self.open.last_mut() {
            Some(frame) => &mut frame.element,
            None => fail(BuildError::NoElement(op)),
        }
    }

    /// Innermost rule bag, if its rule was opened at the current depth.
    ///
    /// Elements opened inside a rule closure keep their own style writes.
    fn active_bag(&mut self) -> Option<&mut BTreeMap<String, String>> {
        let depth = self.open.len();
        match self.rule_bags.last_mut() {
            Some((at, bag)) if *at == depth => Some(bag),
            _ => None,
        }
    }

    /// Route a style write to the active rule bag, else the current element.
    pub(crate) fn write_style(&mut self, op: &'static str, property: &str, value: String) {
        if let Some(bag) = self.active_bag() {
            bag.insert(property.to_string(), value);
        } else {
            self.current(op).attrs.set_style(property, value);
        }
    }

    pub(crate) fn remove_style(&mut self, op: &'static str, property: &str) {
        if let Some(bag) = self.active_bag() {
            bag.remove(property);
        } else {
            self.current(op).attrs.remove_style(property);
        }
    }

    /// Selectors of the open elements, outermost first.
    pub fn selector_chain(&self) -> Vec<String> {
        self.open.iter().map(|f| f.selector.clone()).collect()
    }

    pub(crate) fn begin_rule(&mut self) {
        self.rule_bags.push((self.open.len(), BTreeMap::new()));
    }

    pub(crate) fn end_rule(&mut self) -> BTreeMap<String, String> {
        self.rule_bags.pop().map(|(_, bag)| bag).unwrap_or_default()
    }

    pub(crate) fn queue_rule(&mut self, rule: StyleRule) {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
    }

    fn finish(mut self) -> Result<Built, Error> {
        if !self.open.is_empty() || self.levels.len() != 1 {
            return Err(Error::Unbalanced {
                depth: self.open.len(),
            });
        }
        Ok(Built {
            nodes: self.levels.pop().unwrap_or_default(),
            rules: self.rules,
        })
    }
}

// =============================================================================
// Thread-local slot
// =============================================================================

thread_local! {
    static CONTEXT: RefCell<Option<BuilderContext>> = const { RefCell::new(None) };
}

/// Clears the slot when a build unwinds.
struct SlotGuard;

impl Drop for SlotGuard {
    fn drop(&mut self) {
        CONTEXT.with(|slot| {
            if let Ok(mut slot) = slot.try_borrow_mut() {
                *slot = None;
            }
        });
    }
}

/// Run `f` with a fresh builder context and collect what it built.
///
/// Returns `f`'s own result next to the tree so callers can decide whether to
/// keep a tree whose render function failed.
///
/// # Errors
///
/// [`Error::Reentrant`] when a build is already active on this thread, and
/// [`Error::Unbalanced`] if the stack did not return to the root level.
pub fn build<R>(f: impl FnOnce() -> R) -> Result<(Built, R), Error> {
    CONTEXT.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Err(Error::Reentrant);
        }
        *slot = Some(BuilderContext::new());
        Ok(())
    })?;
    let guard = SlotGuard;

    let output = f();

    let context = CONTEXT.with(|slot| slot.borrow_mut().take());
    drop(guard);
    let built = context.ok_or(Error::Reentrant)?.finish()?;
    Ok((built, output))
}

/// Build a tree from a closure that cannot fail.
pub fn build_nodes(f: impl FnOnce()) -> Result<Vec<Node>, Error> {
    build(f).map(|(built, ())| built.nodes)
}

/// Whether a build is active on this thread.
pub fn is_building() -> bool {
    CONTEXT.with(|slot| slot.try_borrow().map(|s| s.is_some()).unwrap_or(true))
}

/// Run `f` against the active context.
///
/// # Panics
///
/// When no build is active: calling a builder primitive outside a render pass
/// is a caller bug.
pub(crate) fn with_context<T>(op: &'static str, f: impl FnOnce(&mut BuilderContext) -> T) -> T {
    CONTEXT.with(|slot| {
        let mut slot = slot.borrow_mut();
        match slot.as_mut() {
            Some(context) => f(context),
            None => fail(BuildError::NoBuild(op)),
        }
    })
}

/// Abort on a construction error.
pub(crate) fn fail(err: BuildError) -> ! {
    panic!("{}", Error::Build(err))
}
