//! Events - handler tokens, the per-node handler registry and dispatch.
//!
//! Handlers are plain closures attached to nodes while building. The
//! reconciler binds them to the live [`DomId`] they were built or adopted
//! onto, rebinds them on every pass and disposes them with the DOM they
//! belong to. No global handler table is kept.
//!
//! # Example
//!
//! ```ignore
//! use onecup::{element, on_click, text};
//!
//! element("button", ".save", || {
//!     on_click(|_event| {
//!         save_draft()?;
//!         Ok(())
//!     });
//!     text("Save");
//! });
//! ```

mod dispatch;
pub mod route;

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::builder;
use crate::diagnostics::{self, DiagnosticSource};
use crate::dom::DomId;
use crate::pipeline::scheduler;

pub use dispatch::{dispatch, is_in_app_link};

// =============================================================================
// Types
// =============================================================================

/// Event callback attached to a node.
///
/// An `Err` is reported as a diagnostic and never reaches the host; a refresh
/// is requested either way.
pub type Handler = Rc<dyn Fn(&Event) -> anyhow::Result<()>>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&Event) -> anyhow::Result<()> + 'static,
{
    Rc::new(f)
}

bitflags::bitflags! {
    /// Per-event state toggled by handlers and dispatch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EventFlags: u8 {
        const DEFAULT_PREVENTED = 1 << 0;
        const PROPAGATION_STOPPED = 1 << 1;
    }
}

bitflags::bitflags! {
    /// What [`dispatch`] did with an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DispatchOutcome: u8 {
        /// A handler was found and invoked.
        const HANDLED = 1 << 0;
        /// The invoked handler returned an error.
        const HANDLER_FAILED = 1 << 1;
        const DEFAULT_PREVENTED = 1 << 2;
        const PROPAGATION_STOPPED = 1 << 3;
        /// An in-app link was intercepted and routed.
        const NAVIGATED = 1 << 4;
    }
}

/// A DOM event delivered to [`dispatch`].
#[derive(Debug, Clone)]
pub struct Event {
    kind: String,
    target: DomId,
    value: Option<String>,
    current_target: Cell<Option<DomId>>,
    flags: Cell<EventFlags>,
}

impl Event {
    pub fn new(kind: impl Into<String>, target: DomId) -> Self {
        Self {
            kind: kind.into(),
            target,
            value: None,
            current_target: Cell::new(None),
            flags: Cell::new(EventFlags::empty()),
        }
    }

    pub fn click(target: DomId) -> Self {
        Self::new("click", target)
    }

    pub fn submit(target: DomId) -> Self {
        Self::new("submit", target)
    }

    /// An `input` event carrying the control's new value.
    pub fn input(target: DomId, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new("input", target)
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Node the event originated on.
    pub fn target(&self) -> DomId {
        self.target
    }

    /// Node whose handler is running.
    pub fn current_target(&self) -> Option<DomId> {
        self.current_target.get()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn prevent_default(&self) {
        self.flags.set(self.flags.get() | EventFlags::DEFAULT_PREVENTED);
    }

    pub fn stop_propagation(&self) {
        self.flags.set(self.flags.get() | EventFlags::PROPAGATION_STOPPED);
    }

    pub fn default_prevented(&self) -> bool {
        self.flags.get().contains(EventFlags::DEFAULT_PREVENTED)
    }

    pub fn propagation_stopped(&self) -> bool {
        self.flags.get().contains(EventFlags::PROPAGATION_STOPPED)
    }

    pub fn flags(&self) -> EventFlags {
        self.flags.get()
    }

    pub(crate) fn set_current_target(&self, node: Option<DomId>) {
        self.current_target.set(node);
    }
}

// =============================================================================
// Handler registry
// =============================================================================

/// Live handlers keyed by the DOM node they are bound to.
#[derive(Default)]
pub struct HandlerRegistry {
    bound: HashMap<DomId, BTreeMap<String, Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the handler set of `node`. An empty set unbinds the node.
    pub fn bind(&mut self, node: DomId, handlers: BTreeMap<String, Handler>) {
        if handlers.is_empty() {
            self.bound.remove(&node);
        } else {
            self.bound.insert(node, handlers);
        }
    }

    /// Drop every handler bound to `node`.
    pub fn dispose(&mut self, node: DomId) {
        self.bound.remove(&node);
    }

    pub fn get(&self, node: DomId, kind: &str) -> Option<Handler> {
        self.bound.get(&node)?.get(kind).cloned()
    }

    pub fn has(&self, node: DomId, kind: &str) -> bool {
        self.bound.get(&node).is_some_and(|h| h.contains_key(kind))
    }

    /// Number of nodes with at least one handler.
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

/// Run a handler the way a handler token does: errors become diagnostics and
/// a refresh is requested afterwards regardless.
///
/// Returns `false` when the handler failed.
pub(crate) fn invoke(handler: &Handler, event: &Event) -> bool {
    let ok = match handler(event) {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(kind = event.kind(), error = %err, "event handler failed");
            diagnostics::report(
                DiagnosticSource::Handler,
                format!("{} handler: {err:#}", event.kind()),
            );
            false
        }
    };
    scheduler::refresh();
    ok
}

// =============================================================================
// Builder setters
// =============================================================================

/// Attach `f` as the `event` handler of the element currently being built.
///
/// # Panics
///
/// Outside of a build, or with no open element.
pub fn on<F>(event: &str, f: F)
where
    F: Fn(&Event) -> anyhow::Result<()> + 'static,
{
    builder::set_handler("on", event, handler(f));
}

macro_rules! event_setters {
    ($($name:ident => $event:literal),* $(,)?) => {
        $(
            #[doc = concat!("Attach a `", $event, "` handler to the current element.")]
            pub fn $name<F>(f: F)
            where
                F: Fn(&Event) -> anyhow::Result<()> + 'static,
            {
                builder::set_handler(stringify!($name), $event, handler(f));
            }
        )*
    };
}

event_setters! {
    on_click => "click",
    on_dblclick => "dblclick",
    on_submit => "submit",
    on_input => "input",
    on_change => "change",
    on_keydown => "keydown",
    on_keyup => "keyup",
    on_focus => "focus",
    on_blur => "blur",
    on_mousedown => "mousedown",
    on_mouseup => "mouseup",
    on_mouseover => "mouseover",
    on_mouseout => "mouseout",
    on_scroll => "scroll",
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{reset_diagnostics, take_diagnostics};
    use crate::pipeline::scheduler::{is_scheduled, reset_scheduler};

    #[test]
    fn test_event_flags() {
        let event = Event::click(DomId(1));
        assert!(!event.default_prevented());
        event.prevent_default();
        event.stop_propagation();
        assert_eq!(
            event.flags(),
            EventFlags::DEFAULT_PREVENTED | EventFlags::PROPAGATION_STOPPED
        );
    }

    #[test]
    fn test_registry_bind_and_dispose() {
        let mut registry = HandlerRegistry::new();
        let mut set = BTreeMap::new();
        set.insert("click".to_string(), handler(|_| Ok(())));
        registry.bind(DomId(3), set);
        assert!(registry.has(DomId(3), "click"));
        assert!(!registry.has(DomId(3), "submit"));

        registry.bind(DomId(3), BTreeMap::new());
        assert!(registry.is_empty());

        let mut set = BTreeMap::new();
        set.insert("input".to_string(), handler(|_| Ok(())));
        registry.bind(DomId(4), set);
        registry.dispose(DomId(4));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_invoke_isolates_errors_and_refreshes() {
        reset_scheduler();
        reset_diagnostics();

        let failing = handler(|_| anyhow::bail!("boom"));
        assert!(!invoke(&failing, &Event::click(DomId(0))));
        assert!(is_scheduled());

        let diagnostics = take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].source, DiagnosticSource::Handler);
        assert!(diagnostics[0].message.contains("boom"));
    }

    #[test]
    fn test_invoke_success_still_refreshes() {
        reset_scheduler();
        let fine = handler(|_| Ok(()));
        assert!(invoke(&fine, &Event::click(DomId(0))));
        assert!(is_scheduled());
    }
}
