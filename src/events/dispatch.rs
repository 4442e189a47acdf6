//! Document-level dispatch.
//!
//! Models the two capturing listeners installed on the document (click and
//! submit) plus plain handler routing for every other event kind:
//!
//! 1. Walk from the target up through `parent` to the closest node with a
//!    handler for the event kind and invoke it.
//! 2. Click: unless the handler prevented default, find the closest ancestor
//!    with an `href`. In-app links are prevented and routed instead.
//! 3. Submit: always prevented. Native form submission is never used.
//!
//! Click and submit always stop propagation.

use super::route;
use super::{invoke, DispatchOutcome, Event, HandlerRegistry};
use crate::dom::{Dom, DomId};

/// Dispatch `event` against the live document.
pub fn dispatch<D: Dom + ?Sized>(
    dom: &D,
    handlers: &HandlerRegistry,
    event: &Event,
) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::empty();

    let bound = ancestors(dom, event.target())
        .find_map(|node| handlers.get(node, event.kind()).map(|h| (node, h)));
    if let Some((node, handler)) = bound {
        event.set_current_target(Some(node));
        outcome |= DispatchOutcome::HANDLED;
        if !invoke(&handler, event) {
            outcome |= DispatchOutcome::HANDLER_FAILED;
        }
        event.set_current_target(None);
    }

    match event.kind() {
        "click" => {
            if !event.default_prevented() {
                if let Some(href) = intercept_link(dom, event.target()) {
                    event.prevent_default();
                    tracing::debug!(%href, "routing in-app link");
                    route::navigate(&href);
                    outcome |= DispatchOutcome::NAVIGATED;
                }
            }
            event.stop_propagation();
        }
        "submit" => {
            event.prevent_default();
            event.stop_propagation();
        }
        _ => {}
    }

    if event.default_prevented() {
        outcome |= DispatchOutcome::DEFAULT_PREVENTED;
    }
    if event.propagation_stopped() {
        outcome |= DispatchOutcome::PROPAGATION_STOPPED;
    }
    outcome
}

/// Whether an `href` (with its anchor's `target`) stays inside the app.
pub fn is_in_app_link(href: &str, target: Option<&str>) -> bool {
    !href.starts_with("http") && target != Some("_blank")
}

fn intercept_link<D: Dom + ?Sized>(dom: &D, from: DomId) -> Option<String> {
    let anchor = ancestors(dom, from).find(|&node| dom.attribute(node, "href").is_some())?;
    let href = dom.attribute(anchor, "href")?;
    let target = dom.attribute(anchor, "target");
    is_in_app_link(&href, target.as_deref()).then_some(href)
}

/// `from` and its ancestors, nearest first.
fn ancestors<D: Dom + ?Sized>(dom: &D, from: DomId) -> impl Iterator<Item = DomId> + '_ {
    std::iter::successors(Some(from), move |&node| dom.parent(node))
}
