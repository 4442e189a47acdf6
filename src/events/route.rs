//! In-app routing state.
//!
//! The current path is a reactive signal so application code can derive from
//! it. Navigation always requests a refresh.

use std::cell::RefCell;

use spark_signals::{signal, Signal};

use crate::pipeline::scheduler;

thread_local! {
    static ROUTE: Signal<String> = signal("/".to_string());
    static HISTORY: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Current in-app path.
pub fn current_route() -> String {
    ROUTE.with(|s| s.get())
}

/// Handle to the route signal.
pub fn route_signal() -> Signal<String> {
    ROUTE.with(|s| s.clone())
}

/// Move to `path`, remembering the previous path, and request a refresh.
pub fn navigate(path: &str) {
    let previous = current_route();
    if previous != path {
        HISTORY.with(|h| h.borrow_mut().push(previous));
        ROUTE.with(|s| s.set(path.to_string()));
    }
    scheduler::refresh();
}

/// Return to the previous path. Returns `false` when there is none.
pub fn back() -> bool {
    let Some(previous) = HISTORY.with(|h| h.borrow_mut().pop()) else {
        return false;
    };
    ROUTE.with(|s| s.set(previous));
    scheduler::refresh();
    true
}

/// Paths navigated away from, oldest first.
pub fn history() -> Vec<String> {
    HISTORY.with(|h| h.borrow().clone())
}

/// Reset routing state (for testing).
pub fn reset_route() {
    ROUTE.with(|s| s.set("/".to_string()));
    HISTORY.with(|h| h.borrow_mut().clear());
}
