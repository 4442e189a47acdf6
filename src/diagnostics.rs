//! Diagnostics side channel.
//!
//! Failures isolated from host application code (render functions, error
//! views, event handlers, deferred callbacks) are recorded here instead of
//! propagating. A reporter hook can forward them elsewhere.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Most recent diagnostics kept in the log.
pub const MAX_DIAGNOSTICS: usize = 256;

/// Where an isolated failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSource {
    Render,
    ErrorView,
    Handler,
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: DiagnosticSource,
    pub message: String,
}

type Reporter = Rc<dyn Fn(&Diagnostic)>;

thread_local! {
    static LOG: RefCell<VecDeque<Diagnostic>> = const { RefCell::new(VecDeque::new()) };
    static REPORTER: RefCell<Option<Reporter>> = const { RefCell::new(None) };
}

/// Record a diagnostic and forward it to the reporter, if any.
pub fn report(source: DiagnosticSource, message: impl Into<String>) {
    let diagnostic = Diagnostic {
        source,
        message: message.into(),
    };
    let reporter = REPORTER.with(|r| r.borrow().clone());
    if let Some(reporter) = reporter {
        reporter(&diagnostic);
    }
    LOG.with(|log| {
        let mut log = log.borrow_mut();
        if log.len() == MAX_DIAGNOSTICS {
            log.pop_front();
        }
        log.push_back(diagnostic);
    });
}

/// Drain the log, oldest first.
pub fn take_diagnostics() -> Vec<Diagnostic> {
    LOG.with(|log| log.borrow_mut().drain(..).collect())
}

pub fn set_reporter(reporter: impl Fn(&Diagnostic) + 'static) {
    REPORTER.with(|r| *r.borrow_mut() = Some(Rc::new(reporter)));
}

pub fn clear_reporter() {
    REPORTER.with(|r| *r.borrow_mut() = None);
}

/// Reset diagnostics state (for testing).
pub fn reset_diagnostics() {
    LOG.with(|log| log.borrow_mut().clear());
    clear_reporter();
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_report_and_take() {
        reset_diagnostics();
        report(DiagnosticSource::Render, "first");
        report(DiagnosticSource::Deferred, "second");

        let taken = take_diagnostics();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].message, "first");
        assert_eq!(taken[1].source, DiagnosticSource::Deferred);
        assert!(take_diagnostics().is_empty());
    }

    #[test]
    fn test_reporter_hook() {
        reset_diagnostics();
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        set_reporter(move |_| counter.set(counter.get() + 1));

        report(DiagnosticSource::Handler, "x");
        report(DiagnosticSource::Handler, "y");
        assert_eq!(seen.get(), 2);

        clear_reporter();
        report(DiagnosticSource::Handler, "z");
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_log_is_bounded() {
        reset_diagnostics();
        for i in 0..MAX_DIAGNOSTICS + 10 {
            report(DiagnosticSource::Render, i.to_string());
        }
        let taken = take_diagnostics();
        assert_eq!(taken.len(), MAX_DIAGNOSTICS);
        assert_eq!(taken[0].message, "10");
    }
}
