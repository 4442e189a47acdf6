//! Mount API - application lifecycle and the render pass.
//!
//! [`mount`] binds a root render function to a container node of a [`Dom`]
//! and schedules the first pass. The returned [`App`] owns the document, the
//! previous tree and the handler bindings.
//!
//! # Example
//!
//! ```ignore
//! use onecup::{mount, element, text, MemoryDom, MountConfig};
//!
//! let dom = MemoryDom::new();
//! let body = dom.body();
//! let mut app = mount(dom, body, || {
//!     element("h1", "", || text("hello"));
//!     Ok(())
//! }, MountConfig::default());
//!
//! // Option 1: drive frames from the host's animation-frame callback
//! app.frame()?;
//!
//! // Option 2: no host loop, sleep between frames
//! while app.tick()? {
//!     // Your logic here
//! }
//!
//! let dom = app.unmount()?;
//! ```

use std::thread;

use super::config::MountConfig;
use super::scheduler::{self, FrameDecision};
use crate::builder::{self, element_with, text, Built, Props};
use crate::diagnostics::{self, DiagnosticSource};
use crate::dom::{Dom, DomId};
use crate::error::Result;
use crate::events::{self, DispatchOutcome, Event, HandlerRegistry};
use crate::reconcile::{self, PatchStats};
use crate::style::StyleSheet;
use crate::types::Node;

/// Root render function. Builds the tree through builder calls.
pub type RenderFn = Box<dyn FnMut() -> anyhow::Result<()>>;

/// Alternate render function run with the error of a failed render.
pub type ErrorViewFn = Box<dyn FnMut(&anyhow::Error) -> anyhow::Result<()>>;

// =============================================================================
// Reports
// =============================================================================

/// Result of one completed render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    /// 1-based pass counter of the app.
    pub pass: u64,
    pub stats: PatchStats,
    /// The root render failed and an error view was rendered instead.
    pub recovered: bool,
    /// Scoped style rules inserted into the document by this pass.
    pub rules_inserted: usize,
}

/// What one frame boundary did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing was scheduled.
    Idle,
    /// A pass was due but the one-shot suppression flag skipped it.
    Suppressed,
    Rendered(PassReport),
}

impl FrameOutcome {
    pub fn report(&self) -> Option<&PassReport> {
        match self {
            FrameOutcome::Rendered(report) => Some(report),
            _ => None,
        }
    }
}

// =============================================================================
// App
// =============================================================================

/// A mounted application.
pub struct App<D: Dom> {
    dom: D,
    container: DomId,
    render: RenderFn,
    error_view: Option<ErrorViewFn>,
    config: MountConfig,
    tree: Vec<Node>,
    handlers: HandlerRegistry,
    sheet: StyleSheet,
    passes: u64,
    running: bool,
}

/// Mount `root` into `container` and schedule the first pass.
///
/// Nothing is rendered until the first frame boundary
/// ([`App::frame`], [`App::tick`]) or an explicit [`App::render_now`].
pub fn mount<D, F>(dom: D, container: DomId, root: F, config: MountConfig) -> App<D>
where
    D: Dom,
    F: FnMut() -> anyhow::Result<()> + 'static,
{
    tracing::debug!(?container, frame_source = ?config.frame_source, "mounting");
    scheduler::refresh();
    App {
        dom,
        container,
        render: Box::new(root),
        error_view: None,
        config,
        tree: Vec::new(),
        handlers: HandlerRegistry::new(),
        sheet: StyleSheet::new(),
        passes: 0,
        running: true,
    }
}

impl<D: Dom> App<D> {
    /// Render `view` instead of the root whenever the root fails.
    pub fn set_error_view<F>(&mut self, view: F)
    where
        F: FnMut(&anyhow::Error) -> anyhow::Result<()> + 'static,
    {
        self.error_view = Some(Box::new(view));
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Run one frame boundary: deferred callbacks first, then at most one pass.
    ///
    /// # Errors
    ///
    /// Reconciler invariant violations and builder misuse. The app's tree is
    /// no longer consistent with the document after such an error.
    pub fn frame(&mut self) -> Result<FrameOutcome> {
        self.run_deferred();
        match scheduler::begin_frame() {
            FrameDecision::Idle => Ok(FrameOutcome::Idle),
            FrameDecision::Suppressed => {
                tracing::warn!(pass = self.passes, "render pass suppressed");
                Ok(FrameOutcome::Suppressed)
            }
            FrameDecision::Render => self.render_pass().map(FrameOutcome::Rendered),
        }
    }

    /// Render immediately, outside the frame cycle. A pending refresh stays
    /// pending.
    pub fn render_now(&mut self) -> Result<PassReport> {
        self.render_pass()
    }

    /// Run one frame, then sleep for the timer interval, if any.
    ///
    /// Returns `Ok(false)` once [`App::stop`] was called.
    pub fn tick(&mut self) -> Result<bool> {
        if !self.running {
            return Ok(false);
        }
        self.frame()?;
        if let Some(interval) = self.config.frame_source.interval() {
            thread::sleep(interval);
        }
        Ok(self.running)
    }

    /// Tick until stopped.
    pub fn run(&mut self) -> Result<()> {
        while self.tick()? {}
        Ok(())
    }

    /// Run frames while work is pending, at most `max_frames`. Returns the
    /// number of frames run.
    pub fn run_until_idle(&mut self, max_frames: usize) -> Result<usize> {
        let mut frames = 0;
        while frames < max_frames && scheduler::has_pending_work() {
            if frames > 0 {
                if let Some(interval) = self.config.frame_source.interval() {
                    thread::sleep(interval);
                }
            }
            self.frame()?;
            frames += 1;
        }
        Ok(frames)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Make the next [`App::tick`] return `false`.
    pub fn stop(&mut self) {
        self.running = false;
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Dispatch a document event to the bound handlers.
    pub fn dispatch(&self, event: &Event) -> DispatchOutcome {
        events::dispatch(&self.dom, &self.handlers, event)
    }

    /// Resolve a selector (or `#id`) against the live document.
    pub fn lookup(&self, selector: &str) -> Option<DomId> {
        self.dom.query(selector)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Mutable document access for imperative escapes (focus, typed values).
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// Tree of the last pass. Every node is built.
    pub fn tree(&self) -> &[Node] {
        &self.tree
    }

    pub fn container(&self) -> DomId {
        self.container
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn stylesheet(&self) -> &StyleSheet {
        &self.sheet
    }

    pub fn config(&self) -> &MountConfig {
        &self.config
    }

    /// Completed render passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Remove the rendered tree and hand the document back.
    pub fn unmount(mut self) -> Result<D> {
        let tree = std::mem::take(&mut self.tree);
        reconcile::reconcile(
            &mut self.dom,
            &mut self.handlers,
            self.container,
            tree,
            &mut [],
        )?;
        tracing::debug!(passes = self.passes, "unmounted");
        Ok(self.dom)
    }

    // =========================================================================
    // Pass internals
    // =========================================================================

    fn run_deferred(&mut self) {
        for callback in scheduler::take_deferred() {
            if let Err(err) = callback(&mut self.dom) {
                tracing::error!(error = %err, "deferred callback failed");
                diagnostics::report(DiagnosticSource::Deferred, format!("{err:#}"));
            }
            scheduler::refresh();
        }
    }

    fn render_pass(&mut self) -> Result<PassReport> {
        let pass = self.passes + 1;
        let (built, recovered) = self.build_tree()?;

        let mut rules_inserted = 0;
        for rule in &built.rules {
            if self.sheet.insert(rule) {
                self.dom.insert_style_rule(&rule.to_string());
                rules_inserted += 1;
            }
        }

        let mut next = built.nodes;
        let old = std::mem::take(&mut self.tree);
        let stats = reconcile::reconcile(
            &mut self.dom,
            &mut self.handlers,
            self.container,
            old,
            &mut next,
        )?;
        self.tree = next;
        self.passes = pass;
        tracing::debug!(pass, ?stats, recovered, rules_inserted, "render pass");

        for callback in scheduler::take_post_render() {
            callback(&mut self.dom);
        }

        Ok(PassReport {
            pass,
            stats,
            recovered,
            rules_inserted,
        })
    }

    /// Build the root, falling back to the error view and then to nothing.
    ///
    /// Post-render callbacks queued by a failed root are dropped with its tree.
    fn build_tree(&mut self) -> Result<(Built, bool)> {
        let mark = scheduler::post_render_mark();
        let (built, outcome) = builder::build(|| (self.render)())?;
        let err = match outcome {
            Ok(()) => return Ok((built, false)),
            Err(err) => err,
        };
        scheduler::truncate_post_render(mark);

        tracing::error!(error = %err, "render function failed");
        diagnostics::report(DiagnosticSource::Render, format!("{err:#}"));

        let (fallback, outcome) = match self.error_view.as_mut() {
            Some(view) => builder::build(|| view(&err))?,
            None => {
                let class = &self.config.error_class;
                let message = format!("{err:#}");
                builder::build(|| {
                    default_error_view(class, &message);
                    anyhow::Ok(())
                })?
            }
        };

        match outcome {
            Ok(()) => Ok((fallback, true)),
            Err(view_err) => {
                tracing::error!(error = %view_err, "error view failed");
                diagnostics::report(DiagnosticSource::ErrorView, format!("{view_err:#}"));
                Ok((Built::default(), true))
            }
        }
    }
}

/// `<pre class="{class}">message</pre>`
fn default_error_view(class: &str, message: &str) {
    element_with("pre", "", Props::new().class(class), || text(message));
}

// =============================================================================
// Tests
// =============================================================================
