//! Render scheduler.
//!
//! A two-state machine that coalesces every refresh request made before the
//! next frame boundary into one render pass:
//!
//! ```text
//!            refresh()                      frame boundary
//!   Idle ─────────────────▶ Scheduled ─────────────────────▶ Idle + one pass
//!    ▲                        │  refresh() → no-op
//!    └────────────────────────┘
//! ```
//!
//! The machine moves back to Idle *before* the pass runs, so a refresh
//! requested during a pass lands in the next frame and is never interleaved
//! with the pass in progress.

use std::cell::RefCell;

use crate::dom::Dom;

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Scheduled,
}

/// What a frame boundary should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameDecision {
    Render,
    /// A pass was due but the one-shot suppression flag consumed it.
    Suppressed,
    Idle,
}

pub(crate) type Deferred = Box<dyn FnOnce(&mut dyn Dom) -> anyhow::Result<()>>;
pub(crate) type PostRender = Box<dyn FnOnce(&mut dyn Dom)>;

#[derive(Default)]
struct SchedulerState {
    phase: Phase,
    suppress_next: bool,
    deferred: Vec<Deferred>,
    post_render: Vec<PostRender>,
}

thread_local! {
    static STATE: RefCell<SchedulerState> = RefCell::new(SchedulerState::default());
}

// =============================================================================
// Public API
// =============================================================================

/// Request a render pass on the next frame. Coalesced while one is pending.
pub fn refresh() {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        if state.phase == Phase::Idle {
            state.phase = Phase::Scheduled;
            tracing::trace!("refresh scheduled");
        }
    })
}

pub fn phase() -> Phase {
    STATE.with(|state| state.borrow().phase)
}

pub fn is_scheduled() -> bool {
    phase() == Phase::Scheduled
}

/// Skip the next pass that would otherwise run.
///
/// Meant for input handlers: re-rendering while the user types fights the
/// browser's own caret handling. The flag is consumed by the first frame with
/// a pending pass.
pub fn suppress_next_refresh() {
    STATE.with(|state| state.borrow_mut().suppress_next = true)
}

/// Run `f` against the document at the start of the next frame, then force a
/// refresh.
///
/// Lets a DOM side effect (focusing an input, say) settle before the next
/// reconciliation reads DOM state. An `Err` is reported as a diagnostic.
pub fn defer<F>(f: F)
where
    F: FnOnce(&mut dyn Dom) -> anyhow::Result<()> + 'static,
{
    STATE.with(|state| state.borrow_mut().deferred.push(Box::new(f)))
}

/// Run `f` once after the DOM has been patched by the next pass, with the
/// patched document.
pub fn after_render<F>(f: F)
where
    F: FnOnce(&mut dyn Dom) + 'static,
{
    STATE.with(|state| state.borrow_mut().post_render.push(Box::new(f)))
}

/// Whether a frame would do anything.
pub fn has_pending_work() -> bool {
    STATE.with(|state| {
        let state = state.borrow();
        state.phase == Phase::Scheduled || !state.deferred.is_empty()
    })
}

/// Reset all scheduler state (for testing).
pub fn reset_scheduler() {
    STATE.with(|state| *state.borrow_mut() = SchedulerState::default())
}

// =============================================================================
// Frame hooks (pipeline internal)
// =============================================================================

pub(crate) fn take_deferred() -> Vec<Deferred> {
    STATE.with(|state| std::mem::take(&mut state.borrow_mut().deferred))
}

pub(crate) fn take_post_render() -> Vec<PostRender> {
    STATE.with(|state| std::mem::take(&mut state.borrow_mut().post_render))
}

/// Length of the post-render queue, a mark for [`truncate_post_render`].
pub(crate) fn post_render_mark() -> usize {
    STATE.with(|state| state.borrow().post_render.len())
}

/// Drop post-render callbacks queued after `mark`.
pub(crate) fn truncate_post_render(mark: usize) {
    STATE.with(|state| state.borrow_mut().post_render.truncate(mark))
}

/// Consume the frame boundary: Scheduled moves to Idle before rendering.
pub(crate) fn begin_frame() -> FrameDecision {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        if state.phase == Phase::Idle {
            return FrameDecision::Idle;
        }
        state.phase = Phase::Idle;
        if state.suppress_next {
            state.suppress_next = false;
            FrameDecision::Suppressed
        } else {
            FrameDecision::Render
        }
    })
}
