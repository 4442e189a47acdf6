//! Render Pipeline
//!
//! Connects application render functions to a live document.
//!
//! # Pipeline Architecture
//!
//! ```text
//! refresh() → Scheduled → frame boundary → build (root / error view)
//!           → stylesheet rules → Reconciler → post-render callbacks
//! ```
//!
//! ## Key Design Principles
//!
//! - **One pass per frame**: refresh requests coalesce until the next frame
//! - **Isolated application errors**: a failing render shows the error view
//! - **Fail-fast invariants**: reconciler errors propagate out of the frame

pub mod config;
pub mod mount;
pub mod scheduler;

pub use config::{FrameSource, MountConfig, DEFAULT_ERROR_CLASS, DEFAULT_FRAME_INTERVAL};
pub use mount::{mount, App, ErrorViewFn, FrameOutcome, PassReport, RenderFn};
pub use scheduler::{
    after_render, defer, has_pending_work, is_scheduled, phase, refresh, reset_scheduler,
    suppress_next_refresh, Phase,
};
