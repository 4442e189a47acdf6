//! # onecup
//!
//! Declarative DOM rendering for Rust.
//!
//! Application code describes the page by calling builder functions inside
//! each other. Every render pass builds a fresh node tree, and a reconciler
//! patches the live document to match it, reusing every element whose tag and
//! `id` did not change.
//!
//! ## Architecture
//!
//! ```text
//! refresh() → Scheduler → root render (builder calls) → Node tree
//!           → Reconciler → dyn Dom → live document
//! ```
//!
//! Route state lives in a [spark-signals](https://github.com/RLabs-Inc/spark-signals)
//! signal so hosts can react to in-app navigation.
//!
//! ## Modules
//!
//! - [`types`] - Node tree and attribute values
//! - [`builder`] - Implicit-stack tree construction
//! - [`style`] - Inline style setters and scoped stylesheet rules
//! - [`events`] - Handlers, dispatch and routing
//! - [`reconcile`] - Diff and patch against a [`Dom`]
//! - [`pipeline`] - Scheduler, mount and the render pass
//! - [`dom`] - Host document abstraction and the in-memory document

pub mod builder;
pub mod diagnostics;
pub mod dom;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod reconcile;
mod selector;
pub mod style;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{BuildError, Error, Result};

pub use builder::{
    attr, build, build_nodes, class, current_selector_chain, element, element_with, is_building,
    key, leaf, leaf_with, raw, text, BuilderContext, Built, Props,
};

pub use dom::{Dom, DomId, MemoryDom, Mutation, QuerySelector};

pub use style::{
    background, border, border_radius, bottom, color, compose_selector, css_rule, cursor, display,
    font_size, font_weight, height, left, line_height, margin, margin_bottom, margin_top,
    max_height, max_width, min_height, min_width, opacity, overflow, padding, padding_left,
    padding_right, position, right, style, text_align, top, unset_style, width, z_index,
    CssValue, StyleRule, StyleSheet,
};

pub use events::{
    dispatch, handler, is_in_app_link, on, on_blur, on_change, on_click, on_dblclick, on_focus,
    on_input, on_keydown, on_keyup, on_mousedown, on_mouseout, on_mouseover, on_mouseup,
    on_scroll, on_submit, DispatchOutcome, Event, EventFlags, Handler, HandlerRegistry,
};

pub use events::route::{back, current_route, history, navigate, reset_route, route_signal};

pub use reconcile::{reconcile, PatchStats, Reconciler};

pub use pipeline::{
    after_render, defer, has_pending_work, is_scheduled, mount, refresh, reset_scheduler,
    suppress_next_refresh, App, FrameOutcome, FrameSource, MountConfig, PassReport, Phase,
};

pub use diagnostics::{reset_diagnostics, set_reporter, take_diagnostics, Diagnostic, DiagnosticSource};
