//! Error types.
//!
//! Library-side failures are typed here. Host application callbacks (render
//! functions, error views, event handlers, deferred callbacks) return
//! `anyhow::Result` and are isolated by the pipeline instead.

use thiserror::Error;

use crate::dom::DomId;

/// Result alias for fallible onecup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the builder and reconciler.
///
/// Every variant marks a broken invariant in the caller or in the library
/// itself. None of them are recovered internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A builder primitive received malformed input.
    #[error("construction error: {0}")]
    Build(#[from] BuildError),

    /// `build` was entered while another build was active on this thread.
    #[error("a build is already in progress on this thread")]
    Reentrant,

    /// The builder stack was not balanced when the pass finished.
    #[error("builder stack not empty after build ({depth} open frames)")]
    Unbalanced { depth: usize },

    /// The old side of a diff carries no live DOM handle.
    #[error("reconcile: old <{what}> node was never built")]
    Unbuilt { what: String },

    /// A live node that must be replaced has no parent to insert into.
    #[error("reconcile: live node {0:?} is detached")]
    Detached(DomId),
}

/// Malformed builder arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("element tag must not be empty")]
    EmptyTag,

    #[error("invalid shorthand selector {selector:?}: {reason}")]
    Selector { selector: String, reason: &'static str },

    #[error("`{0}` called outside of a build")]
    NoBuild(&'static str),

    #[error("`{0}` called with no open element")]
    NoElement(&'static str),
}
