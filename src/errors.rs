// src/errors.rs

//! Crate-wide error type.

use std::fmt;

use thiserror::Error;

/// Errors reported by [`TopoGraph`](crate::TopoGraph) operations.
///
/// Every failure is synchronous and leaves the graph and all views
/// unchanged: preconditions are validated before any mutation, so a
/// rejected call is a true no-op.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopodagError<N: fmt::Debug> {
    /// The node is not registered in the graph.
    #[error("unknown node {0:?}")]
    UnknownNode(N),

    /// `done` was called for a node this view has not yielded, or has
    /// already completed.
    #[error("node {0:?} was not yielded by this view")]
    NotYielded(N),

    /// The view handle is closed; closed handles are never reused.
    #[error("view is already closed")]
    ViewClosed,

    /// The view has unresolved conflicts and refuses reads until one of
    /// the conflicting nodes is removed, or the view is reset or closed.
    #[error("view has unresolved conflicts")]
    IncoherentView,

    /// The graph currently contains a cycle. The payload is one concrete
    /// cycle in order: each node has an edge to the next, and the last
    /// wraps around to the first.
    #[error("cycle detected: {0:?}")]
    CycleDetected(Vec<N>),
}
