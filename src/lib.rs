// src/lib.rs

//! Incremental topological sorting over a mutable dependency graph.
//!
//! A [`TopoGraph`] holds nodes and `dependency -> dependent` edges, and any
//! number of *views*: independent cursors over the graph's topological
//! order, each with its own frontier of ready / yielded / done nodes. The
//! graph may be mutated while traversals are in progress; cycle checks run
//! lazily, and a mutation that retroactively breaks a guarantee a view has
//! already handed out is reported as a conflict on that view.
//!
//! Single-consumer callers can ignore views entirely and use the default
//! view proxy (`ready`/`done`/`is_active`/`reset`) or [`TopoGraph::static_order`]:
//!
//! ```
//! use topodag::TopoGraph;
//!
//! let mut graph = TopoGraph::new();
//! graph.add("b", ["a"]);
//! graph.add("c", ["a", "b"]);
//!
//! let order: Vec<_> = graph.static_order().collect::<Result<_, _>>()?;
//! assert_eq!(order, ["a", "b", "c"]);
//! # Ok::<(), topodag::TopodagError<&'static str>>(())
//! ```
//!
//! Multi-consumer callers create explicit views and advance them at their
//! own pace:
//!
//! ```
//! use topodag::TopoGraph;
//!
//! let mut graph = TopoGraph::new();
//! graph.add("deploy", ["build", "test"]);
//!
//! let view = graph.view();
//! let batch = graph.ready_in(view)?;   // ["build", "test"]
//! graph.done_in(view, batch)?;
//! assert_eq!(graph.ready_in(view)?, ["deploy"]);
//! # Ok::<(), topodag::TopodagError<&'static str>>(())
//! ```
//!
//! The engine furnishes no synchronization: callers serialize access
//! externally. Interleaving several views from one call stack is fully
//! supported, since all progress state lives per-view.

pub mod errors;
pub mod graph;
pub mod logging;

pub use errors::TopodagError;
pub use graph::{StaticOrder, TopoGraph, ViewId};
