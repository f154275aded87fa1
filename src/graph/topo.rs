// src/graph/topo.rs

//! [`TopoGraph`]: the mutable dependency graph and its view registry.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use tracing::debug;

use crate::errors::TopodagError;
use crate::graph::storage::NodeTable;
use crate::graph::view::{ViewId, ViewState};

/// An incremental topological sorter over a mutable dependency graph.
///
/// The graph owns the node/edge storage and the state of every traversal
/// view; callers address views through [`ViewId`] handles. Mutations are
/// broadcast to the canonical zero-progress *stock* view (the template new
/// views are seeded from) and to every live view, so traversal may be
/// interleaved freely with `add` and `remove`.
///
/// Edges point from a dependency to its dependent: `add(node, deps)`
/// records one `dep -> node` edge per dependency, and a node becomes ready
/// to a view only once all of its predecessors are done in that view.
///
/// No internal synchronization is provided; callers serialize access.
#[derive(Debug)]
pub struct TopoGraph<N> {
    pub(crate) table: NodeTable<N>,
    /// Set when an edge lands between two pre-existing nodes (or a node
    /// and itself); gates the lazy cycle re-check.
    pub(crate) dirty: bool,
    /// Canonical zero-progress view. Tracks every mutation but is never
    /// advanced; `view()` and `reset` clone it.
    pub(crate) stock: ViewState<N>,
    /// Live view slots; `None` marks a closed view. Slots are never
    /// reused, so `ViewId`s stay unambiguous for the graph's lifetime.
    pub(crate) views: Vec<Option<ViewState<N>>>,
}

impl<N> TopoGraph<N>
where
    N: Eq + Hash + Clone + fmt::Debug,
{
    /// Empty graph. The default view exists from the start.
    pub fn new() -> Self {
        let stock = ViewState::empty();
        let default_view = stock.clone();
        Self {
            table: NodeTable::new(),
            dirty: false,
            stock,
            views: vec![Some(default_view)],
        }
    }

    /// Bulk population: one `add` per `(node, dependencies)` entry.
    pub fn from_dependencies<I, D>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, D)>,
        D: IntoIterator<Item = N>,
    {
        let mut graph = Self::new();
        for (node, dependencies) in entries {
            graph.add(node, dependencies);
        }
        graph
    }

    /// Register `node` and its dependencies, adding one `dep -> node` edge
    /// per dependency. Unseen values (the node or any dependency) are
    /// registered on first reference. Repeating a call with the same pair
    /// is a no-op; `add` never fails.
    ///
    /// The dirty flag is set only when a new edge connects two nodes that
    /// both existed before this call, or a node to itself: a brand-new
    /// endpoint cannot otherwise close a cycle, so those edges skip the
    /// re-check.
    pub fn add<I>(&mut self, node: N, dependencies: I)
    where
        I: IntoIterator<Item = N>,
    {
        let mut created_in_call: HashSet<N> = HashSet::new();

        if self.table.ensure_node(&node) {
            debug!(node = ?node, "registered node");
            created_in_call.insert(node.clone());
            self.broadcast_node_created(&node);
        }

        for dep in dependencies {
            if self.table.ensure_node(&dep) {
                debug!(node = ?dep, "registered dependency node");
                created_in_call.insert(dep.clone());
                self.broadcast_node_created(&dep);
            }

            if self.table.link(&dep, &node) {
                let both_preexisting =
                    !created_in_call.contains(&dep) && !created_in_call.contains(&node);
                if both_preexisting || dep == node {
                    if !self.dirty {
                        debug!(pred = ?dep, succ = ?node, "edge warrants a cycle re-check");
                    }
                    self.dirty = true;
                }
                self.broadcast_edge_created(&dep, &node);
            }
        }
    }

    /// Remove `node` together with every edge touching it, and notify all
    /// views. Former successors keep only their remaining predecessors.
    ///
    /// Fails with `UnknownNode` (mutating nothing) if the node is not
    /// registered. Finding the predecessors scans the whole node table:
    /// removal is O(n) by design, favoring fast `add` and `view`.
    pub fn remove(&mut self, node: &N) -> Result<(), TopodagError<N>> {
        let Some(former_successors) = self.table.unlink(node) else {
            return Err(TopodagError::UnknownNode(node.clone()));
        };
        debug!(node = ?node, successors = ?former_successors, "removed node");
        self.broadcast_node_removed(node, &former_successors);
        Ok(())
    }

    /// Register a fresh view, seeded from the stock baseline: zero
    /// progress over the graph's current node set.
    pub fn view(&mut self) -> ViewId {
        let state = self.stock.clone();
        self.views.push(Some(state));
        let id = ViewId(self.views.len() - 1);
        debug!(view = ?id, "created view from stock baseline");
        id
    }

    /// Structurally copy `view` into a new, independently evolving view.
    /// All private state is duplicated, outstanding conflicts included.
    pub fn fork(&mut self, view: ViewId) -> Result<ViewId, TopodagError<N>> {
        let state = self.view_state(view)?.clone();
        self.views.push(Some(state));
        let id = ViewId(self.views.len() - 1);
        debug!(source = ?view, view = ?id, "forked view");
        Ok(id)
    }

    /// Deregister `view` and invalidate its handle; any later call through
    /// it (including a second `close`) fails with `ViewClosed`.
    pub fn close(&mut self, view: ViewId) -> Result<(), TopodagError<N>> {
        let slot = self
            .views
            .get_mut(view.0)
            .ok_or(TopodagError::ViewClosed)?;
        if slot.is_none() {
            return Err(TopodagError::ViewClosed);
        }
        *slot = None;
        debug!(view = ?view, "closed view");
        Ok(())
    }

    /// Hand out every node of `view` whose remaining-predecessor count has
    /// reached zero and that has not been yielded yet, marking the batch
    /// yielded. Order within the batch is wake order.
    ///
    /// Fails with `ViewClosed` on a closed handle, `IncoherentView` while
    /// conflicts are outstanding, and — when the graph is dirty — runs the
    /// lazy cycle check first, propagating `CycleDetected` before yielding
    /// anything.
    pub fn ready_in(&mut self, view: ViewId) -> Result<Vec<N>, TopodagError<N>> {
        if !self.view_state(view)?.is_coherent() {
            return Err(TopodagError::IncoherentView);
        }
        if self.dirty {
            if let Some(cycle) = self.find_cycle() {
                return Err(TopodagError::CycleDetected(cycle));
            }
        }
        let state = self.view_state_mut(view)?;
        let batch = state.drain_ready();
        if !batch.is_empty() {
            debug!(view = ?view, batch = ?batch, "yielding ready nodes");
        }
        Ok(batch)
    }

    /// Mark `nodes` done in `view` and wake their successors: every
    /// successor not already yielded or done has its remaining count
    /// decremented, and joins the ready queue on reaching zero.
    ///
    /// All nodes are validated before anything is mutated, so a rejected
    /// call is a true no-op: `UnknownNode` if the graph does not know a
    /// node, `NotYielded` if this view has not yielded it or has already
    /// completed it (a duplicate within one call counts as completed).
    pub fn done_in<I>(&mut self, view: ViewId, nodes: I) -> Result<(), TopodagError<N>>
    where
        I: IntoIterator<Item = N>,
    {
        let nodes: Vec<N> = nodes.into_iter().collect();

        {
            let state = self.view_state(view)?;
            if !state.is_coherent() {
                return Err(TopodagError::IncoherentView);
            }
            let mut seen_in_call: HashSet<&N> = HashSet::new();
            for node in &nodes {
                if !self.table.contains(node) {
                    return Err(TopodagError::UnknownNode(node.clone()));
                }
                if !state.yielded.contains(node) || !seen_in_call.insert(node) {
                    return Err(TopodagError::NotYielded(node.clone()));
                }
            }
        }

        for node in &nodes {
            let Some(state) = self.views.get_mut(view.0).and_then(|slot| slot.as_mut()) else {
                break;
            };
            state.yielded.remove(node);
            state.done.insert(node.clone());
            debug!(view = ?view, node = ?node, "marked done");
            if let Some(info) = self.table.get(node) {
                state.complete_fan_out(info.successors.iter());
            }
        }
        Ok(())
    }

    /// True iff some node remains not-done in `view`. Fails with
    /// `ViewClosed` or `IncoherentView` like the other reads.
    pub fn is_active_in(&self, view: ViewId) -> Result<bool, TopodagError<N>> {
        let state = self.view_state(view)?;
        if !state.is_coherent() {
            return Err(TopodagError::IncoherentView);
        }
        Ok(state.is_active())
    }

    /// Restore `view` to zero progress relative to the graph's *current*
    /// node set. Clears any outstanding conflicts — reset is one of the
    /// ways out of an incoherent state, so only `ViewClosed` applies.
    pub fn reset_in(&mut self, view: ViewId) -> Result<(), TopodagError<N>> {
        self.view_state(view)?;
        let fresh = self.stock.clone();
        if let Some(slot) = self.views.get_mut(view.0) {
            *slot = Some(fresh);
        }
        debug!(view = ?view, "view reset to zero progress");
        Ok(())
    }

    /// Handle of the default view backing the single-consumer proxy
    /// surface and [`static_order`](Self::static_order).
    pub fn default_view(&self) -> ViewId {
        ViewId(0)
    }

    /// Default-view proxy for [`ready_in`](Self::ready_in).
    pub fn ready(&mut self) -> Result<Vec<N>, TopodagError<N>> {
        let view = self.default_view();
        self.ready_in(view)
    }

    /// Default-view proxy for [`done_in`](Self::done_in).
    pub fn done<I>(&mut self, nodes: I) -> Result<(), TopodagError<N>>
    where
        I: IntoIterator<Item = N>,
    {
        let view = self.default_view();
        self.done_in(view, nodes)
    }

    /// Default-view proxy for [`is_active_in`](Self::is_active_in).
    pub fn is_active(&self) -> Result<bool, TopodagError<N>> {
        self.is_active_in(self.default_view())
    }

    /// Default-view proxy for [`reset_in`](Self::reset_in).
    pub fn reset(&mut self) -> Result<(), TopodagError<N>> {
        let view = self.default_view();
        self.reset_in(view)
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn contains(&self, node: &N) -> bool {
        self.table.contains(node)
    }

    /// Registered nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.table.keys()
    }

    /// Direct successors of `node` in insertion order; empty if the node
    /// is unknown.
    pub fn successors_of(&self, node: &N) -> impl Iterator<Item = &N> {
        self.table
            .get(node)
            .into_iter()
            .flat_map(|info| info.successors.iter())
    }

    /// Number of distinct direct predecessors, or `None` if unknown.
    pub fn predecessor_count_of(&self, node: &N) -> Option<usize> {
        self.table.get(node).map(|info| info.predecessor_count)
    }

    /// Whether a cycle re-check is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of live (not closed) views, the default view included.
    pub fn view_count(&self) -> usize {
        self.views.iter().flatten().count()
    }

    pub(crate) fn view_state(&self, view: ViewId) -> Result<&ViewState<N>, TopodagError<N>> {
        self.views
            .get(view.0)
            .and_then(|slot| slot.as_ref())
            .ok_or(TopodagError::ViewClosed)
    }

    pub(crate) fn view_state_mut(
        &mut self,
        view: ViewId,
    ) -> Result<&mut ViewState<N>, TopodagError<N>> {
        self.views
            .get_mut(view.0)
            .and_then(|slot| slot.as_mut())
            .ok_or(TopodagError::ViewClosed)
    }

    fn broadcast_node_created(&mut self, node: &N) {
        self.stock.on_node_created(node);
        for state in self.views.iter_mut().flatten() {
            state.on_node_created(node);
        }
    }

    fn broadcast_edge_created(&mut self, pred: &N, succ: &N) {
        self.stock.on_edge_created(pred, succ);
        for state in self.views.iter_mut().flatten() {
            state.on_edge_created(pred, succ);
        }
    }

    fn broadcast_node_removed(&mut self, node: &N, former_successors: &[N]) {
        self.stock.on_node_removed(node, former_successors);
        for state in self.views.iter_mut().flatten() {
            state.on_node_removed(node, former_successors);
        }
    }
}

impl<N> Default for TopoGraph<N>
where
    N: Eq + Hash + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Clone for TopoGraph<N>
where
    N: Eq + Hash + Clone + fmt::Debug,
{
    /// Clones node/edge storage plus the stock and default views. Other
    /// view slots become closed tombstones in the clone: their handles
    /// keep working on the original and report `ViewClosed` on the clone.
    fn clone(&self) -> Self {
        let mut views: Vec<Option<ViewState<N>>> = vec![None; self.views.len()];
        views[0] = self.views[0].clone();
        Self {
            table: self.table.clone(),
            dirty: self.dirty,
            stock: self.stock.clone(),
            views,
        }
    }
}

impl<N, D> FromIterator<(N, D)> for TopoGraph<N>
where
    N: Eq + Hash + Clone + fmt::Debug,
    D: IntoIterator<Item = N>,
{
    fn from_iter<I: IntoIterator<Item = (N, D)>>(iter: I) -> Self {
        Self::from_dependencies(iter)
    }
}
