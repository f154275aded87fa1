// src/graph/static_order.rs

//! One full topological order, produced by driving the default view.

use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;

use crate::errors::TopodagError;
use crate::graph::topo::TopoGraph;

impl<N> TopoGraph<N>
where
    N: Eq + Hash + Clone + fmt::Debug,
{
    /// Lazy iterator over one valid topological order of the current
    /// graph.
    ///
    /// This is not a separate algorithm: the iterator resets the default
    /// view and then drives it through the `ready`/`done` protocol,
    /// marking each node done as it is produced. Consuming it therefore
    /// replaces any progress the default-view proxy had accumulated, and
    /// leaves the default view fully done; dropping it midway leaves the
    /// default view partially advanced. Callers that need their proxy
    /// progress preserved should drive an explicit [`view`](Self::view)
    /// instead.
    ///
    /// A cycle surfaces as a single `Err(CycleDetected)`, after which the
    /// iterator is exhausted. The sequence is finite and non-restartable;
    /// call `static_order` again for a fresh traversal.
    pub fn static_order(&mut self) -> StaticOrder<'_, N> {
        let view = self.default_view();
        let pending_error = self.reset_in(view).err();
        StaticOrder {
            graph: self,
            buffer: VecDeque::new(),
            pending_error,
            finished: false,
        }
    }
}

/// Iterator returned by [`TopoGraph::static_order`].
#[derive(Debug)]
pub struct StaticOrder<'g, N: fmt::Debug> {
    graph: &'g mut TopoGraph<N>,
    buffer: VecDeque<N>,
    pending_error: Option<TopodagError<N>>,
    finished: bool,
}

impl<N> Iterator for StaticOrder<'_, N>
where
    N: Eq + Hash + Clone + fmt::Debug,
{
    type Item = Result<N, TopodagError<N>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Some(err) = self.pending_error.take() {
            self.finished = true;
            return Some(Err(err));
        }

        if self.buffer.is_empty() {
            let view = self.graph.default_view();
            match self.graph.ready_in(view) {
                Ok(batch) if batch.is_empty() => {
                    self.finished = true;
                    return None;
                }
                Ok(batch) => self.buffer = batch.into(),
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }

        let node = self.buffer.pop_front()?;
        let view = self.graph.default_view();
        if let Err(err) = self.graph.done_in(view, [node.clone()]) {
            self.finished = true;
            return Some(Err(err));
        }
        Some(Ok(node))
    }
}

impl<N> std::iter::FusedIterator for StaticOrder<'_, N> where N: Eq + Hash + Clone + fmt::Debug {}
