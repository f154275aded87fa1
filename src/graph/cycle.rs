// src/graph/cycle.rs

//! Lazy cycle detection.
//!
//! A Kahn-style forward sweep computes the maximal "doable" subset of the
//! graph; any node left over participates in a cycle or is reachable only
//! through one. An explicit work-stack depth-first search over the
//! leftover nodes then extracts one concrete cycle. The search is
//! deliberately recursion-free, so pathological graphs cannot blow the
//! call stack.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;

use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::errors::TopodagError;
use crate::graph::topo::TopoGraph;

impl<N> TopoGraph<N>
where
    N: Eq + Hash + Clone + fmt::Debug,
{
    /// Returns one concrete cycle, or `None` when the graph is acyclic.
    ///
    /// The cycle is an ordered node sequence: each element has an edge to
    /// the next and the last wraps around to the first, so a self-loop
    /// comes out as a one-element sequence. Clears the dirty flag only
    /// when no cycle is found.
    pub fn find_cycle(&mut self) -> Option<Vec<N>> {
        let leftover = self.undoable_subset();
        if leftover.is_empty() {
            self.dirty = false;
            return None;
        }

        match self.extract_cycle(&leftover) {
            Some(cycle) => {
                debug!(cycle = ?cycle, "cycle found");
                Some(cycle)
            }
            None => {
                // The leftover subset always contains a cycle; reaching
                // this arm would mean the predecessor counts are corrupt.
                warn!(leftover = ?leftover, "sweep left nodes behind but no cycle was extracted");
                Some(leftover.into_iter().collect())
            }
        }
    }

    /// Runs the cycle check only when the dirty flag warrants it; fails
    /// with `CycleDetected` (carrying the cycle) if one exists.
    pub fn ensure_acyclic(&mut self) -> Result<(), TopodagError<N>> {
        if !self.dirty {
            return Ok(());
        }
        match self.find_cycle() {
            Some(cycle) => Err(TopodagError::CycleDetected(cycle)),
            None => Ok(()),
        }
    }

    /// Kahn-style forward sweep: repeatedly "complete" nodes whose
    /// remaining count is zero. Returns the nodes that never became
    /// doable, in table order.
    fn undoable_subset(&self) -> IndexSet<N> {
        let mut in_degree: HashMap<&N, usize> = HashMap::with_capacity(self.table.len());
        let mut queue: VecDeque<&N> = VecDeque::new();

        for (node, info) in self.table.iter() {
            in_degree.insert(node, info.predecessor_count);
            if info.predecessor_count == 0 {
                queue.push_back(node);
            }
        }

        while let Some(node) = queue.pop_front() {
            if let Some(info) = self.table.get(node) {
                for succ in &info.successors {
                    if let Some(degree) = in_degree.get_mut(succ) {
                        *degree = degree.saturating_sub(1);
                        if *degree == 0 {
                            queue.push_back(succ);
                        }
                    }
                }
            }
        }

        self.table
            .keys()
            .filter(|node| in_degree.get(*node).is_some_and(|degree| *degree > 0))
            .cloned()
            .collect()
    }

    /// Depth-first search restricted to the leftover subset, with an
    /// explicit stack of `(node, next successor position)` frames instead
    /// of recursion. The first node seen twice on the active path closes
    /// the cycle.
    fn extract_cycle(&self, leftover: &IndexSet<N>) -> Option<Vec<N>> {
        let mut visited: HashSet<&N> = HashSet::new();

        for start in leftover {
            if visited.contains(start) {
                continue;
            }

            let mut stack: Vec<(&N, usize)> = vec![(start, 0)];
            let mut on_stack: HashSet<&N> = HashSet::from([start]);

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                let position = frame.1;
                frame.1 += 1;

                let successor = self
                    .table
                    .get(node)
                    .and_then(|info| info.successors.get_index(position));

                match successor {
                    Some(succ) if leftover.contains(succ) => {
                        if on_stack.contains(succ) {
                            let first = stack
                                .iter()
                                .position(|(n, _)| *n == succ)
                                .unwrap_or(0);
                            return Some(
                                stack[first..].iter().map(|(n, _)| (*n).clone()).collect(),
                            );
                        }
                        if !visited.contains(succ) {
                            on_stack.insert(succ);
                            stack.push((succ, 0));
                        }
                    }
                    // A successor outside the leftover subset was already
                    // proven doable and cannot sit on a cycle.
                    Some(_) => {}
                    None => {
                        if let Some((finished, _)) = stack.pop() {
                            on_stack.remove(finished);
                            visited.insert(finished);
                        }
                    }
                }
            }
        }

        None
    }
}
