// src/graph/storage.rs

//! Node and edge storage.
//!
//! The table maps each node to its predecessor count and successor set.
//! Invariant: a node's `predecessor_count` equals the number of distinct
//! other rows whose successor set contains it.

use std::fmt;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

/// Per-node adjacency record.
#[derive(Debug, Clone)]
pub struct NodeInfo<N> {
    /// Number of distinct direct predecessors.
    pub predecessor_count: usize,
    /// Direct successors. Insertion-ordered so that the order in which
    /// dependents are woken is deterministic.
    pub successors: IndexSet<N>,
}

impl<N> NodeInfo<N> {
    fn unconnected() -> Self {
        Self {
            predecessor_count: 0,
            successors: IndexSet::new(),
        }
    }
}

/// The graph's canonical node table.
///
/// Keyed by the caller's node values; iteration order is insertion order,
/// which keeps baseline seeding and cycle sweeps reproducible.
#[derive(Debug, Clone)]
pub struct NodeTable<N> {
    nodes: IndexMap<N, NodeInfo<N>>,
}

impl<N> NodeTable<N>
where
    N: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: &N) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn get(&self, node: &N) -> Option<&NodeInfo<N>> {
        self.nodes.get(node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&N, &NodeInfo<N>)> {
        self.nodes.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &N> {
        self.nodes.keys()
    }

    /// Register `node` if it is new. Returns `true` when a row was created.
    pub fn ensure_node(&mut self, node: &N) -> bool {
        if self.nodes.contains_key(node) {
            return false;
        }
        self.nodes.insert(node.clone(), NodeInfo::unconnected());
        true
    }

    /// Add the edge `pred -> succ` if absent. Returns `true` when the edge
    /// was newly added. Both endpoints must already be registered; linking
    /// through an unregistered endpoint is a no-op.
    pub fn link(&mut self, pred: &N, succ: &N) -> bool {
        let Some(info) = self.nodes.get_mut(pred) else {
            return false;
        };
        if !info.successors.insert(succ.clone()) {
            return false;
        }
        if let Some(succ_info) = self.nodes.get_mut(succ) {
            succ_info.predecessor_count += 1;
        }
        true
    }

    /// Drop `node` and every edge touching it. Returns the former
    /// successors in order (self-edges excluded), or `None` if the node is
    /// unknown — in which case nothing is mutated.
    ///
    /// Predecessors are found by scanning the whole table: removal is O(n)
    /// by design, keeping `add` and view creation cheap.
    pub fn unlink(&mut self, node: &N) -> Option<Vec<N>> {
        let info = self.nodes.shift_remove(node)?;
        let former: Vec<N> = info
            .successors
            .into_iter()
            .filter(|succ| succ != node)
            .collect();

        // Prune the node from every predecessor's successor set.
        for other in self.nodes.values_mut() {
            other.successors.shift_remove(node);
        }

        for succ in &former {
            if let Some(succ_info) = self.nodes.get_mut(succ) {
                succ_info.predecessor_count = succ_info.predecessor_count.saturating_sub(1);
            }
        }

        Some(former)
    }
}
