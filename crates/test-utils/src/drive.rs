#![allow(dead_code)]

//! Helpers that run traversal views to completion.

use anyhow::Result;
use topodag::{TopoGraph, ViewId};

/// Drive `view` to completion one ready-batch at a time, marking each
/// node done immediately. Returns the nodes in emission order.
pub fn drive_to_completion(graph: &mut TopoGraph<String>, view: ViewId) -> Result<Vec<String>> {
    let mut order = Vec::new();
    loop {
        let batch = graph.ready_in(view)?;
        if batch.is_empty() {
            break;
        }
        for node in batch {
            graph.done_in(view, [node.clone()])?;
            order.push(node);
        }
    }
    Ok(order)
}

/// Advance `view` by a single ready-batch: yield it, mark everything in
/// it done, and return it. An empty result means the view is drained.
pub fn step_once(graph: &mut TopoGraph<String>, view: ViewId) -> Result<Vec<String>> {
    let batch = graph.ready_in(view)?;
    if !batch.is_empty() {
        graph.done_in(view, batch.clone())?;
    }
    Ok(batch)
}

/// Assert that `order` is a permutation of the graph's nodes in which
/// every node appears strictly after all of its dependencies.
pub fn assert_topological(graph: &TopoGraph<String>, order: &[String]) {
    assert_eq!(
        order.len(),
        graph.node_count(),
        "order must cover every node exactly once: {order:?}"
    );
    for (position, node) in order.iter().enumerate() {
        assert_eq!(
            order.iter().filter(|n| *n == node).count(),
            1,
            "node {node:?} appears more than once in {order:?}"
        );
        for succ in graph.successors_of(node) {
            let succ_position = order
                .iter()
                .position(|n| n == succ)
                .unwrap_or_else(|| panic!("successor {succ:?} missing from {order:?}"));
            assert!(
                position < succ_position,
                "{node:?} must precede its dependent {succ:?} in {order:?}"
            );
        }
    }
}
