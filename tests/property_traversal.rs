use std::collections::{BTreeSet, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use proptest::prelude::*;
use topodag::TopoGraph;
use topodag_test_utils::drive::{assert_topological, drive_to_completion};

/// Strategy producing `(node, dependencies)` entries that are acyclic by
/// construction: entry N may only depend on entries 0..N-1.
fn dag_entries(max_nodes: usize) -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    (1..=max_nodes).prop_flat_map(|num_nodes| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_nodes),
            num_nodes,
        )
        .prop_map(move |raw_deps| {
            raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    let mut deps: BTreeSet<usize> = BTreeSet::new();
                    for dep in potential {
                        if i > 0 {
                            deps.insert(dep % i);
                        }
                    }
                    (
                        format!("task_{i}"),
                        deps.into_iter().map(|d| format!("task_{d}")).collect(),
                    )
                })
                .collect()
        })
    })
}

/// Strategy producing an arbitrary directed graph (possibly cyclic) as a
/// node count plus an edge list without self-loops.
fn arbitrary_edges(max_nodes: usize) -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2..=max_nodes).prop_flat_map(|num_nodes| {
        (
            Just(num_nodes),
            proptest::collection::vec((0..num_nodes, 0..num_nodes), 0..=2 * num_nodes)
                .prop_map(|edges| edges.into_iter().filter(|(a, b)| a != b).collect()),
        )
    })
}

fn graph_from_edges(num_nodes: usize, edges: &[(usize, usize)]) -> TopoGraph<usize> {
    let mut graph = TopoGraph::new();
    for node in 0..num_nodes {
        graph.add(node, Vec::new());
    }
    for (pred, succ) in edges {
        graph.add(*succ, [*pred]);
    }
    graph
}

proptest! {
    #[test]
    fn static_order_is_valid_on_random_dags(entries in dag_entries(8)) {
        let mut graph = TopoGraph::from_dependencies(entries);
        let order: Vec<String> = graph.static_order().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(order.len(), graph.node_count());
        assert_topological(&graph, &order);
    }

    #[test]
    fn explicit_view_matches_node_set(entries in dag_entries(8)) {
        let mut graph = TopoGraph::from_dependencies(entries);
        let view = graph.view();
        let order = drive_to_completion(&mut graph, view).unwrap();
        assert_topological(&graph, &order);
        prop_assert!(!graph.is_active_in(view).unwrap());
    }

    #[test]
    fn acyclicity_verdict_matches_petgraph((num_nodes, edges) in arbitrary_edges(8)) {
        let mut graph = graph_from_edges(num_nodes, &edges);

        let mut oracle: DiGraphMap<usize, ()> = DiGraphMap::new();
        for node in 0..num_nodes {
            oracle.add_node(node);
        }
        for (pred, succ) in &edges {
            oracle.add_edge(*pred, *succ, ());
        }

        let ours_cyclic = graph.find_cycle().is_some();
        let oracle_cyclic = toposort(&oracle, None).is_err();
        prop_assert_eq!(ours_cyclic, oracle_cyclic);
    }

    #[test]
    fn extracted_cycle_is_a_real_cycle((num_nodes, edges) in arbitrary_edges(8)) {
        let mut graph = graph_from_edges(num_nodes, &edges);

        if let Some(cycle) = graph.find_cycle() {
            prop_assert!(!cycle.is_empty());
            for window in cycle.windows(2) {
                prop_assert!(
                    graph.successors_of(&window[0]).any(|s| *s == window[1]),
                    "missing edge {} -> {} in extracted cycle {:?}",
                    window[0], window[1], cycle
                );
            }
            let last = *cycle.last().unwrap();
            let first = *cycle.first().unwrap();
            prop_assert!(
                graph.successors_of(&last).any(|s| *s == first),
                "extracted cycle {:?} does not wrap around", cycle
            );
            // A cycle of length one would be a self-loop, which the edge
            // strategy cannot produce.
            prop_assert!(cycle.len() >= 2);
        }
    }

    #[test]
    fn add_order_permutation_preserves_structure(
        (num_nodes, edges, shuffled) in arbitrary_edges(8).prop_flat_map(|(n, edges)| {
            let shuffled = Just(edges.clone()).prop_shuffle();
            (Just(n), Just(edges), shuffled)
        })
    ) {
        let mut one = graph_from_edges(num_nodes, &edges);
        let mut other = graph_from_edges(num_nodes, &shuffled);

        for node in 0..num_nodes {
            let succ_one: HashSet<usize> = one.successors_of(&node).copied().collect();
            let succ_other: HashSet<usize> = other.successors_of(&node).copied().collect();
            prop_assert_eq!(succ_one, succ_other);
            prop_assert_eq!(
                one.predecessor_count_of(&node),
                other.predecessor_count_of(&node)
            );
        }
        prop_assert_eq!(one.find_cycle().is_some(), other.find_cycle().is_some());
    }

    #[test]
    fn two_views_paced_differently_both_complete(entries in dag_entries(8)) {
        let mut graph = TopoGraph::from_dependencies(entries);
        let forward = graph.view();
        let backward = graph.view();

        let forward_order = drive_to_completion(&mut graph, forward).unwrap();

        // Drain the second view completing each batch in reverse order.
        let mut backward_order = Vec::new();
        loop {
            let mut batch = graph.ready_in(backward).unwrap();
            if batch.is_empty() {
                break;
            }
            batch.reverse();
            for node in batch {
                graph.done_in(backward, [node.clone()]).unwrap();
                backward_order.push(node);
            }
        }

        assert_topological(&graph, &forward_order);
        assert_topological(&graph, &backward_order);

        let forward_set: HashSet<&String> = forward_order.iter().collect();
        let backward_set: HashSet<&String> = backward_order.iter().collect();
        prop_assert_eq!(forward_set, backward_set);
    }
}
