use topodag::{TopoGraph, TopodagError};
use topodag_test_utils::builders::GraphBuilder;
use topodag_test_utils::init_tracing;

fn s(v: &str) -> String {
    v.to_string()
}

/// Every consecutive pair in `cycle` must be an edge, and the last node
/// must wrap around to the first.
fn assert_cycle_follows_edges(graph: &TopoGraph<String>, cycle: &[String]) {
    assert!(!cycle.is_empty());
    for pair in cycle.windows(2) {
        assert!(
            graph.successors_of(&pair[0]).any(|succ| *succ == pair[1]),
            "missing edge {:?} -> {:?} in cycle {cycle:?}",
            pair[0],
            pair[1]
        );
    }
    let last = cycle.last().unwrap();
    let first = cycle.first().unwrap();
    assert!(
        graph.successors_of(last).any(|succ| succ == first),
        "cycle {cycle:?} does not wrap around"
    );
}

#[test]
fn self_loop_is_reported_as_a_one_cycle() {
    init_tracing();
    let mut graph = TopoGraph::new();
    graph.add(s("a"), [s("a")]);

    assert_eq!(graph.find_cycle(), Some(vec![s("a")]));

    let view = graph.view();
    assert_eq!(
        graph.ready_in(view),
        Err(TopodagError::CycleDetected(vec![s("a")]))
    );
    assert_eq!(
        graph.static_order().next(),
        Some(Err(TopodagError::CycleDetected(vec![s("a")])))
    );
}

#[test]
fn dirty_only_for_edges_between_existing_nodes() {
    let mut graph = TopoGraph::new();
    graph.add(s("b"), [s("a")]);
    assert!(!graph.is_dirty());
    graph.add(s("c"), [s("a")]);
    assert!(!graph.is_dirty());

    graph.add(s("c"), [s("b")]);
    assert!(graph.is_dirty());

    graph.ensure_acyclic().unwrap();
    assert!(!graph.is_dirty());
}

#[test]
fn ensure_acyclic_carries_the_cycle() {
    let mut graph = GraphBuilder::new().edge("a", "b").build();
    graph.add(s("a"), [s("b")]); // close the loop

    match graph.ensure_acyclic() {
        Err(TopodagError::CycleDetected(cycle)) => {
            assert_eq!(cycle.len(), 2);
            assert_cycle_follows_edges(&graph, &cycle);
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
    // The cycle is still there: the dirty flag must not have been cleared.
    assert!(graph.is_dirty());
}

#[test]
fn ring_with_spurs_reports_only_the_ring() {
    let mut graph = GraphBuilder::new()
        .edge("a", "b")
        .edge("b", "c")
        .edge("c", "d")
        .edge("ring_exit", "downstream")
        .build();
    graph.add(s("a"), [s("d")]); // a -> b -> c -> d -> a
    graph.add(s("ring_exit"), [s("d")]);

    let cycle = graph.find_cycle().expect("ring must be detected");
    assert_eq!(cycle.len(), 4);
    assert!(!cycle.contains(&s("ring_exit")));
    assert!(!cycle.contains(&s("downstream")));
    assert_cycle_follows_edges(&graph, &cycle);
}

#[test]
fn removing_a_cycle_member_restores_acyclicity() {
    let mut graph = GraphBuilder::new().edge("a", "b").build();
    graph.add(s("a"), [s("b")]);
    assert!(graph.find_cycle().is_some());

    graph.remove(&s("a")).unwrap();
    graph.ensure_acyclic().unwrap();
    assert!(!graph.is_dirty());
}

#[test]
fn cycle_introduced_mid_traversal_fails_ready() {
    let mut graph = GraphBuilder::new().edge("a", "b").edge("b", "c").build();
    let view = graph.view();
    assert_eq!(graph.ready_in(view).unwrap(), ["a"]);

    // b <-> c now form a loop behind the already-yielded "a".
    graph.add(s("b"), [s("c")]);

    match graph.ready_in(view) {
        Err(TopodagError::CycleDetected(cycle)) => {
            assert_eq!(cycle.len(), 2);
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }

    // Breaking the loop lets the traversal continue.
    graph.remove(&s("c")).unwrap();
    assert!(graph.ready_in(view).unwrap().is_empty());
    graph.done_in(view, [s("a")]).unwrap();
    assert_eq!(graph.ready_in(view).unwrap(), ["b"]);
}
