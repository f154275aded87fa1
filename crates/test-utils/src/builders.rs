#![allow(dead_code)]

use topodag::TopoGraph;

/// Builder assembling a `TopoGraph<String>` from named nodes and edges,
/// to simplify test setup.
pub struct GraphBuilder {
    entries: Vec<(String, Vec<String>)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a node without dependencies.
    pub fn node(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), Vec::new()));
        self
    }

    /// Register `node` with a single dependency (an edge `dep -> node`).
    pub fn edge(mut self, dep: &str, node: &str) -> Self {
        self.entries.push((node.to_string(), vec![dep.to_string()]));
        self
    }

    /// Register `node` with the given dependency list.
    pub fn deps(mut self, node: &str, deps: &[&str]) -> Self {
        self.entries.push((
            node.to_string(),
            deps.iter().map(|d| d.to_string()).collect(),
        ));
        self
    }

    pub fn build(self) -> TopoGraph<String> {
        TopoGraph::from_dependencies(self.entries)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
