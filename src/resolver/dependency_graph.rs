//! Dependency graph between resolved package names.
//!
//! Nodes are case-insensitive package names; an edge `a -> b` means `a`
//! depends on `b`, so `b` must be deployed before `a`.

use anyhow::{Result, anyhow};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::models::name_key;

/// Directed graph of package names.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package with no edges, keeping the first spelling of its name.
    pub fn add_package(&mut self, name: &str) {
        self.ensure_node(name);
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        let key = name_key(name);
        if let Some(&index) = self.node_map.get(&key) {
            index
        } else {
            let index = self.graph.add_node(name.to_string());
            self.node_map.insert(key, index);
            index
        }
    }

    /// Records that `from` depends on `to`.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);
        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Names ordered so that every dependency precedes its dependents.
    ///
    /// Fails naming a package on a cycle if the graph has one.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        let indices = toposort(&self.graph, None).map_err(|cycle| {
            anyhow!("Circular dependency detected at {}", self.graph[cycle.node_id()])
        })?;
        Ok(indices.into_iter().rev().map(|idx| self.graph[idx].clone()).collect())
    }

    /// Number of packages in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
