//! Deploy ordering for a finished package.
//!
//! Builds a directed graph from the dependency edges recorded on each asset
//! and orders the package so every object comes after everything it
//! references. Cycles (an email embedding a block that embeds the email)
//! cannot be deployed in one pass and are reported with the assets involved.

use anyhow::{Result, anyhow};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use super::Package;
use crate::core::{BldrError, ContextTag};

/// One package object in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageNode {
    /// Bucket the object lives in
    pub context: ContextTag,
    /// Package-local id
    pub bldr_id: String,
}

impl PackageNode {
    /// Node for `bldr_id` in `context`.
    pub fn new(context: ContextTag, bldr_id: impl Into<String>) -> Self {
        Self {
            context,
            bldr_id: bldr_id.into(),
        }
    }
}

impl fmt::Display for PackageNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.context, self.bldr_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Reference graph over package objects.
///
/// An edge `a → b` means `a` references `b`, so `b` must be deployed first.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<PackageNode, ()>,
    node_map: HashMap<PackageNode, NodeIndex>,
    labels: HashMap<PackageNode, String>,
}

impl DependencyGraph {
    /// An empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph of every object in `package` and every recorded edge.
    ///
    /// Edges to objects missing from the package still add the target node.
    #[must_use]
    pub fn from_package(package: &Package) -> Self {
        let mut graph = Self::new();
        for (context, bucket) in package.iter() {
            for asset in bucket.assets() {
                let node = PackageNode::new(context, asset.bldr_id.clone());
                graph.labels.insert(node.clone(), asset.name.clone());
                graph.ensure_node(node);
            }
        }
        for (context, bucket) in package.iter() {
            for asset in bucket.assets() {
                let from = PackageNode::new(context, asset.bldr_id.clone());
                for edge in &asset.dependencies {
                    let to = PackageNode::new(edge.context, edge.bldr_id.clone());
                    graph.add_dependency(from.clone(), to);
                }
            }
        }
        graph
    }

    fn ensure_node(&mut self, node: PackageNode) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&node) {
            index
        } else {
            let index = self.graph.add_node(node.clone());
            self.node_map.insert(node, index);
            index
        }
    }

    /// Record that `from` references `to`.
    pub fn add_dependency(&mut self, from: PackageNode, to: PackageNode) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Display label: the object's name when known, otherwise the node itself.
    #[must_use]
    pub fn label(&self, node: &PackageNode) -> String {
        self.labels.get(node).cloned().unwrap_or_else(|| node.to_string())
    }

    /// Fail with the cycle path if any object reaches itself.
    pub fn detect_cycles(&self) -> Result<()> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|n| (n, Color::White)).collect();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White))
                && let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path)
            {
                let cycle_str = cycle
                    .iter()
                    .map(|&idx| self.label(&self.graph[idx]))
                    .collect::<Vec<_>>()
                    .join(" → ");
                return Err(BldrError::PackageError {
                    reason: format!("Circular reference detected: {cycle_str}"),
                }
                .into());
            }
        }

        Ok(())
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for neighbor in self.graph.neighbors(node) {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let start = path.iter().position(|&n| n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// Every node, referenced objects before the objects referencing them.
    pub fn deploy_order(&self) -> Result<Vec<PackageNode>> {
        self.detect_cycles()?;

        let indices = toposort(&self.graph, None)
            .map_err(|_| anyhow!("Failed to determine deploy order"))?;
        Ok(indices.into_iter().rev().map(|idx| self.graph[idx].clone()).collect())
    }

    /// Everything `node` references, directly or indirectly.
    #[must_use]
    pub fn transitive_dependencies(&self, node: &PackageNode) -> HashSet<PackageNode> {
        let mut deps = HashSet::new();
        let mut queue = VecDeque::new();

        if let Some(&start) = self.node_map.get(node) {
            queue.push_back(start);
            while let Some(current) = queue.pop_front() {
                for neighbor in self.graph.neighbors(current) {
                    if deps.insert(self.graph[neighbor].clone()) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        deps
    }

    /// Number of objects.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct references.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
