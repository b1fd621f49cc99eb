use crate::error::{GraphError, Result};
use crate::types::{DependencyGraph, DependencyNode, EdgeKind, NodeKind};
use petgraph::algo::{astar, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate counts over a graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: BTreeMap<String, usize>,
    pub edges_by_kind: BTreeMap<String, usize>,
    pub issue_count: usize,
}

impl DependencyGraph {
    /// Outgoing neighbours over edges of one kind
    #[must_use]
    pub fn targets_of(&self, node: NodeIndex, kind: EdgeKind) -> Vec<NodeIndex> {
        self.graph
            .edges(node)
            .filter(|e| e.weight().kind == kind)
            .map(|e| e.target())
            .collect()
    }

    /// Incoming neighbours over edges of one kind
    #[must_use]
    pub fn sources_of(&self, node: NodeIndex, kind: EdgeKind) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .filter(|e| e.weight().kind == kind)
            .map(|e| e.source())
            .collect()
    }

    /// Structural children (outgoing `contains`)
    #[must_use]
    pub fn children(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut children = self.targets_of(node, EdgeKind::Contains);
        // petgraph walks adjacency newest-first
        children.sort();
        children
    }

    /// Structural parent: source of the first `contains` edge into `node`
    #[must_use]
    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .filter(|e| e.weight().kind == EdgeKind::Contains)
            .min_by_key(|e| e.id())
            .map(|e| e.source())
    }

    /// Find all nodes the current node calls (outgoing `calls` edges)
    #[must_use]
    pub fn callees(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.targets_of(node, EdgeKind::Calls)
    }

    /// Find all nodes calling the current node (incoming `calls` edges)
    #[must_use]
    pub fn callers(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.sources_of(node, EdgeKind::Calls)
    }

    /// Files imported by a file
    #[must_use]
    pub fn imports_of(&self, file: NodeIndex) -> Vec<NodeIndex> {
        self.targets_of(file, EdgeKind::Imports)
    }

    /// Files importing a file
    #[must_use]
    pub fn importers_of(&self, file: NodeIndex) -> Vec<NodeIndex> {
        self.sources_of(file, EdgeKind::Imports)
    }

    /// Nodes of one kind, in insertion order
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &DependencyNode> {
        self.nodes().filter(move |node| node.kind == kind)
    }

    /// Shortest path over any edge kind, each edge costing one hop
    #[must_use]
    pub fn find_path(&self, from: NodeIndex, to: NodeIndex) -> Option<Vec<NodeIndex>> {
        astar(&self.graph, from, |n| n == to, |_| 1usize, |_| 0)
            .map(|(_cost, path)| path)
    }

    /// Shortest path between two node ids
    pub fn find_path_by_id(&self, from: &str, to: &str) -> Result<Option<Vec<String>>> {
        let from_idx = self
            .node_index(from)
            .ok_or_else(|| GraphError::NodeNotFound(from.to_string()))?;
        let to_idx = self
            .node_index(to)
            .ok_or_else(|| GraphError::NodeNotFound(to.to_string()))?;

        Ok(self.find_path(from_idx, to_idx).map(|path| {
            path.into_iter()
                .filter_map(|idx| self.node(idx).map(|n| n.id.clone()))
                .collect()
        }))
    }

    /// Get coupling score for a node (total edges in + out)
    #[must_use]
    pub fn coupling_score(&self, node: NodeIndex) -> usize {
        let outgoing = self.graph.edges(node).count();
        let incoming = self.graph.edges_directed(node, Direction::Incoming).count();
        outgoing + incoming
    }

    /// Highest-coupling nodes; ties keep insertion order
    #[must_use]
    pub fn hotspots(&self, limit: usize) -> Vec<(NodeIndex, usize)> {
        let mut scores: Vec<(NodeIndex, usize)> = self
            .graph
            .node_indices()
            .map(|n| (n, self.coupling_score(n)))
            .collect();

        scores.sort_by(|a, b| b.1.cmp(&a.1));
        scores.truncate(limit);
        scores
    }

    /// Import cycles: strongly connected components of the `imports`
    /// subgraph with more than one file, as sorted node id lists
    #[must_use]
    pub fn import_cycles(&self) -> Vec<Vec<String>> {
        let mut imports: DiGraph<(), ()> =
            DiGraph::with_capacity(self.graph.node_count(), self.graph.edge_count());
        for _ in self.graph.node_indices() {
            imports.add_node(());
        }
        for edge in self.graph.edge_references() {
            if edge.weight().kind == EdgeKind::Imports {
                imports.add_edge(edge.source(), edge.target(), ());
            }
        }

        let mut cycles: Vec<Vec<NodeIndex>> = tarjan_scc(&imports)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|mut component| {
                component.sort();
                component
            })
            .collect();
        cycles.sort();

        cycles
            .into_iter()
            .map(|component| {
                component
                    .into_iter()
                    .filter_map(|idx| self.node(idx).map(|n| n.id.clone()))
                    .collect()
            })
            .collect()
    }

    /// Get statistics about the graph
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            issue_count: self.issues().len(),
            ..GraphStats::default()
        };
        for node in self.nodes() {
            *stats
                .nodes_by_kind
                .entry(node.kind.as_str().to_string())
                .or_insert(0) += 1;
        }
        for edge in self.edges() {
            *stats
                .edges_by_kind
                .entry(edge.kind.as_str().to_string())
                .or_insert(0) += 1;
        }
        stats
    }
}
