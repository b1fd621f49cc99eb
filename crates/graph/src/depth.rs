//! Abstraction depth: how many `imports` hops a file sits below the
//! nearest entry point.

use crate::error::Result;
use crate::types::{DependencyGraph, EdgeKind, NodeKind};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// File stems treated as entry points by default
pub const DEFAULT_ENTRY_PATTERN: &str = r"(?i)^(index|main|app|server|entry)$";

/// Matches file stems (`src/server.ts` -> `server`) against an entry pattern
#[derive(Debug, Clone)]
pub struct EntryPointMatcher {
    pattern: Regex,
}

impl EntryPointMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn with_default_names() -> Result<Self> {
        Self::new(DEFAULT_ENTRY_PATTERN)
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(file_stem(path))
    }
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rfind('.').map_or(name, |dot| &name[..dot])
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractionDepth {
    /// File node id → depth
    pub depths: BTreeMap<String, usize>,
    pub entry_points: Vec<String>,
    /// Files no entry point reaches; they sit at `max_depth + 1`
    pub orphans: Vec<String>,
    /// Largest depth reached by the traversal
    pub max_depth: usize,
}

impl AbstractionDepth {
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.depths.get(id).copied()
    }

    pub fn is_entry_point(&self, id: &str) -> bool {
        self.entry_points.iter().any(|e| e == id)
    }

    pub fn is_orphan(&self, id: &str) -> bool {
        self.orphans.iter().any(|o| o == id)
    }
}

/// Compute depth over file nodes and `imports` edges.
///
/// Entry points come from the first rule that selects anything:
/// 1. stem matches the entry pattern
/// 2. no incoming imports, among files that take part in imports at all
/// 3. root-level files
/// 4. every file
///
/// External package nodes are never entry points but are reachable.
pub fn compute_abstraction_depth(
    graph: &DependencyGraph,
    matcher: &EntryPointMatcher,
) -> AbstractionDepth {
    let files: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|&idx| graph.node(idx).is_some_and(|n| n.kind == NodeKind::File))
        .collect();
    if files.is_empty() {
        return AbstractionDepth::default();
    }

    let candidates: Vec<NodeIndex> = files
        .iter()
        .copied()
        .filter(|&idx| graph.node(idx).is_some_and(|n| !n.is_external()))
        .collect();

    let entries = select_entry_points(graph, &candidates, matcher);

    let mut depth: Vec<Option<usize>> = vec![None; graph.node_count()];
    let mut queue = VecDeque::new();
    for &entry in &entries {
        depth[entry.index()] = Some(0);
        queue.push_back(entry);
    }

    while let Some(current) = queue.pop_front() {
        let next = depth[current.index()].map_or(0, |d| d + 1);
        let mut targets: Vec<NodeIndex> = graph
            .inner()
            .edges(current)
            .filter(|e| e.weight().kind == EdgeKind::Imports)
            .map(|e| e.target())
            .collect();
        // Adjacency is newest-first; visit in insertion order
        targets.sort();
        for target in targets {
            if depth[target.index()].is_none() {
                depth[target.index()] = Some(next);
                queue.push_back(target);
            }
        }
    }

    let max_depth = files
        .iter()
        .filter_map(|idx| depth[idx.index()])
        .max()
        .unwrap_or(0);

    let mut result = AbstractionDepth {
        max_depth,
        ..AbstractionDepth::default()
    };
    for &idx in &files {
        let Some(node) = graph.node(idx) else {
            continue;
        };
        let value = match depth[idx.index()] {
            Some(d) => d,
            None => {
                result.orphans.push(node.id.clone());
                max_depth + 1
            }
        };
        result.depths.insert(node.id.clone(), value);
    }
    result.entry_points = entries
        .iter()
        .filter_map(|&idx| graph.node(idx).map(|n| n.id.clone()))
        .collect();

    result
}

fn select_entry_points(
    graph: &DependencyGraph,
    files: &[NodeIndex],
    matcher: &EntryPointMatcher,
) -> Vec<NodeIndex> {
    let by_name: Vec<NodeIndex> = files
        .iter()
        .copied()
        .filter(|&idx| graph.node(idx).is_some_and(|n| matcher.matches(&n.path)))
        .collect();
    if !by_name.is_empty() {
        return by_name;
    }

    let import_count = |idx: NodeIndex, dir: Direction| {
        graph
            .inner()
            .edges_directed(idx, dir)
            .filter(|e| e.weight().kind == EdgeKind::Imports)
            .count()
    };
    let roots: Vec<NodeIndex> = files
        .iter()
        .copied()
        .filter(|&idx| {
            let incoming = import_count(idx, Direction::Incoming);
            let outgoing = import_count(idx, Direction::Outgoing);
            incoming == 0 && outgoing > 0
        })
        .collect();
    if !roots.is_empty() {
        return roots;
    }

    let root_level: Vec<NodeIndex> = files
        .iter()
        .copied()
        .filter(|&idx| graph.node(idx).is_some_and(|n| !n.path.contains('/')))
        .collect();
    if !root_level.is_empty() {
        return root_level;
    }

    files.to_vec()
}
