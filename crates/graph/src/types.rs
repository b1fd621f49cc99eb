use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Kind of entity a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Directory,
    Class,
    AbstractClass,
    Interface,
    Function,
    Method,
    Variable,
    Enum,
    /// Anything a newer producer emitted that this build does not know
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    pub const ALL: [Self; 9] = [
        Self::File,
        Self::Directory,
        Self::Class,
        Self::AbstractClass,
        Self::Interface,
        Self::Function,
        Self::Method,
        Self::Variable,
        Self::Enum,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Class => "class",
            Self::AbstractClass => "abstract_class",
            Self::Interface => "interface",
            Self::Function => "function",
            Self::Method => "method",
            Self::Variable => "variable",
            Self::Enum => "enum",
            Self::Unknown => "unknown",
        }
    }

    /// Classes, abstract classes and interfaces
    pub const fn is_class_like(self) -> bool {
        matches!(self, Self::Class | Self::AbstractClass | Self::Interface)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Structural parent → child
    Contains,
    /// File → imported file
    Imports,
    /// Class → base class, interface → base interface
    Extends,
    /// Class → interface
    Implements,
    /// Caller → callee (best effort, name based)
    Calls,
    DependsOn,
    #[serde(other)]
    Unknown,
}

impl EdgeKind {
    pub const ALL: [Self; 6] = [
        Self::Contains,
        Self::Imports,
        Self::Extends,
        Self::Implements,
        Self::Calls,
        Self::DependsOn,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Imports => "imports",
            Self::Extends => "extends",
            Self::Implements => "implements",
            Self::Calls => "calls",
            Self::DependsOn => "depends_on",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl DependencyNode {
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            path: path.into(),
            metadata: Map::new(),
        }
    }

    #[must_use]
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn set_meta(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn meta_u64(&self, key: &str) -> Option<u64> {
        self.meta(key).and_then(Value::as_u64)
    }

    pub fn meta_bool(&self, key: &str) -> bool {
        self.meta(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Package nodes created for external imports
    pub fn is_external(&self) -> bool {
        self.meta_bool("external")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl DependencyEdge {
    pub fn new(kind: EdgeKind, source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: ids::edge(kind, &source, &target),
            source,
            target,
            kind,
            metadata: Map::new(),
        }
    }

    #[must_use]
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// A per-file problem that degraded, but did not abort, a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildIssue {
    pub path: String,
    pub message: String,
}

/// Node and edge id scheme
pub mod ids {
    use super::EdgeKind;

    pub fn file(path: &str) -> String {
        format!("file:{path}")
    }

    pub fn directory(path: &str) -> String {
        format!("dir:{path}")
    }

    pub fn class(path: &str, name: &str) -> String {
        format!("class:{path}#{name}")
    }

    pub fn interface(path: &str, name: &str) -> String {
        format!("interface:{path}#{name}")
    }

    pub fn enumeration(path: &str, name: &str) -> String {
        format!("enum:{path}#{name}")
    }

    pub fn function(path: &str, name: &str) -> String {
        format!("function:{path}#{name}")
    }

    pub fn method(path: &str, class: &str, name: &str) -> String {
        format!("method:{path}#{class}.{name}")
    }

    /// `owner` is the declaring class for properties, `None` for module bindings
    pub fn variable(path: &str, owner: Option<&str>, name: &str) -> String {
        match owner {
            Some(owner) => format!("variable:{path}#{owner}.{name}"),
            None => format!("variable:{path}#{name}"),
        }
    }

    pub fn external(package: &str) -> String {
        format!("external:{package}")
    }

    pub fn edge(kind: EdgeKind, source: &str, target: &str) -> String {
        format!("{}:{source}->{target}", kind.as_str())
    }
}

/// Code dependency graph.
///
/// Arena model: every node gets a dense [`NodeIndex`] on insertion and
/// adjacency lives in the underlying `petgraph` graph. Node ids are unique;
/// inserting an id twice returns the first index. Since nothing is ever
/// removed, index order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub(crate) graph: DiGraph<DependencyNode, DependencyEdge>,
    index: HashMap<String, NodeIndex>,
    edge_ids: HashSet<String>,
    issues: Vec<BuildIssue>,
    languages: BTreeSet<String>,
}

impl DependencyGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, or return the index of the node already carrying its id
    pub fn add_node(&mut self, node: DependencyNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        idx
    }

    /// Add an edge between existing nodes.
    ///
    /// Returns `None` when either endpoint is missing or an edge with the
    /// same id already exists.
    pub fn add_edge(&mut self, edge: DependencyEdge) -> Option<EdgeIndex> {
        if self.edge_ids.contains(&edge.id) {
            return None;
        }
        let from = self.node_index(&edge.source)?;
        let to = self.node_index(&edge.target)?;
        self.edge_ids.insert(edge.id.clone());
        Some(self.graph.add_edge(from, to, edge))
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&DependencyNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_by_id(&self, id: &str) -> Option<&DependencyNode> {
        self.node_index(id).and_then(|idx| self.node(idx))
    }

    pub fn node_by_id_mut(&mut self, id: &str) -> Option<&mut DependencyNode> {
        let idx = self.node_index(id)?;
        self.graph.node_weight_mut(idx)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.graph.node_weights()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.graph.edge_references().map(|e| e.weight())
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn record_issue(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(BuildIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn issues(&self) -> &[BuildIssue] {
        &self.issues
    }

    pub fn add_language(&mut self, language: impl Into<String>) {
        self.languages.insert(language.into());
    }

    /// Languages seen during the build, sorted
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(String::as_str)
    }

    /// Underlying petgraph graph, for algorithms not wrapped here
    pub fn inner(&self) -> &DiGraph<DependencyNode, DependencyEdge> {
        &self.graph
    }
}
