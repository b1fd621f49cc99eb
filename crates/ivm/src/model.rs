use crate::error::Result;
use crate::geometry::{BoundingBox, Vec3};
use chrono::{DateTime, Utc};
use codescape_graph::{EdgeKind, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Version of the wire format, embedded in every produced graph
pub const IVM_SCHEMA_VERSION: &str = "1.0.0";

/// Optional rendering hints; renderers are free to ignore them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<i64>,
    /// Abstraction depth (hops from the nearest entry point)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Everything else the graph carried for this node
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl NodeMetadata {
    pub fn extra_bool(&self, key: &str) -> bool {
        self.extra
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Default for EdgeMetadata {
    fn default() -> Self {
        Self {
            label: None,
            weight: default_weight(),
            extra: Map::new(),
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationNode {
    pub id: String,
    pub kind: NodeKind,
    pub position: Vec3,
    pub lod: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub metadata: NodeMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
}

impl VisualizationNode {
    /// Package nodes standing in for external imports
    pub fn is_external(&self) -> bool {
        self.metadata.extra_bool("external")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub lod: u8,
    #[serde(default)]
    pub metadata: EdgeMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub nodes_by_kind: BTreeMap<String, usize>,
    pub edges_by_kind: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub name: String,
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_path: Option<String>,
    pub stats: ModelStats,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl GraphMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_version: IVM_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            root_path: None,
            stats: ModelStats::default(),
            languages: Vec::new(),
        }
    }
}

/// The renderer-agnostic visualization model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationGraph {
    pub nodes: Vec<VisualizationNode>,
    pub edges: Vec<VisualizationEdge>,
    pub metadata: GraphMetadata,
    pub bounds: BoundingBox,
}

impl VisualizationGraph {
    /// Empty graph with current schema version and zero bounds
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata: GraphMetadata::new(name),
            bounds: BoundingBox::zero(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&VisualizationNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut VisualizationNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&VisualizationEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Nodes whose `parent` is `id`, in model order
    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a VisualizationNode> {
        self.nodes
            .iter()
            .filter(move |n| n.parent.as_deref() == Some(id))
    }

    /// `id` and its direct children as a standalone graph.
    ///
    /// The focused node becomes a root and only edges between kept nodes
    /// survive, so a single class focuses down to a cell. `None` when `id`
    /// is not in the graph.
    pub fn focus_on(&self, id: &str) -> Option<Self> {
        self.node(id)?;
        let keep: HashSet<&str> = std::iter::once(id)
            .chain(self.children_of(id).map(|n| n.id.as_str()))
            .collect();

        let nodes = self
            .nodes
            .iter()
            .filter(|n| keep.contains(n.id.as_str()))
            .map(|n| {
                let mut node = n.clone();
                if node.id == id {
                    node.parent = None;
                }
                node
            })
            .collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| keep.contains(e.source.as_str()) && keep.contains(e.target.as_str()))
            .cloned()
            .collect();

        let mut focused = Self {
            nodes,
            edges,
            metadata: self.metadata.clone(),
            bounds: BoundingBox::zero(),
        };
        focused.recompute_stats();
        focused.recompute_bounds();
        Some(focused)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &VisualizationNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn recompute_stats(&mut self) {
        let mut stats = ModelStats {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            ..ModelStats::default()
        };
        for node in &self.nodes {
            *stats
                .nodes_by_kind
                .entry(node.kind.as_str().to_string())
                .or_default() += 1;
        }
        for edge in &self.edges {
            *stats
                .edges_by_kind
                .entry(edge.kind.as_str().to_string())
                .or_default() += 1;
        }
        self.metadata.stats = stats;
    }

    /// Bounds over every node position; an empty graph gets the zero box
    pub fn recompute_bounds(&mut self) {
        self.bounds = BoundingBox::from_points(self.nodes.iter().map(|n| n.position));
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
