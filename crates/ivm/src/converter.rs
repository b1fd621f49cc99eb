use crate::geometry::{BoundingBox, Vec3};
use crate::lod::default_lod;
use crate::model::{
    EdgeMetadata, GraphMetadata, NodeMetadata, NodeStyle, VisualizationEdge, VisualizationGraph,
    VisualizationNode, IVM_SCHEMA_VERSION,
};
use chrono::{DateTime, Utc};
use codescape_graph::{DependencyGraph, DependencyNode};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Keys lifted out of graph metadata into typed [`NodeMetadata`] fields
const LIFTED_KEYS: [&str; 4] = ["loc", "complexity", "depth", "language"];

#[derive(Debug, Clone)]
pub struct ConverterOptions {
    pub name: String,
    pub root_path: Option<String>,
    /// Fixed timestamp for reproducible output; `None` means now
    pub generated_at: Option<DateTime<Utc>>,
    /// Caller-assigned starting positions by node id
    pub initial_positions: BTreeMap<String, Vec3>,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            name: "codescape".to_string(),
            root_path: None,
            generated_at: None,
            initial_positions: BTreeMap::new(),
        }
    }
}

/// Maps a [`DependencyGraph`] onto the visualization model
#[derive(Debug, Clone, Default)]
pub struct ModelConverter {
    options: ConverterOptions,
}

impl ModelConverter {
    pub fn new(options: ConverterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    pub fn convert(&self, graph: &DependencyGraph) -> VisualizationGraph {
        let mut nodes = Vec::with_capacity(graph.node_count());
        let mut lods: HashMap<&str, u8> = HashMap::with_capacity(graph.node_count());

        for idx in graph.node_indices() {
            let Some(node) = graph.node(idx) else {
                continue;
            };
            let parent = graph
                .parent(idx)
                .and_then(|p| graph.node(p))
                .map(|p| p.id.clone());
            let visual = self.convert_node(node, parent);
            lods.insert(node.id.as_str(), visual.lod);
            nodes.push(visual);
        }

        let edges = graph
            .edges()
            .map(|edge| {
                let source_lod = lods.get(edge.source.as_str()).copied().unwrap_or(0);
                let target_lod = lods.get(edge.target.as_str()).copied().unwrap_or(0);
                let mut extra = edge.metadata.clone();
                let label = extra
                    .remove("label")
                    .and_then(|v| v.as_str().map(str::to_string));
                let weight = extra
                    .remove("weight")
                    .and_then(|v| v.as_f64())
                    .unwrap_or(1.0);
                VisualizationEdge {
                    id: edge.id.clone(),
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    kind: edge.kind,
                    lod: source_lod.max(target_lod),
                    metadata: EdgeMetadata {
                        label,
                        weight,
                        extra,
                    },
                }
            })
            .collect();

        let mut model = VisualizationGraph {
            nodes,
            edges,
            metadata: GraphMetadata {
                name: self.options.name.clone(),
                schema_version: IVM_SCHEMA_VERSION.to_string(),
                generated_at: self.options.generated_at.unwrap_or_else(Utc::now),
                root_path: self.options.root_path.clone(),
                stats: Default::default(),
                languages: graph.languages().map(str::to_string).collect(),
            },
            bounds: BoundingBox::zero(),
        };
        model.recompute_stats();
        model.recompute_bounds();

        log::debug!(
            "Converted graph: {} nodes, {} edges",
            model.metadata.stats.total_nodes,
            model.metadata.stats.total_edges
        );
        model
    }

    fn convert_node(&self, node: &DependencyNode, parent: Option<String>) -> VisualizationNode {
        let mut extra: Map<String, Value> = node
            .metadata
            .iter()
            .filter(|(key, _)| !LIFTED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        // Entity nodes already carry their declaring file as `path`
        extra.remove("path");

        let label = if node.name.is_empty() {
            node.id.clone()
        } else {
            node.name.clone()
        };

        let metadata = NodeMetadata {
            label,
            path: node.path.clone(),
            loc: node.meta("loc").and_then(Value::as_i64),
            complexity: node.meta("complexity").and_then(Value::as_i64),
            depth: node
                .meta_u64("depth")
                .and_then(|d| u32::try_from(d).ok()),
            language: node
                .meta("language")
                .and_then(Value::as_str)
                .map(str::to_string),
            extra,
        };

        let style = node.is_external().then(|| NodeStyle {
            color: Some("#9e9e9e".to_string()),
            opacity: Some(0.6),
            shape: Some("sphere".to_string()),
            ..NodeStyle::default()
        });

        VisualizationNode {
            id: node.id.clone(),
            kind: node.kind,
            position: self
                .options
                .initial_positions
                .get(&node.id)
                .copied()
                .unwrap_or(Vec3::ZERO),
            lod: default_lod(node.kind),
            parent,
            metadata,
            style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescape_graph::{DependencyEdge, EdgeKind, NodeKind};
    use pretty_assertions::assert_eq;

    fn sample() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.add_node(
            DependencyNode::new("file:a.ts", NodeKind::File, "a.ts", "a.ts")
                .with_meta("loc", 12)
                .with_meta("complexity", 3)
                .with_meta("depth", 0)
                .with_meta("language", "typescript")
                .with_meta("entry_point", true),
        );
        graph.add_node(DependencyNode::new(
            "class:a.ts#A",
            NodeKind::Class,
            "A",
            "a.ts",
        ));
        graph.add_node(
            DependencyNode::new("method:a.ts#A.run", NodeKind::Method, "run", "a.ts")
                .with_meta("line", 4),
        );
        graph.add_edge(DependencyEdge::new(
            EdgeKind::Contains,
            "file:a.ts",
            "class:a.ts#A",
        ));
        graph.add_edge(DependencyEdge::new(
            EdgeKind::Contains,
            "class:a.ts#A",
            "method:a.ts#A.run",
        ));
        graph.add_language("typescript");
        graph
    }

    #[test]
    fn lifts_typed_metadata_and_keeps_the_rest() {
        let model = ModelConverter::default().convert(&sample());
        let file = model.node("file:a.ts").unwrap();

        assert_eq!(file.metadata.loc, Some(12));
        assert_eq!(file.metadata.complexity, Some(3));
        assert_eq!(file.metadata.depth, Some(0));
        assert_eq!(file.metadata.language.as_deref(), Some("typescript"));
        assert!(file.metadata.extra_bool("entry_point"));
        assert!(!file.metadata.extra.contains_key("loc"));
        assert_eq!(model.metadata.languages, vec!["typescript".to_string()]);
    }

    #[test]
    fn parents_and_lods_follow_containment() {
        let model = ModelConverter::default().convert(&sample());

        let method = model.node("method:a.ts#A.run").unwrap();
        assert_eq!(method.parent.as_deref(), Some("class:a.ts#A"));
        assert_eq!(method.lod, 4);
        assert_eq!(model.node("file:a.ts").unwrap().parent, None);

        let edge = model
            .edge("contains:class:a.ts#A->method:a.ts#A.run")
            .unwrap();
        assert_eq!(edge.lod, 4);
        assert_eq!(edge.metadata.weight, 1.0);
    }

    #[test]
    fn initial_positions_are_used_when_given() {
        let mut options = ConverterOptions::default();
        options
            .initial_positions
            .insert("class:a.ts#A".to_string(), Vec3::new(1.0, 2.0, 3.0));
        let model = ModelConverter::new(options).convert(&sample());

        assert_eq!(
            model.node("class:a.ts#A").unwrap().position,
            Vec3::new(1.0, 2.0, 3.0)
        );
        assert_eq!(model.node("file:a.ts").unwrap().position, Vec3::ZERO);
        assert_eq!(model.bounds.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn empty_graph_yields_zero_stats() {
        let model = ModelConverter::default().convert(&DependencyGraph::new());

        assert!(model.is_empty());
        assert_eq!(model.metadata.stats.total_nodes, 0);
        assert_eq!(model.metadata.stats.total_edges, 0);
        assert!(model.metadata.stats.nodes_by_kind.is_empty());
        assert_eq!(model.metadata.schema_version, IVM_SCHEMA_VERSION);
        assert!(model.bounds.is_valid());
        assert_eq!(model.bounds.size(), Vec3::ZERO);
    }
}
