use crate::config::LayoutConfig;
use crate::error::Result;
use codescape_ivm::{BoundingBox, Vec3, VisualizationGraph};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A strategy that assigns 3D positions to a visualization graph.
///
/// Engines are stateless; the same graph and config must always produce
/// the same positions.
pub trait LayoutEngine: Send + Sync {
    /// Identifier used for lookup and in results, e.g. `"force"`
    fn engine_type(&self) -> &'static str;

    /// Whether this engine knows how to lay out `graph`
    fn can_layout(&self, graph: &VisualizationGraph) -> bool;

    fn layout(&self, graph: &VisualizationGraph, config: &LayoutConfig) -> Result<LayoutResult>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub engine: String,
    pub positions: BTreeMap<String, Vec3>,
    pub bounds: BoundingBox,
    /// Engine specific diagnostics (iterations, radii, ...)
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl LayoutResult {
    /// Result over final positions, with bounds computed from them
    pub fn new(engine: &str, positions: BTreeMap<String, Vec3>) -> Self {
        let bounds = BoundingBox::from_points(positions.values().copied());
        Self {
            engine: engine.to_string(),
            positions,
            bounds,
            metadata: Map::new(),
        }
    }

    #[must_use]
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn position(&self, id: &str) -> Option<Vec3> {
        self.positions.get(id).copied()
    }

    /// Write positions into `graph` and recompute its bounds.
    ///
    /// Nodes without a computed position keep the one they had.
    pub fn apply(&self, graph: &mut VisualizationGraph) {
        for node in &mut graph.nodes {
            if let Some(position) = self.positions.get(&node.id) {
                node.position = *position;
            }
        }
        graph.recompute_bounds();
    }
}

/// Map layout-space points through the config's scale and origin
pub(crate) fn finish(
    engine: &str,
    config: &LayoutConfig,
    raw: impl IntoIterator<Item = (String, Vec3)>,
) -> LayoutResult {
    let positions = raw
        .into_iter()
        .map(|(id, point)| (id, config.place(point)))
        .collect();
    LayoutResult::new(engine, positions)
}
