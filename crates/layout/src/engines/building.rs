//! Single-file layout: the file is a building, each class one floor.

use crate::config::LayoutConfig;
use crate::engine::{finish, LayoutEngine, LayoutResult};
use crate::error::{LayoutError, Result};
use crate::placement::ring;
use codescape_ivm::{NodeKind, Vec3, VisualizationGraph, VisualizationNode};
use std::collections::HashMap;

pub const BUILDING_ENGINE: &str = "building";

/// Share of the half footprint used for the member ring
const PERIMETER_INSET: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildingEngine;

impl BuildingEngine {
    pub fn new() -> Self {
        Self
    }
}

fn internal_files(graph: &VisualizationGraph) -> Vec<&VisualizationNode> {
    graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::File && !n.is_external())
        .collect()
}

impl LayoutEngine for BuildingEngine {
    fn engine_type(&self) -> &'static str {
        BUILDING_ENGINE
    }

    fn can_layout(&self, graph: &VisualizationGraph) -> bool {
        internal_files(graph).len() == 1 && graph.nodes.iter().any(|n| n.kind.is_class_like())
    }

    fn layout(&self, graph: &VisualizationGraph, config: &LayoutConfig) -> Result<LayoutResult> {
        config.validate()?;
        let files = internal_files(graph);
        let [file] = files.as_slice() else {
            return Err(LayoutError::not_applicable(
                BUILDING_ENGINE,
                format!("expected exactly one file, found {}", files.len()),
            ));
        };

        let building = &config.building;
        let perimeter = building.footprint / 2.0 * PERIMETER_INSET;
        let mut positions: HashMap<&str, Vec3> = HashMap::new();
        positions.insert(file.id.as_str(), Vec3::ZERO);

        // Floors, bottom up in model order
        let floors: Vec<&VisualizationNode> =
            graph.nodes.iter().filter(|n| n.kind.is_class_like()).collect();
        for (i, class) in floors.iter().enumerate() {
            let y = (i + 1) as f64 * building.floor_height;
            positions.insert(class.id.as_str(), Vec3::new(0.0, y, 0.0));

            let members: Vec<&VisualizationNode> = graph
                .children_of(&class.id)
                .filter(|n| !n.kind.is_class_like())
                .collect();
            for (member, p) in members.iter().zip(ring(members.len(), perimeter, y)) {
                positions.insert(member.id.as_str(), p);
            }
        }

        // Everything else declared in the file sits on the ground floor
        let ground: Vec<&VisualizationNode> = graph
            .children_of(&file.id)
            .filter(|n| !positions.contains_key(n.id.as_str()))
            .collect();
        for (node, p) in ground.iter().zip(ring(ground.len(), perimeter, 0.0)) {
            positions.insert(node.id.as_str(), p);
        }

        let raw: Vec<(String, Vec3)> = graph
            .nodes
            .iter()
            .map(|n| {
                let p = positions.get(n.id.as_str()).copied().unwrap_or(Vec3::ZERO);
                (n.id.clone(), p)
            })
            .collect();

        Ok(finish(BUILDING_ENGINE, config, raw)
            .with_meta("floors", floors.len())
            .with_meta("footprint", building.footprint))
    }
}
