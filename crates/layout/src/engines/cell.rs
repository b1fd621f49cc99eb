//! Single-class layout: the class is a cell, its members organelles.
//!
//! Variables sit on an inner shell close to the nucleus, everything else on
//! an outer shell. Both shells lie strictly inside the membrane.

use crate::config::LayoutConfig;
use crate::engine::{finish, LayoutEngine, LayoutResult};
use crate::error::{LayoutError, Result};
use crate::placement::fibonacci_sphere;
use codescape_ivm::{NodeKind, Vec3, VisualizationGraph, VisualizationNode};

pub const CELL_ENGINE: &str = "cell";

/// Shell radii as fractions of the nucleus → membrane gap
const INNER_SHELL: f64 = 0.35;
const OUTER_SHELL: f64 = 0.85;

#[derive(Debug, Clone, Copy, Default)]
pub struct CellEngine;

impl CellEngine {
    pub fn new() -> Self {
        Self
    }
}

/// The one class-like node, when every other node is its direct child
fn nucleus(graph: &VisualizationGraph) -> Option<&VisualizationNode> {
    let mut classes = graph.nodes.iter().filter(|n| n.kind.is_class_like());
    let class = classes.next()?;
    if classes.next().is_some() {
        return None;
    }
    graph
        .nodes
        .iter()
        .filter(|n| n.id != class.id)
        .all(|n| n.parent.as_deref() == Some(class.id.as_str()))
        .then_some(class)
}

impl LayoutEngine for CellEngine {
    fn engine_type(&self) -> &'static str {
        CELL_ENGINE
    }

    fn can_layout(&self, graph: &VisualizationGraph) -> bool {
        nucleus(graph).is_some()
    }

    fn layout(&self, graph: &VisualizationGraph, config: &LayoutConfig) -> Result<LayoutResult> {
        config.validate()?;
        let class = nucleus(graph).ok_or_else(|| {
            LayoutError::not_applicable(CELL_ENGINE, "graph is not a single class with its members")
        })?;

        let cell = &config.cell;
        let gap = cell.membrane_radius - cell.nucleus_radius;
        let inner_radius = cell.nucleus_radius + gap * INNER_SHELL;
        let outer_radius = cell.nucleus_radius + gap * OUTER_SHELL;

        let (variables, others): (Vec<&VisualizationNode>, Vec<&VisualizationNode>) = graph
            .nodes
            .iter()
            .filter(|n| n.id != class.id)
            .partition(|n| n.kind == NodeKind::Variable);

        let mut raw: Vec<(String, Vec3)> = Vec::with_capacity(graph.nodes.len());
        raw.push((class.id.clone(), Vec3::ZERO));
        for (node, p) in variables
            .iter()
            .zip(fibonacci_sphere(variables.len(), inner_radius))
        {
            raw.push((node.id.clone(), p));
        }
        for (node, p) in others
            .iter()
            .zip(fibonacci_sphere(others.len(), outer_radius))
        {
            raw.push((node.id.clone(), p));
        }

        Ok(finish(CELL_ENGINE, config, raw)
            .with_meta("membrane_radius", cell.membrane_radius)
            .with_meta("nucleus_radius", cell.nucleus_radius)
            .with_meta("organelles", graph.nodes.len() - 1))
    }
}
