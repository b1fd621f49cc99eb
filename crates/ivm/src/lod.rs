//! Level of detail.
//!
//! Two scales meet here. Every node carries a static LOD in `0..=MAX_LOD`
//! assigned from its kind (coarse structure low, members high). The camera
//! sits in one of four [`CameraTier`]s chosen from its distance, and each
//! tier reveals nodes up to [`CameraTier::max_node_lod`].

use crate::geometry::BoundingBox;
use crate::model::VisualizationGraph;
use codescape_graph::NodeKind;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const MAX_LOD: u8 = 5;

pub const CLOSE_THRESHOLD: f64 = 50.0;
pub const NEAR_THRESHOLD: f64 = 150.0;
pub const MID_THRESHOLD: f64 = 400.0;

/// Fraction of a threshold the camera must overshoot before coarsening
pub const HYSTERESIS_BUFFER: f64 = 0.1;

/// Static LOD for a node kind
pub const fn default_lod(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Directory => 0,
        NodeKind::File => 1,
        NodeKind::Class | NodeKind::AbstractClass | NodeKind::Interface | NodeKind::Enum => 2,
        NodeKind::Function => 3,
        NodeKind::Method => 4,
        NodeKind::Variable | NodeKind::Unknown => MAX_LOD,
    }
}

/// Camera distance tier, ordered coarse to fine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CameraTier {
    Far = 1,
    Mid = 2,
    Near = 3,
    Close = 4,
}

impl CameraTier {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Far),
            2 => Some(Self::Mid),
            3 => Some(Self::Near),
            4 => Some(Self::Close),
            _ => None,
        }
    }

    /// Upper distance bound of this tier; `Far` is unbounded
    pub const fn threshold(self) -> f64 {
        match self {
            Self::Close => CLOSE_THRESHOLD,
            Self::Near => NEAR_THRESHOLD,
            Self::Mid => MID_THRESHOLD,
            Self::Far => f64::INFINITY,
        }
    }

    pub const fn coarser(self) -> Option<Self> {
        match self {
            Self::Close => Some(Self::Near),
            Self::Near => Some(Self::Mid),
            Self::Mid => Some(Self::Far),
            Self::Far => None,
        }
    }

    /// Finest node LOD visible from this tier
    pub const fn max_node_lod(self) -> u8 {
        match self {
            Self::Far => 1,
            Self::Mid => 2,
            Self::Near => 3,
            Self::Close => MAX_LOD,
        }
    }
}

pub fn tier_for_distance(distance: f64) -> CameraTier {
    if distance < CLOSE_THRESHOLD {
        CameraTier::Close
    } else if distance < NEAR_THRESHOLD {
        CameraTier::Near
    } else if distance < MID_THRESHOLD {
        CameraTier::Mid
    } else {
        CameraTier::Far
    }
}

/// Tier for `distance` given the tier the camera is currently in.
///
/// Zooming in switches at the raw threshold. Zooming out keeps the finest
/// tier between `current` and the raw tier whose threshold, grown by
/// [`HYSTERESIS_BUFFER`], still covers `distance`.
pub fn tier_with_hysteresis(distance: f64, current: CameraTier) -> CameraTier {
    let raw = tier_for_distance(distance);
    if raw >= current {
        return raw;
    }

    let mut tier = current;
    while tier > raw {
        if distance <= tier.threshold() * (1.0 + HYSTERESIS_BUFFER) {
            return tier;
        }
        match tier.coarser() {
            Some(next) => tier = next,
            None => break,
        }
    }
    raw
}

/// Current camera tier, updated with hysteresis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LodState {
    tier: CameraTier,
}

impl Default for LodState {
    fn default() -> Self {
        Self {
            tier: CameraTier::Far,
        }
    }
}

impl LodState {
    pub fn new(tier: CameraTier) -> Self {
        Self { tier }
    }

    pub fn tier(&self) -> CameraTier {
        self.tier
    }

    /// Move to the tier for `distance`; returns true if the tier changed
    pub fn update(&mut self, distance: f64) -> bool {
        let next = tier_with_hysteresis(distance, self.tier);
        let changed = next != self.tier;
        if changed {
            log::debug!(
                "LOD tier {:?} -> {:?} at distance {distance:.1}",
                self.tier,
                next
            );
        }
        self.tier = next;
        changed
    }

    /// The graph as seen from the current tier
    pub fn visible(&self, graph: &VisualizationGraph, filter: LodFilter) -> VisualizationGraph {
        filter_by_lod(graph, self.tier.max_node_lod(), filter)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodFilter {
    /// Keep the `parent` chain of every surviving node
    #[serde(default)]
    pub include_ancestors: bool,
}

/// Reduced graph with nodes at or below `max_lod`.
///
/// Edges survive only when both endpoints do. Stats and bounds are
/// recomputed for the result.
pub fn filter_by_lod(
    graph: &VisualizationGraph,
    max_lod: u8,
    filter: LodFilter,
) -> VisualizationGraph {
    let mut keep: HashSet<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.lod <= max_lod)
        .map(|n| n.id.as_str())
        .collect();

    if filter.include_ancestors {
        let parents: HashMap<&str, &str> = graph
            .nodes
            .iter()
            .filter_map(|n| n.parent.as_deref().map(|p| (n.id.as_str(), p)))
            .collect();
        let seeds: Vec<&str> = keep.iter().copied().collect();
        for seed in seeds {
            let mut visited = HashSet::new();
            let mut current = seed;
            // Parent links may form a cycle in hand-built graphs
            while let Some(&parent) = parents.get(current) {
                if !visited.insert(parent) {
                    break;
                }
                keep.insert(parent);
                current = parent;
            }
        }
    }

    let nodes = graph
        .nodes
        .iter()
        .filter(|n| keep.contains(n.id.as_str()))
        .cloned()
        .collect();
    let edges = graph
        .edges
        .iter()
        .filter(|e| keep.contains(e.source.as_str()) && keep.contains(e.target.as_str()))
        .cloned()
        .collect();

    let mut filtered = VisualizationGraph {
        nodes,
        edges,
        metadata: graph.metadata.clone(),
        bounds: BoundingBox::zero(),
    };
    filtered.recompute_stats();
    filtered.recompute_bounds();
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn raw_tiers_follow_thresholds() {
        assert_eq!(tier_for_distance(0.0), CameraTier::Close);
        assert_eq!(tier_for_distance(49.9), CameraTier::Close);
        assert_eq!(tier_for_distance(50.0), CameraTier::Near);
        assert_eq!(tier_for_distance(149.9), CameraTier::Near);
        assert_eq!(tier_for_distance(150.0), CameraTier::Mid);
        assert_eq!(tier_for_distance(400.0), CameraTier::Far);
        assert_eq!(tier_for_distance(f64::INFINITY), CameraTier::Far);
    }

    #[test]
    fn zooming_out_waits_for_the_buffer() {
        assert_eq!(tier_with_hysteresis(52.0, CameraTier::Close), CameraTier::Close);
        assert_eq!(tier_with_hysteresis(55.0, CameraTier::Close), CameraTier::Close);
        assert_eq!(tier_with_hysteresis(56.0, CameraTier::Close), CameraTier::Near);
        assert_eq!(tier_with_hysteresis(430.0, CameraTier::Mid), CameraTier::Mid);
        assert_eq!(tier_with_hysteresis(441.0, CameraTier::Mid), CameraTier::Far);
    }

    #[test]
    fn zooming_out_across_several_tiers() {
        // Past Close's buffer but inside Near's
        assert_eq!(tier_with_hysteresis(160.0, CameraTier::Close), CameraTier::Near);
        assert_eq!(tier_with_hysteresis(1000.0, CameraTier::Close), CameraTier::Far);
    }

    #[test]
    fn zooming_in_switches_at_raw_threshold() {
        assert_eq!(tier_with_hysteresis(150.0, CameraTier::Mid), CameraTier::Mid);
        assert_eq!(tier_with_hysteresis(149.9, CameraTier::Mid), CameraTier::Near);
        assert_eq!(tier_with_hysteresis(10.0, CameraTier::Far), CameraTier::Close);
    }

    #[test]
    fn state_reports_changes() {
        let mut state = LodState::new(CameraTier::Close);
        assert!(!state.update(53.0));
        assert_eq!(state.tier(), CameraTier::Close);
        assert!(state.update(60.0));
        assert_eq!(state.tier(), CameraTier::Near);
        assert!(!state.update(52.0));
        assert!(state.update(49.0));
        assert_eq!(state.tier(), CameraTier::Close);
    }

    #[test]
    fn tiers_reveal_more_as_they_get_finer() {
        let lods: Vec<u8> = [CameraTier::Far, CameraTier::Mid, CameraTier::Near, CameraTier::Close]
            .iter()
            .map(|t| t.max_node_lod())
            .collect();
        assert_eq!(lods, vec![1, 2, 3, 5]);
        assert_eq!(CameraTier::from_u8(4), Some(CameraTier::Close));
        assert_eq!(CameraTier::from_u8(0), None);
        assert_eq!(CameraTier::Near.as_u8(), 3);
    }

    #[test]
    fn default_lod_by_kind() {
        assert_eq!(default_lod(NodeKind::Directory), 0);
        assert_eq!(default_lod(NodeKind::File), 1);
        assert_eq!(default_lod(NodeKind::AbstractClass), 2);
        assert_eq!(default_lod(NodeKind::Enum), 2);
        assert_eq!(default_lod(NodeKind::Function), 3);
        assert_eq!(default_lod(NodeKind::Method), 4);
        assert_eq!(default_lod(NodeKind::Variable), 5);
    }
}
