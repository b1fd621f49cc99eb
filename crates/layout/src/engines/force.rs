//! General purpose force-directed layout.
//!
//! Nodes live in dense arrays indexed by model order; edges are resolved to
//! index pairs once, so the inner loop never touches a map.

use crate::config::LayoutConfig;
use crate::engine::{finish, LayoutEngine, LayoutResult};
use crate::error::Result;
use crate::placement::tie_break_direction;
use codescape_ivm::{Vec3, VisualizationGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const FORCE_ENGINE: &str = "force";

#[derive(Debug, Clone, Copy, Default)]
pub struct ForceDirectedEngine;

impl ForceDirectedEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Where a simulation ended up
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub positions: Vec<Vec3>,
    pub iterations: usize,
    pub converged: bool,
    pub max_displacement: f64,
}

// ============================================================================
// Simulation
// ============================================================================

/// Run the simulation over `n` nodes joined by `springs` (index pairs).
///
/// Fails with [`crate::LayoutError::InvalidConfig`] before doing any work if
/// `config` does not validate.
pub fn simulate(
    n: usize,
    springs: &[(usize, usize)],
    config: &LayoutConfig,
) -> Result<Simulation> {
    config.validate()?;
    let force = &config.force;
    let mut positions = initial_positions(n, config);
    let mut velocities = vec![Vec3::ZERO; n];
    let mut forces = vec![Vec3::ZERO; n];

    let spring_length = config.spring_length();
    let deadline = force
        .time_budget_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));

    let mut iterations = 0;
    let mut max_displacement = 0.0;
    let mut converged = n == 0;

    while !converged && iterations < force.max_iterations {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            log::debug!("Force layout hit its time budget after {iterations} iterations");
            break;
        }

        forces.iter_mut().for_each(|f| *f = Vec3::ZERO);

        // Pairwise repulsion, inverse-distance falloff
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = positions[i] - positions[j];
                let len = delta.length();
                let dir = if len > f64::EPSILON {
                    delta / len
                } else {
                    tie_break_direction(i, j)
                };
                let push = dir * (force.repulsion / len.max(force.min_distance));
                forces[i] += push;
                forces[j] -= push;
            }
        }

        // Springs along edges
        for &(s, t) in springs {
            let delta = positions[t] - positions[s];
            let len = delta.length();
            if len <= f64::EPSILON {
                continue;
            }
            let pull = delta / len * ((len - spring_length) * force.spring_strength);
            forces[s] += pull;
            forces[t] -= pull;
        }

        max_displacement = 0.0_f64;
        for i in 0..n {
            // Weak centering keeps disconnected parts from drifting away
            forces[i] -= positions[i] * force.centering;

            let mut velocity = (velocities[i] + forces[i]) * force.damping;
            let speed = velocity.length();
            if speed > force.max_velocity {
                velocity = velocity / speed * force.max_velocity;
            }
            velocities[i] = velocity;
            positions[i] += velocity;
            max_displacement = max_displacement.max(velocity.length());
        }

        iterations += 1;
        converged = max_displacement < force.epsilon;
    }

    Ok(Simulation {
        positions,
        iterations,
        converged,
        max_displacement,
    })
}

/// Seeded scatter inside a cube that grows with the node count
fn initial_positions(n: usize, config: &LayoutConfig) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    // Keeps the sampled range finite for very large spacings
    let half = (config.spacing * (n.max(1) as f64).cbrt()).min(f64::MAX / 4.0);
    (0..n)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
                rng.gen_range(-half..=half),
            )
        })
        .collect()
}

impl LayoutEngine for ForceDirectedEngine {
    fn engine_type(&self) -> &'static str {
        FORCE_ENGINE
    }

    fn can_layout(&self, _graph: &VisualizationGraph) -> bool {
        true
    }

    fn layout(&self, graph: &VisualizationGraph, config: &LayoutConfig) -> Result<LayoutResult> {
        let index: HashMap<&str, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();
        let springs: Vec<(usize, usize)> = graph
            .edges
            .iter()
            .filter_map(|e| {
                let s = *index.get(e.source.as_str())?;
                let t = *index.get(e.target.as_str())?;
                (s != t).then_some((s, t))
            })
            .collect();

        let sim = simulate(graph.nodes.len(), &springs, config)?;
        log::debug!(
            "Force layout: {} nodes, {} springs, {} iterations, converged={}",
            graph.nodes.len(),
            springs.len(),
            sim.iterations,
            sim.converged
        );

        let raw = graph
            .nodes
            .iter()
            .zip(&sim.positions)
            .map(|(node, p)| (node.id.clone(), *p));
        Ok(finish(FORCE_ENGINE, config, raw)
            .with_meta("iterations", sim.iterations)
            .with_meta("converged", sim.converged)
            .with_meta("max_displacement", sim.max_displacement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_input_gives_identical_output() {
        let config = LayoutConfig::default();
        let springs = [(0, 1), (1, 2), (2, 0), (3, 4)];
        let a = simulate(5, &springs, &config).unwrap();
        let b = simulate(5, &springs, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn seed_changes_the_starting_point() {
        let mut other = LayoutConfig::default();
        other.seed = 7;
        let a = simulate(3, &[], &LayoutConfig::default()).unwrap();
        let b = simulate(3, &[], &other).unwrap();
        assert!(a.positions != b.positions);
    }

    #[test]
    fn iteration_cap_is_respected() {
        let mut config = LayoutConfig::default();
        config.force.max_iterations = 3;
        config.force.epsilon = 0.0;
        let sim = simulate(6, &[(0, 1)], &config).unwrap();
        assert_eq!(sim.iterations, 3);
        assert!(!sim.converged);
        assert!(sim.positions.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn springs_pull_connected_nodes_closer() {
        let mut config = LayoutConfig::default();
        config.force.max_iterations = 300;
        let sim = simulate(4, &[(0, 1)], &config).unwrap();
        let linked = sim.positions[0].distance(sim.positions[1]);
        let unlinked = sim.positions[2].distance(sim.positions[3]);
        assert!(linked < unlinked, "linked {linked} vs unlinked {unlinked}");
    }

    #[test]
    fn empty_and_single_node_graphs() {
        let empty = simulate(0, &[], &LayoutConfig::default()).unwrap();
        assert!(empty.converged);
        assert_eq!(empty.iterations, 0);

        let single = simulate(1, &[], &LayoutConfig::default()).unwrap();
        assert_eq!(single.positions.len(), 1);
        assert!(single.positions[0].is_finite());
    }

    #[test]
    fn zero_time_budget_stops_immediately() {
        let mut config = LayoutConfig::default();
        config.force.time_budget_ms = Some(0);
        let sim = simulate(10, &[], &config).unwrap();
        assert_eq!(sim.iterations, 0);
        assert_eq!(sim.positions.len(), 10);
    }

    #[test]
    fn invalid_spacing_is_rejected_before_sampling() {
        for spacing in [-1.0, 0.0, f64::NAN] {
            let config = LayoutConfig {
                spacing,
                ..LayoutConfig::default()
            };
            let err = simulate(4, &[(0, 1)], &config).unwrap_err();
            assert!(matches!(err, crate::LayoutError::InvalidConfig(_)), "{err}");
        }
    }
}
