//! Code-as-city layout.
//!
//! Files are buildings grouped into districts by directory, laid out on a
//! street grid. A building's height (`y`) encodes its abstraction depth.
//! External packages ring the city.

use crate::config::LayoutConfig;
use crate::engine::{finish, LayoutEngine, LayoutResult};
use crate::error::Result;
use crate::placement::{grid_columns, ring};
use codescape_ivm::{NodeKind, Vec3, VisualizationGraph, VisualizationNode};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

pub const CITY_ENGINE: &str = "city";

#[derive(Debug, Clone, Copy, Default)]
pub struct CityEngine;

impl CityEngine {
    pub fn new() -> Self {
        Self
    }
}

fn is_building(node: &VisualizationNode) -> bool {
    node.kind == NodeKind::File && !node.is_external()
}

/// Directory part of a path, `""` for root-level files
fn district_of(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

impl LayoutEngine for CityEngine {
    fn engine_type(&self) -> &'static str {
        CITY_ENGINE
    }

    fn can_layout(&self, graph: &VisualizationGraph) -> bool {
        graph.nodes.iter().filter(|n| is_building(n)).count() >= 2
    }

    fn layout(&self, graph: &VisualizationGraph, config: &LayoutConfig) -> Result<LayoutResult> {
        config.validate()?;
        let city = &config.city;
        let pitch = city.building_size + city.street_width;

        let mut districts: BTreeMap<&str, Vec<&VisualizationNode>> = BTreeMap::new();
        for node in graph.nodes.iter().filter(|n| is_building(n)) {
            districts
                .entry(district_of(&node.metadata.path))
                .or_default()
                .push(node);
        }
        for files in districts.values_mut() {
            files.sort_by(|a, b| a.metadata.path.cmp(&b.metadata.path));
        }

        // Every district gets a square block big enough for the largest one
        let block_cols = districts
            .values()
            .map(|files| grid_columns(files.len()))
            .max()
            .unwrap_or(1);
        let block = block_cols as f64 * pitch + city.street_width;
        let district_cols = grid_columns(districts.len());
        let half_extent = (district_cols as f64 * block - city.street_width) / 2.0;

        let mut positions: HashMap<&str, Vec3> = HashMap::new();
        let mut district_centers: BTreeMap<&str, Vec3> = BTreeMap::new();

        for (k, (district, files)) in districts.iter().enumerate() {
            let corner_x = (k % district_cols) as f64 * block - half_extent;
            let corner_z = (k / district_cols) as f64 * block - half_extent;
            let cols = grid_columns(files.len());

            let mut sum = Vec3::ZERO;
            for (i, file) in files.iter().enumerate() {
                let depth = f64::from(file.metadata.depth.unwrap_or(0));
                let x = corner_x + (i % cols) as f64 * pitch + city.building_size / 2.0;
                let z = corner_z + (i / cols) as f64 * pitch + city.building_size / 2.0;
                let p = Vec3::new(x, depth * city.floor_height, z);
                positions.insert(file.id.as_str(), p);
                sum += Vec3::new(x, 0.0, z);
            }
            district_centers.insert(*district, sum / files.len() as f64);
        }

        let externals: Vec<&VisualizationNode> =
            graph.nodes.iter().filter(|n| n.is_external()).collect();
        for (node, p) in externals
            .iter()
            .zip(ring(externals.len(), city.external_ring_radius, 0.0))
        {
            positions.insert(node.id.as_str(), p);
        }

        for node in graph.nodes_of_kind(NodeKind::Directory) {
            let center = directory_center(&node.metadata.path, &district_centers);
            positions.insert(node.id.as_str(), center);
        }

        stack_descendants(graph, &mut positions, city.floor_height);

        let raw: Vec<(String, Vec3)> = graph
            .nodes
            .iter()
            .map(|n| {
                let p = positions.get(n.id.as_str()).copied().unwrap_or(Vec3::ZERO);
                (n.id.clone(), p)
            })
            .collect();

        Ok(finish(CITY_ENGINE, config, raw)
            .with_meta("districts", districts.len())
            .with_meta("buildings", districts.values().map(Vec::len).sum::<usize>())
            .with_meta("externals", externals.len()))
    }
}

/// Center of the districts at or below `dir`, origin when there are none
fn directory_center(dir: &str, districts: &BTreeMap<&str, Vec3>) -> Vec3 {
    let prefix = format!("{dir}/");
    let matching: Vec<Vec3> = districts
        .iter()
        .filter(|(d, _)| **d == dir || d.starts_with(prefix.as_str()))
        .map(|(_, c)| *c)
        .collect();
    if matching.is_empty() {
        return Vec3::ZERO;
    }
    matching.iter().fold(Vec3::ZERO, |acc, c| acc + *c) / matching.len() as f64
}

/// Place every entity one floor above the previous one, over its building.
///
/// Walks `parent` links breadth first from each placed file, in model order.
fn stack_descendants<'a>(
    graph: &'a VisualizationGraph,
    positions: &mut HashMap<&'a str, Vec3>,
    floor_height: f64,
) {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in &graph.nodes {
        if let Some(parent) = node.parent.as_deref() {
            children.entry(parent).or_default().push(node.id.as_str());
        }
    }

    for file in graph.nodes.iter().filter(|n| is_building(n)) {
        let Some(&base) = positions.get(file.id.as_str()) else {
            continue;
        };
        let mut seen: HashSet<&str> = HashSet::from([file.id.as_str()]);
        let mut queue = VecDeque::from([file.id.as_str()]);
        let mut floor = 0;
        while let Some(current) = queue.pop_front() {
            for &child in children.get(current).into_iter().flatten() {
                if !seen.insert(child) || positions.contains_key(child) {
                    continue;
                }
                floor += 1;
                positions.insert(child, base + Vec3::new(0.0, floor as f64 * floor_height, 0.0));
                queue.push_back(child);
            }
        }
    }
}
