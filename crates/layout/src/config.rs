use crate::error::{LayoutError, Result};
use codescape_ivm::Vec3;
use serde::{Deserialize, Serialize};

/// Configuration shared by every engine plus one section per engine.
///
/// Every field has a default, so an empty TOML document is a valid config:
///
/// ```toml
/// spacing = 10.0
/// seed = 7
///
/// [force]
/// max_iterations = 200
///
/// [cell]
/// membrane_radius = 30.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Base distance between neighbouring nodes
    pub spacing: f64,
    /// Multiplier applied to every final position
    pub scale: f64,
    /// Offset added to every final position after scaling
    pub origin: Vec3,
    pub seed: u64,
    pub force: ForceConfig,
    pub city: CityConfig,
    pub building: BuildingConfig,
    pub cell: CellConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: 10.0,
            scale: 1.0,
            origin: Vec3::ZERO,
            seed: 42,
            force: ForceConfig::default(),
            city: CityConfig::default(),
            building: BuildingConfig::default(),
            cell: CellConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub max_iterations: usize,
    /// Stop once no node moves further than this in one step
    pub epsilon: f64,
    pub repulsion: f64,
    /// Rest length of edge springs; falls back to `spacing`
    pub spring_length: Option<f64>,
    pub spring_strength: f64,
    /// Pull toward the origin
    pub centering: f64,
    /// Velocity retained per step (0 = stop, 1 = no damping)
    pub damping: f64,
    pub max_velocity: f64,
    /// Floor for pair distances in the repulsion term
    pub min_distance: f64,
    /// Wall-clock cap; the result is whatever the simulation reached
    pub time_budget_ms: Option<u64>,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            epsilon: 0.01,
            repulsion: 200.0,
            spring_length: None,
            spring_strength: 0.05,
            centering: 0.01,
            damping: 0.85,
            max_velocity: 50.0,
            min_distance: 0.5,
            time_budget_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    pub floor_height: f64,
    pub building_size: f64,
    pub street_width: f64,
    pub external_ring_radius: f64,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            floor_height: 3.0,
            building_size: 8.0,
            street_width: 4.0,
            external_ring_radius: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    pub floor_height: f64,
    /// Side length of the square footprint
    pub footprint: f64,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            floor_height: 3.0,
            footprint: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellConfig {
    pub membrane_radius: f64,
    pub nucleus_radius: f64,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            membrane_radius: 20.0,
            nucleus_radius: 4.0,
        }
    }
}

impl LayoutConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn spring_length(&self) -> f64 {
        self.force.spring_length.unwrap_or(self.spacing)
    }

    /// Final placement of a layout-space point
    pub fn place(&self, point: Vec3) -> Vec3 {
        self.origin + point * self.scale
    }

    pub fn validate(&self) -> Result<()> {
        positive("spacing", self.spacing)?;
        positive("scale", self.scale)?;
        if !self.origin.is_finite() {
            return Err(LayoutError::InvalidConfig("origin must be finite".into()));
        }

        let force = &self.force;
        non_negative("force.epsilon", force.epsilon)?;
        non_negative("force.repulsion", force.repulsion)?;
        positive("force.spring_length", self.spring_length())?;
        non_negative("force.spring_strength", force.spring_strength)?;
        non_negative("force.centering", force.centering)?;
        if !(0.0..=1.0).contains(&force.damping) {
            return Err(LayoutError::InvalidConfig(format!(
                "force.damping must be within 0..=1, got {}",
                force.damping
            )));
        }
        positive("force.max_velocity", force.max_velocity)?;
        positive("force.min_distance", force.min_distance)?;

        positive("city.floor_height", self.city.floor_height)?;
        positive("city.building_size", self.city.building_size)?;
        non_negative("city.street_width", self.city.street_width)?;
        positive("city.external_ring_radius", self.city.external_ring_radius)?;

        positive("building.floor_height", self.building.floor_height)?;
        positive("building.footprint", self.building.footprint)?;

        positive("cell.membrane_radius", self.cell.membrane_radius)?;
        non_negative("cell.nucleus_radius", self.cell.nucleus_radius)?;
        if self.cell.nucleus_radius >= self.cell.membrane_radius {
            return Err(LayoutError::InvalidConfig(format!(
                "cell.nucleus_radius ({}) must be smaller than cell.membrane_radius ({})",
                self.cell.nucleus_radius, self.cell.membrane_radius
            )));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidConfig(format!(
            "{name} must be a non-negative finite number, got {value}"
        )))
    }
}
