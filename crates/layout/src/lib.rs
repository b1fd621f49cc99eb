//! # Codescape Layout
//!
//! Assigns 3D positions to a [`VisualizationGraph`](codescape_ivm::VisualizationGraph).
//!
//! ```text
//! LayoutRegistry (ordered, first match wins)
//!     ├─ cell      one class and its members     → organelles inside a membrane
//!     ├─ building  one file with classes         → class floors over a footprint
//!     ├─ city      two or more files             → districts, depth as height
//!     └─ force     anything                      → seeded force simulation
//!
//! LayoutResult ──apply──> VisualizationGraph (positions + bounds)
//! ```

mod config;
mod engine;
pub mod engines;
mod error;
pub mod placement;
mod registry;

pub use config::{BuildingConfig, CellConfig, CityConfig, ForceConfig, LayoutConfig};
pub use engine::{LayoutEngine, LayoutResult};
pub use engines::{
    BuildingEngine, CellEngine, CityEngine, ForceDirectedEngine, BUILDING_ENGINE, CELL_ENGINE,
    CITY_ENGINE, FORCE_ENGINE,
};
pub use error::{LayoutError, Result};
pub use registry::LayoutRegistry;
