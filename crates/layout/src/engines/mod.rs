mod building;
mod cell;
mod city;
mod force;

pub use building::{BuildingEngine, BUILDING_ENGINE};
pub use cell::{CellEngine, CELL_ENGINE};
pub use city::{CityEngine, CITY_ENGINE};
pub use force::{simulate, ForceDirectedEngine, Simulation, FORCE_ENGINE};
