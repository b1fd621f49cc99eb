//! # Codescape IVM
//!
//! Intermediate visualization model: the versioned, renderer-agnostic
//! node/edge representation every downstream consumer reads.
//!
//! ```text
//! DependencyGraph
//!     │
//!     ├──> ModelConverter   (static LOD, parents, stats, bounds)
//!     │
//!     ├──> VisualizationGraph ── JSON (serde)
//!     │
//!     ├──> validate / assert_valid
//!     │
//!     └──> LOD: camera tiers with hysteresis, filter_by_lod
//! ```

mod converter;
mod error;
pub mod geometry;
pub mod lod;
mod model;
mod validator;

pub use codescape_graph::{EdgeKind, NodeKind};
pub use converter::{ConverterOptions, ModelConverter};
pub use error::{IvmError, Result, ValidationError};
pub use geometry::{BoundingBox, Vec3};
pub use lod::{
    default_lod, filter_by_lod, tier_for_distance, tier_with_hysteresis, CameraTier, LodFilter,
    LodState, HYSTERESIS_BUFFER, MAX_LOD,
};
pub use model::{
    EdgeMetadata, GraphMetadata, ModelStats, NodeMetadata, NodeStyle, VisualizationEdge,
    VisualizationGraph, VisualizationNode, IVM_SCHEMA_VERSION,
};
pub use validator::{assert_valid, validate, IssueCode, ValidationIssue, ValidationResult};
