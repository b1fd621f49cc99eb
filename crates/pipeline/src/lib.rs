//! # Codescape Pipeline
//!
//! One call from pre-read source files to a laid-out, validated
//! visualization model.
//!
//! ```text
//! SourceFile[] ─> GraphBuilder ─> ModelConverter ─> LayoutRegistry
//!                                                        │
//!           PipelineOutput <─ validate <─ filter_by_lod <┘
//! ```
//!
//! The layout registry is passed in by the caller; nothing here keeps
//! global state between runs.

mod config;
mod error;
mod pipeline;

pub use config::{PipelineConfig, CONFIG_FILE_NAME};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineOutput};

pub use codescape_graph::{BuildIssue, BuilderConfig, SourceFile};
pub use codescape_ivm::{validate, ValidationResult, VisualizationGraph, IVM_SCHEMA_VERSION};
pub use codescape_layout::{LayoutConfig, LayoutRegistry};
pub use codescape_parser::Language;
