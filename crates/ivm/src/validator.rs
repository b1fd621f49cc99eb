//! Structural checks over a [`VisualizationGraph`].
//!
//! Every check reports independently. Errors make the graph invalid;
//! warnings are informational and never fail [`assert_valid`].

use crate::error::ValidationError;
use crate::lod::MAX_LOD;
use crate::model::{VisualizationGraph, IVM_SCHEMA_VERSION};
use codescape_graph::{EdgeKind, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    DuplicateNodeId,
    DuplicateEdgeId,
    DanglingEdgeSource,
    DanglingEdgeTarget,
    DanglingParent,
    UnknownNodeKind,
    UnknownEdgeKind,
    LodOutOfRange,
    NonFinitePosition,
    MissingLabel,
    MissingPath,
    NegativeMetric,
    SelfReference,
    SchemaVersionMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
    /// Id of the offending node or edge, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl ValidationIssue {
    fn new(code: IssueCode, subject: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            subject: subject.map(str::to_string),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "{}: {}", subject, self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn has_error(&self, code: IssueCode) -> bool {
        self.errors.iter().any(|i| i.code == code)
    }

    pub fn has_warning(&self, code: IssueCode) -> bool {
        self.warnings.iter().any(|i| i.code == code)
    }
}

#[derive(Default)]
struct Collector {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Collector {
    fn error(&mut self, code: IssueCode, subject: Option<&str>, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(code, subject, message));
    }

    fn warn(&mut self, code: IssueCode, subject: Option<&str>, message: impl Into<String>) {
        self.warnings
            .push(ValidationIssue::new(code, subject, message));
    }
}

pub fn validate(graph: &VisualizationGraph) -> ValidationResult {
    let mut out = Collector::default();

    if graph.metadata.schema_version != IVM_SCHEMA_VERSION {
        out.warn(
            IssueCode::SchemaVersionMismatch,
            None,
            format!(
                "schema version {} does not match {}",
                graph.metadata.schema_version, IVM_SCHEMA_VERSION
            ),
        );
    }

    let mut node_ids = HashSet::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        let id = Some(node.id.as_str());
        if !node_ids.insert(node.id.as_str()) {
            out.error(IssueCode::DuplicateNodeId, id, "duplicate node id");
        }
        if node.kind == NodeKind::Unknown {
            out.error(IssueCode::UnknownNodeKind, id, "unknown node kind");
        }
        if node.lod > MAX_LOD {
            out.error(
                IssueCode::LodOutOfRange,
                id,
                format!("LOD {} exceeds {}", node.lod, MAX_LOD),
            );
        }
        if !node.position.is_finite() {
            out.error(IssueCode::NonFinitePosition, id, "position is not finite");
        }
        if node.metadata.label.trim().is_empty() {
            out.error(IssueCode::MissingLabel, id, "missing label");
        }
        if node.metadata.path.trim().is_empty() {
            out.error(IssueCode::MissingPath, id, "missing path");
        }
        for (name, value) in [
            ("loc", node.metadata.loc),
            ("complexity", node.metadata.complexity),
        ] {
            if let Some(v) = value.filter(|v| *v < 0) {
                out.warn(IssueCode::NegativeMetric, id, format!("negative {name}: {v}"));
            }
        }
    }

    // Parents may point forward, so check once every id is known
    for node in &graph.nodes {
        if let Some(parent) = &node.parent {
            if !node_ids.contains(parent.as_str()) {
                out.error(
                    IssueCode::DanglingParent,
                    Some(&node.id),
                    format!("parent {parent} not found"),
                );
            }
        }
    }

    let mut edge_ids = HashSet::with_capacity(graph.edges.len());
    for edge in &graph.edges {
        let id = Some(edge.id.as_str());
        if !edge_ids.insert(edge.id.as_str()) {
            out.error(IssueCode::DuplicateEdgeId, id, "duplicate edge id");
        }
        if edge.kind == EdgeKind::Unknown {
            out.error(IssueCode::UnknownEdgeKind, id, "unknown edge kind");
        }
        if edge.lod > MAX_LOD {
            out.error(
                IssueCode::LodOutOfRange,
                id,
                format!("LOD {} exceeds {}", edge.lod, MAX_LOD),
            );
        }
        if !node_ids.contains(edge.source.as_str()) {
            out.error(
                IssueCode::DanglingEdgeSource,
                id,
                format!("source {} not found", edge.source),
            );
        }
        if !node_ids.contains(edge.target.as_str()) {
            out.error(
                IssueCode::DanglingEdgeTarget,
                id,
                format!("target {} not found", edge.target),
            );
        }
        if edge.source == edge.target {
            out.warn(IssueCode::SelfReference, id, "edge references itself");
        }
    }

    log::debug!(
        "Validated graph: {} errors, {} warnings",
        out.errors.len(),
        out.warnings.len()
    );

    ValidationResult {
        valid: out.errors.is_empty(),
        errors: out.errors,
        warnings: out.warnings,
    }
}

/// Validate and fail with every error at once; warnings never fail
pub fn assert_valid(graph: &VisualizationGraph) -> Result<ValidationResult, ValidationError> {
    let result = validate(graph);
    if result.valid {
        return Ok(result);
    }

    let details: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
    Err(ValidationError {
        message: format!(
            "visualization graph is invalid ({} error(s)): {}",
            result.errors.len(),
            details.join("; ")
        ),
        errors: result.errors,
    })
}
