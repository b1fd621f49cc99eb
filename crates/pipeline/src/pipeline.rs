use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use codescape_graph::{BuildIssue, GraphBuilder, SourceFile};
use codescape_ivm::{
    assert_valid, filter_by_lod, validate, ConverterOptions, LodFilter, ModelConverter,
    ValidationResult, VisualizationGraph,
};
use codescape_layout::LayoutRegistry;
use std::time::Instant;

/// Output of one run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub graph: VisualizationGraph,
    pub validation: ValidationResult,
    /// Layout engine that produced the positions
    pub engine: String,
    /// Per-file problems that degraded, but did not stop, the build
    pub build_issues: Vec<BuildIssue>,
}

/// parse → dependency graph → visualization model → (focus) → layout
pub struct Pipeline {
    config: PipelineConfig,
    builder: GraphBuilder,
    registry: LayoutRegistry,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, registry: LayoutRegistry) -> Result<Self> {
        config.layout.validate()?;
        let builder = GraphBuilder::new(config.builder.clone())?;
        Ok(Self {
            config,
            builder,
            registry,
        })
    }

    /// Pipeline over the built-in layout engines
    pub fn with_defaults(config: PipelineConfig) -> Result<Self> {
        Self::new(config, LayoutRegistry::with_defaults())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &LayoutRegistry {
        &self.registry
    }

    pub fn run(&self, files: &[SourceFile]) -> Result<PipelineOutput> {
        let start = Instant::now();

        let dependency_graph = self.builder.build(files);
        let build_issues = dependency_graph.issues().to_vec();

        let converter = ModelConverter::new(ConverterOptions {
            name: self.config.name.clone(),
            root_path: self.config.root_path.clone(),
            ..ConverterOptions::default()
        });
        let mut graph = converter.convert(&dependency_graph);

        if let Some(focus) = self.config.focus.as_deref() {
            graph = graph
                .focus_on(focus)
                .ok_or_else(|| PipelineError::UnknownFocus(focus.to_string()))?;
            log::info!("Focused on '{focus}': {} nodes", graph.nodes.len());
        }

        let layout = match self.config.engine.as_deref() {
            Some(engine) => self
                .registry
                .layout_with(engine, &graph, &self.config.layout)?,
            None => self.registry.layout_auto(&graph, &self.config.layout)?,
        };
        layout.apply(&mut graph);

        if let Some(max_lod) = self.config.max_lod {
            graph = filter_by_lod(
                &graph,
                max_lod,
                LodFilter {
                    include_ancestors: self.config.include_ancestors,
                },
            );
        }

        let validation = if self.config.assert_valid {
            assert_valid(&graph)?
        } else {
            validate(&graph)
        };
        for warning in &validation.warnings {
            log::warn!("Model warning: {warning}");
        }
        if !validation.valid {
            log::warn!(
                "Model has {} validation error(s)",
                validation.errors.len()
            );
        }

        log::info!(
            "Pipeline finished in {:?}: {} files, {} nodes, {} edges, engine '{}', {} issue(s)",
            start.elapsed(),
            files.len(),
            graph.metadata.stats.total_nodes,
            graph.metadata.stats.total_edges,
            layout.engine,
            build_issues.len()
        );

        Ok(PipelineOutput {
            graph,
            validation,
            engine: layout.engine,
            build_issues,
        })
    }
}
