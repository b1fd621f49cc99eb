use crate::config::LayoutConfig;
use crate::engine::{LayoutEngine, LayoutResult};
use crate::engines::{BuildingEngine, CellEngine, CityEngine, ForceDirectedEngine};
use crate::error::{LayoutError, Result};
use codescape_ivm::VisualizationGraph;

/// Ordered set of layout engines.
///
/// Selection is a linear scan: the first engine whose `can_layout` accepts
/// the graph wins, so registration order is the tie-break.
#[derive(Default)]
pub struct LayoutRegistry {
    engines: Vec<Box<dyn LayoutEngine>>,
}

impl std::fmt::Debug for LayoutRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.engine_types()).finish()
    }
}

impl LayoutRegistry {
    /// Registry with no engines
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in engines, most specific first: cell, building, city, force
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CellEngine::new());
        registry.register(BuildingEngine::new());
        registry.register(CityEngine::new());
        registry.register(ForceDirectedEngine::new());
        registry
    }

    pub fn register(&mut self, engine: impl LayoutEngine + 'static) {
        self.register_boxed(Box::new(engine));
    }

    pub fn register_boxed(&mut self, engine: Box<dyn LayoutEngine>) {
        log::debug!("Registered layout engine '{}'", engine.engine_type());
        self.engines.push(engine);
    }

    /// Engines in registration order
    pub fn engines(&self) -> impl Iterator<Item = &dyn LayoutEngine> {
        self.engines.iter().map(|e| &**e)
    }

    pub fn engine_types(&self) -> Vec<&'static str> {
        self.engines.iter().map(|e| e.engine_type()).collect()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn get(&self, engine_type: &str) -> Option<&dyn LayoutEngine> {
        self.engines()
            .find(|e| e.engine_type() == engine_type)
    }

    /// First engine that applies to `graph`
    pub fn select(&self, graph: &VisualizationGraph) -> Option<&dyn LayoutEngine> {
        self.engines().find(|e| e.can_layout(graph))
    }

    /// Lay out with a named engine
    pub fn layout_with(
        &self,
        engine_type: &str,
        graph: &VisualizationGraph,
        config: &LayoutConfig,
    ) -> Result<LayoutResult> {
        config.validate()?;
        let engine = self
            .get(engine_type)
            .ok_or_else(|| LayoutError::UnknownEngine(engine_type.to_string()))?;
        if !engine.can_layout(graph) {
            return Err(LayoutError::not_applicable(
                engine_type,
                "engine rejected the graph",
            ));
        }
        engine.layout(graph, config)
    }

    /// Lay out with the first applicable engine
    pub fn layout_auto(
        &self,
        graph: &VisualizationGraph,
        config: &LayoutConfig,
    ) -> Result<LayoutResult> {
        config.validate()?;
        let engine = self.select(graph).ok_or(LayoutError::NoEngine)?;
        log::info!(
            "Selected layout engine '{}' for {} nodes",
            engine.engine_type(),
            graph.nodes.len()
        );
        engine.layout(graph, config)
    }
}
