use crate::error::{PipelineError, Result};
use codescape_graph::BuilderConfig;
use codescape_layout::LayoutConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conventional config file name looked up in a project root
pub const CONFIG_FILE_NAME: &str = "codescape.toml";

/// Everything a pipeline run needs besides the files themselves.
///
/// ```toml
/// name = "my-app"
/// engine = "city"
/// max_lod = 3
///
/// [builder]
/// include_external_packages = true
///
/// [layout.city]
/// floor_height = 5.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub name: String,
    pub root_path: Option<String>,
    pub builder: BuilderConfig,
    pub layout: LayoutConfig,
    /// Force a layout engine; auto-selected when absent
    pub engine: Option<String>,
    /// Node id to zoom into; the model shrinks to it and its direct children
    pub focus: Option<String>,
    /// Drop nodes above this LOD from the output
    pub max_lod: Option<u8>,
    /// Keep the parent chain of nodes that survive `max_lod`
    pub include_ancestors: bool,
    /// Fail the run when the final model has validation errors
    pub assert_valid: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "codescape".to_string(),
            root_path: None,
            builder: BuilderConfig::default(),
            layout: LayoutConfig::default(),
            engine: None,
            focus: None,
            max_lod: None,
            include_ancestors: true,
            assert_valid: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.layout.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded pipeline config from {}", path.display());
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_sections_default() {
        let config = PipelineConfig::from_toml_str("name = \"demo\"").unwrap();
        assert_eq!(config.name, "demo");
        assert_eq!(config.builder, BuilderConfig::default());
        assert_eq!(config.layout, LayoutConfig::default());
        assert!(config.include_ancestors);
        assert_eq!(config.engine, None);
        assert_eq!(config.focus, None);
    }

    #[test]
    fn nested_sections_parse() {
        let config = PipelineConfig::from_toml_str(
            r#"
            engine = "city"
            focus = "class:src/app.ts#App"
            max_lod = 3

            [builder]
            include_external_packages = true
            parallel = false

            [layout]
            seed = 9

            [layout.city]
            floor_height = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.as_deref(), Some("city"));
        assert_eq!(config.focus.as_deref(), Some("class:src/app.ts#App"));
        assert_eq!(config.max_lod, Some(3));
        assert!(config.builder.include_external_packages);
        assert!(!config.builder.parallel);
        assert_eq!(config.layout.seed, 9);
        assert_eq!(config.layout.city.floor_height, 5.0);
        assert_eq!(config.layout.city.street_width, 4.0);
    }

    #[test]
    fn invalid_layout_values_fail_loading() {
        let err = PipelineConfig::from_toml_str("[layout]\nspacing = -2.0").unwrap_err();
        assert!(matches!(err, PipelineError::Layout(_)));
    }

    #[test]
    fn load_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = PipelineConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));

        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "name = \"from-disk\"\n").unwrap();
        assert_eq!(PipelineConfig::load(&path).unwrap().name, "from-disk");
    }
}
