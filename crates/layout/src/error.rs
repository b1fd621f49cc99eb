use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("No registered layout engine applies to this graph")]
    NoEngine,

    #[error("Unknown layout engine: {0}")]
    UnknownEngine(String),

    #[error("Layout engine '{engine}' does not apply: {reason}")]
    NotApplicable { engine: String, reason: String },

    #[error("Invalid layout configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse layout configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl LayoutError {
    pub fn not_applicable(engine: &str, reason: impl Into<String>) -> Self {
        Self::NotApplicable {
            engine: engine.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
