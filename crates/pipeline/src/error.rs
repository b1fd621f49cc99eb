use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Graph build failed: {0}")]
    Build(#[from] codescape_graph::GraphError),

    #[error("Layout failed: {0}")]
    Layout(#[from] codescape_layout::LayoutError),

    #[error(transparent)]
    Validation(#[from] codescape_ivm::ValidationError),

    #[error("Focus node '{0}' is not in the model")]
    UnknownFocus(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
