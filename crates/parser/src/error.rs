use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParserError>;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parser initialization failed: {0}")]
    Init(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("parse failed for {path}: {message}")]
    Parse { path: String, message: String },
}

impl ParserError {
    pub fn unsupported_language(name: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(name.into())
    }

    pub fn unsupported_extension(path: impl Into<String>) -> Self {
        Self::UnsupportedExtension(path.into())
    }

    /// True for the "we don't handle this input" family of failures.
    pub const fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedLanguage(_) | Self::UnsupportedExtension(_)
        )
    }
}
