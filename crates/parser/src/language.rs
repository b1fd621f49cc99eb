use crate::error::{ParserError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source language understood by the extractors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    JavaScript,
    TypeScript,
    Tsx,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Self::JavaScript,
            "ts" | "mts" | "cts" => Self::TypeScript,
            "tsx" => Self::Tsx,
            _ => Self::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Unknown, Self::from_extension)
    }

    /// Parse a declared language name (as supplied by a repository loader)
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "javascript" | "js" | "jsx" | "ecmascript" => Self::JavaScript,
            "typescript" | "ts" => Self::TypeScript,
            "tsx" | "typescriptreact" => Self::Tsx,
            _ => Self::Unknown,
        }
    }

    /// Get language name as string
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::Unknown => "unknown",
        }
    }

    /// Check if this language is supported for AST parsing
    pub const fn supports_ast(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// TypeScript dialects carry interfaces, enums and access modifiers
    pub const fn is_typescript(self) -> bool {
        matches!(self, Self::TypeScript | Self::Tsx)
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> Result<tree_sitter::Language> {
        match self {
            Self::JavaScript => Ok(tree_sitter_javascript::LANGUAGE.into()),
            Self::TypeScript => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            Self::Tsx => Ok(tree_sitter_typescript::LANGUAGE_TSX.into()),
            Self::Unknown => Err(ParserError::unsupported_language(self.as_str())),
        }
    }

    /// Extensions tried, in order, when resolving an extension-less import
    pub const fn resolution_extensions() -> &'static [&'static str] {
        &["ts", "tsx", "js", "jsx", "mjs", "cjs"]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
