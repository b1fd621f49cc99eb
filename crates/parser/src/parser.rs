use crate::error::{ParserError, Result};
use crate::language::Language;
use crate::syntax::{preorder, Descend};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// A syntax error located in the source (1-based line and column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxDiagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parsed source text together with its syntax tree.
///
/// Malformed input still produces a tree; `has_errors` reports whether
/// tree-sitter had to recover from anything.
pub struct ParsedSource {
    language: Language,
    source: String,
    tree: Tree,
}

impl ParsedSource {
    pub const fn language(&self) -> Language {
        self.language
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// Collect one diagnostic per error/missing node
    pub fn diagnostics(&self) -> Vec<SyntaxDiagnostic> {
        let mut out = Vec::new();
        if self.has_errors() {
            collect_diagnostics(self.root(), &mut out);
        }
        out
    }
}

fn collect_diagnostics(root: Node<'_>, out: &mut Vec<SyntaxDiagnostic>) {
    preorder(root, |node| {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                "unexpected syntax".to_string()
            };
            out.push(SyntaxDiagnostic {
                line: pos.row + 1,
                column: pos.column + 1,
                message,
            });
            return Descend::No;
        }
        if node.has_error() {
            Descend::Yes
        } else {
            Descend::No
        }
    });
}

/// Thin wrapper around a tree-sitter parser configured for one language
pub struct SourceParser {
    language: Language,
    parser: Parser,
}

impl SourceParser {
    pub fn new(language: Language) -> Result<Self> {
        let ts_lang = language.tree_sitter_language()?;

        let mut parser = Parser::new();
        parser
            .set_language(&ts_lang)
            .map_err(|e| ParserError::Init(format!("Failed to set language: {e}")))?;

        Ok(Self { language, parser })
    }

    pub const fn language(&self) -> Language {
        self.language
    }

    /// Parse source text. Syntax errors are reported through the returned
    /// tree, never as an `Err`.
    pub fn parse(&mut self, content: &str) -> Result<ParsedSource> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| ParserError::Parse {
                path: String::new(),
                message: "tree-sitter returned no tree".to_string(),
            })?;

        Ok(ParsedSource {
            language: self.language,
            source: content.to_string(),
            tree,
        })
    }
}

/// Resolve the language for a file: an explicit declaration wins, the
/// extension is the fallback.
pub fn resolve_language(path: &str, declared: Option<Language>) -> Result<Language> {
    match declared {
        Some(Language::Unknown) => Err(ParserError::unsupported_language(path)),
        Some(language) => Ok(language),
        None => match Language::from_path(path) {
            Language::Unknown => Err(ParserError::unsupported_extension(path)),
            language => Ok(language),
        },
    }
}

/// Parse a file's content, resolving its language first
pub fn parse_source(
    path: &str,
    content: &str,
    declared: Option<Language>,
) -> Result<ParsedSource> {
    let language = resolve_language(path, declared)?;
    let mut parser = SourceParser::new(language)?;
    parser.parse(content).map_err(|err| match err {
        ParserError::Parse { message, .. } => ParserError::Parse {
            path: path.to_string(),
            message,
        },
        other => other,
    })
}

/// Read a source file from disk
pub fn read_source(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| ParserError::Io {
        path: path.to_path_buf(),
        source,
    })
}
