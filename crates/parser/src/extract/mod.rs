//! Entity extractors. Each one is an independent [`SyntaxVisitor`]; the
//! [`EntityExtractor`] facade runs all of them over one parsed file.
//!
//! [`SyntaxVisitor`]: crate::syntax::SyntaxVisitor

pub mod calls;
pub mod classes;
pub mod functions;
pub mod imports;
pub mod metrics;

use crate::entities::FileEntities;
use crate::error::Result;
use crate::language::Language;
use crate::parser::{parse_source, ParsedSource};

pub use calls::{extract_calls, CallExtractor};
pub use classes::{extract_classes, extract_type_declarations, ClassExtractor, TypeDeclExtractor};
pub use functions::{extract_functions, extract_variables, FunctionExtractor, VariableExtractor};
pub use imports::{extract_imports_exports, ImportExportExtractor};
pub use metrics::{compute_metrics, lines_of_code};

/// Runs every extractor over a parsed file
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn extract(parsed: &ParsedSource, path: &str) -> FileEntities {
        let (interfaces, enums) = extract_type_declarations(parsed);
        let (imports, exports) = extract_imports_exports(parsed);
        let diagnostics = parsed.diagnostics();

        if !diagnostics.is_empty() {
            log::warn!(
                "{path}: {} syntax error(s), extracting what is recoverable",
                diagnostics.len()
            );
        }

        FileEntities {
            path: path.to_string(),
            language: parsed.language(),
            classes: extract_classes(parsed),
            interfaces,
            enums,
            functions: extract_functions(parsed),
            variables: extract_variables(parsed),
            imports,
            exports,
            calls: extract_calls(parsed),
            metrics: compute_metrics(parsed),
            has_errors: parsed.has_errors(),
            diagnostics,
        }
    }
}

/// Parse and extract a file in one step
pub fn extract_file(path: &str, content: &str, declared: Option<Language>) -> Result<FileEntities> {
    let parsed = parse_source(path, content, declared)?;
    Ok(EntityExtractor::extract(&parsed, path))
}
