//! # Codescape Parser
//!
//! JavaScript / TypeScript source parsing and entity extraction.
//!
//! ## Architecture
//!
//! ```text
//! (path, content, language?)
//!     │
//!     ├──> SourceParser (tree-sitter)
//!     │      └─ ParsedSource: tree + error flag + diagnostics
//!     │
//!     ├──> walk() + SyntaxVisitor
//!     │      ├─ ClassExtractor / TypeDeclExtractor
//!     │      ├─ FunctionExtractor / VariableExtractor
//!     │      ├─ ImportExportExtractor
//!     │      └─ CallExtractor
//!     │
//!     └──> FileEntities
//!            ├─ metrics (loc, complexity)
//!            └─ containment tree (file → class → member)
//! ```

mod containment;
mod entities;
mod error;
pub mod external;
pub mod extract;
mod language;
mod parser;
pub mod syntax;

pub use containment::{build_containment, ContainmentNode, EntityKind};
pub use entities::{
    CallSite, CallerScope, ClassInfo, EnumInfo, ExportInfo, ExportKind, FileEntities,
    FileMetrics, FunctionInfo, ImportInfo, ImportKind, ImportSpecifier, ImportStyle,
    InterfaceInfo, MethodInfo, PropertyInfo, VariableInfo, Visibility,
};
pub use error::{ParserError, Result};
pub use external::{is_external_specifier, package_name};
pub use extract::{extract_file, EntityExtractor};
pub use language::Language;
pub use parser::{
    parse_source, read_source, resolve_language, ParsedSource, SourceParser, SyntaxDiagnostic,
};
