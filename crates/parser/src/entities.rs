use crate::language::Language;
use crate::parser::SyntaxDiagnostic;
use serde::{Deserialize, Serialize};

/// Member visibility; unspecified members are public
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

impl Visibility {
    pub fn from_modifier(modifier: &str) -> Self {
        match modifier.trim() {
            "private" => Self::Private,
            "protected" => Self::Protected,
            _ => Self::Public,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    pub parameters: Vec<String>,
    pub is_async: bool,
    pub is_static: bool,
    pub visibility: Visibility,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub methods: Vec<MethodInfo>,
    pub properties: Vec<PropertyInfo>,
    pub is_abstract: bool,
    pub is_exported: bool,
    /// Enclosing class for nested declarations
    pub parent_class: Option<String>,
    pub line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub extends: Vec<String>,
    pub is_exported: bool,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumInfo {
    pub name: String,
    pub is_exported: bool,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub parameters: Vec<String>,
    pub is_async: bool,
    pub is_exported: bool,
    pub line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub name: String,
    pub is_exported: bool,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Named,
    Default,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub kind: ImportKind,
    /// Name exported by the target module (`default` / `*` for the
    /// default and namespace forms)
    pub imported: String,
    /// Binding introduced in the importing module
    pub local: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStyle {
    /// `import ... from "x"`
    Static,
    /// `require("x")`
    Require,
    /// `import("x")`
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportInfo {
    pub source: String,
    /// Empty for side-effect imports (`import "./polyfill"`)
    pub specifiers: Vec<ImportSpecifier>,
    pub style: ImportStyle,
    pub is_type_only: bool,
    pub line: usize,
}

impl ImportInfo {
    pub fn is_side_effect_only(&self) -> bool {
        self.specifiers.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Named,
    Default,
    /// `export { a as b } from "x"`
    ReExport,
    /// `export * from "x"` / `export * as ns from "x"`
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportInfo {
    pub kind: ExportKind,
    pub name: String,
    pub alias: Option<String>,
    pub source: Option<String>,
    pub line: usize,
}

impl ExportInfo {
    /// Name visible to importers
    pub fn exported_name(&self) -> &str {
        match self.kind {
            ExportKind::Default => "default",
            _ => self.alias.as_deref().unwrap_or(&self.name),
        }
    }
}

/// Where a call expression lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum CallerScope {
    Module,
    Function { name: String },
    Class { class: String },
    Method { class: String, method: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub caller: CallerScope,
    pub callee: String,
    /// Object text for member calls (`this`, `utils`, `this.repo`)
    pub receiver: Option<String>,
    pub is_new: bool,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetrics {
    pub lines_of_code: usize,
    pub class_count: usize,
    pub function_count: usize,
    pub complexity: usize,
}

/// Everything extracted from one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntities {
    pub path: String,
    pub language: Language,
    pub classes: Vec<ClassInfo>,
    pub interfaces: Vec<InterfaceInfo>,
    pub enums: Vec<EnumInfo>,
    pub functions: Vec<FunctionInfo>,
    pub variables: Vec<VariableInfo>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    pub calls: Vec<CallSite>,
    pub metrics: FileMetrics,
    pub has_errors: bool,
    pub diagnostics: Vec<SyntaxDiagnostic>,
}

impl FileEntities {
    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.iter().find(|class| class.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.iter().find(|function| function.name == name)
    }

    /// Name bound to `export default`, when it refers to a declaration
    pub fn default_export(&self) -> Option<&str> {
        self.exports
            .iter()
            .find(|export| export.kind == ExportKind::Default)
            .map(|export| export.name.as_str())
            .filter(|name| *name != "default")
    }
}
