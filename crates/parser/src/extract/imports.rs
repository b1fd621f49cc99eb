use crate::entities::{ExportInfo, ExportKind, ImportInfo, ImportKind, ImportSpecifier, ImportStyle};
use crate::parser::ParsedSource;
use crate::syntax::{
    child_of_kind, has_token, line_of, node_text, string_value, walk, Descend, SyntaxVisitor,
    VisitCx,
};
use tree_sitter::Node;

/// ES module imports/exports plus CommonJS `require` and dynamic `import()`
#[derive(Debug, Default)]
pub struct ImportExportExtractor {
    imports: Vec<ImportInfo>,
    exports: Vec<ExportInfo>,
}

impl ImportExportExtractor {
    pub fn into_parts(self) -> (Vec<ImportInfo>, Vec<ExportInfo>) {
        (self.imports, self.exports)
    }
}

impl SyntaxVisitor for ImportExportExtractor {
    fn visit_import(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        let Some(source) = node.child_by_field_name("source") else {
            return Descend::No;
        };

        let specifiers = child_of_kind(node, "import_clause")
            .map(|clause| import_specifiers(clause, cx.source))
            .unwrap_or_default();

        self.imports.push(ImportInfo {
            source: string_value(source, cx.source),
            specifiers,
            style: ImportStyle::Static,
            is_type_only: has_token(node, "type"),
            line: line_of(node),
        });
        Descend::No
    }

    fn visit_call(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        let Some(callee) = node.child_by_field_name("function") else {
            return Descend::Yes;
        };
        let style = match callee.kind() {
            "import" => ImportStyle::Dynamic,
            "identifier" if cx.text(callee) == "require" => ImportStyle::Require,
            _ => return Descend::Yes,
        };
        let Some(source) = first_string_argument(node, cx.source) else {
            return Descend::Yes;
        };

        let specifiers = match style {
            ImportStyle::Require => require_specifiers(node, cx.source),
            _ => Vec::new(),
        };

        self.imports.push(ImportInfo {
            source,
            specifiers,
            style,
            is_type_only: false,
            line: line_of(node),
        });
        Descend::Yes
    }

    fn visit_export(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        let line = line_of(node);
        let source = node
            .child_by_field_name("source")
            .map(|s| string_value(s, cx.source));
        let is_default = has_token(node, "default");

        // export * from "x" / export * as ns from "x"
        if let Some(namespace) = child_of_kind(node, "namespace_export") {
            let alias = last_identifier(namespace, cx.source);
            self.exports.push(ExportInfo {
                kind: ExportKind::All,
                name: "*".to_string(),
                alias,
                source,
                line,
            });
            return Descend::Yes;
        }
        if has_token(node, "*") {
            self.exports.push(ExportInfo {
                kind: ExportKind::All,
                name: "*".to_string(),
                alias: None,
                source,
                line,
            });
            return Descend::Yes;
        }

        if let Some(clause) = child_of_kind(node, "export_clause") {
            let kind = if source.is_some() {
                ExportKind::ReExport
            } else {
                ExportKind::Named
            };
            let mut cursor = clause.walk();
            for spec in clause.named_children(&mut cursor) {
                if spec.kind() != "export_specifier" {
                    continue;
                }
                let Some(name) = cx.field(spec, "name") else {
                    continue;
                };
                self.exports.push(ExportInfo {
                    kind,
                    name: name.to_string(),
                    alias: cx.field(spec, "alias").map(str::to_string),
                    source: source.clone(),
                    line,
                });
            }
            return Descend::Yes;
        }

        if let Some(declaration) = node.child_by_field_name("declaration") {
            let kind = if is_default {
                ExportKind::Default
            } else {
                ExportKind::Named
            };
            let names = declared_names(declaration, cx.source);
            if names.is_empty() && is_default {
                self.exports.push(default_export("default", line));
            }
            for name in names {
                self.exports.push(ExportInfo {
                    kind,
                    name,
                    alias: None,
                    source: None,
                    line,
                });
            }
            return Descend::Yes;
        }

        if is_default {
            let name = node
                .child_by_field_name("value")
                .filter(|value| value.kind() == "identifier")
                .map_or("default", |value| cx.text(value));
            self.exports.push(default_export(name, line));
        }

        Descend::Yes
    }
}

fn default_export(name: &str, line: usize) -> ExportInfo {
    ExportInfo {
        kind: ExportKind::Default,
        name: name.to_string(),
        alias: None,
        source: None,
        line,
    }
}

fn import_specifiers(clause: Node<'_>, source: &str) -> Vec<ImportSpecifier> {
    let mut out = Vec::new();
    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => out.push(ImportSpecifier {
                kind: ImportKind::Default,
                imported: "default".to_string(),
                local: node_text(child, source).to_string(),
            }),
            "namespace_import" => {
                if let Some(local) = last_identifier(child, source) {
                    out.push(ImportSpecifier {
                        kind: ImportKind::Namespace,
                        imported: "*".to_string(),
                        local,
                    });
                }
            }
            "named_imports" => {
                let mut inner = child.walk();
                for spec in child.named_children(&mut inner) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name) = spec.child_by_field_name("name") else {
                        continue;
                    };
                    let imported = string_value(name, source);
                    let local = spec
                        .child_by_field_name("alias")
                        .map_or_else(|| imported.clone(), |alias| node_text(alias, source).to_string());
                    out.push(ImportSpecifier {
                        kind: ImportKind::Named,
                        imported,
                        local,
                    });
                }
            }
            _ => {}
        }
    }
    out
}

/// `const x = require("y")` binds a default; `const { a, b: c } = require("y")`
/// binds named members.
fn require_specifiers(call: Node<'_>, source: &str) -> Vec<ImportSpecifier> {
    let Some(declarator) = call.parent().filter(|p| p.kind() == "variable_declarator") else {
        return Vec::new();
    };
    let Some(name) = declarator.child_by_field_name("name") else {
        return Vec::new();
    };

    match name.kind() {
        "identifier" => vec![ImportSpecifier {
            kind: ImportKind::Default,
            imported: "default".to_string(),
            local: node_text(name, source).to_string(),
        }],
        "object_pattern" => {
            let mut out = Vec::new();
            let mut cursor = name.walk();
            for prop in name.named_children(&mut cursor) {
                match prop.kind() {
                    "shorthand_property_identifier_pattern" => {
                        let ident = node_text(prop, source).to_string();
                        out.push(ImportSpecifier {
                            kind: ImportKind::Named,
                            imported: ident.clone(),
                            local: ident,
                        });
                    }
                    "pair_pattern" => {
                        let key = prop.child_by_field_name("key").map(|k| node_text(k, source));
                        let value = prop.child_by_field_name("value").map(|v| node_text(v, source));
                        if let (Some(key), Some(value)) = (key, value) {
                            out.push(ImportSpecifier {
                                kind: ImportKind::Named,
                                imported: key.to_string(),
                                local: value.to_string(),
                            });
                        }
                    }
                    _ => {}
                }
            }
            out
        }
        _ => Vec::new(),
    }
}

fn first_string_argument(call: Node<'_>, source: &str) -> Option<String> {
    let args = call.child_by_field_name("arguments")?;
    let mut cursor = args.walk();
    let first = args.named_children(&mut cursor).next()?;
    (first.kind() == "string").then(|| string_value(first, source))
}

fn last_identifier(node: Node<'_>, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "identifier")
        .last()
        .map(|ident| node_text(ident, source).to_string());
    found
}

fn declared_names(declaration: Node<'_>, source: &str) -> Vec<String> {
    match declaration.kind() {
        "lexical_declaration" | "variable_declaration" => {
            let mut names = Vec::new();
            let mut cursor = declaration.walk();
            for declarator in declaration.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(name) = declarator
                    .child_by_field_name("name")
                    .filter(|n| n.kind() == "identifier")
                {
                    names.push(node_text(name, source).to_string());
                }
            }
            names
        }
        _ => declaration
            .child_by_field_name("name")
            .map(|name| vec![node_text(name, source).to_string()])
            .unwrap_or_default(),
    }
}

pub fn extract_imports_exports(parsed: &ParsedSource) -> (Vec<ImportInfo>, Vec<ExportInfo>) {
    let mut extractor = ImportExportExtractor::default();
    walk(parsed.root(), parsed.source(), &mut extractor);
    extractor.into_parts()
}
