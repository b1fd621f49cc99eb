use crate::entities::{ClassInfo, EnumInfo, InterfaceInfo, MethodInfo, PropertyInfo, Visibility};
use crate::parser::ParsedSource;
use crate::syntax::{
    child_of_kind, end_line_of, field_text, has_token, is_exported, line_of, node_text,
    parameter_names, strip_type_arguments, walk, Descend, SyntaxKind, SyntaxVisitor, VisitCx,
};
use tree_sitter::Node;

/// Collects class declarations, including nested ones
#[derive(Debug, Default)]
pub struct ClassExtractor {
    classes: Vec<ClassInfo>,
}

impl ClassExtractor {
    pub fn into_classes(self) -> Vec<ClassInfo> {
        self.classes
    }
}

impl SyntaxVisitor for ClassExtractor {
    fn visit_class(&mut self, node: Node<'_>, cx: &VisitCx<'_>, is_abstract: bool) -> Descend {
        let Some(name) = cx.field(node, "name") else {
            return Descend::Yes;
        };

        let (extends, implements) = heritage(node, cx.source);
        let (methods, properties) = node
            .child_by_field_name("body")
            .map(|body| members(body, cx.source))
            .unwrap_or_default();

        self.classes.push(ClassInfo {
            name: name.to_string(),
            extends,
            implements,
            methods,
            properties,
            is_abstract,
            is_exported: is_exported(node),
            parent_class: cx.scope.class.clone(),
            line: line_of(node),
            end_line: end_line_of(node),
        });

        Descend::Yes
    }
}

/// Interfaces and enums (TypeScript only; JavaScript trees never contain them)
#[derive(Debug, Default)]
pub struct TypeDeclExtractor {
    interfaces: Vec<InterfaceInfo>,
    enums: Vec<EnumInfo>,
}

impl TypeDeclExtractor {
    pub fn into_parts(self) -> (Vec<InterfaceInfo>, Vec<EnumInfo>) {
        (self.interfaces, self.enums)
    }
}

impl SyntaxVisitor for TypeDeclExtractor {
    fn visit_interface(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        if let Some(name) = cx.field(node, "name") {
            let extends = ["extends_type_clause", "extends_clause"]
                .iter()
                .find_map(|kind| child_of_kind(node, kind))
                .map(|clause| type_list(clause, cx.source))
                .unwrap_or_default();

            self.interfaces.push(InterfaceInfo {
                name: name.to_string(),
                extends,
                is_exported: is_exported(node),
                line: line_of(node),
            });
        }
        Descend::No
    }

    fn visit_enum(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        if let Some(name) = cx.field(node, "name") {
            self.enums.push(EnumInfo {
                name: name.to_string(),
                is_exported: is_exported(node),
                line: line_of(node),
            });
        }
        Descend::No
    }
}

pub fn extract_classes(parsed: &ParsedSource) -> Vec<ClassInfo> {
    let mut extractor = ClassExtractor::default();
    walk(parsed.root(), parsed.source(), &mut extractor);
    extractor.into_classes()
}

pub fn extract_type_declarations(parsed: &ParsedSource) -> (Vec<InterfaceInfo>, Vec<EnumInfo>) {
    let mut extractor = TypeDeclExtractor::default();
    walk(parsed.root(), parsed.source(), &mut extractor);
    extractor.into_parts()
}

/// `extends` target and `implements` list for both grammars:
/// JavaScript's `class_heritage` holds the expression directly, TypeScript
/// wraps it in `extends_clause` / `implements_clause`.
fn heritage(class: Node<'_>, source: &str) -> (Option<String>, Vec<String>) {
    let Some(heritage) = child_of_kind(class, "class_heritage") else {
        return (None, Vec::new());
    };

    let mut extends = None;
    let mut implements = Vec::new();

    let mut cursor = heritage.walk();
    for child in heritage.named_children(&mut cursor) {
        match SyntaxKind::classify(child) {
            Some(SyntaxKind::ExtendsClause) => {
                let target = child
                    .child_by_field_name("value")
                    .or_else(|| child.named_child(0))
                    .map(|value| strip_type_arguments(node_text(value, source)).to_string());
                extends = target.filter(|t| !t.is_empty());
            }
            Some(SyntaxKind::ImplementsClause) => implements = type_list(child, source),
            _ if extends.is_none() && child.kind() != "comment" => {
                let target = strip_type_arguments(node_text(child, source));
                if !target.is_empty() {
                    extends = Some(target.to_string());
                }
            }
            _ => {}
        }
    }

    (extends, implements)
}

fn type_list(clause: Node<'_>, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        let name = strip_type_arguments(node_text(child, source));
        if !name.is_empty() {
            out.push(name.to_string());
        }
    }
    out
}

fn members(body: Node<'_>, source: &str) -> (Vec<MethodInfo>, Vec<PropertyInfo>) {
    let mut methods = Vec::new();
    let mut properties = Vec::new();

    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        match SyntaxKind::classify(member) {
            Some(SyntaxKind::Method) => {
                let Some(name_node) = member.child_by_field_name("name") else {
                    continue;
                };
                let name = node_text(name_node, source);
                let parameters = member
                    .child_by_field_name("parameters")
                    .map(|params| parameter_names(params, source))
                    .unwrap_or_default();

                if name == "constructor" {
                    if let Some(params) = member.child_by_field_name("parameters") {
                        properties.extend(parameter_properties(params, source));
                    }
                }

                methods.push(MethodInfo {
                    name: name.to_string(),
                    parameters,
                    is_async: has_token(member, "async"),
                    is_static: has_token(member, "static"),
                    visibility: member_visibility(member, name_node, source),
                    line: line_of(member),
                });
            }
            Some(SyntaxKind::Field) => {
                let name_node = member
                    .child_by_field_name("name")
                    .or_else(|| member.child_by_field_name("property"));
                let Some(name_node) = name_node else {
                    continue;
                };
                properties.push(PropertyInfo {
                    name: node_text(name_node, source).to_string(),
                    visibility: member_visibility(member, name_node, source),
                    is_static: has_token(member, "static"),
                    line: line_of(member),
                });
            }
            _ => {}
        }
    }

    (methods, properties)
}

/// TypeScript parameter properties: `constructor(private repo: Repo)`
fn parameter_properties(params: Node<'_>, source: &str) -> Vec<PropertyInfo> {
    let mut out = Vec::new();
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        let Some(modifier) = child_of_kind(param, "accessibility_modifier") else {
            continue;
        };
        if let Some(name) = field_text(param, "pattern", source) {
            out.push(PropertyInfo {
                name: name.to_string(),
                visibility: Visibility::from_modifier(node_text(modifier, source)),
                is_static: false,
                line: line_of(param),
            });
        }
    }
    out
}

fn member_visibility(member: Node<'_>, name: Node<'_>, source: &str) -> Visibility {
    if name.kind() == "private_property_identifier" {
        return Visibility::Private;
    }
    child_of_kind(member, "accessibility_modifier")
        .map_or(Visibility::Public, |modifier| {
            Visibility::from_modifier(node_text(modifier, source))
        })
}
