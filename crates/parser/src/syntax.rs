//! Typed view over the handful of tree-sitter node kinds the extractors consume.
//!
//! Instead of every extractor matching raw `node.kind()` strings while walking
//! the whole tree, [`SyntaxKind::classify`] maps a node onto a closed set of
//! variants and [`walk`] dispatches those to a [`SyntaxVisitor`], maintaining
//! the lexical [`Scope`] (enclosing class and function) on the way down.

use tree_sitter::Node;

/// Node kinds consumed by the extractors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKind {
    Class { is_abstract: bool },
    Interface,
    Enum,
    Function,
    /// `const f = () => ...` / `const f = function () {}`
    FunctionBinding,
    /// Any other `variable_declarator`
    Variable,
    Method,
    Field,
    Import,
    Export,
    Call,
    New,
    ExtendsClause,
    ImplementsClause,
}

impl SyntaxKind {
    pub fn classify(node: Node<'_>) -> Option<Self> {
        let kind = match node.kind() {
            "class_declaration" => Self::Class { is_abstract: false },
            "abstract_class_declaration" => Self::Class { is_abstract: true },
            "interface_declaration" => Self::Interface,
            "enum_declaration" => Self::Enum,
            "function_declaration" | "generator_function_declaration" => Self::Function,
            "variable_declarator" => {
                let is_function = node
                    .child_by_field_name("value")
                    .is_some_and(|value| is_function_value(value.kind()));
                if is_function {
                    Self::FunctionBinding
                } else {
                    Self::Variable
                }
            }
            "method_definition" | "abstract_method_signature" => Self::Method,
            "field_definition" | "public_field_definition" => Self::Field,
            "import_statement" => Self::Import,
            "export_statement" => Self::Export,
            "call_expression" => Self::Call,
            "new_expression" => Self::New,
            "extends_clause" => Self::ExtendsClause,
            "implements_clause" => Self::ImplementsClause,
            _ => return None,
        };
        Some(kind)
    }
}

fn is_function_value(kind: &str) -> bool {
    matches!(
        kind,
        "arrow_function" | "function_expression" | "function" | "generator_function"
    )
}

/// Lexical position of a node during a walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Innermost enclosing class
    pub class: Option<String>,
    /// Outermost named function or method within the innermost class
    pub function: Option<String>,
}

impl Scope {
    fn enter(&self, kind: SyntaxKind, node: Node<'_>, source: &str) -> Option<Self> {
        match kind {
            SyntaxKind::Class { .. } => Some(Self {
                class: field_text(node, "name", source).map(str::to_string),
                function: None,
            }),
            SyntaxKind::Method | SyntaxKind::Function | SyntaxKind::FunctionBinding
                if self.function.is_none() =>
            {
                Some(Self {
                    class: self.class.clone(),
                    function: field_text(node, "name", source).map(str::to_string),
                })
            }
            _ => None,
        }
    }
}

/// Whether a visitor wants the walker to continue into a node's children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descend {
    Yes,
    No,
}

/// What a visitor sees for each classified node
pub struct VisitCx<'a> {
    pub source: &'a str,
    pub scope: &'a Scope,
}

impl<'a> VisitCx<'a> {
    pub fn text(&self, node: Node<'_>) -> &'a str {
        node_text(node, self.source)
    }

    pub fn field(&self, node: Node<'_>, field: &str) -> Option<&'a str> {
        field_text(node, field, self.source)
    }
}

#[allow(unused_variables)]
pub trait SyntaxVisitor {
    fn visit_class(&mut self, node: Node<'_>, cx: &VisitCx<'_>, is_abstract: bool) -> Descend {
        Descend::Yes
    }

    fn visit_interface(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }

    fn visit_enum(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }

    fn visit_function(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }

    fn visit_function_binding(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }

    fn visit_variable(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }

    fn visit_method(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }

    fn visit_field(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }

    fn visit_import(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }

    fn visit_export(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }

    fn visit_call(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }

    fn visit_new(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }

    fn visit_extends(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }

    fn visit_implements(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        Descend::Yes
    }
}

/// Walk a syntax tree depth-first, dispatching classified nodes to `visitor`.
///
/// Uses an explicit stack so nesting depth is bounded by the heap, not the
/// thread stack. Siblings are visited in source order.
pub fn walk<V: SyntaxVisitor + ?Sized>(root: Node<'_>, source: &str, visitor: &mut V) {
    let mut scopes = vec![Scope::default()];
    let mut stack = vec![(root, 0usize)];
    let mut children = Vec::new();

    while let Some((node, scope_idx)) = stack.pop() {
        let kind = SyntaxKind::classify(node);

        let mut child_scope = scope_idx;
        if let Some(kind) = kind {
            let cx = VisitCx {
                source,
                scope: &scopes[scope_idx],
            };
            if dispatch(visitor, kind, node, &cx) == Descend::No {
                continue;
            }
            if let Some(inner) = scopes[scope_idx].enter(kind, node, source) {
                scopes.push(inner);
                child_scope = scopes.len() - 1;
            }
        }

        let mut cursor = node.walk();
        children.extend(node.children(&mut cursor));
        stack.extend(children.drain(..).rev().map(|child| (child, child_scope)));
    }
}

/// Pre-order traversal with a tree cursor, for callers that only need raw
/// nodes. Returning [`Descend::No`] skips the node's subtree.
pub fn preorder<'tree>(root: Node<'tree>, mut visit: impl FnMut(Node<'tree>) -> Descend) {
    let mut cursor = root.walk();
    loop {
        if visit(cursor.node()) == Descend::Yes && cursor.goto_first_child() {
            continue;
        }
        // The cursor cannot leave the subtree it was created on
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

fn dispatch<V: SyntaxVisitor + ?Sized>(
    visitor: &mut V,
    kind: SyntaxKind,
    node: Node<'_>,
    cx: &VisitCx<'_>,
) -> Descend {
    match kind {
        SyntaxKind::Class { is_abstract } => visitor.visit_class(node, cx, is_abstract),
        SyntaxKind::Interface => visitor.visit_interface(node, cx),
        SyntaxKind::Enum => visitor.visit_enum(node, cx),
        SyntaxKind::Function => visitor.visit_function(node, cx),
        SyntaxKind::FunctionBinding => visitor.visit_function_binding(node, cx),
        SyntaxKind::Variable => visitor.visit_variable(node, cx),
        SyntaxKind::Method => visitor.visit_method(node, cx),
        SyntaxKind::Field => visitor.visit_field(node, cx),
        SyntaxKind::Import => visitor.visit_import(node, cx),
        SyntaxKind::Export => visitor.visit_export(node, cx),
        SyntaxKind::Call => visitor.visit_call(node, cx),
        SyntaxKind::New => visitor.visit_new(node, cx),
        SyntaxKind::ExtendsClause => visitor.visit_extends(node, cx),
        SyntaxKind::ImplementsClause => visitor.visit_implements(node, cx),
    }
}

// ============================================================================
// Node helpers shared by the extractors
// ============================================================================

pub fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or_default()
}

pub fn field_text<'a>(node: Node<'_>, field: &str, source: &'a str) -> Option<&'a str> {
    node.child_by_field_name(field)
        .map(|child| node_text(child, source))
        .filter(|text| !text.is_empty())
}

/// 1-based line of a node's first byte
pub fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

pub fn end_line_of(node: Node<'_>) -> usize {
    node.end_position().row + 1
}

/// True if any direct child is the anonymous token `token` (e.g. `async`)
pub fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

pub fn child_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// String literal contents without the surrounding quotes
pub fn string_value(node: Node<'_>, source: &str) -> String {
    let text = node_text(node, source);
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

/// Declarations directly under `program` (optionally wrapped in `export`)
pub fn is_module_level(node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        match parent.kind() {
            "program" => return true,
            "export_statement" | "lexical_declaration" | "variable_declaration" => {
                current = parent.parent();
            }
            _ => return false,
        }
    }
    false
}

/// Whether the declaration sits inside an `export` statement
pub fn is_exported(node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        match parent.kind() {
            "export_statement" => return true,
            "lexical_declaration" | "variable_declaration" => current = parent.parent(),
            _ => return false,
        }
    }
    false
}

/// Parameter names of a `formal_parameters` node
pub fn parameter_names(params: Node<'_>, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        let name = match param.kind() {
            "required_parameter" | "optional_parameter" => {
                field_text(param, "pattern", source).map(str::to_string)
            }
            "assignment_pattern" => field_text(param, "left", source).map(str::to_string),
            "rest_pattern" => Some(node_text(param, source).trim_start_matches("...").to_string()),
            "comment" => None,
            _ => Some(node_text(param, source).to_string()),
        };
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            names.push(name);
        }
    }
    names
}

/// Drop generic arguments: `Repo<User>` -> `Repo`
pub fn strip_type_arguments(name: &str) -> &str {
    name.split('<').next().unwrap_or(name).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<(String, Scope)>,
    }

    impl SyntaxVisitor for Recorder {
        fn visit_call(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
            let callee = cx.field(node, "function").unwrap_or_default().to_string();
            self.seen.push((callee, cx.scope.clone()));
            Descend::Yes
        }
    }

    #[test]
    fn walk_tracks_enclosing_class_and_method() {
        let code = r"
class Greeter {
  greet() { format(); }
}
function main() { helper(); }
";
        let parsed = parse_source("a.ts", code, None).unwrap();
        let mut recorder = Recorder::default();
        walk(parsed.root(), parsed.source(), &mut recorder);

        assert_eq!(recorder.seen.len(), 2);
        assert_eq!(recorder.seen[0].0, "format");
        assert_eq!(recorder.seen[0].1.class.as_deref(), Some("Greeter"));
        assert_eq!(recorder.seen[0].1.function.as_deref(), Some("greet"));
        assert_eq!(recorder.seen[1].1.class, None);
        assert_eq!(recorder.seen[1].1.function.as_deref(), Some("main"));
    }

    #[test]
    fn classify_distinguishes_function_bindings() {
        let parsed = parse_source("a.js", "const f = () => 1;\nconst v = 2;\n", None).unwrap();
        let mut kinds = Vec::new();
        collect_kinds(parsed.root(), &mut kinds);
        assert!(kinds.contains(&SyntaxKind::FunctionBinding));
        assert!(kinds.contains(&SyntaxKind::Variable));
    }

    struct KindCollector(Vec<SyntaxKind>);

    impl SyntaxVisitor for KindCollector {
        fn visit_function_binding(&mut self, _: Node<'_>, _: &VisitCx<'_>) -> Descend {
            self.0.push(SyntaxKind::FunctionBinding);
            Descend::Yes
        }

        fn visit_variable(&mut self, _: Node<'_>, _: &VisitCx<'_>) -> Descend {
            self.0.push(SyntaxKind::Variable);
            Descend::Yes
        }
    }

    fn collect_kinds(node: Node<'_>, out: &mut Vec<SyntaxKind>) {
        let mut collector = KindCollector(Vec::new());
        walk(node, "", &mut collector);
        out.extend(collector.0);
    }

    #[test]
    fn strip_type_arguments_keeps_base_name() {
        assert_eq!(strip_type_arguments("Repo<User>"), "Repo");
        assert_eq!(strip_type_arguments("Base"), "Base");
    }
}
