use crate::entities::{FunctionInfo, VariableInfo};
use crate::parser::ParsedSource;
use crate::syntax::{
    end_line_of, has_token, is_exported, is_module_level, line_of, node_text, parameter_names,
    walk, Descend, SyntaxVisitor, VisitCx,
};
use tree_sitter::Node;

/// Top-level and exported functions, including arrow/function-expression bindings
#[derive(Debug, Default)]
pub struct FunctionExtractor {
    functions: Vec<FunctionInfo>,
}

impl FunctionExtractor {
    pub fn into_functions(self) -> Vec<FunctionInfo> {
        self.functions
    }
}

impl SyntaxVisitor for FunctionExtractor {
    fn visit_function(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        if !is_module_level(node) {
            return Descend::No;
        }
        let Some(name) = cx.field(node, "name") else {
            return Descend::No;
        };

        self.functions.push(FunctionInfo {
            name: name.to_string(),
            parameters: node
                .child_by_field_name("parameters")
                .map(|params| parameter_names(params, cx.source))
                .unwrap_or_default(),
            is_async: has_token(node, "async"),
            is_exported: is_exported(node),
            line: line_of(node),
            end_line: end_line_of(node),
        });
        Descend::No
    }

    fn visit_function_binding(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        if !is_module_level(node) {
            return Descend::No;
        }
        let (Some(name), Some(value)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("value"),
        ) else {
            return Descend::No;
        };
        if name.kind() != "identifier" {
            return Descend::No;
        }

        let parameters = if let Some(params) = value.child_by_field_name("parameters") {
            parameter_names(params, cx.source)
        } else {
            // `x => x` has a single bare `parameter`
            value
                .child_by_field_name("parameter")
                .map(|param| vec![node_text(param, cx.source).to_string()])
                .unwrap_or_default()
        };

        self.functions.push(FunctionInfo {
            name: cx.text(name).to_string(),
            parameters,
            is_async: has_token(value, "async"),
            is_exported: is_exported(node),
            line: line_of(node),
            end_line: end_line_of(node),
        });
        Descend::No
    }

    fn visit_class(&mut self, _node: Node<'_>, _cx: &VisitCx<'_>, _abstract: bool) -> Descend {
        Descend::No
    }
}

/// Module-level bindings that are neither functions nor `require` imports
#[derive(Debug, Default)]
pub struct VariableExtractor {
    variables: Vec<VariableInfo>,
}

impl VariableExtractor {
    pub fn into_variables(self) -> Vec<VariableInfo> {
        self.variables
    }
}

impl SyntaxVisitor for VariableExtractor {
    fn visit_variable(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        if !is_module_level(node) || is_require_binding(node, cx.source) {
            return Descend::No;
        }
        let Some(name) = node.child_by_field_name("name") else {
            return Descend::No;
        };

        let mut names = Vec::new();
        binding_names(name, cx.source, &mut names);
        for binding in names {
            self.variables.push(VariableInfo {
                name: binding,
                is_exported: is_exported(node),
                line: line_of(node),
            });
        }
        Descend::No
    }

    fn visit_function(&mut self, _node: Node<'_>, _cx: &VisitCx<'_>) -> Descend {
        Descend::No
    }

    fn visit_class(&mut self, _node: Node<'_>, _cx: &VisitCx<'_>, _abstract: bool) -> Descend {
        Descend::No
    }
}

fn is_require_binding(declarator: Node<'_>, source: &str) -> bool {
    declarator
        .child_by_field_name("value")
        .filter(|value| value.kind() == "call_expression")
        .and_then(|call| call.child_by_field_name("function"))
        .is_some_and(|callee| node_text(callee, source) == "require")
}

/// Identifiers introduced by a binding pattern (`a`, `{ a, b: c }`, `[x, y]`)
fn binding_names(pattern: Node<'_>, source: &str, out: &mut Vec<String>) {
    let mut stack = vec![pattern];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                out.push(node_text(node, source).to_string());
            }
            "pair_pattern" => stack.extend(node.child_by_field_name("value")),
            _ => {
                let mut cursor = node.walk();
                let children: Vec<_> = node.named_children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
        }
    }
}

pub fn extract_functions(parsed: &ParsedSource) -> Vec<FunctionInfo> {
    let mut extractor = FunctionExtractor::default();
    walk(parsed.root(), parsed.source(), &mut extractor);
    extractor.into_functions()
}

pub fn extract_variables(parsed: &ParsedSource) -> Vec<VariableInfo> {
    let mut extractor = VariableExtractor::default();
    walk(parsed.root(), parsed.source(), &mut extractor);
    extractor.into_variables()
}
