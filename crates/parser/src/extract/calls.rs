use crate::entities::{CallSite, CallerScope};
use crate::parser::ParsedSource;
use crate::syntax::{line_of, walk, Descend, Scope, SyntaxVisitor, VisitCx};
use tree_sitter::Node;

/// Call and `new` expressions with the scope they appear in.
///
/// Only names are recorded; matching them to declarations happens when the
/// dependency graph is assembled and is deliberately approximate.
#[derive(Debug, Default)]
pub struct CallExtractor {
    calls: Vec<CallSite>,
}

impl CallExtractor {
    pub fn into_calls(self) -> Vec<CallSite> {
        self.calls
    }

    fn record(&mut self, target: Node<'_>, node: Node<'_>, cx: &VisitCx<'_>, is_new: bool) {
        let (callee, receiver) = match target.kind() {
            "identifier" => (cx.text(target), None),
            "member_expression" => {
                let Some(property) = cx.field(target, "property") else {
                    return;
                };
                (property, cx.field(target, "object").map(str::to_string))
            }
            _ => return,
        };

        if callee.is_empty() || (!is_new && receiver.is_none() && callee == "require") {
            return;
        }

        self.calls.push(CallSite {
            caller: caller_scope(cx.scope),
            callee: callee.to_string(),
            receiver,
            is_new,
            line: line_of(node),
        });
    }
}

impl SyntaxVisitor for CallExtractor {
    fn visit_call(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        if let Some(function) = node.child_by_field_name("function") {
            self.record(function, node, cx, false);
        }
        Descend::Yes
    }

    fn visit_new(&mut self, node: Node<'_>, cx: &VisitCx<'_>) -> Descend {
        if let Some(constructor) = node.child_by_field_name("constructor") {
            self.record(constructor, node, cx, true);
        }
        Descend::Yes
    }
}

fn caller_scope(scope: &Scope) -> CallerScope {
    match (&scope.class, &scope.function) {
        (Some(class), Some(method)) => CallerScope::Method {
            class: class.clone(),
            method: method.clone(),
        },
        (Some(class), None) => CallerScope::Class {
            class: class.clone(),
        },
        (None, Some(name)) => CallerScope::Function { name: name.clone() },
        (None, None) => CallerScope::Module,
    }
}

pub fn extract_calls(parsed: &ParsedSource) -> Vec<CallSite> {
    let mut extractor = CallExtractor::default();
    walk(parsed.root(), parsed.source(), &mut extractor);
    extractor.into_calls()
}
