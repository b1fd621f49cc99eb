use crate::entities::FileMetrics;
use crate::parser::ParsedSource;
use crate::syntax::{node_text, preorder, Descend};
use tree_sitter::Node;

/// Compute per-file size and complexity metrics.
///
/// Complexity is a cyclomatic-style estimate: one plus every branching
/// construct and short-circuit operator in the file.
pub fn compute_metrics(parsed: &ParsedSource) -> FileMetrics {
    let mut counts = Counts::default();
    preorder(parsed.root(), |node| {
        count_node(node, parsed.source(), &mut counts);
        Descend::Yes
    });

    FileMetrics {
        lines_of_code: lines_of_code(parsed.source()),
        class_count: counts.classes,
        function_count: counts.functions,
        complexity: 1 + counts.decisions,
    }
}

#[derive(Default)]
struct Counts {
    classes: usize,
    functions: usize,
    decisions: usize,
}

fn count_node(node: Node<'_>, source: &str, counts: &mut Counts) {
    match node.kind() {
        "class_declaration" | "abstract_class_declaration" | "class" => counts.classes += 1,
        "function_declaration"
        | "generator_function_declaration"
        | "function_expression"
        | "function"
        | "generator_function"
        | "arrow_function"
        | "method_definition" => counts.functions += 1,
        "if_statement"
        | "for_statement"
        | "for_in_statement"
        | "while_statement"
        | "do_statement"
        | "switch_case"
        | "catch_clause"
        | "ternary_expression" => counts.decisions += 1,
        "binary_expression" => {
            let is_short_circuit = node
                .child_by_field_name("operator")
                .is_some_and(|op| matches!(node_text(op, source), "&&" | "||" | "??"));
            if is_short_circuit {
                counts.decisions += 1;
            }
        }
        _ => {}
    }
}

/// Non-blank lines that are not entirely comments
pub fn lines_of_code(source: &str) -> usize {
    let mut in_block = false;
    let mut count = 0;

    for line in source.lines() {
        let mut rest = line.trim();
        let mut has_code = false;

        while !rest.is_empty() {
            if in_block {
                match rest.find("*/") {
                    Some(end) => {
                        in_block = false;
                        rest = rest[end + 2..].trim_start();
                    }
                    None => rest = "",
                }
            } else if rest.starts_with("//") {
                rest = "";
            } else if let Some(body) = rest.strip_prefix("/*") {
                in_block = true;
                rest = body;
            } else {
                has_code = true;
                break;
            }
        }

        if has_code {
            count += 1;
        }
    }

    count
}
