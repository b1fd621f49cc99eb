use codescape_parser::{
    build_containment, extract_file, EntityKind, ExportKind, ImportKind, Language, ParserError,
    Visibility,
};
use pretty_assertions::assert_eq;

#[test]
fn multiple_and_nested_classes() {
    let code = r"
export class Outer {
  build() {
    class Inner {
      run() {}
    }
    return new Inner();
  }
}

class Second {}
";
    let entities = extract_file("src/outer.ts", code, None).unwrap();
    let names: Vec<_> = entities.classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Outer", "Inner", "Second"]);

    let outer = entities.class("Outer").unwrap();
    assert!(outer.is_exported);
    assert_eq!(outer.parent_class, None);

    let inner = entities.class("Inner").unwrap();
    assert_eq!(inner.parent_class.as_deref(), Some("Outer"));
    assert_eq!(inner.methods[0].name, "run");
}

#[test]
fn typescript_extends_and_implements() {
    let code = r"
abstract class Base {}
interface Greets {}
interface Named {}
export class Greeter extends Base implements Greets, Named {
  private count: number = 0;
  protected static label = 'g';
  constructor(private readonly repo: Repo) { super(); }
  public async greet(name: string, times?: number): Promise<void> {}
}
";
    let entities = extract_file("greeter.ts", code, None).unwrap();

    let base = entities.class("Base").unwrap();
    assert!(base.is_abstract);

    let greeter = entities.class("Greeter").unwrap();
    assert_eq!(greeter.extends.as_deref(), Some("Base"));
    assert_eq!(greeter.implements, vec!["Greets", "Named"]);

    let props: Vec<_> = greeter
        .properties
        .iter()
        .map(|p| (p.name.as_str(), p.visibility, p.is_static))
        .collect();
    assert_eq!(
        props,
        vec![
            ("count", Visibility::Private, false),
            ("label", Visibility::Protected, true),
            ("repo", Visibility::Private, false),
        ]
    );

    let greet = greeter.methods.iter().find(|m| m.name == "greet").unwrap();
    assert!(greet.is_async);
    assert_eq!(greet.parameters, vec!["name", "times"]);
    assert_eq!(entities.interfaces.len(), 2);
}

#[test]
fn import_forms() {
    let code = r"
import React, { useState as useLocal, useEffect } from 'react';
import * as utils from './utils';
import './polyfill';
import type { User } from './types';
const path = require('path');
";
    let entities = extract_file("app.tsx", code, None).unwrap();
    assert_eq!(entities.language, Language::Tsx);
    assert_eq!(entities.imports.len(), 5);

    let react = &entities.imports[0];
    assert_eq!(react.source, "react");
    let specs: Vec<_> = react
        .specifiers
        .iter()
        .map(|s| (s.kind, s.imported.as_str(), s.local.as_str()))
        .collect();
    assert_eq!(
        specs,
        vec![
            (ImportKind::Default, "default", "React"),
            (ImportKind::Named, "useState", "useLocal"),
            (ImportKind::Named, "useEffect", "useEffect"),
        ]
    );

    assert_eq!(entities.imports[1].specifiers[0].kind, ImportKind::Namespace);
    assert_eq!(entities.imports[1].specifiers[0].local, "utils");
    assert!(entities.imports[2].is_side_effect_only());
    assert!(entities.imports[3].is_type_only);
    assert_eq!(entities.imports[4].source, "path");
}

#[test]
fn export_forms() {
    let code = r"
export function greet() {}
export const a = 1, b = 2;
export { greet as hello };
export { helper } from './helper';
export * from './all';
export default Greeter;
";
    let entities = extract_file("index.js", code, None).unwrap();
    let exports: Vec<_> = entities
        .exports
        .iter()
        .map(|e| (e.kind, e.exported_name().to_string(), e.source.clone()))
        .collect();
    assert_eq!(
        exports,
        vec![
            (ExportKind::Named, "greet".to_string(), None),
            (ExportKind::Named, "a".to_string(), None),
            (ExportKind::Named, "b".to_string(), None),
            (ExportKind::Named, "hello".to_string(), None),
            (ExportKind::ReExport, "helper".to_string(), Some("./helper".to_string())),
            (ExportKind::All, "*".to_string(), Some("./all".to_string())),
            (ExportKind::Default, "default".to_string(), None),
        ]
    );
    assert_eq!(entities.default_export(), Some("Greeter"));
}

#[test]
fn functions_and_variables_are_module_level_only() {
    let code = r"
export async function load(url, opts = {}) {
  const inner = () => 1;
  return inner();
}
const format = (s) => s.trim();
let counter = 0;
";
    let entities = extract_file("load.js", code, None).unwrap();
    let functions: Vec<_> = entities.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(functions, vec!["load", "format"]);

    let load = entities.function("load").unwrap();
    assert!(load.is_async);
    assert!(load.is_exported);
    assert_eq!(load.parameters, vec!["url", "opts"]);

    let variables: Vec<_> = entities.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(variables, vec!["counter"]);
}

#[test]
fn malformed_input_still_yields_entities() {
    let code = "class Good {\n  run() {}\n}\n\nfunction ok() {}\n\nconst = ;\n";
    let entities = extract_file("broken.js", code, None).unwrap();

    assert!(entities.has_errors);
    assert!(!entities.diagnostics.is_empty());
    assert!(entities.class("Good").is_some());
}

#[test]
fn unsupported_file_is_an_error() {
    let err = extract_file("notes.md", "# notes", None).unwrap_err();
    assert!(err.is_unsupported());
    assert!(matches!(err, ParserError::UnsupportedExtension(_)));
}

#[test]
fn containment_tree_mirrors_lexical_nesting() {
    let code = r"
class Outer {
  field = 1;
  build() { class Inner {} }
}
function helper() {}
";
    let entities = extract_file("tree.js", code, None).unwrap();
    let root = build_containment(&entities);

    assert_eq!(root.kind, EntityKind::File);
    assert_eq!(root.name, "tree.js");

    let kinds: Vec<_> = root.children.iter().map(|c| (c.name.as_str(), c.kind)).collect();
    assert_eq!(
        kinds,
        vec![("Outer", EntityKind::Class), ("helper", EntityKind::Function)]
    );

    let outer = &root.children[0];
    let members: Vec<_> = outer.children.iter().map(|c| (c.name.as_str(), c.kind)).collect();
    assert_eq!(
        members,
        vec![
            ("field", EntityKind::Property),
            ("build", EntityKind::Method),
            ("Inner", EntityKind::Class),
        ]
    );
    // file, Outer, field, build, Inner, helper
    assert_eq!(root.count(), 6);
}

#[test]
fn deeply_nested_expressions_do_not_exhaust_the_stack() {
    let depth = 10_000;
    let code = format!(
        "const grid = {}compute(a && b){};\nfunction tail() {{}}\n",
        "[".repeat(depth),
        "]".repeat(depth)
    );
    let entities = extract_file("generated.js", &code, None).unwrap();

    assert!(!entities.has_errors);
    assert!(entities.variables.iter().any(|v| v.name == "grid"));
    assert!(entities.function("tail").is_some());
    assert!(entities.calls.iter().any(|c| c.callee == "compute"));
    assert_eq!(entities.metrics.complexity, 2);
}

#[test]
fn deeply_nested_malformed_input_reports_diagnostics() {
    let code = format!("const grid = {}1;\n", "[".repeat(10_000));
    let entities = extract_file("generated.js", &code, None).unwrap();

    assert!(entities.has_errors);
    assert!(!entities.diagnostics.is_empty());
}
