use codescape_graph::{
    BuilderConfig, DependencyGraph, EdgeKind, GraphBuilder, NodeKind, SourceFile,
};
use pretty_assertions::assert_eq;

fn build(files: &[SourceFile]) -> DependencyGraph {
    build_with(BuilderConfig::default(), files)
}

fn build_with(config: BuilderConfig, files: &[SourceFile]) -> DependencyGraph {
    GraphBuilder::new(config).unwrap().build(files)
}

fn edge_pairs(graph: &DependencyGraph, kind: EdgeKind) -> Vec<(String, String)> {
    graph
        .edges()
        .filter(|e| e.kind == kind)
        .map(|e| (e.source.clone(), e.target.clone()))
        .collect()
}

fn has_edge(graph: &DependencyGraph, kind: EdgeKind, source: &str, target: &str) -> bool {
    graph
        .edges()
        .any(|e| e.kind == kind && e.source == source && e.target == target)
}

#[test]
fn one_file_node_per_input_plus_declarations() {
    let graph = build(&[
        SourceFile::new("src/greet.ts", "export function greet(name) { return name; }"),
        SourceFile::new(
            "src/utils.ts",
            "export class StringUtils {\n  static upper(s) { return s; }\n  private cache = 1;\n}",
        ),
    ]);

    assert_eq!(graph.nodes_of_kind(NodeKind::File).count(), 2);
    assert!(graph.node_by_id("function:src/greet.ts#greet").is_some());
    assert!(graph.node_by_id("class:src/utils.ts#StringUtils").is_some());
    assert!(graph
        .node_by_id("method:src/utils.ts#StringUtils.upper")
        .is_some());

    let cache = graph
        .node_by_id("variable:src/utils.ts#StringUtils.cache")
        .unwrap();
    assert_eq!(cache.kind, NodeKind::Variable);
    assert_eq!(
        cache.meta("visibility").and_then(|v| v.as_str()),
        Some("private")
    );

    assert!(has_edge(
        &graph,
        EdgeKind::Contains,
        "file:src/utils.ts",
        "class:src/utils.ts#StringUtils"
    ));
    assert!(has_edge(
        &graph,
        EdgeKind::Contains,
        "class:src/utils.ts#StringUtils",
        "method:src/utils.ts#StringUtils.upper"
    ));
}

#[test]
fn resolved_imports_connect_importer_to_target() {
    let graph = build(&[
        SourceFile::new("src/index.ts", "import { greet } from './greet';\nimport React from 'react';\ngreet('x');"),
        SourceFile::new("src/greet.ts", "export function greet(n) {}"),
    ]);

    assert_eq!(
        edge_pairs(&graph, EdgeKind::Imports),
        vec![("file:src/index.ts".to_string(), "file:src/greet.ts".to_string())]
    );
    // Module-level call is attributed to the file
    assert!(has_edge(
        &graph,
        EdgeKind::Calls,
        "file:src/index.ts",
        "function:src/greet.ts#greet"
    ));
    // Every imports edge points at known nodes
    for edge in graph.edges() {
        assert!(graph.contains_node(&edge.source));
        assert!(graph.contains_node(&edge.target));
    }
}

#[test]
fn typescript_source_wins_over_javascript() {
    let graph = build(&[
        SourceFile::new("main.ts", "import { a } from './a';"),
        SourceFile::new("a.js", "export const a = 1;"),
        SourceFile::new("a.ts", "export const a = 2;"),
    ]);
    assert_eq!(
        edge_pairs(&graph, EdgeKind::Imports),
        vec![("file:main.ts".to_string(), "file:a.ts".to_string())]
    );
}

#[test]
fn directory_index_fallback_and_parent_segments() {
    let graph = build(&[
        SourceFile::new("src/app/main.ts", "import x from '../lib';\nexport * from '/src/shared/util';"),
        SourceFile::new("src/lib/index.ts", "export default 1;"),
        SourceFile::new("src/shared/util.js", "export const u = 1;"),
    ]);

    assert_eq!(
        edge_pairs(&graph, EdgeKind::Imports),
        vec![
            ("file:src/app/main.ts".to_string(), "file:src/lib/index.ts".to_string()),
            ("file:src/app/main.ts".to_string(), "file:src/shared/util.js".to_string()),
        ]
    );
}

#[test]
fn external_packages_only_when_enabled() {
    let files = [SourceFile::new(
        "index.js",
        "import express from 'express';\nconst { join } = require('node:path');\nimport '@scope/pkg/register';",
    )];

    let graph = build(&files);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.node_count(), 1);

    let config = BuilderConfig {
        include_external_packages: true,
        ..BuilderConfig::default()
    };
    let graph = build_with(config, &files);
    let externals: Vec<_> = graph
        .nodes()
        .filter(|n| n.is_external())
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(
        externals,
        vec!["external:express", "external:path", "external:@scope/pkg"]
    );
    assert_eq!(graph.node_by_id("external:express").unwrap().kind, NodeKind::File);
    assert_eq!(edge_pairs(&graph, EdgeKind::Imports).len(), 3);
}

#[test]
fn inheritance_resolves_local_and_imported_types() {
    let graph = build(&[
        SourceFile::new(
            "src/base.ts",
            "export abstract class Base {}\nexport interface Greets {}\nexport interface Loud extends Greets {}",
        ),
        SourceFile::new(
            "src/impl.ts",
            "import { Base, Greets } from './base';\nimport * as b from './base';\nclass Local {}\nexport class One extends Base implements Greets {}\nexport class Two extends Local implements b.Loud {}\nclass Three extends Unknown {}",
        ),
    ]);

    assert_eq!(
        graph.node_by_id("class:src/base.ts#Base").unwrap().kind,
        NodeKind::AbstractClass
    );
    assert!(has_edge(&graph, EdgeKind::Extends, "class:src/impl.ts#One", "class:src/base.ts#Base"));
    assert!(has_edge(
        &graph,
        EdgeKind::Implements,
        "class:src/impl.ts#One",
        "interface:src/base.ts#Greets"
    ));
    assert!(has_edge(&graph, EdgeKind::Extends, "class:src/impl.ts#Two", "class:src/impl.ts#Local"));
    assert!(has_edge(
        &graph,
        EdgeKind::Implements,
        "class:src/impl.ts#Two",
        "interface:src/base.ts#Loud"
    ));
    assert!(has_edge(
        &graph,
        EdgeKind::Extends,
        "interface:src/base.ts#Loud",
        "interface:src/base.ts#Greets"
    ));
    // Unresolvable bases are dropped
    assert_eq!(
        graph
            .edges()
            .filter(|e| e.source == "class:src/impl.ts#Three")
            .count(),
        0
    );
}

#[test]
fn calls_are_matched_by_name() {
    let graph = build(&[
        SourceFile::new(
            "src/service.ts",
            r"
import format, { trim } from './text';
import * as text from './text';

export class Service {
  run() {
    this.load();
    trim();
    text.pad();
    new Helper();
    repo.save();
  }
  load() { format(); }
}

class Helper {
  save() {}
}

class Store {
  save() {}
}

function recurse() { recurse(); }
",
        ),
        SourceFile::new(
            "src/text.ts",
            "export default function format() {}\nexport function trim() {}\nexport function pad() {}\n",
        ),
    ]);

    let run = "method:src/service.ts#Service.run";
    assert!(has_edge(&graph, EdgeKind::Calls, run, "method:src/service.ts#Service.load"));
    assert!(has_edge(&graph, EdgeKind::Calls, run, "function:src/text.ts#trim"));
    assert!(has_edge(&graph, EdgeKind::Calls, run, "function:src/text.ts#pad"));
    assert!(has_edge(&graph, EdgeKind::Calls, run, "class:src/service.ts#Helper"));
    // Untyped receiver: every method with that name in the file
    assert!(has_edge(&graph, EdgeKind::Calls, run, "method:src/service.ts#Helper.save"));
    assert!(has_edge(&graph, EdgeKind::Calls, run, "method:src/service.ts#Store.save"));
    // Default import resolves through the target's default export
    assert!(has_edge(
        &graph,
        EdgeKind::Calls,
        "method:src/service.ts#Service.load",
        "function:src/text.ts#format"
    ));
    // Recursion is a self-edge
    assert!(has_edge(
        &graph,
        EdgeKind::Calls,
        "function:src/service.ts#recurse",
        "function:src/service.ts#recurse"
    ));
}

#[test]
fn failing_files_degrade_without_aborting() {
    let graph = build(&[
        SourceFile::new("src/ok.ts", "export function ok() {}"),
        SourceFile::new("src/broken.js", "function ( {{{"),
        SourceFile::new("README.md", "# docs"),
    ]);

    assert_eq!(graph.nodes_of_kind(NodeKind::File).count(), 3);

    let broken = graph.node_by_id("file:src/broken.js").unwrap();
    assert!(broken.meta_bool("has_errors"));

    let readme = graph.node_by_id("file:README.md").unwrap();
    assert!(readme.meta("error").is_some());

    let issue_paths: Vec<_> = graph.issues().iter().map(|i| i.path.as_str()).collect();
    assert_eq!(issue_paths, vec!["src/broken.js", "README.md"]);
}

#[test]
fn depth_metadata_on_files_and_entities() {
    let graph = build(&[
        SourceFile::new("src/index.ts", "import { greet } from './greet';"),
        SourceFile::new("src/greet.ts", "import { fmt } from './fmt';\nexport function greet() {}"),
        SourceFile::new("src/fmt.ts", "export function fmt() {}"),
        SourceFile::new("src/stray.ts", "export class Stray {}"),
    ]);

    let depth = |id: &str| graph.node_by_id(id).and_then(|n| n.meta_u64("depth"));
    assert_eq!(depth("file:src/index.ts"), Some(0));
    assert_eq!(depth("file:src/greet.ts"), Some(1));
    assert_eq!(depth("file:src/fmt.ts"), Some(2));
    assert_eq!(depth("function:src/fmt.ts#fmt"), Some(2));
    assert_eq!(depth("file:src/stray.ts"), Some(3));
    assert_eq!(depth("class:src/stray.ts#Stray"), Some(3));

    let index = graph.node_by_id("file:src/index.ts").unwrap();
    assert!(index.meta_bool("entry_point"));
    assert!(graph.node_by_id("file:src/stray.ts").unwrap().meta_bool("orphan"));
}

#[test]
fn directories_are_opt_in() {
    let files = [
        SourceFile::new("src/a/x.ts", ""),
        SourceFile::new("src/b.ts", ""),
    ];
    assert_eq!(build(&files).nodes_of_kind(NodeKind::Directory).count(), 0);

    let config = BuilderConfig {
        include_directories: true,
        ..BuilderConfig::default()
    };
    let graph = build_with(config, &files);
    let dirs: Vec<_> = graph
        .nodes_of_kind(NodeKind::Directory)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(dirs, vec!["dir:src", "dir:src/a"]);
    assert!(has_edge(&graph, EdgeKind::Contains, "dir:src", "dir:src/a"));
    assert!(has_edge(&graph, EdgeKind::Contains, "dir:src/a", "file:src/a/x.ts"));
    assert!(has_edge(&graph, EdgeKind::Contains, "dir:src", "file:src/b.ts"));
}

#[test]
fn parallel_and_sequential_builds_are_identical() {
    let files: Vec<SourceFile> = (0..12)
        .map(|i| {
            SourceFile::new(
                format!("src/m{i}.ts"),
                format!("import {{ f{} }} from './m{}';\nexport function f{i}() {{ f{}(); }}", i + 1, i + 1, i + 1),
            )
        })
        .collect();

    let parallel = build(&files);
    let sequential = build_with(
        BuilderConfig {
            parallel: false,
            ..BuilderConfig::default()
        },
        &files,
    );

    let ids = |g: &DependencyGraph| g.nodes().map(|n| n.id.clone()).collect::<Vec<_>>();
    let edges = |g: &DependencyGraph| g.edges().map(|e| e.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&parallel), ids(&sequential));
    assert_eq!(edges(&parallel), edges(&sequential));
}

#[test]
fn empty_input_builds_empty_graph() {
    let graph = build(&[]);
    assert!(graph.is_empty());
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.issues().is_empty());
}

#[test]
fn calls_follow_export_aliases() {
    let graph = build(&[
        SourceFile::new(
            "greet.ts",
            "function impl(name) { return name; }\nexport { impl as hello };\n",
        ),
        SourceFile::new(
            "main.ts",
            "import { hello } from './greet';\nexport function run() { hello('a'); }\n",
        ),
    ]);

    assert_eq!(
        edge_pairs(&graph, EdgeKind::Calls),
        vec![("function:main.ts#run".to_string(), "function:greet.ts#impl".to_string())]
    );
}

#[test]
fn calls_and_inheritance_follow_barrel_re_exports() {
    let graph = build(&[
        SourceFile::new("lib/greet.ts", "export function greet(name) { return name; }\n"),
        SourceFile::new("lib/base.ts", "export class Base {}\n"),
        SourceFile::new(
            "lib/index.ts",
            "export { greet as welcome } from './greet';\nexport * from './base';\n",
        ),
        SourceFile::new(
            "main.ts",
            "import { welcome, Base } from './lib';\nimport * as lib from './lib';\nclass App extends Base {}\nexport function run() { welcome('a'); lib.welcome('b'); }\n",
        ),
    ]);

    assert!(has_edge(&graph, EdgeKind::Imports, "file:main.ts", "file:lib/index.ts"));
    assert!(has_edge(&graph, EdgeKind::Imports, "file:lib/index.ts", "file:lib/greet.ts"));
    assert_eq!(
        edge_pairs(&graph, EdgeKind::Calls),
        vec![("function:main.ts#run".to_string(), "function:lib/greet.ts#greet".to_string())]
    );
    assert!(has_edge(
        &graph,
        EdgeKind::Extends,
        "class:main.ts#App",
        "class:lib/base.ts#Base"
    ));
}

#[test]
fn re_exported_import_bindings_and_cycles() {
    let graph = build(&[
        SourceFile::new("a.ts", "export function greet() {}\n"),
        SourceFile::new("b.ts", "import { greet } from './a';\nexport { greet };\nexport * from './c';\n"),
        SourceFile::new("c.ts", "export * from './b';\n"),
        SourceFile::new(
            "main.ts",
            "import { greet, missing } from './c';\nexport function run() { greet(); missing(); }\n",
        ),
    ]);

    assert_eq!(
        edge_pairs(&graph, EdgeKind::Calls),
        vec![("function:main.ts#run".to_string(), "function:a.ts#greet".to_string())]
    );
}
