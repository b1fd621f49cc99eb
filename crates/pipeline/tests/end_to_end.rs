//! Full runs from source text to a laid-out model

use codescape_ivm::{filter_by_lod, EdgeKind, LodFilter, NodeKind};
use codescape_pipeline::{
    BuilderConfig, LayoutRegistry, Pipeline, PipelineConfig, PipelineError, SourceFile,
    VisualizationGraph, IVM_SCHEMA_VERSION,
};
use pretty_assertions::assert_eq;

fn greet_project() -> Vec<SourceFile> {
    vec![
        SourceFile::new(
            "index.ts",
            "import { greet } from './greet';\n\nexport function main() {\n  console.log(greet('world'));\n}\n",
        ),
        SourceFile::new(
            "greet.ts",
            "export function greet(name: string): string {\n  return `Hello, ${name}!`;\n}\n",
        ),
        SourceFile::new(
            "utils.ts",
            "export class StringUtils {\n  static upper(s: string) {\n    return s.toUpperCase();\n  }\n}\n",
        ),
    ]
}

fn run(config: PipelineConfig, files: &[SourceFile]) -> codescape_pipeline::PipelineOutput {
    Pipeline::with_defaults(config).unwrap().run(files).unwrap()
}

fn assert_well_formed(graph: &VisualizationGraph) {
    assert!(graph.nodes.iter().all(|n| n.position.is_finite()));
    assert!(graph.bounds.min.x <= graph.bounds.max.x);
    assert!(graph.bounds.min.y <= graph.bounds.max.y);
    assert!(graph.bounds.min.z <= graph.bounds.max.z);
    assert_eq!(graph.metadata.stats.total_nodes, graph.nodes.len());
    assert_eq!(graph.metadata.stats.total_edges, graph.edges.len());
}

#[test]
fn three_file_project_becomes_a_city() {
    let output = run(PipelineConfig::default(), &greet_project());
    let graph = &output.graph;

    assert!(output.validation.valid, "{:?}", output.validation.errors);
    assert!(output.build_issues.is_empty());
    assert_eq!(output.engine, "city");
    assert_eq!(graph.metadata.schema_version, IVM_SCHEMA_VERSION);

    assert!(graph.nodes_of_kind(NodeKind::File).count() >= 3);
    assert!(graph.nodes_of_kind(NodeKind::Function).count() >= 2);
    assert!(graph.nodes_of_kind(NodeKind::Class).count() >= 1);
    assert!(graph.edges.iter().any(|e| e.kind == EdgeKind::Imports
        && e.source == "file:index.ts"
        && e.target == "file:greet.ts"));
    assert_well_formed(graph);
}

#[test]
fn every_engine_handles_the_project() {
    // Cell and building don't apply to three files
    for engine in ["city", "force"] {
        let config = PipelineConfig {
            engine: Some(engine.to_string()),
            ..PipelineConfig::default()
        };
        let output = run(config, &greet_project());
        assert_eq!(output.engine, engine);
        assert_well_formed(&output.graph);
    }
}

#[test]
fn forcing_an_inapplicable_engine_fails() {
    let config = PipelineConfig {
        engine: Some("cell".to_string()),
        ..PipelineConfig::default()
    };
    let err = Pipeline::with_defaults(config)
        .unwrap()
        .run(&greet_project())
        .unwrap_err();
    assert!(matches!(err, PipelineError::Layout(_)));
}

#[test]
fn runs_are_reproducible() {
    let config = PipelineConfig {
        engine: Some("force".to_string()),
        ..PipelineConfig::default()
    };
    let a = run(config.clone(), &greet_project());
    let b = run(config, &greet_project());

    for (x, y) in a.graph.nodes.iter().zip(&b.graph.nodes) {
        assert_eq!(x.id, y.id);
        assert!(x.position.distance(y.position) < 1e-9);
    }
}

#[test]
fn max_lod_trims_members() {
    let config = PipelineConfig {
        max_lod: Some(2),
        include_ancestors: false,
        ..PipelineConfig::default()
    };
    let output = run(config, &greet_project());

    assert!(output.graph.nodes.iter().all(|n| n.lod <= 2));
    assert_eq!(output.graph.nodes_of_kind(NodeKind::Function).count(), 0);
    assert_eq!(output.graph.nodes_of_kind(NodeKind::Class).count(), 1);
    assert!(output.validation.valid);
    assert_well_formed(&output.graph);

    // Same cut applied afterwards gives the same model
    let full = run(PipelineConfig::default(), &greet_project());
    let cut = filter_by_lod(&full.graph, 2, LodFilter::default());
    assert_eq!(cut.nodes.len(), output.graph.nodes.len());
}

#[test]
fn broken_files_degrade_without_failing() {
    let mut files = greet_project();
    files.push(SourceFile::new("broken.ts", "export class {{{ oops"));
    files.push(SourceFile::new("notes.md", "# not code"));

    let output = run(PipelineConfig::default(), &files);
    let issue_paths: Vec<&str> = output
        .build_issues
        .iter()
        .map(|i| i.path.as_str())
        .collect();
    assert_eq!(issue_paths, vec!["broken.ts", "notes.md"]);
    assert!(output.graph.node("file:broken.ts").is_some());
    assert!(output.validation.valid);
}

#[test]
fn empty_input_yields_an_empty_model() {
    let pipeline = Pipeline::new(PipelineConfig::default(), LayoutRegistry::with_defaults()).unwrap();
    let output = pipeline.run(&[]).unwrap();
    let graph = &output.graph;

    assert!(graph.nodes.is_empty());
    assert!(graph.edges.is_empty());
    assert_eq!(graph.metadata.stats.total_nodes, 0);
    assert_eq!(graph.metadata.stats.total_edges, 0);
    assert!(graph.metadata.stats.nodes_by_kind.is_empty());
    assert_eq!(graph.metadata.schema_version, IVM_SCHEMA_VERSION);
    assert_eq!(output.engine, "force");
    assert!(output.validation.valid);
}

#[test]
fn an_empty_registry_reports_no_engine() {
    let pipeline = Pipeline::new(PipelineConfig::default(), LayoutRegistry::new()).unwrap();
    let err = pipeline.run(&greet_project()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Layout(codescape_layout::LayoutError::NoEngine)
    ));
}

fn counter_class() -> Vec<SourceFile> {
    vec![SourceFile::new(
        "src/counter.ts",
        "export class Counter {\n  count = 0;\n  inc() { this.count++; }\n  reset() { this.count = 0; }\n}\n",
    )]
}

#[test]
fn focusing_a_class_lays_it_out_as_a_cell() {
    let config = PipelineConfig {
        focus: Some("class:src/counter.ts#Counter".to_string()),
        ..PipelineConfig::default()
    };
    let output = run(config.clone(), &counter_class());
    let graph = &output.graph;

    assert_eq!(output.engine, "cell");
    assert!(output.validation.valid, "{:?}", output.validation.errors);
    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids.len(), 4, "{ids:?}");
    assert!(ids.contains(&"method:src/counter.ts#Counter.inc"));
    assert!(!ids.contains(&"file:src/counter.ts"));

    let nucleus = graph.node("class:src/counter.ts#Counter").unwrap().position;
    let membrane = config.layout.cell.membrane_radius * config.layout.scale;
    for node in &graph.nodes {
        assert!(node.position.distance(nucleus) < membrane, "{}", node.id);
    }
    assert_well_formed(graph);

    // Forcing the engine agrees with auto-selection
    let forced = run(
        PipelineConfig {
            engine: Some("cell".to_string()),
            ..config
        },
        &counter_class(),
    );
    assert_eq!(forced.engine, "cell");
}

#[test]
fn unknown_focus_is_an_error() {
    let config = PipelineConfig {
        focus: Some("class:nowhere.ts#Ghost".to_string()),
        ..PipelineConfig::default()
    };
    let err = Pipeline::with_defaults(config)
        .unwrap()
        .run(&counter_class())
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnknownFocus(id) if id == "class:nowhere.ts#Ghost"));
}

#[test]
fn deeply_nested_file_degrades_instead_of_aborting() {
    let depth = 10_000;
    let mut files = greet_project();
    files.push(SourceFile::new(
        "generated.js",
        format!("export const table = {}1{};\n", "[".repeat(depth), "]".repeat(depth)),
    ));
    files.push(SourceFile::new(
        "truncated.js",
        format!("export const table = {}1;\n", "[".repeat(depth)),
    ));
    let config = PipelineConfig {
        builder: BuilderConfig {
            parallel: false,
            ..BuilderConfig::default()
        },
        ..PipelineConfig::default()
    };

    let output = run(config, &files);
    assert!(output.graph.node("file:generated.js").is_some());
    assert!(output.graph.node("variable:generated.js#table").is_some());
    let issue_paths: Vec<&str> = output
        .build_issues
        .iter()
        .map(|i| i.path.as_str())
        .collect();
    assert_eq!(issue_paths, vec!["truncated.js"]);
    assert!(output.validation.valid);
}
