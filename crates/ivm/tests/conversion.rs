//! Conversion of real builder output into the visualization model

use codescape_graph::{BuilderConfig, GraphBuilder, SourceFile};
use codescape_ivm::{
    validate, ConverterOptions, ModelConverter, NodeKind, VisualizationGraph, IVM_SCHEMA_VERSION,
};
use pretty_assertions::assert_eq;

fn convert(files: &[SourceFile], config: BuilderConfig) -> VisualizationGraph {
    let graph = GraphBuilder::new(config).unwrap().build(files);
    ModelConverter::new(ConverterOptions {
        name: "fixture".to_string(),
        root_path: Some("/tmp/fixture".to_string()),
        ..ConverterOptions::default()
    })
    .convert(&graph)
}

fn fixture() -> Vec<SourceFile> {
    vec![
        SourceFile::new(
            "src/index.ts",
            "import { greet } from './greet';\nimport express from 'express';\ngreet('x');\n",
        ),
        SourceFile::new(
            "src/greet.ts",
            "export function greet(name: string) { return `hi ${name}`; }\n",
        ),
        SourceFile::new(
            "src/utils.ts",
            "export class StringUtils {\n  private cache = 1;\n  upper(s: string) { return s.toUpperCase(); }\n}\n",
        ),
    ]
}

#[test]
fn builder_output_converts_to_a_valid_model() {
    let model = convert(&fixture(), BuilderConfig::default());

    let result = validate(&model);
    assert!(result.valid, "{:?}", result.errors);
    assert_eq!(model.metadata.schema_version, IVM_SCHEMA_VERSION);
    assert_eq!(model.metadata.name, "fixture");
    assert_eq!(model.metadata.root_path.as_deref(), Some("/tmp/fixture"));
    assert_eq!(model.metadata.stats.total_nodes, model.nodes.len());
    assert_eq!(model.metadata.stats.total_edges, model.edges.len());
    assert_eq!(model.nodes_of_kind(NodeKind::File).count(), 3);
}

#[test]
fn members_hang_below_their_class() {
    let model = convert(&fixture(), BuilderConfig::default());

    let class = model.node("class:src/utils.ts#StringUtils").unwrap();
    assert_eq!(class.parent.as_deref(), Some("file:src/utils.ts"));
    assert_eq!(class.lod, 2);

    let children: Vec<&str> = model
        .children_of("class:src/utils.ts#StringUtils")
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(
        children,
        vec![
            "variable:src/utils.ts#StringUtils.cache",
            "method:src/utils.ts#StringUtils.upper"
        ]
    );
}

#[test]
fn file_depth_is_lifted_into_metadata() {
    let model = convert(&fixture(), BuilderConfig::default());

    let index = model.node("file:src/index.ts").unwrap();
    assert_eq!(index.metadata.depth, Some(0));
    assert_eq!(index.metadata.language.as_deref(), Some("typescript"));
    assert!(index.metadata.loc.unwrap_or_default() > 0);
    assert_eq!(model.node("file:src/greet.ts").unwrap().metadata.depth, Some(1));
}

#[test]
fn external_packages_get_a_style() {
    let config = BuilderConfig {
        include_external_packages: true,
        ..BuilderConfig::default()
    };
    let model = convert(&fixture(), config);

    let express = model.node("external:express").unwrap();
    assert!(express.is_external());
    assert!(express.style.is_some());
    assert!(model.node("file:src/index.ts").unwrap().style.is_none());
    assert!(validate(&model).valid);
}
