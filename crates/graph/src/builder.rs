use crate::depth::{
    compute_abstraction_depth, AbstractionDepth, EntryPointMatcher, DEFAULT_ENTRY_PATTERN,
};
use crate::error::Result;
use crate::links::{
    link_calls, link_inheritance, FileSymbols, ImportBinding, ReExport, SymbolIndex,
};
use crate::resolve::{normalize_path, parent_dir, ImportResolver, Resolution};
use crate::types::{ids, DependencyEdge, DependencyGraph, DependencyNode, EdgeKind, NodeKind};
use codescape_parser::{
    extract_file, ClassInfo, ExportInfo, ExportKind, FileEntities, ImportInfo, Language,
    ParserError,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

/// One input file as handed over by a repository loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
    /// Declared language; detected from the extension when absent
    #[serde(default)]
    pub language: Option<Language>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            language: None,
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Parse files on the rayon pool
    pub parallel: bool,
    /// Add `directory` nodes above files
    pub include_directories: bool,
    /// Add `external:<pkg>` nodes for package imports
    pub include_external_packages: bool,
    /// Regex over file stems selecting entry points
    pub entry_pattern: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            include_directories: false,
            include_external_packages: false,
            entry_pattern: DEFAULT_ENTRY_PATTERN.to_string(),
        }
    }
}

/// Folds per-file extraction results into one [`DependencyGraph`]
pub struct GraphBuilder {
    config: BuilderConfig,
    entry_points: EntryPointMatcher,
}

struct Extracted {
    path: String,
    language: Language,
    outcome: std::result::Result<FileEntities, ParserError>,
}

impl GraphBuilder {
    pub fn new(config: BuilderConfig) -> Result<Self> {
        let entry_points = EntryPointMatcher::new(&config.entry_pattern)?;
        Ok(Self {
            config,
            entry_points,
        })
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build a graph from files in input order.
    ///
    /// A file that fails to parse still becomes a file node carrying an
    /// `error` entry and a recorded [`crate::BuildIssue`].
    pub fn build(&self, files: &[SourceFile]) -> DependencyGraph {
        let extracted = self.extract_all(files);
        let mut graph = DependencyGraph::new();

        // Phase 1: files (and directories), first occurrence of a path wins
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(extracted.len());
        for item in extracted {
            if seen.insert(item.path.clone()) {
                unique.push(item);
            } else {
                log::warn!("Duplicate input path {}, keeping the first", item.path);
                graph.record_issue(&item.path, "duplicate input path ignored");
            }
        }

        if self.config.include_directories {
            add_directories(&mut graph, unique.iter().map(|item| item.path.as_str()));
        }
        for item in &unique {
            add_file_node(&mut graph, item, self.config.include_directories);
        }

        // Phase 2: declarations + containment
        let mut index = SymbolIndex::default();
        for item in &unique {
            if let Ok(entities) = &item.outcome {
                let symbols = add_entities(&mut graph, &item.path, entities);
                index.insert(item.path.clone(), symbols);
            }
        }

        // Phase 3: imports
        let resolver = ImportResolver::new(unique.iter().map(|item| item.path.as_str()));
        for item in &unique {
            if let Ok(entities) = &item.outcome {
                let (bindings, re_exports) =
                    self.link_imports(&mut graph, &resolver, &item.path, entities);
                if let Some(symbols) = index.get_mut(&item.path) {
                    symbols.bindings = bindings;
                    symbols.re_exports = re_exports;
                }
            }
        }

        // Phase 4: inheritance + calls
        let mut call_edges = 0;
        for item in &unique {
            if let Ok(entities) = &item.outcome {
                link_inheritance(&mut graph, &index, &item.path, entities);
                call_edges += link_calls(
                    &mut graph,
                    &index,
                    &item.path,
                    &ids::file(&item.path),
                    entities,
                );
            }
        }

        // Phase 5: abstraction depth
        let depth = compute_abstraction_depth(&graph, &self.entry_points);
        apply_depth(&mut graph, &depth);

        log::info!(
            "Built dependency graph: {} files, {} nodes, {} edges ({} calls), {} issues",
            unique.len(),
            graph.node_count(),
            graph.edge_count(),
            call_edges,
            graph.issues().len()
        );

        graph
    }

    fn extract_all(&self, files: &[SourceFile]) -> Vec<Extracted> {
        let extract = |file: &SourceFile| {
            let path = normalize_path(&file.path);
            let language = file
                .language
                .unwrap_or_else(|| Language::from_path(&path));
            let outcome = extract_file(&path, &file.content, file.language);
            Extracted {
                path,
                language,
                outcome,
            }
        };

        if self.config.parallel {
            files.par_iter().map(extract).collect()
        } else {
            files.iter().map(extract).collect()
        }
    }

    fn link_imports(
        &self,
        graph: &mut DependencyGraph,
        resolver: &ImportResolver,
        path: &str,
        entities: &FileEntities,
    ) -> (Vec<ImportBinding>, Vec<ReExport>) {
        let file_id = ids::file(path);
        let mut bindings = Vec::new();
        let mut re_exports = Vec::new();

        let specifiers = entities
            .imports
            .iter()
            .map(|import| (import.source.as_str(), import.line, Origin::Import(import)))
            .chain(entities.exports.iter().filter_map(|export| {
                export
                    .source
                    .as_deref()
                    .map(|s| (s, export.line, Origin::Export(export)))
            }));

        for (specifier, line, origin) in specifiers {
            match resolver.resolve(path, specifier) {
                Resolution::Internal(target) => {
                    if target == path {
                        continue;
                    }
                    graph.add_edge(
                        DependencyEdge::new(EdgeKind::Imports, &file_id, ids::file(&target))
                            .with_meta("line", line),
                    );
                    match origin {
                        Origin::Import(import) => {
                            bindings.extend(import.specifiers.iter().map(|spec| ImportBinding {
                                local: spec.local.clone(),
                                imported: spec.imported.clone(),
                                kind: spec.kind,
                                target: target.clone(),
                            }));
                        }
                        Origin::Export(export) => re_exports.extend(re_export(export, target)),
                    }
                }
                Resolution::External(package) => {
                    if !self.config.include_external_packages {
                        continue;
                    }
                    let external_id = ids::external(&package);
                    graph.add_node(
                        DependencyNode::new(&external_id, NodeKind::File, &package, &package)
                            .with_meta("external", true),
                    );
                    graph.add_edge(
                        DependencyEdge::new(EdgeKind::Imports, &file_id, external_id)
                            .with_meta("external", true)
                            .with_meta("line", line),
                    );
                }
                Resolution::Unresolved => {
                    log::debug!("{path}:{line}: unresolved import `{specifier}`");
                }
            }
        }

        (bindings, re_exports)
    }
}

/// Statement a module specifier came from
enum Origin<'a> {
    Import(&'a ImportInfo),
    Export(&'a ExportInfo),
}

/// Forwarding entry for an `export ... from` that resolved to `target`.
/// `export * as ns` is a namespace object, not a forwarded name.
fn re_export(export: &ExportInfo, target: String) -> Option<ReExport> {
    match export.kind {
        ExportKind::All if export.alias.is_none() => Some(ReExport {
            exported: None,
            imported: export.name.clone(),
            target,
        }),
        ExportKind::ReExport => Some(ReExport {
            exported: Some(export.exported_name().to_string()),
            imported: export.name.clone(),
            target,
        }),
        _ => None,
    }
}

fn add_directories<'a>(graph: &mut DependencyGraph, paths: impl Iterator<Item = &'a str>) {
    let mut dirs = BTreeSet::new();
    for path in paths {
        let mut dir = parent_dir(path);
        while !dir.is_empty() {
            dirs.insert(dir.to_string());
            dir = parent_dir(dir);
        }
    }

    for dir in &dirs {
        let name = dir.rsplit('/').next().unwrap_or(dir);
        graph.add_node(DependencyNode::new(
            ids::directory(dir),
            NodeKind::Directory,
            name,
            dir.as_str(),
        ));
        let parent = parent_dir(dir);
        if !parent.is_empty() {
            graph.add_edge(DependencyEdge::new(
                EdgeKind::Contains,
                ids::directory(parent),
                ids::directory(dir),
            ));
        }
    }
}

fn add_file_node(graph: &mut DependencyGraph, item: &Extracted, with_directory: bool) {
    let name = item.path.rsplit('/').next().unwrap_or(&item.path);
    let mut node = DependencyNode::new(ids::file(&item.path), NodeKind::File, name, &item.path)
        .with_meta("language", item.language.as_str());

    match &item.outcome {
        Ok(entities) => {
            let metrics = entities.metrics;
            node = node
                .with_meta("loc", metrics.lines_of_code)
                .with_meta("complexity", metrics.complexity)
                .with_meta("class_count", metrics.class_count)
                .with_meta("function_count", metrics.function_count)
                .with_meta("has_errors", entities.has_errors);
            graph.add_language(entities.language.as_str());

            if let Some(first) = entities.diagnostics.first() {
                graph.record_issue(
                    &item.path,
                    format!(
                        "{} syntax error(s), first at {}:{}: {}",
                        entities.diagnostics.len(),
                        first.line,
                        first.column,
                        first.message
                    ),
                );
            }
        }
        Err(err) => {
            log::warn!("Failed to extract {}: {err}", item.path);
            node = node
                .with_meta("has_errors", true)
                .with_meta("error", err.to_string());
            graph.record_issue(&item.path, err.to_string());
        }
    }

    let file_id = node.id.clone();
    graph.add_node(node);

    let dir = parent_dir(&item.path);
    if with_directory && !dir.is_empty() {
        graph.add_edge(DependencyEdge::new(
            EdgeKind::Contains,
            ids::directory(dir),
            file_id,
        ));
    }
}

fn add_entities(graph: &mut DependencyGraph, path: &str, entities: &FileEntities) -> FileSymbols {
    let file_id = ids::file(path);
    let mut symbols = FileSymbols {
        default_export: entities.default_export().map(str::to_string),
        // `export { local as alias }`
        export_aliases: entities
            .exports
            .iter()
            .filter(|e| e.kind == ExportKind::Named && e.source.is_none())
            .filter_map(|e| Some((e.alias.clone()?, e.name.clone())))
            .collect(),
        ..FileSymbols::default()
    };

    for class in &entities.classes {
        let class_id = ids::class(path, &class.name);
        let kind = if class.is_abstract {
            NodeKind::AbstractClass
        } else {
            NodeKind::Class
        };
        graph.add_node(
            DependencyNode::new(&class_id, kind, &class.name, path)
                .with_meta("line", class.line)
                .with_meta("end_line", class.end_line)
                .with_meta("exported", class.is_exported),
        );
        let owner = enclosing_class_id(class, &symbols).unwrap_or_else(|| file_id.clone());
        graph.add_edge(DependencyEdge::new(EdgeKind::Contains, owner, &class_id));
        symbols.classes.entry(class.name.clone()).or_insert_with(|| class_id.clone());

        for property in &class.properties {
            let id = ids::variable(path, Some(&class.name), &property.name);
            graph.add_node(
                DependencyNode::new(&id, NodeKind::Variable, &property.name, path)
                    .with_meta("line", property.line)
                    .with_meta("visibility", property.visibility.as_str())
                    .with_meta("static", property.is_static),
            );
            graph.add_edge(DependencyEdge::new(EdgeKind::Contains, &class_id, id));
        }

        for method in &class.methods {
            let id = ids::method(path, &class.name, &method.name);
            graph.add_node(
                DependencyNode::new(&id, NodeKind::Method, &method.name, path)
                    .with_meta("line", method.line)
                    .with_meta("visibility", method.visibility.as_str())
                    .with_meta("async", method.is_async)
                    .with_meta("static", method.is_static)
                    .with_meta("parameters", string_list(&method.parameters)),
            );
            graph.add_edge(DependencyEdge::new(EdgeKind::Contains, &class_id, &id));
            symbols
                .methods
                .entry((class.name.clone(), method.name.clone()))
                .or_insert_with(|| id.clone());
            let same_name = symbols.methods_by_name.entry(method.name.clone()).or_default();
            if !same_name.contains(&id) {
                same_name.push(id);
            }
        }
    }

    for interface in &entities.interfaces {
        let id = ids::interface(path, &interface.name);
        graph.add_node(
            DependencyNode::new(&id, NodeKind::Interface, &interface.name, path)
                .with_meta("line", interface.line)
                .with_meta("exported", interface.is_exported),
        );
        graph.add_edge(DependencyEdge::new(EdgeKind::Contains, &file_id, &id));
        symbols.interfaces.entry(interface.name.clone()).or_insert(id);
    }

    for item in &entities.enums {
        let id = ids::enumeration(path, &item.name);
        graph.add_node(
            DependencyNode::new(&id, NodeKind::Enum, &item.name, path)
                .with_meta("line", item.line)
                .with_meta("exported", item.is_exported),
        );
        graph.add_edge(DependencyEdge::new(EdgeKind::Contains, &file_id, id));
    }

    for function in &entities.functions {
        let id = ids::function(path, &function.name);
        graph.add_node(
            DependencyNode::new(&id, NodeKind::Function, &function.name, path)
                .with_meta("line", function.line)
                .with_meta("end_line", function.end_line)
                .with_meta("async", function.is_async)
                .with_meta("exported", function.is_exported)
                .with_meta("parameters", string_list(&function.parameters)),
        );
        graph.add_edge(DependencyEdge::new(EdgeKind::Contains, &file_id, &id));
        symbols.functions.entry(function.name.clone()).or_insert(id);
    }

    for variable in &entities.variables {
        let id = ids::variable(path, None, &variable.name);
        graph.add_node(
            DependencyNode::new(&id, NodeKind::Variable, &variable.name, path)
                .with_meta("line", variable.line)
                .with_meta("exported", variable.is_exported),
        );
        graph.add_edge(DependencyEdge::new(EdgeKind::Contains, &file_id, id));
    }

    symbols
}

/// Id of the enclosing class of a nested class, if already declared
fn enclosing_class_id(class: &ClassInfo, symbols: &FileSymbols) -> Option<String> {
    let parent = class.parent_class.as_deref()?;
    symbols.classes.get(parent).cloned()
}

fn string_list(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

/// Store file depth on file nodes and copy it onto everything they contain
fn apply_depth(graph: &mut DependencyGraph, depth: &AbstractionDepth) {
    for (id, &value) in &depth.depths {
        let is_entry = depth.is_entry_point(id);
        let is_orphan = depth.is_orphan(id);
        if let Some(node) = graph.node_by_id_mut(id) {
            node.set_meta("depth", value);
            node.set_meta("entry_point", is_entry);
            node.set_meta("orphan", is_orphan);
        }
    }

    let entity_depths: Vec<(String, usize)> = graph
        .nodes()
        .filter(|n| !matches!(n.kind, NodeKind::File | NodeKind::Directory))
        .filter_map(|n| {
            depth
                .depth_of(&ids::file(&n.path))
                .map(|d| (n.id.clone(), d))
        })
        .collect();
    for (id, value) in entity_depths {
        if let Some(node) = graph.node_by_id_mut(&id) {
            node.set_meta("depth", value);
        }
    }
}
