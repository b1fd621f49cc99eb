//! Name-based linking of inheritance clauses and call sites.
//!
//! Resolution here is deliberately approximate: names are matched against
//! declarations in the same file or in files reached through a resolved
//! import binding, without any type information. An ambiguous member call
//! may produce several edges, an unknown one none.

use crate::types::{DependencyEdge, DependencyGraph, EdgeKind};
use codescape_parser::{CallSite, CallerScope, FileEntities, ImportKind};
use std::collections::{HashMap, HashSet};

/// A local name bound by an import that resolved to a file in the build
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportBinding {
    pub local: String,
    pub imported: String,
    pub kind: ImportKind,
    pub target: String,
}

/// `export { imported as exported } from "target"`; `exported` is `None`
/// for `export * from "target"`, which forwards every name but `default`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReExport {
    pub exported: Option<String>,
    pub imported: String,
    pub target: String,
}

/// Declarations of one file, by name
#[derive(Debug, Default)]
pub(crate) struct FileSymbols {
    pub functions: HashMap<String, String>,
    pub classes: HashMap<String, String>,
    pub interfaces: HashMap<String, String>,
    /// `(class, method)` → id
    pub methods: HashMap<(String, String), String>,
    pub methods_by_name: HashMap<String, Vec<String>>,
    pub default_export: Option<String>,
    /// exported name → local name, for `export { local as exported }`
    pub export_aliases: HashMap<String, String>,
    pub bindings: Vec<ImportBinding>,
    pub re_exports: Vec<ReExport>,
}

impl FileSymbols {
    fn binding(&self, local: &str) -> Option<&ImportBinding> {
        self.bindings.iter().find(|b| b.local == local)
    }

    /// Local name an importer refers to through `imported`
    fn exported_name<'a>(&'a self, imported: &'a str) -> Option<&'a str> {
        if let Some(local) = self.export_aliases.get(imported) {
            return Some(local);
        }
        if imported == "default" {
            self.default_export.as_deref()
        } else {
            Some(imported)
        }
    }

    fn type_named(&self, name: &str) -> Option<&String> {
        self.classes.get(name).or_else(|| self.interfaces.get(name))
    }
}

/// Symbol tables for every file in a build, keyed by normalized path
#[derive(Debug, Default)]
pub(crate) struct SymbolIndex {
    files: HashMap<String, FileSymbols>,
}

enum Lookup {
    Type,
    Class,
    Callable,
}

impl SymbolIndex {
    pub fn insert(&mut self, path: String, symbols: FileSymbols) {
        self.files.insert(path, symbols);
    }

    pub fn get(&self, path: &str) -> Option<&FileSymbols> {
        self.files.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut FileSymbols> {
        self.files.get_mut(path)
    }

    fn lookup_local(symbols: &FileSymbols, name: &str, what: &Lookup) -> Option<String> {
        match what {
            Lookup::Type => symbols.type_named(name).cloned(),
            Lookup::Class => symbols.classes.get(name).cloned(),
            Lookup::Callable => symbols
                .functions
                .get(name)
                .or_else(|| symbols.classes.get(name))
                .cloned(),
        }
    }

    /// Resolve `name` as seen from `path`: local declaration first, then an
    /// import binding, then `ns.Name` through a namespace import
    fn resolve(&self, path: &str, name: &str, what: &Lookup) -> Option<String> {
        let symbols = self.get(path)?;

        if let Some((namespace, member)) = name.split_once('.') {
            let binding = symbols
                .binding(namespace)
                .filter(|b| b.kind == ImportKind::Namespace)?;
            return self.lookup_export(&binding.target, member, what);
        }

        if let Some(found) = Self::lookup_local(symbols, name, what) {
            return Some(found);
        }

        let binding = symbols
            .binding(name)
            .filter(|b| b.kind != ImportKind::Namespace)?;
        self.lookup_export(&binding.target, &binding.imported, what)
    }

    /// Declaration behind `name` as exported by `path`.
    ///
    /// Follows export aliases, re-exported import bindings and
    /// `export ... from` chains. Each `(file, name)` pair is expanded once,
    /// so cyclic barrels terminate.
    fn lookup_export(&self, path: &str, name: &str, what: &Lookup) -> Option<String> {
        let mut pending = vec![(path.to_string(), name.to_string())];
        let mut visited = HashSet::new();

        while let Some((path, name)) = pending.pop() {
            if !visited.insert((path.clone(), name.clone())) {
                continue;
            }
            let Some(symbols) = self.get(&path) else {
                continue;
            };

            let mut next = Vec::new();
            if let Some(local) = symbols.exported_name(&name) {
                if let Some(found) = Self::lookup_local(symbols, local, what) {
                    return Some(found);
                }
                // import { a } from "./x"; export { a };
                if let Some(binding) = symbols
                    .binding(local)
                    .filter(|b| b.kind != ImportKind::Namespace)
                {
                    next.push((binding.target.clone(), binding.imported.clone()));
                }
            }
            for forward in &symbols.re_exports {
                match &forward.exported {
                    Some(exported) if *exported == name => {
                        next.push((forward.target.clone(), forward.imported.clone()));
                    }
                    None if name != "default" => next.push((forward.target.clone(), name.clone())),
                    _ => {}
                }
            }
            // Stack order: earlier candidates are tried first
            pending.extend(next.into_iter().rev());
        }
        None
    }
}

/// Emit `extends` / `implements` edges for classes and interfaces of one file
pub(crate) fn link_inheritance(
    graph: &mut DependencyGraph,
    index: &SymbolIndex,
    path: &str,
    entities: &FileEntities,
) {
    let Some(symbols) = index.get(path) else {
        return;
    };

    for class in &entities.classes {
        let Some(source) = symbols.classes.get(&class.name) else {
            continue;
        };
        if let Some(base) = &class.extends {
            emit(graph, index, path, source, base, EdgeKind::Extends);
        }
        for interface in &class.implements {
            emit(graph, index, path, source, interface, EdgeKind::Implements);
        }
    }

    for interface in &entities.interfaces {
        let Some(source) = symbols.interfaces.get(&interface.name) else {
            continue;
        };
        for base in &interface.extends {
            emit(graph, index, path, source, base, EdgeKind::Extends);
        }
    }
}

fn emit(
    graph: &mut DependencyGraph,
    index: &SymbolIndex,
    path: &str,
    source: &str,
    target_name: &str,
    kind: EdgeKind,
) {
    match index.resolve(path, target_name, &Lookup::Type) {
        Some(target) => {
            graph.add_edge(DependencyEdge::new(kind, source, target));
        }
        None => log::debug!("{path}: unresolved {kind} target `{target_name}`"),
    }
}

/// Emit `calls` edges for every call site of one file
pub(crate) fn link_calls(
    graph: &mut DependencyGraph,
    index: &SymbolIndex,
    path: &str,
    file_id: &str,
    entities: &FileEntities,
) -> usize {
    let Some(symbols) = index.get(path) else {
        return 0;
    };

    let mut linked = 0;
    for call in &entities.calls {
        let source = caller_id(symbols, &call.caller).unwrap_or(file_id);
        let targets = call_targets(index, symbols, path, call);
        if targets.is_empty() {
            log::debug!("{path}:{}: no target for call to `{}`", call.line, call.callee);
        }
        for target in targets {
            let edge = DependencyEdge::new(EdgeKind::Calls, source, target)
                .with_meta("line", call.line);
            if graph.add_edge(edge).is_some() {
                linked += 1;
            }
        }
    }
    linked
}

fn caller_id<'a>(symbols: &'a FileSymbols, caller: &CallerScope) -> Option<&'a str> {
    let id = match caller {
        CallerScope::Method { class, method } => symbols
            .methods
            .get(&(class.clone(), method.clone()))
            .or_else(|| symbols.classes.get(class)),
        CallerScope::Class { class } => symbols.classes.get(class),
        CallerScope::Function { name } => symbols.functions.get(name),
        CallerScope::Module => None,
    };
    id.map(String::as_str)
}

fn enclosing_class(caller: &CallerScope) -> Option<&str> {
    match caller {
        CallerScope::Method { class, .. } | CallerScope::Class { class } => Some(class),
        _ => None,
    }
}

fn call_targets(
    index: &SymbolIndex,
    symbols: &FileSymbols,
    path: &str,
    call: &CallSite,
) -> Vec<String> {
    let lookup = if call.is_new {
        Lookup::Class
    } else {
        Lookup::Callable
    };

    match call.receiver.as_deref() {
        None => index.resolve(path, &call.callee, &lookup).into_iter().collect(),
        Some("this") if !call.is_new => enclosing_class(&call.caller)
            .and_then(|class| symbols.methods.get(&(class.to_string(), call.callee.clone())))
            .cloned()
            .into_iter()
            .collect(),
        Some(receiver) => {
            let namespace = symbols
                .binding(receiver)
                .filter(|b| b.kind == ImportKind::Namespace);
            if namespace.is_some() {
                let qualified = format!("{receiver}.{}", call.callee);
                return index.resolve(path, &qualified, &lookup).into_iter().collect();
            }
            if call.is_new {
                return Vec::new();
            }
            symbols
                .methods_by_name
                .get(&call.callee)
                .cloned()
                .unwrap_or_default()
        }
    }
}
