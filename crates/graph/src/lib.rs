//! # Codescape Graph
//!
//! Dependency graph of a JavaScript/TypeScript source tree.
//!
//! ## Architecture
//!
//! ```text
//! SourceFile[] (path, content, language?)
//!     │
//!     ├──> Per-file extraction (rayon, order preserving)
//!     │
//!     ├──> Graph Builder
//!     │      ├─ File / directory / entity nodes + contains edges
//!     │      ├─ Import resolution (extension order, index fallback)
//!     │      ├─ Inheritance (extends / implements)
//!     │      └─ Calls (name based, best effort)
//!     │
//!     ├──> DependencyGraph (petgraph arena)
//!     │      ├─ Nodes: files, classes, functions, methods, variables
//!     │      └─ Edges: contains, imports, extends, implements, calls
//!     │
//!     └──> Abstraction depth
//!            ├─ Entry points (name → roots → root level → all)
//!            └─ Multi-source BFS over imports, orphans at max + 1
//! ```

mod builder;
mod depth;
mod error;
mod graph;
mod links;
mod resolve;
mod types;

pub use builder::{BuilderConfig, GraphBuilder, SourceFile};
pub use depth::{
    compute_abstraction_depth, AbstractionDepth, EntryPointMatcher, DEFAULT_ENTRY_PATTERN,
};
pub use error::{GraphError, Result};
pub use graph::GraphStats;
pub use resolve::{normalize_path, ImportResolver, Resolution};
pub use types::{
    ids, BuildIssue, DependencyEdge, DependencyGraph, DependencyNode, EdgeKind, NodeKind,
};
