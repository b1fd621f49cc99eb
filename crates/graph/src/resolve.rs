//! Import specifier resolution against the set of files in a build.

use codescape_parser::{package_name, Language};
use std::collections::HashSet;

/// Outcome of resolving one import specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A file in the build (normalized path)
    Internal(String),
    /// A package, by name
    External(String),
    Unresolved,
}

/// Resolves relative and root-absolute specifiers to known files.
///
/// Candidates are tried in a fixed order: the exact path, the path plus
/// each resolution extension, `.js`-family specifiers rewritten to their
/// TypeScript sources, then `<dir>/index` plus each extension.
#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
    files: HashSet<String>,
}

impl ImportResolver {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            files: paths
                .into_iter()
                .map(|p| normalize_path(p.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    pub fn resolve(&self, importer: &str, specifier: &str) -> Resolution {
        let spec = specifier.trim();
        if let Some(package) = package_name(spec) {
            return Resolution::External(package);
        }

        let joined = if let Some(rooted) = spec.strip_prefix('/') {
            normalize_segments(rooted)
        } else {
            normalize_segments(&format!("{}/{spec}", parent_dir(importer)))
        };
        let Some(base) = joined else {
            return Resolution::Unresolved;
        };

        candidates(&base)
            .into_iter()
            .find(|candidate| self.files.contains(candidate))
            .map_or(Resolution::Unresolved, Resolution::Internal)
    }
}

fn candidates(base: &str) -> Vec<String> {
    let extensions = Language::resolution_extensions();
    let mut out = Vec::with_capacity(2 + extensions.len() * 2);

    if !base.is_empty() {
        out.push(base.to_string());
        out.extend(extensions.iter().map(|ext| format!("{base}.{ext}")));

        // `import "./a.js"` in TypeScript sources refers to `a.ts`
        for (js, ts_sources) in [
            (".js", &["ts", "tsx"][..]),
            (".jsx", &["tsx"][..]),
            (".mjs", &["mts"][..]),
            (".cjs", &["cts"][..]),
        ] {
            if let Some(stem) = base.strip_suffix(js) {
                out.extend(ts_sources.iter().map(|ext| format!("{stem}.{ext}")));
            }
        }
    }

    let index = if base.is_empty() {
        "index".to_string()
    } else {
        format!("{base}/index")
    };
    out.extend(extensions.iter().map(|ext| format!("{index}.{ext}")));
    out
}

/// Directory part of a normalized path (`""` for root-level files)
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

/// Forward slashes, no `./` segments, no leading `/`
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let trimmed = unified.trim_start_matches('/');
    normalize_segments(trimmed).unwrap_or_else(|| trimmed.to_string())
}

/// Collapse `.` and `..` segments; `None` when `..` climbs above the root
fn normalize_segments(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}
