//! Directory walk feeding the pipeline.
//!
//! Honours `.gitignore` and friends through the `ignore` crate. Only files
//! with a supported extension are read; unreadable ones are skipped with a
//! warning.

use anyhow::{Context, Result};
use codescape_pipeline::{Language, SourceFile};
use ignore::WalkBuilder;
use std::path::Path;

pub fn collect_sources(root: &Path) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", root.display());
    }

    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let language = Language::from_path(path);
        if !language.supports_ast() {
            continue;
        }

        let relative = relative_path(root, path)?;
        match std::fs::read_to_string(path) {
            Ok(content) => files.push(SourceFile::new(relative, content).with_language(language)),
            Err(err) => log::warn!("Skipping {}: {err}", path.display()),
        }
    }

    // Walk order depends on the file system
    files.sort_by(|a, b| a.path.cmp(&b.path));
    log::info!("Collected {} source files under {}", files.len(), root.display());
    Ok(files)
}

/// `/`-separated path of `path` below `root`
fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_supported_files_with_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/lib")).unwrap();
        std::fs::write(dir.path().join("src/index.ts"), "export {};").unwrap();
        std::fs::write(dir.path().join("src/lib/util.js"), "module.exports = {};").unwrap();
        std::fs::write(dir.path().join("README.md"), "# readme").unwrap();

        let files = collect_sources(dir.path()).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/index.ts", "src/lib/util.js"]);
        assert_eq!(files[0].language, Some(Language::TypeScript));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_sources(&dir.path().join("nope")).is_err());
    }
}
