//! Classify import specifiers as package (external) or project (internal) imports.

/// Bare package specifiers are external: anything that is not relative
/// (`./`, `../`), absolute (`/`), or empty.
pub fn is_external_specifier(specifier: &str) -> bool {
    let spec = specifier.trim();
    !(spec.is_empty()
        || spec == "."
        || spec == ".."
        || spec.starts_with("./")
        || spec.starts_with("../")
        || spec.starts_with('/'))
}

/// Package name of an external specifier.
///
/// `@scope/pkg/deep/path` -> `@scope/pkg`, `lodash/fp` -> `lodash`,
/// `node:fs/promises` -> `fs`. Internal specifiers yield `None`.
pub fn package_name(specifier: &str) -> Option<String> {
    let spec = specifier.trim();
    if !is_external_specifier(spec) {
        return None;
    }
    let spec = spec.strip_prefix("node:").unwrap_or(spec);

    let mut segments = spec.split('/').filter(|s| !s.is_empty());
    let first = segments.next()?;

    if first.starts_with('@') {
        let name = segments.next()?;
        Some(format!("{first}/{name}"))
    } else {
        Some(first.to_string())
    }
}
