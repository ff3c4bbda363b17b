use crate::graph::index::FileIndex;
use crate::util;

/// Extension candidates tried in order when matching a normalized import
/// against the index. The composite entries cover directory imports that
/// land on an index file.
static EXT_CANDIDATES: &[&str] = &[
    "",
    ".go",
    ".py",
    ".js",
    ".ts",
    ".tsx",
    ".jsx",
    ".rs",
    ".rb",
    ".java",
    "/index.js",
    "/index.ts",
    "/index.tsx",
    "/__init__.py",
    "/mod.rs",
];

/// Maps a raw import string appearing in `from_file` to repository paths.
/// Strategies are tried in order; the first non-empty result wins. An
/// empty result means the import is external or unresolvable.
pub fn resolve(
    imp: &str,
    from_file: &str,
    index: &FileIndex,
    module: Option<&str>,
) -> Vec<String> {
    let imp = imp.trim();
    let normalized = normalize(imp);

    if let Some(module) = module {
        if imp.starts_with(module) {
            if let Some(files) = index.module_package(imp) {
                return files.to_vec();
            }
        }
    }

    if imp.starts_with('.') {
        let from_dir = util::parent_dir(from_file);
        return resolve_relative(imp, &from_dir, index);
    }

    if let Some(files) = try_exact(&normalized, index) {
        return files;
    }

    if let Some(files) = try_suffix(&normalized, index) {
        return files;
    }

    Vec::new()
}

/// Converts the language-specific import syntaxes into a path-like form:
/// Python dotted paths become slashes, Rust `crate::`/`super::` prefixes
/// are dropped and `::` becomes a slash, stray quotes are stripped.
fn normalize(imp: &str) -> String {
    let mut imp = imp.trim_matches(|ch| ch == '"' || ch == '\'' || ch == '`').to_string();

    if imp.contains('.') && !imp.contains('/') && !imp.starts_with('.') {
        imp = imp.replace('.', "/");
    }

    if let Some(rest) = imp.strip_prefix("crate::") {
        imp = rest.replace("::", "/");
    } else if let Some(rest) = imp.strip_prefix("super::") {
        imp = rest.replace("::", "/");
    }

    imp
}

fn resolve_relative(imp: &str, from_dir: &str, index: &FileIndex) -> Vec<String> {
    let mut levels = 0;
    let mut rest = imp;
    while let Some(stripped) = rest.strip_prefix("../") {
        levels += 1;
        rest = stripped;
    }
    let rest = rest.strip_prefix("./").unwrap_or(rest);

    let mut target_dir = from_dir.to_string();
    for _ in 0..levels {
        target_dir = util::parent_dir(&target_dir);
    }

    let candidate = if target_dir.is_empty() {
        rest.to_string()
    } else {
        format!("{target_dir}/{rest}")
    };

    try_exact(&candidate, index).unwrap_or_default()
}

fn try_exact(path: &str, index: &FileIndex) -> Option<Vec<String>> {
    for ext in EXT_CANDIDATES {
        if let Some(files) = index.exact(&format!("{path}{ext}")) {
            return Some(files.to_vec());
        }
    }
    None
}

fn try_suffix(normalized: &str, index: &FileIndex) -> Option<Vec<String>> {
    for ext in EXT_CANDIDATES {
        if let Some(files) = index.suffix(&format!("{normalized}{ext}")) {
            return Some(files.to_vec());
        }
    }
    index
        .suffix(&format!("{normalized}/__init__.py"))
        .map(|files| files.to_vec())
}
