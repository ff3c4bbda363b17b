use anyhow::{Context, Result};
use std::path::{Component, Path};

pub fn normalize_rel_path(repo_root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(repo_root).with_context(|| {
        format!(
            "strip prefix {} from {}",
            repo_root.display(),
            path.display()
        )
    })?;
    Ok(normalize_path(rel))
}

/// Renders a path with forward slashes, dropping `.` components. Graph keys
/// and snapshot output use this form on every platform.
pub fn normalize_path(path: &Path) -> String {
    let mut parts = Vec::new();
    for comp in path.components() {
        match comp {
            Component::Normal(os) => parts.push(os.to_string_lossy().to_string()),
            Component::ParentDir => parts.push("..".to_string()),
            Component::CurDir => {}
            _ => {}
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Parent directory of a normalized relative path; empty string at the root.
pub fn parent_dir(rel_path: &str) -> String {
    match rel_path.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => String::new(),
    }
}

/// Lowercased extension including the leading dot, or empty.
pub fn ext_of(path: &Path) -> String {
    match path.extension().and_then(|value| value.to_str()) {
        Some(ext) => format!(".{}", ext.to_ascii_lowercase()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn normalizes_components() {
        assert_eq!(normalize_path(Path::new("a/./b/c.go")), "a/b/c.go");
        assert_eq!(normalize_path(Path::new(".")), ".");
    }

    #[test]
    fn parent_dir_of_nested_and_root() {
        assert_eq!(parent_dir("app/core/config.py"), "app/core");
        assert_eq!(parent_dir("main.go"), "");
    }

    #[test]
    fn extension_is_lowercased_with_dot() {
        assert_eq!(ext_of(&PathBuf::from("Foo.GO")), ".go");
        assert_eq!(ext_of(&PathBuf::from("Makefile")), "");
    }
}
