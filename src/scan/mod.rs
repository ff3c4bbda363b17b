use crate::util;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

pub mod language;

/// A discovered source file, relative to the repository root.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub path: String,
    pub size: u64,
    pub ext: String,
}

/// Directory names that are never descended into, regardless of ignore
/// rules. `.codemap` is the engine's own artifact directory.
static SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "vendor",
    "Pods",
    "build",
    "DerivedData",
    ".idea",
    ".vscode",
    "__pycache__",
    "venv",
    ".venv",
    ".env",
    ".pytest_cache",
    "dist",
    ".next",
    ".nuxt",
    "target",
    ".gradle",
    ".codemap",
];

pub fn is_skipped_dir(name: &str) -> bool {
    SKIP_DIRS.iter().any(|candidate| *candidate == name)
}

fn walker(root: &Path) -> ignore::Walk {
    WalkBuilder::new(root)
        .ignore(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .parents(true)
        .require_git(false)
        .hidden(true)
        .filter_entry(|entry| !is_skipped_entry(entry))
        .build()
}

/// Walks the repository and returns every file that survives the fixed
/// skip list and the cascading ignore rules, sorted by relative path.
/// Only an inaccessible root is an error; per-entry failures are skipped.
pub fn scan_root(root: &Path) -> Result<Vec<FileInfo>> {
    fs::metadata(root).with_context(|| format!("scan root {}", root.display()))?;

    let mut files = Vec::new();
    for entry in walker(root) {
        let entry = match entry {
            Ok(value) => value,
            Err(err) => {
                eprintln!("walk error: {err}");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        let rel_path = match util::normalize_rel_path(root, path) {
            Ok(value) => value,
            Err(_) => continue,
        };
        let size = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(_) => continue,
        };
        files.push(FileInfo {
            path: rel_path,
            size,
            ext: util::ext_of(path),
        });
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Every non-ignored directory under the root (the root included); the
/// daemon registers one watch per entry.
pub fn scan_dirs(root: &Path) -> Result<Vec<std::path::PathBuf>> {
    fs::metadata(root).with_context(|| format!("scan root {}", root.display()))?;

    let mut dirs = Vec::new();
    for entry in walker(root) {
        let entry = match entry {
            Ok(value) => value,
            Err(_) => continue,
        };
        let is_dir = entry
            .file_type()
            .map(|ft| ft.is_dir())
            .unwrap_or(entry.depth() == 0);
        if is_dir {
            dirs.push(entry.path().to_path_buf());
        }
    }
    Ok(dirs)
}

fn is_skipped_entry(entry: &ignore::DirEntry) -> bool {
    if !entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
        return false;
    }
    match entry.file_name().to_str() {
        Some(name) => is_skipped_dir(name),
        None => entry.file_name() == OsStr::new(".git"),
    }
}
