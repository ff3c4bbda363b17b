use crate::extract::{Extractors, FileAnalysis};
use crate::scan;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub mod index;
pub mod manifest;
pub mod resolve;

use index::FileIndex;

/// A file with this many importers (or more) is a hub.
pub const HUB_THRESHOLD: usize = 3;

/// The resolved file-to-file dependency graph. `imports` and `importers`
/// are exact mirrors of each other and may contain cycles; treat it as a
/// general directed graph, never a tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileGraph {
    pub module: Option<String>,
    pub imports: BTreeMap<String, Vec<String>>,
    pub importers: BTreeMap<String, Vec<String>>,
    pub packages: BTreeMap<String, Vec<String>>,
}

/// Scans the root, extracts imports from every supported file, and
/// resolves them into a `FileGraph`.
pub fn build(root: &Path) -> Result<FileGraph> {
    let module = manifest::detect_module(root);
    let files = scan::scan_root(root)?;
    let index = FileIndex::build(&files, module.as_deref());

    let mut extractors = Extractors::new()?;
    let mut analyses = Vec::new();
    for file in &files {
        if let Some(analysis) = extractors.analyze_file(root, &file.path) {
            analyses.push(analysis);
        }
    }

    Ok(build_from_analyses(module, &index, &analyses))
}

/// Runs the scan and extraction passes and returns the raw per-file
/// analyses without resolving them.
pub fn analyze(root: &Path) -> Result<Vec<FileAnalysis>> {
    let files = scan::scan_root(root)?;
    let mut extractors = Extractors::new()?;
    let mut analyses = Vec::new();
    for file in &files {
        if let Some(analysis) = extractors.analyze_file(root, &file.path) {
            analyses.push(analysis);
        }
    }
    Ok(analyses)
}

fn build_from_analyses(
    module: Option<String>,
    index: &FileIndex,
    analyses: &[FileAnalysis],
) -> FileGraph {
    let mut graph = FileGraph {
        module,
        packages: index
            .module_packages()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        ..FileGraph::default()
    };

    for analysis in analyses {
        let mut resolved = Vec::new();
        for imp in &analysis.imports {
            for target in resolve::resolve(imp, &analysis.path, index, graph.module.as_deref()) {
                if target == analysis.path {
                    continue;
                }
                if !resolved.iter().any(|existing| *existing == target) {
                    resolved.push(target);
                }
            }
        }
        if resolved.is_empty() {
            continue;
        }
        for target in &resolved {
            graph
                .importers
                .entry(target.clone())
                .or_default()
                .push(analysis.path.clone());
        }
        graph.imports.insert(analysis.path.clone(), resolved);
    }

    graph
}

impl FileGraph {
    pub fn imports_of(&self, path: &str) -> &[String] {
        self.imports.get(path).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn importers_of(&self, path: &str) -> &[String] {
        self.importers
            .get(path)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_hub(&self, path: &str) -> bool {
        self.importers_of(path).len() >= HUB_THRESHOLD
    }

    pub fn hub_files(&self) -> Vec<String> {
        self.importers
            .iter()
            .filter(|(_, importers)| importers.len() >= HUB_THRESHOLD)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// One-hop neighborhood: imports and importers of `path`, minus the
    /// file itself. Intentionally not a reachability closure.
    pub fn connected(&self, path: &str) -> Vec<String> {
        let mut result = Vec::new();
        for other in self.imports_of(path).iter().chain(self.importers_of(path)) {
            if other != path && !result.iter().any(|existing| existing == other) {
                result.push(other.clone());
            }
        }
        result
    }
}
