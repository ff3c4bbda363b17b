use crate::scan::language;
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub mod go;
pub mod javascript;
pub mod python;
pub mod rust;

/// Raw extraction result for one file: top-level callable names and the
/// textual import forms exactly as written (quote- and whitespace-trimmed).
/// Normalization of imports belongs to the resolver.
#[derive(Debug, Default)]
pub struct Extraction {
    pub functions: Vec<String>,
    pub imports: Vec<String>,
}

/// Per-file analysis as fed into the graph build.
#[derive(Debug, Clone, Serialize)]
pub struct FileAnalysis {
    pub path: String,
    pub language: String,
    pub functions: Vec<String>,
    pub imports: Vec<String>,
}

pub trait LanguageExtractor {
    fn extract(&mut self, source: &str) -> Result<Extraction>;
}

/// The extractor registry. The table built here is the only place that
/// knows which languages have grammars; everything else goes through
/// `supports`/`analyze_file`.
pub struct Extractors {
    table: HashMap<&'static str, Box<dyn LanguageExtractor>>,
}

impl Extractors {
    pub fn new() -> Result<Self> {
        let mut table: HashMap<&'static str, Box<dyn LanguageExtractor>> = HashMap::new();
        table.insert("go", Box::new(go::GoExtractor::new()?));
        table.insert("python", Box::new(python::PythonExtractor::new()?));
        table.insert(
            "javascript",
            Box::new(javascript::JavascriptExtractor::new()?),
        );
        table.insert(
            "typescript",
            Box::new(javascript::TypescriptExtractor::new()?),
        );
        table.insert("rust", Box::new(rust::RustExtractor::new()?));
        Ok(Self { table })
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.table.contains_key(lang)
    }

    /// Analyzes one file, returning `None` for unsupported languages and
    /// for every per-file failure (unreadable, binary, parse error).
    pub fn analyze_file(&mut self, root: &Path, rel_path: &str) -> Option<FileAnalysis> {
        let abs = root.join(rel_path);
        let lang = language::detect(&abs);
        let extractor = self.table.get_mut(lang)?;
        let bytes = fs::read(&abs).ok()?;
        let source = String::from_utf8(bytes).ok()?;
        let extraction = extractor.extract(&source).ok()?;
        Some(FileAnalysis {
            path: rel_path.to_string(),
            language: lang.to_string(),
            functions: extraction.functions,
            imports: extraction.imports,
        })
    }
}

pub(crate) fn node_text(node: tree_sitter::Node<'_>, source: &str) -> String {
    source
        .get(node.start_byte()..node.end_byte())
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Strips one layer of surrounding quotes from an import literal.
pub(crate) fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['"', '\'', '`'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}
