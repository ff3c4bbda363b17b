use std::path::Path;

/// Extension → language tag table. This is the single registration point
/// for language knowledge; the extractor registry and the watch daemon's
/// source-file filter both derive from it.
static EXTENSIONS: &[(&str, &str)] = &[
    ("go", "go"),
    ("py", "python"),
    ("pyi", "python"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("rs", "rust"),
    ("rb", "ruby"),
    ("java", "java"),
    ("swift", "swift"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("cs", "csharp"),
    ("php", "php"),
    ("dart", "dart"),
    ("r", "r"),
    ("c", "c"),
    ("h", "c"),
    ("cc", "cpp"),
    ("cpp", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
];

static BARE_NAMES: &[(&str, &str)] = &[
    ("makefile", "make"),
    ("dockerfile", "docker"),
    ("rakefile", "ruby"),
    ("gemfile", "ruby"),
];

/// Maps a path to its language tag, or empty for unknown files.
pub fn detect(path: &Path) -> &'static str {
    if let Some(ext) = path.extension().and_then(|value| value.to_str()) {
        let ext = ext.to_ascii_lowercase();
        for (candidate, tag) in EXTENSIONS {
            if *candidate == ext {
                return tag;
            }
        }
        return "";
    }
    if let Some(name) = path.file_name().and_then(|value| value.to_str()) {
        let name = name.to_ascii_lowercase();
        for (candidate, tag) in BARE_NAMES {
            if *candidate == name {
                return tag;
            }
        }
    }
    ""
}

/// True when the path carries an extension the engine tracks. The watch
/// daemon drops events on everything else.
pub fn is_source_path(path: &Path) -> bool {
    match path.extension().and_then(|value| value.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            EXTENSIONS.iter().any(|(candidate, _)| *candidate == ext)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn maps_common_extensions() {
        assert_eq!(detect(&PathBuf::from("main.go")), "go");
        assert_eq!(detect(&PathBuf::from("app/core/config.py")), "python");
        assert_eq!(detect(&PathBuf::from("src/view.tsx")), "typescript");
        assert_eq!(detect(&PathBuf::from("widget.jsx")), "javascript");
        assert_eq!(detect(&PathBuf::from("lib.rs")), "rust");
        assert_eq!(detect(&PathBuf::from("native.h")), "c");
        assert_eq!(detect(&PathBuf::from("engine.cc")), "cpp");
    }

    #[test]
    fn maps_bare_filenames() {
        assert_eq!(detect(&PathBuf::from("Makefile")), "make");
        assert_eq!(detect(&PathBuf::from("Dockerfile")), "docker");
        assert_eq!(detect(&PathBuf::from("Gemfile")), "ruby");
    }

    #[test]
    fn unknown_files_are_empty() {
        assert_eq!(detect(&PathBuf::from("notes.txt")), "");
        assert_eq!(detect(&PathBuf::from("README")), "");
    }

    #[test]
    fn source_filter_tracks_extensions_only() {
        assert!(is_source_path(&PathBuf::from("a/b/handler.go")));
        assert!(is_source_path(&PathBuf::from("view.TSX")));
        assert!(!is_source_path(&PathBuf::from("readme.txt")));
        assert!(!is_source_path(&PathBuf::from("Makefile")));
    }
}
