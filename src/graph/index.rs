use crate::scan::FileInfo;
use crate::util;
use std::collections::HashMap;

/// Multi-key lookup over the scanned files, built once per graph build.
///
/// Keys are stored both with and without extension so that import forms
/// like `app/core/config` and `app/core/config.py` both land.
pub struct FileIndex {
    by_exact: HashMap<String, Vec<String>>,
    by_suffix: HashMap<String, Vec<String>>,
    by_dir: HashMap<String, Vec<String>>,
    module_packages: HashMap<String, Vec<String>>,
}

impl FileIndex {
    pub fn build(files: &[FileInfo], module: Option<&str>) -> Self {
        let mut index = FileIndex {
            by_exact: HashMap::new(),
            by_suffix: HashMap::new(),
            by_dir: HashMap::new(),
            module_packages: HashMap::new(),
        };

        for file in files {
            let path = file.path.as_str();
            let dir = util::parent_dir(path);

            index
                .by_dir
                .entry(dir.clone())
                .or_default()
                .push(path.to_string());

            insert(&mut index.by_exact, path, path);
            insert(&mut index.by_exact, &strip_ext(path, &file.ext), path);

            // Every right-truncated suffix: "a/b/c.py" is also reachable
            // as "b/c.py" and "c.py", each with and without extension.
            let parts: Vec<&str> = path.split('/').collect();
            for i in 1..parts.len() {
                let suffix = parts[i..].join("/");
                insert(&mut index.by_suffix, &strip_ext(&suffix, &file.ext), path);
                insert(&mut index.by_suffix, &suffix, path);
            }

            if file.ext == ".go" {
                if let Some(module) = module {
                    let pkg = if dir.is_empty() {
                        module.to_string()
                    } else {
                        format!("{module}/{dir}")
                    };
                    index
                        .module_packages
                        .entry(pkg)
                        .or_default()
                        .push(path.to_string());
                }
            }
        }

        index
    }

    pub fn exact(&self, key: &str) -> Option<&[String]> {
        self.by_exact.get(key).map(|value| value.as_slice())
    }

    pub fn suffix(&self, key: &str) -> Option<&[String]> {
        self.by_suffix.get(key).map(|value| value.as_slice())
    }

    pub fn dir(&self, key: &str) -> Option<&[String]> {
        self.by_dir.get(key).map(|value| value.as_slice())
    }

    pub fn module_package(&self, key: &str) -> Option<&[String]> {
        self.module_packages.get(key).map(|value| value.as_slice())
    }

    pub fn module_packages(&self) -> &HashMap<String, Vec<String>> {
        &self.module_packages
    }
}

fn insert(table: &mut HashMap<String, Vec<String>>, key: &str, path: &str) {
    if key.is_empty() {
        return;
    }
    let entry = table.entry(key.to_string()).or_default();
    if !entry.iter().any(|existing| existing == path) {
        entry.push(path.to_string());
    }
}

fn strip_ext(path: &str, ext: &str) -> String {
    if !ext.is_empty() && path.ends_with(ext) {
        path[..path.len() - ext.len()].to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, ext: &str) -> FileInfo {
        FileInfo {
            path: path.to_string(),
            size: 1,
            ext: ext.to_string(),
        }
    }

    #[test]
    fn exact_lookup_with_and_without_extension() {
        let files = vec![file("app/core/config.py", ".py")];
        let index = FileIndex::build(&files, None);
        assert!(index.exact("app/core/config.py").is_some());
        assert!(index.exact("app/core/config").is_some());
        assert!(index.exact("app/core").is_none());
    }

    #[test]
    fn suffix_lookup_over_right_truncations() {
        let files = vec![file("server/app/core/config.py", ".py")];
        let index = FileIndex::build(&files, None);
        for key in [
            "app/core/config.py",
            "core/config.py",
            "config.py",
            "app/core/config",
            "config",
        ] {
            assert!(index.suffix(key).is_some(), "missing suffix key {key}");
        }
        assert!(index.suffix("server/app/core/config.py").is_none());
    }

    #[test]
    fn suffix_collects_all_ambiguous_matches() {
        let files = vec![file("a/config.py", ".py"), file("b/config.py", ".py")];
        let index = FileIndex::build(&files, None);
        let matches = index.suffix("config.py").unwrap();
        assert_eq!(matches, ["a/config.py", "b/config.py"]);
    }

    #[test]
    fn module_packages_key_go_files_by_directory() {
        let files = vec![
            file("scanner/walker.go", ".go"),
            file("scanner/types.go", ".go"),
            file("main.go", ".go"),
            file("render/colors.py", ".py"),
        ];
        let index = FileIndex::build(&files, Some("codemap"));
        assert_eq!(
            index.module_package("codemap/scanner").unwrap(),
            ["scanner/walker.go", "scanner/types.go"]
        );
        assert_eq!(index.module_package("codemap").unwrap(), ["main.go"]);
        assert!(index.module_package("codemap/render").is_none());
    }

    #[test]
    fn dir_groups_files() {
        let files = vec![file("a/x.go", ".go"), file("a/y.go", ".go")];
        let index = FileIndex::build(&files, None);
        assert_eq!(index.dir("a").unwrap().len(), 2);
    }
}
