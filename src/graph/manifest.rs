use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Reads the Go module name from `go.mod` at the root, if present.
pub fn detect_module(root: &Path) -> Option<String> {
    let content = fs::read_to_string(root.join("go.mod")).ok()?;
    for line in content.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("module ") {
            let name = rest.trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Best-effort listing of third-party dependencies declared in the root
/// manifests, keyed by manifest kind. Absent or unparsable manifests are
/// simply omitted.
pub fn read_external_deps(root: &Path) -> BTreeMap<String, Vec<String>> {
    let mut deps = BTreeMap::new();
    if let Some(entries) = go_mod_deps(root) {
        deps.insert("go".to_string(), entries);
    }
    if let Some(entries) = package_json_deps(root) {
        deps.insert("node".to_string(), entries);
    }
    if let Some(entries) = requirements_deps(root) {
        deps.insert("python".to_string(), entries);
    }
    if let Some(entries) = cargo_toml_deps(root) {
        deps.insert("rust".to_string(), entries);
    }
    deps
}

fn go_mod_deps(root: &Path) -> Option<Vec<String>> {
    let content = fs::read_to_string(root.join("go.mod")).ok()?;
    let mut entries = Vec::new();
    let mut in_require = false;
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with("require (") {
            in_require = true;
            continue;
        }
        if in_require {
            if line == ")" {
                in_require = false;
                continue;
            }
            if let Some(name) = line.split_whitespace().next() {
                entries.push(name.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("require ") {
            if let Some(name) = rest.split_whitespace().next() {
                entries.push(name.to_string());
            }
        }
    }
    if entries.is_empty() { None } else { Some(entries) }
}

fn package_json_deps(root: &Path) -> Option<Vec<String>> {
    let content = fs::read_to_string(root.join("package.json")).ok()?;
    let value: serde_json::Value = serde_json::from_str(&content).ok()?;
    let mut entries = Vec::new();
    for key in ["dependencies", "devDependencies"] {
        if let Some(map) = value.get(key).and_then(|v| v.as_object()) {
            entries.extend(map.keys().cloned());
        }
    }
    if entries.is_empty() { None } else { Some(entries) }
}

fn requirements_deps(root: &Path) -> Option<Vec<String>> {
    let content = fs::read_to_string(root.join("requirements.txt")).ok()?;
    let mut entries = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let name: String = line
            .chars()
            .take_while(|ch| ch.is_alphanumeric() || *ch == '-' || *ch == '_' || *ch == '.')
            .collect();
        if !name.is_empty() {
            entries.push(name);
        }
    }
    if entries.is_empty() { None } else { Some(entries) }
}

fn cargo_toml_deps(root: &Path) -> Option<Vec<String>> {
    let content = fs::read_to_string(root.join("Cargo.toml")).ok()?;
    let mut entries = Vec::new();
    let mut in_deps = false;
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_deps = line == "[dependencies]" || line == "[dev-dependencies]";
            continue;
        }
        if in_deps && !line.is_empty() && !line.starts_with('#') {
            if let Some((name, _)) = line.split_once('=') {
                entries.push(name.trim().to_string());
            }
        }
    }
    if entries.is_empty() { None } else { Some(entries) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_dir(label: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("codemap-manifest-{label}-{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_module_from_go_mod() {
        let root = temp_dir("gomod");
        fs::write(root.join("go.mod"), "module codemap\n\ngo 1.22\n").unwrap();
        assert_eq!(detect_module(&root).as_deref(), Some("codemap"));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn module_absent_without_manifest() {
        let root = temp_dir("nomod");
        assert_eq!(detect_module(&root), None);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn collects_deps_across_manifests() {
        let root = temp_dir("deps");
        fs::write(
            root.join("go.mod"),
            "module m\n\nrequire (\n\tgithub.com/fsnotify/fsnotify v1.7.0\n)\n",
        )
        .unwrap();
        fs::write(
            root.join("package.json"),
            r#"{"dependencies": {"react": "^18.0.0"}}"#,
        )
        .unwrap();
        fs::write(root.join("requirements.txt"), "flask==3.0\n# comment\n").unwrap();

        let deps = read_external_deps(&root);
        assert_eq!(deps["go"], vec!["github.com/fsnotify/fsnotify"]);
        assert_eq!(deps["node"], vec!["react"]);
        assert_eq!(deps["python"], vec!["flask"]);
        let _ = fs::remove_dir_all(&root);
    }
}
