use std::path::Path;
use std::process::Command;

/// Detected once at daemon start; the dirty probe is skipped entirely in
/// unversioned trees.
pub fn is_git_repo(root: &Path) -> bool {
    root.join(".git").is_dir()
}

/// True when `git diff --quiet` exits non-zero, meaning the file differs
/// from the index. Failing to run git at all reads as clean.
pub fn is_file_dirty(root: &Path, rel_path: &str) -> bool {
    let status = Command::new("git")
        .arg("diff")
        .arg("--quiet")
        .arg("--")
        .arg(rel_path)
        .current_dir(root)
        .status();
    match status {
        Ok(status) => !status.success(),
        Err(_) => false,
    }
}
