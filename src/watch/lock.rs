use crate::watch::state;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

pub fn pid_path(root: &Path) -> PathBuf {
    state::codemap_dir(root).join("watch.pid")
}

/// Writes this process's pid. A stale pidfile is simply overwritten.
pub fn write_pid(root: &Path) -> Result<()> {
    let path = pid_path(root);
    fs::write(&path, std::process::id().to_string())
        .with_context(|| format!("write {}", path.display()))
}

pub fn read_pid(root: &Path) -> Option<i32> {
    let data = fs::read_to_string(pid_path(root)).ok()?;
    data.trim().parse().ok()
}

pub fn remove_pid(root: &Path) {
    let _ = fs::remove_file(pid_path(root));
}

/// Liveness probe: signal 0 checks process existence without touching it.
pub fn is_running(root: &Path) -> bool {
    match read_pid(root) {
        Some(pid) => unsafe { libc::kill(pid, 0) == 0 },
        None => false,
    }
}

/// Terminates the daemon recorded in the pidfile and removes the pidfile.
pub fn stop(root: &Path) -> Result<()> {
    let Some(pid) = read_pid(root) else {
        bail!("no daemon running for {}", root.display());
    };
    let result = unsafe { libc::kill(pid, libc::SIGTERM) };
    if result != 0 {
        remove_pid(root);
        bail!("daemon pid {pid} is not running");
    }
    remove_pid(root);
    Ok(())
}
