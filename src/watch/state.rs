use crate::watch::event::Event;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A snapshot older than this is treated as absent: the freshness gate is
/// the only signal that a daemon is alive.
pub const FRESHNESS_WINDOW_SECS: i64 = 30;

/// How many trailing events the snapshot carries.
pub const SNAPSHOT_EVENT_LIMIT: usize = 50;

pub fn codemap_dir(root: &Path) -> PathBuf {
    root.join(".codemap")
}

pub fn state_path(root: &Path) -> PathBuf {
    codemap_dir(root).join("state.json")
}

pub fn event_log_path(root: &Path) -> PathBuf {
    codemap_dir(root).join("events.log")
}

pub fn hubs_path(root: &Path) -> PathBuf {
    codemap_dir(root).join("hubs.txt")
}

/// The persisted daemon state that out-of-process consumers read instead
/// of talking to the daemon directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub updated_at: DateTime<Utc>,
    pub file_count: usize,
    pub hubs: Vec<String>,
    pub importers: BTreeMap<String, Vec<String>>,
    pub imports: BTreeMap<String, Vec<String>>,
    pub recent_events: Vec<Event>,
}

/// Writes the snapshot atomically (sibling temp file + rename) so readers
/// never observe a partial file.
pub fn write_state(root: &Path, state: &State) -> Result<()> {
    let path = state_path(root);
    let data = serde_json::to_vec_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, &path).with_context(|| format!("rename to {}", path.display()))?;
    Ok(())
}

/// Reads the snapshot, returning `None` when it is missing, unparsable,
/// or older than the freshness window.
pub fn read_state(root: &Path) -> Option<State> {
    let data = fs::read_to_string(state_path(root)).ok()?;
    let state: State = serde_json::from_str(&data).ok()?;
    let age = Utc::now().signed_duration_since(state.updated_at);
    if age.num_seconds() > FRESHNESS_WINDOW_SECS {
        return None;
    }
    Some(state)
}

/// Writes `.codemap/hubs.txt`: a timestamp header and one hub per line.
pub fn write_hubs_file(root: &Path, hubs: &[String]) -> Result<()> {
    fs::create_dir_all(codemap_dir(root))?;
    let mut content = format!("# Hub files at {}\n", Utc::now().to_rfc3339());
    for hub in hubs {
        content.push_str(hub);
        content.push('\n');
    }
    let path = hubs_path(root);
    fs::write(&path, content).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Last `limit` non-empty lines of `events.log`, oldest first. Used by
/// short-lived consumers for previous-session context.
pub fn read_recent_log_lines(root: &Path, limit: usize) -> Vec<String> {
    let Ok(data) = fs::read_to_string(event_log_path(root)) else {
        return Vec::new();
    };
    let mut recent: Vec<String> = Vec::new();
    for line in data.lines().rev() {
        if recent.len() >= limit {
            break;
        }
        if !line.trim().is_empty() {
            recent.push(line.to_string());
        }
    }
    recent.reverse();
    recent
}
