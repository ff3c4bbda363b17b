use crate::graph::{self, FileGraph};
use crate::scan::{self, FileInfo, language};
use crate::util;
use crate::vcs;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

pub mod event;
pub mod lock;
pub mod state;

use event::{Event, Op};
use state::State;

/// Repeated events on the same path within this window collapse into one
/// observable event (editor save bursts, write-then-rename saves).
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);

/// How far back `related_hot` looks for edits on connected files.
const RELATED_HOT_WINDOW_SECS: i64 = 300;

/// Per-path line/size cache the delta computation works from.
#[derive(Debug, Clone, Copy)]
struct FileState {
    lines: i64,
    size: i64,
}

/// The daemon's single shared datum. The event-loop thread is the only
/// writer; the snapshot writer and query callers take read locks.
struct LiveGraph {
    files: BTreeMap<String, FileInfo>,
    graph: Option<FileGraph>,
    state: HashMap<String, FileState>,
    events: Vec<Event>,
    is_git_repo: bool,
}

pub struct Daemon {
    root: PathBuf,
    verbose: bool,
    live: Arc<RwLock<LiveGraph>>,
    stop_tx: Option<Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Daemon {
    pub fn new(root: &Path, verbose: bool) -> Result<Self> {
        let root = fs::canonicalize(root)
            .with_context(|| format!("invalid root path {}", root.display()))?;
        let is_git_repo = vcs::is_git_repo(&root);
        Ok(Self {
            root,
            verbose,
            live: Arc::new(RwLock::new(LiveGraph {
                files: BTreeMap::new(),
                graph: None,
                state: HashMap::new(),
                events: Vec::new(),
                is_git_repo,
            })),
            stop_tx: None,
            thread: None,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scans, builds the graph, registers watches, and spawns the event
    /// loop. Any failure here is fatal and releases the pidfile.
    pub fn start(&mut self) -> Result<()> {
        if lock::is_running(&self.root) {
            bail!("daemon already running for {}", self.root.display());
        }
        let dir = state::codemap_dir(&self.root);
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        lock::write_pid(&self.root)?;

        match self.start_inner() {
            Ok(()) => Ok(()),
            Err(err) => {
                lock::remove_pid(&self.root);
                Err(err)
            }
        }
    }

    fn start_inner(&mut self) -> Result<()> {
        self.full_scan()?;
        self.compute_graph();

        let (event_tx, event_rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        })
        .context("create filesystem watcher")?;
        for dir in scan::scan_dirs(&self.root)? {
            watcher
                .watch(&dir, RecursiveMode::NonRecursive)
                .with_context(|| format!("watch {}", dir.display()))?;
        }

        // Snapshot immediately so consumers see state before the first event.
        self.write_snapshot();

        let (stop_tx, stop_rx) = mpsc::channel();
        let root = self.root.clone();
        let live = Arc::clone(&self.live);
        let verbose = self.verbose;
        let handle = thread::spawn(move || {
            event_loop(root, live, watcher, event_rx, stop_rx, verbose);
        });
        self.stop_tx = Some(stop_tx);
        self.thread = Some(handle);
        Ok(())
    }

    /// Drains the event loop, writes a final snapshot, and releases the
    /// pidfile.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        self.write_snapshot();
        lock::remove_pid(&self.root);
    }

    pub fn file_count(&self) -> usize {
        match self.live.read() {
            Ok(live) => live.files.len(),
            Err(_) => 0,
        }
    }

    /// Copies the most recent `limit` events; 0 returns all.
    pub fn get_events(&self, limit: usize) -> Vec<Event> {
        let Ok(live) = self.live.read() else {
            return Vec::new();
        };
        let events = &live.events;
        let start = if limit > 0 && events.len() > limit {
            events.len() - limit
        } else {
            0
        };
        events[start..].to_vec()
    }

    fn full_scan(&mut self) -> Result<()> {
        let started = Instant::now();
        let files = scan::scan_root(&self.root)?;
        let count = files.len();

        let mut live = match self.live.write() {
            Ok(live) => live,
            Err(poisoned) => poisoned.into_inner(),
        };
        live.files.clear();
        live.state.clear();
        for file in files {
            let lines = count_lines(&self.root.join(&file.path));
            if lines > 0 {
                live.state.insert(
                    file.path.clone(),
                    FileState {
                        lines,
                        size: file.size as i64,
                    },
                );
            }
            live.files.insert(file.path.clone(), file);
        }
        drop(live);

        if self.verbose {
            eprintln!("[watch] full scan: {count} files in {:?}", started.elapsed());
        }
        Ok(())
    }

    /// Builds the import graph. Best effort: without it the daemon still
    /// runs, events just lose their structural context.
    fn compute_graph(&mut self) {
        let started = Instant::now();
        match graph::build(&self.root) {
            Ok(file_graph) => {
                let hub_count = file_graph.hub_files().len();
                if let Ok(mut live) = self.live.write() {
                    live.graph = Some(file_graph);
                }
                if self.verbose {
                    eprintln!(
                        "[watch] file graph: {hub_count} hubs in {:?}",
                        started.elapsed()
                    );
                }
            }
            Err(err) => {
                if self.verbose {
                    eprintln!("[watch] file graph unavailable: {err}");
                }
            }
        }
    }

    fn write_snapshot(&self) {
        let Ok(live) = self.live.read() else {
            return;
        };
        if let Some(snapshot) = snapshot_from(&live) {
            if let Err(err) = state::write_state(&self.root, &snapshot) {
                if self.verbose {
                    eprintln!("[watch] snapshot write failed: {err}");
                }
            }
        }
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}

fn event_loop(
    root: PathBuf,
    live: Arc<RwLock<LiveGraph>>,
    mut watcher: RecommendedWatcher,
    event_rx: Receiver<notify::Result<notify::Event>>,
    stop_rx: Receiver<()>,
    verbose: bool,
) {
    let mut debounce: HashMap<PathBuf, Instant> = HashMap::new();

    loop {
        if stop_requested(&stop_rx) {
            break;
        }
        match event_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(Ok(fs_event)) => {
                for (op, path) in classify(&fs_event) {
                    if matches!(op, Op::Create | Op::Write) && path.is_dir() {
                        if op == Op::Create {
                            maybe_watch_dir(&mut watcher, &path);
                        }
                        continue;
                    }
                    if !language::is_source_path(&path) {
                        continue;
                    }
                    if let Some(last) = debounce.get(&path) {
                        if last.elapsed() < DEBOUNCE_WINDOW {
                            continue;
                        }
                    }
                    debounce.insert(path.clone(), Instant::now());
                    handle_event(&root, &live, op, &path, verbose);
                }
            }
            Ok(Err(err)) => {
                if verbose {
                    eprintln!("[watch] error: {err}");
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    // Dropping the watcher here closes the notification stream.
}

fn stop_requested(stop_rx: &Receiver<()>) -> bool {
    match stop_rx.try_recv() {
        Ok(()) => true,
        Err(TryRecvError::Disconnected) => true,
        Err(TryRecvError::Empty) => false,
    }
}

/// Maps a notify event onto the engine's opcodes. A rename-to is
/// indistinguishable from a create at this layer, so it reads as CREATE.
fn classify(fs_event: &notify::Event) -> Vec<(Op, PathBuf)> {
    let paths = &fs_event.paths;
    match fs_event.kind {
        EventKind::Create(_) => paths.iter().map(|p| (Op::Create, p.clone())).collect(),
        EventKind::Remove(_) => paths.iter().map(|p| (Op::Remove, p.clone())).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            paths.iter().map(|p| (Op::Rename, p.clone())).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            paths.iter().map(|p| (Op::Create, p.clone())).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut out = Vec::new();
            if let Some(from) = paths.first() {
                out.push((Op::Rename, from.clone()));
            }
            if let Some(to) = paths.get(1) {
                out.push((Op::Create, to.clone()));
            }
            out
        }
        EventKind::Modify(ModifyKind::Name(_)) => {
            paths.iter().map(|p| (Op::Rename, p.clone())).collect()
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => paths.iter().map(|p| (Op::Write, p.clone())).collect(),
        _ => Vec::new(),
    }
}

/// New directories join the watch set unless hidden or on the skip list.
fn maybe_watch_dir(watcher: &mut RecommendedWatcher, path: &Path) {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return;
    };
    if name.starts_with('.') || scan::is_skipped_dir(name) {
        return;
    }
    let _ = watcher.watch(path, RecursiveMode::NonRecursive);
}

fn handle_event(
    root: &Path,
    live: &Arc<RwLock<LiveGraph>>,
    op: Op,
    abs_path: &Path,
    verbose: bool,
) {
    let rel = match util::normalize_rel_path(root, abs_path) {
        Ok(value) => value,
        Err(_) => abs_path.display().to_string(),
    };
    let mut event = Event::new(op, rel.clone(), language::detect(abs_path).to_string());

    let Ok(mut guard) = live.write() else {
        return;
    };
    match op {
        Op::Create | Op::Write => {
            let Ok(metadata) = fs::metadata(abs_path) else {
                return;
            };
            let lines = count_lines(abs_path);
            let size = metadata.len() as i64;
            event.lines = lines;
            match guard.state.get(&rel) {
                Some(prev) => {
                    event.delta = lines - prev.lines;
                    event.size_delta = size - prev.size;
                }
                None => {
                    event.delta = lines;
                    event.size_delta = size;
                }
            }
            guard.state.insert(rel.clone(), FileState { lines, size });
            guard.files.insert(
                rel.clone(),
                FileInfo {
                    path: rel.clone(),
                    size: metadata.len(),
                    ext: util::ext_of(abs_path),
                },
            );
            if guard.is_git_repo {
                event.dirty = vcs::is_file_dirty(root, &rel);
            }
        }
        Op::Remove | Op::Rename => {
            if let Some(prev) = guard.state.remove(&rel) {
                event.lines = 0;
                event.delta = -prev.lines;
                event.size_delta = -prev.size;
            }
            guard.files.remove(&rel);
        }
    }

    if let Some(file_graph) = &guard.graph {
        event.imports = file_graph.imports_of(&rel).len();
        event.importers = file_graph.importers_of(&rel).len();
        event.is_hub = file_graph.is_hub(&rel);
        event.related_hot = related_hot(&guard, file_graph, &rel, event.time);
    }

    guard.events.push(event.clone());
    let snapshot = snapshot_from(&guard);
    drop(guard);

    if let Err(err) = append_event_log(root, &event) {
        if verbose {
            eprintln!("[watch] event log append failed: {err}");
        }
    }
    if let Some(snapshot) = snapshot {
        if let Err(err) = state::write_state(root, &snapshot) {
            if verbose {
                eprintln!("[watch] snapshot write failed: {err}");
            }
        }
    }

    if verbose {
        let delta = if event.delta != 0 {
            format!(" ({:+} lines)", event.delta)
        } else {
            String::new()
        };
        let dirty = if event.dirty { " [dirty]" } else { "" };
        let hub = if event.is_hub {
            format!(" [HUB:{} importers]", event.importers)
        } else {
            String::new()
        };
        eprintln!(
            "[watch] {} {} {}{delta}{dirty}{hub}",
            event.time.format("%H:%M:%S"),
            event.op,
            event.path,
        );
    }
}

/// Connected files that were themselves created or written within the
/// last five minutes, found by scanning the event buffer backward.
fn related_hot(
    live: &LiveGraph,
    file_graph: &FileGraph,
    path: &str,
    now: DateTime<Utc>,
) -> Vec<String> {
    let connected = file_graph.connected(path);
    if connected.is_empty() {
        return Vec::new();
    }

    let cutoff = now - ChronoDuration::seconds(RELATED_HOT_WINDOW_SECS);
    let mut recently_edited: Vec<&str> = Vec::new();
    for event in live.events.iter().rev() {
        if event.time < cutoff {
            break;
        }
        if event.path != path && matches!(event.op, Op::Create | Op::Write) {
            recently_edited.push(event.path.as_str());
        }
    }

    connected
        .into_iter()
        .filter(|candidate| recently_edited.iter().any(|hot| hot == candidate))
        .collect()
}

fn snapshot_from(live: &LiveGraph) -> Option<State> {
    let file_graph = live.graph.as_ref()?;
    let events = &live.events;
    let start = events.len().saturating_sub(state::SNAPSHOT_EVENT_LIMIT);
    Some(State {
        updated_at: Utc::now(),
        file_count: live.files.len(),
        hubs: file_graph.hub_files(),
        importers: file_graph.importers.clone(),
        imports: file_graph.imports.clone(),
        recent_events: events[start..].to_vec(),
    })
}

fn append_event_log(root: &Path, event: &Event) -> Result<()> {
    let path = state::event_log_path(root);
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;
    writeln!(file, "{}", event.log_line())?;
    Ok(())
}

/// Line count as line-terminator count, plus one when the file is
/// non-empty without a trailing terminator. Unreadable files count 0.
fn count_lines(path: &Path) -> i64 {
    let Ok(data) = fs::read(path) else {
        return 0;
    };
    if data.is_empty() {
        return 0;
    }
    let mut count = data.iter().filter(|byte| **byte == b'\n').count() as i64;
    if data.last() != Some(&b'\n') {
        count += 1;
    }
    count
}
