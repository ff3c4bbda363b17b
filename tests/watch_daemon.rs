use codemap::watch::Daemon;
use codemap::watch::event::Op;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn temp_repo(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("codemap-watch-{label}-{nanos}-{counter}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn settle() {
    thread::sleep(Duration::from_millis(500));
}

fn started_daemon(root: &Path) -> Daemon {
    let mut daemon = Daemon::new(root, false).unwrap();
    daemon.start().unwrap();
    // Give the watcher a moment to become effective.
    thread::sleep(Duration::from_millis(300));
    daemon
}

#[test]
fn daemon_tracks_initial_files() {
    let root = temp_repo("initial");
    fs::write(root.join("test.go"), "package main\n").unwrap();

    let mut daemon = started_daemon(&root);
    assert!(daemon.file_count() >= 1);
    daemon.stop();

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn write_event_carries_line_delta() {
    let root = temp_repo("delta");
    fs::write(root.join("counter.go"), "line1\nline2\nline3\n").unwrap();

    let mut daemon = started_daemon(&root);
    fs::write(
        root.join("counter.go"),
        "line1\nline2\nline3\nline4\nline5\n",
    )
    .unwrap();
    settle();

    let events = daemon.get_events(10);
    daemon.stop();
    if events.is_empty() {
        eprintln!("no events observed; filesystem notification unavailable here");
        let _ = fs::remove_dir_all(&root);
        return;
    }

    let write = events
        .iter()
        .find(|e| e.op == Op::Write && e.path == "counter.go")
        .expect("WRITE event for counter.go");
    assert_eq!(write.lines, 5);
    assert_eq!(write.delta, 2);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn new_file_emits_create() {
    let root = temp_repo("create");
    let mut daemon = started_daemon(&root);

    fs::write(root.join("newfile.go"), "package new\n\nfunc New() {}\n").unwrap();
    settle();

    let events = daemon.get_events(10);
    daemon.stop();
    if events.is_empty() {
        eprintln!("no events observed; filesystem notification unavailable here");
        let _ = fs::remove_dir_all(&root);
        return;
    }

    let create = events
        .iter()
        .find(|e| e.op == Op::Create && e.path == "newfile.go")
        .expect("CREATE event for newfile.go");
    // The create may be observed before the content lands; the delta can
    // only ever be the full new line count.
    assert_eq!(create.delta, create.lines);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn removal_records_negative_delta() {
    let root = temp_repo("remove");
    fs::write(root.join("todelete.go"), "package del\n\n// body\n").unwrap();

    let mut daemon = started_daemon(&root);
    fs::remove_file(root.join("todelete.go")).unwrap();
    settle();

    let events = daemon.get_events(10);
    daemon.stop();
    if events.is_empty() {
        eprintln!("no events observed; filesystem notification unavailable here");
        let _ = fs::remove_dir_all(&root);
        return;
    }

    let remove = events
        .iter()
        .find(|e| e.op == Op::Remove && e.path == "todelete.go")
        .expect("REMOVE event for todelete.go");
    assert_eq!(remove.lines, 0);
    assert!(remove.delta < 0, "expected negative delta, got {}", remove.delta);
    assert!(remove.size_delta < 0);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn rapid_writes_are_debounced() {
    let root = temp_repo("debounce");
    fs::write(root.join("rapid.go"), "package rapid\n").unwrap();

    let mut daemon = started_daemon(&root);
    for i in 0..5 {
        fs::write(
            root.join("rapid.go"),
            format!("package rapid\n// revision {i}\n"),
        )
        .unwrap();
        thread::sleep(Duration::from_millis(80));
    }
    settle();

    let events = daemon.get_events(100);
    daemon.stop();
    if events.is_empty() {
        eprintln!("no events observed; filesystem notification unavailable here");
        let _ = fs::remove_dir_all(&root);
        return;
    }

    let writes = events
        .iter()
        .filter(|e| e.op == Op::Write && e.path == "rapid.go")
        .count();
    assert!(writes < 5, "expected debounced writes, got {writes}");

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn non_source_files_are_ignored() {
    let root = temp_repo("nonsource");
    let mut daemon = started_daemon(&root);

    fs::write(root.join("readme.txt"), "notes\n").unwrap();
    fs::write(root.join("config.json"), "{\"key\": 1}\n").unwrap();
    settle();

    let events = daemon.get_events(0);
    daemon.stop();
    for event in &events {
        assert!(
            event.path != "readme.txt" && event.path != "config.json",
            "non-source file produced event: {}",
            event.path
        );
    }

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn directory_create_emits_no_event() {
    let root = temp_repo("mkdir");
    let mut daemon = started_daemon(&root);

    fs::create_dir_all(root.join("newdir")).unwrap();
    settle();

    let events = daemon.get_events(0);
    daemon.stop();
    assert!(
        events.iter().all(|e| e.path != "newdir"),
        "directory create should be absorbed into the watch set"
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn event_limit_zero_returns_all() {
    let root = temp_repo("limit");
    fs::write(root.join("a.go"), "package main\n").unwrap();

    let mut daemon = started_daemon(&root);
    fs::write(root.join("a.go"), "package main\n\nfunc A() {}\n").unwrap();
    settle();
    fs::write(root.join("a.go"), "package main\n\nfunc A() {}\n\nfunc B() {}\n").unwrap();
    settle();

    let all = daemon.get_events(0);
    let one = daemon.get_events(1);
    daemon.stop();

    assert!(one.len() <= 1);
    assert!(all.len() >= one.len());
    if let (Some(last_all), Some(last_one)) = (all.last(), one.last()) {
        assert_eq!(last_all, last_one);
    }

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn hub_edit_is_enriched() {
    let root = temp_repo("enrich");
    fs::write(root.join("types.go"), "package main\n\ntype T struct{}\n").unwrap();
    for name in ["a.go", "b.go", "c.go"] {
        fs::write(
            root.join(name),
            "package main\n\nimport \"types\"\n",
        )
        .unwrap();
    }

    let mut daemon = started_daemon(&root);
    fs::write(
        root.join("types.go"),
        "package main\n\ntype T struct{}\n\ntype U struct{}\n",
    )
    .unwrap();
    settle();

    let events = daemon.get_events(10);
    daemon.stop();
    if events.is_empty() {
        eprintln!("no events observed; filesystem notification unavailable here");
        let _ = fs::remove_dir_all(&root);
        return;
    }

    let write = events
        .iter()
        .find(|e| e.path == "types.go" && matches!(e.op, Op::Write | Op::Create))
        .expect("event for types.go");
    assert!(write.is_hub, "types.go has three importers");
    assert_eq!(write.importers, 3);

    let _ = fs::remove_dir_all(&root);
}
