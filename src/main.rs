use anyhow::Result;
use clap::Parser;
use codemap::{cli, graph, scan, watch};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn request_shutdown(_signal: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

fn main() -> Result<()> {
    let args = cli::Args::parse();

    match args.command {
        cli::Command::Scan { path } => {
            let files = scan::scan_root(&path)?;
            let output = json!({
                "root": abs_root(&path),
                "files": files,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        cli::Command::Deps { path } => {
            let analyses = graph::analyze(&path)?;
            let output = json!({
                "root": abs_root(&path),
                "files": analyses,
                "external_deps": graph::manifest::read_external_deps(&path),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        cli::Command::Graph { path } => {
            let file_graph = graph::build(&path)?;
            let output = json!({
                "root": abs_root(&path),
                "module": file_graph.module,
                "hubs": file_graph.hub_files(),
                "imports": file_graph.imports,
                "importers": file_graph.importers,
                "external_deps": graph::manifest::read_external_deps(&path),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        cli::Command::Hubs { path, save } => {
            // Prefer the daemon's snapshot; fall back to a fresh one-shot
            // build when it is stale or absent.
            let (hubs, importers) = match watch::state::read_state(&path) {
                Some(state) => (state.hubs, state.importers),
                None => {
                    let file_graph = graph::build(&path)?;
                    (file_graph.hub_files(), file_graph.importers)
                }
            };
            if save {
                watch::state::write_hubs_file(&path, &hubs)?;
            }
            let listed: Vec<_> = hubs
                .iter()
                .map(|hub| {
                    json!({
                        "path": hub,
                        "importers": importers.get(hub).map(|list| list.len()).unwrap_or(0),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json!({ "hubs": listed }))?);
            Ok(())
        }
        cli::Command::Watch { action } => match action {
            cli::WatchAction::Start { path, verbose } => run_daemon(&path, verbose),
            cli::WatchAction::Stop { path } => {
                watch::lock::stop(&path)?;
                println!("stopped");
                Ok(())
            }
            cli::WatchAction::Status { path } => {
                let running = watch::lock::is_running(&path);
                let output = match watch::state::read_state(&path) {
                    Some(state) => json!({
                        "running": running,
                        "updated_at": state.updated_at,
                        "file_count": state.file_count,
                        "hubs": state.hubs,
                        "recent_events": state.recent_events.len(),
                    }),
                    None => json!({ "running": running, "state": "stale or absent" }),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
                Ok(())
            }
            cli::WatchAction::Log { path, limit } => {
                for line in watch::state::read_recent_log_lines(&path, limit) {
                    println!("{line}");
                }
                Ok(())
            }
        },
    }
}

/// Runs the daemon in the foreground until SIGTERM/SIGINT, then drains.
fn run_daemon(path: &Path, verbose: bool) -> Result<()> {
    let mut daemon = watch::Daemon::new(path, verbose)?;
    daemon.start()?;

    let handler = request_shutdown as extern "C" fn(libc::c_int);
    unsafe {
        libc::signal(libc::SIGTERM, handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }

    if verbose {
        eprintln!(
            "[watch] daemon running on {} ({} files)",
            daemon.root().display(),
            daemon.file_count()
        );
    }

    while !SHUTDOWN.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(200));
    }

    daemon.stop();
    Ok(())
}

fn abs_root(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
