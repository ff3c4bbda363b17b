use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "codemap",
    version,
    about = "Live code-graph engine: import graph, hubs, and an edit-event daemon",
    after_help = r#"Examples:
  codemap scan .
  codemap deps .
  codemap graph /path/to/project
  codemap watch start --verbose
  codemap watch status
  codemap watch stop
"#
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan the repository and print the file inventory as JSON.
    Scan {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Print per-file functions and raw imports as JSON.
    Deps {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Build the import graph and print hubs and edges as JSON.
    Graph {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Print hub files from the live snapshot, or a fresh build when the
    /// snapshot is stale.
    Hubs {
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Also write .codemap/hubs.txt.
        #[arg(long)]
        save: bool,
    },
    /// Control the watch daemon.
    Watch {
        #[command(subcommand)]
        action: WatchAction,
    },
}

#[derive(Subcommand)]
pub enum WatchAction {
    /// Run the watch daemon in the foreground until terminated.
    Start {
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Report scans, events, and I/O hiccups on stderr.
        #[arg(long)]
        verbose: bool,
    },
    /// Stop a running daemon.
    Stop {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Report daemon liveness and snapshot freshness.
    Status {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Print the most recent event-log lines.
    Log {
        #[arg(default_value = ".")]
        path: PathBuf,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}
