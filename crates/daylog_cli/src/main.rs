//! Daylog CLI
//!
//! Command-line front end for a Daylog journal.
//!
//! # Commands
//!
//! - `list` - Print entry ids, newest first
//! - `view` - Print an entry's content
//! - `new` - Create today's entry
//! - `edit` - Replace an entry's content
//! - `delete` - Delete an entry
//! - `sync` - Load and run one reconciliation cycle
//! - `watch` - Keep syncing in the background and print changes
//! - `serve` - Run the entries server

mod commands;

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Daily journal with offline-first sync.
#[derive(Parser)]
#[command(name = "daylog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Base URL of the entries server
    #[arg(global = true, long, env = "DAYLOG_SERVER", default_value = daylog_sync_engine::DEFAULT_SERVER_URL)]
    pub server: String,

    /// Directory holding the local entry records
    #[arg(global = true, long, env = "DAYLOG_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Timeout for each server request, in milliseconds
    #[arg(global = true, long, default_value_t = 2000)]
    pub timeout_ms: u64,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print entry ids, newest first
    List,

    /// Print the content of an entry
    View {
        /// Entry id, e.g. 2024-01-31 or 2024-01-31_1
        id: String,
    },

    /// Create an entry for today and print its id
    New {
        /// Initial content
        #[arg(short, long)]
        content: Option<String>,
    },

    /// Replace the content of an entry
    Edit {
        /// Entry id
        id: String,

        /// New content
        #[arg(short, long)]
        content: String,
    },

    /// Delete an entry
    Delete {
        /// Entry id
        id: String,
    },

    /// Load entries and run one reconciliation cycle
    Sync,

    /// Sync in the background and print changes until Ctrl-C
    Watch {
        /// Seconds between reconciliation cycles
        #[arg(short, long, default_value_t = 10)]
        interval_secs: u64,
    },

    /// Run the entries server over the data directory
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value_t = daylog_sync_server::DEFAULT_BIND_ADDR)]
        bind: SocketAddr,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.global.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let global = &cli.global;
    match cli.command {
        Commands::List => commands::entries::list(global)?,
        Commands::View { id } => commands::entries::view(global, &id)?,
        Commands::New { content } => commands::entries::create(global, content)?,
        Commands::Edit { id, content } => commands::entries::edit(global, &id, content)?,
        Commands::Delete { id } => commands::entries::delete(global, &id)?,
        Commands::Sync => commands::sync::run_once(global)?,
        Commands::Watch { interval_secs } => commands::sync::watch(global, interval_secs)?,
        Commands::Serve { bind } => commands::serve::run(global, bind)?,
    }

    Ok(())
}
