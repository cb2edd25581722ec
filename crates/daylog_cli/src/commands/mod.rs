//! CLI command implementations.

pub mod entries;
pub mod serve;
pub mod sync;

use crate::GlobalArgs;
use daylog_storage::FileEntryStore;
use daylog_sync_engine::{HttpRemote, Journal, SyncConfig, SyncEngine};
use std::sync::Arc;
use std::time::Duration;

/// Result type shared by the commands.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// The journal the CLI operates on.
pub type CliJournal = Journal<HttpRemote, FileEntryStore>;

/// Builds the sync configuration from the global options.
pub fn sync_config(global: &GlobalArgs) -> SyncConfig {
    SyncConfig::new(global.server.as_str()).with_timeout(Duration::from_millis(global.timeout_ms))
}

/// Opens the journal and loads its entries.
pub fn open_journal(
    global: &GlobalArgs,
    config: SyncConfig,
) -> Result<CliJournal, Box<dyn std::error::Error>> {
    let remote = HttpRemote::new(&config)?;
    let store = FileEntryStore::open(&global.data_dir)?;
    let journal = Journal::new(Arc::new(SyncEngine::new(config, remote, store)));
    journal.refresh()?;
    Ok(journal)
}
