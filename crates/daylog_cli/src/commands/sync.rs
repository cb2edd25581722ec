//! Sync commands.

use super::{open_journal, sync_config, CommandResult};
use crate::GlobalArgs;
use daylog_sync_engine::{ReconcileOutcome, SyncEngine};
use std::collections::BTreeSet;
use std::time::Duration;

/// How often `watch` looks for changes to print.
const REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// Loads entries, runs one reconciliation cycle, and prints a report.
pub fn run_once(global: &GlobalArgs) -> CommandResult {
    let journal = open_journal(global, sync_config(global))?;
    let engine = journal.engine();

    match engine.stats().remote_available {
        Some(true) => println!("Loaded {} entries from {}", engine.len(), global.server),
        _ => println!("Server unavailable, loaded {} cached entries", engine.len()),
    }

    match engine.reconcile()? {
        ReconcileOutcome::Skipped(reason) => {
            println!("Sync skipped: {reason}");
        }
        ReconcileOutcome::Merged(report) => {
            println!("Sync complete");
            println!("  Inserted: {}", report.inserted);
            println!("  Replaced: {}", report.replaced);
            println!("  Kept local: {}", report.kept);
        }
    }
    Ok(())
}

/// Runs the background worker and prints id-list changes until Ctrl-C.
pub fn watch(global: &GlobalArgs, interval_secs: u64) -> CommandResult {
    let config = sync_config(global).with_sync_interval(Duration::from_secs(interval_secs.max(1)));
    let journal = open_journal(global, config)?;
    let worker = SyncEngine::start(journal.engine())?;

    let mut shown: BTreeSet<_> = journal.list().into_iter().collect();
    println!("Watching {} entries (Ctrl-C to stop)", shown.len());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                _ = ticker.tick() => {
                    let current: BTreeSet<_> = journal.list().into_iter().collect();
                    for id in current.difference(&shown) {
                        println!("+ {id}");
                    }
                    for id in shown.difference(&current) {
                        println!("- {id}");
                    }
                    shown = current;
                }
            }
        }
    });

    worker.stop();
    println!("Stopped with {} entries", journal.list().len());
    Ok(())
}
